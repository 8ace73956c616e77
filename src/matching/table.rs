//! Response tables: canonical replies and the phrases that trigger them.
//!
//! Tables are ordered: iteration follows insertion order, which is what makes
//! first-seen-wins tie-breaking deterministic. On disk a table is a JSON array
//! (not an object) for the same reason.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// One canonical response and its trigger phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub response: String,
    pub phrases: Vec<String>,
}

/// An ordered `{response → phrases}` mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseTable {
    entries: Vec<TableEntry>,
}

impl ResponseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response with its phrases. A response already present keeps its
    /// position and gains the new phrases.
    pub fn with_entry<I, S>(mut self, response: impl Into<String>, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(response.into(), phrases.into_iter().map(Into::into).collect());
        self
    }

    fn insert(&mut self, response: String, phrases: Vec<String>) {
        match self.entries.iter_mut().find(|e| e.response == response) {
            Some(existing) => existing.phrases.extend(phrases),
            None => self.entries.push(TableEntry { response, phrases }),
        }
    }

    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// Every `(response, phrase)` pair in table order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|entry| {
            entry
                .phrases
                .iter()
                .map(move |phrase| (entry.response.as_str(), phrase.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a table from JSON. `origin` names the source in errors.
    pub fn from_json(origin: &str, json: &str) -> Result<Self, TableError> {
        let raw: Vec<TableEntry> = serde_json::from_str(json).map_err(|source| TableError::Parse {
            path: origin.to_string(),
            source,
        })?;
        if raw.is_empty() {
            return Err(TableError::Empty {
                path: origin.to_string(),
            });
        }

        let mut table = Self::new();
        for entry in raw {
            table.insert(entry.response, entry.phrases);
        }
        Ok(table)
    }

    /// Load a table from a JSON file.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let origin = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: origin.clone(),
            source,
        })?;
        let table = Self::from_json(&origin, &json)?;
        tracing::info!(path = %origin, entries = table.len(), "Loaded response table");
        Ok(table)
    }

    /// Identity queries about the user.
    pub fn default_special() -> Self {
        Self::new().with_entry(
            "Quel est mon prénom ?",
            ["quel est mon prénom", "mon prénom"],
        )
    }

    /// Static facts about the bot.
    pub fn default_predefined() -> Self {
        Self::new()
            .with_entry(
                "Je suis votre chatbot amical!",
                [
                    "quel est votre nom",
                    "qui êtes-vous",
                    "ton nom?",
                    "c'est quoi ton nom?",
                ],
            )
            .with_entry(
                "Oui je suis juste un bout de code et je fonctionne comme prévu!",
                [
                    "comment allez-vous",
                    "comment te sens-tu",
                    "ça va ?",
                    "comment ça va?",
                ],
            )
            .with_entry(
                "Je peux répondre à des questions prédéfinies et utiliser ChatGPT pour d'autres.",
                [
                    "que pouvez-vous faire",
                    "quelles sont vos capacités",
                    "tu fais quoi?",
                    "que fais-tu?",
                ],
            )
    }
}

/// The two tables the resolver consults, shared read-only across sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTables {
    pub special: ResponseTable,
    pub predefined: ResponseTable,
}

impl Default for ResponseTables {
    fn default() -> Self {
        Self {
            special: ResponseTable::default_special(),
            predefined: ResponseTable::default_predefined(),
        }
    }
}

impl ResponseTables {
    /// Built-in tables, each replaced by the file at the given path if any.
    pub fn load(special: Option<&Path>, predefined: Option<&Path>) -> Result<Self, TableError> {
        Ok(Self {
            special: match special {
                Some(path) => ResponseTable::load(path)?,
                None => ResponseTable::default_special(),
            },
            predefined: match predefined {
                Some(path) => ResponseTable::load(path)?,
                None => ResponseTable::default_predefined(),
            },
        })
    }
}
