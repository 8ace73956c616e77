//! Fixed reply strings, per locale.

/// Supported reply languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    English,
    French,
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "fr" | "french" | "français" => Ok(Self::French),
            other => Err(format!("unsupported locale '{other}' (expected en or fr)")),
        }
    }
}

/// Every sentence the bot says on its own, outside the response tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrasebook {
    ask_name: String,
    greeting: String,
    name_is: String,
    name_unknown: String,
    system_prompt: String,
    quota_exceeded: String,
    provider_error: String,
}

impl Phrasebook {
    pub fn english() -> Self {
        Self {
            ask_name: "What is your first name?".to_string(),
            greeting: "Nice to meet you, {name}! How can I help you today?".to_string(),
            name_is: "Your first name is {name}.".to_string(),
            name_unknown: "I don't know your first name yet. What is your first name?".to_string(),
            system_prompt: "You are a competent assistant.".to_string(),
            quota_exceeded: "Sorry, the request quota has been exceeded. Please try again later."
                .to_string(),
            provider_error: "An error occurred: {error}".to_string(),
        }
    }

    pub fn french() -> Self {
        Self {
            ask_name: "Quel est votre prénom ?".to_string(),
            greeting: "Ravi de vous rencontrer, {name} ! Comment puis-je vous aider aujourd'hui ?"
                .to_string(),
            name_is: "Votre prénom est {name}.".to_string(),
            name_unknown: "Je ne connais pas encore votre prénom. Quel est votre prénom ?"
                .to_string(),
            system_prompt: "Vous êtes un assistant compétent.".to_string(),
            quota_exceeded:
                "Désolé, le quota de requêtes a été dépassé. Veuillez réessayer plus tard."
                    .to_string(),
            provider_error: "Une erreur s'est produite : {error}".to_string(),
        }
    }

    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::English => Self::english(),
            Locale::French => Self::french(),
        }
    }

    /// The onboarding question.
    pub fn ask_name(&self) -> &str {
        &self.ask_name
    }

    pub fn greeting(&self, name: &str) -> String {
        self.greeting.replace("{name}", name)
    }

    pub fn name_is(&self, name: &str) -> String {
        self.name_is.replace("{name}", name)
    }

    pub fn name_unknown(&self) -> &str {
        &self.name_unknown
    }

    /// System instruction sent ahead of the history on every fallback call.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn quota_exceeded(&self) -> &str {
        &self.quota_exceeded
    }

    pub fn provider_error(&self, detail: &str) -> String {
        self.provider_error.replace("{error}", detail)
    }
}

impl Default for Phrasebook {
    fn default() -> Self {
        Self::english()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_templates() {
        let phrases = Phrasebook::english();
        assert_eq!(phrases.ask_name(), "What is your first name?");
        assert_eq!(phrases.name_is("Alice"), "Your first name is Alice.");
        assert!(phrases.greeting("Alice").contains("Alice"));
        assert_eq!(
            phrases.provider_error("boom"),
            "An error occurred: boom"
        );
    }

    #[test]
    fn french_templates() {
        let phrases = Phrasebook::french();
        assert_eq!(phrases.ask_name(), "Quel est votre prénom ?");
        assert_eq!(phrases.name_is("Zoé"), "Votre prénom est Zoé.");
        assert_eq!(phrases.system_prompt(), "Vous êtes un assistant compétent.");
    }

    #[test]
    fn name_is_interpolated_literally() {
        // Names are not escaped or trimmed.
        let phrases = Phrasebook::english();
        assert_eq!(phrases.name_is("  {x} "), "Your first name is   {x} .");
    }

    #[test]
    fn locale_parsing() {
        assert_eq!("fr".parse::<Locale>(), Ok(Locale::French));
        assert_eq!("EN".parse::<Locale>(), Ok(Locale::English));
        assert!("de".parse::<Locale>().is_err());
        assert_eq!(Phrasebook::for_locale(Locale::French), Phrasebook::french());
        assert_eq!(Phrasebook::default(), Phrasebook::english());
    }
}
