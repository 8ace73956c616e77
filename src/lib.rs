//! causerie: a chat front-end that answers from canned tables first and
//! falls back to an LLM.

pub mod config;
pub mod dialogue;
pub mod error;
pub mod llm;
pub mod matching;
pub mod web;
