//! HTTP front-end over the dialogue engine.

pub mod cookie;
pub mod routes;

pub use cookie::SESSION_COOKIE;
pub use routes::{AppState, ChatReply, ChatRequest, chat_routes};
