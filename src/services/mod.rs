//! Domain services behind the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Provider adapters and the fallback chain implement the assistant traits;
//! the chat session and slide service consume those traits and never see a
//! provider directly. Prompt building and response parsing are pure
//! functions so they can be tested without a network.

pub mod adapter;
pub mod assistant;
pub mod chat;
pub mod fallback;
pub mod parse;
pub mod prompt;
pub mod slides;
