//! Core of pixsync: Gemini image generation with retry, chat session state,
//! and project-to-GitHub sync.

pub mod chat;
pub mod config;
pub mod gemini;
pub mod http;
pub mod logging;
pub mod retry;
pub mod server;
pub mod sync;
