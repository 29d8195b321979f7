//! Prompt orchestration and chat session state.

mod message;
mod orchestrator;
mod session;

pub use message::{
    data_uri, decode_data_uri, mime_from_path, AttachedFile, Author, ChatMessage,
};
pub use orchestrator::{GeneratedImage, OrchestratorError, PromptOrchestrator, QUOTA_MESSAGE};
pub use session::ChatSession;
