use super::message::{AttachedFile, ChatMessage};

/// In-memory chat state: the message history and the pending attachment.
///
/// Messages are append-only and ids are assigned here, in append order.
/// Only the orchestrator appends; front ends read through `messages()`.
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    attachment: Option<AttachedFile>,
    next_id: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Put a file in the attachment slot, replacing any previous one.
    pub fn attach(&mut self, file: AttachedFile) {
        self.attachment = Some(file);
    }

    pub fn attachment(&self) -> Option<&AttachedFile> {
        self.attachment.as_ref()
    }

    pub fn clear_attachment(&mut self) {
        self.attachment = None;
    }

    /// Empty the slot; a dispatched attachment is consumed.
    pub(crate) fn take_attachment(&mut self) -> Option<AttachedFile> {
        self.attachment.take()
    }

    pub(crate) fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn push(&mut self, message: ChatMessage) -> &ChatMessage {
        self.messages.push(message);
        let idx = self.messages.len() - 1;
        &self.messages[idx]
    }
}
