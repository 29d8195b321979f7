//! Chat message and attachment types.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Ai,
}

/// One entry in the chat history. Immutable once appended to a session.
///
/// An `Ai` message carries either an image or an error text, never both:
/// the constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    id: u64,
    author: Author,
    text_content: String,
    image_data_uri: Option<String>,
    interpretation_text: Option<String>,
    timestamp: DateTime<Utc>,
    is_media_analysis: bool,
}

impl ChatMessage {
    pub(crate) fn user(id: u64, text: impl Into<String>, is_media_analysis: bool) -> Self {
        Self {
            id,
            author: Author::User,
            text_content: text.into(),
            image_data_uri: None,
            interpretation_text: None,
            timestamp: Utc::now(),
            is_media_analysis,
        }
    }

    pub(crate) fn ai_image(
        id: u64,
        image_data_uri: String,
        interpretation: String,
        is_media_analysis: bool,
    ) -> Self {
        Self {
            id,
            author: Author::Ai,
            text_content: String::new(),
            image_data_uri: Some(image_data_uri),
            interpretation_text: Some(interpretation),
            timestamp: Utc::now(),
            is_media_analysis,
        }
    }

    pub(crate) fn ai_error(id: u64, text: impl Into<String>, is_media_analysis: bool) -> Self {
        Self {
            id,
            author: Author::Ai,
            text_content: text.into(),
            image_data_uri: None,
            interpretation_text: None,
            timestamp: Utc::now(),
            is_media_analysis,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn author(&self) -> Author {
        self.author
    }

    /// Prompt text for user messages; error text for failed AI responses.
    pub fn text_content(&self) -> &str {
        &self.text_content
    }

    pub fn image_data_uri(&self) -> Option<&str> {
        self.image_data_uri.as_deref()
    }

    pub fn interpretation_text(&self) -> Option<&str> {
        self.interpretation_text.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_media_analysis(&self) -> bool {
        self.is_media_analysis
    }

    /// True for an AI message that carries no image.
    pub fn is_error(&self) -> bool {
        self.author == Author::Ai && self.image_data_uri.is_none()
    }
}

/// A file picked by the user and waiting to be sent with the next prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedFile {
    pub raw_base64_data: String,
    pub mime_type: String,
    pub filename: String,
}

impl AttachedFile {
    pub fn from_bytes(filename: impl Into<String>, mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            raw_base64_data: STANDARD.encode(bytes),
            mime_type: mime_type.into(),
            filename: filename.into(),
        }
    }

    /// Read a file from disk; the media type is guessed from its extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        Ok(Self::from_bytes(filename, mime_from_path(path), &bytes))
    }
}

/// Media type for the file kinds the model accepts as inline data.
pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "txt" | "md" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// `data:<mime>;base64,<data>`
pub fn data_uri(mime_type: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_data)
}

/// Split a data URI back into its media type and decoded bytes.
pub fn decode_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime, data) = rest.split_once(";base64,")?;
    let bytes = STANDARD.decode(data).ok()?;
    Some((mime.to_string(), bytes))
}
