//! Two-step prompt pipeline: interpret the request, then synthesize an image.

use super::message::{data_uri, AttachedFile, ChatMessage};
use super::session::ChatSession;
use crate::config::GeminiConfig;
use crate::gemini::{
    AspectRatio, Content, GeminiClient, GenerateContentRequest, GenerationConfig, ImageConfig,
    Part,
};
use crate::http::HttpTransport;
use crate::retry::ApiError;

/// Shown instead of the raw error when the service reports quota exhaustion.
pub const QUOTA_MESSAGE: &str = "The image service is out of quota right now (too many requests). \
Please wait a minute and try again.";

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("nothing to send: the prompt is empty and no file is attached")]
    EmptyPrompt,
    #[error("interpretation request failed: {0}")]
    Interpretation(#[source] ApiError),
    #[error("image request failed: {0}")]
    Image(#[source] ApiError),
    #[error("the model returned no interpretation{}", blocked_suffix(.block_reason))]
    EmptyInterpretation { block_reason: Option<String> },
    #[error("the model returned no image{}", text_suffix(.text))]
    NoImage { text: String },
}

fn blocked_suffix(reason: &Option<String>) -> String {
    reason
        .as_ref()
        .map(|r| format!(" (blocked: {r})"))
        .unwrap_or_default()
}

fn text_suffix(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!(": {text}")
    }
}

impl OrchestratorError {
    pub fn is_rate_limited(&self) -> bool {
        match self {
            OrchestratorError::Interpretation(e) | OrchestratorError::Image(e) => {
                e.is_rate_limited()
            }
            _ => false,
        }
    }

    /// Text for the chat bubble that replaces the image.
    pub fn user_message(&self) -> String {
        if self.is_rate_limited() {
            QUOTA_MESSAGE.to_string()
        } else {
            format!("Sorry, I couldn't create that image. {self}")
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub interpretation: String,
    pub mime_type: String,
    pub base64_data: String,
}

impl GeneratedImage {
    pub fn data_uri(&self) -> String {
        data_uri(&self.mime_type, &self.base64_data)
    }
}

pub struct PromptOrchestrator<T> {
    client: GeminiClient<T>,
    text_model: String,
    image_model: String,
}

impl<T: HttpTransport> PromptOrchestrator<T> {
    pub fn new(
        client: GeminiClient<T>,
        text_model: impl Into<String>,
        image_model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            text_model: text_model.into(),
            image_model: image_model.into(),
        }
    }

    pub fn from_config(client: GeminiClient<T>, cfg: &GeminiConfig) -> Self {
        Self::new(client, cfg.text_model.clone(), cfg.image_model.clone())
    }

    /// Send `prompt` (with the session's pending attachment, if any) and
    /// append the user message plus exactly one AI message to `session`.
    ///
    /// Never fails: errors become an AI message without an image. Blocks for
    /// the duration of both calls, including any rate-limit backoff.
    pub fn submit<'s>(
        &self,
        session: &'s mut ChatSession,
        prompt: &str,
        aspect: AspectRatio,
    ) -> &'s ChatMessage {
        let attachment = session.take_attachment();
        let is_media = attachment.is_some();

        let user_id = session.next_id();
        session.push(ChatMessage::user(user_id, prompt, is_media));

        let outcome = self.generate(prompt, attachment.as_ref(), aspect);
        let ai_id = session.next_id();
        let message = match outcome {
            Ok(image) => {
                tracing::info!(
                    mime = %image.mime_type,
                    aspect = %aspect.resolve(),
                    "image generated"
                );
                let uri = image.data_uri();
                ChatMessage::ai_image(ai_id, uri, image.interpretation, is_media)
            }
            Err(e) => {
                tracing::warn!(rate_limited = e.is_rate_limited(), "prompt failed: {}", e);
                ChatMessage::ai_error(ai_id, e.user_message(), is_media)
            }
        };
        session.push(message)
    }

    /// Run both steps without touching any session state.
    pub fn generate(
        &self,
        prompt: &str,
        attachment: Option<&AttachedFile>,
        aspect: AspectRatio,
    ) -> Result<GeneratedImage, OrchestratorError> {
        if prompt.trim().is_empty() && attachment.is_none() {
            return Err(OrchestratorError::EmptyPrompt);
        }

        let interpretation = self.interpret(prompt, attachment)?;
        tracing::debug!(chars = interpretation.len(), "interpretation received");

        let request = image_request(&interpretation, aspect);
        let response = self
            .client
            .generate_content(&self.image_model, &request)
            .map_err(OrchestratorError::Image)?;

        match response.first_inline_data() {
            Some(blob) => Ok(GeneratedImage {
                interpretation,
                mime_type: blob.mime_type.clone(),
                base64_data: blob.data.clone(),
            }),
            None => Err(OrchestratorError::NoImage {
                text: response.text(),
            }),
        }
    }

    fn interpret(
        &self,
        prompt: &str,
        attachment: Option<&AttachedFile>,
    ) -> Result<String, OrchestratorError> {
        let request = interpretation_request(prompt, attachment);
        let response = self
            .client
            .generate_content(&self.text_model, &request)
            .map_err(OrchestratorError::Interpretation)?;
        let text = response.text();
        if text.is_empty() {
            return Err(OrchestratorError::EmptyInterpretation {
                block_reason: response.prompt_feedback.and_then(|f| f.block_reason),
            });
        }
        Ok(text)
    }
}

pub(crate) fn interpretation_request(
    prompt: &str,
    attachment: Option<&AttachedFile>,
) -> GenerateContentRequest {
    let mut parts = Vec::with_capacity(2);
    let instruction = match attachment {
        Some(file) => {
            parts.push(Part::inline(&file.mime_type, &file.raw_base64_data));
            format!(
                "Study the attached file ({}) together with this request and describe, \
in one detailed paragraph, the image that should be created: {}",
                file.filename,
                prompt.trim()
            )
        }
        None => format!(
            "Describe, in one detailed paragraph, the image that should be created for this request: {}",
            prompt.trim()
        ),
    };
    parts.push(Part::text(instruction));
    GenerateContentRequest {
        contents: vec![Content::user(parts)],
        generation_config: None,
    }
}

pub(crate) fn image_request(interpretation: &str, aspect: AspectRatio) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(vec![Part::text(format!(
            "Generate an image based on this description: {interpretation}"
        ))])],
        generation_config: Some(GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string()]),
            image_config: Some(ImageConfig {
                aspect_ratio: aspect.resolve().as_str().to_string(),
            }),
        }),
    }
}
