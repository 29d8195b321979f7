//! Gemini `generateContent` client.
//!
//! Every call goes through the retry loop, so a rate-limited request blocks
//! for the backoff delays before either succeeding or giving up.

mod aspect;
mod types;

pub use aspect::{AspectRatio, UnknownAspectRatio};
pub use types::{
    Blob, Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    ImageConfig, Part, PromptFeedback,
};

use crate::config::GeminiConfig;
use crate::http::{HttpRequest, HttpTransport, Method};
use crate::retry::{self, ApiError, RetryPolicy};

pub struct GeminiClient<T> {
    transport: T,
    api_base: String,
    api_key: String,
    policy: RetryPolicy,
}

impl<T: HttpTransport> GeminiClient<T> {
    pub fn new(
        transport: T,
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            policy,
        }
    }

    pub fn from_config(
        transport: T,
        cfg: &GeminiConfig,
        api_key: impl Into<String>,
        policy: RetryPolicy,
    ) -> Self {
        Self::new(transport, cfg.api_base.clone(), api_key, policy)
    }

    /// POST `models/{model}:generateContent`, retrying on rate limits.
    pub fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiError> {
        let http = HttpRequest::new(
            Method::Post,
            format!("{}/models/{}:generateContent", self.api_base, model),
        )
        .header("x-goog-api-key", self.api_key.as_str())
        .json(request)?;

        tracing::debug!(model, "generateContent");
        retry::run_with_retry(&self.policy, || {
            let resp = self.transport.send(&http)?.error_for_status()?;
            resp.json::<GenerateContentResponse>()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::ScriptedTransport;
    use std::time::Duration;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }
    }

    fn text_request() -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text("hello")])],
            generation_config: None,
        }
    }

    #[test]
    fn sends_key_header_and_model_path() {
        let transport = ScriptedTransport::new()
            .respond(200, r#"{"candidates":[{"content":{"parts":[{"text":"hi"}]}}]}"#);
        let client = GeminiClient::new(
            &transport,
            "https://gemini.test/v1beta/",
            "k-123",
            fast_policy(),
        );
        let resp = client
            .generate_content("gemini-2.5-flash", &text_request())
            .unwrap();
        assert_eq!(resp.text(), "hi");

        let sent = transport.recorded();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].url,
            "https://gemini.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(sent[0].header_value("x-goog-api-key"), Some("k-123"));
    }

    #[test]
    fn retries_resource_exhausted_then_succeeds() {
        let transport = ScriptedTransport::new()
            .respond(429, r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#)
            .respond(200, r#"{"candidates":[]}"#);
        let client = GeminiClient::new(&transport, "http://g", "k", fast_policy());
        client.generate_content("m", &text_request()).unwrap();
        assert_eq!(transport.recorded().len(), 2);
    }

    #[test]
    fn bad_request_is_not_retried() {
        let transport = ScriptedTransport::new()
            .respond(400, r#"{"error":{"status":"INVALID_ARGUMENT"}}"#)
            .respond(200, r#"{"candidates":[]}"#);
        let client = GeminiClient::new(&transport, "http://g", "k", fast_policy());
        let err = client.generate_content("m", &text_request()).unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(transport.recorded().len(), 1);
    }
}
