//! Retry and backoff policy.
//!
//! This module encapsulates error classification (rate limiting versus
//! everything else) and exponential backoff decisions so that the Gemini
//! client and any future caller share a consistent policy. The loop itself
//! knows nothing about HTTP.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_http_status, is_host_unreachable};
pub use error::{ApiError, RESOURCE_EXHAUSTED};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, run_with_retry_using};
