//! Classify HTTP status and API errors into retry policy error kinds.

use super::error::{ApiError, RESOURCE_EXHAUSTED};
use super::policy::ErrorKind;

/// Classify an HTTP status and its response body for retry decisions.
pub fn classify_http_status(status: u32, body: &str) -> ErrorKind {
    if status == 429 || body.contains(RESOURCE_EXHAUSTED) {
        ErrorKind::RateLimited
    } else {
        ErrorKind::Other
    }
}

/// Classify an API error into an ErrorKind.
///
/// Transport and decode failures are never retried: only an explicit
/// rate-limit answer from the server is.
pub fn classify(e: &ApiError) -> ErrorKind {
    match e {
        ApiError::Http { status, body } => classify_http_status(*status, body),
        ApiError::Transport(_) | ApiError::Decode(_) => ErrorKind::Other,
    }
}

/// True when curl never reached the host: connection refused, DNS or proxy
/// resolution failure. Timeouts and mid-transfer errors are not included.
pub fn is_host_unreachable(e: &ApiError) -> bool {
    match e {
        ApiError::Transport(ce) => {
            ce.is_couldnt_connect() || ce.is_couldnt_resolve_host() || ce.is_couldnt_resolve_proxy()
        }
        ApiError::Http { .. } | ApiError::Decode(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_connect_level_curl_errors_mean_unreachable() {
        // 6 = couldn't resolve host, 7 = couldn't connect, 28 = timeout, 56 = recv error
        assert!(is_host_unreachable(&ApiError::Transport(curl::Error::new(6))));
        assert!(is_host_unreachable(&ApiError::Transport(curl::Error::new(7))));
        assert!(!is_host_unreachable(&ApiError::Transport(curl::Error::new(28))));
        assert!(!is_host_unreachable(&ApiError::Transport(curl::Error::new(56))));
        assert!(!is_host_unreachable(&ApiError::Http {
            status: 503,
            body: String::new()
        }));
    }

    #[test]
    fn http_429_is_rate_limited() {
        assert_eq!(classify_http_status(429, ""), ErrorKind::RateLimited);
    }

    #[test]
    fn resource_exhausted_marker_is_rate_limited_regardless_of_status() {
        let body = r#"{"error":{"code":400,"status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(classify_http_status(400, body), ErrorKind::RateLimited);
        assert_eq!(classify_http_status(503, body), ErrorKind::RateLimited);
    }

    #[test]
    fn other_statuses_are_not_retried() {
        assert_eq!(classify_http_status(500, "internal"), ErrorKind::Other);
        assert_eq!(classify_http_status(503, ""), ErrorKind::Other);
        assert_eq!(classify_http_status(400, "bad prompt"), ErrorKind::Other);
        assert_eq!(classify_http_status(404, ""), ErrorKind::Other);
    }

    #[test]
    fn decode_errors_are_not_retried() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(classify(&ApiError::Decode(err)), ErrorKind::Other);
    }
}
