use thiserror::Error;

use crate::slack::ApiError;

/// Everything that can go wrong while materializing a single file.
///
/// `is_retryable()` separates transient transport trouble worth another
/// attempt from failures retrying cannot fix: a descriptor without a URL,
/// an id the API refuses to resolve, a 404, a full disk.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("descriptor has no download URL")]
    MissingUrl,

    #[error("name lookup failed: {0}")]
    Resolve(#[from] ApiError),

    #[error("HTTP error {status} downloading {path}")]
    HttpStatus { status: u16, path: String },

    #[error("HTTP error downloading {path}: {source}")]
    Http {
        source: reqwest::Error,
        path: String,
    },

    #[error("Disk error: {0}")]
    Disk(#[from] std::io::Error),

    #[error("Giving up on {path} after {retries} retries: {last_error}")]
    RetriesExhausted {
        retries: u32,
        path: String,
        last_error: String,
    },
}

impl MaterializeError {
    /// Whether this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            MaterializeError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            MaterializeError::Http { .. } => true,
            MaterializeError::MissingUrl
            | MaterializeError::Resolve(_)
            | MaterializeError::Disk(_)
            | MaterializeError::RetriesExhausted { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16) -> MaterializeError {
        MaterializeError::HttpStatus {
            status,
            path: "x".into(),
        }
    }

    #[test]
    fn client_errors_are_not_retryable() {
        for status in [400, 401, 403, 404] {
            assert!(!status_error(status).is_retryable(), "status {status}");
        }
    }

    #[test]
    fn throttling_and_server_errors_are_retryable() {
        for status in [429, 500, 502, 503] {
            assert!(status_error(status).is_retryable(), "status {status}");
        }
    }

    #[test]
    fn missing_url_is_not_retryable() {
        assert!(!MaterializeError::MissingUrl.is_retryable());
    }

    #[test]
    fn disk_errors_are_not_retryable() {
        let e = MaterializeError::Disk(std::io::Error::other("disk full"));
        assert!(!e.is_retryable());
    }

    #[test]
    fn lookup_failures_are_not_retryable() {
        let e = MaterializeError::Resolve(ApiError::Api {
            method: "users.info".to_string(),
            reason: "user_not_found".to_string(),
        });
        assert!(!e.is_retryable());
    }

    #[test]
    fn connection_errors_are_retryable() {
        // Manufacture a reqwest::Error by hitting an unreachable address.
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let err = rt
            .block_on(reqwest::Client::new().get("http://127.0.0.1:1").send())
            .unwrap_err();
        let e = MaterializeError::Http {
            source: err,
            path: "x".into(),
        };
        assert!(e.is_retryable());
    }
}
