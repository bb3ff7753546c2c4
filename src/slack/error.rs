use thiserror::Error;

/// Errors surfaced by the Slack Web API layer.
///
/// `Http` and `Status` are transport-level and abort the run when they hit
/// the listing path. `Api` carries the `error` string the API attaches to
/// an `ok: false` lookup response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{method} request failed: {source}")]
    Http {
        method: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} returned HTTP {status}")]
    Status { method: String, status: u16 },

    #[error("{method} reported an error: {reason}")]
    Api { method: String, reason: String },

    #[error("{method} response is missing the `{field}` field")]
    MissingField {
        method: String,
        field: &'static str,
    },
}
