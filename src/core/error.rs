use thiserror::Error;

/// Fatal extraction failures. Anything not listed here is degraded to an
/// absent field instead of an error.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("response from {url} is not valid JSON: {source}")]
    Json {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("required field `{0}` missing from API response")]
    MissingField(&'static str),

    #[error("could not derive a video id from {0}")]
    UnsupportedUrl(String),
}
