use shared::protocol::Category;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CombinatorError {
    #[error("input `{0}` is already registered")]
    DuplicateInput(&'static str),
    #[error("cannot register input `{0}` after values have been pushed")]
    Sealed(&'static str),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid {category} body: {source}")]
    Json {
        category: Category,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {category} body: {reason}")]
    Text { category: Category, reason: String },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid API base url `{url}`: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("failed to access preference file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed preference file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] toml::ser::Error),
}
