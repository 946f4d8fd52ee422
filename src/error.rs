//! Unified SDK error types.

use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("WebSocket error: {0}")]
    Ws(#[from] WsError),

    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// WebSocket errors.
///
/// None of these reach the subscriber of an update stream: connection
/// failures turn into a scheduled retry and bad payloads are logged and
/// dropped. They are still typed so transports and decoders can report them.
#[derive(Error, Debug)]
pub enum WsError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    #[error("Decode error: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Errors deriving a streaming address from the configured API base.
#[derive(Error, Debug)]
pub enum AddressError {
    #[error("Invalid URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("Relative API base {api_url:?} needs a document base URI")]
    MissingDocumentBase { api_url: String },

    #[error("Unsupported scheme for streaming: {0}")]
    UnsupportedScheme(String),
}
