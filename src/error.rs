//! Error types for gateway client and reconciliation operations.

use reqwest::Method;
use thiserror::Error;

/// Main error type for provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Base URL, path and query could not be joined into a request URL
    #[error("building request URL for {method} {path}: {source}")]
    InvalidUrl {
        method: Method,
        path: String,
        #[source]
        source: url::ParseError,
    },

    /// Request body could not be serialized to JSON
    #[error("marshaling request body for {method} {path}: {source}")]
    Encode {
        method: Method,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Connection or send failure before a response arrived
    #[error("executing request {method} {path}: {source}")]
    Request {
        method: Method,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response arrived but its body stream could not be read
    #[error("reading response body for {method} {path} (status {status}): {source}")]
    ReadBody {
        method: Method,
        path: String,
        status: u16,
        #[source]
        source: reqwest::Error,
    },

    /// Status code outside the set the operation accepts
    #[error("unexpected status code {status} for {method} {path}: {body}")]
    UnexpectedStatus {
        method: Method,
        path: String,
        status: u16,
        body: String,
    },

    /// Response body did not have the expected JSON shape
    #[error("decoding {what} response: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    /// Declared field failed validation (missing, or outside its allowed set)
    #[error("invalid value for '{0}': {1}")]
    InvalidField(String, String),

    /// Declared structured-field blob is not valid JSON of the expected shape
    #[error("unable to parse {field} JSON: {source}")]
    InvalidJson {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// Structured value returned by the API could not be re-encoded
    #[error("unable to serialize {field} to JSON: {source}")]
    Serialize {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// Operation the entity kind can never perform
    #[error("{kind} resources do not support {operation}: {hint}")]
    Unsupported {
        kind: &'static str,
        operation: &'static str,
        hint: &'static str,
    },

    /// Read-only lookup for an identity the service does not know
    #[error("{0} with ID {1} not found")]
    NotFound(&'static str, String),

    /// Provider configuration failed validation
    #[error("invalid provider config: {0}")]
    InvalidConfig(String),
}

impl ProviderError {
    /// True for failures that happened below HTTP semantics: URL building,
    /// body marshaling, connection, or reading the response stream.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ProviderError::InvalidUrl { .. }
                | ProviderError::Encode { .. }
                | ProviderError::Request { .. }
                | ProviderError::ReadBody { .. }
        )
    }

    /// True for local validation failures, which are always raised before any
    /// request is sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ProviderError::InvalidField(..) | ProviderError::InvalidJson { .. }
        )
    }
}

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;
