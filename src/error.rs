//! Error types for the content API client.

use thiserror::Error;

/// API-facing errors.
///
/// Structural and configuration problems (missing form, bad predicate
/// arguments, unset ref) surface through this type immediately; transport
/// and auth failures from the collaborator pass through it unmodified.
#[derive(Debug, Error)]
pub enum Error {
    #[error("can't connect to the content API: {0}")]
    Auth(String),

    #[error("no master ref found in API metadata")]
    NoMasterFound,

    #[error("ref not found: {0}")]
    RefNotFound(String),

    #[error("form not found: {0}")]
    FormNotFound(String),

    #[error("bookmark not found: {0}")]
    BookmarkNotFound(String),

    #[error("no ref set; call with_ref() before submit()")]
    MissingRef,

    #[error("invalid value for parameter {field}: {value}")]
    InvalidParameter { field: String, value: String },

    #[error("invalid predicate: {0}")]
    InvalidPredicate(String),

    #[error("document link span rendered without a link resolver")]
    MissingLinkResolver,

    #[error("API request failed: {0}")]
    Request(String),

    #[error("unexpected status {status} on URL {url}")]
    Status { status: u16, url: String },

    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(String),
}

/// Per-field fragment decoding errors.
///
/// These never cross a document boundary: the decoder logs the failure,
/// drops the field, and keeps decoding the document's remaining fields.
#[derive(Debug, Error)]
pub enum FragmentError {
    #[error("unknown fragment type: {0}")]
    UnknownType(String),

    #[error("unparsable date value: {0}")]
    DateParse(String),

    #[error("malformed fragment value: {0}")]
    Malformed(String),
}
