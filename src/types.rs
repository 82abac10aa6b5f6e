//! Error types for the gateway core.

use thiserror::Error;

/// Errors surfaced by the dispatch core.
///
/// A missing component is NOT represented here for the batch path; the
/// resolver reports it as [`crate::dispatch::Resolution::NotFound`] so the
/// batch dispatcher can soft-fail a single entry. The `ComponentNotFound`
/// variant below is the hard form used by the legacy dispatcher, where a
/// failed resolution aborts the whole request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// `direct` request arrived without a body
    #[error("missing request body")]
    MissingBody,

    /// `direct` request body could not be parsed as JSON
    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// `dispatcher` request arrived without an `address` query parameter
    #[error("missing address parameter")]
    MissingAddress,

    /// Hard resolution failure (legacy dispatch path only)
    #[error("component {0} not registered in session")]
    ComponentNotFound(String),

    /// Failure from the component instantiation or invocation collaborator
    #[error("component error: {0}")]
    Component(String),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
