//! Transport-level errors reported by [`HostingFsService`](crate::HostingFsService) adapters.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors returned by hosting filesystem transports and the response-envelope adapter.
pub enum HostApiError {
    /// The requested path does not exist in the domain scope.
    #[error("path `{0}` not found")]
    NotFound(String),
    /// Opaque backend failure; the message is passed through unchanged.
    #[error("{0}")]
    Server(String),
    /// A payload did not match any known response envelope.
    #[error("invalid response format: {0}")]
    InvalidResponse(String),
    /// The active transport does not implement the operation.
    #[error("hosting fs unavailable: {0}")]
    Unsupported(&'static str),
}
