//! Error kinds surfaced by the file manager controllers.

use panel_host::HostApiError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors reported to the user as inline notices.
pub enum FileManagerError {
    /// The path does not exist; listings fall back to the parent directory.
    #[error("`{0}` was not found")]
    NotFound(String),
    /// The request exceeded its timeout.
    #[error("request timed out after {0} ms")]
    Timeout(u64),
    /// A payload matched none of the known response envelopes.
    #[error("invalid response format: {0}")]
    InvalidResponseShape(String),
    /// User input was rejected before any request was issued.
    #[error("{0}")]
    Validation(String),
    /// Opaque backend failure.
    #[error("{0}")]
    Server(String),
    /// At least one request of a concurrent batch failed.
    #[error("{failed} of {total} operations failed: {first}")]
    BatchPartialFailure {
        /// Number of failed sub-operations.
        failed: usize,
        /// Number of sub-operations in the batch.
        total: usize,
        /// Message of the first failure.
        first: String,
    },
    /// The embedded editor widget faulted.
    #[error("editor failed: {0}")]
    Editor(String),
}

impl FileManagerError {
    /// Shorthand for a [`FileManagerError::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns `true` for [`FileManagerError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Folds a batch's sub-results into a single outcome.
    ///
    /// # Errors
    ///
    /// Returns [`FileManagerError::BatchPartialFailure`] when any sub-result failed.
    pub fn collect_batch<T>(results: Vec<Result<T, FileManagerError>>) -> Result<Vec<T>, Self> {
        let total = results.len();
        let mut values = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(value) => values.push(value),
                Err(err) => failures.push(err),
            }
        }
        match failures.first() {
            None => Ok(values),
            Some(first) => Err(Self::BatchPartialFailure {
                failed: failures.len(),
                total,
                first: first.to_string(),
            }),
        }
    }
}

impl From<HostApiError> for FileManagerError {
    fn from(err: HostApiError) -> Self {
        match err {
            HostApiError::NotFound(path) => Self::NotFound(path),
            HostApiError::Server(message) => Self::Server(message),
            HostApiError::InvalidResponse(detail) => Self::InvalidResponseShape(detail),
            unsupported @ HostApiError::Unsupported(_) => Self::Server(unsupported.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_errors_map_to_user_facing_kinds() {
        assert_eq!(
            FileManagerError::from(HostApiError::NotFound("logs".to_string())),
            FileManagerError::NotFound("logs".to_string())
        );
        assert_eq!(
            FileManagerError::from(HostApiError::InvalidResponse("x".to_string())),
            FileManagerError::InvalidResponseShape("x".to_string())
        );
        assert_eq!(
            FileManagerError::from(HostApiError::Unsupported("copy_item")),
            FileManagerError::Server("hosting fs unavailable: copy_item".to_string())
        );
    }

    #[test]
    fn collect_batch_reports_single_aggregate_failure() {
        let results = vec![
            Ok(1),
            Err(FileManagerError::Server("locked".to_string())),
            Ok(3),
        ];
        let err = FileManagerError::collect_batch(results).expect_err("one failed");
        assert_eq!(
            err,
            FileManagerError::BatchPartialFailure {
                failed: 1,
                total: 3,
                first: "locked".to_string(),
            }
        );
        assert_eq!(err.to_string(), "1 of 3 operations failed: locked");

        let ok = FileManagerError::collect_batch::<u8>(vec![Ok(1), Ok(2)]).expect("all ok");
        assert_eq!(ok, vec![1, 2]);
    }
}
