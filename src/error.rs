//! Error types for the collaborator services.

use thiserror::Error;

/// Failures surfaced by the extraction and generation collaborators.
///
/// `Unavailable` and `Empty` are terminal from the caller's point of view:
/// they are shown to the user as-is and never retried. Aggregate-level misuse
/// (removing an item that is not in the checklist) is a silent no-op and does
/// not appear here.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The model endpoint is missing or unreachable.
    #[error("model service is not available")]
    Unavailable,

    /// The model replied but produced no usable checklist structure.
    #[error("no checklist items were found in the input")]
    Empty,

    /// The model replied with something that could not be parsed.
    #[error("model returned an unusable response: {0}")]
    Invalid(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
