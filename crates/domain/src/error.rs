use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("case not found")]
    CaseNotFound,
    #[error("case state is out of date, restart the update")]
    StaleCaseState,
    #[error("notice of change slot index {index} is out of range for case {case_id}")]
    SlotIndexOutOfRange { case_id: i64, index: usize },
    #[error("case store error: {0}")]
    Backend(String),
}
