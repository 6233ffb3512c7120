use thiserror::Error;

use super::BoxFuture;
use crate::roles::CaseUserRole;

#[derive(Debug, Error)]
pub enum RoleAssignmentError {
    #[error("role assignment bad request: {body}")]
    BadRequest { body: String },
    #[error("role assignment conflict: {body}")]
    Conflict { body: String },
    #[error("role assignment unauthorized: {0}")]
    Unauthorized(String),
    #[error("role assignment transport error: {0}")]
    Transport(String),
    #[error("role assignment upstream error: status {status}: {body}")]
    Upstream { status: u16, body: String },
}

impl RoleAssignmentError {
    /// Raw error body, where the response carried one. Classification reads
    /// this; transport errors have nothing to classify.
    pub fn body(&self) -> Option<&str> {
        match self {
            RoleAssignmentError::BadRequest { body }
            | RoleAssignmentError::Conflict { body }
            | RoleAssignmentError::Upstream { body, .. } => Some(body),
            RoleAssignmentError::Unauthorized(_) | RoleAssignmentError::Transport(_) => None,
        }
    }
}

/// One of the two divergent authorization backends, chosen at construction
/// time from configuration. Both accept the same `case_users` body; they
/// differ in base URL and error envelope.
pub trait RoleAssignmentBackend: Send + Sync {
    fn grant(
        &self,
        user_token: &str,
        case_users: &[CaseUserRole],
    ) -> BoxFuture<'_, Result<(), RoleAssignmentError>>;

    fn revoke(
        &self,
        user_token: &str,
        case_users: &[CaseUserRole],
    ) -> BoxFuture<'_, Result<(), RoleAssignmentError>>;
}
