use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ports::role_assignment::{RoleAssignmentBackend, RoleAssignmentError};
use crate::roles::{CaseUserRole, ModificationType};

/// Marker the case store embeds in its error body when the role is already
/// held by this user. Matching is case-insensitive.
pub const ALREADY_ASSIGNED_MARKER: &str = "idam id already exists for this same user";

const PROFESSIONAL_ROLE_CATEGORY: &str = "PROFESSIONAL";

/// Per-assignment result. `AlreadyAssigned` and `ProfessionalUserConflict`
/// are terminal non-error outcomes: the orchestrator reports them, it never
/// re-raises them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentOutcome {
    Success,
    AlreadyAssigned,
    ProfessionalUserConflict,
    Failed { message: String },
}

/// The richer error envelope the modern authorization service returns on a
/// rejected grant. Only the role category is of interest here.
#[derive(Debug, Deserialize)]
struct RoleAssignmentErrorEnvelope {
    #[serde(rename = "roleAssignmentResponse")]
    role_assignment_response: Option<RoleAssignmentResponse>,
}

#[derive(Debug, Deserialize)]
struct RoleAssignmentResponse {
    #[serde(rename = "requestedRoles", default)]
    requested_roles: Vec<RequestedRole>,
}

#[derive(Debug, Deserialize)]
struct RequestedRole {
    #[serde(rename = "roleCategory")]
    role_category: Option<String>,
}

/// Classifies a backend rejection into a terminal outcome where the error is
/// conflict-equivalent, and hands everything else back untouched.
///
/// Role grants are not idempotent at either backend: re-granting a held role
/// errors. The already-assigned marker means the desired end state holds, so
/// it maps to a success-equivalent outcome. A `PROFESSIONAL` role category in
/// the envelope means the target user is registered as an organisation user
/// and cannot take a citizen role through this path. Structured parsing is
/// preferred; substring search on the raw body is the fallback when the body
/// is not the expected JSON shape.
pub fn classify(err: RoleAssignmentError) -> Result<AssignmentOutcome, RoleAssignmentError> {
    let Some(body) = err.body() else {
        return Err(err);
    };

    if body.to_ascii_lowercase().contains(ALREADY_ASSIGNED_MARKER) {
        return Ok(AssignmentOutcome::AlreadyAssigned);
    }

    match serde_json::from_str::<RoleAssignmentErrorEnvelope>(body) {
        Ok(envelope) => {
            let professional = envelope
                .role_assignment_response
                .map(|response| {
                    response.requested_roles.iter().any(|role| {
                        role.role_category.as_deref() == Some(PROFESSIONAL_ROLE_CATEGORY)
                    })
                })
                .unwrap_or(false);
            if professional {
                return Ok(AssignmentOutcome::ProfessionalUserConflict);
            }
        }
        Err(_) => {
            if body.contains(&format!("\"roleCategory\":\"{PROFESSIONAL_ROLE_CATEGORY}\"")) {
                return Ok(AssignmentOutcome::ProfessionalUserConflict);
            }
        }
    }

    Err(err)
}

/// Single grant/revoke entry point over whichever backend strategy was
/// configured. The modification type decides the backend verb; rejected
/// calls go through [`classify`] before surfacing.
#[derive(Clone)]
pub struct RoleAssignmentGateway {
    backend: Arc<dyn RoleAssignmentBackend>,
}

impl RoleAssignmentGateway {
    pub fn new(backend: Arc<dyn RoleAssignmentBackend>) -> Self {
        Self { backend }
    }

    /// `Ok` carries a terminal outcome; `Err` is an unclassified backend
    /// failure the caller decides how to attribute.
    pub async fn modify(
        &self,
        user_token: &str,
        assignment: &CaseUserRole,
        modification: ModificationType,
    ) -> Result<AssignmentOutcome, RoleAssignmentError> {
        let case_users = std::slice::from_ref(assignment);
        let result = match modification {
            ModificationType::Assignment => self.backend.grant(user_token, case_users).await,
            ModificationType::Revoke => self.backend.revoke(user_token, case_users).await,
        };
        match result {
            Ok(()) => Ok(AssignmentOutcome::Success),
            Err(err) => {
                let outcome = classify(err)?;
                tracing::info!(
                    case_data_id = %assignment.case_data_id,
                    case_role = assignment.case_role.as_str(),
                    outcome = ?outcome,
                    "role modification resolved by error classification"
                );
                Ok(outcome)
            }
        }
    }
}
