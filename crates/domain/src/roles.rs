use serde::{Deserialize, Serialize};

/// Access roles the authorization backends understand. The bracket-tagged
/// wire form is treated as opaque by the store; unknown tags are rejected at
/// the parse boundary, before any network call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseRole {
    #[serde(rename = "[CREATOR]")]
    Creator,
    #[serde(rename = "[DEFENDANT]")]
    Defendant,
    #[serde(rename = "[CLAIMANT_SOLICITOR]")]
    ClaimantSolicitor,
    #[serde(rename = "[RESPONDENT_SOLICITOR]")]
    RespondentSolicitor,
}

impl CaseRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "[CREATOR]" => Some(CaseRole::Creator),
            "[DEFENDANT]" => Some(CaseRole::Defendant),
            "[CLAIMANT_SOLICITOR]" => Some(CaseRole::ClaimantSolicitor),
            "[RESPONDENT_SOLICITOR]" => Some(CaseRole::RespondentSolicitor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseRole::Creator => "[CREATOR]",
            CaseRole::Defendant => "[DEFENDANT]",
            CaseRole::ClaimantSolicitor => "[CLAIMANT_SOLICITOR]",
            CaseRole::RespondentSolicitor => "[RESPONDENT_SOLICITOR]",
        }
    }
}

/// Closed set of batch operations. Parsed once at the API boundary from the
/// exact request strings; everything past the boundary works with the enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModificationType {
    Assignment,
    Revoke,
}

impl ModificationType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Assignment" => Some(ModificationType::Assignment),
            "Revoke" => Some(ModificationType::Revoke),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModificationType::Assignment => "Assignment",
            ModificationType::Revoke => "Revoke",
        }
    }
}

/// One `(case, user, role)` tuple as both authorization backends accept it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CaseUserRole {
    pub case_data_id: String,
    pub user_id: String,
    pub case_role: CaseRole,
}
