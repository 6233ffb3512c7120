use thiserror::Error;

use super::BoxFuture;
use crate::case::{CaseReference, JurisdictionShard};

/// Structured filter over one shard. Each term is optional; present terms
/// combine with logical AND.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaseSearchQuery {
    pub submission_reference: Option<String>,
    pub respondent_name: Option<String>,
    pub claimant_first_name: Option<String>,
    pub claimant_last_name: Option<String>,
}

impl CaseSearchQuery {
    pub fn is_empty(&self) -> bool {
        self.submission_reference.is_none()
            && self.respondent_name.is_none()
            && self.claimant_first_name.is_none()
            && self.claimant_last_name.is_none()
    }
}

#[derive(Clone, Debug, Default)]
pub struct CaseSearchResult {
    pub total: u64,
    pub cases: Vec<CaseReference>,
}

#[derive(Debug, Error)]
pub enum CaseSearchError {
    #[error("case store transport error: {0}")]
    Transport(String),
    #[error("case store upstream error: status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("case store response decode error: {0}")]
    InvalidResponse(String),
}

pub trait CaseSearchStore: Send + Sync {
    fn search(
        &self,
        user_token: &str,
        shard: JurisdictionShard,
        query: &CaseSearchQuery,
    ) -> BoxFuture<'_, Result<CaseSearchResult, CaseSearchError>>;
}
