use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::BoxFuture;
use crate::case::{CaseData, CaseDetails, CaseReference, JurisdictionShard};

/// Token and current case state handed back by the store when an event is
/// opened. The token binds that read to the eventual submit.
#[derive(Clone, Debug)]
pub struct StartEventResponse {
    pub token: String,
    pub case_details: CaseDetails,
}

/// Payload for the second phase. `event_token` must be the value issued for
/// this case and event by the preceding start call.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EventSubmission {
    pub event_id: String,
    pub event_token: String,
    pub data: CaseData,
    pub ignore_warning: bool,
}

#[derive(Debug, Error)]
pub enum CaseEventsError {
    #[error("case {0} not found")]
    CaseNotFound(i64),
    #[error("event token no longer matches case state: {0}")]
    StaleState(String),
    #[error("case store transport error: {0}")]
    Transport(String),
    #[error("case store upstream error: status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("case store response decode error: {0}")]
    InvalidResponse(String),
}

pub trait CaseEventsApi: Send + Sync {
    fn start_event(
        &self,
        user_token: &str,
        shard: JurisdictionShard,
        case_id: i64,
        event_id: &str,
    ) -> BoxFuture<'_, Result<StartEventResponse, CaseEventsError>>;

    fn submit_event(
        &self,
        user_token: &str,
        shard: JurisdictionShard,
        case_id: i64,
        submission: &EventSubmission,
    ) -> BoxFuture<'_, Result<CaseReference, CaseEventsError>>;
}
