use std::sync::Arc;

use crate::case::{CaseData, CaseDetails, CaseReference, JurisdictionShard};
use crate::error::DomainError;
use crate::ports::case_events::{CaseEventsApi, CaseEventsError, EventSubmission};
use crate::DomainResult;

/// Event id used when this subsystem rewrites a submitted case record
/// (respondent linking, notice-of-change slot resets).
pub const UPDATE_CASE_SUBMITTED: &str = "UPDATE_CASE_SUBMITTED";

/// Opaque compare-and-swap credential issued by the store at start-event.
/// There is no public constructor: the only way to obtain one is through
/// [`EventCoordinator::start_update`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventToken(String);

impl EventToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An open event: the token plus the case state it was issued against.
/// Submitting consumes the value, so a token cannot be reused and a submit
/// cannot happen without the start that produced it.
#[derive(Debug)]
pub struct StartedEvent {
    case_id: i64,
    shard: JurisdictionShard,
    event_id: String,
    token: EventToken,
    pub case_details: CaseDetails,
}

impl StartedEvent {
    pub fn case_id(&self) -> i64 {
        self.case_id
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn token(&self) -> &EventToken {
        &self.token
    }
}

/// Two-phase optimistic-concurrency protocol against the case store:
/// `NEW -> STARTED(token) -> SUBMITTED`, no transition back. A failed submit
/// does not reopen the started state; callers restart the whole sequence for
/// a fresh token.
#[derive(Clone)]
pub struct EventCoordinator {
    api: Arc<dyn CaseEventsApi>,
}

impl EventCoordinator {
    pub fn new(api: Arc<dyn CaseEventsApi>) -> Self {
        Self { api }
    }

    /// Opens `event_id` on the case, returning the store's token bound to
    /// the current case state. A missing case is a fatal precondition
    /// failure, not something to retry.
    pub async fn start_update(
        &self,
        user_token: &str,
        shard: JurisdictionShard,
        case_id: i64,
        event_id: &str,
    ) -> DomainResult<StartedEvent> {
        let response = self
            .api
            .start_event(user_token, shard, case_id, event_id)
            .await
            .map_err(map_events_error)?;
        if response.token.trim().is_empty() {
            return Err(DomainError::Backend(
                "start event returned an empty token".to_string(),
            ));
        }
        Ok(StartedEvent {
            case_id,
            shard,
            event_id: event_id.to_string(),
            token: EventToken(response.token),
            case_details: response.case_details,
        })
    }

    /// Submits the new field values under the token obtained at start. The
    /// store rejects the submit when the token reflects stale state; that
    /// surfaces as [`DomainError::StaleCaseState`].
    pub async fn submit_update(
        &self,
        user_token: &str,
        started: StartedEvent,
        data: CaseData,
    ) -> DomainResult<CaseReference> {
        let submission = EventSubmission {
            event_id: started.event_id,
            event_token: started.token.0,
            data,
            ignore_warning: false,
        };
        self.api
            .submit_event(user_token, started.shard, started.case_id, &submission)
            .await
            .map_err(map_events_error)
    }
}

fn map_events_error(err: CaseEventsError) -> DomainError {
    match err {
        CaseEventsError::CaseNotFound(_) => DomainError::CaseNotFound,
        CaseEventsError::StaleState(_) => DomainError::StaleCaseState,
        other => DomainError::Backend(other.to_string()),
    }
}
