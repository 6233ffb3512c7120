use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use tribunal_domain::case::{CaseData, CaseDetails, CaseReference, JurisdictionShard};
use tribunal_domain::ports::case_events::{
    CaseEventsApi, CaseEventsError, EventSubmission, StartEventResponse,
};
use tribunal_domain::ports::case_search::{
    CaseSearchError, CaseSearchQuery, CaseSearchResult, CaseSearchStore,
};
use tribunal_domain::ports::role_assignment::{RoleAssignmentBackend, RoleAssignmentError};
use tribunal_domain::ports::BoxFuture;
use tribunal_domain::roles::CaseUserRole;

use crate::config::AppConfig;
use crate::service_auth::{ServiceAuthError, ServiceTokenProvider};

const SERVICE_AUTHORIZATION_HEADER: &str = "ServiceAuthorization";
const SEARCH_PAGE_SIZE: usize = 50;

/// Client for the sharded case store: structured search, the two-phase
/// event protocol, and the legacy `/case-users` role endpoint.
#[derive(Clone)]
pub struct CaseStoreClient {
    http: reqwest::Client,
    base_url: String,
    service_tokens: ServiceTokenProvider,
}

impl CaseStoreClient {
    pub fn from_config(config: &AppConfig, http: reqwest::Client) -> Self {
        Self {
            http: http.clone(),
            base_url: config.case_store_base_url.trim_end_matches('/').to_string(),
            service_tokens: ServiceTokenProvider::from_config(config, http),
        }
    }

    pub fn new(base_url: &str, http: reqwest::Client, service_tokens: ServiceTokenProvider) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_tokens,
        }
    }
}

/// Serializes the structured criteria to the store's term query language.
/// Only present criteria contribute clauses; all clauses combine with AND.
pub fn build_search_query(query: &CaseSearchQuery) -> Value {
    let mut must = Vec::new();
    if let Some(reference) = &query.submission_reference {
        must.push(json!({ "match": { "reference.keyword": reference } }));
    }
    if let Some(respondent) = &query.respondent_name {
        must.push(json!({ "match": { "data.respondents.name.keyword": respondent } }));
    }
    if let Some(first_name) = &query.claimant_first_name {
        must.push(json!({ "match": { "data.claimantFirstName.keyword": first_name } }));
    }
    if let Some(last_name) = &query.claimant_last_name {
        must.push(json!({ "match": { "data.claimantLastName.keyword": last_name } }));
    }
    json!({
        "size": SEARCH_PAGE_SIZE,
        "query": { "bool": { "must": must } }
    })
}

#[derive(Debug, Deserialize)]
struct SearchResponseWire {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    cases: Vec<CaseSummaryWire>,
}

#[derive(Debug, Deserialize)]
struct CaseSummaryWire {
    id: i64,
    #[serde(default)]
    state: String,
}

#[derive(Debug, Deserialize)]
struct StartEventWire {
    token: String,
    case_details: CaseDetailsWire,
}

#[derive(Debug, Deserialize)]
struct CaseDetailsWire {
    id: i64,
    #[serde(default)]
    state: String,
    #[serde(default)]
    case_data: CaseData,
}

impl CaseSearchStore for CaseStoreClient {
    fn search(
        &self,
        user_token: &str,
        shard: JurisdictionShard,
        query: &CaseSearchQuery,
    ) -> BoxFuture<'_, Result<CaseSearchResult, CaseSearchError>> {
        let user_token = user_token.to_string();
        let body = build_search_query(query);
        Box::pin(async move {
            let service_token = self
                .service_tokens
                .lease()
                .await
                .map_err(|err| CaseSearchError::Transport(service_auth_message(err)))?;
            let url = format!("{}/searchCases", self.base_url);
            let response = self
                .http
                .post(&url)
                .query(&[("ctid", shard.case_type_id())])
                .bearer_auth(&user_token)
                .header(SERVICE_AUTHORIZATION_HEADER, service_token)
                .json(&body)
                .send()
                .await
                .map_err(|err| CaseSearchError::Transport(err.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(CaseSearchError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }
            let wire = response
                .json::<SearchResponseWire>()
                .await
                .map_err(|err| CaseSearchError::InvalidResponse(err.to_string()))?;
            Ok(CaseSearchResult {
                total: wire.total,
                cases: wire
                    .cases
                    .into_iter()
                    .map(|case| CaseReference {
                        id: case.id,
                        shard,
                        state: case.state,
                    })
                    .collect(),
            })
        })
    }
}

impl CaseEventsApi for CaseStoreClient {
    fn start_event(
        &self,
        user_token: &str,
        shard: JurisdictionShard,
        case_id: i64,
        event_id: &str,
    ) -> BoxFuture<'_, Result<StartEventResponse, CaseEventsError>> {
        let user_token = user_token.to_string();
        let event_id = event_id.to_string();
        Box::pin(async move {
            let service_token = self
                .service_tokens
                .lease()
                .await
                .map_err(|err| CaseEventsError::Transport(service_auth_message(err)))?;
            let url = format!(
                "{}/cases/{case_id}/event-triggers/{event_id}",
                self.base_url
            );
            let response = self
                .http
                .get(&url)
                .query(&[("ctid", shard.case_type_id())])
                .bearer_auth(&user_token)
                .header(SERVICE_AUTHORIZATION_HEADER, service_token)
                .send()
                .await
                .map_err(|err| CaseEventsError::Transport(err.to_string()))?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Err(CaseEventsError::CaseNotFound(case_id));
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(CaseEventsError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }
            let wire = response
                .json::<StartEventWire>()
                .await
                .map_err(|err| CaseEventsError::InvalidResponse(err.to_string()))?;
            Ok(StartEventResponse {
                token: wire.token,
                case_details: CaseDetails {
                    reference: CaseReference {
                        id: wire.case_details.id,
                        shard,
                        state: wire.case_details.state,
                    },
                    data: wire.case_details.case_data,
                },
            })
        })
    }

    fn submit_event(
        &self,
        user_token: &str,
        shard: JurisdictionShard,
        case_id: i64,
        submission: &EventSubmission,
    ) -> BoxFuture<'_, Result<CaseReference, CaseEventsError>> {
        let user_token = user_token.to_string();
        let body = json!({
            "event": { "id": submission.event_id },
            "event_token": submission.event_token,
            "data": submission.data,
            "ignore_warning": submission.ignore_warning,
        });
        Box::pin(async move {
            let service_token = self
                .service_tokens
                .lease()
                .await
                .map_err(|err| CaseEventsError::Transport(service_auth_message(err)))?;
            let url = format!("{}/cases/{case_id}/events", self.base_url);
            let response = self
                .http
                .post(&url)
                .query(&[("ctid", shard.case_type_id())])
                .bearer_auth(&user_token)
                .header(SERVICE_AUTHORIZATION_HEADER, service_token)
                .json(&body)
                .send()
                .await
                .map_err(|err| CaseEventsError::Transport(err.to_string()))?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Err(CaseEventsError::CaseNotFound(case_id));
            }
            if status == StatusCode::CONFLICT || status == StatusCode::PRECONDITION_FAILED {
                let body = response.text().await.unwrap_or_default();
                return Err(CaseEventsError::StaleState(body));
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(CaseEventsError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }
            let wire = response
                .json::<CaseSummaryWire>()
                .await
                .map_err(|err| CaseEventsError::InvalidResponse(err.to_string()))?;
            Ok(CaseReference {
                id: wire.id,
                shard,
                state: wire.state,
            })
        })
    }
}

/// The legacy authorization strategy: role grants go straight to the case
/// store's `/case-users` endpoint.
impl RoleAssignmentBackend for CaseStoreClient {
    fn grant(
        &self,
        user_token: &str,
        case_users: &[CaseUserRole],
    ) -> BoxFuture<'_, Result<(), RoleAssignmentError>> {
        self.modify_case_users(user_token, reqwest::Method::POST, case_users)
    }

    fn revoke(
        &self,
        user_token: &str,
        case_users: &[CaseUserRole],
    ) -> BoxFuture<'_, Result<(), RoleAssignmentError>> {
        self.modify_case_users(user_token, reqwest::Method::DELETE, case_users)
    }
}

impl CaseStoreClient {
    fn modify_case_users(
        &self,
        user_token: &str,
        method: reqwest::Method,
        case_users: &[CaseUserRole],
    ) -> BoxFuture<'_, Result<(), RoleAssignmentError>> {
        let user_token = user_token.to_string();
        let body = json!({ "case_users": case_users });
        Box::pin(async move {
            let service_token = self
                .service_tokens
                .lease()
                .await
                .map_err(|err| RoleAssignmentError::Transport(service_auth_message(err)))?;
            let url = format!("{}/case-users", self.base_url);
            let response = self
                .http
                .request(method, &url)
                .bearer_auth(&user_token)
                .header(SERVICE_AUTHORIZATION_HEADER, service_token)
                .json(&body)
                .send()
                .await
                .map_err(|err| RoleAssignmentError::Transport(err.to_string()))?;
            map_role_assignment_status(response).await
        })
    }
}

pub(crate) async fn map_role_assignment_status(
    response: reqwest::Response,
) -> Result<(), RoleAssignmentError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::BAD_REQUEST => Err(RoleAssignmentError::BadRequest { body }),
        StatusCode::CONFLICT => Err(RoleAssignmentError::Conflict { body }),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(RoleAssignmentError::Unauthorized(body))
        }
        _ => Err(RoleAssignmentError::Upstream {
            status: status.as_u16(),
            body,
        }),
    }
}

fn service_auth_message(err: ServiceAuthError) -> String {
    format!("service auth: {err}")
}
