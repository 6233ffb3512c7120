use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assignment::{AssignmentOutcome, RoleAssignmentGateway};
use crate::case::{CaseReference, JurisdictionShard};
use crate::error::DomainError;
use crate::events::{EventCoordinator, UPDATE_CASE_SUBMITTED};
use crate::identity::UserInfo;
use crate::noc;
use crate::ports::case_search::CaseSearchQuery;
use crate::ports::idam::IdentityProvider;
use crate::roles::{CaseRole, CaseUserRole, ModificationType};
use crate::search::ShardedCaseSearch;
use crate::DomainResult;

pub const EMPTY_REQUEST_MESSAGE: &str = "Request to modify roles is empty";

/// One entry of a role-modification batch as received from the portal.
/// `user_id` may be omitted to mean "the calling user"; `case_role` stays a
/// string until validation so a bad role is reported per item.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyCaseUserRole {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_full_name: Option<String>,
    pub case_data_id: String,
    pub case_type_id: String,
    pub case_role: String,
    #[serde(default)]
    pub respondent_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyCaseUserRolesRequest {
    #[serde(default)]
    pub case_user_roles: Vec<ModifyCaseUserRole>,
}

/// Per-item report. The batch never aborts on one bad item; callers read
/// partial success out of this list.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutcome {
    pub case_data_id: String,
    #[serde(flatten)]
    pub outcome: AssignmentOutcome,
}

/// Follow-up case mutation owed after a successful grant or revoke, run
/// through the start/submit event protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
enum PostUpdate {
    /// A defendant took up their role: record their idam id against the
    /// respondent entry of the same name.
    LinkRespondent {
        shard: JurisdictionShard,
        case_id: i64,
        respondent_name: String,
        user_id: String,
    },
    /// A respondent representative lost their role: clear the
    /// notice-of-change slot for that respondent so a new representative can
    /// apply.
    ResetNoticeOfChange {
        shard: JurisdictionShard,
        case_id: i64,
        respondent_name: String,
    },
}

struct ValidatedItem {
    case_data_id: String,
    role: CaseRole,
    respondent_name: Option<String>,
    event_target: Option<(JurisdictionShard, i64)>,
}

/// Entry point for the role-modification surface: validates the request,
/// resolves user identity, drives the gateway per item, and applies the
/// follow-up case mutations.
#[derive(Clone)]
pub struct RoleModificationOrchestrator {
    search: ShardedCaseSearch,
    events: EventCoordinator,
    gateway: RoleAssignmentGateway,
    identity: Arc<dyn IdentityProvider>,
}

impl RoleModificationOrchestrator {
    pub fn new(
        search: ShardedCaseSearch,
        events: EventCoordinator,
        gateway: RoleAssignmentGateway,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            search,
            events,
            gateway,
            identity,
        }
    }

    /// Locates the case the caller wants to modify roles on, searching the
    /// shards in their fixed order.
    pub async fn find_case_for_role_modification(
        &self,
        user_token: &str,
        query: &CaseSearchQuery,
    ) -> DomainResult<Option<CaseReference>> {
        if query.is_empty() {
            return Err(DomainError::Validation(
                "at least one search criterion is required".to_string(),
            ));
        }
        self.search
            .find_case(user_token, query)
            .await
            .map_err(|err| DomainError::Backend(err.to_string()))
    }

    /// Applies one modification type across all items, reporting per-item
    /// outcomes. Only an empty request fails the call as a whole; malformed
    /// items are reported in place, tagged with their `case_data_id`.
    pub async fn modify_case_user_roles(
        &self,
        user_token: &str,
        modification: ModificationType,
        request: &ModifyCaseUserRolesRequest,
    ) -> DomainResult<Vec<ItemOutcome>> {
        if request.case_user_roles.is_empty() {
            return Err(DomainError::Validation(EMPTY_REQUEST_MESSAGE.to_string()));
        }

        // The caller's identity is looked up at most once per batch.
        let mut caller: Option<UserInfo> = None;
        let mut outcomes = Vec::with_capacity(request.case_user_roles.len());
        for item in &request.case_user_roles {
            let outcome = self
                .modify_item(user_token, modification, item, &mut caller)
                .await;
            outcomes.push(ItemOutcome {
                case_data_id: item.case_data_id.trim().to_string(),
                outcome,
            });
        }
        Ok(outcomes)
    }

    async fn modify_item(
        &self,
        user_token: &str,
        modification: ModificationType,
        item: &ModifyCaseUserRole,
        caller: &mut Option<UserInfo>,
    ) -> AssignmentOutcome {
        let validated = match validate_item(item, modification) {
            Ok(validated) => validated,
            Err(message) => return AssignmentOutcome::Failed { message },
        };

        let user_id = match blank_to_none(item.user_id.as_deref()) {
            Some(user_id) => user_id.to_string(),
            None => match self.caller_uid(user_token, caller).await {
                Ok(uid) => uid,
                Err(message) => return AssignmentOutcome::Failed { message },
            },
        };

        let assignment = CaseUserRole {
            case_data_id: validated.case_data_id.clone(),
            user_id: user_id.clone(),
            case_role: validated.role,
        };

        let outcome = match self
            .gateway
            .modify(user_token, &assignment, modification)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    case_data_id = %assignment.case_data_id,
                    case_role = assignment.case_role.as_str(),
                    modification = modification.as_str(),
                    "role modification failed"
                );
                return AssignmentOutcome::Failed {
                    message: err.to_string(),
                };
            }
        };

        if matches!(
            outcome,
            AssignmentOutcome::Success | AssignmentOutcome::AlreadyAssigned
        ) {
            if let Some(update) = post_update_for(&validated, modification, &user_id) {
                if let Err(err) = self.apply_post_update(user_token, &update).await {
                    tracing::error!(
                        error = %err,
                        case_data_id = %validated.case_data_id,
                        "role modified but follow-up case update failed"
                    );
                    return AssignmentOutcome::Failed {
                        message: format!("role modified but case update failed: {err}"),
                    };
                }
            }
        }

        outcome
    }

    async fn caller_uid(
        &self,
        user_token: &str,
        caller: &mut Option<UserInfo>,
    ) -> Result<String, String> {
        if let Some(info) = caller {
            return Ok(info.uid.clone());
        }
        match self.identity.user_info(user_token).await {
            Ok(info) => {
                let uid = info.uid.clone();
                *caller = Some(info);
                Ok(uid)
            }
            Err(err) => Err(format!("unable to resolve user from bearer token: {err}")),
        }
    }

    async fn apply_post_update(&self, user_token: &str, update: &PostUpdate) -> DomainResult<()> {
        match update {
            PostUpdate::LinkRespondent {
                shard,
                case_id,
                respondent_name,
                user_id,
            } => {
                let started = self
                    .events
                    .start_update(user_token, *shard, *case_id, UPDATE_CASE_SUBMITTED)
                    .await?;
                let mut data = started.case_details.data.clone();
                match data.respondent_by_name_mut(respondent_name) {
                    Some(respondent) => respondent.idam_id = Some(user_id.clone()),
                    None => {
                        tracing::warn!(
                            case_id,
                            respondent_name = %respondent_name,
                            "no respondent of that name on the case, skipping link"
                        );
                        return Ok(());
                    }
                }
                self.events.submit_update(user_token, started, data).await?;
                Ok(())
            }
            PostUpdate::ResetNoticeOfChange {
                shard,
                case_id,
                respondent_name,
            } => {
                let started = self
                    .events
                    .start_update(user_token, *shard, *case_id, UPDATE_CASE_SUBMITTED)
                    .await?;
                let mut case = started.case_details.clone();
                let Some(index) = noc::find_index_by_respondent_name(&case, respondent_name)
                else {
                    tracing::warn!(
                        case_id,
                        respondent_name = %respondent_name,
                        "no notice of change slot for that respondent, skipping reset"
                    );
                    return Ok(());
                };
                noc::reset_slot(&mut case, index)?;
                self.events
                    .submit_update(user_token, started, case.data)
                    .await?;
                Ok(())
            }
        }
    }
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn validate_item(
    item: &ModifyCaseUserRole,
    modification: ModificationType,
) -> Result<ValidatedItem, String> {
    let case_data_id = blank_to_none(Some(item.case_data_id.as_str()))
        .ok_or("caseDataId must not be blank")?
        .to_string();
    let case_type_id = blank_to_none(Some(item.case_type_id.as_str()))
        .ok_or("caseTypeId must not be blank")?;
    let role_tag =
        blank_to_none(Some(item.case_role.as_str())).ok_or("caseRole must not be blank")?;

    let respondent_name = blank_to_none(item.respondent_name.as_deref());
    let user_full_name = blank_to_none(item.user_full_name.as_deref());
    if respondent_name.is_none() && user_full_name.is_none() {
        return Err("item must carry a respondent name or a user full name".to_string());
    }

    let role = CaseRole::parse(role_tag)
        .ok_or_else(|| format!("unrecognised case role: {role_tag}"))?;

    // The follow-up case mutation needs a resolvable shard and numeric case
    // id; require them up front so the grant is not left half-applied by an
    // item that can never complete.
    let needs_event = respondent_name.is_some()
        && matches!(
            (modification, role),
            (ModificationType::Assignment, CaseRole::Defendant)
                | (ModificationType::Revoke, CaseRole::RespondentSolicitor)
        );
    let event_target = if needs_event {
        let shard = JurisdictionShard::from_case_type_id(case_type_id)
            .ok_or_else(|| format!("unrecognised case type id: {case_type_id}"))?;
        let case_id = case_data_id
            .parse::<i64>()
            .map_err(|_| format!("caseDataId is not a valid case id: {case_data_id}"))?;
        Some((shard, case_id))
    } else {
        None
    };

    Ok(ValidatedItem {
        case_data_id,
        role,
        respondent_name: respondent_name.map(ToOwned::to_owned),
        event_target,
    })
}

fn post_update_for(
    validated: &ValidatedItem,
    modification: ModificationType,
    user_id: &str,
) -> Option<PostUpdate> {
    let (shard, case_id) = validated.event_target?;
    let respondent_name = validated.respondent_name.clone()?;
    match (modification, validated.role) {
        (ModificationType::Assignment, CaseRole::Defendant) => Some(PostUpdate::LinkRespondent {
            shard,
            case_id,
            respondent_name,
            user_id: user_id.to_string(),
        }),
        (ModificationType::Revoke, CaseRole::RespondentSolicitor) => {
            Some(PostUpdate::ResetNoticeOfChange {
                shard,
                case_id,
                respondent_name,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{CaseData, CaseDetails, Respondent};
    use crate::noc::NoticeOfChangeAnswers;
    use crate::ports::case_events::{
        CaseEventsApi, CaseEventsError, EventSubmission, StartEventResponse,
    };
    use crate::ports::case_search::{CaseSearchError, CaseSearchResult, CaseSearchStore};
    use crate::ports::idam::IdentityError;
    use crate::ports::role_assignment::{RoleAssignmentBackend, RoleAssignmentError};
    use crate::ports::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBackend {
        grants: Mutex<Vec<CaseUserRole>>,
        revokes: Mutex<Vec<CaseUserRole>>,
        fail_grant_with: Option<fn() -> RoleAssignmentError>,
    }

    impl RoleAssignmentBackend for RecordingBackend {
        fn grant(
            &self,
            _user_token: &str,
            case_users: &[CaseUserRole],
        ) -> BoxFuture<'_, Result<(), RoleAssignmentError>> {
            let case_users = case_users.to_vec();
            Box::pin(async move {
                self.grants.lock().expect("grants lock").extend(case_users);
                match self.fail_grant_with {
                    Some(make) => Err(make()),
                    None => Ok(()),
                }
            })
        }

        fn revoke(
            &self,
            _user_token: &str,
            case_users: &[CaseUserRole],
        ) -> BoxFuture<'_, Result<(), RoleAssignmentError>> {
            let case_users = case_users.to_vec();
            Box::pin(async move {
                self.revokes.lock().expect("revokes lock").extend(case_users);
                Ok(())
            })
        }
    }

    struct StubEventsApi {
        case_data: CaseData,
        submissions: Mutex<Vec<EventSubmission>>,
        start_calls: AtomicUsize,
    }

    impl StubEventsApi {
        fn with_data(case_data: CaseData) -> Self {
            Self {
                case_data,
                submissions: Mutex::new(Vec::new()),
                start_calls: AtomicUsize::new(0),
            }
        }
    }

    impl CaseEventsApi for StubEventsApi {
        fn start_event(
            &self,
            _user_token: &str,
            shard: JurisdictionShard,
            case_id: i64,
            _event_id: &str,
        ) -> BoxFuture<'_, Result<StartEventResponse, CaseEventsError>> {
            Box::pin(async move {
                self.start_calls.fetch_add(1, Ordering::SeqCst);
                Ok(StartEventResponse {
                    token: "tok-1".to_string(),
                    case_details: CaseDetails {
                        reference: CaseReference {
                            id: case_id,
                            shard,
                            state: "Submitted".to_string(),
                        },
                        data: self.case_data.clone(),
                    },
                })
            })
        }

        fn submit_event(
            &self,
            _user_token: &str,
            shard: JurisdictionShard,
            case_id: i64,
            submission: &EventSubmission,
        ) -> BoxFuture<'_, Result<CaseReference, CaseEventsError>> {
            let submission = submission.clone();
            Box::pin(async move {
                self.submissions
                    .lock()
                    .expect("submissions lock")
                    .push(submission);
                Ok(CaseReference {
                    id: case_id,
                    shard,
                    state: "Submitted".to_string(),
                })
            })
        }
    }

    struct StubIdentity {
        uid: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl StubIdentity {
        fn known(uid: &'static str) -> Self {
            Self {
                uid: Some(uid),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                uid: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl IdentityProvider for StubIdentity {
        fn user_info(&self, _bearer: &str) -> BoxFuture<'_, Result<UserInfo, IdentityError>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                match self.uid {
                    Some(uid) => Ok(UserInfo {
                        uid: uid.to_string(),
                        given_name: Some("Sam".to_string()),
                        family_name: Some("Birch".to_string()),
                    }),
                    None => Err(IdentityError::Unauthorized),
                }
            })
        }
    }

    struct EmptySearchStore;

    impl CaseSearchStore for EmptySearchStore {
        fn search(
            &self,
            _user_token: &str,
            _shard: JurisdictionShard,
            _query: &CaseSearchQuery,
        ) -> BoxFuture<'_, Result<CaseSearchResult, CaseSearchError>> {
            Box::pin(async { Ok(CaseSearchResult::default()) })
        }
    }

    struct Fixture {
        backend: Arc<RecordingBackend>,
        events: Arc<StubEventsApi>,
        identity: Arc<StubIdentity>,
        orchestrator: RoleModificationOrchestrator,
    }

    fn fixture_with(
        backend: RecordingBackend,
        events: StubEventsApi,
        identity: StubIdentity,
    ) -> Fixture {
        let backend = Arc::new(backend);
        let events = Arc::new(events);
        let identity = Arc::new(identity);
        let orchestrator = RoleModificationOrchestrator::new(
            ShardedCaseSearch::new(Arc::new(EmptySearchStore)),
            EventCoordinator::new(events.clone()),
            RoleAssignmentGateway::new(backend.clone()),
            identity.clone(),
        );
        Fixture {
            backend,
            events,
            identity,
            orchestrator,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(
            RecordingBackend::default(),
            StubEventsApi::with_data(CaseData::default()),
            StubIdentity::known("caller-uid"),
        )
    }

    fn defendant_item() -> ModifyCaseUserRole {
        ModifyCaseUserRole {
            user_id: Some("user-1".to_string()),
            user_full_name: Some("Sam Birch".to_string()),
            case_data_id: "1234567890123456".to_string(),
            case_type_id: "ET_EnglandWales".to_string(),
            case_role: "[DEFENDANT]".to_string(),
            respondent_name: None,
        }
    }

    #[tokio::test]
    async fn empty_request_fails_with_the_fixed_message() {
        let fixture = fixture();
        for modification in [ModificationType::Assignment, ModificationType::Revoke] {
            let err = fixture
                .orchestrator
                .modify_case_user_roles(
                    "bearer",
                    modification,
                    &ModifyCaseUserRolesRequest {
                        case_user_roles: vec![],
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                DomainError::Validation(message) if message == EMPTY_REQUEST_MESSAGE
            ));
        }
    }

    #[tokio::test]
    async fn single_valid_assignment_reports_success() {
        let fixture = fixture();
        let outcomes = fixture
            .orchestrator
            .modify_case_user_roles(
                "bearer",
                ModificationType::Assignment,
                &ModifyCaseUserRolesRequest {
                    case_user_roles: vec![defendant_item()],
                },
            )
            .await
            .expect("modify");

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].case_data_id, "1234567890123456");
        assert_eq!(outcomes[0].outcome, AssignmentOutcome::Success);

        let grants = fixture.backend.grants.lock().expect("grants lock");
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].user_id, "user-1");
        assert_eq!(grants[0].case_role, CaseRole::Defendant);
        // no respondent name on the item, so no follow-up event
        assert_eq!(fixture.events.start_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_item_is_reported_without_aborting_the_batch() {
        let fixture = fixture();
        let blank = ModifyCaseUserRole {
            case_data_id: "  ".to_string(),
            ..defendant_item()
        };
        let outcomes = fixture
            .orchestrator
            .modify_case_user_roles(
                "bearer",
                ModificationType::Assignment,
                &ModifyCaseUserRolesRequest {
                    case_user_roles: vec![blank, defendant_item()],
                },
            )
            .await
            .expect("modify");

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(
            &outcomes[0].outcome,
            AssignmentOutcome::Failed { message } if message.contains("caseDataId")
        ));
        assert_eq!(outcomes[1].outcome, AssignmentOutcome::Success);
        assert_eq!(fixture.backend.grants.lock().expect("grants lock").len(), 1);
    }

    #[tokio::test]
    async fn unknown_role_is_rejected_before_any_backend_call() {
        let fixture = fixture();
        let item = ModifyCaseUserRole {
            case_role: "[MANAGER]".to_string(),
            ..defendant_item()
        };
        let outcomes = fixture
            .orchestrator
            .modify_case_user_roles(
                "bearer",
                ModificationType::Assignment,
                &ModifyCaseUserRolesRequest {
                    case_user_roles: vec![item],
                },
            )
            .await
            .expect("modify");

        assert!(matches!(
            &outcomes[0].outcome,
            AssignmentOutcome::Failed { message } if message.contains("[MANAGER]")
        ));
        assert!(fixture.backend.grants.lock().expect("grants lock").is_empty());
    }

    #[tokio::test]
    async fn missing_user_id_is_resolved_through_the_identity_provider() {
        let fixture = fixture();
        let item = ModifyCaseUserRole {
            user_id: None,
            ..defendant_item()
        };
        let outcomes = fixture
            .orchestrator
            .modify_case_user_roles(
                "bearer",
                ModificationType::Assignment,
                &ModifyCaseUserRolesRequest {
                    case_user_roles: vec![item.clone(), item],
                },
            )
            .await
            .expect("modify");

        assert!(outcomes
            .iter()
            .all(|entry| entry.outcome == AssignmentOutcome::Success));
        let grants = fixture.backend.grants.lock().expect("grants lock");
        assert!(grants.iter().all(|grant| grant.user_id == "caller-uid"));
        // identity resolved once for the whole batch
        assert_eq!(fixture.identity.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn identity_failure_fails_only_the_items_needing_it() {
        let fixture = fixture_with(
            RecordingBackend::default(),
            StubEventsApi::with_data(CaseData::default()),
            StubIdentity::failing(),
        );
        let anonymous = ModifyCaseUserRole {
            user_id: None,
            ..defendant_item()
        };
        let outcomes = fixture
            .orchestrator
            .modify_case_user_roles(
                "bearer",
                ModificationType::Assignment,
                &ModifyCaseUserRolesRequest {
                    case_user_roles: vec![anonymous, defendant_item()],
                },
            )
            .await
            .expect("modify");

        assert!(matches!(
            &outcomes[0].outcome,
            AssignmentOutcome::Failed { message } if message.contains("bearer token")
        ));
        assert_eq!(outcomes[1].outcome, AssignmentOutcome::Success);
    }

    #[tokio::test]
    async fn defendant_assignment_links_the_respondent_idam_id() {
        let data = CaseData {
            respondents: vec![
                Respondent {
                    name: "Beta Plc".to_string(),
                    idam_id: None,
                },
                Respondent {
                    name: "Acme Ltd".to_string(),
                    idam_id: None,
                },
            ],
            ..CaseData::default()
        };
        let fixture = fixture_with(
            RecordingBackend::default(),
            StubEventsApi::with_data(data),
            StubIdentity::known("caller-uid"),
        );
        let item = ModifyCaseUserRole {
            respondent_name: Some("acme ltd".to_string()),
            ..defendant_item()
        };
        let outcomes = fixture
            .orchestrator
            .modify_case_user_roles(
                "bearer",
                ModificationType::Assignment,
                &ModifyCaseUserRolesRequest {
                    case_user_roles: vec![item],
                },
            )
            .await
            .expect("modify");

        assert_eq!(outcomes[0].outcome, AssignmentOutcome::Success);
        let submissions = fixture.events.submissions.lock().expect("submissions lock");
        assert_eq!(submissions.len(), 1);
        let respondents = &submissions[0].data.respondents;
        assert_eq!(respondents[0].idam_id, None);
        assert_eq!(respondents[1].idam_id.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn solicitor_revoke_resets_the_notice_of_change_slot() {
        let mut data = CaseData::default();
        data.notice_of_change_answers[4] = Some(NoticeOfChangeAnswers {
            respondent_name: Some("Acme Ltd".to_string()),
            claimant_first_name: Some("Jane".to_string()),
            claimant_last_name: Some("Doe".to_string()),
        });
        let fixture = fixture_with(
            RecordingBackend::default(),
            StubEventsApi::with_data(data),
            StubIdentity::known("caller-uid"),
        );
        let item = ModifyCaseUserRole {
            case_role: "[RESPONDENT_SOLICITOR]".to_string(),
            respondent_name: Some("Acme Ltd".to_string()),
            ..defendant_item()
        };
        let outcomes = fixture
            .orchestrator
            .modify_case_user_roles(
                "bearer",
                ModificationType::Revoke,
                &ModifyCaseUserRolesRequest {
                    case_user_roles: vec![item],
                },
            )
            .await
            .expect("modify");

        assert_eq!(outcomes[0].outcome, AssignmentOutcome::Success);
        assert_eq!(fixture.backend.revokes.lock().expect("revokes lock").len(), 1);
        let submissions = fixture.events.submissions.lock().expect("submissions lock");
        assert_eq!(submissions.len(), 1);
        assert!(submissions[0].data.notice_of_change_answers[4].is_none());
    }

    #[tokio::test]
    async fn unclassified_backend_failure_marks_the_item_failed() {
        let fixture = fixture_with(
            RecordingBackend {
                fail_grant_with: Some(|| RoleAssignmentError::Upstream {
                    status: 502,
                    body: "bad gateway".to_string(),
                }),
                ..RecordingBackend::default()
            },
            StubEventsApi::with_data(CaseData::default()),
            StubIdentity::known("caller-uid"),
        );
        let outcomes = fixture
            .orchestrator
            .modify_case_user_roles(
                "bearer",
                ModificationType::Assignment,
                &ModifyCaseUserRolesRequest {
                    case_user_roles: vec![defendant_item(), defendant_item()],
                },
            )
            .await
            .expect("modify");

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|entry| matches!(
            &entry.outcome,
            AssignmentOutcome::Failed { message } if message.contains("502")
        )));
    }

    #[tokio::test]
    async fn find_case_requires_at_least_one_criterion() {
        let fixture = fixture();
        let err = fixture
            .orchestrator
            .find_case_for_role_modification("bearer", &CaseSearchQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
