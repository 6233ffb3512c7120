use serde_json::json;

use tribunal_domain::ports::role_assignment::{RoleAssignmentBackend, RoleAssignmentError};
use tribunal_domain::ports::BoxFuture;
use tribunal_domain::roles::CaseUserRole;

use crate::case_store::map_role_assignment_status;
use crate::config::AppConfig;
use crate::service_auth::ServiceTokenProvider;

const SERVICE_AUTHORIZATION_HEADER: &str = "ServiceAuthorization";

/// The modern authorization strategy: the standalone role-assignment
/// service. Same `case_users` body as the legacy endpoint; the difference
/// is the richer error envelope its rejections carry, which classification
/// reads downstream.
#[derive(Clone)]
pub struct RoleAssignmentServiceClient {
    http: reqwest::Client,
    base_url: String,
    service_tokens: ServiceTokenProvider,
}

impl RoleAssignmentServiceClient {
    pub fn from_config(config: &AppConfig, http: reqwest::Client) -> Self {
        Self {
            http: http.clone(),
            base_url: config
                .role_assignment_base_url
                .trim_end_matches('/')
                .to_string(),
            service_tokens: ServiceTokenProvider::from_config(config, http),
        }
    }

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
                .map_err(|err| RoleAssignmentError::Transport(format!("service auth: {err}")))?;
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

impl RoleAssignmentBackend for RoleAssignmentServiceClient {
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
