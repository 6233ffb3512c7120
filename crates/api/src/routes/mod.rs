use axum::extract::{Extension, Query, State};
use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use tribunal_domain::assignment::AssignmentOutcome;
use tribunal_domain::case::CaseReference;
use tribunal_domain::modification::{ItemOutcome, ModifyCaseUserRolesRequest};
use tribunal_domain::ports::case_search::CaseSearchQuery;
use tribunal_domain::roles::ModificationType;

use crate::middleware::AuthContext;
use crate::{error::ApiError, middleware as app_middleware, observability, state::AppState, validation};

const MODIFY_SUCCESS_MESSAGE: &str = "Successfully processed modify case user roles request";

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/manageCaseRole/modifyCaseUserRoles",
            post(modify_case_user_roles),
        )
        .route(
            "/manageCaseRole/findCaseForRoleModification",
            post(find_case_for_role_modification),
        )
        .route_layer(middleware::from_fn(app_middleware::require_auth_middleware));

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(protected)
        .layer(app_middleware::timeout_layer())
        .layer(app_middleware::trace_layer())
        .layer(app_middleware::set_request_id_layer())
        .layer(app_middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(app_middleware::metrics_layer))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            app_middleware::auth_middleware,
        ))
        .layer(middleware::from_fn(
            app_middleware::correlation_id_middleware,
        ));

    if !state.config.app_env.eq_ignore_ascii_case("test") {
        app = app.layer(app_middleware::rate_limit_layer());
    }

    app.with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.app_env.clone(),
    })
}

async fn metrics() -> impl IntoResponse {
    match observability::render_metrics() {
        Some(body) => (StatusCode::OK, body),
        None => (StatusCode::SERVICE_UNAVAILABLE, String::new()),
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct FindCaseForRoleModificationRequest {
    #[validate(length(min = 16, max = 16))]
    case_submission_reference: Option<String>,
    #[validate(length(min = 1, max = 256))]
    respondent_name: Option<String>,
    #[validate(length(min = 1, max = 128))]
    claimant_first_name: Option<String>,
    #[validate(length(min = 1, max = 128))]
    claimant_last_name: Option<String>,
}

async fn find_case_for_role_modification(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<FindCaseForRoleModificationRequest>,
) -> Result<Json<CaseReference>, ApiError> {
    validation::validate(&payload)?;
    let token = auth.bearer()?;

    let query = CaseSearchQuery {
        submission_reference: trimmed(payload.case_submission_reference),
        respondent_name: trimmed(payload.respondent_name),
        claimant_first_name: trimmed(payload.claimant_first_name),
        claimant_last_name: trimmed(payload.claimant_last_name),
    };

    match state
        .orchestrator
        .find_case_for_role_modification(token, &query)
        .await?
    {
        Some(case) => Ok(Json(case)),
        None => Err(ApiError::NotFound),
    }
}

#[derive(Debug, Deserialize)]
struct ModificationTypeParam {
    #[serde(rename = "modificationType")]
    modification_type: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModifyCaseUserRolesResponse {
    message: &'static str,
    outcomes: Vec<ItemOutcome>,
}

async fn modify_case_user_roles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<ModificationTypeParam>,
    Json(request): Json<ModifyCaseUserRolesRequest>,
) -> Result<Json<ModifyCaseUserRolesResponse>, ApiError> {
    let Some(modification) = ModificationType::parse(&params.modification_type) else {
        return Err(ApiError::Validation(format!(
            "modificationType must be \"Assignment\" or \"Revoke\", got \"{}\"",
            params.modification_type
        )));
    };
    let token = auth.bearer()?;

    let outcomes = state
        .orchestrator
        .modify_case_user_roles(token, modification, &request)
        .await?;

    for entry in &outcomes {
        observability::register_role_modification(
            modification.as_str(),
            outcome_label(&entry.outcome),
        );
    }

    Ok(Json(ModifyCaseUserRolesResponse {
        message: MODIFY_SUCCESS_MESSAGE,
        outcomes,
    }))
}

fn outcome_label(outcome: &AssignmentOutcome) -> &'static str {
    match outcome {
        AssignmentOutcome::Success => "success",
        AssignmentOutcome::AlreadyAssigned => "already_assigned",
        AssignmentOutcome::ProfessionalUserConflict => "professional_user_conflict",
        AssignmentOutcome::Failed { .. } => "failed",
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
