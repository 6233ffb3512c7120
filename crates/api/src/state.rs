use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;

use tribunal_domain::assignment::RoleAssignmentGateway;
use tribunal_domain::events::EventCoordinator;
use tribunal_domain::modification::RoleModificationOrchestrator;
use tribunal_domain::ports::case_events::CaseEventsApi;
use tribunal_domain::ports::case_search::CaseSearchStore;
use tribunal_domain::ports::idam::IdentityProvider;
use tribunal_domain::ports::role_assignment::RoleAssignmentBackend;
use tribunal_domain::search::ShardedCaseSearch;
use tribunal_infra::case_store::CaseStoreClient;
use tribunal_infra::config::AppConfig;
use tribunal_infra::idam::IdamClient;
use tribunal_infra::role_service::RoleAssignmentServiceClient;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub orchestrator: RoleModificationOrchestrator,
    /// Present when remote token resolution is configured; the auth
    /// middleware falls back to local JWT validation otherwise.
    pub identity: Option<Arc<dyn IdentityProvider>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms.max(1)))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let case_store = Arc::new(CaseStoreClient::from_config(&config, http.clone()));
        let backend: Arc<dyn RoleAssignmentBackend> =
            match config.role_assignment_backend.as_str() {
                "case-store" => case_store.clone(),
                "assignment-service" => {
                    Arc::new(RoleAssignmentServiceClient::from_config(&config, http.clone()))
                }
                other => bail!("unknown role assignment backend: {other}"),
            };
        let idam = Arc::new(IdamClient::from_config(&config, http));
        let identity = config
            .idam_enabled()
            .then(|| idam.clone() as Arc<dyn IdentityProvider>);

        Ok(Self::assemble(
            config,
            case_store.clone(),
            case_store,
            backend,
            idam,
            identity,
        ))
    }

    /// Wires the orchestrator from explicit ports. Tests inject mocks here.
    pub fn with_ports(
        config: AppConfig,
        search_store: Arc<dyn CaseSearchStore>,
        events_api: Arc<dyn CaseEventsApi>,
        backend: Arc<dyn RoleAssignmentBackend>,
        idam: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self::assemble(config, search_store, events_api, backend, idam, None)
    }

    fn assemble(
        config: AppConfig,
        search_store: Arc<dyn CaseSearchStore>,
        events_api: Arc<dyn CaseEventsApi>,
        backend: Arc<dyn RoleAssignmentBackend>,
        idam: Arc<dyn IdentityProvider>,
        identity: Option<Arc<dyn IdentityProvider>>,
    ) -> Self {
        let orchestrator = RoleModificationOrchestrator::new(
            ShardedCaseSearch::new(search_store),
            EventCoordinator::new(events_api),
            RoleAssignmentGateway::new(backend),
            idam,
        );
        Self {
            config,
            orchestrator,
            identity,
        }
    }
}
