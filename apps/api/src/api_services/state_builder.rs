use std::str::FromStr;
use std::sync::Arc;

use axum::http::HeaderName;
use huddle_application::{
    AuditRepository, GroupAuthorizationService, GroupRepository, GroupService,
    load_permission_catalog,
};
use huddle_core::AppError;
use huddle_infrastructure::{
    InMemoryGroupRepository, JsonPluginPermissionRegistry, PostgresAuditRepository,
    PostgresGroupRepository, TracingAuditRepository,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

struct RepositorySet {
    group_repository: Arc<dyn GroupRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

fn build_repository_set(pool: Option<PgPool>) -> RepositorySet {
    match pool {
        Some(pool) => RepositorySet {
            group_repository: Arc::new(PostgresGroupRepository::new(pool.clone())),
            audit_repository: Arc::new(PostgresAuditRepository::new(pool)),
        },
        None => RepositorySet {
            group_repository: Arc::new(InMemoryGroupRepository::new()),
            audit_repository: Arc::new(TracingAuditRepository::new()),
        },
    }
}

pub async fn build_app_state(pool: Option<PgPool>, config: &ApiConfig) -> Result<AppState, AppError> {
    let registry = JsonPluginPermissionRegistry::new(config.plugin_permissions_path.clone());
    let catalog = Arc::new(load_permission_catalog(&registry).await?);

    let actor_header = HeaderName::from_str(&config.actor_header).map_err(|error| {
        AppError::Validation(format!(
            "invalid ACTOR_HEADER '{}': {error}",
            config.actor_header
        ))
    })?;

    let repositories = build_repository_set(pool);
    let authorization_service =
        GroupAuthorizationService::new(catalog, repositories.group_repository.clone());
    let group_service = GroupService::new(
        authorization_service.clone(),
        repositories.group_repository,
        repositories.audit_repository,
    );

    Ok(AppState {
        group_service,
        authorization_service,
        actor_header,
    })
}
