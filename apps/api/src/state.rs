use axum::http::HeaderName;
use huddle_application::{GroupAuthorizationService, GroupService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub group_service: GroupService,
    pub authorization_service: GroupAuthorizationService,
    pub actor_header: HeaderName,
}
