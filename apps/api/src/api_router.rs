use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use huddle_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

use cors::build_cors_layer;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route(
            "/api/groups",
            get(handlers::groups::list_groups_handler)
                .post(handlers::groups::create_group_handler),
        )
        .route(
            "/api/groups/{group_id}",
            get(handlers::groups::get_group_handler).delete(handlers::groups::delete_group_handler),
        )
        .route(
            "/api/groups/{group_id}/quit",
            post(handlers::groups::quit_group_handler),
        )
        .route(
            "/api/groups/{group_id}/fallback-permissions",
            put(handlers::groups::update_fallback_permissions_handler),
        )
        .route(
            "/api/groups/{group_id}/permissions",
            get(handlers::permissions::group_permissions_handler),
        )
        .route(
            "/api/groups/{group_id}/permissions/check",
            post(handlers::permissions::check_permissions_handler),
        )
        .route(
            "/api/groups/{group_id}/roles",
            post(handlers::groups::create_group_role_handler),
        )
        .route(
            "/api/groups/{group_id}/roles/{role_id}",
            delete(handlers::groups::delete_group_role_handler),
        )
        .route(
            "/api/groups/{group_id}/roles/{role_id}/name",
            put(handlers::groups::update_group_role_name_handler),
        )
        .route(
            "/api/groups/{group_id}/roles/{role_id}/permissions",
            put(handlers::groups::update_group_role_permissions_handler),
        )
        .route(
            "/api/groups/{group_id}/panels",
            post(handlers::groups::create_group_panel_handler),
        )
        .route(
            "/api/groups/{group_id}/panels/{panel_id}",
            put(handlers::groups::modify_group_panel_handler)
                .delete(handlers::groups::delete_group_panel_handler),
        )
        .route(
            "/api/groups/{group_id}/panels/{panel_id}/permissions",
            get(handlers::permissions::panel_permissions_handler),
        )
        .route(
            "/api/groups/{group_id}/panels/{panel_id}/permission-definitions",
            get(handlers::permissions::panel_permission_definitions_handler),
        )
        .route(
            "/api/groups/{group_id}/panels/{panel_id}/messages/check",
            post(handlers::permissions::message_permission_handler),
        )
        .route(
            "/api/groups/{group_id}/members",
            post(handlers::groups::add_group_members_handler),
        )
        .route(
            "/api/groups/{group_id}/members/roles/append",
            post(handlers::groups::append_member_roles_handler),
        )
        .route(
            "/api/groups/{group_id}/members/roles/remove",
            post(handlers::groups::remove_member_roles_handler),
        )
        .route(
            "/api/groups/{group_id}/members/{member_id}",
            delete(handlers::groups::kick_group_member_handler),
        )
        .route(
            "/api/groups/{group_id}/members/{member_id}/mute",
            put(handlers::groups::mute_group_member_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_actor,
        ));

    let cors_layer = build_cors_layer(frontend_url, app_state.actor_header.clone())?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/api/permissions",
            get(handlers::permissions::list_permission_definitions_handler),
        )
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
