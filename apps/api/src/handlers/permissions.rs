use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use huddle_core::{ActorId, AppResult};
use huddle_domain::{GroupId, PanelId, PermissionKey};

use crate::dto::{
    CheckPermissionsRequest, CheckPermissionsResponse, PermissionDefinitionResponse,
    PermissionSetResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_permission_definitions_handler(
    State(state): State<AppState>,
) -> Json<Vec<PermissionDefinitionResponse>> {
    let definitions = state
        .authorization_service
        .catalog()
        .list_definitions()
        .iter()
        .cloned()
        .map(PermissionDefinitionResponse::from)
        .collect();

    Json(definitions)
}

pub async fn group_permissions_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path(group_id): Path<String>,
) -> ApiResult<Json<PermissionSetResponse>> {
    let permissions = state
        .authorization_service
        .group_permissions(&actor, GroupId::parse(&group_id)?)
        .await?;

    Ok(Json(PermissionSetResponse::from(permissions)))
}

/// Answers permission questions about another user. The caller must be a member.
pub async fn check_permissions_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path(group_id): Path<String>,
    Json(payload): Json<CheckPermissionsRequest>,
) -> ApiResult<Json<CheckPermissionsResponse>> {
    let group_id = GroupId::parse(&group_id)?;
    state
        .authorization_service
        .group_permissions(&actor, group_id)
        .await?;

    let user_id = ActorId::new(payload.user_id)?;
    let keys = payload
        .permissions
        .into_iter()
        .map(PermissionKey::new)
        .collect::<AppResult<Vec<_>>>()?;
    let results = state
        .authorization_service
        .check_user_permissions(group_id, &user_id, &keys)
        .await?;

    Ok(Json(CheckPermissionsResponse { results }))
}

pub async fn panel_permissions_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path((group_id, panel_id)): Path<(String, String)>,
) -> ApiResult<Json<PermissionSetResponse>> {
    let permissions = state
        .authorization_service
        .panel_permissions(&actor, GroupId::parse(&group_id)?, &PanelId::new(panel_id)?)
        .await?;

    Ok(Json(PermissionSetResponse::from(permissions)))
}

pub async fn panel_permission_definitions_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path((group_id, panel_id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<PermissionDefinitionResponse>>> {
    let definitions = state
        .authorization_service
        .panel_permission_definitions(&actor, GroupId::parse(&group_id)?, &PanelId::new(panel_id)?)
        .await?
        .into_iter()
        .map(PermissionDefinitionResponse::from)
        .collect();

    Ok(Json(definitions))
}

pub async fn message_permission_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path((group_id, panel_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .authorization_service
        .ensure_can_post_message(
            GroupId::parse(&group_id)?,
            &PanelId::new(panel_id)?,
            &actor,
            Utc::now(),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
