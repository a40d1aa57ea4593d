use super::*;

pub async fn create_group_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path(group_id): Path<String>,
    Json(payload): Json<CreateGroupRoleRequest>,
) -> ApiResult<(StatusCode, Json<CreatedRoleResponse>)> {
    let role_id = state
        .group_service
        .create_group_role(&actor, GroupId::parse(&group_id)?, payload.into_input()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedRoleResponse {
            role_id: role_id.into(),
        }),
    ))
}

pub async fn delete_group_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path((group_id, role_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .group_service
        .delete_group_role(&actor, GroupId::parse(&group_id)?, &RoleId::new(role_id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_group_role_name_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path((group_id, role_id)): Path<(String, String)>,
    Json(payload): Json<UpdateGroupRoleNameRequest>,
) -> ApiResult<StatusCode> {
    state
        .group_service
        .update_group_role_name(
            &actor,
            GroupId::parse(&group_id)?,
            &RoleId::new(role_id)?,
            payload.name,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_group_role_permissions_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path((group_id, role_id)): Path<(String, String)>,
    Json(payload): Json<UpdatePermissionsRequest>,
) -> ApiResult<StatusCode> {
    state
        .group_service
        .update_group_role_permission(
            &actor,
            GroupId::parse(&group_id)?,
            &RoleId::new(role_id)?,
            payload.into_permission_set()?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
