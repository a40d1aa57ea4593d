use super::*;

pub async fn list_groups_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
) -> ApiResult<Json<Vec<GroupResponse>>> {
    let groups = state
        .group_service
        .list_groups_for_actor(&actor)
        .await?
        .into_iter()
        .map(GroupResponse::from)
        .collect();

    Ok(Json(groups))
}

pub async fn create_group_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Json(payload): Json<CreateGroupRequest>,
) -> ApiResult<(StatusCode, Json<GroupResponse>)> {
    let group = state
        .group_service
        .create_group(&actor, payload.into_input()?)
        .await?;

    Ok((StatusCode::CREATED, Json(GroupResponse::from(group))))
}

pub async fn get_group_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path(group_id): Path<String>,
) -> ApiResult<Json<GroupResponse>> {
    let group = state
        .group_service
        .get_group(&actor, GroupId::parse(&group_id)?)
        .await?;

    Ok(Json(GroupResponse::from(group)))
}

pub async fn delete_group_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path(group_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .group_service
        .delete_group(&actor, GroupId::parse(&group_id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn quit_group_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path(group_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .group_service
        .quit_group(&actor, GroupId::parse(&group_id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_fallback_permissions_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path(group_id): Path<String>,
    Json(payload): Json<UpdatePermissionsRequest>,
) -> ApiResult<StatusCode> {
    state
        .group_service
        .update_group_fallback_permissions(
            &actor,
            GroupId::parse(&group_id)?,
            payload.into_permission_set()?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
