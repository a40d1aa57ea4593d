use super::*;

pub async fn add_group_members_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path(group_id): Path<String>,
    Json(payload): Json<AddGroupMembersRequest>,
) -> ApiResult<Json<AddedMembersResponse>> {
    let added = state
        .group_service
        .add_group_members(&actor, GroupId::parse(&group_id)?, payload.into_user_ids()?)
        .await?;

    Ok(Json(AddedMembersResponse {
        user_ids: added.into_iter().map(String::from).collect(),
    }))
}

pub async fn kick_group_member_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path((group_id, member_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .group_service
        .kick_group_member(&actor, GroupId::parse(&group_id)?, &ActorId::new(member_id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn append_member_roles_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path(group_id): Path<String>,
    Json(payload): Json<MemberRolesRequest>,
) -> ApiResult<StatusCode> {
    state
        .group_service
        .append_group_member_roles(&actor, GroupId::parse(&group_id)?, payload.into_input()?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_member_roles_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path(group_id): Path<String>,
    Json(payload): Json<MemberRolesRequest>,
) -> ApiResult<StatusCode> {
    state
        .group_service
        .remove_group_member_roles(&actor, GroupId::parse(&group_id)?, payload.into_input()?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn mute_group_member_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path((group_id, member_id)): Path<(String, String)>,
    Json(payload): Json<MuteGroupMemberRequest>,
) -> ApiResult<StatusCode> {
    state
        .group_service
        .mute_group_member(
            &actor,
            GroupId::parse(&group_id)?,
            &ActorId::new(member_id)?,
            payload.mute_until,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
