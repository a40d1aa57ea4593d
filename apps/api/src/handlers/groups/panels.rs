use super::*;

pub async fn create_group_panel_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path(group_id): Path<String>,
    Json(payload): Json<GroupPanelRequest>,
) -> ApiResult<(StatusCode, Json<CreatedPanelResponse>)> {
    let panel_id = state
        .group_service
        .create_group_panel(&actor, GroupId::parse(&group_id)?, payload.into_new_panel()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedPanelResponse {
            panel_id: panel_id.into(),
        }),
    ))
}

pub async fn modify_group_panel_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path((group_id, panel_id)): Path<(String, String)>,
    Json(payload): Json<ModifyGroupPanelRequest>,
) -> ApiResult<StatusCode> {
    state
        .group_service
        .modify_group_panel(
            &actor,
            GroupId::parse(&group_id)?,
            &PanelId::new(panel_id)?,
            payload.into_input()?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_group_panel_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorId>,
    Path((group_id, panel_id)): Path<(String, String)>,
) -> ApiResult<Json<DeletedPanelsResponse>> {
    let removed = state
        .group_service
        .delete_group_panel(&actor, GroupId::parse(&group_id)?, &PanelId::new(panel_id)?)
        .await?;

    Ok(Json(DeletedPanelsResponse {
        panel_ids: removed.into_iter().map(String::from).collect(),
    }))
}
