use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

mod conversions;

/// Panel attributes shared by create and modify payloads.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/group-panel-request.ts"
)]
pub struct GroupPanelRequest {
    pub name: String,
    pub parent_id: Option<String>,
    #[ts(type = "\"text\" | \"group\" | \"plugin\"")]
    pub panel_type: String,
    pub provider: Option<String>,
    pub plugin_panel_name: Option<String>,
    #[ts(type = "unknown")]
    pub meta: Option<Value>,
}

/// Panel declared in a group creation request.
///
/// `id` is request-local and only used to place later panels in sections.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-group-panel-request.ts"
)]
pub struct CreateGroupPanelRequest {
    pub id: String,
    #[serde(flatten)]
    pub panel: GroupPanelRequest,
}

/// Incoming payload for group creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-group-request.ts"
)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub panels: Vec<CreateGroupPanelRequest>,
}

/// Incoming payload for panel modification.
///
/// Omitting `permission_map` makes the panel follow group-wide permissions.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/modify-group-panel-request.ts"
)]
pub struct ModifyGroupPanelRequest {
    #[serde(flatten)]
    pub panel: GroupPanelRequest,
    pub permission_map: Option<BTreeMap<String, Vec<String>>>,
    pub fallback_permissions: Option<Vec<String>>,
}

/// Incoming payload for role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-group-role-request.ts"
)]
pub struct CreateGroupRoleRequest {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Incoming payload for role renames.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-group-role-name-request.ts"
)]
pub struct UpdateGroupRoleNameRequest {
    pub name: String,
}

/// Incoming payload for adding members.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/add-group-members-request.ts"
)]
pub struct AddGroupMembersRequest {
    pub user_ids: Vec<String>,
}

/// Incoming payload for bulk role assignment changes.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/member-roles-request.ts"
)]
pub struct MemberRolesRequest {
    pub member_ids: Vec<String>,
    pub role_ids: Vec<String>,
}

/// Incoming payload for muting a member. `null` lifts the mute.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/mute-group-member-request.ts"
)]
pub struct MuteGroupMemberRequest {
    #[ts(type = "string | null")]
    pub mute_until: Option<DateTime<Utc>>,
}

/// Identifier of a created role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/created-role-response.ts"
)]
pub struct CreatedRoleResponse {
    pub role_id: String,
}

/// Identifier of a created panel.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/created-panel-response.ts"
)]
pub struct CreatedPanelResponse {
    pub panel_id: String,
}

/// Panels removed by a delete, the target first.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/deleted-panels-response.ts"
)]
pub struct DeletedPanelsResponse {
    pub panel_ids: Vec<String>,
}

/// Users actually added to a group.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/added-members-response.ts"
)]
pub struct AddedMembersResponse {
    pub user_ids: Vec<String>,
}

/// API representation of a group member.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/group-member-response.ts"
)]
pub struct GroupMemberResponse {
    pub user_id: String,
    pub role_ids: Vec<String>,
    #[ts(type = "string | null")]
    pub mute_until: Option<DateTime<Utc>>,
}

/// API representation of a group role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/group-role-response.ts"
)]
pub struct GroupRoleResponse {
    pub id: String,
    pub name: String,
    pub permissions: Vec<String>,
}

/// API representation of a group panel.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/group-panel-response.ts"
)]
pub struct GroupPanelResponse {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub panel_type: String,
    pub provider: Option<String>,
    pub plugin_panel_name: Option<String>,
    #[ts(type = "unknown")]
    pub meta: Option<Value>,
    pub permission_map: Option<BTreeMap<String, Vec<String>>>,
    pub fallback_permissions: Option<Vec<String>>,
}

/// API representation of a group.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/group-response.ts"
)]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
    pub owner_user_id: String,
    pub fallback_permissions: Vec<String>,
    pub members: Vec<GroupMemberResponse>,
    pub roles: Vec<GroupRoleResponse>,
    pub panels: Vec<GroupPanelResponse>,
}
