use async_trait::async_trait;
use huddle_core::{ActorId, AppResult};
use huddle_domain::{
    Group, GroupId, NewGroupPanel, PanelPermissionMap, PermissionDefinition, PermissionSet,
    RoleId,
};
use serde_json::Value;

/// Document store port for whole group aggregates.
///
/// Saves replace the stored document. Concurrent saves of one group are
/// last-write-wins.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Stores a new group, failing when the id is already taken.
    async fn create_group(&self, group: Group) -> AppResult<()>;

    /// Loads one group by id.
    async fn find_group(&self, group_id: GroupId) -> AppResult<Option<Group>>;

    /// Replaces a stored group.
    async fn save_group(&self, group: Group) -> AppResult<()>;

    /// Deletes a group.
    async fn delete_group(&self, group_id: GroupId) -> AppResult<()>;

    /// Lists groups in which the user holds a membership record.
    async fn list_groups_for_member(&self, user_id: &ActorId) -> AppResult<Vec<Group>>;
}

/// Source of plugin-contributed permission definitions read at startup.
#[async_trait]
pub trait PluginPermissionRegistry: Send + Sync {
    /// Lists plugin definitions in registration order.
    async fn list_plugin_definitions(&self) -> AppResult<Vec<PermissionDefinition>>;
}

/// Panel declared in a group creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateGroupPanelInput {
    /// Request-local id that later panels may name as their parent.
    pub draft_id: String,
    /// Request-local id of the parent section.
    pub parent_draft_id: Option<String>,
    /// Descriptive attributes. `parent_id` is ignored.
    pub panel: NewGroupPanel,
}

/// Input payload for creating a group.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateGroupInput {
    /// Group name.
    pub name: String,
    /// Initial panels in display order.
    pub panels: Vec<CreateGroupPanelInput>,
}

/// Input payload for modifying a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifyGroupPanelInput {
    /// Descriptive attributes.
    pub panel: NewGroupPanel,
    /// Permission overrides. `None` restores group-wide inheritance.
    pub permission_map: Option<PanelPermissionMap>,
    /// Panel fallback replacing the group fallback.
    pub fallback_permissions: Option<PermissionSet>,
}

/// Input payload for creating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGroupRoleInput {
    /// Role name.
    pub name: String,
    /// Granted permissions.
    pub permissions: PermissionSet,
}

/// Role assignment change applied to several members at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRolesInput {
    /// Target members.
    pub member_ids: Vec<ActorId>,
    /// Roles to add or remove.
    pub role_ids: Vec<RoleId>,
}

/// Loosely typed member field write used by internal callers.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberFieldUpdate {
    /// Target member.
    pub member_id: ActorId,
    /// Field name, `roles` or `muteUntil`.
    pub field_name: String,
    /// New field value as JSON.
    pub value: Value,
}
