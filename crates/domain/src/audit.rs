/// Stable audit action names recorded for group mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditAction {
    /// Emitted when a group is created.
    GroupCreated,
    /// Emitted when a group is deleted.
    GroupDeleted,
    /// Emitted when a member leaves a group.
    GroupMemberQuit,
    /// Emitted when group fallback permissions are replaced.
    GroupFallbackPermissionsUpdated,
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when a role is renamed.
    RoleRenamed,
    /// Emitted when role permissions are replaced.
    RolePermissionsUpdated,
    /// Emitted when a role is deleted.
    RoleDeleted,
    /// Emitted when a panel is created.
    PanelCreated,
    /// Emitted when a panel is modified.
    PanelUpdated,
    /// Emitted when a panel is deleted.
    PanelDeleted,
    /// Emitted when members are added.
    MembersAdded,
    /// Emitted when a member is removed by another member.
    MemberKicked,
    /// Emitted when member role assignments change.
    MemberRolesUpdated,
    /// Emitted when a member is muted or unmuted.
    MemberMuteUpdated,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GroupCreated => "group.created",
            Self::GroupDeleted => "group.deleted",
            Self::GroupMemberQuit => "group.member.quit",
            Self::GroupFallbackPermissionsUpdated => "group.fallback_permissions.updated",
            Self::RoleCreated => "group.role.created",
            Self::RoleRenamed => "group.role.renamed",
            Self::RolePermissionsUpdated => "group.role.permissions_updated",
            Self::RoleDeleted => "group.role.deleted",
            Self::PanelCreated => "group.panel.created",
            Self::PanelUpdated => "group.panel.updated",
            Self::PanelDeleted => "group.panel.deleted",
            Self::MembersAdded => "group.members.added",
            Self::MemberKicked => "group.member.kicked",
            Self::MemberRolesUpdated => "group.member.roles_updated",
            Self::MemberMuteUpdated => "group.member.mute_updated",
        }
    }
}
