//! Domain entities, invariants and permission resolution for group authorization.

#![forbid(unsafe_code)]

#[cfg(test)]
use proptest as _;

mod audit;
mod catalog;
mod group;
mod guard;
mod panel;
mod permission;
mod resolver;

pub use audit::AuditAction;
pub use catalog::{PermissionCatalog, UnmetRequirement};
pub use group::{Group, GroupId, GroupMember, GroupRole, GroupValidationReport, RoleId};
pub use guard::{MemberField, require_field_permission, require_permission};
pub use panel::{
    ALL_MEMBERS_KEY, GroupPanel, NewGroupPanel, PanelId, PanelPermissionMap, PanelSubject,
    PanelType,
};
pub use permission::{
    CorePermission, PanelApplicability, PanelTarget, PermissionDefinition, PermissionKey,
    PermissionSet, parse_permission_set,
};
pub use resolver::{check_permissions, resolve_group_permissions, resolve_panel_permissions};
