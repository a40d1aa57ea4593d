//! Application services and ports for group authorization.

#![forbid(unsafe_code)]

mod audit_ports;
mod group_authorization_service;
mod group_ports;
mod group_service;
mod permission_catalog;

#[cfg(test)]
mod test_support;

pub use audit_ports::{AuditEvent, AuditRepository};
pub use group_authorization_service::GroupAuthorizationService;
pub use group_ports::{
    CreateGroupInput, CreateGroupPanelInput, CreateGroupRoleInput, GroupRepository,
    MemberFieldUpdate, MemberRolesInput, ModifyGroupPanelInput, PluginPermissionRegistry,
};
pub use group_service::GroupService;
pub use permission_catalog::load_permission_catalog;
