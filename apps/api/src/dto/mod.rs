mod common;
pub(crate) mod groups;
mod permissions;

pub use common::{HealthResponse, PermissionSetResponse, UpdatePermissionsRequest};
pub use groups::{
    AddGroupMembersRequest, AddedMembersResponse, CreateGroupRequest, CreateGroupRoleRequest,
    CreatedPanelResponse, CreatedRoleResponse, DeletedPanelsResponse, GroupPanelRequest,
    GroupResponse, MemberRolesRequest, ModifyGroupPanelRequest, MuteGroupMemberRequest,
    UpdateGroupRoleNameRequest,
};
pub use permissions::{
    CheckPermissionsRequest, CheckPermissionsResponse, PermissionDefinitionResponse,
};
