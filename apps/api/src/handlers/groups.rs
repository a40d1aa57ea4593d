use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use huddle_core::ActorId;
use huddle_domain::{GroupId, PanelId, RoleId};

use crate::dto::{
    AddGroupMembersRequest, AddedMembersResponse, CreateGroupRequest, CreateGroupRoleRequest,
    CreatedPanelResponse, CreatedRoleResponse, DeletedPanelsResponse, GroupPanelRequest,
    GroupResponse, MemberRolesRequest, ModifyGroupPanelRequest, MuteGroupMemberRequest,
    UpdateGroupRoleNameRequest, UpdatePermissionsRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod lifecycle;
mod members;
mod panels;
mod roles;

pub use lifecycle::{
    create_group_handler, delete_group_handler, get_group_handler, list_groups_handler,
    quit_group_handler, update_fallback_permissions_handler,
};
pub use members::{
    add_group_members_handler, append_member_roles_handler, kick_group_member_handler,
    mute_group_member_handler, remove_member_roles_handler,
};
pub use panels::{create_group_panel_handler, delete_group_panel_handler, modify_group_panel_handler};
pub use roles::{
    create_group_role_handler, delete_group_role_handler, update_group_role_name_handler,
    update_group_role_permissions_handler,
};
