use std::collections::BTreeMap;

use huddle_application::{
    CreateGroupInput, CreateGroupPanelInput, CreateGroupRoleInput, MemberRolesInput,
    ModifyGroupPanelInput,
};
use huddle_core::{ActorId, AppResult};
use huddle_domain::{
    Group, GroupMember, GroupPanel, GroupRole, NewGroupPanel, PanelId, PanelPermissionMap,
    PanelSubject, PanelType, RoleId, parse_permission_set,
};

use super::{
    AddGroupMembersRequest, CreateGroupRequest, CreateGroupRoleRequest, GroupMemberResponse,
    GroupPanelRequest, GroupPanelResponse, GroupResponse, GroupRoleResponse, MemberRolesRequest,
    ModifyGroupPanelRequest,
};
use crate::dto::common::permission_keys;

fn parse_role_ids(values: Vec<String>) -> AppResult<Vec<RoleId>> {
    values.into_iter().map(RoleId::new).collect()
}

fn parse_actor_ids(values: Vec<String>) -> AppResult<Vec<ActorId>> {
    values.into_iter().map(ActorId::new).collect()
}

impl GroupPanelRequest {
    pub fn into_new_panel(self) -> AppResult<NewGroupPanel> {
        Ok(NewGroupPanel {
            name: self.name,
            parent_id: self.parent_id.map(PanelId::new).transpose()?,
            panel_type: PanelType::parse(&self.panel_type)?,
            provider: self.provider,
            plugin_panel_name: self.plugin_panel_name,
            meta: self.meta,
        })
    }
}

impl CreateGroupRequest {
    pub fn into_input(self) -> AppResult<CreateGroupInput> {
        let panels = self
            .panels
            .into_iter()
            .map(|draft| {
                let parent_draft_id = draft.panel.parent_id.clone();
                let panel = GroupPanelRequest {
                    parent_id: None,
                    ..draft.panel
                }
                .into_new_panel()?;

                Ok(CreateGroupPanelInput {
                    draft_id: draft.id,
                    parent_draft_id,
                    panel,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(CreateGroupInput {
            name: self.name,
            panels,
        })
    }
}

impl ModifyGroupPanelRequest {
    pub fn into_input(self) -> AppResult<ModifyGroupPanelInput> {
        let permission_map = self
            .permission_map
            .map(|entries| {
                entries
                    .into_iter()
                    .map(|(subject, permissions)| {
                        Ok((PanelSubject::from(subject), parse_permission_set(permissions)?))
                    })
                    .collect::<AppResult<PanelPermissionMap>>()
            })
            .transpose()?;

        Ok(ModifyGroupPanelInput {
            panel: self.panel.into_new_panel()?,
            permission_map,
            fallback_permissions: self
                .fallback_permissions
                .map(parse_permission_set)
                .transpose()?,
        })
    }
}

impl CreateGroupRoleRequest {
    pub fn into_input(self) -> AppResult<CreateGroupRoleInput> {
        Ok(CreateGroupRoleInput {
            name: self.name,
            permissions: parse_permission_set(self.permissions)?,
        })
    }
}

impl AddGroupMembersRequest {
    pub fn into_user_ids(self) -> AppResult<Vec<ActorId>> {
        parse_actor_ids(self.user_ids)
    }
}

impl MemberRolesRequest {
    pub fn into_input(self) -> AppResult<MemberRolesInput> {
        Ok(MemberRolesInput {
            member_ids: parse_actor_ids(self.member_ids)?,
            role_ids: parse_role_ids(self.role_ids)?,
        })
    }
}

impl From<&GroupMember> for GroupMemberResponse {
    fn from(value: &GroupMember) -> Self {
        Self {
            user_id: value.user_id().to_string(),
            role_ids: value.role_ids().iter().map(RoleId::to_string).collect(),
            mute_until: value.mute_until(),
        }
    }
}

impl From<&GroupRole> for GroupRoleResponse {
    fn from(value: &GroupRole) -> Self {
        Self {
            id: value.id().to_string(),
            name: value.name().to_owned(),
            permissions: permission_keys(value.permissions()),
        }
    }
}

impl From<&GroupPanel> for GroupPanelResponse {
    fn from(value: &GroupPanel) -> Self {
        Self {
            id: value.id().to_string(),
            name: value.name().to_owned(),
            parent_id: value.parent_id().map(PanelId::to_string),
            panel_type: value.panel_type().as_str().to_owned(),
            provider: value.provider().map(ToOwned::to_owned),
            plugin_panel_name: value.plugin_panel_name().map(ToOwned::to_owned),
            meta: value.meta().cloned(),
            permission_map: value.permission_map().map(|map| {
                map.iter()
                    .map(|(subject, permissions)| {
                        (String::from(subject.clone()), permission_keys(permissions))
                    })
                    .collect::<BTreeMap<_, _>>()
            }),
            fallback_permissions: value.fallback_permissions().map(permission_keys),
        }
    }
}

impl From<Group> for GroupResponse {
    fn from(value: Group) -> Self {
        Self {
            id: value.id().to_string(),
            name: value.name().to_owned(),
            owner_user_id: value.owner_user_id().to_string(),
            fallback_permissions: permission_keys(value.fallback_permissions()),
            members: value.members().iter().map(GroupMemberResponse::from).collect(),
            roles: value.roles().iter().map(GroupRoleResponse::from).collect(),
            panels: value.panels().iter().map(GroupPanelResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use huddle_core::AppError;
    use huddle_domain::{PanelType, RoleId};

    use super::super::{CreateGroupPanelRequest, GroupPanelRequest, ModifyGroupPanelRequest};
    use super::CreateGroupRequest;

    fn text_panel(parent_id: Option<&str>) -> GroupPanelRequest {
        GroupPanelRequest {
            name: "general".to_owned(),
            parent_id: parent_id.map(ToOwned::to_owned),
            panel_type: "text".to_owned(),
            provider: None,
            plugin_panel_name: None,
            meta: None,
        }
    }

    #[test]
    fn create_group_request_keeps_draft_parents() {
        let request = CreateGroupRequest {
            name: "Rustaceans".to_owned(),
            panels: vec![
                CreateGroupPanelRequest {
                    id: "s".to_owned(),
                    panel: GroupPanelRequest {
                        panel_type: "group".to_owned(),
                        ..text_panel(None)
                    },
                },
                CreateGroupPanelRequest {
                    id: "t".to_owned(),
                    panel: text_panel(Some("s")),
                },
            ],
        };

        let input = request.into_input();
        assert!(input.is_ok());
        let input = input.unwrap_or_else(|_| unreachable!());
        assert_eq!(input.panels[0].panel.panel_type, PanelType::Group);
        assert_eq!(input.panels[1].parent_draft_id.as_deref(), Some("s"));
        assert_eq!(input.panels[1].panel.parent_id, None);
    }

    #[test]
    fn all_members_entry_maps_to_reserved_subject() {
        let request = ModifyGroupPanelRequest {
            panel: text_panel(None),
            permission_map: Some(BTreeMap::from([
                ("@all".to_owned(), vec!["core.message".to_owned()]),
                ("r1".to_owned(), Vec::new()),
            ])),
            fallback_permissions: None,
        };

        let input = request.into_input().unwrap_or_else(|_| unreachable!());
        let map = input.permission_map.unwrap_or_default();
        assert_eq!(map.for_all_members().map(|set| set.len()), Some(1));
        assert_eq!(
            map.for_role(&RoleId::from_stored("r1")).map(|set| set.len()),
            Some(0)
        );
    }

    #[test]
    fn unknown_panel_type_is_rejected() {
        let result = GroupPanelRequest {
            panel_type: "voice".to_owned(),
            ..text_panel(None)
        }
        .into_new_panel();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
