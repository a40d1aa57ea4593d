use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use async_trait::async_trait;
use huddle_core::{ActorId, AppError, AppResult};
use huddle_domain::{
    AuditAction, CorePermission, Group, GroupId, NewGroupPanel, PanelId, PanelPermissionMap,
    PanelSubject, PanelType, PermissionSet, RoleId,
};

use crate::test_support::{
    FakeAuditRepository, FakeGroupRepository, actor, catalog, seeded_group,
};
use crate::{
    AuditEvent, AuditRepository, CreateGroupInput, CreateGroupPanelInput, CreateGroupRoleInput, GroupAuthorizationService,
    GroupRepository, MemberFieldUpdate, MemberRolesInput, ModifyGroupPanelInput,
};

use super::GroupService;

struct Harness {
    service: GroupService,
    repository: Arc<FakeGroupRepository>,
    audit_repository: Arc<FakeAuditRepository>,
}

impl Harness {
    async fn with_group(group: Option<Group>) -> Self {
        let repository = Arc::new(FakeGroupRepository::default());
        if let Some(group) = group {
            assert!(repository.create_group(group).await.is_ok());
        }
        let audit_repository = Arc::new(FakeAuditRepository::default());
        let authorization_service = GroupAuthorizationService::new(catalog(), repository.clone());

        Self {
            service: GroupService::new(
                authorization_service,
                repository.clone(),
                audit_repository.clone(),
            ),
            repository,
            audit_repository,
        }
    }

    async fn group(&self, group_id: GroupId) -> Group {
        self.repository
            .stored(group_id)
            .await
            .unwrap_or_else(|| unreachable!())
    }

    async fn actions(&self) -> Vec<AuditAction> {
        self.audit_repository
            .events
            .lock()
            .await
            .iter()
            .map(|event| event.action)
            .collect()
    }
}

fn new_panel(name: &str, panel_type: PanelType, parent_id: Option<PanelId>) -> NewGroupPanel {
    NewGroupPanel {
        name: name.to_owned(),
        parent_id,
        panel_type,
        provider: None,
        plugin_panel_name: None,
        meta: None,
    }
}

fn manage_roles() -> PermissionSet {
    PermissionSet::from([CorePermission::ManageRoles.key()])
}

#[tokio::test]
async fn create_group_seeds_owner_and_default_fallback() {
    let harness = Harness::with_group(None).await;

    let created = harness
        .service
        .create_group(
            &actor("u1"),
            CreateGroupInput {
                name: "g1".to_owned(),
                panels: vec![
                    CreateGroupPanelInput {
                        draft_id: "00".to_owned(),
                        parent_draft_id: None,
                        panel: new_panel("Text", PanelType::Group, None),
                    },
                    CreateGroupPanelInput {
                        draft_id: "01".to_owned(),
                        parent_draft_id: Some("00".to_owned()),
                        panel: new_panel("general", PanelType::Text, None),
                    },
                ],
            },
        )
        .await;
    assert!(created.is_ok());
    let created = created.unwrap_or_else(|_| unreachable!());

    let stored = harness.group(created.id()).await;
    assert_eq!(stored.members().len(), 1);
    assert!(stored.is_owner(&actor("u1")));
    assert_eq!(
        stored.fallback_permissions(),
        &catalog().default_permission_set()
    );
    assert_eq!(stored.panels().len(), 2);
    assert_eq!(
        stored.panels()[1].parent_id(),
        Some(stored.panels()[0].id())
    );
    assert_eq!(harness.actions().await, vec![AuditAction::GroupCreated]);
}

#[tokio::test]
async fn create_group_rejects_unknown_section_draft() {
    let harness = Harness::with_group(None).await;

    let created = harness
        .service
        .create_group(
            &actor("u1"),
            CreateGroupInput {
                name: "g1".to_owned(),
                panels: vec![CreateGroupPanelInput {
                    draft_id: "01".to_owned(),
                    parent_draft_id: Some("missing".to_owned()),
                    panel: new_panel("general", PanelType::Text, None),
                }],
            },
        )
        .await;
    assert!(matches!(created, Err(AppError::Validation(_))));
    assert!(harness.actions().await.is_empty());
}

#[tokio::test]
async fn member_without_manage_roles_cannot_create_role() {
    let group = seeded_group(PermissionSet::new());
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;

    let result = harness
        .service
        .create_group_role(
            &actor("u2"),
            group_id,
            CreateGroupRoleInput {
                name: "helpers".to_owned(),
                permissions: PermissionSet::new(),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::NoPermission(_))));
    assert_eq!(harness.group(group_id).await.roles().len(), 1);
    assert!(harness.actions().await.is_empty());
}

#[tokio::test]
async fn role_lifecycle_is_guarded_and_audited() {
    let group = seeded_group(manage_roles());
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;
    let u2 = actor("u2");

    let role_id = harness
        .service
        .create_group_role(
            &u2,
            group_id,
            CreateGroupRoleInput {
                name: "helpers".to_owned(),
                permissions: PermissionSet::from([CorePermission::Message.key()]),
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(
        harness
            .service
            .update_group_role_name(&u2, group_id, &role_id, "assistants".to_owned())
            .await
            .is_ok()
    );
    assert!(
        harness
            .service
            .update_group_role_permission(
                &u2,
                group_id,
                &role_id,
                PermissionSet::from([CorePermission::Invite.key()]),
            )
            .await
            .is_ok()
    );

    let stored = harness.group(group_id).await;
    let role = stored.role(&role_id).unwrap_or_else(|| unreachable!());
    assert_eq!(role.name(), "assistants");
    assert_eq!(
        role.permissions(),
        &PermissionSet::from([CorePermission::Invite.key()])
    );

    assert!(
        harness
            .service
            .delete_group_role(&u2, group_id, &role_id)
            .await
            .is_ok()
    );
    assert!(harness.group(group_id).await.role(&role_id).is_none());
    assert_eq!(
        harness.actions().await,
        vec![
            AuditAction::RoleCreated,
            AuditAction::RoleRenamed,
            AuditAction::RolePermissionsUpdated,
            AuditAction::RoleDeleted,
        ]
    );
}

#[tokio::test]
async fn deleting_unknown_role_is_not_found() {
    let group = seeded_group(PermissionSet::new());
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;

    let result = harness
        .service
        .delete_group_role(&actor("u1"), group_id, &RoleId::from_stored("nope"))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn deleting_role_keeps_dangling_member_reference() {
    let group = seeded_group(PermissionSet::new());
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;

    assert!(
        harness
            .service
            .delete_group_role(&actor("u1"), group_id, &RoleId::from_stored("r1"))
            .await
            .is_ok()
    );

    let stored = harness.group(group_id).await;
    let member = stored.member(&actor("u2")).unwrap_or_else(|| unreachable!());
    assert_eq!(member.role_ids(), &[RoleId::from_stored("r1")][..]);
}

#[tokio::test]
async fn modify_panel_sets_and_clears_permission_map() {
    let group = seeded_group(PermissionSet::from([CorePermission::ManagePanel.key()]));
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;
    let u2 = actor("u2");

    let panel_id = harness
        .service
        .create_group_panel(&u2, group_id, new_panel("general", PanelType::Text, None))
        .await
        .unwrap_or_else(|_| unreachable!());

    let map = PanelPermissionMap::from_iter([(
        PanelSubject::AllMembers,
        PermissionSet::from([CorePermission::ViewPanel.key()]),
    )]);
    assert!(
        harness
            .service
            .modify_group_panel(
                &u2,
                group_id,
                &panel_id,
                ModifyGroupPanelInput {
                    panel: new_panel("announcements", PanelType::Text, None),
                    permission_map: Some(map.clone()),
                    fallback_permissions: None,
                },
            )
            .await
            .is_ok()
    );
    let stored = harness.group(group_id).await;
    let panel = stored.panel(&panel_id).unwrap_or_else(|| unreachable!());
    assert_eq!(panel.name(), "announcements");
    assert_eq!(panel.permission_map(), Some(&map));

    assert!(
        harness
            .service
            .modify_group_panel(
                &u2,
                group_id,
                &panel_id,
                ModifyGroupPanelInput {
                    panel: new_panel("announcements", PanelType::Text, None),
                    permission_map: None,
                    fallback_permissions: None,
                },
            )
            .await
            .is_ok()
    );
    let stored = harness.group(group_id).await;
    let panel = stored.panel(&panel_id).unwrap_or_else(|| unreachable!());
    assert!(panel.permission_map().is_none());
}

#[tokio::test]
async fn modify_panel_requires_manage_panel() {
    let mut group = seeded_group(manage_roles());
    let panel = huddle_domain::GroupPanel::new(
        PanelId::generate(),
        new_panel("general", PanelType::Text, None),
    )
    .unwrap_or_else(|_| unreachable!());
    let panel_id = panel.id().clone();
    assert!(group.add_panel(panel).is_ok());
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;

    let result = harness
        .service
        .modify_group_panel(
            &actor("u2"),
            group_id,
            &panel_id,
            ModifyGroupPanelInput {
                panel: new_panel("renamed", PanelType::Text, None),
                permission_map: None,
                fallback_permissions: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::NoPermission(_))));
    let stored = harness.group(group_id).await;
    assert_eq!(
        stored.panel(&panel_id).map(|panel| panel.name()),
        Some("general")
    );
}

#[tokio::test]
async fn reserved_role_id_blocks_panel_map() {
    let mut group = seeded_group(PermissionSet::new());
    let reserved = huddle_domain::GroupRole::new(
        RoleId::from_stored("@all"),
        "everyone",
        PermissionSet::new(),
    )
    .unwrap_or_else(|_| unreachable!());
    assert!(group.add_role(reserved).is_ok());
    let panel = huddle_domain::GroupPanel::new(
        PanelId::generate(),
        new_panel("general", PanelType::Text, None),
    )
    .unwrap_or_else(|_| unreachable!());
    let panel_id = panel.id().clone();
    assert!(group.add_panel(panel).is_ok());
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;

    let result = harness
        .service
        .modify_group_panel(
            &actor("u1"),
            group_id,
            &panel_id,
            ModifyGroupPanelInput {
                panel: new_panel("general", PanelType::Text, None),
                permission_map: Some(PanelPermissionMap::new()),
                fallback_permissions: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::ReservedKeyConflict(_))));
    let stored = harness.group(group_id).await;
    assert!(
        stored
            .panel(&panel_id)
            .is_some_and(|panel| panel.permission_map().is_none())
    );
}

#[tokio::test]
async fn deleting_section_removes_children() {
    let group = seeded_group(PermissionSet::new());
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;
    let owner = actor("u1");

    let section_id = harness
        .service
        .create_group_panel(&owner, group_id, new_panel("Text", PanelType::Group, None))
        .await
        .unwrap_or_else(|_| unreachable!());
    let child = harness
        .service
        .create_group_panel(
            &owner,
            group_id,
            new_panel("general", PanelType::Text, Some(section_id.clone())),
        )
        .await;
    assert!(child.is_ok());

    let removed = harness
        .service
        .delete_group_panel(&owner, group_id, &section_id)
        .await
        .unwrap_or_default();
    assert_eq!(removed.len(), 2);
    assert!(harness.group(group_id).await.panels().is_empty());
}

#[tokio::test]
async fn sections_stay_top_level() {
    let group = seeded_group(PermissionSet::new());
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;
    let owner = actor("u1");

    let outer = harness
        .service
        .create_group_panel(&owner, group_id, new_panel("outer", PanelType::Group, None))
        .await
        .unwrap_or_else(|_| unreachable!());
    let nested = harness
        .service
        .create_group_panel(
            &owner,
            group_id,
            new_panel("inner", PanelType::Group, Some(outer.clone())),
        )
        .await;
    assert!(matches!(nested, Err(AppError::Validation(_))));

    let looped = harness
        .service
        .modify_group_panel(
            &owner,
            group_id,
            &outer,
            ModifyGroupPanelInput {
                panel: new_panel("outer", PanelType::Group, Some(outer.clone())),
                permission_map: None,
                fallback_permissions: None,
            },
        )
        .await;
    assert!(matches!(looped, Err(AppError::Validation(_))));

    let child = harness
        .service
        .create_group_panel(
            &owner,
            group_id,
            new_panel("general", PanelType::Text, Some(outer.clone())),
        )
        .await;
    assert!(child.is_ok());
    let retyped = harness
        .service
        .modify_group_panel(
            &owner,
            group_id,
            &outer,
            ModifyGroupPanelInput {
                panel: new_panel("outer", PanelType::Text, None),
                permission_map: None,
                fallback_permissions: None,
            },
        )
        .await;
    assert!(matches!(retyped, Err(AppError::Validation(_))));
    assert_eq!(harness.group(group_id).await.panels().len(), 2);
}

#[tokio::test]
async fn add_members_requires_invite_and_skips_existing() {
    let group = seeded_group(PermissionSet::new());
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;

    let denied = harness
        .service
        .add_group_members(&actor("u3"), group_id, vec![actor("u4")])
        .await;
    assert!(matches!(denied, Err(AppError::NoPermission(_))));

    let added = harness
        .service
        .add_group_members(&actor("u1"), group_id, vec![actor("u2"), actor("u4")])
        .await
        .unwrap_or_default();
    assert_eq!(added, vec![actor("u4")]);
    assert_eq!(harness.group(group_id).await.members().len(), 4);

    let system = harness
        .service
        .add_group_members(&actor("u1"), group_id, vec![ActorId::system()])
        .await;
    assert!(matches!(system, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn owner_cannot_be_kicked() {
    let group = seeded_group(PermissionSet::from([CorePermission::ManageUser.key()]));
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;

    let result = harness
        .service
        .kick_group_member(&actor("u2"), group_id, &actor("u1"))
        .await;
    assert!(matches!(result, Err(AppError::NoPermission(_))));

    let kicked = harness
        .service
        .kick_group_member(&actor("u2"), group_id, &actor("u3"))
        .await;
    assert!(kicked.is_ok());
    assert!(harness.group(group_id).await.member(&actor("u3")).is_none());
}

#[tokio::test]
async fn append_member_roles_requires_existing_role() {
    let group = seeded_group(manage_roles());
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;

    let missing = harness
        .service
        .append_group_member_roles(
            &actor("u2"),
            group_id,
            MemberRolesInput {
                member_ids: vec![actor("u3")],
                role_ids: vec![RoleId::from_stored("ghost")],
            },
        )
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let appended = harness
        .service
        .append_group_member_roles(
            &actor("u2"),
            group_id,
            MemberRolesInput {
                member_ids: vec![actor("u3")],
                role_ids: vec![RoleId::from_stored("r1")],
            },
        )
        .await;
    assert!(appended.is_ok());
    let stored = harness.group(group_id).await;
    assert_eq!(
        stored.member(&actor("u3")).map(|member| member.role_ids().len()),
        Some(1)
    );

    let removed = harness
        .service
        .remove_group_member_roles(
            &actor("u2"),
            group_id,
            MemberRolesInput {
                member_ids: vec![actor("u3")],
                role_ids: vec![RoleId::from_stored("r1")],
            },
        )
        .await;
    assert!(removed.is_ok());
    let stored = harness.group(group_id).await;
    assert_eq!(
        stored.member(&actor("u3")).map(|member| member.role_ids().len()),
        Some(0)
    );
}

#[tokio::test]
async fn member_role_changes_need_manage_roles() {
    let group = seeded_group(PermissionSet::from([CorePermission::ManageUser.key()]));
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;

    let result = harness
        .service
        .append_group_member_roles(
            &actor("u2"),
            group_id,
            MemberRolesInput {
                member_ids: vec![actor("u3")],
                role_ids: vec![RoleId::from_stored("r1")],
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::NoPermission(_))));
}

#[tokio::test]
async fn mute_is_guarded_by_manage_user() {
    let group = seeded_group(PermissionSet::from([CorePermission::ManageUser.key()]));
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;
    let until = Utc::now() + Duration::hours(1);

    let denied = harness
        .service
        .mute_group_member(&actor("u3"), group_id, &actor("u2"), Some(until))
        .await;
    assert!(matches!(denied, Err(AppError::NoPermission(_))));

    let muted = harness
        .service
        .mute_group_member(&actor("u2"), group_id, &actor("u3"), Some(until))
        .await;
    assert!(muted.is_ok());
    let stored = harness.group(group_id).await;
    assert_eq!(
        stored.member(&actor("u3")).and_then(|member| member.mute_until()),
        Some(until)
    );

    let unmuted = harness
        .service
        .mute_group_member(&actor("u2"), group_id, &actor("u3"), None)
        .await;
    assert!(unmuted.is_ok());
    let stored = harness.group(group_id).await;
    assert!(
        stored
            .member(&actor("u3"))
            .is_some_and(|member| member.mute_until().is_none())
    );
}

#[tokio::test]
async fn member_field_update_parses_field_and_value() {
    let group = seeded_group(PermissionSet::new());
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;
    let owner = actor("u1");

    let unknown = harness
        .service
        .update_group_member_field(
            &owner,
            group_id,
            MemberFieldUpdate {
                member_id: actor("u3"),
                field_name: "nickname".to_owned(),
                value: json!("x"),
            },
        )
        .await;
    assert!(matches!(unknown, Err(AppError::UnknownField(_))));

    let malformed = harness
        .service
        .update_group_member_field(
            &owner,
            group_id,
            MemberFieldUpdate {
                member_id: actor("u3"),
                field_name: "muteUntil".to_owned(),
                value: json!(42),
            },
        )
        .await;
    assert!(matches!(malformed, Err(AppError::Validation(_))));

    let replaced = harness
        .service
        .update_group_member_field(
            &owner,
            group_id,
            MemberFieldUpdate {
                member_id: actor("u3"),
                field_name: "roles".to_owned(),
                value: json!(["r1"]),
            },
        )
        .await;
    assert!(replaced.is_ok());
    let stored = harness.group(group_id).await;
    assert_eq!(
        stored.member(&actor("u3")).map(|member| member.role_ids().to_vec()),
        Some(vec![RoleId::from_stored("r1")])
    );
}

#[tokio::test]
async fn fallback_update_requires_manage_roles() {
    let group = seeded_group(PermissionSet::new());
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;
    let fallback = PermissionSet::from([CorePermission::ViewPanel.key()]);

    let denied = harness
        .service
        .update_group_fallback_permissions(&actor("u2"), group_id, fallback.clone())
        .await;
    assert!(matches!(denied, Err(AppError::NoPermission(_))));

    let updated = harness
        .service
        .update_group_fallback_permissions(&actor("u1"), group_id, fallback.clone())
        .await;
    assert!(updated.is_ok());
    assert_eq!(harness.group(group_id).await.fallback_permissions(), &fallback);
}

#[tokio::test]
async fn only_owner_or_system_deletes_group() {
    let group = seeded_group(PermissionSet::new());
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;

    let denied = harness.service.delete_group(&actor("u2"), group_id).await;
    assert!(matches!(denied, Err(AppError::NoPermission(_))));

    let deleted = harness
        .service
        .delete_group(&ActorId::system(), group_id)
        .await;
    assert!(deleted.is_ok());
    assert!(harness.repository.stored(group_id).await.is_none());
}

#[tokio::test]
async fn owner_quitting_dissolves_group() {
    let group = seeded_group(PermissionSet::new());
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;

    assert!(harness.service.quit_group(&actor("u3"), group_id).await.is_ok());
    assert!(harness.group(group_id).await.member(&actor("u3")).is_none());

    assert!(harness.service.quit_group(&actor("u1"), group_id).await.is_ok());
    assert!(harness.repository.stored(group_id).await.is_none());
    assert_eq!(
        harness.actions().await,
        vec![AuditAction::GroupMemberQuit, AuditAction::GroupDeleted]
    );
}

#[tokio::test]
async fn get_group_is_limited_to_members() {
    let group = seeded_group(PermissionSet::new());
    let group_id = group.id();
    let harness = Harness::with_group(Some(group)).await;

    assert!(harness.service.get_group(&actor("u3"), group_id).await.is_ok());
    assert!(matches!(
        harness.service.get_group(&actor("u9"), group_id).await,
        Err(AppError::NotAMember(_))
    ));

    let listed = harness
        .service
        .list_groups_for_actor(&actor("u2"))
        .await
        .unwrap_or_default();
    assert_eq!(listed.len(), 1);
}

struct UnavailableAuditRepository;

#[async_trait]
impl AuditRepository for UnavailableAuditRepository {
    async fn append_event(&self, _event: AuditEvent) -> AppResult<()> {
        Err(AppError::Internal("audit store unavailable".to_owned()))
    }
}

#[tokio::test]
async fn saved_mutation_survives_audit_failure() {
    let group = seeded_group(PermissionSet::new());
    let group_id = group.id();
    let repository = Arc::new(FakeGroupRepository::default());
    assert!(repository.create_group(group).await.is_ok());
    let service = GroupService::new(
        GroupAuthorizationService::new(catalog(), repository.clone()),
        repository.clone(),
        Arc::new(UnavailableAuditRepository),
    );

    let role_id = service
        .create_group_role(
            &actor("u1"),
            group_id,
            CreateGroupRoleInput {
                name: "helpers".to_owned(),
                permissions: PermissionSet::new(),
            },
        )
        .await;
    assert!(role_id.is_ok());

    let stored = repository
        .stored(group_id)
        .await
        .unwrap_or_else(|| unreachable!());
    assert_eq!(stored.roles().len(), 2);
}
