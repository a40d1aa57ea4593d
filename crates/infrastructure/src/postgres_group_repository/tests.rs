use huddle_application::GroupRepository;
use huddle_core::{ActorId, AppError};
use huddle_domain::{
    CorePermission, Group, GroupId, GroupPanel, GroupRole, NewGroupPanel, PanelId,
    PanelPermissionMap, PanelSubject, PanelType, PermissionSet, RoleId,
};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresGroupRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres group tests: {error}");
    }

    Some(pool)
}

fn actor(value: &str) -> ActorId {
    ActorId::new(value).unwrap_or_else(|_| unreachable!())
}

fn configured_group(owner: &ActorId, member: &ActorId) -> Group {
    let mut group = Group::new(
        GroupId::new(),
        "postgres group",
        owner.clone(),
        PermissionSet::from([CorePermission::ViewPanel.key()]),
    )
    .unwrap_or_else(|_| unreachable!());
    let role_id = RoleId::generate();
    let role = GroupRole::new(
        role_id.clone(),
        "writers",
        PermissionSet::from([CorePermission::Message.key()]),
    )
    .unwrap_or_else(|_| unreachable!());
    assert!(group.add_role(role).is_ok());
    assert!(group.add_member(member.clone()).unwrap_or(false));

    let mut panel = GroupPanel::new(
        PanelId::generate(),
        NewGroupPanel {
            name: "general".to_owned(),
            parent_id: None,
            panel_type: PanelType::Text,
            provider: None,
            plugin_panel_name: None,
            meta: None,
        },
    )
    .unwrap_or_else(|_| unreachable!());
    panel.set_permissions(
        Some(PanelPermissionMap::from_iter([
            (PanelSubject::AllMembers, PermissionSet::new()),
            (PanelSubject::Role(role_id), PermissionSet::new()),
        ])),
        None,
    );
    assert!(group.add_panel(panel).is_ok());

    group
}

#[tokio::test]
async fn documents_roundtrip_and_list_by_member() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresGroupRepository::new(pool);
    let owner = actor(&format!("owner-{}", GroupId::new()));
    let member = actor(&format!("member-{}", GroupId::new()));
    let group = configured_group(&owner, &member);
    let group_id = group.id();

    assert!(repository.create_group(group.clone()).await.is_ok());
    let found = repository.find_group(group_id).await;
    assert!(found.is_ok());
    assert_eq!(found.unwrap_or_default(), Some(group));

    let listed = repository
        .list_groups_for_member(&member)
        .await
        .unwrap_or_default();
    assert_eq!(listed.len(), 1);

    assert!(repository.delete_group(group_id).await.is_ok());
    let deleted_again = repository.delete_group(group_id).await;
    assert!(matches!(deleted_again, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn save_overwrites_document() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresGroupRepository::new(pool);
    let owner = actor(&format!("owner-{}", GroupId::new()));
    let member = actor(&format!("member-{}", GroupId::new()));
    let mut group = configured_group(&owner, &member);
    let group_id = group.id();
    assert!(repository.create_group(group.clone()).await.is_ok());

    assert!(group.remove_member(&member).is_ok());
    assert!(repository.save_group(group).await.is_ok());

    let listed = repository
        .list_groups_for_member(&member)
        .await
        .unwrap_or_default();
    assert!(listed.is_empty());
    assert!(repository.delete_group(group_id).await.is_ok());
}
