use huddle_application::GroupRepository;
use huddle_core::{ActorId, AppError};
use huddle_domain::{Group, GroupId, PermissionSet};

use super::InMemoryGroupRepository;

fn actor(value: &str) -> ActorId {
    ActorId::new(value).unwrap_or_else(|_| unreachable!())
}

fn group(name: &str, owner: &str) -> Group {
    Group::new(GroupId::new(), name, actor(owner), PermissionSet::new())
        .unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn create_and_find_group() {
    let repository = InMemoryGroupRepository::new();
    let group = group("g1", "u1");
    let group_id = group.id();

    assert!(repository.create_group(group.clone()).await.is_ok());

    let found = repository.find_group(group_id).await;
    assert!(found.is_ok());
    assert_eq!(found.unwrap_or_default(), Some(group));
}

#[tokio::test]
async fn create_rejects_existing_id() {
    let repository = InMemoryGroupRepository::new();
    let group = group("g1", "u1");

    assert!(repository.create_group(group.clone()).await.is_ok());
    let duplicate = repository.create_group(group).await;
    assert!(matches!(duplicate, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn save_replaces_whole_document() {
    let repository = InMemoryGroupRepository::new();
    let mut group = group("g1", "u1");
    let group_id = group.id();
    assert!(repository.create_group(group.clone()).await.is_ok());

    assert!(group.add_member(actor("u2")).unwrap_or(false));
    assert!(repository.save_group(group).await.is_ok());

    let stored = repository.find_group(group_id).await.unwrap_or_default();
    assert_eq!(stored.map(|group| group.members().len()), Some(2));
}

#[tokio::test]
async fn save_and_delete_unknown_group_fail() {
    let repository = InMemoryGroupRepository::new();

    let saved = repository.save_group(group("g1", "u1")).await;
    assert!(matches!(saved, Err(AppError::NotFound(_))));

    let deleted = repository.delete_group(GroupId::new()).await;
    assert!(matches!(deleted, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn list_groups_only_returns_memberships() {
    let repository = InMemoryGroupRepository::new();
    let mut joined = group("b-joined", "u1");
    assert!(joined.add_member(actor("u2")).unwrap_or(false));
    assert!(repository.create_group(joined).await.is_ok());
    assert!(repository.create_group(group("a-owned", "u2")).await.is_ok());
    assert!(repository.create_group(group("c-other", "u3")).await.is_ok());

    let listed = repository
        .list_groups_for_member(&actor("u2"))
        .await
        .unwrap_or_default();
    let names: Vec<&str> = listed.iter().map(Group::name).collect();
    assert_eq!(names, vec!["a-owned", "b-joined"]);
}
