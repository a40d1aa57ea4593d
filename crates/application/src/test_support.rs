use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use huddle_core::{ActorId, AppError, AppResult};
use huddle_domain::{Group, GroupId, GroupRole, PermissionCatalog, PermissionSet, RoleId};

use crate::{AuditEvent, AuditRepository, GroupRepository};

#[derive(Default)]
pub(crate) struct FakeGroupRepository {
    pub(crate) groups: Mutex<HashMap<GroupId, Group>>,
}

impl FakeGroupRepository {
    pub(crate) async fn stored(&self, group_id: GroupId) -> Option<Group> {
        self.groups.lock().await.get(&group_id).cloned()
    }
}

#[async_trait]
impl GroupRepository for FakeGroupRepository {
    async fn create_group(&self, group: Group) -> AppResult<()> {
        let mut groups = self.groups.lock().await;
        if groups.contains_key(&group.id()) {
            return Err(AppError::Internal(format!(
                "group '{}' already exists",
                group.id()
            )));
        }
        groups.insert(group.id(), group);
        Ok(())
    }

    async fn find_group(&self, group_id: GroupId) -> AppResult<Option<Group>> {
        Ok(self.groups.lock().await.get(&group_id).cloned())
    }

    async fn save_group(&self, group: Group) -> AppResult<()> {
        self.groups.lock().await.insert(group.id(), group);
        Ok(())
    }

    async fn delete_group(&self, group_id: GroupId) -> AppResult<()> {
        self.groups.lock().await.remove(&group_id);
        Ok(())
    }

    async fn list_groups_for_member(&self, user_id: &ActorId) -> AppResult<Vec<Group>> {
        Ok(self
            .groups
            .lock()
            .await
            .values()
            .filter(|group| group.member(user_id).is_some())
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct FakeAuditRepository {
    pub(crate) events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

pub(crate) fn actor(value: &str) -> ActorId {
    ActorId::new(value).unwrap_or_else(|_| unreachable!())
}

pub(crate) fn catalog() -> Arc<PermissionCatalog> {
    Arc::new(PermissionCatalog::with_builtins())
}

/// Owner `u1`, member `u2` holding role `r1` with the given permissions,
/// member `u3` without roles, fallback from the catalog defaults.
pub(crate) fn seeded_group(r1_permissions: PermissionSet) -> Group {
    let mut group = Group::new(
        GroupId::new(),
        "g1",
        actor("u1"),
        PermissionCatalog::with_builtins().default_permission_set(),
    )
    .unwrap_or_else(|_| unreachable!());
    let role = GroupRole::new(RoleId::from_stored("r1"), "mods", r1_permissions)
        .unwrap_or_else(|_| unreachable!());
    assert!(group.add_role(role).is_ok());
    for member in ["u2", "u3"] {
        assert!(group.add_member(actor(member)).unwrap_or(false));
    }
    if let Ok(member) = group.member_mut(&actor("u2")) {
        member.append_roles([RoleId::from_stored("r1")]);
    }

    group
}
