use std::collections::HashMap;

use async_trait::async_trait;
use huddle_application::GroupRepository;
use huddle_core::{ActorId, AppError, AppResult};
use huddle_domain::{Group, GroupId};
use tokio::sync::RwLock;

/// In-memory group document store.
///
/// Each call takes the lock on its own, so a load and a later save of the
/// same group are last-write-wins like the PostgreSQL store.
#[derive(Debug, Default)]
pub struct InMemoryGroupRepository {
    groups: RwLock<HashMap<GroupId, Group>>,
}

impl InMemoryGroupRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn create_group(&self, group: Group) -> AppResult<()> {
        let mut groups = self.groups.write().await;

        if groups.contains_key(&group.id()) {
            return Err(AppError::Validation(format!(
                "group '{}' already exists",
                group.id()
            )));
        }

        groups.insert(group.id(), group);
        Ok(())
    }

    async fn find_group(&self, group_id: GroupId) -> AppResult<Option<Group>> {
        Ok(self.groups.read().await.get(&group_id).cloned())
    }

    async fn save_group(&self, group: Group) -> AppResult<()> {
        let mut groups = self.groups.write().await;
        let Some(stored) = groups.get_mut(&group.id()) else {
            return Err(AppError::NotFound(format!(
                "group '{}' not found",
                group.id()
            )));
        };

        *stored = group;
        Ok(())
    }

    async fn delete_group(&self, group_id: GroupId) -> AppResult<()> {
        self.groups
            .write()
            .await
            .remove(&group_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("group '{group_id}' not found")))
    }

    async fn list_groups_for_member(&self, user_id: &ActorId) -> AppResult<Vec<Group>> {
        let groups = self.groups.read().await;

        let mut values: Vec<Group> = groups
            .values()
            .filter(|group| group.member(user_id).is_some())
            .cloned()
            .collect();
        values.sort_by(|left, right| left.name().cmp(right.name()));

        Ok(values)
    }
}

#[cfg(test)]
mod tests;
