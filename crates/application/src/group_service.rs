use std::sync::Arc;

use huddle_core::{ActorId, AppResult};
use huddle_domain::{AuditAction, Group, GroupId, PermissionSet};

use crate::{AuditEvent, AuditRepository, GroupAuthorizationService, GroupRepository};

mod groups;
mod members;
mod panels;
mod roles;

/// Application service for guarded group mutations.
///
/// Every mutation loads the whole aggregate, checks the guard, applies the
/// change in memory, validates, saves the whole aggregate and appends an
/// audit event. Audit failures after a save are logged, not returned.
#[derive(Clone)]
pub struct GroupService {
    authorization_service: GroupAuthorizationService,
    repository: Arc<dyn GroupRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl GroupService {
    /// Creates a new group service.
    #[must_use]
    pub fn new(
        authorization_service: GroupAuthorizationService,
        repository: Arc<dyn GroupRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_repository,
        }
    }

    fn validate_group(&self, group: &Group) -> AppResult<()> {
        self.authorization_service.validate_group(group)
    }

    async fn save_group(&self, group: Group) -> AppResult<()> {
        self.validate_group(&group)?;
        self.repository.save_group(group).await
    }

    /// Records a committed mutation. The write is already saved, so a failed
    /// append is logged and does not fail the caller.
    async fn append_audit(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: String,
    ) {
        let appended = self
            .audit_repository
            .append_event(AuditEvent {
                group_id,
                subject: actor.as_str().to_owned(),
                action,
                resource_type: resource_type.to_owned(),
                resource_id,
                detail: Some(detail),
            })
            .await;
        if let Err(error) = appended {
            tracing::warn!(
                group_id = %group_id,
                action = action.as_str(),
                %error,
                "audit append failed after the group was saved"
            );
        }
    }

    fn warn_unmet_requirements(
        &self,
        group_id: GroupId,
        scope: &str,
        permissions: &PermissionSet,
    ) {
        for unmet in self
            .authorization_service
            .catalog()
            .unmet_requirements(permissions)
        {
            let missing: Vec<&str> = unmet.missing.iter().map(|key| key.as_str()).collect();
            tracing::warn!(
                group_id = %group_id,
                scope,
                permission = %unmet.key,
                missing = ?missing,
                "permission granted without its prerequisites"
            );
        }
    }
}

#[cfg(test)]
mod tests;
