use std::sync::Arc;

use chrono::{DateTime, Utc};
use huddle_core::{ActorId, AppError, AppResult};
use huddle_domain::{
    CorePermission, Group, GroupId, MemberField, PanelId, PanelType, PermissionCatalog,
    PermissionDefinition, PermissionKey, PermissionSet, check_permissions,
    require_field_permission, require_permission, resolve_group_permissions,
    resolve_panel_permissions,
};

use crate::GroupRepository;

/// Application service answering permission questions against stored groups.
///
/// Other services call this instead of resolving permissions themselves.
#[derive(Clone)]
pub struct GroupAuthorizationService {
    catalog: Arc<PermissionCatalog>,
    repository: Arc<dyn GroupRepository>,
}

impl GroupAuthorizationService {
    /// Creates a new authorization service over a loaded catalog.
    #[must_use]
    pub fn new(catalog: Arc<PermissionCatalog>, repository: Arc<dyn GroupRepository>) -> Self {
        Self {
            catalog,
            repository,
        }
    }

    /// Returns the process-wide permission catalog.
    #[must_use]
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Loads a group snapshot or fails with `NotFound`.
    ///
    /// A stored group that breaks aggregate integrity fails the load instead
    /// of being resolved.
    pub async fn load_group(&self, group_id: GroupId) -> AppResult<Group> {
        let group = self
            .repository
            .find_group(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{group_id}' not found")))?;
        self.validate_group(&group)?;

        Ok(group)
    }

    /// Checks aggregate integrity, logging advisory findings.
    pub fn validate_group(&self, group: &Group) -> AppResult<()> {
        let report = group.validate(&self.catalog).inspect_err(|error| {
            tracing::error!(group_id = %group.id(), %error, "group failed integrity checks");
        })?;
        for key in &report.unknown_fallback_permissions {
            tracing::warn!(
                group_id = %group.id(),
                permission = %key,
                "fallback permission is not in the catalog"
            );
        }

        Ok(())
    }

    /// Returns the group-wide permissions of the actor.
    pub async fn group_permissions(
        &self,
        actor: &ActorId,
        group_id: GroupId,
    ) -> AppResult<PermissionSet> {
        let group = self.load_group(group_id).await?;
        resolve_group_permissions(&self.catalog, &group, actor)
    }

    /// Returns the permissions of the actor at one panel.
    pub async fn panel_permissions(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        panel_id: &PanelId,
    ) -> AppResult<PermissionSet> {
        let group = self.load_group(group_id).await?;
        let panel = group.require_panel(panel_id)?;
        resolve_panel_permissions(&self.catalog, &group, panel, actor)
    }

    /// Answers, in input order, whether the user holds each key group-wide.
    pub async fn check_user_permissions(
        &self,
        group_id: GroupId,
        user_id: &ActorId,
        keys: &[PermissionKey],
    ) -> AppResult<Vec<bool>> {
        let resolved = self.group_permissions(user_id, group_id).await?;
        Ok(check_permissions(&resolved, keys))
    }

    /// Lists definitions editable on a panel, for members of its group.
    pub async fn panel_permission_definitions(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        panel_id: &PanelId,
    ) -> AppResult<Vec<PermissionDefinition>> {
        let group = self.load_group(group_id).await?;
        resolve_group_permissions(&self.catalog, &group, actor)?;
        let panel = group.require_panel(panel_id)?;

        Ok(self
            .catalog
            .applicable_to(panel)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Fails with `NoPermission` unless the actor holds the permission group-wide.
    pub fn require_permission(
        &self,
        group: &Group,
        actor: &ActorId,
        permission: CorePermission,
    ) -> AppResult<()> {
        require_permission(&self.catalog, group, actor, &permission.key()).inspect_err(|error| {
            tracing::debug!(
                group_id = %group.id(),
                actor = %actor,
                permission = permission.as_str(),
                %error,
                "group permission check denied"
            );
        })
    }

    /// Guards a write to a named member field.
    pub fn require_field_permission(
        &self,
        group: &Group,
        actor: &ActorId,
        field_name: &str,
    ) -> AppResult<MemberField> {
        require_field_permission(&self.catalog, group, actor, field_name).inspect_err(|error| {
            tracing::debug!(
                group_id = %group.id(),
                actor = %actor,
                field = field_name,
                %error,
                "member field check denied"
            );
        })
    }

    /// Ensures the actor may post a message in a text panel at `now`.
    pub async fn ensure_can_post_message(
        &self,
        group_id: GroupId,
        panel_id: &PanelId,
        actor: &ActorId,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let group = self.load_group(group_id).await?;
        let panel = group.require_panel(panel_id)?;
        if panel.panel_type() != PanelType::Text {
            return Err(AppError::Validation(format!(
                "panel '{panel_id}' does not accept messages"
            )));
        }

        let permissions = resolve_panel_permissions(&self.catalog, &group, panel, actor)?;
        if !permissions.contains(&CorePermission::Message.key()) {
            return Err(AppError::NoPermission(format!(
                "'{actor}' may not post in panel '{panel_id}'"
            )));
        }

        if actor.is_system() || group.is_owner(actor) {
            return Ok(());
        }
        let muted = group
            .member(actor)
            .is_some_and(|member| member.is_muted_at(now));
        if muted {
            return Err(AppError::NoPermission(format!(
                "'{actor}' is muted in group '{group_id}'"
            )));
        }

        Ok(())
    }
}
