use std::collections::HashMap;

use super::*;

use huddle_core::AppError;
use huddle_domain::{CorePermission, GroupPanel, NewGroupPanel, PanelId, PanelType};

use crate::CreateGroupInput;

impl GroupService {
    /// Creates a group owned by the actor, seeded with the default fallback.
    pub async fn create_group(&self, actor: &ActorId, input: CreateGroupInput) -> AppResult<Group> {
        let fallback = self
            .authorization_service
            .catalog()
            .default_permission_set();
        let mut group = Group::new(GroupId::new(), input.name, actor.clone(), fallback)?;

        let mut sections: HashMap<String, PanelId> = HashMap::new();
        for draft in input.panels {
            let parent_id = match draft.parent_draft_id {
                Some(parent_draft_id) => Some(sections.get(&parent_draft_id).cloned().ok_or_else(
                    || {
                        AppError::Validation(format!(
                            "panel '{}' names unknown section '{parent_draft_id}'",
                            draft.draft_id
                        ))
                    },
                )?),
                None => None,
            };

            let panel_type = draft.panel.panel_type;
            let panel = GroupPanel::new(
                PanelId::generate(),
                NewGroupPanel {
                    parent_id,
                    ..draft.panel
                },
            )?;
            if panel_type == PanelType::Group {
                sections.insert(draft.draft_id, panel.id().clone());
            }
            group.add_panel(panel)?;
        }

        self.validate_group(&group)?;
        self.repository.create_group(group.clone()).await?;

        self.append_audit(
            actor,
            group.id(),
            AuditAction::GroupCreated,
            "group",
            group.id().to_string(),
            format!("created group '{}'", group.name()),
        )
        .await;
        tracing::info!(group_id = %group.id(), owner = %actor, "group created");

        Ok(group)
    }

    /// Returns a group to one of its members or the system actor.
    pub async fn get_group(&self, actor: &ActorId, group_id: GroupId) -> AppResult<Group> {
        let group = self.authorization_service.load_group(group_id).await?;
        if !actor.is_system() && group.member(actor).is_none() {
            return Err(AppError::NotAMember(format!(
                "'{actor}' is not a member of group '{group_id}'"
            )));
        }

        Ok(group)
    }

    /// Lists groups in which the actor is a member.
    pub async fn list_groups_for_actor(&self, actor: &ActorId) -> AppResult<Vec<Group>> {
        let groups = self.repository.list_groups_for_member(actor).await?;
        for group in &groups {
            self.validate_group(group)?;
        }

        Ok(groups)
    }

    /// Replaces the group-wide fallback permissions.
    pub async fn update_group_fallback_permissions(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        permissions: PermissionSet,
    ) -> AppResult<()> {
        let mut group = self.authorization_service.load_group(group_id).await?;
        self.authorization_service
            .require_permission(&group, actor, CorePermission::ManageRoles)?;

        self.warn_unmet_requirements(group_id, "group_fallback", &permissions);
        let detail = format!("set group fallback to {} permission(s)", permissions.len());
        group.set_fallback_permissions(permissions);
        self.save_group(group).await?;

        self.append_audit(
            actor,
            group_id,
            AuditAction::GroupFallbackPermissionsUpdated,
            "group",
            group_id.to_string(),
            detail,
        )
        .await;

        Ok(())
    }

    /// Deletes a group. Only the owner and the system actor may do this.
    pub async fn delete_group(&self, actor: &ActorId, group_id: GroupId) -> AppResult<()> {
        let group = self.authorization_service.load_group(group_id).await?;
        if !actor.is_system() && !group.is_owner(actor) {
            return Err(AppError::NoPermission(format!(
                "only the owner may delete group '{group_id}'"
            )));
        }

        self.dissolve_group(actor, &group).await
    }

    /// Removes the actor from a group. The owner leaving dissolves the group.
    pub async fn quit_group(&self, actor: &ActorId, group_id: GroupId) -> AppResult<()> {
        let mut group = self.authorization_service.load_group(group_id).await?;
        if group.member(actor).is_none() {
            return Err(AppError::NotAMember(format!(
                "'{actor}' is not a member of group '{group_id}'"
            )));
        }
        if group.is_owner(actor) {
            return self.dissolve_group(actor, &group).await;
        }

        group.remove_member(actor)?;
        self.save_group(group).await?;

        self.append_audit(
            actor,
            group_id,
            AuditAction::GroupMemberQuit,
            "group_member",
            actor.to_string(),
            format!("'{actor}' left the group"),
        )
        .await;

        Ok(())
    }

    async fn dissolve_group(&self, actor: &ActorId, group: &Group) -> AppResult<()> {
        self.repository.delete_group(group.id()).await?;

        self.append_audit(
            actor,
            group.id(),
            AuditAction::GroupDeleted,
            "group",
            group.id().to_string(),
            format!("deleted group '{}'", group.name()),
        )
        .await;
        tracing::info!(group_id = %group.id(), actor = %actor, "group deleted");

        Ok(())
    }
}
