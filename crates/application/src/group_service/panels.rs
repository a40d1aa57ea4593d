use super::*;

use huddle_domain::{CorePermission, GroupPanel, NewGroupPanel, PanelId};

use crate::ModifyGroupPanelInput;

impl GroupService {
    /// Creates a panel without permission overrides and returns its id.
    pub async fn create_group_panel(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        input: NewGroupPanel,
    ) -> AppResult<PanelId> {
        let mut group = self.authorization_service.load_group(group_id).await?;
        self.authorization_service
            .require_permission(&group, actor, CorePermission::ManagePanel)?;

        let panel = GroupPanel::new(PanelId::generate(), input)?;
        let panel_id = panel.id().clone();
        let detail = format!(
            "created {} panel '{}'",
            panel.panel_type().as_str(),
            panel.name()
        );
        group.add_panel(panel)?;
        self.save_group(group).await?;

        self.append_audit(
            actor,
            group_id,
            AuditAction::PanelCreated,
            "group_panel",
            panel_id.to_string(),
            detail,
        )
        .await;

        Ok(panel_id)
    }

    /// Replaces panel attributes and permission configuration.
    ///
    /// Omitting the permission map restores group-wide inheritance.
    pub async fn modify_group_panel(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        panel_id: &PanelId,
        input: ModifyGroupPanelInput,
    ) -> AppResult<()> {
        let mut group = self.authorization_service.load_group(group_id).await?;
        self.authorization_service
            .require_permission(&group, actor, CorePermission::ManagePanel)?;

        if let Some(permission_map) = &input.permission_map {
            for (_, permissions) in permission_map.iter() {
                self.warn_unmet_requirements(group_id, "panel", permissions);
            }
            for role_id in permission_map.role_ids() {
                if group.role(role_id).is_none() {
                    tracing::warn!(
                        group_id = %group_id,
                        panel_id = %panel_id,
                        role_id = %role_id,
                        "panel permission map names an unknown role"
                    );
                }
            }
        }

        let synced = input.permission_map.is_none();
        group.modify_panel(
            panel_id,
            input.panel,
            input.permission_map,
            input.fallback_permissions,
        )?;
        self.save_group(group).await?;

        let detail = if synced {
            "updated panel, permissions follow the group".to_owned()
        } else {
            "updated panel with permission overrides".to_owned()
        };
        self.append_audit(
            actor,
            group_id,
            AuditAction::PanelUpdated,
            "group_panel",
            panel_id.to_string(),
            detail,
        )
        .await;

        Ok(())
    }

    /// Deletes a panel with its permission configuration.
    ///
    /// Deleting a section also deletes the panels inside it.
    pub async fn delete_group_panel(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        panel_id: &PanelId,
    ) -> AppResult<Vec<PanelId>> {
        let mut group = self.authorization_service.load_group(group_id).await?;
        self.authorization_service
            .require_permission(&group, actor, CorePermission::ManagePanel)?;

        let removed = group.remove_panel(panel_id)?;
        self.save_group(group).await?;

        self.append_audit(
            actor,
            group_id,
            AuditAction::PanelDeleted,
            "group_panel",
            panel_id.to_string(),
            format!("deleted {} panel(s)", removed.len()),
        )
        .await;

        Ok(removed)
    }
}
