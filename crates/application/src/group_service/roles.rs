use super::*;

use huddle_domain::{CorePermission, GroupRole, RoleId};

use crate::CreateGroupRoleInput;

impl GroupService {
    /// Creates a role and returns its generated id.
    pub async fn create_group_role(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        input: CreateGroupRoleInput,
    ) -> AppResult<RoleId> {
        let mut group = self.authorization_service.load_group(group_id).await?;
        self.authorization_service
            .require_permission(&group, actor, CorePermission::ManageRoles)?;

        self.warn_unmet_requirements(group_id, "role", &input.permissions);
        let role = GroupRole::new(RoleId::generate(), input.name, input.permissions)?;
        let role_id = role.id().clone();
        let detail = format!("created role '{}'", role.name());
        group.add_role(role)?;
        self.save_group(group).await?;

        self.append_audit(
            actor,
            group_id,
            AuditAction::RoleCreated,
            "group_role",
            role_id.to_string(),
            detail,
        )
        .await;

        Ok(role_id)
    }

    /// Replaces, never merges, the permissions of a role.
    pub async fn update_group_role_permission(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        role_id: &RoleId,
        permissions: PermissionSet,
    ) -> AppResult<()> {
        let mut group = self.authorization_service.load_group(group_id).await?;
        self.authorization_service
            .require_permission(&group, actor, CorePermission::ManageRoles)?;

        self.warn_unmet_requirements(group_id, "role", &permissions);
        let detail = format!("set role permissions to {} key(s)", permissions.len());
        group.set_role_permissions(role_id, permissions)?;
        self.save_group(group).await?;

        self.append_audit(
            actor,
            group_id,
            AuditAction::RolePermissionsUpdated,
            "group_role",
            role_id.to_string(),
            detail,
        )
        .await;

        Ok(())
    }

    /// Renames a role.
    pub async fn update_group_role_name(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        role_id: &RoleId,
        name: String,
    ) -> AppResult<()> {
        let mut group = self.authorization_service.load_group(group_id).await?;
        self.authorization_service
            .require_permission(&group, actor, CorePermission::ManageRoles)?;

        let detail = format!("renamed role to '{name}'");
        group.rename_role(role_id, name)?;
        self.save_group(group).await?;

        self.append_audit(
            actor,
            group_id,
            AuditAction::RoleRenamed,
            "group_role",
            role_id.to_string(),
            detail,
        )
        .await;

        Ok(())
    }

    /// Deletes a role. Member assignments referencing it are kept.
    pub async fn delete_group_role(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        role_id: &RoleId,
    ) -> AppResult<()> {
        let mut group = self.authorization_service.load_group(group_id).await?;
        self.authorization_service
            .require_permission(&group, actor, CorePermission::ManageRoles)?;

        let role = group.remove_role(role_id)?;
        self.save_group(group).await?;

        self.append_audit(
            actor,
            group_id,
            AuditAction::RoleDeleted,
            "group_role",
            role_id.to_string(),
            format!("deleted role '{}'", role.name()),
        )
        .await;

        Ok(())
    }
}
