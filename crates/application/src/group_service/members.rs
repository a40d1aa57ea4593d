use super::*;

use chrono::{DateTime, Utc};
use huddle_core::AppError;
use huddle_domain::{CorePermission, MemberField, RoleId};
use serde_json::Value;

use crate::{MemberFieldUpdate, MemberRolesInput};

fn parse_field_value<T: serde::de::DeserializeOwned>(field: MemberField, value: Value) -> AppResult<T> {
    serde_json::from_value(value).map_err(|error| {
        AppError::Validation(format!("invalid value for member field '{}': {error}", field.as_str()))
    })
}

impl GroupService {
    /// Adds users to a group, skipping those already present.
    ///
    /// Returns the users that were actually added.
    pub async fn add_group_members(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        user_ids: Vec<ActorId>,
    ) -> AppResult<Vec<ActorId>> {
        let mut group = self.authorization_service.load_group(group_id).await?;
        self.authorization_service
            .require_permission(&group, actor, CorePermission::Invite)?;

        let mut added = Vec::new();
        for user_id in user_ids {
            if group.add_member(user_id.clone())? {
                added.push(user_id);
            }
        }
        if added.is_empty() {
            return Ok(added);
        }
        self.save_group(group).await?;

        let names: Vec<&str> = added.iter().map(ActorId::as_str).collect();
        self.append_audit(
            actor,
            group_id,
            AuditAction::MembersAdded,
            "group_member",
            names.join(","),
            format!("added {} member(s)", added.len()),
        )
        .await;

        Ok(added)
    }

    /// Removes a member on behalf of another member. The owner cannot be kicked.
    pub async fn kick_group_member(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        member_id: &ActorId,
    ) -> AppResult<()> {
        let mut group = self.authorization_service.load_group(group_id).await?;
        self.authorization_service
            .require_permission(&group, actor, CorePermission::ManageUser)?;
        if group.is_owner(member_id) {
            return Err(AppError::NoPermission(format!(
                "the owner of group '{group_id}' cannot be removed"
            )));
        }

        group.remove_member(member_id)?;
        self.save_group(group).await?;

        self.append_audit(
            actor,
            group_id,
            AuditAction::MemberKicked,
            "group_member",
            member_id.to_string(),
            format!("removed '{member_id}' from the group"),
        )
        .await;

        Ok(())
    }

    /// Adds roles to several members. Every role must exist.
    pub async fn append_group_member_roles(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        input: MemberRolesInput,
    ) -> AppResult<()> {
        let mut group = self.authorization_service.load_group(group_id).await?;
        self.authorization_service
            .require_field_permission(&group, actor, MemberField::Roles.as_str())?;

        if let Some(missing) = input
            .role_ids
            .iter()
            .find(|role_id| group.role(role_id).is_none())
        {
            return Err(AppError::NotFound(format!(
                "role '{missing}' not found in group '{group_id}'"
            )));
        }
        for member_id in &input.member_ids {
            group
                .member_mut(member_id)?
                .append_roles(input.role_ids.iter().cloned());
        }
        self.save_group(group).await?;

        self.append_member_roles_audit(actor, group_id, &input, "appended")
            .await
    }

    /// Removes roles from several members.
    pub async fn remove_group_member_roles(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        input: MemberRolesInput,
    ) -> AppResult<()> {
        let mut group = self.authorization_service.load_group(group_id).await?;
        self.authorization_service
            .require_field_permission(&group, actor, MemberField::Roles.as_str())?;

        for member_id in &input.member_ids {
            group.member_mut(member_id)?.remove_roles(&input.role_ids);
        }
        self.save_group(group).await?;

        self.append_member_roles_audit(actor, group_id, &input, "removed")
            .await
    }

    /// Mutes a member until the given instant, or lifts the mute with `None`.
    pub async fn mute_group_member(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        member_id: &ActorId,
        mute_until: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let mut group = self.authorization_service.load_group(group_id).await?;
        self.authorization_service
            .require_field_permission(&group, actor, MemberField::MuteUntil.as_str())?;

        group.member_mut(member_id)?.set_mute_until(mute_until);
        self.save_group(group).await?;

        self.append_mute_audit(actor, group_id, member_id, mute_until)
            .await
    }

    /// Writes one member field by name after the field guard passes.
    ///
    /// `roles` replaces the member's role ids. `muteUntil` takes an RFC 3339
    /// instant or `null`.
    pub async fn update_group_member_field(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        update: MemberFieldUpdate,
    ) -> AppResult<()> {
        let mut group = self.authorization_service.load_group(group_id).await?;
        let field = self
            .authorization_service
            .require_field_permission(&group, actor, &update.field_name)?;

        match field {
            MemberField::Roles => {
                let role_ids: Vec<RoleId> = parse_field_value(field, update.value)?;
                group
                    .member_mut(&update.member_id)?
                    .set_roles(role_ids.iter().cloned());
                self.save_group(group).await?;

                let input = MemberRolesInput {
                    member_ids: vec![update.member_id],
                    role_ids,
                };
                self.append_member_roles_audit(actor, group_id, &input, "replaced")
                    .await
            }
            MemberField::MuteUntil => {
                let mute_until: Option<DateTime<Utc>> = parse_field_value(field, update.value)?;
                group
                    .member_mut(&update.member_id)?
                    .set_mute_until(mute_until);
                self.save_group(group).await?;

                self.append_mute_audit(actor, group_id, &update.member_id, mute_until)
                    .await
            }
        }
    }

    async fn append_member_roles_audit(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        input: &MemberRolesInput,
        verb: &str,
    ) -> AppResult<()> {
        let members: Vec<&str> = input.member_ids.iter().map(ActorId::as_str).collect();
        let roles: Vec<&str> = input.role_ids.iter().map(RoleId::as_str).collect();

        self.append_audit(
            actor,
            group_id,
            AuditAction::MemberRolesUpdated,
            "group_member",
            members.join(","),
            format!("{verb} roles [{}]", roles.join(",")),
        )
        .await;

        Ok(())
    }

    async fn append_mute_audit(
        &self,
        actor: &ActorId,
        group_id: GroupId,
        member_id: &ActorId,
        mute_until: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let detail = match mute_until {
            Some(until) => format!("muted until {}", until.to_rfc3339()),
            None => "unmuted".to_owned(),
        };

        self.append_audit(
            actor,
            group_id,
            AuditAction::MemberMuteUpdated,
            "group_member",
            member_id.to_string(),
            detail,
        )
        .await;

        Ok(())
    }
}
