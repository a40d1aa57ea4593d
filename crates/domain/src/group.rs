//! Group aggregate: members, roles, panels and group-wide fallback permissions.
//!
//! The aggregate is loaded and saved as one document. Role ids lingering on
//! members after a role is deleted are tolerated and resolve to nothing.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use huddle_core::{ActorId, AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::PermissionCatalog;
use crate::panel::{
    ALL_MEMBERS_KEY, GroupPanel, NewGroupPanel, PanelId, PanelPermissionMap, PanelType,
};
use crate::permission::{PermissionKey, PermissionSet};

/// Group identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(Uuid);

impl GroupId {
    /// Creates a random group identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a group identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a transport value into a group identifier.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid group id '{value}': {error}")))
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Role identifier, unique within one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoleId(String);

impl RoleId {
    /// Creates a role identifier from a transported value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation("role id must not be empty".to_owned()));
        }

        Ok(Self(value))
    }

    /// Wraps a stored value without validation.
    ///
    /// Stored documents may carry ids that later validation rejects.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh role identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the underlying identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for RoleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<RoleId> for String {
    fn from(value: RoleId) -> Self {
        value.0
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Named permission bundle assignable to members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRole {
    id: RoleId,
    name: NonEmptyString,
    #[serde(default)]
    permissions: PermissionSet,
}

impl GroupRole {
    /// Creates a role.
    pub fn new(id: RoleId, name: impl Into<String>, permissions: PermissionSet) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            permissions,
        })
    }

    /// Returns the role id.
    #[must_use]
    pub fn id(&self) -> &RoleId {
        &self.id
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the permissions granted by the role.
    #[must_use]
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }
}

/// Membership record of one user in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    user_id: ActorId,
    #[serde(default)]
    role_ids: Vec<RoleId>,
    #[serde(default)]
    mute_until: Option<DateTime<Utc>>,
}

impl GroupMember {
    /// Creates a member without roles.
    #[must_use]
    pub fn new(user_id: ActorId) -> Self {
        Self {
            user_id,
            role_ids: Vec::new(),
            mute_until: None,
        }
    }

    /// Creates a member holding the given roles.
    #[must_use]
    pub fn with_roles(user_id: ActorId, role_ids: impl IntoIterator<Item = RoleId>) -> Self {
        let mut member = Self::new(user_id);
        member.append_roles(role_ids);
        member
    }

    /// Returns the member user id.
    #[must_use]
    pub fn user_id(&self) -> &ActorId {
        &self.user_id
    }

    /// Returns assigned role ids, which may include deleted roles.
    #[must_use]
    pub fn role_ids(&self) -> &[RoleId] {
        self.role_ids.as_slice()
    }

    /// Returns the mute expiry.
    #[must_use]
    pub fn mute_until(&self) -> Option<DateTime<Utc>> {
        self.mute_until
    }

    /// Returns whether the member is muted at `now`.
    #[must_use]
    pub fn is_muted_at(&self, now: DateTime<Utc>) -> bool {
        self.mute_until.is_some_and(|until| until > now)
    }

    /// Replaces the assigned roles.
    pub fn set_roles(&mut self, role_ids: impl IntoIterator<Item = RoleId>) {
        self.role_ids.clear();
        self.append_roles(role_ids);
    }

    /// Adds roles not already assigned.
    pub fn append_roles(&mut self, role_ids: impl IntoIterator<Item = RoleId>) {
        for role_id in role_ids {
            if !self.role_ids.contains(&role_id) {
                self.role_ids.push(role_id);
            }
        }
    }

    /// Removes the given roles.
    pub fn remove_roles(&mut self, role_ids: &[RoleId]) {
        self.role_ids.retain(|role_id| !role_ids.contains(role_id));
    }

    /// Sets or clears the mute expiry.
    pub fn set_mute_until(&mut self, mute_until: Option<DateTime<Utc>>) {
        self.mute_until = mute_until;
    }
}

/// Non-fatal findings from group validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupValidationReport {
    /// Fallback keys absent from the catalog, possibly from unloaded plugins.
    pub unknown_fallback_permissions: Vec<PermissionKey>,
}

/// Group aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    name: NonEmptyString,
    owner_user_id: ActorId,
    #[serde(default)]
    members: Vec<GroupMember>,
    #[serde(default)]
    roles: Vec<GroupRole>,
    #[serde(default)]
    fallback_permissions: PermissionSet,
    #[serde(default)]
    panels: Vec<GroupPanel>,
}

impl Group {
    /// Creates a group whose only member is the owner.
    pub fn new(
        id: GroupId,
        name: impl Into<String>,
        owner_user_id: ActorId,
        fallback_permissions: PermissionSet,
    ) -> AppResult<Self> {
        if owner_user_id.is_system() {
            return Err(AppError::Validation(
                "the system actor cannot own a group".to_owned(),
            ));
        }

        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            members: vec![GroupMember::new(owner_user_id.clone())],
            owner_user_id,
            roles: Vec::new(),
            fallback_permissions,
            panels: Vec::new(),
        })
    }

    /// Checks aggregate integrity.
    ///
    /// Dangling role references are accepted. Unknown fallback keys are
    /// reported, not rejected.
    pub fn validate(&self, catalog: &PermissionCatalog) -> AppResult<GroupValidationReport> {
        if self.member(&self.owner_user_id).is_none() {
            return Err(AppError::Validation(format!(
                "owner '{}' of group '{}' is not a member",
                self.owner_user_id, self.id
            )));
        }

        let mut seen_roles = HashSet::new();
        for role in &self.roles {
            if !seen_roles.insert(role.id()) {
                return Err(AppError::DuplicateRoleId(format!(
                    "role '{}' appears more than once in group '{}'",
                    role.id(),
                    self.id
                )));
            }
        }

        let uses_panel_maps = self
            .panels
            .iter()
            .any(|panel| panel.permission_map().is_some());
        if uses_panel_maps && self.roles.iter().any(|role| role.id().as_str() == ALL_MEMBERS_KEY) {
            return Err(AppError::ReservedKeyConflict(format!(
                "role id '{ALL_MEMBERS_KEY}' in group '{}' collides with the all-members panel key",
                self.id
            )));
        }

        let mut seen_panels = HashSet::new();
        for panel in &self.panels {
            if !seen_panels.insert(panel.id()) {
                return Err(AppError::Validation(format!(
                    "panel '{}' appears more than once in group '{}'",
                    panel.id(),
                    self.id
                )));
            }
        }

        Ok(GroupValidationReport {
            unknown_fallback_permissions: catalog.unknown_keys(self.fallback_permissions.iter()),
        })
    }

    /// Returns the group id.
    #[must_use]
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Returns the group name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the owner id.
    #[must_use]
    pub fn owner_user_id(&self) -> &ActorId {
        &self.owner_user_id
    }

    /// Returns whether the actor owns the group.
    #[must_use]
    pub fn is_owner(&self, actor: &ActorId) -> bool {
        &self.owner_user_id == actor
    }

    /// Returns all members.
    #[must_use]
    pub fn members(&self) -> &[GroupMember] {
        self.members.as_slice()
    }

    /// Returns the membership record of a user.
    #[must_use]
    pub fn member(&self, user_id: &ActorId) -> Option<&GroupMember> {
        self.members.iter().find(|member| member.user_id() == user_id)
    }

    /// Returns the mutable membership record of a user.
    pub fn member_mut(&mut self, user_id: &ActorId) -> AppResult<&mut GroupMember> {
        let group_id = self.id;
        self.members
            .iter_mut()
            .find(|member| member.user_id() == user_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("member '{user_id}' not found in group '{group_id}'"))
            })
    }

    /// Appends a member. Returns `false` when the user is already a member.
    pub fn add_member(&mut self, user_id: ActorId) -> AppResult<bool> {
        if user_id.is_system() {
            return Err(AppError::Validation(
                "the system actor cannot join a group".to_owned(),
            ));
        }
        if self.member(&user_id).is_some() {
            return Ok(false);
        }

        self.members.push(GroupMember::new(user_id));
        Ok(true)
    }

    /// Removes a non-owner member.
    pub fn remove_member(&mut self, user_id: &ActorId) -> AppResult<()> {
        if self.is_owner(user_id) {
            return Err(AppError::Validation(format!(
                "owner '{user_id}' cannot be removed from group '{}'",
                self.id
            )));
        }

        let before = self.members.len();
        self.members.retain(|member| member.user_id() != user_id);
        if self.members.len() == before {
            return Err(AppError::NotFound(format!(
                "member '{user_id}' not found in group '{}'",
                self.id
            )));
        }

        Ok(())
    }

    /// Returns all roles.
    #[must_use]
    pub fn roles(&self) -> &[GroupRole] {
        self.roles.as_slice()
    }

    /// Returns a role by id.
    #[must_use]
    pub fn role(&self, role_id: &RoleId) -> Option<&GroupRole> {
        self.roles.iter().find(|role| role.id() == role_id)
    }

    fn role_mut(&mut self, role_id: &RoleId) -> AppResult<&mut GroupRole> {
        let group_id = self.id;
        self.roles
            .iter_mut()
            .find(|role| role.id() == role_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("role '{role_id}' not found in group '{group_id}'"))
            })
    }

    /// Appends a role.
    pub fn add_role(&mut self, role: GroupRole) -> AppResult<()> {
        if self.role(role.id()).is_some() {
            return Err(AppError::DuplicateRoleId(format!(
                "role '{}' already exists in group '{}'",
                role.id(),
                self.id
            )));
        }

        self.roles.push(role);
        Ok(())
    }

    /// Renames a role.
    pub fn rename_role(&mut self, role_id: &RoleId, name: impl Into<String>) -> AppResult<()> {
        let name = NonEmptyString::new(name)?;
        self.role_mut(role_id)?.name = name;
        Ok(())
    }

    /// Replaces the permissions of a role.
    pub fn set_role_permissions(
        &mut self,
        role_id: &RoleId,
        permissions: PermissionSet,
    ) -> AppResult<()> {
        self.role_mut(role_id)?.permissions = permissions;
        Ok(())
    }

    /// Deletes a role. Member assignments are left untouched.
    pub fn remove_role(&mut self, role_id: &RoleId) -> AppResult<GroupRole> {
        let position = self
            .roles
            .iter()
            .position(|role| role.id() == role_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("role '{role_id}' not found in group '{}'", self.id))
            })?;

        Ok(self.roles.remove(position))
    }

    /// Returns the group-wide fallback permissions.
    #[must_use]
    pub fn fallback_permissions(&self) -> &PermissionSet {
        &self.fallback_permissions
    }

    /// Replaces the group-wide fallback permissions.
    pub fn set_fallback_permissions(&mut self, permissions: PermissionSet) {
        self.fallback_permissions = permissions;
    }

    /// Returns all panels.
    #[must_use]
    pub fn panels(&self) -> &[GroupPanel] {
        self.panels.as_slice()
    }

    /// Returns a panel by id.
    #[must_use]
    pub fn panel(&self, panel_id: &PanelId) -> Option<&GroupPanel> {
        self.panels.iter().find(|panel| panel.id() == panel_id)
    }

    /// Returns a panel by id or fails with `NotFound`.
    pub fn require_panel(&self, panel_id: &PanelId) -> AppResult<&GroupPanel> {
        self.panel(panel_id).ok_or_else(|| {
            AppError::NotFound(format!("panel '{panel_id}' not found in group '{}'", self.id))
        })
    }

    /// Returns a mutable panel by id.
    pub fn panel_mut(&mut self, panel_id: &PanelId) -> AppResult<&mut GroupPanel> {
        let group_id = self.id;
        self.panels
            .iter_mut()
            .find(|panel| panel.id() == panel_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("panel '{panel_id}' not found in group '{group_id}'"))
            })
    }

    /// Checks that a parent reference points at an existing section.
    pub fn ensure_section(&self, parent_id: Option<&PanelId>) -> AppResult<()> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };

        match self.panel(parent_id) {
            Some(parent) if parent.panel_type() == PanelType::Group => Ok(()),
            Some(_) => Err(AppError::Validation(format!(
                "parent panel '{parent_id}' is not a section"
            ))),
            None => Err(AppError::NotFound(format!(
                "parent panel '{parent_id}' not found in group '{}'",
                self.id
            ))),
        }
    }

    /// Checks where a panel may sit in the panel tree.
    ///
    /// Sections stay at the top level, and a section keeps its type while
    /// other panels still sit inside it.
    fn ensure_placement(
        &self,
        panel_id: &PanelId,
        panel_type: PanelType,
        parent_id: Option<&PanelId>,
    ) -> AppResult<()> {
        if parent_id == Some(panel_id) {
            return Err(AppError::Validation(format!(
                "panel '{panel_id}' cannot be its own parent"
            )));
        }
        if panel_type == PanelType::Group && parent_id.is_some() {
            return Err(AppError::Validation(format!(
                "section '{panel_id}' cannot be nested in another section"
            )));
        }
        self.ensure_section(parent_id)?;

        let has_children = self
            .panels
            .iter()
            .any(|panel| panel.parent_id() == Some(panel_id));
        if panel_type != PanelType::Group && has_children {
            return Err(AppError::Validation(format!(
                "panel '{panel_id}' still contains panels and must stay a section"
            )));
        }

        Ok(())
    }

    /// Replaces the attributes and permission configuration of a panel.
    ///
    /// An absent permission map restores group-wide inheritance.
    pub fn modify_panel(
        &mut self,
        panel_id: &PanelId,
        input: NewGroupPanel,
        permission_map: Option<PanelPermissionMap>,
        fallback_permissions: Option<PermissionSet>,
    ) -> AppResult<()> {
        self.require_panel(panel_id)?;
        self.ensure_placement(panel_id, input.panel_type, input.parent_id.as_ref())?;

        let panel = self.panel_mut(panel_id)?;
        panel.apply(input)?;
        panel.set_permissions(permission_map, fallback_permissions);
        Ok(())
    }

    /// Appends a panel whose parent, if any, is an existing section.
    pub fn add_panel(&mut self, panel: GroupPanel) -> AppResult<()> {
        if self.panel(panel.id()).is_some() {
            return Err(AppError::Validation(format!(
                "panel '{}' already exists in group '{}'",
                panel.id(),
                self.id
            )));
        }
        self.ensure_placement(panel.id(), panel.panel_type(), panel.parent_id())?;

        self.panels.push(panel);
        Ok(())
    }

    /// Deletes a panel together with its permission configuration.
    ///
    /// Deleting a section also deletes the panels it contains. Returns the
    /// removed panel ids.
    pub fn remove_panel(&mut self, panel_id: &PanelId) -> AppResult<Vec<PanelId>> {
        self.require_panel(panel_id)?;

        let mut removed = vec![panel_id.clone()];
        let mut cursor = 0;
        while let Some(parent_id) = removed.get(cursor).cloned() {
            let children: Vec<PanelId> = self
                .panels
                .iter()
                .filter(|panel| panel.parent_id() == Some(&parent_id))
                .filter(|panel| !removed.contains(panel.id()))
                .map(|panel| panel.id().clone())
                .collect();
            removed.extend(children);
            cursor += 1;
        }
        self.panels.retain(|panel| !removed.contains(panel.id()));

        Ok(removed)
    }
}
