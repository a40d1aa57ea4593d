use std::collections::BTreeMap;

use huddle_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::group::RoleId;
use crate::permission::PermissionSet;

/// Literal representation of the all-members key in panel permission maps.
pub const ALL_MEMBERS_KEY: &str = "@all";

/// Panel identifier, unique within one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PanelId(String);

impl PanelId {
    /// Creates a panel identifier from a stored or transported value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation("panel id must not be empty".to_owned()));
        }

        Ok(Self(value))
    }

    /// Generates a fresh panel identifier.
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

impl TryFrom<String> for PanelId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PanelId> for String {
    fn from(value: PanelId) -> Self {
        value.0
    }
}

impl std::fmt::Display for PanelId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Panel kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelType {
    /// Text channel.
    Text,
    /// Section that groups other panels.
    Group,
    /// Panel rendered by a plugin.
    Plugin,
}

impl PanelType {
    /// Returns a stable storage value for this panel type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Group => "group",
            Self::Plugin => "plugin",
        }
    }

    /// Parses a transport value into a panel type.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "text" => Ok(Self::Text),
            "group" => Ok(Self::Group),
            "plugin" => Ok(Self::Plugin),
            _ => Err(AppError::Validation(format!(
                "unknown panel type '{value}'"
            ))),
        }
    }
}

/// Key of a panel permission map entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PanelSubject {
    /// Every member regardless of role.
    AllMembers,
    /// Members holding one role.
    Role(RoleId),
}

impl From<String> for PanelSubject {
    fn from(value: String) -> Self {
        if value == ALL_MEMBERS_KEY {
            Self::AllMembers
        } else {
            Self::Role(RoleId::from_stored(value))
        }
    }
}

impl From<PanelSubject> for String {
    fn from(value: PanelSubject) -> Self {
        match value {
            PanelSubject::AllMembers => ALL_MEMBERS_KEY.to_owned(),
            PanelSubject::Role(role_id) => role_id.into(),
        }
    }
}

/// Panel-scoped permission overrides keyed by role or all members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelPermissionMap(BTreeMap<PanelSubject, PermissionSet>);

impl PanelPermissionMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the permissions for one subject, replacing any previous entry.
    pub fn insert(&mut self, subject: PanelSubject, permissions: PermissionSet) {
        self.0.insert(subject, permissions);
    }

    /// Returns the override for a role, if one is configured.
    #[must_use]
    pub fn for_role(&self, role_id: &RoleId) -> Option<&PermissionSet> {
        self.0.get(&PanelSubject::Role(role_id.clone()))
    }

    /// Returns the all-members entry, if one is configured.
    #[must_use]
    pub fn for_all_members(&self) -> Option<&PermissionSet> {
        self.0.get(&PanelSubject::AllMembers)
    }

    /// Iterates over configured entries.
    pub fn iter(&self) -> impl Iterator<Item = (&PanelSubject, &PermissionSet)> {
        self.0.iter()
    }

    /// Returns role ids referenced by the map.
    pub fn role_ids(&self) -> impl Iterator<Item = &RoleId> {
        self.0.keys().filter_map(|subject| match subject {
            PanelSubject::Role(role_id) => Some(role_id),
            PanelSubject::AllMembers => None,
        })
    }
}

impl FromIterator<(PanelSubject, PermissionSet)> for PanelPermissionMap {
    fn from_iter<T: IntoIterator<Item = (PanelSubject, PermissionSet)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Descriptive panel attributes supplied on create or modify.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGroupPanel {
    /// Display name.
    pub name: String,
    /// Parent section id.
    pub parent_id: Option<PanelId>,
    /// Panel kind.
    pub panel_type: PanelType,
    /// Providing plugin identifier, for plugin panels.
    pub provider: Option<String>,
    /// Plugin panel name, for plugin panels.
    pub plugin_panel_name: Option<String>,
    /// Opaque panel data.
    pub meta: Option<Value>,
}

/// Sub-channel of a group with optional permission overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupPanel {
    id: PanelId,
    name: NonEmptyString,
    #[serde(default)]
    parent_id: Option<PanelId>,
    panel_type: PanelType,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    plugin_panel_name: Option<String>,
    #[serde(default)]
    meta: Option<Value>,
    #[serde(default)]
    permission_map: Option<PanelPermissionMap>,
    #[serde(default)]
    fallback_permissions: Option<PermissionSet>,
}

impl GroupPanel {
    /// Creates a panel without permission overrides.
    pub fn new(id: PanelId, input: NewGroupPanel) -> AppResult<Self> {
        let mut panel = Self {
            id,
            name: NonEmptyString::new(input.name.clone())?,
            parent_id: None,
            panel_type: input.panel_type,
            provider: None,
            plugin_panel_name: None,
            meta: None,
            permission_map: None,
            fallback_permissions: None,
        };
        panel.apply(input)?;

        Ok(panel)
    }

    /// Replaces descriptive attributes, keeping id and permission configuration.
    pub fn apply(&mut self, input: NewGroupPanel) -> AppResult<()> {
        if input.panel_type == PanelType::Plugin
            && input
                .plugin_panel_name
                .as_deref()
                .is_none_or(|name| name.trim().is_empty())
        {
            return Err(AppError::Validation(
                "plugin panels require a plugin panel name".to_owned(),
            ));
        }
        if input.parent_id.as_ref() == Some(&self.id) {
            return Err(AppError::Validation(format!(
                "panel '{}' cannot be its own parent",
                self.id
            )));
        }

        self.name = NonEmptyString::new(input.name)?;
        self.parent_id = input.parent_id;
        self.panel_type = input.panel_type;
        self.provider = input.provider;
        self.plugin_panel_name = input.plugin_panel_name;
        self.meta = input.meta;
        Ok(())
    }

    /// Replaces the panel permission configuration.
    ///
    /// `None` for the map restores group-wide inheritance.
    pub fn set_permissions(
        &mut self,
        permission_map: Option<PanelPermissionMap>,
        fallback_permissions: Option<PermissionSet>,
    ) {
        self.permission_map = permission_map;
        self.fallback_permissions = fallback_permissions;
    }

    /// Returns the panel id.
    #[must_use]
    pub fn id(&self) -> &PanelId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the parent section id.
    #[must_use]
    pub fn parent_id(&self) -> Option<&PanelId> {
        self.parent_id.as_ref()
    }

    /// Returns the panel kind.
    #[must_use]
    pub fn panel_type(&self) -> PanelType {
        self.panel_type
    }

    /// Returns the providing plugin.
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Returns the plugin panel name.
    #[must_use]
    pub fn plugin_panel_name(&self) -> Option<&str> {
        self.plugin_panel_name.as_deref()
    }

    /// Returns opaque panel data.
    #[must_use]
    pub fn meta(&self) -> Option<&Value> {
        self.meta.as_ref()
    }

    /// Returns the panel permission overrides.
    #[must_use]
    pub fn permission_map(&self) -> Option<&PanelPermissionMap> {
        self.permission_map.as_ref()
    }

    /// Returns the panel fallback permissions.
    #[must_use]
    pub fn fallback_permissions(&self) -> Option<&PermissionSet> {
        self.fallback_permissions.as_ref()
    }
}
