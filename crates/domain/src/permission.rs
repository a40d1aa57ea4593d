use std::collections::BTreeSet;
use std::str::FromStr;

use huddle_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::panel::PanelType;

const CORE_PREFIX: &str = "core.";
const PLUGIN_PREFIX: &str = "plugin.";

/// Namespaced permission identifier.
///
/// Built-in keys look like `core.<name>`; plugin keys look like
/// `plugin.<namespace>.<name>` where the namespace may itself contain dots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionKey(String);

/// Effective permission set produced by the resolvers.
pub type PermissionSet = BTreeSet<PermissionKey>;

impl PermissionKey {
    /// Creates a validated permission key.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();

        if value.is_empty() || value.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "permission key '{value}' must be non-empty and contain no whitespace"
            )));
        }

        let well_formed = if let Some(name) = value.strip_prefix(CORE_PREFIX) {
            !name.is_empty() && !name.contains('.')
        } else if let Some(rest) = value.strip_prefix(PLUGIN_PREFIX) {
            rest.rsplit_once('.')
                .is_some_and(|(namespace, name)| !namespace.is_empty() && !name.is_empty())
                && rest.split('.').all(|segment| !segment.is_empty())
        } else {
            false
        };

        if !well_formed {
            return Err(AppError::Validation(format!(
                "permission key '{value}' must match 'core.<name>' or 'plugin.<namespace>.<name>'"
            )));
        }

        Ok(Self(value))
    }

    /// Returns whether this key was contributed by a plugin.
    #[must_use]
    pub fn is_plugin(&self) -> bool {
        self.0.starts_with(PLUGIN_PREFIX)
    }

    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for PermissionKey {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionKey> for String {
    fn from(value: PermissionKey) -> Self {
        value.0
    }
}

impl FromStr for PermissionKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl std::fmt::Display for PermissionKey {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Parses transport values into a permission set.
pub fn parse_permission_set<I, S>(values: I) -> AppResult<PermissionSet>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(PermissionKey::new).collect()
}

/// Built-in permissions enforced by group policy checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorePermission {
    /// Allows viewing panels.
    ViewPanel,
    /// Allows sending messages in text panels.
    Message,
    /// Allows creating invite links.
    Invite,
    /// Allows creating invite links without expiry.
    UnlimitedInvite,
    /// Allows editing invite links.
    EditInvite,
    /// Allows viewing group details.
    GroupDetail,
    /// Allows editing group name, avatar and description.
    GroupBaseInfo,
    /// Allows editing group configuration.
    GroupConfig,
    /// Allows muting and removing members.
    ManageUser,
    /// Allows creating, editing and deleting panels.
    ManagePanel,
    /// Allows managing invite links.
    ManageInvite,
    /// Allows managing roles and role assignments.
    ManageRoles,
    /// Allows deleting other members' messages.
    DeleteMessage,
}

impl CorePermission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewPanel => "core.viewPanel",
            Self::Message => "core.message",
            Self::Invite => "core.invite",
            Self::UnlimitedInvite => "core.unlimitedInvite",
            Self::EditInvite => "core.editInvite",
            Self::GroupDetail => "core.groupDetail",
            Self::GroupBaseInfo => "core.groupBaseInfo",
            Self::GroupConfig => "core.groupConfig",
            Self::ManageUser => "core.manageUser",
            Self::ManagePanel => "core.managePanel",
            Self::ManageInvite => "core.manageInvite",
            Self::ManageRoles => "core.manageRoles",
            Self::DeleteMessage => "core.deleteMessage",
        }
    }

    /// Returns all built-in permissions in declaration order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[CorePermission] = &[
            CorePermission::ViewPanel,
            CorePermission::Message,
            CorePermission::Invite,
            CorePermission::UnlimitedInvite,
            CorePermission::EditInvite,
            CorePermission::GroupDetail,
            CorePermission::GroupBaseInfo,
            CorePermission::GroupConfig,
            CorePermission::ManageUser,
            CorePermission::ManagePanel,
            CorePermission::ManageInvite,
            CorePermission::ManageRoles,
            CorePermission::DeleteMessage,
        ];

        ALL
    }

    /// Returns the namespaced key for this permission.
    #[must_use]
    pub fn key(&self) -> PermissionKey {
        PermissionKey(self.as_str().to_owned())
    }

    /// Returns the catalog definition for this permission.
    #[must_use]
    pub fn definition(&self) -> PermissionDefinition {
        let (title, description) = match self {
            Self::ViewPanel => ("View panels", "Allows members to view panels"),
            Self::Message => (
                "Send messages",
                "Allows members to send messages in text panels",
            ),
            Self::Invite => ("Invite links", "Allows members to create invite links"),
            Self::UnlimitedInvite => (
                "Unlimited invite links",
                "Allows members to create invite links without expiry",
            ),
            Self::EditInvite => ("Edit invite links", "Allows members to edit invite links"),
            Self::GroupDetail => ("View group details", "Allows members to view group details"),
            Self::GroupBaseInfo => (
                "Edit group info",
                "Allows members to edit the group name, avatar and description",
            ),
            Self::GroupConfig => (
                "Edit group config",
                "Allows members to edit the group configuration",
            ),
            Self::ManageUser => (
                "Manage members",
                "Allows members to mute or remove other members",
            ),
            Self::ManagePanel => ("Manage panels", "Allows members to manage panels"),
            Self::ManageInvite => (
                "Manage invite links",
                "Allows members to manage all invite links",
            ),
            Self::ManageRoles => ("Manage roles", "Allows members to manage roles"),
            Self::DeleteMessage => (
                "Delete messages",
                "Allows members to delete messages sent by others",
            ),
        };

        let definition = PermissionDefinition::new(self.key(), title, description);
        match self {
            Self::ViewPanel => definition
                .with_default_granted(true)
                .with_panel_applicability(PanelApplicability::All),
            Self::Message => definition
                .with_default_granted(true)
                .with_panel_applicability(PanelApplicability::Only(BTreeSet::from([
                    PanelTarget::Builtin(PanelType::Text),
                ]))),
            Self::Invite | Self::GroupDetail => definition,
            Self::UnlimitedInvite => definition.with_requires([Self::Invite.key()]),
            Self::EditInvite => definition.with_requires([Self::UnlimitedInvite.key()]),
            Self::GroupBaseInfo
            | Self::GroupConfig
            | Self::ManageUser
            | Self::ManagePanel
            | Self::ManageInvite
            | Self::ManageRoles
            | Self::DeleteMessage => definition.with_requires([Self::GroupDetail.key()]),
        }
    }
}

impl FromStr for CorePermission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown core permission '{value}'")))
    }
}

/// Panel kind a permission may be edited on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PanelTarget {
    /// A built-in panel type.
    Builtin(PanelType),
    /// A plugin panel identified by its plugin panel name.
    Plugin(String),
}

/// Which panels show a permission in panel-level editors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "targets", rename_all = "snake_case")]
pub enum PanelApplicability {
    /// Group-scoped only.
    #[default]
    None,
    /// Every panel.
    All,
    /// Only the listed panel kinds.
    Only(BTreeSet<PanelTarget>),
}

/// Catalog entry describing one permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    key: PermissionKey,
    title: String,
    description: String,
    #[serde(default)]
    default_granted: bool,
    #[serde(default)]
    requires: BTreeSet<PermissionKey>,
    #[serde(default)]
    panel_applicability: PanelApplicability,
}

impl PermissionDefinition {
    /// Creates a definition that is not granted by default, has no
    /// prerequisites and is group-scoped only.
    #[must_use]
    pub fn new(key: PermissionKey, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key,
            title: title.into(),
            description: description.into(),
            default_granted: false,
            requires: BTreeSet::new(),
            panel_applicability: PanelApplicability::None,
        }
    }

    /// Marks the permission as part of the default fallback set.
    #[must_use]
    pub fn with_default_granted(mut self, default_granted: bool) -> Self {
        self.default_granted = default_granted;
        self
    }

    /// Declares editor prerequisites.
    #[must_use]
    pub fn with_requires(mut self, requires: impl IntoIterator<Item = PermissionKey>) -> Self {
        self.requires = requires.into_iter().collect();
        self
    }

    /// Declares panel applicability.
    #[must_use]
    pub fn with_panel_applicability(mut self, panel_applicability: PanelApplicability) -> Self {
        self.panel_applicability = panel_applicability;
        self
    }

    /// Returns the permission key.
    #[must_use]
    pub fn key(&self) -> &PermissionKey {
        &self.key
    }

    /// Returns the display title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the display description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns whether new groups grant this permission to everyone.
    #[must_use]
    pub fn default_granted(&self) -> bool {
        self.default_granted
    }

    /// Returns the advisory prerequisite keys.
    #[must_use]
    pub fn requires(&self) -> &BTreeSet<PermissionKey> {
        &self.requires
    }

    /// Returns the panel applicability.
    #[must_use]
    pub fn panel_applicability(&self) -> &PanelApplicability {
        &self.panel_applicability
    }
}
