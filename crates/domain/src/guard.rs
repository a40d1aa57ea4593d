use std::str::FromStr;

use huddle_core::{ActorId, AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::catalog::PermissionCatalog;
use crate::group::Group;
use crate::permission::{CorePermission, PermissionKey};
use crate::resolver::resolve_group_permissions;

/// Member fields writable through the field guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemberField {
    /// Assigned role ids.
    Roles,
    /// Mute expiry.
    MuteUntil,
}

impl MemberField {
    /// Returns the stable field name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Roles => "roles",
            Self::MuteUntil => "muteUntil",
        }
    }

    /// Returns the permission required to write this field.
    #[must_use]
    pub fn required_permission(&self) -> CorePermission {
        match self {
            Self::Roles => CorePermission::ManageRoles,
            Self::MuteUntil => CorePermission::ManageUser,
        }
    }
}

impl FromStr for MemberField {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "roles" => Ok(Self::Roles),
            "muteUntil" => Ok(Self::MuteUntil),
            _ => Err(AppError::UnknownField(format!(
                "member field '{value}' has no guard mapping"
            ))),
        }
    }
}

/// Fails with `NoPermission` unless the actor's group-wide set holds `required`.
pub fn require_permission(
    catalog: &PermissionCatalog,
    group: &Group,
    actor: &ActorId,
    required: &PermissionKey,
) -> AppResult<()> {
    let permissions = resolve_group_permissions(catalog, group, actor)?;
    if permissions.contains(required) {
        return Ok(());
    }

    Err(AppError::NoPermission(format!(
        "'{actor}' lacks '{required}' in group '{}'",
        group.id()
    )))
}

/// Guards a write to a named member field.
///
/// Unknown field names fail with `UnknownField` before any resolution.
pub fn require_field_permission(
    catalog: &PermissionCatalog,
    group: &Group,
    actor: &ActorId,
    field_name: &str,
) -> AppResult<MemberField> {
    let field = MemberField::from_str(field_name)?;
    require_permission(catalog, group, actor, &field.required_permission().key())?;

    Ok(field)
}
