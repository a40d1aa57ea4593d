//! Effective permission resolution over an immutable group snapshot.

use huddle_core::{ActorId, AppError, AppResult};

use crate::catalog::PermissionCatalog;
use crate::group::{Group, GroupMember};
use crate::panel::GroupPanel;
use crate::permission::{PermissionKey, PermissionSet};

fn require_member<'a>(group: &'a Group, actor: &ActorId) -> AppResult<&'a GroupMember> {
    group.member(actor).ok_or_else(|| {
        AppError::NotAMember(format!("'{actor}' is not a member of group '{}'", group.id()))
    })
}

fn role_permissions(group: &Group, member: &GroupMember) -> PermissionSet {
    member
        .role_ids()
        .iter()
        .filter_map(|role_id| group.role(role_id))
        .flat_map(|role| role.permissions().iter().cloned())
        .collect()
}

/// Resolves the group-wide permissions of an actor.
///
/// The system actor and the owner hold the whole catalog. Other members hold
/// the union of their roles and the group fallback. Role ids without a
/// matching role contribute nothing.
pub fn resolve_group_permissions(
    catalog: &PermissionCatalog,
    group: &Group,
    actor: &ActorId,
) -> AppResult<PermissionSet> {
    if actor.is_system() {
        return Ok(catalog.universe());
    }

    let member = require_member(group, actor)?;
    let mut permissions = role_permissions(group, member);
    permissions.extend(group.fallback_permissions().iter().cloned());

    if group.is_owner(actor) {
        permissions.extend(catalog.universe());
    }

    Ok(permissions)
}

/// Resolves the permissions of an actor at one panel.
///
/// Panels without a permission map inherit the group-wide result. With a
/// map, a mapped role's entry replaces that role's contribution and the
/// all-members entry, when present, replaces the fallback.
pub fn resolve_panel_permissions(
    catalog: &PermissionCatalog,
    group: &Group,
    panel: &GroupPanel,
    actor: &ActorId,
) -> AppResult<PermissionSet> {
    if actor.is_system() || group.is_owner(actor) {
        return Ok(catalog.universe());
    }

    let member = require_member(group, actor)?;
    let Some(permission_map) = panel.permission_map() else {
        return resolve_group_permissions(catalog, group, actor);
    };

    let mut permissions = PermissionSet::new();
    for role_id in member.role_ids() {
        let contribution = permission_map
            .for_role(role_id)
            .or_else(|| group.role(role_id).map(|role| role.permissions()));
        if let Some(contribution) = contribution {
            permissions.extend(contribution.iter().cloned());
        }
    }

    let fallback = permission_map
        .for_all_members()
        .or(panel.fallback_permissions())
        .unwrap_or(group.fallback_permissions());
    permissions.extend(fallback.iter().cloned());

    Ok(permissions)
}

/// Answers, in input order, whether each key is in the resolved set.
#[must_use]
pub fn check_permissions(resolved: &PermissionSet, keys: &[PermissionKey]) -> Vec<bool> {
    keys.iter().map(|key| resolved.contains(key)).collect()
}
