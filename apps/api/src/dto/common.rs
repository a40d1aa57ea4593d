use huddle_core::AppResult;
use huddle_domain::{PermissionSet, parse_permission_set};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Keys of a resolved permission set.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-set-response.ts"
)]
pub struct PermissionSetResponse {
    pub permissions: Vec<String>,
}

/// Incoming payload replacing a permission set.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-permissions-request.ts"
)]
pub struct UpdatePermissionsRequest {
    pub permissions: Vec<String>,
}

impl UpdatePermissionsRequest {
    pub fn into_permission_set(self) -> AppResult<PermissionSet> {
        parse_permission_set(self.permissions)
    }
}

pub(super) fn permission_keys(permissions: &PermissionSet) -> Vec<String> {
    permissions
        .iter()
        .map(|key| key.as_str().to_owned())
        .collect()
}

impl From<PermissionSet> for PermissionSetResponse {
    fn from(value: PermissionSet) -> Self {
        Self {
            permissions: permission_keys(&value),
        }
    }
}
