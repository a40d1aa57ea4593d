use huddle_domain::{PanelApplicability, PanelTarget, PermissionDefinition};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// API representation of a catalog entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-definition-response.ts"
)]
pub struct PermissionDefinitionResponse {
    pub key: String,
    pub title: String,
    pub description: String,
    pub default_granted: bool,
    pub requires: Vec<String>,
    /// `true` when the permission may be overridden on every panel.
    pub all_panels: bool,
    /// Built-in panel types or plugin panel names the permission applies to.
    pub panel_targets: Vec<String>,
}

/// Incoming payload for a group-wide permission check on behalf of a user.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/check-permissions-request.ts"
)]
pub struct CheckPermissionsRequest {
    pub user_id: String,
    pub permissions: Vec<String>,
}

/// Per-key answers in request order.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/check-permissions-response.ts"
)]
pub struct CheckPermissionsResponse {
    pub results: Vec<bool>,
}

impl From<PermissionDefinition> for PermissionDefinitionResponse {
    fn from(value: PermissionDefinition) -> Self {
        let (all_panels, panel_targets) = match value.panel_applicability() {
            PanelApplicability::None => (false, Vec::new()),
            PanelApplicability::All => (true, Vec::new()),
            PanelApplicability::Only(targets) => (
                false,
                targets
                    .iter()
                    .map(|target| match target {
                        PanelTarget::Builtin(panel_type) => panel_type.as_str().to_owned(),
                        PanelTarget::Plugin(name) => name.clone(),
                    })
                    .collect(),
            ),
        };

        Self {
            key: value.key().as_str().to_owned(),
            title: value.title().to_owned(),
            description: value.description().to_owned(),
            default_granted: value.default_granted(),
            requires: value
                .requires()
                .iter()
                .map(|key| key.as_str().to_owned())
                .collect(),
            all_panels,
            panel_targets,
        }
    }
}
