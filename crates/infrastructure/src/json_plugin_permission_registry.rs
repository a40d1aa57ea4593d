use std::path::PathBuf;

use async_trait::async_trait;
use huddle_application::PluginPermissionRegistry;
use huddle_core::{AppError, AppResult};
use huddle_domain::{
    PanelApplicability, PanelTarget, PanelType, PermissionDefinition, PermissionKey,
};
use serde::Deserialize;

/// Panel applicability as written in plugin manifests.
///
/// `true` means every panel. A list names built-in panel types (`text`,
/// `group`) or plugin panel names.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ManifestPanels {
    Every(bool),
    Only(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    key: String,
    title: String,
    #[serde(default)]
    desc: String,
    #[serde(default)]
    default: bool,
    #[serde(default)]
    required: Vec<String>,
    #[serde(default)]
    panel: Option<ManifestPanels>,
}

impl ManifestEntry {
    fn into_definition(self) -> AppResult<PermissionDefinition> {
        let requires = self
            .required
            .into_iter()
            .map(PermissionKey::new)
            .collect::<AppResult<Vec<_>>>()?;
        let panel_applicability = match self.panel {
            None | Some(ManifestPanels::Every(false)) => PanelApplicability::None,
            Some(ManifestPanels::Every(true)) => PanelApplicability::All,
            Some(ManifestPanels::Only(targets)) => PanelApplicability::Only(
                targets
                    .into_iter()
                    .map(|target| match PanelType::parse(&target) {
                        Ok(panel_type) if panel_type != PanelType::Plugin => {
                            PanelTarget::Builtin(panel_type)
                        }
                        _ => PanelTarget::Plugin(target),
                    })
                    .collect(),
            ),
        };

        Ok(
            PermissionDefinition::new(PermissionKey::new(self.key)?, self.title, self.desc)
                .with_default_granted(self.default)
                .with_requires(requires)
                .with_panel_applicability(panel_applicability),
        )
    }
}

fn parse_manifest(source: &str, content: &str) -> AppResult<Vec<PermissionDefinition>> {
    let entries: Vec<ManifestEntry> = serde_json::from_str(content).map_err(|error| {
        AppError::Validation(format!("invalid plugin permission manifest '{source}': {error}"))
    })?;

    entries
        .into_iter()
        .map(ManifestEntry::into_definition)
        .collect()
}

/// Plugin registry reading permission definitions from a JSON manifest.
///
/// Without a manifest path no plugin permissions are contributed.
#[derive(Debug, Clone, Default)]
pub struct JsonPluginPermissionRegistry {
    path: Option<PathBuf>,
}

impl JsonPluginPermissionRegistry {
    /// Creates a registry for an optional manifest path.
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl PluginPermissionRegistry for JsonPluginPermissionRegistry {
    async fn list_plugin_definitions(&self) -> AppResult<Vec<PermissionDefinition>> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };

        let content = tokio::fs::read_to_string(path).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to read plugin permission manifest '{}': {error}",
                path.display()
            ))
        })?;

        parse_manifest(&path.display().to_string(), &content)
    }
}
