use huddle_core::AppResult;
use huddle_domain::PermissionCatalog;

use crate::PluginPermissionRegistry;

/// Builds the process-wide catalog: built-ins first, then plugin definitions.
///
/// A plugin key that is already registered aborts startup.
pub async fn load_permission_catalog(
    registry: &dyn PluginPermissionRegistry,
) -> AppResult<PermissionCatalog> {
    let mut catalog = PermissionCatalog::with_builtins();

    for definition in registry.list_plugin_definitions().await? {
        let key = definition.key().clone();
        catalog.register_plugin_definition(definition)?;
        tracing::debug!(permission = %key, "registered plugin permission");
    }

    tracing::info!(definitions = catalog.len(), "permission catalog loaded");
    Ok(catalog)
}
