use std::collections::HashMap;

use huddle_core::{AppError, AppResult};

use crate::panel::{GroupPanel, PanelType};
use crate::permission::{
    CorePermission, PanelApplicability, PanelTarget, PermissionDefinition, PermissionKey,
    PermissionSet,
};

/// Ordered registry of every known permission definition.
///
/// Built-ins are registered first, plugin contributions are appended at
/// startup. After that the catalog is only read.
#[derive(Debug, Clone, Default)]
pub struct PermissionCatalog {
    definitions: Vec<PermissionDefinition>,
    positions: HashMap<PermissionKey, usize>,
}

/// A granted permission whose editor prerequisites are not granted alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmetRequirement {
    /// Granted permission.
    pub key: PermissionKey,
    /// Prerequisites missing from the same set.
    pub missing: Vec<PermissionKey>,
}

impl PermissionCatalog {
    /// Creates a catalog holding only the built-in permissions.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut catalog = Self::default();
        for permission in CorePermission::all() {
            catalog.push(permission.definition());
        }

        catalog
    }

    /// Appends a plugin-contributed definition.
    pub fn register_plugin_definition(&mut self, definition: PermissionDefinition) -> AppResult<()> {
        if !definition.key().is_plugin() {
            return Err(AppError::Validation(format!(
                "plugin permission '{}' must use the 'plugin.' namespace",
                definition.key()
            )));
        }

        self.register(definition)
    }

    /// Appends a definition, rejecting keys that are already registered.
    pub fn register(&mut self, definition: PermissionDefinition) -> AppResult<()> {
        if self.positions.contains_key(definition.key()) {
            return Err(AppError::DuplicatePermissionKey(format!(
                "permission '{}' is already registered",
                definition.key()
            )));
        }

        self.push(definition);
        Ok(())
    }

    fn push(&mut self, definition: PermissionDefinition) {
        self.positions
            .insert(definition.key().clone(), self.definitions.len());
        self.definitions.push(definition);
    }

    /// Returns definitions in registration order.
    #[must_use]
    pub fn list_definitions(&self) -> &[PermissionDefinition] {
        self.definitions.as_slice()
    }

    /// Returns the definition registered for a key.
    #[must_use]
    pub fn get(&self, key: &PermissionKey) -> Option<&PermissionDefinition> {
        self.positions
            .get(key)
            .and_then(|position| self.definitions.get(*position))
    }

    /// Returns whether the key is registered.
    #[must_use]
    pub fn contains(&self, key: &PermissionKey) -> bool {
        self.positions.contains_key(key)
    }

    /// Returns the number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns every registered key.
    #[must_use]
    pub fn universe(&self) -> PermissionSet {
        self.definitions
            .iter()
            .map(|definition| definition.key().clone())
            .collect()
    }

    /// Returns keys granted by default, used to seed new groups.
    #[must_use]
    pub fn default_permission_set(&self) -> PermissionSet {
        self.definitions
            .iter()
            .filter(|definition| definition.default_granted())
            .map(|definition| definition.key().clone())
            .collect()
    }

    /// Returns definitions editable on the given panel, in catalog order.
    #[must_use]
    pub fn applicable_to(&self, panel: &GroupPanel) -> Vec<&PermissionDefinition> {
        let target = match panel.panel_type() {
            PanelType::Plugin => panel
                .plugin_panel_name()
                .map(|name| PanelTarget::Plugin(name.to_owned())),
            panel_type => Some(PanelTarget::Builtin(panel_type)),
        };

        self.definitions
            .iter()
            .filter(|definition| match definition.panel_applicability() {
                PanelApplicability::None => false,
                PanelApplicability::All => true,
                PanelApplicability::Only(targets) => target
                    .as_ref()
                    .is_some_and(|target| targets.contains(target)),
            })
            .collect()
    }

    /// Returns keys that are not registered in this catalog.
    #[must_use]
    pub fn unknown_keys<'a>(
        &self,
        keys: impl IntoIterator<Item = &'a PermissionKey>,
    ) -> Vec<PermissionKey> {
        keys.into_iter()
            .filter(|key| !self.contains(key))
            .cloned()
            .collect()
    }

    /// Reports granted keys whose declared prerequisites are missing.
    ///
    /// Advisory only. Resolution never expands or enforces prerequisites.
    #[must_use]
    pub fn unmet_requirements(&self, granted: &PermissionSet) -> Vec<UnmetRequirement> {
        granted
            .iter()
            .filter_map(|key| {
                let definition = self.get(key)?;
                let missing: Vec<PermissionKey> = definition
                    .requires()
                    .iter()
                    .filter(|required| !granted.contains(*required))
                    .cloned()
                    .collect();

                (!missing.is_empty()).then(|| UnmetRequirement {
                    key: key.clone(),
                    missing,
                })
            })
            .collect()
    }
}
