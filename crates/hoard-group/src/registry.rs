use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::info;

use crate::getter::Getter;
use crate::group::Group;

/// Owns every [`Group`] in the process, keyed by namespace name.
///
/// Peer servers resolve incoming namespace names through the registry. Tests
/// build their own isolated registries.
#[derive(Debug, Default)]
pub struct Registry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a namespace backed by `getter` with a store budget of
    /// `cache_bytes` (`0` = unbounded).
    ///
    /// A namespace registered under an existing name replaces it.
    pub fn register(&self, name: &str, cache_bytes: u64, getter: impl Getter + 'static) -> Arc<Group> {
        let group = Arc::new(Group::new(name, cache_bytes, Box::new(getter)));
        let previous = self
            .groups
            .write()
            .expect("registry lock poisoned")
            .insert(name.to_string(), Arc::clone(&group));
        if previous.is_some() {
            info!(namespace = name, "namespace re-registered, replacing previous instance");
        }
        group
    }

    /// Namespace registered under `name`, if any.
    pub fn resolve(&self, name: &str) -> Option<Arc<Group>> {
        self.groups
            .read()
            .expect("registry lock poisoned")
            .get(name)
            .cloned()
    }

    /// Registered namespace names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .groups
            .read()
            .expect("registry lock poisoned")
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.groups.read().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().expect("registry lock poisoned").is_empty()
    }
}
