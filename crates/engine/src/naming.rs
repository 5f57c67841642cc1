//! Qualified names and collision handling
//!
//! Descriptors are named in declaration order. A name reused by a descriptor
//! at a different path removes every descriptor carrying it; a name reused at
//! the same path is a duplicate declaration and the first one is kept.

use indexmap::IndexMap;
use openapi_provider_common::naming::derive_nested_resource_name;
use openapi_provider_common::{QualifiedName, ResourceDescriptor, Result};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// A qualified name dropped because descriptors at different paths claimed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollisionReport {
    pub name: QualifiedName,
    /// Paths of every descriptor that claimed the name, in declaration order
    pub paths: Vec<String>,
}

/// Outcome of naming a list of descriptors
#[derive(Debug, Clone, Default)]
pub struct ResolvedNames {
    pub entries: IndexMap<QualifiedName, ResourceDescriptor>,
    pub collisions: Vec<CollisionReport>,
    /// Raw names of descriptors skipped because they are marked ignored
    pub ignored: Vec<String>,
}

pub struct NamingResolver<'a> {
    provider_name: &'a str,
    /// Derived names of known parents keyed by collection path
    parent_names: HashMap<String, String>,
}

impl<'a> NamingResolver<'a> {
    pub fn new(provider_name: &'a str) -> Self {
        Self {
            provider_name,
            parent_names: HashMap::new(),
        }
    }

    /// Name nested descriptors after already registered parents
    pub fn with_parent_names(mut self, parent_names: HashMap<String, String>) -> Self {
        self.parent_names = parent_names;
        self
    }

    /// `<provider>_<derived name>` for a descriptor
    pub fn qualified_name(&self, descriptor: &ResourceDescriptor) -> Result<QualifiedName> {
        self.qualified_name_with(descriptor, &self.parent_names)
    }

    fn qualified_name_with(
        &self,
        descriptor: &ResourceDescriptor,
        parent_names: &HashMap<String, String>,
    ) -> Result<QualifiedName> {
        let derived = derive_nested_resource_name(
            &descriptor.path,
            descriptor.preferred_name.as_deref(),
            |path| parent_names.get(path).cloned(),
        );
        QualifiedName::new(self.provider_name, &derived)
    }

    /// Parent names extended with the descriptors' own paths
    ///
    /// Shallow paths are named first so deeper ones can build on them. Known
    /// parents and the first declaration of a path win.
    fn learn_parent_names(&self, descriptors: &[ResourceDescriptor]) -> HashMap<String, String> {
        let mut parent_names = self.parent_names.clone();
        let mut by_depth: Vec<&ResourceDescriptor> =
            descriptors.iter().filter(|d| !d.ignore).collect();
        by_depth.sort_by_key(|d| d.path.matches('/').count());

        for descriptor in by_depth {
            if parent_names.contains_key(&descriptor.path) {
                continue;
            }
            let derived = derive_nested_resource_name(
                &descriptor.path,
                descriptor.preferred_name.as_deref(),
                |path| parent_names.get(path).cloned(),
            );
            if !derived.is_empty() {
                parent_names.insert(descriptor.path.clone(), derived);
            }
        }

        parent_names
    }

    /// Name every descriptor, dropping ignored and colliding ones
    ///
    /// Fails only when a descriptor derives an empty name.
    pub fn resolve(&self, descriptors: Vec<ResourceDescriptor>) -> Result<ResolvedNames> {
        let parent_names = self.learn_parent_names(&descriptors);
        let mut entries: IndexMap<QualifiedName, ResourceDescriptor> = IndexMap::new();
        let mut collisions: IndexMap<QualifiedName, CollisionReport> = IndexMap::new();
        let mut ignored = Vec::new();

        for descriptor in descriptors {
            if descriptor.ignore {
                info!(
                    "'{}' is marked to be ignored and therefore skipping resource registration into the provider",
                    descriptor.name
                );
                ignored.push(descriptor.name);
                continue;
            }

            let name = self.qualified_name_with(&descriptor, &parent_names)?;

            if let Some(report) = collisions.get_mut(&name) {
                report.paths.push(descriptor.path);
                continue;
            }

            match entries.get(&name).map(|existing| existing.path == descriptor.path) {
                None => {
                    entries.insert(name, descriptor);
                }
                Some(true) => {
                    debug!(
                        name = %name,
                        path = %descriptor.path,
                        "duplicate declaration of the same path, keeping the first one"
                    );
                }
                Some(false) => {
                    warn!(
                        "'{}' is a duplicate resource name and is being removed from the provider",
                        name
                    );
                    let mut paths: Vec<String> = entries
                        .shift_remove(&name)
                        .into_iter()
                        .map(|existing| existing.path)
                        .collect();
                    paths.push(descriptor.path);
                    collisions.insert(name.clone(), CollisionReport { name, paths });
                }
            }
        }

        Ok(ResolvedNames {
            entries,
            collisions: collisions.into_values().collect(),
            ignored,
        })
    }
}
