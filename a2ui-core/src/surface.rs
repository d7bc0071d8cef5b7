//! Surfaces and the store that owns them.

use crate::component::ComponentInstance;
use crate::config::EngineConfig;
use crate::data_model::DataModel;
use crate::tree::{ResolvedNode, TreeBuilder};
use serde::Serialize;
use std::collections::HashMap;
use tracing::trace;

/// Lifecycle state of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceState {
    /// Known to the store but nothing renderable yet.
    Registered,
    /// The last rebuild produced a tree.
    HasTree,
}

/// One independently rendered UI instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Surface {
    pub id: String,
    /// Root component id, set by `beginRendering`.
    pub root: Option<String>,
    /// Tree produced by the last rebuild.
    pub tree: Option<ResolvedNode>,
    pub components: HashMap<String, ComponentInstance>,
    pub data_model: DataModel,
    pub styles: HashMap<String, String>,
}

impl Surface {
    /// Create an empty surface.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Register a component, replacing any previous definition with the same id.
    pub fn register(&mut self, instance: ComponentInstance) {
        self.components.insert(instance.id.clone(), instance);
    }

    /// Look up a registered component.
    pub fn component(&self, id: &str) -> Option<&ComponentInstance> {
        self.components.get(id)
    }

    /// Recompute the tree from the current root, registry and data model.
    pub fn rebuild(&mut self, config: &EngineConfig) {
        let tree = match self.root.as_deref() {
            Some(root) => TreeBuilder::new(&self.components, &self.data_model, config).build_root(root),
            None => None,
        };
        trace!(
            surface_id = self.id.as_str(),
            nodes = tree.as_ref().map_or(0, ResolvedNode::node_count),
            "Rebuilt surface tree"
        );
        self.tree = tree;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SurfaceState {
        if self.tree.is_some() {
            SurfaceState::HasTree
        } else {
            SurfaceState::Registered
        }
    }
}

/// All surfaces known to one engine instance.
#[derive(Debug, Clone, Default)]
pub struct SurfaceStore {
    surfaces: HashMap<String, Surface>,
}

impl SurfaceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a surface, creating an empty one on first reference.
    pub fn get_or_create(&mut self, id: &str) -> &mut Surface {
        self.surfaces
            .entry(id.to_string())
            .or_insert_with(|| Surface::new(id))
    }

    /// Look up a surface.
    pub fn get(&self, id: &str) -> Option<&Surface> {
        self.surfaces.get(id)
    }

    /// Look up a surface for mutation.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Surface> {
        self.surfaces.get_mut(id)
    }

    /// Remove a surface. Returns it if it existed.
    pub fn delete(&mut self, id: &str) -> Option<Surface> {
        self.surfaces.remove(id)
    }

    /// Remove every surface.
    pub fn clear(&mut self) {
        self.surfaces.clear();
    }

    /// Copy of the current mapping, detached from further mutation.
    pub fn snapshot(&self) -> HashMap<String, Surface> {
        self.surfaces.clone()
    }

    /// Whether a surface exists.
    pub fn contains(&self, id: &str) -> bool {
        self.surfaces.contains_key(id)
    }

    /// Identifiers of all surfaces, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.surfaces.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}
