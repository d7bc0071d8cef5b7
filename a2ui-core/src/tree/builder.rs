//! Recursive tree construction.

use super::guard::CycleGuard;
use super::types::{ResolvedNode, ResolvedValue};
use crate::binding::{ArrayRef, BindingExpr};
use crate::component::ComponentInstance;
use crate::config::EngineConfig;
use crate::data_model::DataModel;
use crate::path::{self, ROOT_PATH};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Builds resolved trees from one surface's components and data model.
///
/// A builder holds the cycle guard for one build; create a fresh one per
/// rebuild.
pub struct TreeBuilder<'a> {
    components: &'a HashMap<String, ComponentInstance>,
    data: &'a DataModel,
    config: &'a EngineConfig,
    guard: CycleGuard,
    depth: usize,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder over a component registry and data model.
    pub fn new(
        components: &'a HashMap<String, ComponentInstance>,
        data: &'a DataModel,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            components,
            data,
            config,
            guard: CycleGuard::new(),
            depth: 0,
        }
    }

    /// Build from `root_id` in the root data context.
    pub fn build_root(&mut self, root_id: &str) -> Option<ResolvedNode> {
        self.build(root_id, ROOT_PATH, "")
    }

    /// Build `component_id` with the given data context and id suffix.
    ///
    /// Returns `None` when the component is not registered, has no variant,
    /// is already being resolved further up with the same suffix and data
    /// context, or sits deeper than the configured maximum.
    pub fn build(
        &mut self,
        component_id: &str,
        context_path: &str,
        suffix: &str,
    ) -> Option<ResolvedNode> {
        let components = self.components;
        let Some(instance) = components.get(component_id) else {
            trace!(component_id, "Component not registered");
            return None;
        };
        let component = instance.component.as_ref()?;

        if self.depth >= self.config.max_depth {
            debug!(
                component_id,
                max_depth = self.config.max_depth,
                "Maximum tree depth exceeded"
            );
            return None;
        }

        let identity = CycleGuard::identity(component_id, suffix);
        let frame = CycleGuard::frame(&identity, context_path);
        if !self.guard.enter(&frame) {
            debug!(frame = frame.as_str(), "Dropping cyclic component reference");
            return None;
        }
        self.depth += 1;

        let properties = component
            .bindings
            .iter()
            .filter_map(|(name, expr)| {
                self.resolve(expr, context_path, suffix)
                    .map(|value| (name.clone(), value))
            })
            .collect();

        self.depth -= 1;
        self.guard.leave(&frame);

        Some(ResolvedNode {
            id: identity,
            component_type: component.component_type.clone(),
            data_context_path: context_path.to_string(),
            weight: instance.weight,
            properties,
        })
    }

    /// Interpret one binding expression. `None` means the entry is dropped
    /// from its parent.
    fn resolve(
        &mut self,
        expr: &BindingExpr,
        context_path: &str,
        suffix: &str,
    ) -> Option<ResolvedValue> {
        match expr {
            BindingExpr::Literal(value) => Some(ResolvedValue::Value(value.clone())),
            BindingExpr::Path(raw) => {
                let absolute = path::resolve_binding(
                    raw,
                    Some(context_path),
                    self.config.legacy_path_prefixes,
                );
                Some(match self.data.get(&absolute) {
                    Some(value) => ResolvedValue::Value(value.clone()),
                    None => ResolvedValue::Unresolved,
                })
            }
            BindingExpr::Child(id) => self
                .build(id, context_path, suffix)
                .map(|node| ResolvedValue::Node(Box::new(node))),
            BindingExpr::Array(ArrayRef::Explicit(ids)) => Some(ResolvedValue::List(
                ids.iter()
                    .filter_map(|id| self.build(id, context_path, suffix))
                    .map(|node| ResolvedValue::Node(Box::new(node)))
                    .collect(),
            )),
            BindingExpr::Array(ArrayRef::Template {
                component_id,
                data_binding,
            }) => Some(ResolvedValue::List(self.expand_template(
                component_id,
                data_binding,
                context_path,
            ))),
            BindingExpr::Structure(entries) => Some(ResolvedValue::Map(
                entries
                    .iter()
                    .filter_map(|(key, expr)| {
                        self.resolve(expr, context_path, suffix)
                            .map(|value| (key.clone(), value))
                    })
                    .collect(),
            )),
            BindingExpr::Sequence(items) => Some(ResolvedValue::List(
                items
                    .iter()
                    .filter_map(|item| self.resolve(item, context_path, suffix))
                    .collect(),
            )),
        }
    }

    /// One node per element (or key) of the collection at `data_binding`.
    ///
    /// Keyed structures expand in insertion order. Keys that would not
    /// survive as a single path segment (empty, or holding `.`, `/` or an
    /// `[n]` index) are skipped, since relative bindings below them could
    /// not address the entry.
    fn expand_template(
        &mut self,
        component_id: &str,
        data_binding: &str,
        context_path: &str,
    ) -> Vec<ResolvedValue> {
        let data = self.data;
        let bound = path::resolve(data_binding, Some(context_path));
        let keys: Vec<String> = match data.get(&bound) {
            Some(Value::Array(items)) => (0..items.len()).map(|i| i.to_string()).collect(),
            Some(Value::Object(map)) => map
                .keys()
                .filter(|key| {
                    let addressable = path::normalize(key) == [key.as_str()];
                    if !addressable {
                        debug!(key = key.as_str(), "Skipping template key that is not a path segment");
                    }
                    addressable
                })
                .cloned()
                .collect(),
            _ => {
                trace!(path = bound.as_str(), "Template binding is not a collection");
                return Vec::new();
            }
        };

        keys.iter()
            .filter_map(|key| {
                let item_context = path::join(&bound, key);
                let item_suffix = format!(":{}", key);
                self.build(component_id, &item_context, &item_suffix)
            })
            .map(|node| ResolvedValue::Node(Box::new(node)))
            .collect()
    }
}
