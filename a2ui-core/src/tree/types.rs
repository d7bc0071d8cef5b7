//! Output types of a tree build.

use crate::component::ComponentType;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A fully bound component, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedNode {
    /// Component id plus template suffix, e.g. `row:2`.
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    /// Base path for relative bindings inside this subtree.
    pub data_context_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub properties: BTreeMap<String, ResolvedValue>,
}

/// A property value after binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedValue {
    /// A literal or a value read from the data model.
    Value(Value),
    /// A binding whose path holds nothing.
    Unresolved,
    /// A child component.
    Node(Box<ResolvedNode>),
    /// An explicit list, template expansion or plain array.
    List(Vec<ResolvedValue>),
    /// A plain nested object.
    Map(BTreeMap<String, ResolvedValue>),
}

impl ResolvedValue {
    /// The plain value, if this is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// The node, if this is a child component.
    pub fn as_node(&self) -> Option<&ResolvedNode> {
        match self {
            Self::Node(node) => Some(&**node),
            _ => None,
        }
    }

    /// The items, if this is a list.
    pub fn as_list(&self) -> Option<&[ResolvedValue]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    fn collect_nodes<'a>(&'a self, out: &mut Vec<&'a ResolvedNode>) {
        match self {
            Self::Node(node) => out.push(&**node),
            Self::List(items) => items.iter().for_each(|item| item.collect_nodes(out)),
            Self::Map(entries) => entries.values().for_each(|entry| entry.collect_nodes(out)),
            Self::Value(_) | Self::Unresolved => {}
        }
    }
}

impl ResolvedNode {
    /// A property by name.
    pub fn property(&self, name: &str) -> Option<&ResolvedValue> {
        self.properties.get(name)
    }

    /// The nodes directly below this one, in property order.
    pub fn children(&self) -> Vec<&ResolvedNode> {
        let mut out = Vec::new();
        for value in self.properties.values() {
            value.collect_nodes(&mut out);
        }
        out
    }

    /// Depth-first search for a node by its full id.
    pub fn find(&self, id: &str) -> Option<&ResolvedNode> {
        if self.id == id {
            return Some(self);
        }
        self.children().into_iter().find_map(|child| child.find(id))
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(ResolvedNode::node_count)
            .sum::<usize>()
    }
}
