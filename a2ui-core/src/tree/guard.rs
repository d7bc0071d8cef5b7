//! Re-entrancy protection for tree builds.

use std::collections::HashSet;

/// Identities currently on the build stack.
///
/// Entries are frames: a component identity (id plus template suffix) tied to
/// the data context it is built in. A frame is entered before a component is
/// resolved and left when resolution returns, so the same frame may appear
/// again in a sibling branch but never below itself. A recursive template
/// over nested data gets a fresh context on every level and is not a cycle.
#[derive(Debug, Default)]
pub struct CycleGuard {
    active: HashSet<String>,
}

impl CycleGuard {
    /// Create an empty guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// The identity of a component instance.
    pub fn identity(component_id: &str, suffix: &str) -> String {
        format!("{}{}", component_id, suffix)
    }

    /// The guard entry for `identity` built in `context_path`.
    pub fn frame(identity: &str, context_path: &str) -> String {
        format!("{}@{}", identity, context_path)
    }

    /// Try to push `identity`. Returns `false` if it is already on the stack.
    pub fn enter(&mut self, identity: &str) -> bool {
        if self.active.contains(identity) {
            return false;
        }
        self.active.insert(identity.to_string());
        true
    }

    /// Pop `identity` off the stack.
    pub fn leave(&mut self, identity: &str) {
        self.active.remove(identity);
    }

    /// Whether `identity` is currently being resolved.
    pub fn is_active(&self, identity: &str) -> bool {
        self.active.contains(identity)
    }

    /// Number of identities on the stack.
    pub fn depth(&self) -> usize {
        self.active.len()
    }
}
