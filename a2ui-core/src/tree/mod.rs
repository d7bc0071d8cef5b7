//! Resolution of component graphs into renderable trees.
//!
//! A build starts at a surface's root component and walks every property of
//! every reachable component:
//!
//! - bindings are replaced by the data model value they point to,
//! - child references are replaced by the resolved child node,
//! - explicit lists and templates become lists of resolved nodes.
//!
//! Template instances get a deterministic `:<index>` or `:<key>` suffix and a
//! data context pointing at their element, so `{"path": "name"}` inside a row
//! template reads `/items/<index>/name`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use a2ui_core::tree::TreeBuilder;
//!
//! let mut builder = TreeBuilder::new(&components, &data_model, &config);
//! if let Some(tree) = builder.build_root("root") {
//!     for child in tree.children() {
//!         println!("{} ({})", child.id, child.component_type);
//!     }
//! }
//! ```

mod builder;
mod guard;
mod types;

pub use builder::TreeBuilder;
pub use guard::CycleGuard;
pub use types::{ResolvedNode, ResolvedValue};
