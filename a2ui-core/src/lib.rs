//! # a2ui-core
//!
//! Reconciliation engine for server-driven A2UI surfaces. A backend streams
//! small protocol messages describing components, their data bindings and
//! updates to a shared data model; this crate keeps the per-surface state and
//! rebuilds a fully bound component tree after every message.
//!
//! ## Core Components
//!
//! - **Value**: Decoding of wire value records into data values
//! - **Path**: Normalization and resolution of binding paths
//! - **DataModel**: Path-addressable nested store per surface
//! - **Tree**: Cycle-safe, template-expanding tree builder
//! - **Surface**: Surfaces and the store that owns them
//! - **Processor**: Message dispatch and the public query API
//!
//! ## Example
//!
//! ```rust
//! use a2ui_core::{MessageProcessor, ResolvedValue};
//! use serde_json::json;
//!
//! let mut processor = MessageProcessor::new();
//! processor.process_jsonl(concat!(
//!     r#"{"surfaceUpdate": {"surfaceId": "main", "components": [{"id": "greeting", "component": {"Text": {"text": {"path": "/name"}}}}]}}"#,
//!     "\n",
//!     r#"{"beginRendering": {"surfaceId": "main", "root": "greeting"}}"#,
//! ));
//!
//! processor.set_data("main", "/name", json!("Ann"));
//!
//! let tree = processor.tree("main").unwrap();
//! assert_eq!(tree.property("text"), Some(&ResolvedValue::Value(json!("Ann"))));
//! ```

pub mod action;
pub mod binding;
pub mod component;
pub mod config;
pub mod data_model;
pub mod error;
pub mod message;
pub mod path;
pub mod processor;
mod proptest;
pub mod surface;
pub mod tree;
pub mod value;

// Re-exports for convenience
pub use action::{ActionContextEntry, ActionDefinition, UserAction};
pub use binding::{ArrayRef, BindingExpr, BoundValue};
pub use component::{ComponentInstance, ComponentType, TaggedComponent};
pub use config::EngineConfig;
pub use data_model::DataModel;
pub use error::{Error, Result};
pub use message::{
    parse_message, parse_messages, read_messages, BeginRendering, ComponentEntry,
    DataModelUpdate, DeleteSurface, ServerMessage, SurfaceUpdate,
};
pub use processor::{MessageProcessor, SurfaceSnapshot};
pub use surface::{Surface, SurfaceState, SurfaceStore};
pub use tree::{CycleGuard, ResolvedNode, ResolvedValue, TreeBuilder};
pub use value::{decode, DataValue, ValueRecord};
