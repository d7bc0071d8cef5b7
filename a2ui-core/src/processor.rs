//! Message dispatch and the public engine API.
//!
//! [`MessageProcessor`] owns every surface. Each incoming message mutates one
//! surface and then rebuilds that surface's tree from scratch, so
//! [`MessageProcessor::tree`] always reflects the latest data.
//!
//! The engine is synchronous and single-writer. Hosts that share it across
//! threads wrap it in a lock; trees are borrowed from the engine, so a tree
//! cannot outlive the next mutating call.
//!
//! ## Example
//!
//! ```rust,ignore
//! use a2ui_core::MessageProcessor;
//!
//! let mut processor = MessageProcessor::new();
//! processor.process_jsonl(stream_chunk);
//!
//! if let Some(tree) = processor.tree("main") {
//!     render(tree);
//! }
//!
//! // Two-way binding from a checkbox
//! processor.set_data("main", "/settings/notify", serde_json::json!(true));
//! ```

use crate::action::{ActionDefinition, UserAction};
use crate::binding::BoundValue;
use crate::component::{ComponentInstance, TaggedComponent};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::message::{
    parse_messages, read_messages, BeginRendering, DataModelUpdate, ServerMessage, SurfaceUpdate,
};
use crate::path;
use crate::surface::{Surface, SurfaceStore};
use crate::tree::ResolvedNode;
use crate::value::{decode, DataValue};
use serde_json::Value;
use std::collections::HashMap;
use std::io::BufRead;
use tracing::debug;

/// Snapshot of every surface, keyed by surface id.
pub type SurfaceSnapshot = HashMap<String, Surface>;

/// The reconciliation engine.
#[derive(Debug, Clone, Default)]
pub struct MessageProcessor {
    surfaces: SurfaceStore,
    config: EngineConfig,
}

impl MessageProcessor {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            surfaces: SurfaceStore::new(),
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply messages in order and return a snapshot of all surfaces.
    pub fn process<I>(&mut self, messages: I) -> SurfaceSnapshot
    where
        I: IntoIterator<Item = ServerMessage>,
    {
        for message in messages {
            self.process_message(message);
        }
        self.snapshot()
    }

    /// Apply newline-delimited JSON messages. Malformed lines are dropped.
    pub fn process_jsonl(&mut self, input: &str) -> SurfaceSnapshot {
        self.process(parse_messages(input))
    }

    /// Apply every message readable from `reader`.
    ///
    /// Malformed lines are dropped. Messages read before an I/O error are
    /// not applied.
    pub fn process_reader<R: BufRead>(&mut self, reader: R) -> Result<SurfaceSnapshot> {
        let messages = read_messages(reader)?;
        Ok(self.process(messages))
    }

    /// Apply a single message.
    pub fn process_message(&mut self, message: ServerMessage) {
        debug!(
            kind = message.kind(),
            surface_id = message.surface_id(),
            "Processing message"
        );
        match message {
            ServerMessage::BeginRendering(begin) => self.begin_rendering(begin),
            ServerMessage::SurfaceUpdate(update) => self.surface_update(update),
            ServerMessage::DataModelUpdate(update) => self.data_model_update(update),
            ServerMessage::DeleteSurface(delete) => {
                self.delete_surface(&delete.surface_id);
            }
        }
    }

    fn begin_rendering(&mut self, begin: BeginRendering) {
        let surface = self.surfaces.get_or_create(&begin.surface_id);
        surface.root = Some(begin.root);
        if let Some(styles) = begin.styles {
            surface.styles = styles;
        }
        surface.rebuild(&self.config);
    }

    fn surface_update(&mut self, update: SurfaceUpdate) {
        let surface = self.surfaces.get_or_create(&update.surface_id);
        for entry in update.components {
            surface.register(ComponentInstance {
                component: entry.component.as_ref().and_then(TaggedComponent::from_wire),
                id: entry.id,
                weight: entry.weight,
            });
        }
        surface.rebuild(&self.config);
    }

    fn data_model_update(&mut self, update: DataModelUpdate) {
        let raw_path = update
            .path
            .as_deref()
            .unwrap_or(self.config.default_data_path.as_str());
        let target = path::resolve(raw_path, None);
        let surface = self.surfaces.get_or_create(&update.surface_id);
        match decode(&update.contents) {
            Some(value) => surface.data_model.set(&target, value),
            None => debug!(path = target.as_str(), "Data model update carried no value"),
        }
        surface.rebuild(&self.config);
    }

    /// Remove a surface. Returns whether it existed.
    pub fn delete_surface(&mut self, surface_id: &str) -> bool {
        self.surfaces.delete(surface_id).is_some()
    }

    /// Remove every surface.
    pub fn clear(&mut self) {
        self.surfaces.clear();
    }

    /// Copy of all surfaces.
    pub fn snapshot(&self) -> SurfaceSnapshot {
        self.surfaces.snapshot()
    }

    /// Look up a surface.
    pub fn surface(&self, surface_id: &str) -> Option<&Surface> {
        self.surfaces.get(surface_id)
    }

    /// The current tree of a surface.
    pub fn tree(&self, surface_id: &str) -> Option<&ResolvedNode> {
        self.surface(surface_id)?.tree.as_ref()
    }

    /// Identifiers of all surfaces, sorted.
    pub fn surface_ids(&self) -> Vec<&str> {
        self.surfaces.ids()
    }

    /// Read a data model value. Relative paths are read from the root.
    pub fn get_data(&self, surface_id: &str, data_path: &str) -> Option<&DataValue> {
        self.surface(surface_id)?
            .data_model
            .get(&path::resolve(data_path, None))
    }

    /// Write a data model value and rebuild the surface's tree.
    ///
    /// Creates the surface if it does not exist yet.
    pub fn set_data(&mut self, surface_id: &str, data_path: &str, value: DataValue) {
        let target = path::resolve(data_path, None);
        let surface = self.surfaces.get_or_create(surface_id);
        surface.data_model.set(&target, value);
        surface.rebuild(&self.config);
    }

    /// Resolve `data_path` against `context_path`.
    pub fn resolve_path(&self, data_path: &str, context_path: Option<&str>) -> String {
        path::resolve(data_path, context_path)
    }

    /// Resolve a bound value (`{ path?, literal* }`) to its raw value.
    pub fn resolve_value(
        &self,
        surface_id: &str,
        binding: Option<&Value>,
        context_path: Option<&str>,
    ) -> Option<Value> {
        let bound = BoundValue::from_value(binding?)?;
        let surface = self.surface(surface_id)?;
        bound.resolve(
            &surface.data_model,
            context_path,
            self.config.legacy_path_prefixes,
        )
    }

    /// Resolve a bound value to text. Unresolved bindings yield `""`.
    pub fn resolve_string_value(
        &self,
        surface_id: &str,
        binding: Option<&Value>,
        context_path: Option<&str>,
    ) -> String {
        match self.resolve_value(surface_id, binding, context_path) {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(other) => other.to_string(),
        }
    }

    /// Resolve a bound value to a number. Numeric text is parsed.
    pub fn resolve_number_value(
        &self,
        surface_id: &str,
        binding: Option<&Value>,
        context_path: Option<&str>,
    ) -> Option<f64> {
        match self.resolve_value(surface_id, binding, context_path)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Resolve a bound value to a boolean.
    pub fn resolve_boolean_value(
        &self,
        surface_id: &str,
        binding: Option<&Value>,
        context_path: Option<&str>,
    ) -> Option<bool> {
        match self.resolve_value(surface_id, binding, context_path)? {
            Value::Bool(b) => Some(b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Bind an action definition for dispatch back to the server.
    ///
    /// Returns `None` if the surface is unknown or `action` is not a valid
    /// definition.
    pub fn resolve_action(
        &self,
        surface_id: &str,
        source_component_id: &str,
        action: &Value,
        context_path: Option<&str>,
    ) -> Option<UserAction> {
        let definition = ActionDefinition::from_value(action)?;
        let surface = self.surface(surface_id)?;
        Some(UserAction::resolve(
            surface_id,
            source_component_id,
            &definition,
            &surface.data_model,
            context_path,
            self.config.legacy_path_prefixes,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ComponentEntry, DeleteSurface};
    use crate::surface::SurfaceState;
    use crate::tree::ResolvedValue;
    use crate::value::ValueRecord;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn begin(surface_id: &str, root: &str) -> ServerMessage {
        ServerMessage::BeginRendering(BeginRendering {
            surface_id: surface_id.into(),
            root: root.into(),
            styles: None,
        })
    }

    fn update(surface_id: &str, components: Value) -> ServerMessage {
        ServerMessage::SurfaceUpdate(SurfaceUpdate {
            surface_id: surface_id.into(),
            components: serde_json::from_value::<Vec<ComponentEntry>>(components).unwrap(),
        })
    }

    fn data(surface_id: &str, path: Option<&str>, contents: Vec<ValueRecord>) -> ServerMessage {
        ServerMessage::DataModelUpdate(DataModelUpdate {
            surface_id: surface_id.into(),
            path: path.map(str::to_string),
            contents,
        })
    }

    fn delete(surface_id: &str) -> ServerMessage {
        ServerMessage::DeleteSurface(DeleteSurface {
            surface_id: surface_id.into(),
        })
    }

    #[test]
    fn test_empty_process_is_noop() {
        let mut processor = MessageProcessor::new();
        assert!(processor.process(vec![]).is_empty());

        processor.process(vec![begin("s1", "root")]);
        let first = processor.process(vec![]);
        let second = processor.process(vec![]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_begin_before_components_has_null_tree() {
        let mut processor = MessageProcessor::new();
        let snapshot = processor.process(vec![begin("s1", "root")]);
        assert!(snapshot["s1"].tree.is_none());
        assert_eq!(snapshot["s1"].root.as_deref(), Some("root"));
        assert_eq!(snapshot["s1"].state(), SurfaceState::Registered);
    }

    #[test]
    fn test_literal_text_tree() {
        let mut processor = MessageProcessor::new();
        let snapshot = processor.process(vec![
            update(
                "s1",
                json!([{"id": "root", "component": {"Text": {"text": {"literalString": "Hi"}}}}]),
            ),
            begin("s1", "root"),
        ]);
        let tree = snapshot["s1"].tree.as_ref().unwrap();
        assert_eq!(tree.id, "root");
        assert_eq!(tree.component_type.as_str(), "Text");
        assert_eq!(
            serde_json::to_value(&tree.properties).unwrap(),
            json!({"text": {"literalString": "Hi"}})
        );
    }

    #[test]
    fn test_data_update_resolves_string() {
        let mut processor = MessageProcessor::new();
        processor.process(vec![data(
            "s1",
            Some("/name"),
            vec![ValueRecord::string(".", "Ann")],
        )]);
        let binding = json!({"path": "name"});
        assert_eq!(
            processor.resolve_string_value("s1", Some(&binding), Some("/")),
            "Ann"
        );
        assert_eq!(processor.get_data("s1", "/name"), Some(&json!("Ann")));
    }

    #[test]
    fn test_template_rows() {
        let mut processor = MessageProcessor::new();
        processor.process(vec![
            update(
                "s1",
                json!([
                    {"id": "root", "component": {"List": {"children": {"template": {"componentId": "row", "dataBinding": "items"}}}}},
                    {"id": "row", "component": {"Text": {"text": {"path": ""}}}}
                ]),
            ),
            data(
                "s1",
                Some("/items"),
                vec![ValueRecord::map(
                    ".",
                    vec![ValueRecord::string("0", "x"), ValueRecord::string("1", "y")],
                )],
            ),
            begin("s1", "root"),
        ]);
        let rows = processor.tree("s1").unwrap().children();
        let summary: Vec<_> = rows
            .iter()
            .map(|r| (r.id.as_str(), r.data_context_path.as_str()))
            .collect();
        assert_eq!(summary, vec![("row:0", "/items/0"), ("row:1", "/items/1")]);
    }

    #[test]
    fn test_template_rows_follow_update_order() {
        let mut processor = MessageProcessor::new();
        let records: Vec<ValueRecord> = (0..12)
            .map(|i| ValueRecord::string(i.to_string(), format!("row {}", i)))
            .collect();
        processor.process(vec![
            update(
                "s1",
                json!([
                    {"id": "root", "component": {"List": {"children": {"template": {"componentId": "row", "dataBinding": "/items"}}}}},
                    {"id": "row", "component": {"Text": {"text": {"path": ""}}}},
                    {"id": "tags", "component": {"Row": {"children": {"template": {"componentId": "row", "dataBinding": "/tags"}}}}}
                ]),
            ),
            data("s1", Some("/items"), vec![ValueRecord::map(".", records)]),
            data(
                "s1",
                Some("/tags"),
                vec![ValueRecord::string("zeta", "z"), ValueRecord::string("alpha", "a")],
            ),
            begin("s1", "root"),
        ]);

        let ids: Vec<String> = processor
            .tree("s1")
            .unwrap()
            .children()
            .iter()
            .map(|r| r.id.clone())
            .collect();
        let expected: Vec<String> = (0..12).map(|i| format!("row:{}", i)).collect();
        assert_eq!(ids, expected);

        processor.process(vec![begin("s1", "tags")]);
        let ids: Vec<_> = processor
            .tree("s1")
            .unwrap()
            .children()
            .iter()
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(ids, vec!["row:zeta", "row:alpha"]);
    }

    #[test]
    fn test_template_rows_over_sequence() {
        let mut processor = MessageProcessor::new();
        processor.process(vec![
            update(
                "s1",
                json!([
                    {"id": "root", "component": {"List": {"children": {"template": {"componentId": "row", "dataBinding": "items"}}}}},
                    {"id": "row", "component": {"Text": {"text": {"path": ""}}}}
                ]),
            ),
            begin("s1", "root"),
        ]);
        processor.set_data("s1", "/items", json!(["x", "y"]));

        let rows = processor.tree("s1").unwrap().children();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "row:0");
        assert_eq!(rows[0].data_context_path, "/items/0");
        assert_eq!(rows[1].id, "row:1");
        assert_eq!(rows[1].data_context_path, "/items/1");
        assert_eq!(rows[1].property("text"), Some(&ResolvedValue::Value(json!("y"))));
    }

    #[test]
    fn test_delete_surface_removed_from_snapshot() {
        let mut processor = MessageProcessor::new();
        processor.process(vec![begin("s1", "root"), begin("s2", "root")]);
        processor.process(vec![delete("s1")]);
        let snapshot = processor.process(vec![]);
        assert!(!snapshot.contains_key("s1"));
        assert!(snapshot.contains_key("s2"));
    }

    #[test]
    fn test_delete_unknown_surface() {
        let mut processor = MessageProcessor::new();
        let snapshot = processor.process(vec![delete("ghost")]);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_set_data_rebuilds_tree() {
        let mut processor = MessageProcessor::new();
        processor.process(vec![
            update(
                "s1",
                json!([{"id": "root", "component": {"CheckBox": {"value": {"path": "/agree"}, "label": {"literalString": "Agree"}}}}]),
            ),
            begin("s1", "root"),
        ]);
        assert_eq!(
            processor.tree("s1").unwrap().property("value"),
            Some(&ResolvedValue::Unresolved)
        );

        processor.set_data("s1", "/agree", json!(true));
        assert_eq!(processor.get_data("s1", "agree"), Some(&json!(true)));
        assert_eq!(
            processor.tree("s1").unwrap().property("value"),
            Some(&ResolvedValue::Value(json!(true)))
        );
    }

    #[test]
    fn test_set_data_creates_surface() {
        let mut processor = MessageProcessor::new();
        processor.set_data("fresh", "/a/b", json!(1));
        assert_eq!(processor.get_data("fresh", "/a/b"), Some(&json!(1)));
        assert!(processor.tree("fresh").is_none());
    }

    #[test]
    fn test_get_data_unknown_surface() {
        let processor = MessageProcessor::new();
        assert_eq!(processor.get_data("nope", "/x"), None);
    }

    #[test]
    fn test_root_update_merges_and_nested_replaces() {
        let mut processor = MessageProcessor::new();
        processor.process(vec![
            data(
                "s1",
                None,
                vec![
                    ValueRecord::string("a", "1"),
                    ValueRecord::map("user", vec![ValueRecord::string("name", "Ann")]),
                ],
            ),
            data("s1", None, vec![ValueRecord::string("b", "2")]),
            data(
                "s1",
                Some("/user"),
                vec![ValueRecord::string("email", "ann@example.com")],
            ),
        ]);
        assert_eq!(
            processor.get_data("s1", "/"),
            Some(&json!({"a": "1", "b": "2", "user": {"email": "ann@example.com"}}))
        );
    }

    #[test]
    fn test_surface_update_replaces_component() {
        let mut processor = MessageProcessor::new();
        processor.process(vec![
            update("s1", json!([{"id": "root", "weight": 1, "component": {"Text": {"text": {"literalString": "one"}}}}])),
            begin("s1", "root"),
            update("s1", json!([{"id": "root", "component": {"Divider": {}}}])),
        ]);
        let tree = processor.tree("s1").unwrap();
        assert_eq!(tree.component_type.as_str(), "Divider");
        assert_eq!(tree.weight, None);
        assert!(tree.properties.is_empty());
    }

    #[test]
    fn test_component_without_variant_resolves_absent() {
        let mut processor = MessageProcessor::new();
        processor.process(vec![update("s1", json!([{"id": "root"}])), begin("s1", "root")]);
        assert!(processor.surface("s1").unwrap().component("root").is_some());
        assert!(processor.tree("s1").is_none());
    }

    #[test]
    fn test_styles_set_by_begin_rendering() {
        let mut processor = MessageProcessor::new();
        processor.process(vec![ServerMessage::BeginRendering(BeginRendering {
            surface_id: "s1".into(),
            root: "root".into(),
            styles: Some(HashMap::from([("font".to_string(), "Inter".to_string())])),
        })]);
        processor.process(vec![begin("s1", "other")]);
        let surface = processor.surface("s1").unwrap();
        assert_eq!(surface.styles["font"], "Inter");
        assert_eq!(surface.root.as_deref(), Some("other"));
    }

    #[test]
    fn test_process_jsonl_skips_malformed() {
        let mut processor = MessageProcessor::new();
        let input = r#"{"surfaceUpdate": {"surfaceId": "s1", "components": [{"id": "root", "component": {"Text": {"text": {"path": "/msg"}}}}]}}
this is not json
{"dataModelUpdate": {"surfaceId": "s1", "contents": [{"key": "msg", "valueString": "hello"}]}}
{"beginRendering": {"surfaceId": "s1", "root": "root"}}
"#;
        let snapshot = processor.process_jsonl(input);
        let tree = snapshot["s1"].tree.as_ref().unwrap();
        assert_eq!(tree.property("text"), Some(&ResolvedValue::Value(json!("hello"))));
    }

    #[test]
    fn test_process_reader() {
        let mut processor = MessageProcessor::new();
        let input = std::io::Cursor::new(r#"{"beginRendering": {"surfaceId": "s1", "root": "root"}}"#);
        let snapshot = processor.process_reader(input).unwrap();
        assert!(snapshot.contains_key("s1"));
    }

    #[test]
    fn test_resolve_helpers() {
        let mut processor = MessageProcessor::new();
        processor.set_data("s1", "/", json!({"count": 4, "flag": true, "text": "12.5", "obj": {"a": 1}}));

        let count = json!({"path": "/count"});
        let flag = json!({"path": "flag"});
        let text = json!({"path": "/text"});
        let obj = json!({"path": "/obj"});
        let literal = json!({"literalString": "fixed"});
        let missing = json!({"path": "/missing"});

        assert_eq!(processor.resolve_string_value("s1", Some(&count), None), "4");
        assert_eq!(processor.resolve_string_value("s1", Some(&flag), None), "true");
        assert_eq!(processor.resolve_string_value("s1", Some(&obj), None), r#"{"a":1}"#);
        assert_eq!(processor.resolve_string_value("s1", Some(&literal), None), "fixed");
        assert_eq!(processor.resolve_string_value("s1", Some(&missing), None), "");
        assert_eq!(processor.resolve_string_value("s1", None, None), "");
        assert_eq!(processor.resolve_string_value("ghost", Some(&count), None), "");

        assert_eq!(processor.resolve_number_value("s1", Some(&count), None), Some(4.0));
        assert_eq!(processor.resolve_number_value("s1", Some(&text), None), Some(12.5));
        assert_eq!(processor.resolve_number_value("s1", Some(&flag), None), None);
        assert_eq!(processor.resolve_boolean_value("s1", Some(&flag), None), Some(true));
        assert_eq!(processor.resolve_boolean_value("s1", Some(&missing), None), None);
    }

    #[test]
    fn test_resolve_path() {
        let processor = MessageProcessor::new();
        assert_eq!(processor.resolve_path("name", Some("/items/0")), "/items/0/name");
        assert_eq!(processor.resolve_path("/name", Some("/items/0")), "/name");
        assert_eq!(processor.resolve_path("name", None), "/name");
    }

    #[test]
    fn test_resolve_action() {
        let mut processor = MessageProcessor::new();
        processor.set_data("s1", "/items", json!([{"id": "p-1"}]));
        let action = json!({"name": "open", "context": [{"key": "id", "value": {"path": "id"}}]});

        let resolved = processor
            .resolve_action("s1", "row:0", &action, Some("/items/0"))
            .unwrap();
        assert_eq!(resolved.name, "open");
        assert_eq!(resolved.context["id"], json!("p-1"));

        assert!(processor.resolve_action("ghost", "row:0", &action, None).is_none());
    }

    #[test]
    fn test_clear() {
        let mut processor = MessageProcessor::new();
        processor.process(vec![begin("s1", "root")]);
        processor.clear();
        assert!(processor.surface_ids().is_empty());
    }

    #[test]
    fn test_custom_default_data_path() {
        let config = EngineConfig::default().with_default_data_path("/form");
        let mut processor = MessageProcessor::with_config(config);
        processor.process(vec![data("s1", None, vec![ValueRecord::string("email", "a@b")])]);
        assert_eq!(processor.get_data("s1", "/form/email"), Some(&json!("a@b")));
    }

    #[test]
    fn test_nested_surfaces_independent() {
        let mut processor = MessageProcessor::new();
        processor.process(vec![
            update("a", json!([{"id": "root", "component": {"Text": {"text": {"path": "/v"}}}}])),
            update("b", json!([{"id": "root", "component": {"Text": {"text": {"path": "/v"}}}}])),
            begin("a", "root"),
            begin("b", "root"),
        ]);
        processor.set_data("a", "/v", json!("only a"));
        assert_eq!(
            processor.tree("a").unwrap().property("text"),
            Some(&ResolvedValue::Value(json!("only a")))
        );
        assert_eq!(
            processor.tree("b").unwrap().property("text"),
            Some(&ResolvedValue::Unresolved)
        );
        assert_eq!(processor.surface_ids(), vec!["a", "b"]);
    }
}
