//! Component instances as registered on a surface.
//!
//! On the wire a component is `{ id, weight?, component: { <Tag>: { ... } } }`.
//! The tag is decoded once when the instance is registered and each property
//! is classified into a [`BindingExpr`] so the tree builder never has to
//! inspect raw shapes again.

use crate::binding::BindingExpr;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Type tag of a component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentType {
    Text,
    Image,
    Icon,
    Video,
    AudioPlayer,
    Row,
    Column,
    List,
    Card,
    Tabs,
    Divider,
    Modal,
    Button,
    CheckBox,
    TextField,
    DateTimeInput,
    MultipleChoice,
    Slider,
    /// Any tag outside the standard catalog.
    Custom(String),
}

impl ComponentType {
    /// The tag as it appears on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "Text",
            Self::Image => "Image",
            Self::Icon => "Icon",
            Self::Video => "Video",
            Self::AudioPlayer => "AudioPlayer",
            Self::Row => "Row",
            Self::Column => "Column",
            Self::List => "List",
            Self::Card => "Card",
            Self::Tabs => "Tabs",
            Self::Divider => "Divider",
            Self::Modal => "Modal",
            Self::Button => "Button",
            Self::CheckBox => "CheckBox",
            Self::TextField => "TextField",
            Self::DateTimeInput => "DateTimeInput",
            Self::MultipleChoice => "MultipleChoice",
            Self::Slider => "Slider",
            Self::Custom(tag) => tag,
        }
    }

    /// Whether the tag belongs to the standard catalog.
    pub fn is_standard(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl From<&str> for ComponentType {
    fn from(tag: &str) -> Self {
        match tag {
            "Text" => Self::Text,
            "Image" => Self::Image,
            "Icon" => Self::Icon,
            "Video" => Self::Video,
            "AudioPlayer" => Self::AudioPlayer,
            "Row" => Self::Row,
            "Column" => Self::Column,
            "List" => Self::List,
            "Card" => Self::Card,
            "Tabs" => Self::Tabs,
            "Divider" => Self::Divider,
            "Modal" => Self::Modal,
            "Button" => Self::Button,
            "CheckBox" => Self::CheckBox,
            "TextField" => Self::TextField,
            "DateTimeInput" => Self::DateTimeInput,
            "MultipleChoice" => Self::MultipleChoice,
            "Slider" => Self::Slider,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for ComponentType {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<ComponentType> for String {
    fn from(tag: ComponentType) -> Self {
        tag.as_str().to_string()
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The single tagged variant of a component instance.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedComponent {
    pub component_type: ComponentType,
    /// Raw property bag as received.
    pub properties: Map<String, Value>,
    /// Classified form of every property, keyed like `properties`.
    pub bindings: BTreeMap<String, BindingExpr>,
}

impl TaggedComponent {
    /// Classify a raw property bag under the given tag.
    pub fn new(component_type: ComponentType, properties: Map<String, Value>) -> Self {
        let bindings = properties
            .iter()
            .map(|(key, value)| (key.clone(), BindingExpr::classify(Some(key), value)))
            .collect();
        Self {
            component_type,
            properties,
            bindings,
        }
    }

    /// Decode a wire `{ <Tag>: <bag> }` object using its first key.
    ///
    /// A bag that is not an object is treated as empty.
    pub fn from_wire(wire: &Map<String, Value>) -> Option<Self> {
        let (tag, bag) = wire.iter().next()?;
        let properties = bag.as_object().cloned().unwrap_or_default();
        Some(Self::new(ComponentType::from(tag.as_str()), properties))
    }
}

impl Serialize for TaggedComponent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.component_type.as_str(), &self.properties)?;
        map.end()
    }
}

/// A component definition registered on a surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInstance {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// `None` when the server sent no (or an empty) component object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<TaggedComponent>,
}

impl ComponentInstance {
    /// Create an instance with a decoded variant.
    pub fn new(id: impl Into<String>, component_type: ComponentType, properties: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            weight: None,
            component: Some(TaggedComponent::new(component_type, properties)),
        }
    }

    /// Set the layout weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// The decoded type tag, if the instance has a variant.
    pub fn component_type(&self) -> Option<&ComponentType> {
        self.component.as_ref().map(|c| &c.component_type)
    }
}
