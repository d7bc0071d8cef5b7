//! Server-to-client protocol messages.
//!
//! Messages arrive as newline-delimited JSON, one message per line, each an
//! object with exactly one of the keys `beginRendering`, `surfaceUpdate`,
//! `dataModelUpdate` or `deleteSurface`.

use crate::error::{Error, Result};
use crate::value::ValueRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::BufRead;
use tracing::warn;

/// One protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServerMessage {
    BeginRendering(BeginRendering),
    SurfaceUpdate(SurfaceUpdate),
    DataModelUpdate(DataModelUpdate),
    DeleteSurface(DeleteSurface),
}

impl ServerMessage {
    /// The surface this message targets.
    pub fn surface_id(&self) -> &str {
        match self {
            Self::BeginRendering(m) => &m.surface_id,
            Self::SurfaceUpdate(m) => &m.surface_id,
            Self::DataModelUpdate(m) => &m.surface_id,
            Self::DeleteSurface(m) => &m.surface_id,
        }
    }

    /// Short name of the message kind, as used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BeginRendering(_) => "beginRendering",
            Self::SurfaceUpdate(_) => "surfaceUpdate",
            Self::DataModelUpdate(_) => "dataModelUpdate",
            Self::DeleteSurface(_) => "deleteSurface",
        }
    }
}

/// Sets the root component and styles of a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginRendering {
    pub surface_id: String,
    pub root: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<HashMap<String, String>>,
}

/// Registers or replaces components on a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceUpdate {
    pub surface_id: String,
    #[serde(default)]
    pub components: Vec<ComponentEntry>,
}

/// A component as sent in a surface update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// `{ "<TypeTag>": { ...properties } }`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<Map<String, Value>>,
}

/// Writes decoded records into a surface's data model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataModelUpdate {
    pub surface_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub contents: Vec<ValueRecord>,
}

/// Removes a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSurface {
    pub surface_id: String,
}

/// Parse one line into a message.
pub fn parse_message(line: &str) -> Result<ServerMessage> {
    let value: Value = serde_json::from_str(line)?;
    serde_json::from_value(value).map_err(|e| {
        let preview: String = line.chars().take(80).collect();
        Error::malformed_with_source(format!("not a protocol message: {}", preview), e)
    })
}

/// Parse newline-delimited messages, dropping blank and malformed lines.
pub fn parse_messages(input: &str) -> Vec<ServerMessage> {
    input
        .lines()
        .enumerate()
        .filter_map(|(index, line)| parse_line(index + 1, line))
        .collect()
}

/// Read newline-delimited messages from a stream.
///
/// Malformed lines are dropped; only I/O failures end the read with an error.
pub fn read_messages<R: BufRead>(reader: R) -> Result<Vec<ServerMessage>> {
    let mut messages = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        if let Some(message) = parse_line(index + 1, &line?) {
            messages.push(message);
        }
    }
    Ok(messages)
}

fn parse_line(line_number: usize, line: &str) -> Option<ServerMessage> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match parse_message(trimmed) {
        Ok(message) => Some(message),
        Err(e) => {
            warn!(line = line_number, error = %e, "Dropping malformed message");
            None
        }
    }
}
