//! # Persisted Property Value
//!
//! The stored shape of a block editor property:
//!
//! ```text
//! {
//!   "layout":       { "<editorAlias>": [ { "contentUdi", "settingsUdi"? }, ... ] },
//!   "contentData":  [ { "contentTypeKey", "udi", ...values }, ... ],
//!   "settingsData": [ { "contentTypeKey", "udi", ...values }, ... ]
//! }
//! ```
//!
//! Layouts of other editor aliases, unknown top-level fields and unknown
//! layout entry fields are carried through untouched so that a load followed
//! by a save reproduces the input.

use crate::{ElementData, ModelError, ModelResult, Udi};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Position and identity of one block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    #[serde(rename = "contentUdi")]
    pub content_key: Udi,

    #[serde(rename = "settingsUdi", default, skip_serializing_if = "Option::is_none")]
    pub settings_key: Option<Udi>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LayoutEntry {
    pub fn new(content_key: Udi, settings_key: Option<Udi>) -> Self {
        Self {
            content_key,
            settings_key,
            extra: Map::new(),
        }
    }
}

/// The full stored value of a block editor property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyValue {
    #[serde(default)]
    layout: Map<String, Value>,

    #[serde(default)]
    content_data: Vec<ElementData>,

    #[serde(default)]
    settings_data: Vec<ElementData>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl PropertyValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a stored value. `null` and non-object values are treated as an
    /// empty property.
    pub fn from_json(value: &Value) -> ModelResult<Self> {
        if !value.is_object() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn from_json_str(source: &str) -> ModelResult<Self> {
        let value: Value = serde_json::from_str(source)?;
        Self::from_json(&value)
    }

    pub fn to_json(&self) -> ModelResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Raw layout entries for one editor alias, unfiltered.
    pub fn layout_entries(&self, editor_alias: &str) -> ModelResult<Vec<LayoutEntry>> {
        match self.layout.get(editor_alias) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| serde_json::from_value(item.clone()).map_err(ModelError::from))
                .collect(),
            Some(other) => Err(ModelError::MalformedValue(format!(
                "layout for '{}' must be an array, found {}",
                editor_alias, other
            ))),
        }
    }

    pub fn set_layout_entries(&mut self, editor_alias: &str, entries: &[LayoutEntry]) -> ModelResult<()> {
        let value = serde_json::to_value(entries)?;
        self.layout.insert(editor_alias.to_string(), value);
        Ok(())
    }

    pub fn content_data(&self) -> &[ElementData] {
        &self.content_data
    }

    pub fn settings_data(&self) -> &[ElementData] {
        &self.settings_data
    }

    pub fn content(&self, udi: &Udi) -> Option<&ElementData> {
        self.content_data.iter().find(|d| &d.udi == udi)
    }

    pub fn content_mut(&mut self, udi: &Udi) -> Option<&mut ElementData> {
        self.content_data.iter_mut().find(|d| &d.udi == udi)
    }

    pub fn settings(&self, udi: &Udi) -> Option<&ElementData> {
        self.settings_data.iter().find(|d| &d.udi == udi)
    }

    pub fn settings_mut(&mut self, udi: &Udi) -> Option<&mut ElementData> {
        self.settings_data.iter_mut().find(|d| &d.udi == udi)
    }

    pub fn push_content(&mut self, data: ElementData) {
        self.content_data.push(data);
    }

    pub fn push_settings(&mut self, data: ElementData) {
        self.settings_data.push(data);
    }

    pub fn remove_content(&mut self, udi: &Udi) -> Option<ElementData> {
        let index = self.content_data.iter().position(|d| &d.udi == udi)?;
        Some(self.content_data.remove(index))
    }

    pub fn remove_settings(&mut self, udi: &Udi) -> Option<ElementData> {
        let index = self.settings_data.iter().position(|d| &d.udi == udi)?;
        Some(self.settings_data.remove(index))
    }

    /// True when `value` looks like a stored block editor value. Used to find
    /// nested block properties inside payload values.
    pub fn is_block_value(value: &Value) -> bool {
        match value {
            Value::Object(map) => map.get("layout").is_some_and(Value::is_object)
                && map.get("contentData").is_some_and(Value::is_array),
            _ => false,
        }
    }
}
