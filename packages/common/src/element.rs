//! # Element Types and Payloads
//!
//! An element type is the schema of a block: named property groups, each with
//! typed properties. An [`ElementData`] is one payload conforming to such a
//! type, persisted flat as `{ "contentTypeKey", "udi", <alias>: <value>, ... }`.

use crate::Udi;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Property editors that cannot be edited inside a block.
pub const UNSUPPORTED_PROPERTY_EDITORS: &[&str] = &[
    "Umbraco.Tags",
    "Umbraco.UploadField",
    "Umbraco.ImageCropper",
    "Umbraco.NestedContent",
];

/// Schema of a block's content or settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementType {
    pub key: Uuid,
    pub alias: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub groups: Vec<PropertyGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyGroup {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<PropertyType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyType {
    pub alias: String,
    #[serde(default)]
    pub label: String,
    pub editor_alias: String,
}

impl PropertyType {
    pub fn is_supported(&self) -> bool {
        !UNSUPPORTED_PROPERTY_EDITORS.contains(&self.editor_alias.as_str())
    }
}

impl ElementType {
    /// All properties across groups, in group order.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyType> {
        self.groups.iter().flat_map(|g| g.properties.iter())
    }

    pub fn property(&self, alias: &str) -> Option<&PropertyType> {
        self.properties().find(|p| p.alias == alias)
    }

    pub fn has_property(&self, alias: &str) -> bool {
        self.property(alias).is_some()
    }

    /// An empty payload of this type under the given identity.
    pub fn scaffold(&self, udi: Udi) -> ElementData {
        ElementData::new(self.key, udi)
    }
}

/// One content or settings payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementData {
    pub content_type_key: Uuid,
    pub udi: Udi,
    #[serde(flatten)]
    values: Map<String, Value>,
}

impl ElementData {
    pub fn new(content_type_key: Uuid, udi: Udi) -> Self {
        Self {
            content_type_key,
            udi,
            values: Map::new(),
        }
    }

    pub fn with_values(mut self, values: Map<String, Value>) -> Self {
        self.values = values;
        self
    }

    pub fn value(&self, alias: &str) -> Option<&Value> {
        self.values.get(alias)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.values
    }

    pub fn set_value(&mut self, alias: impl Into<String>, value: Value) {
        self.values.insert(alias.into(), value);
    }

    /// Copies every property value of `source` onto this payload, keeping this
    /// payload's identity.
    pub fn assign_values_from(&mut self, source: &ElementData) {
        self.values = source.values.clone();
    }

    /// Copies only values that carry content (non-null, non-empty) from
    /// `source`. Used when seeding a new payload from a scaffold snapshot.
    pub fn merge_present_values_from(&mut self, source: &Map<String, Value>) {
        for (alias, value) in source {
            if is_present(value) {
                self.values.insert(alias.clone(), value.clone());
            }
        }
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn heading_type() -> ElementType {
        serde_json::from_value(json!({
            "key": "5b1c2f5e-9b4e-4b7a-9a66-2b3f1f0c4a11",
            "alias": "heading",
            "name": "Heading",
            "icon": "icon-font",
            "groups": [{
                "name": "Content",
                "properties": [
                    { "alias": "title", "label": "Title", "editorAlias": "Umbraco.TextBox" },
                    { "alias": "tags", "label": "Tags", "editorAlias": "Umbraco.Tags" }
                ]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_property_lookup() {
        let ty = heading_type();
        assert!(ty.has_property("title"));
        assert!(!ty.has_property("body"));
        assert_eq!(ty.properties().count(), 2);
    }

    #[test]
    fn test_unsupported_editor_flag() {
        let ty = heading_type();
        assert!(ty.property("title").unwrap().is_supported());
        assert!(!ty.property("tags").unwrap().is_supported());
    }

    #[test]
    fn test_element_data_flattens_values() {
        let data: ElementData = serde_json::from_value(json!({
            "contentTypeKey": "5b1c2f5e-9b4e-4b7a-9a66-2b3f1f0c4a11",
            "udi": "umb://element/1304e1ddac87439684fe8a399231cb3d",
            "title": "Hello"
        }))
        .unwrap();

        assert_eq!(data.value("title"), Some(&json!("Hello")));
        assert_eq!(data.values().len(), 1);

        let back = serde_json::to_value(&data).unwrap();
        assert_eq!(back["title"], "Hello");
        assert_eq!(back["udi"], "umb://element/1304e1ddac87439684fe8a399231cb3d");
    }

    #[test]
    fn test_scaffold_is_empty() {
        let ty = heading_type();
        let udi = Udi::new_element();
        let data = ty.scaffold(udi.clone());
        assert_eq!(data.udi, udi);
        assert_eq!(data.content_type_key, ty.key);
        assert!(data.values().is_empty());
    }

    #[test]
    fn test_merge_present_values_skips_empty() {
        let mut data = ElementData::new(Uuid::new_v4(), Udi::new_element());
        let source = json!({ "title": "Hi", "subtitle": "", "count": 0, "flag": null })
            .as_object()
            .cloned()
            .unwrap();
        data.merge_present_values_from(&source);
        assert_eq!(data.values().len(), 1);
        assert_eq!(data.value("title"), Some(&json!("Hi")));
    }
}
