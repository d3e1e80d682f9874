use crate::{PropertyValue, Udi};
use serde_json::{Map, Value};
use std::collections::HashMap;

const UDI_FIELD: &str = "udi";
const LAYOUT_REFERENCE_FIELDS: &[&str] = &["contentUdi", "settingsUdi"];

/// Mutable visitor over payload values, descending into nested block values
///
/// Property values of a block may themselves be block editor values (a block
/// list inside a block). The default `walk_*` functions find those and visit
/// their payloads before their layout, so a visitor sees every payload before
/// any layout entry that references it.
pub trait VisitorMut: Sized {
    fn visit_value_mut(&mut self, value: &mut Value) {
        walk_value_mut(self, value);
    }

    fn visit_block_value_mut(&mut self, block: &mut Map<String, Value>) {
        walk_block_value_mut(self, block);
    }

    fn visit_element_mut(&mut self, element: &mut Map<String, Value>) {
        walk_element_mut(self, element);
    }

    fn visit_layout_mut(&mut self, _layout: &mut Value) {
        // Leaf, layouts hold references only
    }
}

pub fn walk_value_mut<V: VisitorMut>(visitor: &mut V, value: &mut Value) {
    if PropertyValue::is_block_value(value) {
        if let Value::Object(block) = value {
            visitor.visit_block_value_mut(block);
        }
        return;
    }

    match value {
        Value::Object(map) => {
            for item in map.values_mut() {
                visitor.visit_value_mut(item);
            }
        }
        Value::Array(items) => {
            for item in items {
                visitor.visit_value_mut(item);
            }
        }
        _ => {}
    }
}

pub fn walk_block_value_mut<V: VisitorMut>(visitor: &mut V, block: &mut Map<String, Value>) {
    for field in ["contentData", "settingsData"] {
        if let Some(Value::Array(items)) = block.get_mut(field) {
            for item in items {
                if let Value::Object(element) = item {
                    visitor.visit_element_mut(element);
                }
            }
        }
    }

    if let Some(layout) = block.get_mut("layout") {
        visitor.visit_layout_mut(layout);
    }
}

pub fn walk_element_mut<V: VisitorMut>(visitor: &mut V, element: &mut Map<String, Value>) {
    for (alias, value) in element.iter_mut() {
        if alias == UDI_FIELD || alias == "contentTypeKey" {
            continue;
        }
        visitor.visit_value_mut(value);
    }
}

/// Lookup form of a UDI string; payload and layout may spell the same key
/// in different case or GUID format.
fn canonical(raw: &str) -> String {
    Udi::parse(raw).map_or_else(|_| raw.to_string(), |udi| udi.to_string())
}

/// Gives every nested payload a fresh identity and rewrites the nested
/// layouts to match.
#[derive(Debug, Default)]
pub struct Rekeyer {
    replaced: HashMap<String, Udi>,
}

impl Rekeyer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-keys nested block values found in a payload's property values.
    pub fn rekey_values(&mut self, values: &mut Map<String, Value>) {
        for value in values.values_mut() {
            self.visit_value_mut(value);
        }
    }

    /// Number of nested payloads that received a new identity.
    pub fn replaced_count(&self) -> usize {
        self.replaced.len()
    }

    fn rewrite_references(&self, value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (field, item) in map.iter_mut() {
                    if LAYOUT_REFERENCE_FIELDS.contains(&field.as_str()) {
                        if let Value::String(old) = item {
                            if let Some(new) = self.replaced.get(&canonical(old)) {
                                *item = Value::String(new.to_string());
                            }
                        }
                    } else {
                        self.rewrite_references(item);
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.rewrite_references(item);
                }
            }
            _ => {}
        }
    }
}

impl VisitorMut for Rekeyer {
    fn visit_element_mut(&mut self, element: &mut Map<String, Value>) {
        if let Some(Value::String(old)) = element.get(UDI_FIELD) {
            let old = old.clone();
            let new = Udi::new_element();
            element.insert(UDI_FIELD.to_string(), Value::String(new.to_string()));
            self.replaced.insert(canonical(&old), new);
        }
        walk_element_mut(self, element);
    }

    fn visit_layout_mut(&mut self, layout: &mut Value) {
        self.rewrite_references(layout);
    }
}
