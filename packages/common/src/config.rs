//! Static configuration of a block list property editor.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Block-level settings for one allowed element type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockConfiguration {
    pub content_element_type_key: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_element_type_key: Option<Uuid>,

    /// Label template, e.g. `"{{title}}"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Custom view path; the built-in views are used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stylesheet: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_size: Option<EditorSize>,

    #[serde(default)]
    pub force_hide_content_editor_in_overlay: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl BlockConfiguration {
    pub fn new(content_element_type_key: Uuid) -> Self {
        Self {
            content_element_type_key,
            settings_element_type_key: None,
            label: None,
            view: None,
            stylesheet: None,
            editor_size: None,
            force_hide_content_editor_in_overlay: false,
            icon_color: None,
            background_color: None,
            thumbnail: None,
        }
    }

    pub fn with_settings(mut self, settings_element_type_key: Uuid) -> Self {
        self.settings_element_type_key = Some(settings_element_type_key);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    pub fn has_settings(&self) -> bool {
        self.settings_element_type_key.is_some()
    }
}

/// Width of the editing overlay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorSize {
    Small,
    #[default]
    Medium,
    Large,
}

/// Optional minimum and maximum number of blocks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationLimit {
    #[serde(default)]
    pub min: Option<usize>,
    #[serde(default)]
    pub max: Option<usize>,
}

impl ValidationLimit {
    pub fn new(min: Option<usize>, max: Option<usize>) -> Self {
        Self { min, max }
    }

    pub fn min_satisfied(&self, count: usize) -> bool {
        self.min.map_or(true, |min| count >= min)
    }

    pub fn max_satisfied(&self, count: usize) -> bool {
        self.max.map_or(true, |max| count <= max)
    }
}

/// Configuration of one block list property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockListConfig {
    #[serde(default)]
    pub blocks: Vec<BlockConfiguration>,

    #[serde(default)]
    pub validation_limit: ValidationLimit,

    #[serde(default = "default_live_editing")]
    pub use_live_editing: bool,

    #[serde(default)]
    pub use_inline_editing_as_default: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_property_width: Option<String>,
}

fn default_live_editing() -> bool {
    true
}

impl Default for BlockListConfig {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            validation_limit: ValidationLimit::default(),
            use_live_editing: default_live_editing(),
            use_inline_editing_as_default: false,
            max_property_width: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "blocks": [
                {
                    "contentElementTypeKey": "d6a1a3fb-3a37-4de5-a1f0-9a7c2e7f6a11",
                    "settingsElementTypeKey": "e0b0c3b7-1b0e-4c8e-8f0a-5d5b2a6a1c22",
                    "label": "{{title}}",
                    "editorSize": "large",
                    "forceHideContentEditorInOverlay": true
                }
            ],
            "validationLimit": { "min": 1, "max": 3 },
            "useLiveEditing": false
        }"#;

        let config: BlockListConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.blocks.len(), 1);
        assert!(config.blocks[0].has_settings());
        assert_eq!(config.blocks[0].editor_size, Some(EditorSize::Large));
        assert!(config.blocks[0].force_hide_content_editor_in_overlay);
        assert_eq!(config.validation_limit, ValidationLimit::new(Some(1), Some(3)));
        assert!(!config.use_live_editing);
        assert!(!config.use_inline_editing_as_default);
    }

    #[test]
    fn test_default_config() {
        let config = BlockListConfig::default();
        assert!(config.use_live_editing);
        assert!(config.blocks.is_empty());
        assert_eq!(config.validation_limit, ValidationLimit::default());
    }

    #[test]
    fn test_validation_limit() {
        let limit = ValidationLimit::new(Some(1), Some(2));
        assert!(!limit.min_satisfied(0));
        assert!(limit.min_satisfied(1));
        assert!(limit.max_satisfied(2));
        assert!(!limit.max_satisfied(3));

        let open = ValidationLimit::default();
        assert!(open.min_satisfied(0));
        assert!(open.max_satisfied(usize::MAX));
    }
}
