//! # Block Objects
//!
//! A [`BlockObject`] is the runtime projection of one layout entry. It is
//! rebuilt from the persisted value on every load and never outlives the
//! editor that built it. Payloads stay in the [`PropertyValue`]; a block only
//! carries their identities plus transient UI state.

use crate::renderer::{BlockRenderer, BlockView};
use crate::{BlockConfigurationRegistry, ScaffoldProvider};
use blocklist_common::{
    BlockConfiguration, EditorSize, ElementData, ElementType, LayoutEntry, PropertyValue, Udi,
};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, warn};

const UNSUPPORTED_LABEL: &str = "Unsupported";

/// Label template such as `"{{title}} ({{count}})"`
///
/// Placeholders may carry a filter suffix (`{{title | truncate:10}}`); filters
/// are ignored and the raw value is inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTemplate {
    source: String,
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_$][\w$]*)\s*(?:\|[^}]*)?\}\}")
            .expect("placeholder pattern is valid")
    })
}

impl LabelTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn render(&self, values: &Map<String, Value>) -> String {
        placeholder()
            .replace_all(&self.source, |caps: &regex::Captures| {
                values.get(&caps[1]).map(display_value).unwrap_or_default()
            })
            .trim()
            .to_string()
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Inputs needed to project a layout entry into a block
pub(crate) struct BlockContext<'a> {
    pub registry: &'a BlockConfigurationRegistry,
    pub scaffolds: &'a ScaffoldProvider,
    pub supports_copy: bool,
}

/// Runtime wrapper around one layout entry
#[derive(Debug, Clone)]
pub struct BlockObject {
    layout: LayoutEntry,
    config: Option<Arc<BlockConfiguration>>,
    content_type: Option<Arc<ElementType>>,
    settings_type: Option<Arc<ElementType>>,
    renderer: Arc<dyn BlockRenderer>,
    label_template: Option<LabelTemplate>,
    label: String,
    has_error: Arc<AtomicBool>,

    pub(crate) index: usize,
    pub(crate) active: bool,
    pub(crate) focus: bool,

    show_settings: bool,
    show_copy: bool,
    hide_content_in_overlay: bool,
}

impl BlockObject {
    /// Projects a layout entry into a block.
    ///
    /// Returns `None` when the entry references payloads that are missing
    /// from the store. A configuration with a settings type but an entry
    /// without settings gets a fresh settings payload written into `value`.
    pub(crate) fn build(
        mut layout: LayoutEntry,
        value: &mut PropertyValue,
        ctx: &BlockContext<'_>,
    ) -> Option<BlockObject> {
        let Some(content) = value.content(&layout.content_key) else {
            error!(content_udi = %layout.content_key, "Layout entry references missing content, dropping");
            return None;
        };
        let content_type_key = content.content_type_key;

        let registered = ctx.registry.get(&content_type_key);
        let content_type = registered.and_then(|r| {
            ctx.scaffolds
                .element_type(&r.config.content_element_type_key)
                .cloned()
        });

        let (config, content_type) = match (registered, content_type) {
            (Some(registered), Some(content_type)) => (registered, content_type),
            (registered, _) => {
                if registered.is_none() {
                    warn!(content_type_key = %content_type_key, "Element type is not allowed in this editor, block is unsupported");
                } else {
                    warn!(content_type_key = %content_type_key, "Element type scaffold unavailable, block is unsupported");
                }
                return Some(Self::unsupported(layout, ctx));
            }
        };

        let mut settings_type = None;
        if let Some(settings_type_key) = config.config.settings_element_type_key {
            match ctx.scaffolds.element_type(&settings_type_key) {
                Some(element_type) => {
                    let settings_key = match &layout.settings_key {
                        Some(key) => key.clone(),
                        None => {
                            let settings = element_type.scaffold(Udi::new_element());
                            let key = settings.udi.clone();
                            debug!(content_udi = %layout.content_key, settings_udi = %key, "Created missing settings payload");
                            value.push_settings(settings);
                            layout.settings_key = Some(key.clone());
                            key
                        }
                    };
                    if value.settings(&settings_key).is_none() {
                        error!(settings_udi = %settings_key, "Layout entry references missing settings, dropping");
                        return None;
                    }
                    settings_type = Some(element_type.clone());
                }
                None => {
                    warn!(settings_type_key = %settings_type_key, "Settings scaffold unavailable, settings disabled for block");
                }
            }
        }

        let block_config = config.config.clone();
        let hide_content_in_overlay =
            block_config.force_hide_content_editor_in_overlay || ctx.registry.inline_editing();

        let mut block = BlockObject {
            layout,
            label_template: block_config.label.as_deref().map(LabelTemplate::new),
            renderer: config.renderer.clone(),
            config: Some(block_config),
            content_type: Some(content_type),
            show_settings: settings_type.is_some(),
            settings_type,
            label: String::new(),
            has_error: Arc::new(AtomicBool::new(false)),
            index: 0,
            active: false,
            focus: false,
            show_copy: ctx.supports_copy,
            hide_content_in_overlay,
        };
        block.refresh_label(value);
        Some(block)
    }

    fn unsupported(layout: LayoutEntry, ctx: &BlockContext<'_>) -> BlockObject {
        BlockObject {
            layout,
            config: None,
            content_type: None,
            settings_type: None,
            renderer: ctx.registry.unsupported_renderer(),
            label_template: None,
            label: UNSUPPORTED_LABEL.to_string(),
            has_error: Arc::new(AtomicBool::new(false)),
            index: 0,
            active: false,
            focus: false,
            show_settings: false,
            show_copy: false,
            hide_content_in_overlay: true,
        }
    }

    /// Recomputes the label from the current content values.
    pub(crate) fn refresh_label(&mut self, value: &PropertyValue) {
        let Some(content_type) = &self.content_type else {
            return;
        };
        self.label = match (&self.label_template, value.content(&self.layout.content_key)) {
            (Some(template), Some(content)) => {
                let rendered = template.render(content.values());
                if rendered.is_empty() {
                    content_type.name.clone()
                } else {
                    rendered
                }
            }
            _ => content_type.name.clone(),
        };
    }

    pub fn layout(&self) -> &LayoutEntry {
        &self.layout
    }

    pub fn content_key(&self) -> &Udi {
        &self.layout.content_key
    }

    pub fn settings_key(&self) -> Option<&Udi> {
        self.layout.settings_key.as_ref()
    }

    pub fn config(&self) -> Option<&Arc<BlockConfiguration>> {
        self.config.as_ref()
    }

    pub fn content_type(&self) -> Option<&Arc<ElementType>> {
        self.content_type.as_ref()
    }

    pub fn settings_type(&self) -> Option<&Arc<ElementType>> {
        self.settings_type.as_ref()
    }

    pub fn content_type_alias(&self) -> Option<&str> {
        self.content_type.as_deref().map(|t| t.alias.as_str())
    }

    pub fn is_unsupported(&self) -> bool {
        self.config.is_none()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn icon(&self) -> Option<&str> {
        self.content_type.as_deref().and_then(|t| t.icon.as_deref())
    }

    pub fn view(&self) -> BlockView {
        self.renderer.render(self)
    }

    pub fn shows_validation(&self) -> bool {
        self.renderer.shows_validation()
    }

    pub fn editor_size(&self) -> EditorSize {
        self.config
            .as_deref()
            .and_then(|c| c.editor_size)
            .unwrap_or_default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn has_focus(&self) -> bool {
        self.focus
    }

    pub fn show_settings(&self) -> bool {
        self.show_settings
    }

    pub fn show_copy(&self) -> bool {
        self.show_copy
    }

    pub fn hide_content_in_overlay(&self) -> bool {
        self.hide_content_in_overlay
    }

    pub fn has_error(&self) -> bool {
        self.has_error.load(Ordering::Relaxed)
    }

    /// Shared flag written by the block's validation subscription.
    pub(crate) fn error_flag(&self) -> Arc<AtomicBool> {
        self.has_error.clone()
    }

    pub(crate) fn content<'a>(&self, value: &'a PropertyValue) -> Option<&'a ElementData> {
        value.content(&self.layout.content_key)
    }

    pub(crate) fn settings<'a>(&self, value: &'a PropertyValue) -> Option<&'a ElementData> {
        self.layout
            .settings_key
            .as_ref()
            .and_then(|key| value.settings(key))
    }
}
