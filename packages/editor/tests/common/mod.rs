//! Shared fixtures for editor integration tests

#![allow(dead_code)]

use blocklist_common::{
    BlockConfiguration, BlockListConfig, ElementData, ElementType, LayoutEntry, PropertyGroup,
    PropertyType, PropertyValue, Udi,
};
use blocklist_editor::{
    BlockEditorController, EditorOptions, EditorServices, HeadlessHost, ScaffoldProvider,
};
use serde_json::json;
use uuid::Uuid;

pub fn element_type(alias: &str, properties: &[&str]) -> ElementType {
    ElementType {
        key: Uuid::new_v4(),
        alias: alias.to_string(),
        name: alias.to_string(),
        icon: Some("icon-document".to_string()),
        groups: vec![PropertyGroup {
            name: "Content".to_string(),
            properties: properties
                .iter()
                .map(|p| PropertyType {
                    alias: p.to_string(),
                    label: p.to_string(),
                    editor_alias: "Umbraco.TextBox".to_string(),
                })
                .collect(),
        }],
    }
}

/// A banner block with settings and a label template, and a plain text block
pub struct Fixture {
    pub banner: ElementType,
    pub banner_settings: ElementType,
    pub text: ElementType,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            banner: element_type("banner", &["title", "subtitle"]),
            banner_settings: element_type("bannerSettings", &["theme"]),
            text: element_type("text", &["body"]),
        }
    }

    pub fn config(&self) -> BlockListConfig {
        BlockListConfig {
            blocks: vec![
                BlockConfiguration::new(self.banner.key)
                    .with_settings(self.banner_settings.key)
                    .with_label("{{title}}"),
                BlockConfiguration::new(self.text.key),
            ],
            ..BlockListConfig::default()
        }
    }

    pub fn scaffolds(&self) -> ScaffoldProvider {
        ScaffoldProvider::from_types([
            self.banner.clone(),
            self.banner_settings.clone(),
            self.text.clone(),
        ])
    }

    pub fn editor(&self, value: PropertyValue) -> BlockEditorController<HeadlessHost> {
        self.editor_with(value, self.config(), EditorServices::default(), HeadlessHost::default())
    }

    pub fn editor_with(
        &self,
        value: PropertyValue,
        config: BlockListConfig,
        services: EditorServices,
        host: HeadlessHost,
    ) -> BlockEditorController<HeadlessHost> {
        BlockEditorController::new(
            value,
            config,
            self.scaffolds(),
            services,
            host,
            EditorOptions::new("blocks"),
        )
        .unwrap()
    }

    /// Stored value with one text block per body.
    pub fn text_value(&self, bodies: &[&str]) -> PropertyValue {
        let mut value = PropertyValue::new();
        let mut entries = Vec::new();
        for body in bodies {
            let mut content = ElementData::new(self.text.key, Udi::new_element());
            content.set_value("body", json!(body));
            entries.push(LayoutEntry::new(content.udi.clone(), None));
            value.push_content(content);
        }
        value
            .set_layout_entries(blocklist_editor::DEFAULT_EDITOR_ALIAS, &entries)
            .unwrap();
        value
    }
}
