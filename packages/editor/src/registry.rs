//! Per-editor registry of allowed block types.

use crate::renderer::{
    BlockRenderer, CustomViewRenderer, InlineBlockRenderer, LabelBlockRenderer,
    UnsupportedBlockRenderer,
};
use crate::ScaffoldProvider;
use blocklist_common::{BlockConfiguration, ElementType};
use std::sync::Arc;
use uuid::Uuid;

/// One allowed block type with its resolved renderer
#[derive(Debug, Clone)]
pub struct RegisteredBlock {
    pub config: Arc<BlockConfiguration>,
    pub renderer: Arc<dyn BlockRenderer>,
}

/// An entry for the block picker
#[derive(Debug, Clone)]
pub struct AvailableBlock {
    pub config: Arc<BlockConfiguration>,
    pub element_type: Arc<ElementType>,
}

/// Immutable mapping from content element type key to block configuration
#[derive(Debug, Clone)]
pub struct BlockConfigurationRegistry {
    blocks: Vec<RegisteredBlock>,
    inline_editing: bool,
    unsupported: Arc<dyn BlockRenderer>,
}

impl BlockConfigurationRegistry {
    pub fn new(configs: impl IntoIterator<Item = BlockConfiguration>, inline_editing: bool) -> Self {
        let label: Arc<dyn BlockRenderer> = Arc::new(LabelBlockRenderer);
        let inline: Arc<dyn BlockRenderer> = Arc::new(InlineBlockRenderer);

        let blocks = configs
            .into_iter()
            .map(|config| {
                let renderer = match config.view.as_deref() {
                    Some(view) if !view.is_empty() => {
                        Arc::new(CustomViewRenderer::new(view)) as Arc<dyn BlockRenderer>
                    }
                    _ if inline_editing => inline.clone(),
                    _ => label.clone(),
                };
                RegisteredBlock {
                    config: Arc::new(config),
                    renderer,
                }
            })
            .collect();

        Self {
            blocks,
            inline_editing,
            unsupported: Arc::new(UnsupportedBlockRenderer),
        }
    }

    pub fn get(&self, content_element_type_key: &Uuid) -> Option<&RegisteredBlock> {
        self.blocks
            .iter()
            .find(|b| &b.config.content_element_type_key == content_element_type_key)
    }

    pub fn is_allowed(&self, content_element_type_key: &Uuid) -> bool {
        self.get(content_element_type_key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredBlock> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn inline_editing(&self) -> bool {
        self.inline_editing
    }

    pub fn unsupported_renderer(&self) -> Arc<dyn BlockRenderer> {
        self.unsupported.clone()
    }

    /// Content type aliases this editor accepts, used to filter the clipboard.
    pub fn allowed_aliases(&self, scaffolds: &ScaffoldProvider) -> Vec<String> {
        self.blocks
            .iter()
            .filter_map(|b| scaffolds.element_type(&b.config.content_element_type_key))
            .map(|t| t.alias.clone())
            .collect()
    }

    /// Block types whose element type is loaded, in configuration order.
    pub fn available_blocks(&self, scaffolds: &ScaffoldProvider) -> Vec<AvailableBlock> {
        self.blocks
            .iter()
            .filter_map(|b| {
                scaffolds
                    .element_type(&b.config.content_element_type_key)
                    .map(|element_type| AvailableBlock {
                        config: b.config.clone(),
                        element_type: element_type.clone(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlockView;

    fn element_type(key: Uuid, alias: &str) -> ElementType {
        ElementType {
            key,
            alias: alias.to_string(),
            name: alias.to_string(),
            icon: None,
            groups: vec![],
        }
    }

    #[test]
    fn test_renderer_resolution() {
        let plain = Uuid::new_v4();
        let custom = Uuid::new_v4();
        let registry = BlockConfigurationRegistry::new(
            [
                BlockConfiguration::new(plain),
                BlockConfiguration::new(custom).with_view("/App_Plugins/hero.html"),
            ],
            false,
        );

        assert!(!registry.get(&plain).unwrap().renderer.shows_validation());
        assert!(registry.get(&custom).unwrap().renderer.shows_validation());
        assert!(registry.get(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_inline_editing_uses_inline_renderer() {
        let key = Uuid::new_v4();
        let registry = BlockConfigurationRegistry::new([BlockConfiguration::new(key)], true);
        let renderer = format!("{:?}", registry.get(&key).unwrap().renderer);
        assert_eq!(renderer, "InlineBlockRenderer");
        assert!(registry.inline_editing());
        let _ = BlockView::Unsupported { label: String::new() };
    }

    #[test]
    fn test_allowed_aliases_skip_unloaded_types() {
        let loaded = Uuid::new_v4();
        let missing = Uuid::new_v4();
        let registry = BlockConfigurationRegistry::new(
            [BlockConfiguration::new(loaded), BlockConfiguration::new(missing)],
            false,
        );
        let scaffolds = ScaffoldProvider::from_types([element_type(loaded, "banner")]);

        assert_eq!(registry.allowed_aliases(&scaffolds), vec!["banner".to_string()]);
        assert_eq!(registry.available_blocks(&scaffolds).len(), 1);
    }
}
