//! # Block Renderers
//!
//! Each block configuration resolves to one render strategy when the editor
//! loads. Blocks keep a handle to their strategy instead of re-deriving a view
//! on every render.

use crate::BlockObject;
use std::fmt::Debug;

/// What the editor chrome should draw for a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockView {
    /// Collapsed row showing label and icon; editing happens in the overlay
    Label { label: String, icon: Option<String> },

    /// Row that expands in place to show the content editor
    Inline {
        label: String,
        icon: Option<String>,
        expanded: bool,
    },

    /// Configuration-supplied view
    Custom { view: String, label: String },

    /// Element type is gone or not allowed; delete-only
    Unsupported { label: String },
}

impl BlockView {
    pub fn label(&self) -> &str {
        match self {
            BlockView::Label { label, .. }
            | BlockView::Inline { label, .. }
            | BlockView::Custom { label, .. }
            | BlockView::Unsupported { label } => label,
        }
    }
}

pub trait BlockRenderer: Debug + Send + Sync {
    fn render(&self, block: &BlockObject) -> BlockView;

    /// Custom views render their own validation state.
    fn shows_validation(&self) -> bool {
        false
    }
}

#[derive(Debug, Default)]
pub struct LabelBlockRenderer;

impl BlockRenderer for LabelBlockRenderer {
    fn render(&self, block: &BlockObject) -> BlockView {
        BlockView::Label {
            label: block.label().to_string(),
            icon: block.icon().map(str::to_string),
        }
    }
}

#[derive(Debug, Default)]
pub struct InlineBlockRenderer;

impl BlockRenderer for InlineBlockRenderer {
    fn render(&self, block: &BlockObject) -> BlockView {
        BlockView::Inline {
            label: block.label().to_string(),
            icon: block.icon().map(str::to_string),
            expanded: block.is_active(),
        }
    }
}

#[derive(Debug)]
pub struct CustomViewRenderer {
    view: String,
}

impl CustomViewRenderer {
    pub fn new(view: impl Into<String>) -> Self {
        Self { view: view.into() }
    }
}

impl BlockRenderer for CustomViewRenderer {
    fn render(&self, block: &BlockObject) -> BlockView {
        BlockView::Custom {
            view: self.view.clone(),
            label: block.label().to_string(),
        }
    }

    fn shows_validation(&self) -> bool {
        true
    }
}

#[derive(Debug, Default)]
pub struct UnsupportedBlockRenderer;

impl BlockRenderer for UnsupportedBlockRenderer {
    fn render(&self, block: &BlockObject) -> BlockView {
        BlockView::Unsupported {
            label: block.label().to_string(),
        }
    }
}
