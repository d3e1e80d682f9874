//! The overlay host presents the edit surface and answers delete prompts.

use blocklist_common::{EditorSize, Udi};

/// What the host needs to open the edit overlay for a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEditorModel {
    pub content_key: Udi,
    pub title: String,
    pub open_settings: bool,
    pub create_flow: bool,
    pub live_editing: bool,
    pub hide_content: bool,
    pub hide_submit_button: bool,
    pub size: EditorSize,
}

/// Delete confirmation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    /// Labels of the blocks about to be removed
    pub labels: Vec<String>,
    /// The property label, set when every block is being removed
    pub property_label: Option<String>,
}

impl DeletePrompt {
    pub fn block(label: impl Into<String>) -> Self {
        Self {
            labels: vec![label.into()],
            property_label: None,
        }
    }

    pub fn all(labels: Vec<String>, property_label: impl Into<String>) -> Self {
        Self {
            labels,
            property_label: Some(property_label.into()),
        }
    }

    pub fn is_delete_all(&self) -> bool {
        self.property_label.is_some()
    }
}

pub trait OverlayHost {
    fn open(&mut self, model: &BlockEditorModel);

    fn close(&mut self);

    /// Returns `true` when the user confirmed.
    fn confirm_delete(&mut self, prompt: &DeletePrompt) -> bool;
}

/// Host with no UI: records what was opened and answers prompts with a
/// fixed decision
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    pub confirm: bool,
    pub opened: Vec<BlockEditorModel>,
    pub prompts: Vec<DeletePrompt>,
    pub is_open: bool,
}

impl HeadlessHost {
    pub fn new(confirm: bool) -> Self {
        Self {
            confirm,
            opened: Vec::new(),
            prompts: Vec::new(),
            is_open: false,
        }
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new(true)
    }
}

impl OverlayHost for HeadlessHost {
    fn open(&mut self, model: &BlockEditorModel) {
        self.opened.push(model.clone());
        self.is_open = true;
    }

    fn close(&mut self) {
        self.is_open = false;
    }

    fn confirm_delete(&mut self, prompt: &DeletePrompt) -> bool {
        self.prompts.push(prompt.clone());
        self.confirm
    }
}
