//! Error types for the block editor

use blocklist_common::{ModelError, Udi};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Element type is not allowed in this editor: {0}")]
    ElementTypeNotAllowed(Uuid),

    #[error("Element type scaffold not loaded: {0}")]
    ScaffoldMissing(Uuid),

    #[error("Failed to fetch element type {key}: {reason}")]
    ScaffoldFetch { key: Uuid, reason: String },

    #[error("Block is unsupported and can only be deleted: {0}")]
    UnsupportedBlock(Udi),

    #[error("Block already present: {0}")]
    DuplicateBlock(Udi),

    #[error("Block not found: {0}")]
    BlockNotFound(Udi),

    #[error("Index {index} out of range for {len} blocks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unknown property '{alias}' on element type {element_type}")]
    UnknownProperty { alias: String, element_type: String },

    #[error("Block has no settings")]
    NoSettings,

    #[error("No block is being edited")]
    NoActiveEdit,

    #[error("Cannot reorder while a block is active")]
    EditInProgress,

    #[error("Clipboard entry is not compatible with this editor (aliases: {0:?})")]
    IncompatiblePaste(Vec<String>),

    #[error("Clipboard is not supported")]
    ClipboardUnsupported,

    #[error("Editor is read-only")]
    ReadOnly,
}

pub type EditorResult<T> = Result<T, EditorError>;
