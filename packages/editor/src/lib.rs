//! # Blocklist Editor
//!
//! Runtime core of the block list property editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ common: PropertyValue (layout + payloads)   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: BlockEditorController               │
//! │  - Layout model of live BlockObjects        │
//! │  - Live / deferred edit sessions            │
//! │  - Clipboard copy and re-keyed paste        │
//! │  - Validation path resolution               │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ host: overlay and delete confirmation       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The property value is the source of truth**: blocks read and write
//!    their payloads through it and the layout is written back after every
//!    structural change
//! 2. **Identities are unique**: pasted and created blocks always get fresh
//!    payload identifiers
//! 3. **Removal releases everything**: a deleted block's payloads,
//!    subscriptions and validation errors go with it
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blocklist_editor::{BlockEditorController, EditorOptions, EditorServices, HeadlessHost};
//!
//! let mut editor = BlockEditorController::load(
//!     &element_types,
//!     value,
//!     config,
//!     EditorServices::default(),
//!     HeadlessHost::default(),
//!     EditorOptions::new("blocks"),
//! )
//! .await?;
//!
//! let index = editor.create(0, banner_key)?;
//! editor.set_value(EditTarget::Content, "title", json!("Hello"))?;
//! editor.submit()?;
//!
//! let json = editor.to_json()?;
//! ```

mod block;
mod clipboard;
mod controller;
mod errors;
mod host;
mod layout;
mod registry;
mod renderer;
mod scaffold;
mod session;
mod validation;

pub use block::{BlockObject, LabelTemplate};
pub use clipboard::{
    BlockSnapshot, ClipboardCodec, ClipboardData, ClipboardEntry, ClipboardEntryType,
    ClipboardStore, InMemoryClipboard, PasteSource, PastedBlock, UnsupportedClipboard,
    COPY_ALL_ICON, DEFAULT_CLIPBOARD_CAPACITY,
};
pub use controller::{
    BlockEditorController, Cardinality, EditorOptions, EditorServices, DEFAULT_EDITOR_ALIAS,
};
pub use errors::{EditorError, EditorResult};
pub use host::{BlockEditorModel, DeletePrompt, HeadlessHost, OverlayHost};
pub use layout::BlockLayoutModel;
pub use registry::{AvailableBlock, BlockConfigurationRegistry, RegisteredBlock};
pub use renderer::{
    BlockRenderer, BlockView, CustomViewRenderer, InlineBlockRenderer, LabelBlockRenderer,
    UnsupportedBlockRenderer,
};
pub use scaffold::{ElementTypeSource, InMemoryElementTypes, ScaffoldProvider};
pub use session::{open_session, ClonedBinding, EditMode, EditSession, EditTarget, LiveBinding};
pub use validation::{
    BlockValidationPaths, ErrorQuery, MatchMode, PathSegment, PropertyError, ValidationCallback,
    ValidationNotice, ValidationPath, ValidationPathResolver, ValidationRegistry,
    ValidationSubscription,
};
