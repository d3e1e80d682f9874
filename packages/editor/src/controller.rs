//! # Block Editor Controller
//!
//! Owns the property value and every runtime structure built from it, and
//! mediates all mutation:
//!
//! ```text
//!   create ──► active (create flow) ──submit──► collapsed
//!                  │
//!                  └──close──► removed
//!
//!   edit ────► active ──submit / close──► collapsed
//! ```
//!
//! After every structural change the layout is written back into the value
//! and the cardinality state is recomputed.

use crate::block::BlockContext;
use crate::clipboard::{ClipboardCodec, ClipboardEntry, ClipboardStore, InMemoryClipboard, PastedBlock};
use crate::host::{BlockEditorModel, DeletePrompt, OverlayHost};
use crate::registry::AvailableBlock;
use crate::session::{open_session, EditMode, EditSession, EditTarget};
use crate::validation::{
    BlockValidationPaths, ValidationPath, ValidationPathResolver, ValidationRegistry,
    ValidationSubscription,
};
use crate::{
    BlockConfigurationRegistry, BlockLayoutModel, BlockObject, EditorError, EditorResult,
    ElementTypeSource, ScaffoldProvider,
};
use blocklist_common::{BlockListConfig, ElementData, LayoutEntry, PropertyValue, Udi};
use serde_json::Value;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub const DEFAULT_EDITOR_ALIAS: &str = "Umbraco.BlockList";

/// Per-instance settings supplied by the host document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    /// Key of this editor's layout inside the property value
    pub editor_alias: String,
    pub property_label: String,
    pub document_name: Option<String>,
    /// Identity of the property, used to replace earlier "copy all" entries
    pub source_id: Option<String>,
    pub culture: Option<String>,
    pub segment: Option<String>,
    /// Validation path of the property; nested editors pass the parent
    /// block's nested property path
    pub property_path: ValidationPath,
    pub read_only: bool,
}

impl EditorOptions {
    pub fn new(property_alias: impl Into<String>) -> Self {
        let alias = property_alias.into();
        Self {
            editor_alias: DEFAULT_EDITOR_ALIAS.to_string(),
            property_path: ValidationPath::property(alias.clone()),
            property_label: alias,
            document_name: None,
            source_id: None,
            culture: None,
            segment: None,
            read_only: false,
        }
    }
}

/// Shared services injected into every editor instance
#[derive(Debug, Clone)]
pub struct EditorServices {
    pub clipboard: Arc<dyn ClipboardStore>,
    pub validation: Arc<ValidationRegistry>,
}

impl Default for EditorServices {
    fn default() -> Self {
        Self {
            clipboard: Arc::new(InMemoryClipboard::new()),
            validation: ValidationRegistry::new(),
        }
    }
}

/// Block count against the configured limits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cardinality {
    pub count: usize,
    pub min_ok: bool,
    pub max_ok: bool,
}

impl Cardinality {
    pub fn is_valid(&self) -> bool {
        self.min_ok && self.max_ok
    }
}

#[derive(Debug)]
struct ActiveEdit {
    content_key: Udi,
    session: Box<dyn EditSession>,
    create_flow: bool,
    open_settings: bool,
    deactivate_on_close: bool,
}

pub struct BlockEditorController<H: OverlayHost> {
    options: EditorOptions,
    config: BlockListConfig,
    registry: BlockConfigurationRegistry,
    scaffolds: ScaffoldProvider,
    value: PropertyValue,
    layout: BlockLayoutModel,
    clipboard: ClipboardCodec,
    validation: Arc<ValidationRegistry>,
    resolver: ValidationPathResolver,
    host: H,
    active_edit: Option<ActiveEdit>,
    subscriptions: HashMap<Udi, ValidationSubscription>,
    cardinality: Cardinality,
}

impl<H: OverlayHost> BlockEditorController<H> {
    /// Fetches the element types named by `config`, then builds the editor.
    pub async fn load<S: ElementTypeSource>(
        source: &S,
        value: PropertyValue,
        config: BlockListConfig,
        services: EditorServices,
        host: H,
        options: EditorOptions,
    ) -> EditorResult<Self> {
        let scaffolds = ScaffoldProvider::load(source, &config.blocks).await?;
        Self::new(value, config, scaffolds, services, host, options)
    }

    pub fn new(
        value: PropertyValue,
        config: BlockListConfig,
        scaffolds: ScaffoldProvider,
        services: EditorServices,
        host: H,
        options: EditorOptions,
    ) -> EditorResult<Self> {
        let registry = BlockConfigurationRegistry::new(
            config.blocks.iter().cloned(),
            config.use_inline_editing_as_default,
        );
        let resolver = ValidationPathResolver::new(options.property_path.clone());

        let mut controller = Self {
            options,
            config,
            registry,
            scaffolds,
            value: PropertyValue::new(),
            layout: BlockLayoutModel::new(),
            clipboard: ClipboardCodec::new(services.clipboard),
            validation: services.validation,
            resolver,
            host,
            active_edit: None,
            subscriptions: HashMap::new(),
            cardinality: Cardinality::default(),
        };
        controller.rebuild(value)?;
        Ok(controller)
    }

    fn rebuild(&mut self, value: PropertyValue) -> EditorResult<()> {
        self.value = value;
        let entries = BlockLayoutModel::load(&self.value, &self.options.editor_alias)?;
        let stored = entries.len();

        let ctx = BlockContext {
            registry: &self.registry,
            scaffolds: &self.scaffolds,
            supports_copy: self.clipboard.is_supported(),
        };
        for entry in entries {
            if let Some(block) = BlockObject::build(entry, &mut self.value, &ctx) {
                let end = self.layout.len();
                self.layout.insert(end, block);
            }
        }

        for index in 0..self.layout.len() {
            self.subscribe_block(index);
        }
        self.sync()?;

        info!(
            editor = %self.options.editor_alias,
            blocks = self.layout.len(),
            dropped = stored - self.layout.len(),
            "Block editor loaded"
        );
        Ok(())
    }

    /// Writes the layout back into the value and recomputes cardinality.
    fn sync(&mut self) -> EditorResult<()> {
        self.layout.save(&mut self.value, &self.options.editor_alias)?;
        let count = self.layout.len();
        let limit = self.config.validation_limit;
        self.cardinality = Cardinality {
            count,
            min_ok: limit.min_satisfied(count),
            max_ok: limit.max_satisfied(count),
        };
        Ok(())
    }

    fn subscribe_block(&mut self, index: usize) {
        let Some(block) = self.layout.get(index) else {
            return;
        };
        let queries = self.resolver.error_queries(
            block,
            self.options.culture.as_deref(),
            self.options.segment.as_deref(),
        );
        let Some(primary) = queries.first().cloned() else {
            return;
        };

        let flag = block.error_flag();
        let key = block.content_key().clone();
        let registry = Arc::downgrade(&self.validation);
        // Every change notifies every subscriber, so one subscription can
        // track both payloads.
        let subscription = self.validation.subscribe(primary, move |_| {
            if let Some(registry) = registry.upgrade() {
                let has_error = queries.iter().any(|q| registry.has_property_error(q));
                flag.store(has_error, Ordering::Relaxed);
            }
        });
        self.subscriptions.insert(key, subscription);
    }

    fn release_block(&mut self, block: &BlockObject) {
        self.subscriptions.remove(block.content_key());
        for query in self.resolver.release_queries(
            block,
            self.options.culture.as_deref(),
            self.options.segment.as_deref(),
        ) {
            self.validation.remove_property_error(&query);
        }
    }

    fn ensure_writable(&self) -> EditorResult<()> {
        if self.options.read_only {
            Err(EditorError::ReadOnly)
        } else {
            Ok(())
        }
    }

    fn block_at(&self, index: usize) -> EditorResult<&BlockObject> {
        self.layout.get(index).ok_or(EditorError::IndexOutOfRange {
            index,
            len: self.layout.len(),
        })
    }

    /// Adds the payloads of a new layout entry to the value, builds its block
    /// and inserts it at `index`. A key already in use leaves the value as it
    /// was.
    fn insert_entry(
        &mut self,
        index: usize,
        entry: LayoutEntry,
        content: ElementData,
        settings: Option<ElementData>,
    ) -> EditorResult<usize> {
        let content_key = entry.content_key.clone();
        let settings_key = entry.settings_key.clone();
        let settings_taken = settings_key
            .as_ref()
            .is_some_and(|key| self.value.settings(key).is_some());
        if self.layout.position(&content_key).is_some()
            || self.value.content(&content_key).is_some()
            || settings_taken
        {
            return Err(EditorError::DuplicateBlock(content_key));
        }

        self.value.push_content(content);
        if let Some(settings) = settings {
            self.value.push_settings(settings);
        }
        let ctx = BlockContext {
            registry: &self.registry,
            scaffolds: &self.scaffolds,
            supports_copy: self.clipboard.is_supported(),
        };
        let block = match BlockObject::build(entry, &mut self.value, &ctx) {
            Some(block) => block,
            None => {
                self.value.remove_content(&content_key);
                if let Some(settings_key) = &settings_key {
                    self.value.remove_settings(settings_key);
                }
                return Err(EditorError::BlockNotFound(content_key));
            }
        };

        if !self.layout.insert(index, block) {
            self.value.remove_content(&content_key);
            if let Some(settings_key) = &settings_key {
                self.value.remove_settings(settings_key);
            }
            return Err(EditorError::DuplicateBlock(content_key));
        }

        let position = self
            .layout
            .position(&content_key)
            .ok_or_else(|| EditorError::BlockNotFound(content_key.clone()))?;
        self.subscribe_block(position);
        self.set_focus(position);
        self.sync()?;
        Ok(position)
    }

    fn delete_block(&mut self, content_key: &Udi) -> EditorResult<()> {
        let index = self
            .layout
            .position(content_key)
            .ok_or_else(|| EditorError::BlockNotFound(content_key.clone()))?;

        if self
            .active_edit
            .as_ref()
            .is_some_and(|edit| &edit.content_key == content_key)
        {
            if let Some(edit) = self.active_edit.take() {
                edit.session.discard(&mut self.value);
            }
            self.host.close();
        }

        let block = self
            .layout
            .remove_at(index)
            .ok_or_else(|| EditorError::BlockNotFound(content_key.clone()))?;
        self.release_block(&block);
        self.value.remove_content(block.content_key());
        if let Some(settings_key) = block.settings_key() {
            self.value.remove_settings(settings_key);
        }
        self.sync()?;

        debug!(content_udi = %content_key, index, "Deleted block");
        Ok(())
    }

    /// Creates a block of `element_type_key` at `index` and starts its
    /// creation flow. Returns the index the block landed at.
    pub fn create(&mut self, index: usize, element_type_key: Uuid) -> EditorResult<usize> {
        self.ensure_writable()?;
        let config = self
            .registry
            .get(&element_type_key)
            .ok_or(EditorError::ElementTypeNotAllowed(element_type_key))?
            .config
            .clone();

        let content = self.scaffolds.scaffold(&element_type_key)?;
        let settings = config
            .settings_element_type_key
            .and_then(|key| self.scaffolds.scaffold(&key).ok());
        let entry = LayoutEntry::new(content.udi.clone(), settings.as_ref().map(|s| s.udi.clone()));

        let position = self.insert_entry(index, entry, content, settings)?;
        debug!(element_type = %element_type_key, index = position, "Created block");

        let block = self.block_at(position)?;
        let content_key = block.content_key().clone();
        let hide_content = block.hide_content_in_overlay();
        if self.registry.inline_editing() {
            if let Some(block) = self.layout.get_mut(position) {
                block.active = true;
            }
        } else if !hide_content {
            self.open_edit(content_key.clone(), false, true)?;
        }
        // Opening the overlay closes an earlier create flow, which can shift this block
        self.layout
            .position(&content_key)
            .ok_or(EditorError::BlockNotFound(content_key))
    }

    /// Opens the edit overlay for the block at `index`. Returns `false` when
    /// the request does not apply: content is hidden in the overlay, or the
    /// block has no settings.
    pub fn edit(&mut self, index: usize, open_settings: bool) -> EditorResult<bool> {
        let block = self.block_at(index)?;
        if block.is_unsupported() {
            return Err(EditorError::UnsupportedBlock(block.content_key().clone()));
        }
        if !open_settings && block.hide_content_in_overlay() {
            return Ok(false);
        }
        if open_settings && !block.show_settings() {
            return Ok(false);
        }
        let content_key = block.content_key().clone();
        self.open_edit(content_key, open_settings, false)
    }

    fn open_edit(&mut self, content_key: Udi, open_settings: bool, create_flow: bool) -> EditorResult<bool> {
        if self.active_edit.is_some() {
            self.close()?;
        }

        let index = self
            .layout
            .position(&content_key)
            .ok_or_else(|| EditorError::BlockNotFound(content_key.clone()))?;
        let live_editing = self.config.use_live_editing;
        let block = self.block_at(index)?;
        let session = open_session(EditMode::from_live_editing(live_editing), block, &self.value)?;
        let model = BlockEditorModel {
            content_key: content_key.clone(),
            title: block.label().to_string(),
            open_settings,
            create_flow,
            live_editing,
            hide_content: block.hide_content_in_overlay(),
            hide_submit_button: self.options.read_only,
            size: block.editor_size(),
        };

        let mut deactivate_on_close = false;
        if let Some(block) = self.layout.get_mut(index) {
            deactivate_on_close = !block.active;
            block.active = true;
        }
        self.active_edit = Some(ActiveEdit {
            content_key,
            session,
            create_flow,
            open_settings,
            deactivate_on_close,
        });
        self.host.open(&model);

        debug!(index, open_settings, create_flow, live_editing, "Opened block editor");
        Ok(true)
    }

    /// Writes a property value through the open edit.
    pub fn set_value(&mut self, target: EditTarget, alias: &str, value: Value) -> EditorResult<()> {
        self.ensure_writable()?;
        let edit = self.active_edit.as_mut().ok_or(EditorError::NoActiveEdit)?;
        edit.session.set_value(&mut self.value, target, alias, value)?;

        if edit.session.mode() == EditMode::Live {
            let key = edit.content_key.clone();
            self.refresh_label(&key);
        }
        Ok(())
    }

    /// Reads a property value as the open edit sees it.
    pub fn read_value(&self, target: EditTarget, alias: &str) -> EditorResult<Option<Value>> {
        let edit = self.active_edit.as_ref().ok_or(EditorError::NoActiveEdit)?;
        Ok(edit.session.payload(&self.value, target)?.value(alias).cloned())
    }

    fn refresh_label(&mut self, content_key: &Udi) {
        if let Some(index) = self.layout.position(content_key) {
            let value = &self.value;
            if let Some(block) = self.layout.get_mut(index) {
                block.refresh_label(value);
            }
        }
    }

    /// Confirms the open edit.
    pub fn submit(&mut self) -> EditorResult<()> {
        self.ensure_writable()?;
        let ActiveEdit {
            content_key,
            session,
            deactivate_on_close,
            ..
        } = self.active_edit.take().ok_or(EditorError::NoActiveEdit)?;
        session.commit(&mut self.value)?;

        if deactivate_on_close {
            if let Some(index) = self.layout.position(&content_key) {
                if let Some(block) = self.layout.get_mut(index) {
                    block.active = false;
                }
            }
        }
        self.refresh_label(&content_key);
        self.host.close();

        debug!(content_udi = %content_key, "Submitted block edit");
        Ok(())
    }

    /// Closes the open edit without confirming. A block still in its
    /// creation flow is removed.
    pub fn close(&mut self) -> EditorResult<()> {
        let ActiveEdit {
            content_key,
            session,
            create_flow,
            deactivate_on_close,
            ..
        } = self.active_edit.take().ok_or(EditorError::NoActiveEdit)?;
        session.discard(&mut self.value);

        if create_flow {
            self.delete_block(&content_key)?;
        } else {
            if let Some(index) = self.layout.position(&content_key) {
                if let Some(block) = self.layout.get_mut(index) {
                    if deactivate_on_close {
                        block.active = false;
                    }
                }
            }
            self.refresh_label(&content_key);
        }
        self.host.close();

        debug!(content_udi = %content_key, create_flow, "Closed block editor");
        Ok(())
    }

    /// Expands an inline block.
    pub fn activate(&mut self, index: usize) -> EditorResult<()> {
        self.block_at(index)?;
        if let Some(block) = self.layout.get_mut(index) {
            block.active = true;
        }
        Ok(())
    }

    pub fn collapse(&mut self, index: usize) -> EditorResult<()> {
        self.block_at(index)?;
        if self
            .active_edit
            .as_ref()
            .is_some_and(|edit| self.layout.position(&edit.content_key) == Some(index))
        {
            return Err(EditorError::EditInProgress);
        }
        if let Some(block) = self.layout.get_mut(index) {
            block.active = false;
        }
        Ok(())
    }

    pub fn set_focus(&mut self, index: usize) {
        for block in self.layout.iter_mut() {
            block.focus = block.index == index;
        }
    }

    /// Asks the host to confirm, then deletes. Returns whether the block was
    /// deleted.
    pub fn request_delete(&mut self, index: usize) -> EditorResult<bool> {
        self.ensure_writable()?;
        let block = self.block_at(index)?;
        let prompt = DeletePrompt::block(block.label());
        let content_key = block.content_key().clone();

        if !self.host.confirm_delete(&prompt) {
            return Ok(false);
        }
        self.delete_block(&content_key)?;
        Ok(true)
    }

    /// Deletes every block after a single confirmation.
    pub fn request_delete_all(&mut self) -> EditorResult<bool> {
        self.ensure_writable()?;
        if self.layout.is_empty() {
            return Ok(false);
        }
        let labels = self.layout.iter().map(|b| b.label().to_string()).collect();
        let prompt = DeletePrompt::all(labels, self.options.property_label.clone());
        if !self.host.confirm_delete(&prompt) {
            return Ok(false);
        }

        while let Some(block) = self.layout.get(0) {
            let content_key = block.content_key().clone();
            self.delete_block(&content_key)?;
        }
        Ok(true)
    }

    pub fn copy(&self, index: usize) -> EditorResult<ClipboardEntry> {
        let block = self.block_at(index)?;
        self.clipboard.copy(block, &self.value)
    }

    pub fn copy_all(&self) -> EditorResult<Option<ClipboardEntry>> {
        let label = match &self.options.document_name {
            Some(document) => format!("{} from {}", self.options.property_label, document),
            None => self.options.property_label.clone(),
        };
        self.clipboard.copy_all(
            self.layout.iter(),
            &self.value,
            label,
            None,
            self.options.source_id.clone(),
        )
    }

    /// Clipboard entries this editor can paste, newest first.
    pub fn clipboard_entries(&self) -> Vec<ClipboardEntry> {
        self.clipboard.retrieve_compatible(&self.allowed_aliases())
    }

    pub fn clear_clipboard(&self) {
        self.clipboard.clear_compatible(&self.allowed_aliases());
    }

    /// Pastes `entry` at `index`, returning how many blocks were inserted.
    ///
    /// Array entries insert their items in order; an item that cannot be
    /// pasted is skipped and does not advance the insert position.
    #[instrument(skip(self, entry), fields(label = %entry.label))]
    pub fn paste_at_index(&mut self, index: usize, entry: &ClipboardEntry) -> EditorResult<usize> {
        self.ensure_writable()?;
        if !entry.is_compatible(&self.allowed_aliases()) {
            return Err(EditorError::IncompatiblePaste(entry.content_type_aliases.clone()));
        }

        let batch = entry.is_array();
        let index = index.min(self.layout.len());
        let mut inserted = 0;
        for source in entry.sources() {
            let result = ClipboardCodec::rekey(source, &self.registry, &self.scaffolds)
                .and_then(|pasted| self.insert_pasted(index + inserted, pasted));
            match result {
                Ok(_) => inserted += 1,
                Err(err) if batch => {
                    warn!(error = %err, "Skipping clipboard item that cannot be pasted");
                }
                Err(err) => return Err(err),
            }
        }

        debug!(index, inserted, "Pasted from clipboard");
        Ok(inserted)
    }

    fn insert_pasted(&mut self, index: usize, pasted: PastedBlock) -> EditorResult<usize> {
        let PastedBlock {
            layout,
            content,
            settings,
        } = pasted;
        self.insert_entry(index, layout, content, settings)
    }

    /// Reorders blocks. Rejected while any block is active.
    pub fn move_block(&mut self, from: usize, to: usize) -> EditorResult<()> {
        self.ensure_writable()?;
        if self.active_edit.is_some() || self.layout.iter().any(|b| b.is_active()) {
            return Err(EditorError::EditInProgress);
        }
        if !self.layout.move_to(from, to) {
            return Err(EditorError::IndexOutOfRange {
                index: from.max(to),
                len: self.layout.len(),
            });
        }
        self.sync()?;
        debug!(from, to, "Moved block");
        Ok(())
    }

    /// Replaces the value with one from the server and rebuilds every block.
    pub fn reload(&mut self, value: PropertyValue) -> EditorResult<()> {
        if self.active_edit.take().is_some() {
            self.host.close();
        }
        self.subscriptions.clear();
        self.layout.clear();
        self.rebuild(value)
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.options.read_only = read_only;
    }

    pub fn is_read_only(&self) -> bool {
        self.options.read_only
    }

    pub fn copy_all_enabled(&self) -> bool {
        self.clipboard.is_supported() && !self.layout.is_empty()
    }

    pub fn delete_all_enabled(&self) -> bool {
        !self.layout.is_empty() && !self.options.read_only
    }

    pub fn allowed_aliases(&self) -> Vec<String> {
        self.registry.allowed_aliases(&self.scaffolds)
    }

    pub fn available_blocks(&self) -> Vec<AvailableBlock> {
        self.registry.available_blocks(&self.scaffolds)
    }

    pub fn validation_paths(&self, index: usize) -> EditorResult<BlockValidationPaths> {
        Ok(self.resolver.path_for(self.block_at(index)?))
    }

    /// Property path handed to a block editor nested in `alias` of a block.
    pub fn nested_property_path(&self, index: usize, alias: &str) -> EditorResult<ValidationPath> {
        Ok(self.resolver.nested_property_path(self.block_at(index)?, alias))
    }

    pub fn has_error(&self, index: usize) -> bool {
        self.layout.get(index).is_some_and(|b| b.has_error())
    }

    pub fn any_block_has_error(&self) -> bool {
        self.layout.iter().any(|b| b.has_error())
    }

    /// Whether a block outside `visible` has an error.
    pub fn has_error_outside(&self, visible: Range<usize>) -> bool {
        self.layout
            .iter()
            .any(|b| !visible.contains(&b.index()) && b.has_error())
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn is_editing(&self) -> bool {
        self.active_edit.is_some()
    }

    pub fn editing_index(&self) -> Option<usize> {
        self.active_edit
            .as_ref()
            .and_then(|edit| self.layout.position(&edit.content_key))
    }

    pub fn editing_settings(&self) -> bool {
        self.active_edit.as_ref().is_some_and(|edit| edit.open_settings)
    }

    pub fn block(&self, index: usize) -> Option<&BlockObject> {
        self.layout.get(index)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BlockObject> {
        self.layout.iter()
    }

    pub fn len(&self) -> usize {
        self.layout.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    pub fn layout(&self) -> &BlockLayoutModel {
        &self.layout
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    pub fn to_json(&self) -> EditorResult<Value> {
        Ok(self.value.to_json()?)
    }

    pub fn registry(&self) -> &BlockConfigurationRegistry {
        &self.registry
    }

    pub fn scaffolds(&self) -> &ScaffoldProvider {
        &self.scaffolds
    }

    pub fn validation(&self) -> &Arc<ValidationRegistry> {
        &self.validation
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;
    use crate::scaffold::ScaffoldProvider;
    use blocklist_common::{BlockConfiguration, ElementType, PropertyGroup, PropertyType};
    use serde_json::json;

    fn text_type() -> ElementType {
        ElementType {
            key: Uuid::new_v4(),
            alias: "text".to_string(),
            name: "Text".to_string(),
            icon: None,
            groups: vec![PropertyGroup {
                name: "Content".to_string(),
                properties: vec![PropertyType {
                    alias: "body".to_string(),
                    label: "Body".to_string(),
                    editor_alias: "Umbraco.TextBox".to_string(),
                }],
            }],
        }
    }

    fn editor_with_text(text: &ElementType, body: &str) -> BlockEditorController<HeadlessHost> {
        let mut content = ElementData::new(text.key, Udi::new_element());
        content.set_value("body", json!(body));
        let mut value = PropertyValue::new();
        value
            .set_layout_entries(DEFAULT_EDITOR_ALIAS, &[LayoutEntry::new(content.udi.clone(), None)])
            .unwrap();
        value.push_content(content);

        let config = BlockListConfig {
            blocks: vec![BlockConfiguration::new(text.key)],
            ..BlockListConfig::default()
        };
        BlockEditorController::new(
            value,
            config,
            ScaffoldProvider::from_types([text.clone()]),
            EditorServices::default(),
            HeadlessHost::default(),
            EditorOptions::new("blocks"),
        )
        .unwrap()
    }

    #[test]
    fn test_insert_existing_key_leaves_value_intact() {
        let text = text_type();
        let mut editor = editor_with_text(&text, "First");
        let key = editor.block(0).unwrap().content_key().clone();

        let mut copy = ElementData::new(text.key, key.clone());
        copy.set_value("body", json!("Second"));
        let result = editor.insert_entry(1, LayoutEntry::new(key.clone(), None), copy, None);

        assert!(matches!(result, Err(EditorError::DuplicateBlock(ref k)) if k == &key));
        assert_eq!(editor.len(), 1);
        assert_eq!(editor.value().content_data().len(), 1);
        assert_eq!(
            editor.value().content(&key).unwrap().value("body"),
            Some(&json!("First"))
        );
        assert_eq!(editor.validation().subscriber_count(), 1);
    }
}
