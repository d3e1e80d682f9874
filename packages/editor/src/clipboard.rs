//! # Clipboard
//!
//! Copied blocks are stored as self-contained snapshots in a clipboard store
//! shared by every editor in the process. Entries are tagged with the content
//! type aliases they contain so an editor only offers what it can accept.
//!
//! Pasting never reuses a snapshot's identities: every payload, including
//! payloads of block values nested inside property values, gets a new UDI.

use crate::{BlockConfigurationRegistry, BlockObject, EditorError, EditorResult, ScaffoldProvider};
use blocklist_common::{ElementData, LayoutEntry, PropertyValue, Rekeyer, Udi};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_CLIPBOARD_CAPACITY: usize = 50;
pub const COPY_ALL_ICON: &str = "icon-thumbnail-list";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClipboardEntryType {
    /// Raw element payloads, pasted onto fresh scaffolds
    ElementType,
    /// Complete blocks with layout and settings
    Block,
}

/// One copied block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSnapshot {
    pub layout: LayoutEntry,
    pub data: ElementData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_data: Option<ElementData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClipboardData {
    Block(BlockSnapshot),
    Blocks(Vec<BlockSnapshot>),
    Element(ElementData),
    Elements(Vec<ElementData>),
}

/// A single paste source extracted from a clipboard entry
#[derive(Debug, Clone, PartialEq)]
pub enum PasteSource {
    Element(ElementData),
    Block(BlockSnapshot),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardEntry {
    #[serde(rename = "type")]
    pub entry_type: ClipboardEntryType,
    #[serde(rename = "aliases")]
    pub content_type_aliases: Vec<String>,
    pub data: ClipboardData,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub date: DateTime<Utc>,
    /// Source identity; copying again from the same source replaces the entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<String>,
}

impl ClipboardEntry {
    pub fn new(
        entry_type: ClipboardEntryType,
        content_type_aliases: Vec<String>,
        data: ClipboardData,
        label: impl Into<String>,
        icon: Option<String>,
        unique: Option<String>,
    ) -> Self {
        Self {
            entry_type,
            content_type_aliases,
            data,
            label: label.into(),
            icon,
            date: Utc::now(),
            unique,
        }
    }

    /// Whether any alias of this entry is allowed.
    pub fn is_compatible(&self, allowed: &[String]) -> bool {
        self.content_type_aliases.iter().any(|alias| allowed.contains(alias))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.data, ClipboardData::Blocks(_) | ClipboardData::Elements(_))
    }

    /// Paste sources in their copied order.
    pub fn sources(&self) -> Vec<PasteSource> {
        match &self.data {
            ClipboardData::Block(block) => vec![PasteSource::Block(block.clone())],
            ClipboardData::Blocks(blocks) => blocks.iter().cloned().map(PasteSource::Block).collect(),
            ClipboardData::Element(element) => vec![PasteSource::Element(element.clone())],
            ClipboardData::Elements(elements) => {
                elements.iter().cloned().map(PasteSource::Element).collect()
            }
        }
    }
}

/// Process-wide clipboard storage
pub trait ClipboardStore: Debug + Send + Sync {
    fn is_supported(&self) -> bool {
        true
    }

    fn copy(&self, entry: ClipboardEntry) -> EditorResult<()>;

    /// Entries of `entry_type` compatible with `aliases`, newest first.
    fn retrieve_entries_of_type(
        &self,
        entry_type: ClipboardEntryType,
        aliases: &[String],
    ) -> Vec<ClipboardEntry>;

    fn clear_entries_of_type(&self, entry_type: ClipboardEntryType, aliases: &[String]);
}

#[derive(Debug)]
struct StoredEntry {
    entry_type: ClipboardEntryType,
    unique: Option<String>,
    json: String,
}

/// Clipboard kept in memory as serialized entries
#[derive(Debug)]
pub struct InMemoryClipboard {
    entries: Mutex<Vec<StoredEntry>>,
    capacity: usize,
}

impl Default for InMemoryClipboard {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CLIPBOARD_CAPACITY)
    }
}

impl InMemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn decode(stored: &StoredEntry) -> Option<ClipboardEntry> {
        match serde_json::from_str(&stored.json) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "Skipping unreadable clipboard entry");
                None
            }
        }
    }
}

impl ClipboardStore for InMemoryClipboard {
    fn copy(&self, entry: ClipboardEntry) -> EditorResult<()> {
        let json = serde_json::to_string(&entry).map_err(blocklist_common::ModelError::from)?;
        let mut entries = self.entries.lock();
        if let Some(unique) = &entry.unique {
            entries.retain(|e| e.unique.as_ref() != Some(unique));
        }
        entries.insert(
            0,
            StoredEntry {
                entry_type: entry.entry_type,
                unique: entry.unique.clone(),
                json,
            },
        );
        entries.truncate(self.capacity);
        debug!(label = %entry.label, count = entries.len(), "Copied to clipboard");
        Ok(())
    }

    fn retrieve_entries_of_type(
        &self,
        entry_type: ClipboardEntryType,
        aliases: &[String],
    ) -> Vec<ClipboardEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|stored| stored.entry_type == entry_type)
            .filter_map(Self::decode)
            .filter(|entry| entry.is_compatible(aliases))
            .collect()
    }

    fn clear_entries_of_type(&self, entry_type: ClipboardEntryType, aliases: &[String]) {
        self.entries.lock().retain(|stored| {
            if stored.entry_type != entry_type {
                return true;
            }
            match Self::decode(stored) {
                Some(entry) => !entry.is_compatible(aliases),
                None => false,
            }
        });
    }
}

/// Store for hosts without clipboard support
#[derive(Debug, Default)]
pub struct UnsupportedClipboard;

impl ClipboardStore for UnsupportedClipboard {
    fn is_supported(&self) -> bool {
        false
    }

    fn copy(&self, _entry: ClipboardEntry) -> EditorResult<()> {
        Err(EditorError::ClipboardUnsupported)
    }

    fn retrieve_entries_of_type(&self, _: ClipboardEntryType, _: &[String]) -> Vec<ClipboardEntry> {
        Vec::new()
    }

    fn clear_entries_of_type(&self, _: ClipboardEntryType, _: &[String]) {}
}

/// A paste source with fresh identities, ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct PastedBlock {
    pub layout: LayoutEntry,
    pub content: ElementData,
    pub settings: Option<ElementData>,
}

/// Converts blocks to clipboard entries and back
#[derive(Debug, Clone)]
pub struct ClipboardCodec {
    store: Arc<dyn ClipboardStore>,
}

impl ClipboardCodec {
    pub fn new(store: Arc<dyn ClipboardStore>) -> Self {
        Self { store }
    }

    pub fn is_supported(&self) -> bool {
        self.store.is_supported()
    }

    pub fn store(&self) -> &Arc<dyn ClipboardStore> {
        &self.store
    }

    fn snapshot(block: &BlockObject, value: &PropertyValue) -> EditorResult<BlockSnapshot> {
        let data = block
            .content(value)
            .cloned()
            .ok_or_else(|| EditorError::BlockNotFound(block.content_key().clone()))?;
        Ok(BlockSnapshot {
            layout: block.layout().clone(),
            data,
            settings_data: block.settings(value).cloned(),
        })
    }

    /// Copies one block.
    pub fn copy(&self, block: &BlockObject, value: &PropertyValue) -> EditorResult<ClipboardEntry> {
        if !self.is_supported() {
            return Err(EditorError::ClipboardUnsupported);
        }
        let alias = block
            .content_type_alias()
            .ok_or_else(|| EditorError::UnsupportedBlock(block.content_key().clone()))?;

        let entry = ClipboardEntry::new(
            ClipboardEntryType::Block,
            vec![alias.to_string()],
            ClipboardData::Block(Self::snapshot(block, value)?),
            block.label(),
            block.icon().map(str::to_string),
            Some(block.content_key().to_string()),
        );
        self.store.copy(entry.clone())?;
        Ok(entry)
    }

    /// Copies every supported block in order as one entry. Returns `None`
    /// when there is nothing to copy.
    pub fn copy_all<'a>(
        &self,
        blocks: impl IntoIterator<Item = &'a BlockObject>,
        value: &PropertyValue,
        label: impl Into<String>,
        icon: Option<String>,
        source_id: Option<String>,
    ) -> EditorResult<Option<ClipboardEntry>> {
        if !self.is_supported() {
            return Err(EditorError::ClipboardUnsupported);
        }

        let mut aliases: Vec<String> = Vec::new();
        let mut snapshots = Vec::new();
        for block in blocks {
            let Some(alias) = block.content_type_alias() else {
                continue;
            };
            if !aliases.iter().any(|a| a == alias) {
                aliases.push(alias.to_string());
            }
            snapshots.push(Self::snapshot(block, value)?);
        }
        if snapshots.is_empty() {
            return Ok(None);
        }

        let entry = ClipboardEntry::new(
            ClipboardEntryType::Block,
            aliases,
            ClipboardData::Blocks(snapshots),
            label,
            icon.or_else(|| Some(COPY_ALL_ICON.to_string())),
            source_id,
        );
        self.store.copy(entry.clone())?;
        Ok(Some(entry))
    }

    /// Element and block entries pasteable into an editor allowing
    /// `allowed_aliases`, newest first.
    pub fn retrieve_compatible(&self, allowed_aliases: &[String]) -> Vec<ClipboardEntry> {
        let mut entries = self
            .store
            .retrieve_entries_of_type(ClipboardEntryType::ElementType, allowed_aliases);
        entries.extend(
            self.store
                .retrieve_entries_of_type(ClipboardEntryType::Block, allowed_aliases),
        );
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        entries
    }

    pub fn clear_compatible(&self, allowed_aliases: &[String]) {
        self.store
            .clear_entries_of_type(ClipboardEntryType::ElementType, allowed_aliases);
        self.store
            .clear_entries_of_type(ClipboardEntryType::Block, allowed_aliases);
    }

    /// Builds a block with fresh identities from a paste source.
    ///
    /// Element sources are merged onto a new scaffold, keeping only values
    /// that carry content. Block sources carry every value over. Settings are
    /// taken from the snapshot when its type still matches the configuration,
    /// otherwise scaffolded.
    pub fn rekey(
        source: PasteSource,
        registry: &BlockConfigurationRegistry,
        scaffolds: &ScaffoldProvider,
    ) -> EditorResult<PastedBlock> {
        let (content_type_key, mut values, snapshot_settings, extra) = match source {
            PasteSource::Element(data) => (data.content_type_key, data.values().clone(), None, None),
            PasteSource::Block(snapshot) => (
                snapshot.data.content_type_key,
                snapshot.data.values().clone(),
                snapshot.settings_data,
                Some(snapshot.layout.extra),
            ),
        };

        let config = registry
            .get(&content_type_key)
            .ok_or(EditorError::ElementTypeNotAllowed(content_type_key))?
            .config
            .clone();

        let mut rekeyer = Rekeyer::new();
        rekeyer.rekey_values(&mut values);

        let mut content = scaffolds.scaffold(&content_type_key)?;
        if extra.is_some() {
            content = content.with_values(values);
        } else {
            content.merge_present_values_from(&values);
        }

        let settings = match config.settings_element_type_key {
            Some(settings_type_key) => match snapshot_settings {
                Some(settings) if settings.content_type_key == settings_type_key => {
                    let mut settings_values = settings.values().clone();
                    rekeyer.rekey_values(&mut settings_values);
                    Some(ElementData::new(settings_type_key, Udi::new_element()).with_values(settings_values))
                }
                _ => Some(scaffolds.scaffold(&settings_type_key)?),
            },
            None => None,
        };

        let mut layout = LayoutEntry::new(
            content.udi.clone(),
            settings.as_ref().map(|s| s.udi.clone()),
        );
        if let Some(extra) = extra {
            layout.extra = extra;
        }

        debug!(
            content_udi = %layout.content_key,
            nested = rekeyer.replaced_count(),
            "Re-keyed paste source"
        );
        Ok(PastedBlock {
            layout,
            content,
            settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocklist_common::{BlockConfiguration, ElementType};
    use serde_json::json;
    use uuid::Uuid;

    fn element_type(alias: &str) -> ElementType {
        ElementType {
            key: Uuid::new_v4(),
            alias: alias.to_string(),
            name: alias.to_string(),
            icon: None,
            groups: vec![],
        }
    }

    fn element_entry(alias: &str, label: &str, unique: Option<&str>) -> ClipboardEntry {
        ClipboardEntry::new(
            ClipboardEntryType::ElementType,
            vec![alias.to_string()],
            ClipboardData::Element(ElementData::new(Uuid::new_v4(), Udi::new_element())),
            label,
            None,
            unique.map(str::to_string),
        )
    }

    #[test]
    fn test_store_is_newest_first_and_filters_aliases() {
        let store = InMemoryClipboard::new();
        store.copy(element_entry("banner", "first", None)).unwrap();
        store.copy(element_entry("quote", "second", None)).unwrap();
        store.copy(element_entry("banner", "third", None)).unwrap();

        let labels: Vec<String> = store
            .retrieve_entries_of_type(ClipboardEntryType::ElementType, &["banner".to_string()])
            .into_iter()
            .map(|e| e.label)
            .collect();
        assert_eq!(labels, vec!["third", "first"]);
        assert!(store
            .retrieve_entries_of_type(ClipboardEntryType::Block, &["banner".to_string()])
            .is_empty());
    }

    #[test]
    fn test_same_source_replaces_entry() {
        let store = InMemoryClipboard::new();
        store.copy(element_entry("banner", "old", Some("source"))).unwrap();
        store.copy(element_entry("banner", "new", Some("source"))).unwrap();

        let entries =
            store.retrieve_entries_of_type(ClipboardEntryType::ElementType, &["banner".to_string()]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "new");
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let store = InMemoryClipboard::with_capacity(2);
        for label in ["a", "b", "c"] {
            store.copy(element_entry("banner", label, None)).unwrap();
        }
        let labels: Vec<String> = store
            .retrieve_entries_of_type(ClipboardEntryType::ElementType, &["banner".to_string()])
            .into_iter()
            .map(|e| e.label)
            .collect();
        assert_eq!(labels, vec!["c", "b"]);
    }

    #[test]
    fn test_clear_only_touches_compatible_entries() {
        let store = InMemoryClipboard::new();
        store.copy(element_entry("banner", "a", None)).unwrap();
        store.copy(element_entry("quote", "b", None)).unwrap();

        store.clear_entries_of_type(ClipboardEntryType::ElementType, &["banner".to_string()]);
        assert_eq!(store.len(), 1);
        assert_eq!(
            store
                .retrieve_entries_of_type(ClipboardEntryType::ElementType, &["quote".to_string()])
                .len(),
            1
        );
    }

    #[test]
    fn test_entry_serialization_shape() {
        let content = ElementData::new(Uuid::new_v4(), Udi::new_element());
        let entry = ClipboardEntry::new(
            ClipboardEntryType::Block,
            vec!["banner".to_string()],
            ClipboardData::Block(BlockSnapshot {
                layout: LayoutEntry::new(content.udi.clone(), None),
                data: content,
                settings_data: None,
            }),
            "Banner",
            None,
            None,
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "block");
        assert_eq!(json["aliases"], json!(["banner"]));
        assert!(json["data"]["layout"]["contentUdi"].is_string());

        let back: ClipboardEntry = serde_json::from_value(json).unwrap();
        assert!(matches!(back.data, ClipboardData::Block(_)));
    }

    #[test]
    fn test_rekey_block_keeps_values_and_replaces_identity() {
        let banner = element_type("banner");
        let settings_type = element_type("bannerSettings");
        let registry = BlockConfigurationRegistry::new(
            [BlockConfiguration::new(banner.key).with_settings(settings_type.key)],
            false,
        );
        let scaffolds = ScaffoldProvider::from_types([banner.clone(), settings_type.clone()]);

        let mut content = banner.scaffold(Udi::new_element());
        content.set_value("title", json!("Hello"));
        let mut settings = settings_type.scaffold(Udi::new_element());
        settings.set_value("theme", json!("dark"));
        let snapshot = BlockSnapshot {
            layout: LayoutEntry::new(content.udi.clone(), Some(settings.udi.clone())),
            data: content.clone(),
            settings_data: Some(settings.clone()),
        };

        let pasted =
            ClipboardCodec::rekey(PasteSource::Block(snapshot), &registry, &scaffolds).unwrap();
        assert_ne!(pasted.content.udi, content.udi);
        assert_eq!(pasted.content.value("title"), Some(&json!("Hello")));
        let pasted_settings = pasted.settings.unwrap();
        assert_ne!(pasted_settings.udi, settings.udi);
        assert_eq!(pasted_settings.value("theme"), Some(&json!("dark")));
        assert_eq!(pasted.layout.settings_key, Some(pasted_settings.udi));
    }

    #[test]
    fn test_rekey_element_merges_present_values() {
        let banner = element_type("banner");
        let registry = BlockConfigurationRegistry::new([BlockConfiguration::new(banner.key)], false);
        let scaffolds = ScaffoldProvider::from_types([banner.clone()]);

        let mut source = banner.scaffold(Udi::new_element());
        source.set_value("title", json!("Hello"));
        source.set_value("subtitle", json!(""));

        let pasted =
            ClipboardCodec::rekey(PasteSource::Element(source.clone()), &registry, &scaffolds).unwrap();
        assert_ne!(pasted.content.udi, source.udi);
        assert_eq!(pasted.content.value("title"), Some(&json!("Hello")));
        assert_eq!(pasted.content.value("subtitle"), None);
        assert!(pasted.settings.is_none());
    }

    #[test]
    fn test_rekey_rejects_unknown_type() {
        let registry = BlockConfigurationRegistry::new(Vec::new(), false);
        let scaffolds = ScaffoldProvider::default();
        let source = ElementData::new(Uuid::new_v4(), Udi::new_element());
        assert!(matches!(
            ClipboardCodec::rekey(PasteSource::Element(source), &registry, &scaffolds),
            Err(EditorError::ElementTypeNotAllowed(_))
        ));
    }

    #[test]
    fn test_unsupported_clipboard() {
        let codec = ClipboardCodec::new(Arc::new(UnsupportedClipboard));
        assert!(!codec.is_supported());
        assert!(codec.retrieve_compatible(&["banner".to_string()]).is_empty());
    }
}
