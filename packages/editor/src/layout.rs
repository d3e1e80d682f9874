//! # Block Layout Model
//!
//! The ordered list of blocks for one editor. Each [`BlockObject`] owns its
//! layout entry, so the persisted order and the rendered order are the same
//! vector and cannot drift apart. All mutation goes through
//! [`BlockLayoutModel::insert`], [`BlockLayoutModel::remove_at`] and
//! [`BlockLayoutModel::move_to`].

use crate::BlockObject;
use blocklist_common::{LayoutEntry, ModelResult, PropertyValue, Udi};
use std::collections::HashSet;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct BlockLayoutModel {
    blocks: Vec<BlockObject>,
}

impl BlockLayoutModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the layout entries of `editor_alias`, dropping entries whose
    /// content payload is missing and entries repeating an earlier identity.
    pub fn load(value: &PropertyValue, editor_alias: &str) -> ModelResult<Vec<LayoutEntry>> {
        let mut seen = HashSet::new();
        let entries = value
            .layout_entries(editor_alias)?
            .into_iter()
            .filter(|entry| {
                if value.content(&entry.content_key).is_none() {
                    warn!(content_udi = %entry.content_key, "Dropping layout entry with missing content");
                    return false;
                }
                if !seen.insert(entry.content_key.clone()) {
                    warn!(content_udi = %entry.content_key, "Dropping duplicate layout entry");
                    return false;
                }
                true
            })
            .collect();
        Ok(entries)
    }

    /// Writes the current order back into `value` under `editor_alias`.
    pub fn save(&self, value: &mut PropertyValue, editor_alias: &str) -> ModelResult<()> {
        value.set_layout_entries(editor_alias, &self.entries())
    }

    /// Inserts `block` at `index`, clamped to the end of the list.
    ///
    /// Returns `false` and leaves the model untouched when a block with the
    /// same content key is already present.
    pub fn insert(&mut self, index: usize, block: BlockObject) -> bool {
        if self.position(block.content_key()).is_some() {
            warn!(content_udi = %block.content_key(), "Refusing to insert duplicate block identity");
            return false;
        }
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, block);
        self.reindex();
        true
    }

    pub fn remove_at(&mut self, index: usize) -> Option<BlockObject> {
        if index >= self.blocks.len() {
            return None;
        }
        let block = self.blocks.remove(index);
        self.reindex();
        Some(block)
    }

    /// Moves the block at `from` so it ends up at `to`.
    pub fn move_to(&mut self, from: usize, to: usize) -> bool {
        let len = self.blocks.len();
        if from >= len || to >= len {
            return false;
        }
        if from != to {
            let block = self.blocks.remove(from);
            self.blocks.insert(to, block);
            self.reindex();
        }
        true
    }

    pub(crate) fn clear(&mut self) -> Vec<BlockObject> {
        std::mem::take(&mut self.blocks)
    }

    pub fn entries(&self) -> Vec<LayoutEntry> {
        self.blocks.iter().map(|b| b.layout().clone()).collect()
    }

    pub fn position(&self, content_key: &Udi) -> Option<usize> {
        self.blocks.iter().position(|b| b.content_key() == content_key)
    }

    pub fn get(&self, index: usize) -> Option<&BlockObject> {
        self.blocks.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut BlockObject> {
        self.blocks.get_mut(index)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut BlockObject> {
        self.blocks.iter_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockObject> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn reindex(&mut self) {
        for (index, block) in self.blocks.iter_mut().enumerate() {
            block.index = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockContext;
    use crate::{BlockConfigurationRegistry, ScaffoldProvider};
    use blocklist_common::{BlockConfiguration, ElementType};
    use uuid::Uuid;

    struct Fixture {
        registry: BlockConfigurationRegistry,
        scaffolds: ScaffoldProvider,
        element_type: ElementType,
        value: PropertyValue,
    }

    impl Fixture {
        fn new() -> Self {
            let element_type = ElementType {
                key: Uuid::new_v4(),
                alias: "banner".to_string(),
                name: "Banner".to_string(),
                icon: None,
                groups: vec![],
            };
            Self {
                registry: BlockConfigurationRegistry::new(
                    [BlockConfiguration::new(element_type.key)],
                    false,
                ),
                scaffolds: ScaffoldProvider::from_types([element_type.clone()]),
                element_type,
                value: PropertyValue::new(),
            }
        }

        fn block(&mut self) -> BlockObject {
            let content = self.element_type.scaffold(Udi::new_element());
            let entry = LayoutEntry::new(content.udi.clone(), None);
            self.value.push_content(content);
            let ctx = BlockContext {
                registry: &self.registry,
                scaffolds: &self.scaffolds,
                supports_copy: true,
            };
            BlockObject::build(entry, &mut self.value, &ctx).unwrap()
        }
    }

    fn keys(model: &BlockLayoutModel) -> Vec<Udi> {
        model.iter().map(|b| b.content_key().clone()).collect()
    }

    #[test]
    fn test_insert_shifts_and_reindexes() {
        let mut fixture = Fixture::new();
        let (a, b, c) = (fixture.block(), fixture.block(), fixture.block());
        let (ka, kb, kc) = (a.content_key().clone(), b.content_key().clone(), c.content_key().clone());

        let mut model = BlockLayoutModel::new();
        assert!(model.insert(0, a));
        assert!(model.insert(1, b));
        assert!(model.insert(1, c));

        assert_eq!(keys(&model), vec![ka, kc, kb]);
        let indices: Vec<usize> = model.iter().map(|b| b.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let mut fixture = Fixture::new();
        let a = fixture.block();
        let mut model = BlockLayoutModel::new();
        assert!(model.insert(0, a.clone()));
        assert!(!model.insert(1, a));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_insert_clamps_index() {
        let mut fixture = Fixture::new();
        let a = fixture.block();
        let mut model = BlockLayoutModel::new();
        assert!(model.insert(10, a));
        assert_eq!(model.get(0).unwrap().index(), 0);
    }

    #[test]
    fn test_remove_and_move() {
        let mut fixture = Fixture::new();
        let blocks: Vec<BlockObject> = (0..3).map(|_| fixture.block()).collect();
        let original: Vec<Udi> = blocks.iter().map(|b| b.content_key().clone()).collect();

        let mut model = BlockLayoutModel::new();
        for (i, block) in blocks.into_iter().enumerate() {
            model.insert(i, block);
        }

        assert!(model.move_to(0, 2));
        assert_eq!(
            keys(&model),
            vec![original[1].clone(), original[2].clone(), original[0].clone()]
        );
        assert!(!model.move_to(0, 3));

        let removed = model.remove_at(1).unwrap();
        assert_eq!(removed.content_key(), &original[2]);
        assert_eq!(model.get(1).unwrap().index(), 1);
        assert!(model.remove_at(5).is_none());
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let mut fixture = Fixture::new();
        let mut model = BlockLayoutModel::new();
        for i in 0..4 {
            let block = fixture.block();
            model.insert(i, block);
        }

        let mut value = fixture.value.clone();
        model.save(&mut value, "Umbraco.BlockList").unwrap();
        let loaded = BlockLayoutModel::load(&value, "Umbraco.BlockList").unwrap();
        assert_eq!(loaded, model.entries());
    }

    #[test]
    fn test_load_drops_dangling_and_duplicate_entries() {
        let mut fixture = Fixture::new();
        let a = fixture.block();
        let entries = vec![
            a.layout().clone(),
            LayoutEntry::new(Udi::new_element(), None),
            a.layout().clone(),
        ];
        let mut value = fixture.value.clone();
        value.set_layout_entries("Umbraco.BlockList", &entries).unwrap();

        let loaded = BlockLayoutModel::load(&value, "Umbraco.BlockList").unwrap();
        assert_eq!(loaded, vec![a.layout().clone()]);
    }
}
