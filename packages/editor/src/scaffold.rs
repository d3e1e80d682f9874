//! # Element Type Scaffolds
//!
//! Element types are fetched once, asynchronously, when an editor instance
//! loads. After that every lookup is synchronous: blocks can only be built
//! once the scaffolds they depend on are present.

use crate::{EditorError, EditorResult};
use blocklist_common::{BlockConfiguration, ElementData, ElementType, Udi};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Remote (or file-backed) catalogue of element types
///
/// `Ok(None)` means the element type no longer exists; blocks of that type
/// degrade to unsupported. `Err` is a transport failure and aborts loading.
#[allow(async_fn_in_trait)]
pub trait ElementTypeSource {
    async fn fetch(&self, key: Uuid) -> EditorResult<Option<ElementType>>;
}

/// Element types held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryElementTypes {
    types: HashMap<Uuid, ElementType>,
}

impl InMemoryElementTypes {
    pub fn new(types: impl IntoIterator<Item = ElementType>) -> Self {
        Self {
            types: types.into_iter().map(|t| (t.key, t)).collect(),
        }
    }

    pub fn insert(&mut self, element_type: ElementType) {
        self.types.insert(element_type.key, element_type);
    }

    pub fn remove(&mut self, key: &Uuid) -> Option<ElementType> {
        self.types.remove(key)
    }
}

impl ElementTypeSource for InMemoryElementTypes {
    async fn fetch(&self, key: Uuid) -> EditorResult<Option<ElementType>> {
        Ok(self.types.get(&key).cloned())
    }
}

/// Loaded element types for one editor instance
#[derive(Debug, Clone, Default)]
pub struct ScaffoldProvider {
    types: HashMap<Uuid, Arc<ElementType>>,
}

impl ScaffoldProvider {
    /// Fetches every content and settings element type named by the block
    /// configurations. Duplicate keys are fetched once.
    #[instrument(skip(source, blocks), fields(blocks = blocks.len()))]
    pub async fn load<S: ElementTypeSource>(
        source: &S,
        blocks: &[BlockConfiguration],
    ) -> EditorResult<Self> {
        let mut keys: Vec<Uuid> = Vec::new();
        for block in blocks {
            keys.push(block.content_element_type_key);
            if let Some(settings_key) = block.settings_element_type_key {
                keys.push(settings_key);
            }
        }
        let mut seen = std::collections::HashSet::new();
        keys.retain(|key| seen.insert(*key));

        let mut types = HashMap::new();
        for key in keys {
            match source.fetch(key).await? {
                Some(element_type) => {
                    debug!(key = %key, alias = %element_type.alias, "Loaded element type scaffold");
                    types.insert(key, Arc::new(element_type));
                }
                None => {
                    warn!(key = %key, "Element type not found, blocks of this type will be unsupported");
                }
            }
        }

        info!(count = types.len(), "Scaffolds loaded");
        Ok(Self { types })
    }

    pub fn from_types(types: impl IntoIterator<Item = ElementType>) -> Self {
        Self {
            types: types.into_iter().map(|t| (t.key, Arc::new(t))).collect(),
        }
    }

    pub fn element_type(&self, key: &Uuid) -> Option<&Arc<ElementType>> {
        self.types.get(key)
    }

    pub fn by_alias(&self, alias: &str) -> Option<&Arc<ElementType>> {
        self.types.values().find(|t| t.alias == alias)
    }

    pub fn contains(&self, key: &Uuid) -> bool {
        self.types.contains_key(key)
    }

    /// An empty payload of the given type with a fresh identity.
    pub fn scaffold(&self, key: &Uuid) -> EditorResult<ElementData> {
        let element_type = self
            .types
            .get(key)
            .ok_or(EditorError::ScaffoldMissing(*key))?;
        Ok(element_type.scaffold(Udi::new_element()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocklist_common::PropertyGroup;

    fn element_type(alias: &str) -> ElementType {
        ElementType {
            key: Uuid::new_v4(),
            alias: alias.to_string(),
            name: alias.to_uppercase(),
            icon: None,
            groups: vec![PropertyGroup {
                name: "Content".to_string(),
                properties: vec![],
            }],
        }
    }

    struct FailingSource;

    impl ElementTypeSource for FailingSource {
        async fn fetch(&self, key: Uuid) -> EditorResult<Option<ElementType>> {
            Err(EditorError::ScaffoldFetch {
                key,
                reason: "offline".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_load_fetches_content_and_settings() {
        let content = element_type("banner");
        let settings = element_type("bannerSettings");
        let source = InMemoryElementTypes::new([content.clone(), settings.clone()]);

        let blocks = vec![BlockConfiguration::new(content.key).with_settings(settings.key)];
        let provider = ScaffoldProvider::load(&source, &blocks).await.unwrap();

        assert!(provider.contains(&content.key));
        assert!(provider.contains(&settings.key));
        assert_eq!(provider.by_alias("banner").unwrap().key, content.key);
    }

    #[tokio::test]
    async fn test_missing_type_is_skipped() {
        let content = element_type("banner");
        let source = InMemoryElementTypes::new([]);

        let blocks = vec![BlockConfiguration::new(content.key)];
        let provider = ScaffoldProvider::load(&source, &blocks).await.unwrap();

        assert!(!provider.contains(&content.key));
        assert!(matches!(
            provider.scaffold(&content.key),
            Err(EditorError::ScaffoldMissing(_))
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_aborts() {
        let blocks = vec![BlockConfiguration::new(Uuid::new_v4())];
        let result = ScaffoldProvider::load(&FailingSource, &blocks).await;
        assert!(matches!(result, Err(EditorError::ScaffoldFetch { .. })));
    }

    #[test]
    fn test_scaffold_has_fresh_identity() {
        let ty = element_type("banner");
        let provider = ScaffoldProvider::from_types([ty.clone()]);

        let a = provider.scaffold(&ty.key).unwrap();
        let b = provider.scaffold(&ty.key).unwrap();
        assert_ne!(a.udi, b.udi);
        assert_eq!(a.content_type_key, ty.key);
        assert!(a.values().is_empty());
    }
}
