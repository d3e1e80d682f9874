//! Element type catalogue backed by a JSON file
//!
//! The file holds an array of element types. It is read on the first fetch
//! and cached for the life of the source.

use blocklist_common::ElementType;
use blocklist_editor::{EditorError, EditorResult, ElementTypeSource};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug)]
pub struct FileElementTypes {
    path: PathBuf,
    catalogue: OnceCell<HashMap<Uuid, ElementType>>,
}

impl FileElementTypes {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            catalogue: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn catalogue(&self) -> Result<&HashMap<Uuid, ElementType>, String> {
        self.catalogue
            .get_or_try_init(|| async {
                let source = tokio::fs::read_to_string(&self.path)
                    .await
                    .map_err(|err| format!("{}: {}", self.path.display(), err))?;
                let types: Vec<ElementType> = serde_json::from_str(&source)
                    .map_err(|err| format!("{}: {}", self.path.display(), err))?;
                debug!(path = %self.path.display(), count = types.len(), "Read element type catalogue");
                Ok(types.into_iter().map(|t| (t.key, t)).collect())
            })
            .await
    }
}

impl ElementTypeSource for FileElementTypes {
    async fn fetch(&self, key: Uuid) -> EditorResult<Option<ElementType>> {
        let catalogue = self
            .catalogue()
            .await
            .map_err(|reason| EditorError::ScaffoldFetch { key, reason })?;
        Ok(catalogue.get(&key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fetch_from_file() {
        let dir = TempDir::new().unwrap();
        let key = Uuid::new_v4();
        let path = dir.path().join("types.json");
        let catalogue = json!([{
            "key": key,
            "alias": "banner",
            "name": "Banner",
            "groups": [{
                "name": "Content",
                "properties": [{ "alias": "title", "editorAlias": "Umbraco.TextBox" }]
            }]
        }]);
        std::fs::write(&path, catalogue.to_string()).unwrap();

        let source = FileElementTypes::new(&path);
        let banner = source.fetch(key).await.unwrap().unwrap();
        assert_eq!(banner.alias, "banner");
        assert!(banner.has_property("title"));
        assert!(source.fetch(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_a_fetch_error() {
        let dir = TempDir::new().unwrap();
        let source = FileElementTypes::new(dir.path().join("missing.json"));

        let result = source.fetch(Uuid::new_v4()).await;
        assert!(matches!(result, Err(EditorError::ScaffoldFetch { .. })));
    }
}
