//! # Edit Sessions
//!
//! An open edit binds the editing surface to a block's payloads. Two bindings
//! exist:
//!
//! - [`LiveBinding`] writes straight into the property value. Closing without
//!   submitting restores the values captured when the edit opened.
//! - [`ClonedBinding`] edits structural copies. Submitting copies the values
//!   back, closing drops the copies and leaves the payloads untouched.
//!
//! The binding is chosen from configuration when the edit opens.

use crate::{BlockObject, EditorError, EditorResult};
use blocklist_common::{ElementData, ElementType, PropertyValue, Udi};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Live,
    Deferred,
}

impl EditMode {
    pub fn from_live_editing(live: bool) -> Self {
        if live {
            EditMode::Live
        } else {
            EditMode::Deferred
        }
    }
}

/// Which payload of a block an edit reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Content,
    Settings,
}

pub trait EditSession: Debug + Send {
    fn mode(&self) -> EditMode;

    fn content_key(&self) -> &Udi;

    /// Current state of the payload as seen by the editing surface.
    fn payload<'a>(&'a self, store: &'a PropertyValue, target: EditTarget) -> EditorResult<&'a ElementData>;

    fn set_value(
        &mut self,
        store: &mut PropertyValue,
        target: EditTarget,
        alias: &str,
        value: Value,
    ) -> EditorResult<()>;

    /// Makes the edit permanent.
    fn commit(self: Box<Self>, store: &mut PropertyValue) -> EditorResult<()>;

    /// Abandons the edit, leaving the payloads as they were when it opened.
    fn discard(self: Box<Self>, store: &mut PropertyValue);
}

/// Opens the binding for `mode` on a supported block.
pub fn open_session(
    mode: EditMode,
    block: &BlockObject,
    store: &PropertyValue,
) -> EditorResult<Box<dyn EditSession>> {
    let content_type = block
        .content_type()
        .cloned()
        .ok_or_else(|| EditorError::UnsupportedBlock(block.content_key().clone()))?;
    let content = block
        .content(store)
        .cloned()
        .ok_or_else(|| EditorError::BlockNotFound(block.content_key().clone()))?;
    let settings = block.settings(store).cloned();
    let types = SessionTypes {
        content: content_type,
        settings: block.settings_type().cloned(),
    };

    Ok(match mode {
        EditMode::Live => Box::new(LiveBinding {
            snapshot_content: content,
            snapshot_settings: settings,
            types,
        }),
        EditMode::Deferred => Box::new(ClonedBinding {
            content,
            settings,
            types,
        }),
    })
}

#[derive(Debug, Clone)]
struct SessionTypes {
    content: Arc<ElementType>,
    settings: Option<Arc<ElementType>>,
}

impl SessionTypes {
    fn check(&self, target: EditTarget, alias: &str) -> EditorResult<()> {
        let element_type = match target {
            EditTarget::Content => &self.content,
            EditTarget::Settings => self.settings.as_ref().ok_or(EditorError::NoSettings)?,
        };
        if element_type.has_property(alias) {
            Ok(())
        } else {
            Err(EditorError::UnknownProperty {
                alias: alias.to_string(),
                element_type: element_type.alias.clone(),
            })
        }
    }
}

fn select<'a>(
    content: &'a ElementData,
    settings: Option<&'a ElementData>,
    target: EditTarget,
) -> EditorResult<&'a ElementData> {
    match target {
        EditTarget::Content => Ok(content),
        EditTarget::Settings => settings.ok_or(EditorError::NoSettings),
    }
}

/// Binds the editing surface directly to the stored payloads
#[derive(Debug)]
pub struct LiveBinding {
    snapshot_content: ElementData,
    snapshot_settings: Option<ElementData>,
    types: SessionTypes,
}

impl LiveBinding {
    fn stored_mut<'a>(
        &self,
        store: &'a mut PropertyValue,
        target: EditTarget,
    ) -> EditorResult<&'a mut ElementData> {
        match target {
            EditTarget::Content => store
                .content_mut(&self.snapshot_content.udi)
                .ok_or_else(|| EditorError::BlockNotFound(self.snapshot_content.udi.clone())),
            EditTarget::Settings => {
                let key = &self
                    .snapshot_settings
                    .as_ref()
                    .ok_or(EditorError::NoSettings)?
                    .udi;
                store
                    .settings_mut(key)
                    .ok_or_else(|| EditorError::BlockNotFound(key.clone()))
            }
        }
    }
}

impl EditSession for LiveBinding {
    fn mode(&self) -> EditMode {
        EditMode::Live
    }

    fn content_key(&self) -> &Udi {
        &self.snapshot_content.udi
    }

    fn payload<'a>(&'a self, store: &'a PropertyValue, target: EditTarget) -> EditorResult<&'a ElementData> {
        let key = &select(&self.snapshot_content, self.snapshot_settings.as_ref(), target)?.udi;
        let stored = match target {
            EditTarget::Content => store.content(key),
            EditTarget::Settings => store.settings(key),
        };
        stored.ok_or_else(|| EditorError::BlockNotFound(key.clone()))
    }

    fn set_value(
        &mut self,
        store: &mut PropertyValue,
        target: EditTarget,
        alias: &str,
        value: Value,
    ) -> EditorResult<()> {
        self.types.check(target, alias)?;
        self.stored_mut(store, target)?.set_value(alias, value);
        Ok(())
    }

    fn commit(self: Box<Self>, _store: &mut PropertyValue) -> EditorResult<()> {
        Ok(())
    }

    fn discard(self: Box<Self>, store: &mut PropertyValue) {
        if let Some(content) = store.content_mut(&self.snapshot_content.udi) {
            content.assign_values_from(&self.snapshot_content);
        }
        if let Some(snapshot) = &self.snapshot_settings {
            if let Some(settings) = store.settings_mut(&snapshot.udi) {
                settings.assign_values_from(snapshot);
            }
        }
    }
}

/// Binds the editing surface to copies of the payloads
#[derive(Debug)]
pub struct ClonedBinding {
    content: ElementData,
    settings: Option<ElementData>,
    types: SessionTypes,
}

impl EditSession for ClonedBinding {
    fn mode(&self) -> EditMode {
        EditMode::Deferred
    }

    fn content_key(&self) -> &Udi {
        &self.content.udi
    }

    fn payload<'a>(&'a self, _store: &'a PropertyValue, target: EditTarget) -> EditorResult<&'a ElementData> {
        select(&self.content, self.settings.as_ref(), target)
    }

    fn set_value(
        &mut self,
        _store: &mut PropertyValue,
        target: EditTarget,
        alias: &str,
        value: Value,
    ) -> EditorResult<()> {
        self.types.check(target, alias)?;
        let payload = match target {
            EditTarget::Content => &mut self.content,
            EditTarget::Settings => self.settings.as_mut().ok_or(EditorError::NoSettings)?,
        };
        payload.set_value(alias, value);
        Ok(())
    }

    fn commit(self: Box<Self>, store: &mut PropertyValue) -> EditorResult<()> {
        store
            .content_mut(&self.content.udi)
            .ok_or_else(|| EditorError::BlockNotFound(self.content.udi.clone()))?
            .assign_values_from(&self.content);

        if let Some(clone) = &self.settings {
            store
                .settings_mut(&clone.udi)
                .ok_or_else(|| EditorError::BlockNotFound(clone.udi.clone()))?
                .assign_values_from(clone);
        }
        Ok(())
    }

    fn discard(self: Box<Self>, _store: &mut PropertyValue) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockContext;
    use crate::{BlockConfigurationRegistry, ScaffoldProvider};
    use blocklist_common::{BlockConfiguration, LayoutEntry, PropertyGroup, PropertyType};
    use serde_json::json;
    use uuid::Uuid;

    fn element_type(alias: &str, property: &str) -> ElementType {
        ElementType {
            key: Uuid::new_v4(),
            alias: alias.to_string(),
            name: alias.to_string(),
            icon: None,
            groups: vec![PropertyGroup {
                name: "Content".to_string(),
                properties: vec![PropertyType {
                    alias: property.to_string(),
                    label: property.to_string(),
                    editor_alias: "Umbraco.TextBox".to_string(),
                }],
            }],
        }
    }

    fn setup() -> (BlockObject, PropertyValue) {
        let content_type = element_type("banner", "title");
        let settings_type = element_type("bannerSettings", "theme");
        let registry = BlockConfigurationRegistry::new(
            [BlockConfiguration::new(content_type.key).with_settings(settings_type.key)],
            false,
        );
        let scaffolds = ScaffoldProvider::from_types([content_type.clone(), settings_type]);

        let mut content = content_type.scaffold(blocklist_common::Udi::new_element());
        content.set_value("title", json!("Original"));
        let entry = LayoutEntry::new(content.udi.clone(), None);
        let mut value = PropertyValue::new();
        value.push_content(content);

        let ctx = BlockContext {
            registry: &registry,
            scaffolds: &scaffolds,
            supports_copy: true,
        };
        let block = BlockObject::build(entry, &mut value, &ctx).unwrap();
        (block, value)
    }

    #[test]
    fn test_live_edit_writes_through() {
        let (block, mut value) = setup();
        let mut session = open_session(EditMode::Live, &block, &value).unwrap();

        session
            .set_value(&mut value, EditTarget::Content, "title", json!("Live"))
            .unwrap();
        assert_eq!(block.content(&value).unwrap().value("title"), Some(&json!("Live")));

        session.commit(&mut value).unwrap();
        assert_eq!(block.content(&value).unwrap().value("title"), Some(&json!("Live")));
    }

    #[test]
    fn test_live_discard_restores_snapshot() {
        let (block, mut value) = setup();
        let mut session = open_session(EditMode::Live, &block, &value).unwrap();

        session
            .set_value(&mut value, EditTarget::Settings, "theme", json!("dark"))
            .unwrap();
        session.discard(&mut value);

        assert_eq!(block.settings(&value).unwrap().value("theme"), None);
    }

    #[test]
    fn test_deferred_edit_is_isolated_until_commit() {
        let (block, mut value) = setup();
        let before = value.clone();
        let mut session = open_session(EditMode::Deferred, &block, &value).unwrap();

        session
            .set_value(&mut value, EditTarget::Content, "title", json!("Draft"))
            .unwrap();
        assert_eq!(value, before);
        assert_eq!(
            session.payload(&value, EditTarget::Content).unwrap().value("title"),
            Some(&json!("Draft"))
        );

        session.commit(&mut value).unwrap();
        assert_eq!(block.content(&value).unwrap().value("title"), Some(&json!("Draft")));
    }

    #[test]
    fn test_deferred_discard_leaves_payload_untouched() {
        let (block, mut value) = setup();
        let before = serde_json::to_string(&value).unwrap();
        let mut session = open_session(EditMode::Deferred, &block, &value).unwrap();

        session
            .set_value(&mut value, EditTarget::Content, "title", json!("Draft"))
            .unwrap();
        session.discard(&mut value);

        assert_eq!(serde_json::to_string(&value).unwrap(), before);
    }

    #[test]
    fn test_unknown_property_is_rejected() {
        let (block, mut value) = setup();
        let mut session = open_session(EditMode::Deferred, &block, &value).unwrap();
        let result = session.set_value(&mut value, EditTarget::Content, "missing", json!(1));
        assert!(matches!(result, Err(EditorError::UnknownProperty { .. })));
    }
}
