pub mod check;
pub mod inspect;
pub mod normalize;

pub use check::{check, CheckArgs};
pub use inspect::{inspect, InspectArgs};
pub use normalize::{normalize, NormalizeArgs};

use crate::config::Config;
use crate::element_types::FileElementTypes;
use anyhow::Result;
use blocklist_common::PropertyValue;
use blocklist_editor::{
    BlockEditorController, EditorOptions, EditorServices, HeadlessHost, InMemoryClipboard,
    ValidationRegistry,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Stored value as read from disk alongside the editor built from it
pub struct LoadedProperty {
    pub stored: PropertyValue,
    pub editor: BlockEditorController<HeadlessHost>,
}

pub async fn load_property(config: &Config, cwd: &str, input: &Path) -> Result<LoadedProperty> {
    if !input.is_file() {
        return Err(anyhow::anyhow!("Input file does not exist: {}", input.display()));
    }
    let source = tokio::fs::read_to_string(input).await?;
    let stored = PropertyValue::from_json_str(&source)?;

    let element_types = FileElementTypes::new(config.get_element_types_path(cwd));
    let services = EditorServices {
        clipboard: Arc::new(InMemoryClipboard::with_capacity(config.clipboard_capacity)),
        validation: ValidationRegistry::new(),
    };
    let options = EditorOptions {
        editor_alias: config.editor_alias.clone(),
        property_label: config.property_label.clone(),
        document_name: input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned()),
        read_only: true,
        ..EditorOptions::new(config.property_alias.clone())
    };

    let editor = BlockEditorController::load(
        &element_types,
        stored.clone(),
        config.block_list.clone(),
        services,
        HeadlessHost::new(false),
        options,
    )
    .await?;

    Ok(LoadedProperty { stored, editor })
}

/// Feeds a nested block error report into the editor's validation registry.
/// Returns the number of errors registered.
pub async fn load_errors(
    editor: &BlockEditorController<HeadlessHost>,
    path: &Path,
) -> Result<usize> {
    let source = tokio::fs::read_to_string(path).await?;
    let report: Value = serde_json::from_str(&source)?;
    let Value::Array(items) = report else {
        return Err(anyhow::anyhow!(
            "Error report must be a JSON array: {}",
            path.display()
        ));
    };

    let validation = editor.validation();
    validation.add_complex_errors(&editor.options().property_path, &items);
    Ok(validation.errors().len())
}
