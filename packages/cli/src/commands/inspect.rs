use super::{load_errors, load_property};
use crate::config::Config;
use anyhow::Result;
use blocklist_editor::{BlockObject, BlockView};
use clap::Args;
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Stored property value (JSON)
    pub input: PathBuf,

    /// Nested block error report to correlate with blocks
    #[arg(short, long)]
    pub errors: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

fn view_name(view: &BlockView) -> &str {
    match view {
        BlockView::Label { .. } => "label",
        BlockView::Inline { .. } => "inline",
        BlockView::Custom { view, .. } => view.as_str(),
        BlockView::Unsupported { .. } => "unsupported",
    }
}

pub async fn inspect(args: InspectArgs, config: &Config, cwd: &str) -> Result<()> {
    let loaded = load_property(config, cwd, &args.input).await?;
    let editor = loaded.editor;
    if let Some(errors) = &args.errors {
        load_errors(&editor, errors).await?;
    }

    if args.format == "json" {
        let blocks: Vec<_> = editor
            .blocks()
            .map(|block| {
                let paths = editor.validation_paths(block.index()).ok();
                let view = block.view();
                json!({
                    "index": block.index(),
                    "label": block.label(),
                    "view": view_name(&view),
                    "contentType": block.content_type_alias(),
                    "contentUdi": block.content_key().to_string(),
                    "settingsUdi": block.settings_key().map(|k| k.to_string()),
                    "unsupported": block.is_unsupported(),
                    "hasError": block.has_error(),
                    "validationPath": paths.map(|p| p.content.to_string()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&blocks)?);
        return Ok(());
    }

    println!("🔍 {} {}", "Inspecting".green().bold(), args.input.display());
    println!("   Editor: {}", config.editor_alias);
    println!("   Blocks: {}", editor.len());
    println!();

    for block in editor.blocks() {
        print_block(block);
    }

    if editor.any_block_has_error() {
        println!();
        println!("   {} Some blocks have validation errors", "⚠️".yellow());
    }

    Ok(())
}

fn print_block(block: &BlockObject) {
    let marker = if block.is_unsupported() {
        "?".yellow()
    } else if block.has_error() {
        "✗".red()
    } else {
        "✓".green()
    };
    let view = block.view();
    println!(
        "   {} [{}] {} ({})",
        marker,
        block.index(),
        block.label().bright_white(),
        view_name(&view)
    );
    println!("       content:  {}", block.content_key());
    if let Some(settings) = block.settings_key() {
        println!("       settings: {}", settings);
    }
}
