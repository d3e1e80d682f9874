use super::{load_errors, load_property};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Stored property value (JSON)
    pub input: PathBuf,

    /// Nested block error report; any error fails the check
    #[arg(short, long)]
    pub errors: Option<PathBuf>,
}

pub async fn check(args: CheckArgs, config: &Config, cwd: &str) -> Result<()> {
    println!("🔍 {} {}", "Checking".green().bold(), args.input.display());
    println!();

    let loaded = load_property(config, cwd, &args.input).await?;
    let editor = loaded.editor;
    let mut problems = 0;

    let stored_entries = loaded.stored.layout_entries(&config.editor_alias)?.len();
    let dropped = stored_entries.saturating_sub(editor.len());
    if dropped > 0 {
        println!(
            "   {} {} layout entries reference missing or duplicate payloads",
            "✗".red(),
            dropped
        );
        problems += 1;
    }

    let backfilled = editor
        .value()
        .settings_data()
        .len()
        .saturating_sub(loaded.stored.settings_data().len());
    if backfilled > 0 {
        println!(
            "   {} {} blocks were missing settings and will get new ones on save",
            "⚠️".yellow(),
            backfilled
        );
    }

    let unsupported: Vec<_> = editor.blocks().filter(|b| b.is_unsupported()).collect();
    for block in &unsupported {
        println!(
            "   {} Block {} uses an element type that is missing or not allowed",
            "✗".red(),
            block.index()
        );
    }
    problems += unsupported.len();

    let cardinality = editor.cardinality();
    let limit = config.block_list.validation_limit;
    if !cardinality.min_ok {
        println!(
            "   {} {} blocks, at least {} required",
            "✗".red(),
            cardinality.count,
            limit.min.unwrap_or_default()
        );
        problems += 1;
    }
    if !cardinality.max_ok {
        println!(
            "   {} {} blocks, at most {} allowed",
            "✗".red(),
            cardinality.count,
            limit.max.unwrap_or_default()
        );
        problems += 1;
    }

    if let Some(errors) = &args.errors {
        let count = load_errors(&editor, errors).await?;
        for block in editor.blocks().filter(|b| b.has_error()) {
            println!(
                "   {} Block {} ({}) has validation errors",
                "✗".red(),
                block.index(),
                block.label()
            );
        }
        if count > 0 {
            problems += 1;
        }
    }

    println!();
    if problems > 0 {
        return Err(anyhow::anyhow!("{} problem(s) found", problems));
    }

    println!("   {} No issues found!", "✓".green());
    Ok(())
}
