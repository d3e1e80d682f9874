use super::load_property;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Stored property value (JSON)
    pub input: PathBuf,

    /// Output file; prints to stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite the input file
    #[arg(short, long, conflicts_with = "output")]
    pub write: bool,
}

pub async fn normalize(args: NormalizeArgs, config: &Config, cwd: &str) -> Result<()> {
    let loaded = load_property(config, cwd, &args.input).await?;
    let json = serde_json::to_string_pretty(&loaded.editor.to_json()?)?;

    let target = if args.write {
        Some(args.input.clone())
    } else {
        args.output.clone()
    };

    match target {
        Some(path) => {
            tokio::fs::write(&path, format!("{}\n", json)).await?;
            println!(
                "  {} Wrote {} blocks to {}",
                "✓".green(),
                loaded.editor.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
