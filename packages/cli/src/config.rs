use blocklist_common::BlockListConfig;
use blocklist_editor::{DEFAULT_CLIPBOARD_CAPACITY, DEFAULT_EDITOR_ALIAS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "blocklist.config.json";

/// Blocklist configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Layout key the editor reads and writes
    #[serde(default = "default_editor_alias")]
    pub editor_alias: String,

    /// JSON file holding the element type catalogue
    #[serde(default = "default_element_types")]
    pub element_types: String,

    #[serde(default = "default_clipboard_capacity")]
    pub clipboard_capacity: usize,

    /// Property alias, the root of every validation path
    #[serde(default = "default_property_alias")]
    pub property_alias: String,

    /// Property label used in prompts and "copy all" entries
    #[serde(default = "default_property_label")]
    pub property_label: String,

    /// Block list property configuration
    #[serde(default)]
    pub block_list: BlockListConfig,
}

fn default_editor_alias() -> String {
    DEFAULT_EDITOR_ALIAS.to_string()
}

fn default_element_types() -> String {
    "element-types.json".to_string()
}

fn default_clipboard_capacity() -> usize {
    DEFAULT_CLIPBOARD_CAPACITY
}

fn default_property_alias() -> String {
    "blocks".to_string()
}

fn default_property_label() -> String {
    "Blocks".to_string()
}

impl Config {
    /// Load config from `explicit`, or from the working directory.
    ///
    /// An explicit path must exist; a missing config in the working
    /// directory falls back to the default.
    pub fn load(cwd: &str, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
                }
                path.to_path_buf()
            }
            None => PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get absolute path to the element type catalogue
    pub fn get_element_types_path(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.element_types)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            editor_alias: default_editor_alias(),
            element_types: default_element_types(),
            clipboard_capacity: default_clipboard_capacity(),
            property_alias: default_property_alias(),
            property_label: default_property_label(),
            block_list: BlockListConfig::default(),
        }
    }
}
