use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use toml::Value;

pub const DEFAULT_PAGE_DIRECTORY: &str = "ArchWiki";
pub const DEFAULT_CLI_BINARY: &str = "archwiki-rs";

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct ReaderConfig {
    #[serde(default)]
    pub pages: PagesSection,
    #[serde(default)]
    pub cli: CliSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct PagesSection {
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct CliSection {
    pub binary: Option<String>,
    pub open_command: Option<String>,
}

impl ReaderConfig {
    /// Page directory relative to the vault root: config > DEFAULT_PAGE_DIRECTORY.
    pub fn page_directory(&self) -> &str {
        self.pages
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_PAGE_DIRECTORY)
    }

    /// Resolve the external tool: env ARCHWIKI_READER_BINARY > config > DEFAULT_CLI_BINARY.
    pub fn cli_binary(&self) -> String {
        if let Ok(value) = env::var("ARCHWIKI_READER_BINARY") {
            let trimmed = value.trim().to_string();
            if !trimmed.is_empty() {
                return trimmed;
            }
        }
        self.cli
            .binary
            .clone()
            .unwrap_or_else(|| DEFAULT_CLI_BINARY.to_string())
    }

    /// Resolve the page viewer: env ARCHWIKI_READER_OPEN > config > None.
    pub fn open_command(&self) -> Option<String> {
        if let Ok(value) = env::var("ARCHWIKI_READER_OPEN") {
            let trimmed = value.trim().to_string();
            if !trimmed.is_empty() {
                return Some(trimmed);
            }
        }
        self.cli
            .open_command
            .clone()
            .filter(|value| !value.trim().is_empty())
    }
}

/// Load and parse a ReaderConfig from a TOML file. Returns default if file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<ReaderConfig> {
    if !config_path.exists() {
        return Ok(ReaderConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: ReaderConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(parsed)
}

/// Write the whole config, replacing whatever is on disk.
#[derive(Debug, Clone, Default)]
pub struct ConfigPatch {
    pub set_page_directory: Option<String>,
    pub set_binary: Option<String>,
    pub set_open_command: Option<String>,
}

/// Update selected keys while preserving all other config sections.
/// Returns `true` when a write occurred.
pub fn patch_config(config_path: &Path, patch: &ConfigPatch) -> Result<bool> {
    if patch.set_page_directory.is_none()
        && patch.set_binary.is_none()
        && patch.set_open_command.is_none()
    {
        return Ok(false);
    }

    let mut root = if config_path.exists() {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        toml::from_str::<Value>(&content)
            .with_context(|| format!("failed to parse {}", config_path.display()))?
    } else {
        Value::Table(Default::default())
    };
    let original = root.clone();

    let root_table = root.as_table_mut().ok_or_else(|| {
        anyhow::anyhow!(
            "top-level TOML must be a table in {}",
            config_path.display()
        )
    })?;

    if let Some(directory) = &patch.set_page_directory {
        if directory.trim().is_empty() {
            bail!("page directory cannot be empty");
        }
        section_table(root_table, "pages", config_path)?
            .insert("directory".to_string(), Value::String(directory.clone()));
    }
    if let Some(binary) = &patch.set_binary {
        if binary.trim().is_empty() {
            bail!("cli binary cannot be empty");
        }
        section_table(root_table, "cli", config_path)?
            .insert("binary".to_string(), Value::String(binary.clone()));
    }
    if let Some(open_command) = &patch.set_open_command {
        let cli = section_table(root_table, "cli", config_path)?;
        if open_command.trim().is_empty() {
            cli.remove("open_command");
        } else {
            cli.insert(
                "open_command".to_string(),
                Value::String(open_command.clone()),
            );
        }
    }

    if root == original {
        return Ok(false);
    }

    let parent = config_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("config path has no parent: {}", config_path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    let rendered = toml::to_string_pretty(&root).context("failed to serialize config TOML")?;
    fs::write(config_path, rendered)
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    Ok(true)
}

fn section_table<'a>(
    root: &'a mut toml::map::Map<String, Value>,
    name: &str,
    config_path: &Path,
) -> Result<&'a mut toml::map::Map<String, Value>> {
    root.entry(name.to_string())
        .or_insert_with(|| Value::Table(Default::default()))
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("[{name}] must be a table in {}", config_path.display()))
}
