use std::path::Path;

use serde::Deserialize;

use crate::error::MetaError;

/// Tool configuration, parsed from TOML or (through `avro-meta-config-hcl`) HCL.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub markup: MarkupConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreConfig {
    /// Store backend: "memory" or "file".
    #[serde(default = "default_store_kind")]
    pub kind: String,
    /// Backend configuration, handed to the store factory as JSON.
    #[serde(default)]
    pub config: Option<serde_json::Value>,
}

fn default_store_kind() -> String {
    "memory".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: default_store_kind(),
            config: None,
        }
    }
}

impl StoreConfig {
    /// Backend configuration as the JSON string store factories expect.
    pub fn config_json(&self) -> String {
        self.config
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "{}".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkupConfig {
    /// Spaces per nesting level; 0 writes a single line.
    #[serde(default = "default_indent")]
    pub indent: usize,
}

fn default_indent() -> usize {
    2
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            indent: default_indent(),
        }
    }
}

/// Config file format.
pub trait ConfigParser {
    /// File extensions handled, without the dot.
    fn extensions(&self) -> &[&str];

    fn parse(&self, content: &str) -> Result<ToolConfig, MetaError>;
}

pub struct TomlParser;

impl ConfigParser for TomlParser {
    fn extensions(&self) -> &[&str] {
        &["toml"]
    }

    fn parse(&self, content: &str) -> Result<ToolConfig, MetaError> {
        toml::from_str(content).map_err(|e| MetaError::Config(e.to_string()))
    }
}

impl ToolConfig {
    /// Load with the parser registered for the file's extension.
    pub fn load(path: &Path, parsers: &[&dyn ConfigParser]) -> Result<Self, MetaError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let parser = parsers
            .iter()
            .find(|p| p.extensions().contains(&ext))
            .ok_or_else(|| {
                MetaError::Config(format!("{}: no parser for extension '{ext}'", path.display()))
            })?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| MetaError::Config(format!("{}: {e}", path.display())))?;
        parser.parse(&content).map_err(|e| e.with_context(path.display()))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, MetaError> {
        TomlParser.parse(toml_str)
    }
}
