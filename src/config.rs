use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::slide::Alignment;

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sections: SectionsConfig,
    pub tree: TreeConfig,
    pub layout: LayoutConfig,
    pub generating: GeneratingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SectionsConfig {
    /// Tags that make a force-closed fragment worth keeping
    pub content_tags: Vec<String>,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            content_tags: [
                "H1", "H2", "H3", "H4", "H5", "H6", "P", "PYRAMID", "ARROWS", "TIMELINE", "ICON",
                "IMG",
            ]
            .iter()
            .map(|t| t.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub max_depth: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub column_width: String,
    pub default_alignment: Alignment,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_width: "50%".to_string(),
            default_alignment: Alignment::Center,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratingConfig {
    pub enabled: bool,
}

impl Default for GeneratingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// The defaults bundled with the crate (validated by `build.rs`).
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load config from a TOML file, or return defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::compiled_default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiled_default_matches_struct_defaults() {
        let compiled = Config::compiled_default();
        let fallback = Config::default();
        assert_eq!(compiled.sections.content_tags, fallback.sections.content_tags);
        assert_eq!(compiled.tree.max_depth, fallback.tree.max_depth);
        assert_eq!(compiled.layout.column_width, fallback.layout.column_width);
        assert_eq!(compiled.layout.default_alignment, Alignment::Center);
        assert!(compiled.generating.enabled);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml("[layout]\ndefault_alignment = \"start\"\n").unwrap();
        assert_eq!(config.layout.default_alignment, Alignment::Start);
        assert_eq!(config.layout.column_width, "50%");
        assert_eq!(config.tree.max_depth, 64);
    }

    #[test]
    fn invalid_file_is_an_error() {
        assert!(Config::from_toml("[tree]\nmax_depth = \"deep\"").is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = Config::load(Path::new("definitely/not/here.toml")).unwrap();
        assert!(config.generating.enabled);
    }
}
