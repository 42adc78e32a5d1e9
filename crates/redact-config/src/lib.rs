use redact_core::ReplacementCatalog;
use redact_layout::{BreakpointThresholds, LayoutTables, WeightTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Configuration for redact
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub replacements: ReplacementConfig,

    #[serde(default)]
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplacementConfig {
    #[serde(default = "default_fallback")]
    pub fallback: String,

    /// Detected type -> suggested replacement (type matched case-insensitively)
    #[serde(default = "default_types")]
    pub types: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_min_column_width")]
    pub min_column_width: u32,

    #[serde(default = "default_medium_from")]
    pub medium_from: u32,

    #[serde(default = "default_wide_from")]
    pub wide_from: u32,

    #[serde(default = "default_compact")]
    pub compact: WeightTable,

    #[serde(default = "default_medium")]
    pub medium: WeightTable,

    #[serde(default = "default_wide")]
    pub wide: WeightTable,
}

impl Default for ReplacementConfig {
    fn default() -> Self {
        Self {
            fallback: default_fallback(),
            types: default_types(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_column_width: default_min_column_width(),
            medium_from: default_medium_from(),
            wide_from: default_wide_from(),
            compact: default_compact(),
            medium: default_medium(),
            wide: default_wide(),
        }
    }
}

fn default_fallback() -> String {
    ReplacementCatalog::default().fallback().to_string()
}

fn default_types() -> BTreeMap<String, String> {
    ReplacementCatalog::default()
        .entries()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn default_min_column_width() -> u32 {
    4
}

fn default_medium_from() -> u32 {
    BreakpointThresholds::default().medium_from
}

fn default_wide_from() -> u32 {
    BreakpointThresholds::default().wide_from
}

fn default_compact() -> WeightTable {
    LayoutTables::default().compact
}

fn default_medium() -> WeightTable {
    LayoutTables::default().medium
}

fn default_wide() -> WeightTable {
    LayoutTables::default().wide
}

impl ReplacementConfig {
    pub fn catalog(&self) -> ReplacementCatalog {
        self.types
            .iter()
            .fold(ReplacementCatalog::new(self.fallback.clone()), |catalog, (k, v)| {
                catalog.with_entry(k, v.clone())
            })
    }
}

impl LayoutConfig {
    pub fn thresholds(&self) -> BreakpointThresholds {
        BreakpointThresholds {
            medium_from: self.medium_from,
            wide_from: self.wide_from,
        }
    }

    pub fn tables(&self) -> LayoutTables {
        LayoutTables {
            compact: self.compact.clone(),
            medium: self.medium.clone(),
            wide: self.wide.clone(),
        }
    }
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        Self::load_or_create(&Self::config_path())
    }

    /// Load config from `path`, writing the defaults there first if missing
    pub fn load_or_create(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "redact", "redact") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.redact/config.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.layout.min_column_width, 4);
        assert_eq!(config.layout.medium_from, 80);
        assert_eq!(config.replacements.fallback, "[REDACTED]");
        assert!(!config.replacements.types.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.layout.wide, config.layout.wide);
        assert_eq!(parsed.replacements.types, config.replacements.types);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_str = r#"
[replacements]
fallback = "***"

[replacements.types]
Email = "redacted@example.org"

[layout]
min_column_width = 6
compact = [
    { name = "value", weight = 1 },
    { name = "status", weight = 1 },
]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        let catalog = config.replacements.catalog();
        assert_eq!(catalog.suggest("email"), "redacted@example.org");
        assert_eq!(catalog.suggest("Phone"), "***");

        assert_eq!(config.layout.min_column_width, 6);
        assert_eq!(config.layout.compact.len(), 2);
        assert_eq!(config.layout.wide, LayoutTables::default().wide);
        assert_eq!(config.layout.thresholds(), BreakpointThresholds::default());
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_or_create(&path).unwrap();
        assert!(path.exists());

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.layout.compact, created.layout.compact);
        assert_eq!(loaded.replacements.fallback, created.replacements.fallback);
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "layout = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
