//! Configuration file loading for architect.
//!
//! Discovers and loads `architect.toml` from the working root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "architect.toml";

/// Top-level configuration from architect.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArchitectConfig {
    pub store: StoreConfig,
    pub backups: BackupsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file holding the live schema.
    pub path: Utf8PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: Utf8PathBuf::from("schema.json"),
        }
    }
}

/// Backups section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackupsConfig {
    /// Whether to take a restore point before importing.
    pub enabled: bool,

    /// Directory restore points are written to.
    pub dir: Utf8PathBuf,
}

impl Default for BackupsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: Utf8PathBuf::from(".architect/backups"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for `results.json` / `results.md`.
    pub dir: Utf8PathBuf,

    /// Format of exported documents.
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: Utf8PathBuf::from("artifacts/architect"),
            format: OutputFormat::default(),
        }
    }
}

/// Discover the architect.toml config file.
///
/// Returns `None` if no config file is found.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse an architect.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<ArchitectConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<ArchitectConfig> {
    let config: ArchitectConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the root, or return default if not found.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<ArchitectConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(ArchitectConfig::default()),
    }
}

/// Merged configuration combining config file and CLI arguments.
///
/// Relative paths are resolved against the working root.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub store: Utf8PathBuf,
    pub backups_enabled: bool,
    pub backups_dir: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,
    pub format: OutputFormat,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: ArchitectConfig,
    root: Utf8PathBuf,
}

fn resolve(root: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

impl ConfigMerger {
    pub fn new(config: ArchitectConfig, root: &Utf8Path) -> Self {
        Self {
            config,
            root: root.to_path_buf(),
        }
    }

    fn merged(
        &self,
        store: Option<&Utf8Path>,
        backups_dir: Option<&Utf8Path>,
        out_dir: Option<&Utf8Path>,
        backups_enabled: bool,
        format: OutputFormat,
    ) -> MergedConfig {
        MergedConfig {
            store: resolve(&self.root, store.unwrap_or(&self.config.store.path)),
            backups_enabled,
            backups_dir: resolve(&self.root, backups_dir.unwrap_or(&self.config.backups.dir)),
            out_dir: resolve(&self.root, out_dir.unwrap_or(&self.config.output.dir)),
            format,
        }
    }

    /// Merge with import command CLI arguments.
    ///
    /// `--no-backup` wins over `backups.enabled`.
    pub fn merge_import_args(
        self,
        cli_store: Option<&Utf8Path>,
        cli_backups_dir: Option<&Utf8Path>,
        cli_out_dir: Option<&Utf8Path>,
        no_backup: bool,
    ) -> MergedConfig {
        let enabled = self.config.backups.enabled && !no_backup;
        self.merged(
            cli_store,
            cli_backups_dir,
            cli_out_dir,
            enabled,
            self.config.output.format,
        )
    }

    /// Merge with export command CLI arguments.
    pub fn merge_export_args(
        self,
        cli_store: Option<&Utf8Path>,
        cli_format: Option<OutputFormat>,
    ) -> MergedConfig {
        let format = cli_format.unwrap_or(self.config.output.format);
        self.merged(cli_store, None, None, self.config.backups.enabled, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_example_config() {
        let contents = r#"
[store]
path = "state/schema.json"

[backups]
enabled = false
dir = "/var/backups/architect"

[output]
dir = "out"
format = "yaml"
"#;

        let config = parse_config(contents).unwrap();
        assert_eq!(config.store.path, Utf8PathBuf::from("state/schema.json"));
        assert!(!config.backups.enabled);
        assert_eq!(config.output.format, OutputFormat::Yaml);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config.store.path, Utf8PathBuf::from("schema.json"));
        assert!(config.backups.enabled);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        assert!(parse_config("[output]\nformat = \"xml\"\n").is_err());
    }

    #[test]
    fn test_merge_resolves_relative_paths() {
        let config = parse_config(
            r#"
[backups]
dir = "/abs/backups"
"#,
        )
        .unwrap();
        let merged = ConfigMerger::new(config, Utf8Path::new("/work")).merge_import_args(
            None,
            None,
            Some(Utf8Path::new("results")),
            false,
        );

        assert_eq!(merged.store, Utf8PathBuf::from("/work/schema.json"));
        assert_eq!(merged.backups_dir, Utf8PathBuf::from("/abs/backups"));
        assert_eq!(merged.out_dir, Utf8PathBuf::from("/work/results"));
        assert!(merged.backups_enabled);
    }

    #[test]
    fn test_no_backup_overrides_config() {
        let merged = ConfigMerger::new(ArchitectConfig::default(), Utf8Path::new("."))
            .merge_import_args(None, None, None, true);
        assert!(!merged.backups_enabled);
    }

    #[test]
    fn test_cli_format_overrides_config() {
        let config = parse_config("[output]\nformat = \"yaml\"\n").unwrap();
        let merged = ConfigMerger::new(config.clone(), Utf8Path::new("."))
            .merge_export_args(None, Some(OutputFormat::Json));
        assert_eq!(merged.format, OutputFormat::Json);

        let merged = ConfigMerger::new(config, Utf8Path::new(".")).merge_export_args(None, None);
        assert_eq!(merged.format, OutputFormat::Yaml);
    }

    #[test]
    fn test_load_or_default_reads_file() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        assert!(discover_config(&root).is_none());

        fs::write(root.join(CONFIG_FILE_NAME), "[store]\npath = \"x.json\"\n").unwrap();
        let config = load_or_default(&root).unwrap();
        assert_eq!(config.store.path, Utf8PathBuf::from("x.json"));
    }
}
