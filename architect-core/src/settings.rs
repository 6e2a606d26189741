//! Clap-free settings for import and export pipelines.

use architect_types::report::Bucket;
use camino::Utf8PathBuf;

/// Serialization of a declarative document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON first, YAML as fallback.
    #[default]
    Auto,
    Json,
    Yaml,
}

/// Settings for the import pipeline.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub format: DocumentFormat,
    pub out_dir: Utf8PathBuf,

    /// Take a restore point before importing. On by default; turning it off
    /// means a failed or aborted run has no recovery snapshot at all.
    pub backup_enabled: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            format: DocumentFormat::Auto,
            out_dir: Utf8PathBuf::from("artifacts/architect"),
            backup_enabled: true,
        }
    }
}

/// Settings for the export pipeline.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// `Auto` is treated as JSON.
    pub format: DocumentFormat,
    pub buckets: Vec<Bucket>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: DocumentFormat::Json,
            buckets: Bucket::IMPORT_ORDER.to_vec(),
        }
    }
}
