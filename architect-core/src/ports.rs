//! Port traits abstracting restore points and artifact writes away from the pipeline.

use architect_types::report::RestorePoint;
use camino::Utf8Path;

/// Storage behind restore points.
pub trait BackupPort {
    /// Capture the current state. Called once per import, before any write.
    fn snapshot(&self) -> anyhow::Result<RestorePoint>;

    /// Drop a restore point that is no longer needed.
    fn discard(&self, point: &RestorePoint) -> anyhow::Result<()>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
