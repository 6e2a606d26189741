//! Core import and export pipelines.
//!
//! These entry points are I/O-agnostic: the live schema, restore points and
//! artifact writes all go through port traits.

use crate::ports::{BackupPort, WritePort};
use crate::settings::{DocumentFormat, ExportSettings, ImportSettings};
use anyhow::Context;
use architect_domain::{Processor, ProcessorRegistry, SchemaStore};
use architect_types::kind::ObjectKind;
use architect_types::object::{ErrorMap, error_map, merge_errors};
use architect_types::report::{Bucket, ImportReport, ImportResult, RestorePoint, ToolInfo};
use chrono::Utc;
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, info, warn};

/// Error type for pipeline results. Exit code 2 = malformed input, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("malformed document: {0}")]
    Malformed(String),
    #[error("backup failed: {0:#}")]
    Backup(anyhow::Error),
    #[error("{0:#}")]
    Store(#[from] anyhow::Error),
    /// The run aborted after the restore point was taken. Writes made before
    /// the failure stay applied; the restore point now belongs to the caller.
    #[error("import aborted; restore point retained at {}", .restore_point.location)]
    Interrupted {
        source: Box<ImportError>,
        restore_point: RestorePoint,
    },
}

impl ImportError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ImportError::Malformed(_) => 2,
            ImportError::Backup(_) | ImportError::Store(_) => 1,
            ImportError::Interrupted { source, .. } => source.exit_code(),
        }
    }

    /// Restore point handed back by an aborted run.
    pub fn restore_point(&self) -> Option<&RestorePoint> {
        match self {
            ImportError::Interrupted { restore_point, .. } => Some(restore_point),
            _ => None,
        }
    }
}

/// Where an import run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Pending,
    Parsing(Bucket),
    Saving(Bucket),
    PostProcessing,
    Committing,
    RetainingBackup,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Pending => f.write_str("pending"),
            RunPhase::Parsing(bucket) => write!(f, "parsing({bucket})"),
            RunPhase::Saving(bucket) => write!(f, "saving({bucket})"),
            RunPhase::PostProcessing => f.write_str("post-processing"),
            RunPhase::Committing => f.write_str("committing"),
            RunPhase::RetainingBackup => f.write_str("retaining-backup"),
            RunPhase::Done => f.write_str("done"),
        }
    }
}

/// Mutable state of one import.
#[derive(Debug)]
pub struct PipelineRun {
    pub phase: RunPhase,
    pub restore_point: Option<RestorePoint>,
    pub no_errors: bool,
    pub successful_sections: Vec<String>,
    /// `sectionHandle:entryTypeHandle` of every entry type saved in this run.
    pub added_entry_types: Vec<String>,
}

impl PipelineRun {
    fn new() -> Self {
        Self {
            phase: RunPhase::Pending,
            restore_point: None,
            no_errors: true,
            successful_sections: Vec::new(),
            added_entry_types: Vec::new(),
        }
    }

    fn enter(&mut self, phase: RunPhase) {
        if self.phase != phase {
            debug!(from = %self.phase, to = %phase, "import phase");
            self.phase = phase;
        }
    }
}

/// Outcome of `run_import`.
#[derive(Debug)]
pub struct ImportOutcome {
    pub report: ImportReport,
    /// Set when the run had errors or the restore point could not be discarded;
    /// the caller owns the restore point from here on.
    pub retained_restore_point: Option<RestorePoint>,
}

/// Parse a declarative document. The top level must be a mapping.
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<Map<String, Value>, ImportError> {
    let value: Value = match format {
        DocumentFormat::Json => {
            serde_json::from_str(text).map_err(|e| ImportError::Malformed(e.to_string()))?
        }
        DocumentFormat::Yaml => {
            serde_yaml::from_str(text).map_err(|e| ImportError::Malformed(e.to_string()))?
        }
        DocumentFormat::Auto => match serde_json::from_str(text) {
            Ok(value) => value,
            Err(json_err) => serde_yaml::from_str(text).map_err(|yaml_err| {
                ImportError::Malformed(format!("not JSON ({json_err}) or YAML ({yaml_err})"))
            })?,
        },
    };
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ImportError::Malformed(
            "top level must be a mapping".to_string(),
        )),
    }
}

fn is_list(doc: &Map<String, Value>, bucket: Bucket) -> bool {
    matches!(doc.get(bucket.key()), Some(Value::Array(_)))
}

/// Run the import pipeline over `document`.
///
/// Buckets are processed in [`Bucket::IMPORT_ORDER`]; each item is parsed and
/// saved on its own, so one failing item never stops the rest. Store and
/// backup failures abort the run; once a restore point exists, the abort
/// carries it back as [`ImportError::Interrupted`].
pub fn run_import(
    settings: &ImportSettings,
    document: &str,
    registry: &ProcessorRegistry,
    store: &mut dyn SchemaStore,
    backup: &dyn BackupPort,
    tool: ToolInfo,
) -> Result<ImportOutcome, ImportError> {
    let doc = parse_document(document, settings.format)?;

    let mut run = PipelineRun::new();
    let mut report = ImportReport::new(tool);

    if settings.backup_enabled {
        let point = backup.snapshot().map_err(ImportError::Backup)?;
        info!(location = %point.location, "restore point taken");
        run.restore_point = Some(point);
    }

    if let Err(err) = apply_document(&doc, registry, store, &mut run, &mut report) {
        return Err(match run.restore_point.take() {
            Some(restore_point) => {
                warn!(
                    location = %restore_point.location,
                    error = %err,
                    "import aborted; restore point retained"
                );
                ImportError::Interrupted {
                    source: Box::new(err),
                    restore_point,
                }
            }
            None => err,
        });
    }

    report.no_errors = run.no_errors;
    let mut retained_restore_point = None;
    match run.restore_point.take() {
        Some(point) if run.no_errors => {
            run.enter(RunPhase::Committing);
            match backup.discard(&point) {
                Ok(()) => debug!(location = %point.location, "restore point discarded"),
                Err(err) => {
                    warn!(
                        location = %point.location,
                        error = %err,
                        "could not discard restore point; retained"
                    );
                    report.backup_location = Some(point.location.clone());
                    retained_restore_point = Some(point);
                }
            }
        }
        Some(point) => {
            run.enter(RunPhase::RetainingBackup);
            warn!(
                location = %point.location,
                "import encountered errors; restore point retained"
            );
            report.backup_location = Some(point.location.clone());
            retained_restore_point = Some(point);
        }
        None if !run.no_errors => warn!("import encountered errors; no restore point was taken"),
        None => {}
    }

    run.enter(RunPhase::Done);
    report.ended_at = Some(Utc::now());

    Ok(ImportOutcome {
        report,
        retained_restore_point,
    })
}

/// Import every bucket in order, then prune. Item failures are recorded in
/// `report`; only store failures return early.
fn apply_document(
    doc: &Map<String, Value>,
    registry: &ProcessorRegistry,
    store: &mut dyn SchemaStore,
    run: &mut PipelineRun,
    report: &mut ImportReport,
) -> Result<(), ImportError> {
    for bucket in Bucket::IMPORT_ORDER {
        let Some(Value::Array(items)) = doc.get(bucket.key()) else {
            continue;
        };
        let Some(processor) = registry.get(bucket) else {
            warn!(bucket = %bucket, "no processor registered; bucket skipped");
            continue;
        };

        let mut results = Vec::with_capacity(items.len());
        for raw in items {
            let result = import_item(run, report, processor, store, bucket, raw)?;
            report.summary.attempted += 1;
            if result.success {
                report.summary.succeeded += 1;
            } else {
                report.summary.failed += 1;
                run.no_errors = false;
            }
            results.push(result);
        }
        info!(
            bucket = %bucket,
            items = results.len(),
            failed = results.iter().filter(|r| !r.success).count(),
            "bucket imported"
        );
        report.results.insert(bucket, results);
    }

    if is_list(doc, Bucket::Sections) && is_list(doc, Bucket::EntryTypes) {
        run.enter(RunPhase::PostProcessing);
        prune_entry_types(run, report, store)?;
    }
    Ok(())
}

fn import_item(
    run: &mut PipelineRun,
    report: &mut ImportReport,
    processor: &dyn Processor,
    store: &mut dyn SchemaStore,
    bucket: Bucket,
    raw: &Value,
) -> Result<ImportResult, ImportError> {
    let mut fragment = match (bucket, raw) {
        (Bucket::FieldGroups, name) => {
            let mut map = Map::new();
            map.insert("name".to_string(), name.clone());
            map
        }
        (_, Value::Object(map)) => map.clone(),
        (_, other) => {
            return Ok(ImportResult {
                item: other.clone(),
                success: false,
                errors: error_map("item", "Item must be a mapping."),
            });
        }
    };

    run.enter(RunPhase::Parsing(bucket));
    let parsed = processor.parse(&*store, &fragment)?;
    for miss in &parsed.permission_misses {
        warn!(permission = %miss.permission, reason = %miss.reason, "permission left unresolved");
        report
            .diagnostics
            .push(format!("{}: {}", miss.permission, miss.reason));
    }
    let mut draft = parsed.draft;
    let mut errors = parsed.errors;

    let section_handle = fragment
        .get("sectionHandle")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if bucket == Bucket::EntryTypes && !run.successful_sections.contains(&section_handle) {
        fragment
            .entry("name")
            .or_insert_with(|| Value::String(String::new()));
        fragment
            .entry("handle")
            .or_insert_with(|| Value::String(section_handle.clone()));
        draft = None;
        errors = error_map(
            "parent",
            format!("Section parent \"{section_handle}\" was not imported successfully."),
        );
    }

    let Some(draft) = draft else {
        debug!(bucket = %bucket, ?errors, "item not saved");
        return Ok(ImportResult {
            item: Value::Object(fragment),
            success: false,
            errors,
        });
    };

    run.enter(RunPhase::Saving(bucket));
    let outcome = processor.save(store, draft.clone())?;
    let success = outcome.is_success();

    let errors = if bucket == Bucket::Sections {
        let mut merged = ErrorMap::new();
        for site_errors in outcome.site_settings_errors {
            merge_errors(&mut merged, site_errors);
        }
        merge_errors(&mut merged, outcome.errors);
        merged
    } else {
        outcome.errors
    };

    let item = match outcome.object {
        Some(object) => {
            if success {
                match bucket {
                    Bucket::Sections => run
                        .successful_sections
                        .push(object.natural_handle().to_string()),
                    Bucket::EntryTypes => run
                        .added_entry_types
                        .push(format!("{section_handle}:{}", object.natural_handle())),
                    _ => {}
                }
            }
            serde_json::to_value(object).context("serialize saved object")?
        }
        None => serde_json::to_value(draft).context("serialize draft")?,
    };

    Ok(ImportResult {
        item,
        success,
        errors,
    })
}

/// Delete live entry types of each successful section that this run did not declare.
fn prune_entry_types(
    run: &PipelineRun,
    report: &mut ImportReport,
    store: &mut dyn SchemaStore,
) -> anyhow::Result<()> {
    for handle in &run.successful_sections {
        let Some(section) = store.find_by_handle(ObjectKind::Section, handle)? else {
            continue;
        };
        for entry_type in store.entry_types(&section.uid)? {
            let pair = format!("{handle}:{}", entry_type.natural_handle());
            if run.added_entry_types.contains(&pair) {
                continue;
            }
            store
                .delete_entry_type(&entry_type.uid)
                .with_context(|| format!("delete entry type {pair}"))?;
            info!(entry_type = %pair, "pruned undeclared entry type");
            report.pruned_entry_types.push(pair);
            report.summary.pruned += 1;
        }
    }
    Ok(())
}

/// Write `results.json` and `results.md` to the output directory.
pub fn write_import_artifacts(
    outcome: &ImportOutcome,
    out_dir: &camino::Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let json = serde_json::to_string_pretty(&outcome.report).context("serialize report")?;
    writer.write_file(&out_dir.join("results.json"), json.as_bytes())?;

    #[cfg(feature = "reporting")]
    {
        let md = architect_render::render_import_md(&outcome.report);
        writer.write_file(&out_dir.join("results.md"), md.as_bytes())?;
    }

    Ok(())
}

/// Outcome of `run_export`.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub document: Map<String, Value>,
}

impl ExportOutcome {
    pub fn render(&self, format: DocumentFormat) -> anyhow::Result<String> {
        match format {
            DocumentFormat::Yaml => {
                serde_yaml::to_string(&self.document).context("serialize export as YAML")
            }
            DocumentFormat::Json | DocumentFormat::Auto => {
                serde_json::to_string_pretty(&self.document).context("serialize export as JSON")
            }
        }
    }

    pub fn count(&self, bucket: Bucket) -> usize {
        self.document
            .get(bucket.key())
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

/// Serialize the live schema into a document `run_import` accepts.
pub fn run_export(
    settings: &ExportSettings,
    registry: &ProcessorRegistry,
    store: &dyn SchemaStore,
) -> anyhow::Result<ExportOutcome> {
    let mut document = Map::new();
    document.insert(
        "schema".to_string(),
        Value::String(architect_types::schema::ARCHITECT_EXPORT_V1.to_string()),
    );

    for bucket in Bucket::IMPORT_ORDER {
        if !settings.buckets.contains(&bucket) {
            continue;
        }
        let Some(processor) = registry.get(bucket) else {
            continue;
        };
        let objects = store
            .list(processor.kind())
            .with_context(|| format!("list {}", processor.kind()))?;
        let mut items = Vec::with_capacity(objects.len());
        for object in &objects {
            items.push(
                processor
                    .export(store, object)
                    .with_context(|| format!("export {} {}", object.kind, object.uid))?,
            );
        }
        debug!(bucket = %bucket, items = items.len(), "bucket exported");
        document.insert(bucket.key().to_string(), Value::Array(items));
    }

    Ok(ExportOutcome { document })
}
