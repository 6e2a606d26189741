use crate::object::ErrorMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Top-level bucket of a declarative document.
///
/// Variant order is the import order; `Ord` follows it so a `BTreeMap`
/// keyed by bucket serializes in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bucket {
    Sections,
    FieldGroups,
    Fields,
    EntryTypes,
    UserGroups,
}

impl Bucket {
    /// Fixed import order. Entry types reference sections and fields that
    /// must already exist; user-group permissions reference sections.
    pub const IMPORT_ORDER: [Bucket; 5] = [
        Bucket::Sections,
        Bucket::FieldGroups,
        Bucket::Fields,
        Bucket::EntryTypes,
        Bucket::UserGroups,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Bucket::Sections => "sections",
            Bucket::FieldGroups => "fieldGroups",
            Bucket::Fields => "fields",
            Bucket::EntryTypes => "entryTypes",
            Bucket::UserGroups => "userGroups",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// Outcome of importing one declarative item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    /// The persisted object, the parsed draft, or the raw fragment.
    pub item: Value,
    pub success: bool,
    #[serde(default)]
    pub errors: ErrorMap,
}

/// Snapshot taken before an import mutates anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestorePoint {
    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub pruned: u64,
}

/// Result document of an import run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    pub no_errors: bool,

    /// Location of the retained restore point; set only when the run failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_location: Option<String>,

    #[serde(default)]
    pub results: BTreeMap<Bucket, Vec<ImportResult>>,

    /// `sectionHandle:entryTypeHandle` of entry types removed during pruning.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pruned_entry_types: Vec<String>,

    /// Non-fatal problems that did not fail an item, e.g. unresolved
    /// permission targets.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,

    pub summary: ImportSummary,
}

impl ImportReport {
    pub fn new(tool: ToolInfo) -> Self {
        Self {
            schema: crate::schema::ARCHITECT_IMPORT_REPORT_V1.to_string(),
            tool,
            started_at: Utc::now(),
            ended_at: None,
            no_errors: true,
            backup_location: None,
            results: BTreeMap::new(),
            pruned_entry_types: Vec::new(),
            diagnostics: Vec::new(),
            summary: ImportSummary::default(),
        }
    }

    pub fn bucket(&self, bucket: Bucket) -> &[ImportResult] {
        self.results.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }
}
