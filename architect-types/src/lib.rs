//! Shared DTOs (schemas-as-code) for the architect workspace.
//!
//! # Design constraints
//! - Report types are serialized to disk and handed back to callers.
//! - Declarative fragments stay untyped (`serde_json::Map`); only the
//!   reference vocabulary and the materialized objects are typed here.
//! - Prefer adding optional fields over changing semantics.

pub mod kind;
pub mod layout;
pub mod object;
pub mod reference;
pub mod report;

/// Schema identifiers.
pub mod schema {
    pub const ARCHITECT_IMPORT_REPORT_V1: &str = "architect.import.v1";
    pub const ARCHITECT_EXPORT_V1: &str = "architect.export.v1";
}
