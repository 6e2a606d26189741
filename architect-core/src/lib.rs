//! Embeddable core library for architect.
//!
//! Provides clap-free, I/O-abstracted import and export entry points.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits:
//! - [`SchemaStore`] (from `architect-domain`): the live schema
//! - [`BackupPort`](ports::BackupPort): restore points taken before an import
//! - [`WritePort`](ports::WritePort): write result artifacts
//!
//! The [`adapters`] module provides filesystem-backed implementations.
//!
//! # Entry points
//!
//! - [`run_import`](pipeline::run_import): apply a declarative document
//! - [`run_export`](pipeline::run_export): serialize the live schema

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

// Re-export so embedders don't need architect-domain directly.
pub use architect_domain::{MemorySchemaStore, ProcessorRegistry, SchemaStore};
