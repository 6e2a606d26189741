//! Domain logic: resolve declarative references against a live schema and
//! turn fragments into store drafts.
//!
//! This crate owns *what* a fragment means. It does not own *when* things
//! are imported or how restore points are kept; that's `architect-core`.

mod codec;
mod layout;
mod permissions;
mod ports;
pub mod processors;
mod sanitize;
mod store;

pub use codec::ReferenceCodec;
pub use layout::{FieldLayoutAssembler, export_field_layout, export_required_fields, map_type_settings};
pub use permissions::{MissReason, PermissionMiss, PermissionResolver, PermissionTarget};
pub use ports::SchemaStore;
pub use processors::{ParseOutcome, Processor, ProcessorRegistry};
pub use sanitize::{ALLOWED_NULLS, strip_nulls};
pub use store::{MemorySchemaStore, StoreError};
