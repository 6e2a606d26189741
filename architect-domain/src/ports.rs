use architect_types::kind::ObjectKind;
use architect_types::layout::FieldLayout;
use architect_types::object::{SaveOutcome, SchemaDraft, SchemaObject};

/// Access to the live schema.
///
/// Lookups return `Ok(None)` for a plain miss; `Err` is reserved for the
/// store itself being unavailable, which aborts an import.
pub trait SchemaStore {
    /// Find by handle. Kinds without handles (folders, field groups) match on name.
    fn find_by_handle(&self, kind: ObjectKind, handle: &str)
    -> anyhow::Result<Option<SchemaObject>>;

    fn find_by_uid(&self, kind: ObjectKind, uid: &str) -> anyhow::Result<Option<SchemaObject>>;

    fn find_by_id(&self, kind: ObjectKind, id: u64) -> anyhow::Result<Option<SchemaObject>>;

    /// All objects of a kind, in creation order.
    fn list(&self, kind: ObjectKind) -> anyhow::Result<Vec<SchemaObject>>;

    /// Build a layout from `(tab name, field uids)` pairs and the required field uids.
    fn assemble_field_layout(
        &self,
        tabs: &[(String, Vec<String>)],
        required: &[String],
    ) -> anyhow::Result<FieldLayout>;

    /// Persist a draft, creating it or updating the object with the same handle.
    fn save(&mut self, draft: SchemaDraft) -> anyhow::Result<SaveOutcome>;

    /// Live entry types of a section, in creation order.
    fn entry_types(&self, section_uid: &str) -> anyhow::Result<Vec<SchemaObject>>;

    fn delete_entry_type(&mut self, uid: &str) -> anyhow::Result<()>;
}
