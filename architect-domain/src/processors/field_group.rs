use super::{ParseOutcome, Processor, str_field};
use crate::ports::SchemaStore;
use architect_types::kind::ObjectKind;
use architect_types::object::{SchemaDraft, SchemaObject};
use architect_types::report::Bucket;
use serde_json::{Map, Value};

/// Field groups are declared as bare names; the pipeline wraps each one as
/// `{"name": ...}` before parsing.
pub struct FieldGroupProcessor;

impl Processor for FieldGroupProcessor {
    fn bucket(&self) -> Bucket {
        Bucket::FieldGroups
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::FieldGroup
    }

    fn parse(&self, _: &dyn SchemaStore, item: &Map<String, Value>) -> anyhow::Result<ParseOutcome> {
        let name = str_field(item, "name").unwrap_or_default();
        Ok(ParseOutcome::ok(SchemaDraft::new(ObjectKind::FieldGroup).with_name(name)))
    }

    fn export(&self, _: &dyn SchemaStore, object: &SchemaObject) -> anyhow::Result<Value> {
        Ok(Value::String(object.name.clone()))
    }
}
