use super::{ParseOutcome, Processor, base_draft, export_head, remainder, str_field};
use crate::layout::{FieldLayoutAssembler, export_field_layout, export_required_fields};
use crate::ports::SchemaStore;
use crate::sanitize::strip_nulls;
use architect_types::kind::ObjectKind;
use architect_types::object::{SchemaObject, error_map};
use architect_types::report::Bucket;
use serde_json::{Map, Value};

const CONSUMED: &[&str] = &["name", "handle", "sectionHandle", "fieldLayout", "requiredFields"];

pub struct EntryTypeProcessor;

impl Processor for EntryTypeProcessor {
    fn bucket(&self) -> Bucket {
        Bucket::EntryTypes
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::EntryType
    }

    fn parse(
        &self,
        store: &dyn SchemaStore,
        item: &Map<String, Value>,
    ) -> anyhow::Result<ParseOutcome> {
        let mut item = item.clone();
        strip_nulls(&mut item);

        let section_handle = str_field(&item, "sectionHandle").unwrap_or_default();
        let Some(section) = store.find_by_handle(ObjectKind::Section, section_handle)? else {
            return Ok(ParseOutcome::failed(error_map(
                "section",
                format!("Section \"{section_handle}\" does not exist."),
            )));
        };

        let mut draft = base_draft(ObjectKind::EntryType, &item).with_parent(&section.uid);
        draft.field_layout = Some(FieldLayoutAssembler::new(store).assemble(&item, "entryType")?);
        draft.settings = remainder(&item, CONSUMED);
        Ok(ParseOutcome::ok(draft))
    }

    fn export(&self, store: &dyn SchemaStore, object: &SchemaObject) -> anyhow::Result<Value> {
        let mut out = Map::new();
        if let Some(parent) = &object.parent_uid
            && let Some(section) = store.find_by_uid(ObjectKind::Section, parent)?
        {
            out.insert(
                "sectionHandle".to_string(),
                Value::String(section.natural_handle().to_string()),
            );
        }
        out.extend(export_head(object));
        out.extend(object.settings.clone());

        if let Some(layout) = &object.field_layout {
            out.insert("fieldLayout".to_string(), Value::Object(export_field_layout(layout)));
            out.insert(
                "requiredFields".to_string(),
                Value::from(export_required_fields(layout)),
            );
        }
        Ok(Value::Object(out))
    }
}
