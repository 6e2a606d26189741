use super::{ParseOutcome, Processor, base_draft, export_head, remainder, str_field};
use crate::codec::ReferenceCodec;
use crate::layout::map_type_settings;
use crate::ports::SchemaStore;
use crate::sanitize::strip_nulls;
use architect_types::kind::{ObjectKind, RefKind};
use architect_types::object::{SchemaObject, error_map};
use architect_types::report::Bucket;
use serde_json::{Map, Value};

const CONSUMED: &[&str] = &["name", "handle", "group"];

/// Asset upload locations are always asset references.
const UPLOAD_SOURCE_KEYS: &[&str] = &["defaultUploadLocationSource", "singleUploadLocationSource"];

/// Reference kind implied by a field type, judged by the last segment of
/// its class name (`craft\fields\Entries` -> `entries`).
fn expected_kind(field_type: &str) -> Option<RefKind> {
    let short = field_type
        .rsplit(['\\', '/', ':'])
        .next()
        .unwrap_or(field_type)
        .to_ascii_lowercase();
    match short.as_str() {
        "entries" => Some(RefKind::Section),
        "assets" => Some(RefKind::Asset),
        "categories" => Some(RefKind::Group),
        "tags" => Some(RefKind::TagGroup),
        "users" => Some(RefKind::Group),
        _ => None,
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Map,
    Unmap,
}

/// Translate the reference-carrying keys of a field's type settings, then
/// recurse into nested block-type fields.
fn translate_type_settings(
    codec: &ReferenceCodec<'_>,
    field_type: Option<&str>,
    settings: &mut Map<String, Value>,
    direction: Direction,
) -> anyhow::Result<()> {
    let expected = field_type.and_then(expected_kind);

    for key in ["sources", "source"] {
        if let (Some(kind), Some(value)) = (&expected, settings.get(key)) {
            let translated = match direction {
                Direction::Map => codec.map(value, kind, true)?,
                Direction::Unmap => codec.unmap(value, Some(kind))?,
            };
            settings.insert(key.to_string(), translated);
        }
    }

    for key in UPLOAD_SOURCE_KEYS {
        if let Some(value) = settings.get(*key) {
            let translated = match direction {
                Direction::Map => codec.map(value, &RefKind::Asset, true)?,
                Direction::Unmap => codec.unmap(value, Some(&RefKind::Asset))?,
            };
            settings.insert((*key).to_string(), translated);
        }
    }

    if let Some(value) = settings.get("targetSiteId").filter(|v| !v.is_null()) {
        let translated = match direction {
            Direction::Map => codec.map_sites(value, "", false)?,
            Direction::Unmap => codec.unmap_sites(value)?,
        };
        settings.insert("targetSiteId".to_string(), translated);
    }

    if let Some(Value::Array(block_types)) = settings.get_mut("blockTypes") {
        for block_type in block_types.iter_mut() {
            let Some(Value::Array(fields)) = block_type.get_mut("fields") else {
                continue;
            };
            for field in fields.iter_mut() {
                let nested_type = field.get("type").and_then(Value::as_str).map(str::to_string);
                if let Some(Value::Object(nested)) = field.get_mut("typesettings") {
                    translate_type_settings(codec, nested_type.as_deref(), nested, direction)?;
                }
            }
        }
    }

    Ok(())
}

pub struct FieldProcessor;

impl Processor for FieldProcessor {
    fn bucket(&self) -> Bucket {
        Bucket::Fields
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Field
    }

    fn parse(
        &self,
        store: &dyn SchemaStore,
        item: &Map<String, Value>,
    ) -> anyhow::Result<ParseOutcome> {
        let mut item = item.clone();
        strip_nulls(&mut item);

        let mut draft = base_draft(ObjectKind::Field, &item);

        let Some(group_name) = str_field(&item, "group") else {
            return Ok(ParseOutcome::failed(error_map(
                "group",
                "Field group cannot be blank.",
            )));
        };
        match store.find_by_handle(ObjectKind::FieldGroup, group_name)? {
            Some(group) => draft.parent_uid = Some(group.uid),
            None => {
                return Ok(ParseOutcome::failed(error_map(
                    "group",
                    format!("Field group \"{group_name}\" does not exist."),
                )));
            }
        }

        let mut settings = remainder(&item, CONSUMED);
        let field_type = settings.get("type").and_then(Value::as_str).map(str::to_string);
        if let Some(Value::Object(type_settings)) = settings.get_mut("typesettings") {
            map_type_settings(type_settings);
            let codec = ReferenceCodec::new(store);
            translate_type_settings(&codec, field_type.as_deref(), type_settings, Direction::Map)?;
        }
        draft.settings = settings;

        Ok(ParseOutcome::ok(draft))
    }

    fn export(&self, store: &dyn SchemaStore, object: &SchemaObject) -> anyhow::Result<Value> {
        let mut out = export_head(object);

        if let Some(parent) = &object.parent_uid
            && let Some(group) = store.find_by_uid(ObjectKind::FieldGroup, parent)?
        {
            out.insert("group".to_string(), Value::String(group.name));
        }

        let mut settings = object.settings.clone();
        let field_type = settings.get("type").and_then(Value::as_str).map(str::to_string);
        if let Some(Value::Object(type_settings)) = settings.get_mut("typesettings") {
            let codec = ReferenceCodec::new(store);
            translate_type_settings(&codec, field_type.as_deref(), type_settings, Direction::Unmap)?;
        }
        out.extend(settings);

        Ok(Value::Object(out))
    }
}
