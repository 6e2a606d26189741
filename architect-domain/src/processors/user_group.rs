use super::{ParseOutcome, Processor, base_draft, export_head, remainder};
use crate::permissions::PermissionResolver;
use crate::ports::SchemaStore;
use crate::sanitize::strip_nulls;
use architect_types::kind::ObjectKind;
use architect_types::object::SchemaObject;
use architect_types::report::Bucket;
use serde_json::{Map, Value};

const CONSUMED: &[&str] = &["name", "handle", "permissions"];

fn permission_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub struct UserGroupProcessor;

impl Processor for UserGroupProcessor {
    fn bucket(&self) -> Bucket {
        Bucket::UserGroups
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::UserGroup
    }

    fn parse(
        &self,
        store: &dyn SchemaStore,
        item: &Map<String, Value>,
    ) -> anyhow::Result<ParseOutcome> {
        let mut item = item.clone();
        strip_nulls(&mut item);

        let mut draft = base_draft(ObjectKind::UserGroup, &item);
        draft.settings = remainder(&item, CONSUMED);

        let mut permissions = permission_list(item.get("permissions"));
        let misses = PermissionResolver::new(store).map_permissions(&mut permissions);
        if item.contains_key("permissions") {
            draft
                .settings
                .insert("permissions".to_string(), Value::from(permissions));
        }

        Ok(ParseOutcome {
            draft: Some(draft),
            errors: Default::default(),
            permission_misses: misses,
        })
    }

    fn export(&self, store: &dyn SchemaStore, object: &SchemaObject) -> anyhow::Result<Value> {
        let mut out = export_head(object);
        let mut settings = object.settings.clone();
        if settings.contains_key("permissions") {
            let mut permissions = permission_list(settings.get("permissions"));
            PermissionResolver::new(store).unmap_permissions(&mut permissions);
            settings.insert("permissions".to_string(), Value::from(permissions));
        }
        out.extend(settings);
        Ok(Value::Object(out))
    }
}
