use super::{ParseOutcome, Processor, base_draft, export_head, remainder};
use crate::codec::ReferenceCodec;
use crate::layout::{FieldLayoutAssembler, export_field_layout, export_required_fields};
use crate::ports::SchemaStore;
use crate::sanitize::strip_nulls;
use architect_types::kind::ObjectKind;
use architect_types::object::{SchemaObject, SiteSettings};
use architect_types::report::Bucket;
use serde_json::{Map, Value};

const CONSUMED: &[&str] = &["name", "handle", "siteSettings", "fieldLayout", "requiredFields"];

pub struct SectionProcessor;

impl Processor for SectionProcessor {
    fn bucket(&self) -> Bucket {
        Bucket::Sections
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Section
    }

    fn parse(
        &self,
        store: &dyn SchemaStore,
        item: &Map<String, Value>,
    ) -> anyhow::Result<ParseOutcome> {
        let mut item = item.clone();
        strip_nulls(&mut item);

        let codec = ReferenceCodec::new(store);
        let mut draft = base_draft(ObjectKind::Section, &item);

        if let Some(Value::Array(sites)) = item.get("siteSettings") {
            for site in sites {
                let Value::Object(site) = site else {
                    continue;
                };
                let site_uid = match site.get("siteId") {
                    Some(handle) => codec.map_sites(handle, "", false)?,
                    None => Value::Null,
                };
                draft.site_settings.push(SiteSettings {
                    site_uid: site_uid.as_str().map(str::to_string),
                    settings: remainder(site, &["siteId"]),
                });
            }
        }

        if item.contains_key("fieldLayout") {
            draft.field_layout = Some(FieldLayoutAssembler::new(store).assemble(&item, "section")?);
        }

        draft.settings = remainder(&item, CONSUMED);
        Ok(ParseOutcome::ok(draft))
    }

    fn export(&self, store: &dyn SchemaStore, object: &SchemaObject) -> anyhow::Result<Value> {
        let codec = ReferenceCodec::new(store);
        let mut out = export_head(object);
        out.extend(object.settings.clone());

        if !object.site_settings.is_empty() {
            let mut sites = Vec::with_capacity(object.site_settings.len());
            for site in &object.site_settings {
                let mut entry = Map::new();
                let handle = match &site.site_uid {
                    Some(uid) => codec.unmap_sites(&Value::String(uid.clone()))?,
                    None => Value::Null,
                };
                entry.insert("siteId".to_string(), handle);
                entry.extend(site.settings.clone());
                sites.push(Value::Object(entry));
            }
            out.insert("siteSettings".to_string(), Value::Array(sites));
        }

        if let Some(layout) = object.field_layout.as_ref().filter(|l| !l.is_empty()) {
            out.insert("fieldLayout".to_string(), Value::Object(export_field_layout(layout)));
            out.insert(
                "requiredFields".to_string(),
                Value::from(export_required_fields(layout)),
            );
        }

        Ok(Value::Object(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySchemaStore;
    use architect_types::object::SchemaDraft;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn site_store() -> (MemorySchemaStore, String) {
        let mut store = MemorySchemaStore::new();
        let site = store.insert(
            SchemaDraft::new(ObjectKind::Site)
                .with_handle("default")
                .with_name("Default"),
        );
        (store, site.uid)
    }

    #[test]
    fn parse_maps_site_handles() {
        let (store, site_uid) = site_store();
        let item = json!({
            "name": "Blog",
            "handle": "blog",
            "type": "channel",
            "maxLevels": null,
            "siteSettings": [
                {"siteId": "default", "hasUrls": true, "uriFormat": "blog/{slug}"},
                {"siteId": "missing"},
            ],
        });

        let outcome = SectionProcessor
            .parse(&store, item.as_object().unwrap())
            .unwrap();
        let draft = outcome.draft.unwrap();

        assert_eq!(draft.handle.as_deref(), Some("blog"));
        assert_eq!(draft.site_settings[0].site_uid.as_deref(), Some(site_uid.as_str()));
        assert_eq!(draft.site_settings[1].site_uid, None);
        assert_eq!(
            Value::Object(draft.settings),
            json!({"type": "channel", "maxLevels": null})
        );
    }

    #[test]
    fn export_round_trips_through_parse() {
        let (mut store, _) = site_store();
        let item = json!({
            "name": "News",
            "handle": "news",
            "type": "channel",
            "siteSettings": [{"siteId": "default", "hasUrls": false}],
        });
        let draft = SectionProcessor
            .parse(&store, item.as_object().unwrap())
            .unwrap()
            .draft
            .unwrap();
        let saved = store.save(draft).unwrap().object.unwrap();

        let exported = SectionProcessor.export(&store, &saved).unwrap();
        assert_eq!(exported, item);
    }
}
