//! In-memory `SchemaStore`, used for tests and as the state behind the
//! file-backed store in `architect-core`.

use crate::ports::SchemaStore;
use architect_types::kind::ObjectKind;
use architect_types::layout::{FieldLayout, LayoutField, LayoutTab};
use architect_types::object::{ErrorMap, SaveOutcome, SchemaDraft, SchemaObject};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {uid} not found")]
    NotFound { kind: ObjectKind, uid: String },
}

const SECTION_TYPES: &[&str] = &["channel", "structure", "single"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySchemaStore {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    objects: Vec<SchemaObject>,
}

impl MemorySchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert without validation. Used to seed existing state.
    pub fn insert(&mut self, draft: SchemaDraft) -> SchemaObject {
        let object = SchemaObject::from_draft(draft, self.allocate_id(), Uuid::new_v4().to_string());
        self.objects.push(object.clone());
        object
    }

    pub fn objects(&self) -> &[SchemaObject] {
        &self.objects
    }

    fn allocate_id(&mut self) -> u64 {
        let floor = self.objects.iter().map(|o| o.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(floor) + 1;
        self.next_id
    }

    fn matches_handle(object: &SchemaObject, kind: ObjectKind, handle: &str) -> bool {
        object.kind == kind
            && if kind.is_named_only() {
                object.name == handle
            } else {
                object.handle.as_deref() == Some(handle)
            }
    }

    /// Position of the object a draft would overwrite.
    fn existing_index(&self, draft: &SchemaDraft) -> Option<usize> {
        let handle = draft.natural_handle();
        self.objects.iter().position(|o| {
            Self::matches_handle(o, draft.kind, handle)
                && (draft.kind != ObjectKind::EntryType || o.parent_uid == draft.parent_uid)
        })
    }

    fn exists(&self, kind: ObjectKind, uid: &str) -> bool {
        self.objects.iter().any(|o| o.kind == kind && o.uid == uid)
    }

    fn validate(&self, draft: &SchemaDraft) -> (ErrorMap, Vec<ErrorMap>) {
        let mut errors = ErrorMap::new();
        let mut push = |key: &str, message: String| {
            errors.entry(key.to_string()).or_default().push(message);
        };

        if draft.name.trim().is_empty() {
            push("name", "Name cannot be blank.".to_string());
        }

        if !draft.kind.is_named_only() {
            match draft.handle.as_deref() {
                None | Some("") => push("handle", "Handle cannot be blank.".to_string()),
                Some(handle) if !is_valid_handle(handle) => {
                    push("handle", format!("\"{handle}\" isn't a valid handle."))
                }
                Some(_) => {}
            }
        }

        match (draft.kind, draft.parent_uid.as_deref()) {
            (ObjectKind::Field, None) => push("group", "Field group cannot be blank.".to_string()),
            (ObjectKind::Field, Some(uid)) if !self.exists(ObjectKind::FieldGroup, uid) => {
                push("group", "Field group does not exist.".to_string())
            }
            (ObjectKind::EntryType, None) => push("section", "Section cannot be blank.".to_string()),
            (ObjectKind::EntryType, Some(uid)) if !self.exists(ObjectKind::Section, uid) => {
                push("section", "Section does not exist.".to_string())
            }
            _ => {}
        }

        if draft.kind == ObjectKind::Field && setting_str(draft, "type").is_none() {
            push("type", "Type cannot be blank.".to_string());
        }

        if draft.kind == ObjectKind::Section
            && let Some(section_type) = draft.settings.get("type")
            && !section_type
                .as_str()
                .is_some_and(|t| SECTION_TYPES.contains(&t))
        {
            push("type", "Section type is invalid.".to_string());
        }

        let site_errors = draft
            .site_settings
            .iter()
            .map(|site| {
                let mut errors = ErrorMap::new();
                if site.site_uid.is_none() {
                    errors
                        .entry("siteId".to_string())
                        .or_default()
                        .push("Site cannot be blank.".to_string());
                }
                let has_urls = site.settings.get("hasUrls").and_then(Value::as_bool) == Some(true);
                let uri_format = site
                    .settings
                    .get("uriFormat")
                    .and_then(Value::as_str)
                    .unwrap_or("");
                if has_urls && uri_format.trim().is_empty() {
                    errors
                        .entry("uriFormat".to_string())
                        .or_default()
                        .push("Entry URI Format cannot be blank.".to_string());
                }
                errors
            })
            .collect();

        (errors, site_errors)
    }
}

fn setting_str<'a>(draft: &'a SchemaDraft, key: &str) -> Option<&'a str> {
    draft
        .settings
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn is_valid_handle(handle: &str) -> bool {
    let mut chars = handle.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl SchemaStore for MemorySchemaStore {
    fn find_by_handle(
        &self,
        kind: ObjectKind,
        handle: &str,
    ) -> anyhow::Result<Option<SchemaObject>> {
        Ok(self
            .objects
            .iter()
            .find(|o| Self::matches_handle(o, kind, handle))
            .cloned())
    }

    fn find_by_uid(&self, kind: ObjectKind, uid: &str) -> anyhow::Result<Option<SchemaObject>> {
        Ok(self
            .objects
            .iter()
            .find(|o| o.kind == kind && o.uid == uid)
            .cloned())
    }

    fn find_by_id(&self, kind: ObjectKind, id: u64) -> anyhow::Result<Option<SchemaObject>> {
        Ok(self
            .objects
            .iter()
            .find(|o| o.kind == kind && o.id == id)
            .cloned())
    }

    fn list(&self, kind: ObjectKind) -> anyhow::Result<Vec<SchemaObject>> {
        Ok(self
            .objects
            .iter()
            .filter(|o| o.kind == kind)
            .cloned()
            .collect())
    }

    fn assemble_field_layout(
        &self,
        tabs: &[(String, Vec<String>)],
        required: &[String],
    ) -> anyhow::Result<FieldLayout> {
        let mut layout = FieldLayout::default();
        for (index, (name, uids)) in tabs.iter().enumerate() {
            let mut fields = Vec::new();
            for uid in uids {
                let Some(field) = self.find_by_uid(ObjectKind::Field, uid)? else {
                    continue;
                };
                fields.push(LayoutField {
                    uid: field.uid.clone(),
                    handle: field.natural_handle().to_string(),
                    required: required.contains(uid),
                });
            }
            layout.tabs.push(LayoutTab {
                name: name.clone(),
                sort_order: index as i64 + 1,
                fields,
            });
        }
        Ok(layout)
    }

    fn save(&mut self, draft: SchemaDraft) -> anyhow::Result<SaveOutcome> {
        let (errors, site_settings_errors) = self.validate(&draft);
        if !errors.is_empty() || site_settings_errors.iter().any(|e| !e.is_empty()) {
            debug!(kind = %draft.kind, handle = draft.natural_handle(), "validation failed");
            return Ok(SaveOutcome::rejected(errors, site_settings_errors));
        }

        let object = match self.existing_index(&draft) {
            Some(index) => {
                let current = &self.objects[index];
                let updated = SchemaObject::from_draft(draft, current.id, current.uid.clone());
                self.objects[index] = updated.clone();
                updated
            }
            None => {
                let id = self.allocate_id();
                let created = SchemaObject::from_draft(draft, id, Uuid::new_v4().to_string());
                self.objects.push(created.clone());
                created
            }
        };

        Ok(SaveOutcome {
            object: Some(object),
            errors: ErrorMap::new(),
            site_settings_errors,
        })
    }

    fn entry_types(&self, section_uid: &str) -> anyhow::Result<Vec<SchemaObject>> {
        Ok(self
            .objects
            .iter()
            .filter(|o| o.kind == ObjectKind::EntryType && o.parent_uid.as_deref() == Some(section_uid))
            .cloned()
            .collect())
    }

    fn delete_entry_type(&mut self, uid: &str) -> anyhow::Result<()> {
        let index = self
            .objects
            .iter()
            .position(|o| o.kind == ObjectKind::EntryType && o.uid == uid)
            .ok_or_else(|| StoreError::NotFound {
                kind: ObjectKind::EntryType,
                uid: uid.to_string(),
            })?;
        self.objects.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_types::object::SiteSettings;
    use pretty_assertions::assert_eq;

    fn section(handle: &str) -> SchemaDraft {
        SchemaDraft::new(ObjectKind::Section)
            .with_handle(handle)
            .with_name(handle)
    }

    #[test]
    fn save_creates_then_updates_in_place() {
        let mut store = MemorySchemaStore::new();
        let first = store.save(section("blog")).unwrap();
        assert!(first.is_success());
        let created = first.object.unwrap();

        let second = store.save(section("blog").with_name("Blog")).unwrap();
        let updated = second.object.unwrap();

        assert_eq!(updated.uid, created.uid);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Blog");
        assert_eq!(store.list(ObjectKind::Section).unwrap().len(), 1);
    }

    #[test]
    fn save_rejects_blank_handle_and_name() {
        let mut store = MemorySchemaStore::new();
        let outcome = store.save(SchemaDraft::new(ObjectKind::Section)).unwrap();
        assert!(!outcome.is_success());
        assert!(outcome.errors.contains_key("handle"));
        assert!(outcome.errors.contains_key("name"));
        assert!(store.objects().is_empty());
    }

    #[test]
    fn save_reports_site_settings_errors_per_entry() {
        let mut store = MemorySchemaStore::new();
        let mut draft = section("news");
        draft.site_settings.push(SiteSettings {
            site_uid: None,
            settings: serde_json::json!({"hasUrls": true})
                .as_object()
                .cloned()
                .unwrap(),
        });
        let outcome = store.save(draft).unwrap();
        assert!(!outcome.is_success());
        assert_eq!(outcome.site_settings_errors.len(), 1);
        assert!(outcome.site_settings_errors[0].contains_key("siteId"));
        assert!(outcome.site_settings_errors[0].contains_key("uriFormat"));
    }

    #[test]
    fn entry_type_handles_are_scoped_to_their_section() {
        let mut store = MemorySchemaStore::new();
        let blog = store.insert(section("blog"));
        let news = store.insert(section("news"));

        let et = |parent: &str| {
            SchemaDraft::new(ObjectKind::EntryType)
                .with_handle("article")
                .with_name("Article")
                .with_parent(parent)
        };
        assert!(store.save(et(&blog.uid)).unwrap().is_success());
        assert!(store.save(et(&news.uid)).unwrap().is_success());

        assert_eq!(store.entry_types(&blog.uid).unwrap().len(), 1);
        assert_eq!(store.entry_types(&news.uid).unwrap().len(), 1);
    }

    #[test]
    fn folders_are_found_by_name() {
        let mut store = MemorySchemaStore::new();
        let folder = store.insert(SchemaDraft::new(ObjectKind::Folder).with_name("Uploads"));
        let found = store.find_by_handle(ObjectKind::Folder, "Uploads").unwrap();
        assert_eq!(found.map(|f| f.uid), Some(folder.uid));
    }

    #[test]
    fn delete_missing_entry_type_is_an_error() {
        let mut store = MemorySchemaStore::new();
        let err = store.delete_entry_type("nope").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn ids_keep_increasing_after_reload() {
        let mut store = MemorySchemaStore::new();
        store.insert(section("a"));
        store.insert(section("b"));
        let json = serde_json::to_string(&store).unwrap();
        let mut reloaded: MemorySchemaStore = serde_json::from_str(&json).unwrap();
        let c = reloaded.insert(section("c"));
        assert_eq!(c.id, 3);
    }
}
