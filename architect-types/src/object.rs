use crate::kind::ObjectKind;
use crate::layout::FieldLayout;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Validation messages keyed by attribute name.
pub type ErrorMap = BTreeMap<String, Vec<String>>;

/// Merge `from` into `into`, keeping every message and appending per key.
pub fn merge_errors(into: &mut ErrorMap, from: ErrorMap) {
    for (key, mut messages) in from {
        into.entry(key).or_default().append(&mut messages);
    }
}

/// Build a single-message error map.
pub fn error_map(key: &str, message: impl Into<String>) -> ErrorMap {
    let mut errors = ErrorMap::new();
    errors.insert(key.to_string(), vec![message.into()]);
    errors
}

/// A schema object as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaObject {
    pub kind: ObjectKind,
    pub id: u64,
    pub uid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,

    pub name: String,

    /// UID of the owning object (section of an entry type, group of a field).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_uid: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub site_settings: Vec<SiteSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_layout: Option<FieldLayout>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub settings: Map<String, Value>,
}

impl SchemaObject {
    pub fn from_draft(draft: SchemaDraft, id: u64, uid: String) -> Self {
        Self {
            kind: draft.kind,
            id,
            uid,
            handle: draft.handle,
            name: draft.name,
            parent_uid: draft.parent_uid,
            site_settings: draft.site_settings,
            field_layout: draft.field_layout,
            settings: draft.settings,
        }
    }

    /// The handle, falling back to the display name for handle-less kinds.
    pub fn natural_handle(&self) -> &str {
        self.handle.as_deref().unwrap_or(&self.name)
    }
}

/// A parsed, not yet persisted schema object.
///
/// All references inside a draft are already in UID space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDraft {
    pub kind: ObjectKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_uid: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub site_settings: Vec<SiteSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_layout: Option<FieldLayout>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub settings: Map<String, Value>,
}

impl SchemaDraft {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            handle: None,
            name: String::new(),
            parent_uid: None,
            site_settings: Vec::new(),
            field_layout: None,
            settings: Map::new(),
        }
    }

    pub fn with_handle(mut self, handle: &str) -> Self {
        self.handle = Some(handle.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_parent(mut self, parent_uid: &str) -> Self {
        self.parent_uid = Some(parent_uid.to_string());
        self
    }

    pub fn natural_handle(&self) -> &str {
        self.handle.as_deref().unwrap_or(&self.name)
    }
}

/// Per-site configuration of a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    /// `None` when the declared site handle did not resolve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_uid: Option<String>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub settings: Map<String, Value>,
}

/// Result of persisting a draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    /// The persisted object; `None` when validation rejected the draft.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<SchemaObject>,

    #[serde(default)]
    pub errors: ErrorMap,

    /// One error map per entry of the draft's `site_settings`, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub site_settings_errors: Vec<ErrorMap>,
}

impl SaveOutcome {
    pub fn is_success(&self) -> bool {
        self.object.is_some()
            && self.errors.is_empty()
            && self.site_settings_errors.iter().all(|e| e.is_empty())
    }

    pub fn rejected(errors: ErrorMap, site_settings_errors: Vec<ErrorMap>) -> Self {
        Self {
            object: None,
            errors,
            site_settings_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn merge_errors_appends_messages_per_key() {
        let mut into = error_map("handle", "taken");
        let mut from = error_map("handle", "too long");
        from.insert("name".to_string(), vec!["blank".to_string()]);

        merge_errors(&mut into, from);

        assert_eq!(into["handle"], vec!["taken".to_string(), "too long".to_string()]);
        assert_eq!(into["name"], vec!["blank".to_string()]);
    }

    #[test]
    fn natural_handle_falls_back_to_name() {
        let mut draft = SchemaDraft::new(ObjectKind::FieldGroup);
        draft.name = "Common".to_string();
        assert_eq!(draft.natural_handle(), "Common");

        let object = SchemaObject::from_draft(draft, 1, "uid-1".to_string());
        assert_eq!(object.natural_handle(), "Common");
    }

    #[test]
    fn save_outcome_requires_object_and_no_errors() {
        assert!(!SaveOutcome::default().is_success());
        let rejected = SaveOutcome::rejected(error_map("name", "blank"), vec![]);
        assert!(!rejected.is_success());
    }
}
