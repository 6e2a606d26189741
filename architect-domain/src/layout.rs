//! Field layouts: declarative `tab -> [field handle]` mappings in, store
//! layouts out, and back.

use crate::ports::SchemaStore;
use architect_types::kind::ObjectKind;
use architect_types::layout::FieldLayout;
use serde_json::{Map, Value};
use tracing::debug;

/// Attributes lifted out of a nested block-type field; everything else
/// becomes its type settings.
const LIFTED_FIELD_ATTRIBUTES: &[&str] = &["name", "handle", "instructions", "required", "type"];

pub struct FieldLayoutAssembler<'a> {
    store: &'a dyn SchemaStore,
}

impl<'a> FieldLayoutAssembler<'a> {
    pub fn new(store: &'a dyn SchemaStore) -> Self {
        Self { store }
    }

    /// Build the layout declared by an item's `fieldLayout` and
    /// `requiredFields` keys. Unresolved handles are dropped.
    pub fn assemble(&self, item: &Map<String, Value>, kind_tag: &str) -> anyhow::Result<FieldLayout> {
        let Some(Value::Object(declared)) = item.get("fieldLayout") else {
            return Ok(FieldLayout::empty(kind_tag));
        };

        let mut tabs = Vec::with_capacity(declared.len());
        for (tab, handles) in declared {
            let handles = handles.as_array().map(Vec::as_slice).unwrap_or(&[]);
            tabs.push((tab.clone(), self.resolve_handles(handles)?));
        }

        let required = match item.get("requiredFields") {
            Some(Value::Array(handles)) => self.resolve_handles(handles)?,
            _ => Vec::new(),
        };
        let required: Vec<String> = required
            .into_iter()
            .filter(|uid| tabs.iter().any(|(_, uids)| uids.contains(uid)))
            .collect();

        let mut layout = self.store.assemble_field_layout(&tabs, &required)?;
        layout.kind_tag = kind_tag.to_string();
        Ok(layout)
    }

    fn resolve_handles(&self, handles: &[Value]) -> anyhow::Result<Vec<String>> {
        let mut uids = Vec::with_capacity(handles.len());
        for handle in handles.iter().filter_map(Value::as_str) {
            match self.store.find_by_handle(ObjectKind::Field, handle)? {
                Some(field) => uids.push(field.uid),
                None => debug!(handle, "layout field not found"),
            }
        }
        Ok(uids)
    }
}

/// Tabs in ascending sort order; ties keep their stored order.
fn sorted_tabs(layout: &FieldLayout) -> Vec<&architect_types::layout::LayoutTab> {
    let mut tabs: Vec<_> = layout.tabs.iter().collect();
    tabs.sort_by_key(|t| t.sort_order);
    tabs
}

/// Flatten a layout to `tab name -> [field handle]`.
pub fn export_field_layout(layout: &FieldLayout) -> Map<String, Value> {
    sorted_tabs(layout)
        .into_iter()
        .map(|tab| {
            let handles = tab
                .fields
                .iter()
                .map(|f| Value::String(f.handle.clone()))
                .collect();
            (tab.name.clone(), Value::Array(handles))
        })
        .collect()
}

/// Handles of required fields in tab/field order.
pub fn export_required_fields(layout: &FieldLayout) -> Vec<String> {
    sorted_tabs(layout)
        .into_iter()
        .flat_map(|tab| tab.fields.iter())
        .filter(|f| f.required)
        .map(|f| f.handle.clone())
        .collect()
}

/// Restructure every `blockTypes[*].fields[*]` entry: the common field
/// attributes stay on top, the rest is merged over `typesettings`.
pub fn map_type_settings(item: &mut Map<String, Value>) {
    let Some(Value::Array(block_types)) = item.get_mut("blockTypes") else {
        return;
    };
    for block_type in block_types.iter_mut() {
        let Some(Value::Array(fields)) = block_type.get_mut("fields") else {
            continue;
        };
        for field in fields.iter_mut() {
            if let Value::Object(map) = field {
                *map = restructure_field(std::mem::take(map));
            }
        }
    }
}

fn restructure_field(mut field: Map<String, Value>) -> Map<String, Value> {
    let mut lifted = Map::new();
    for key in LIFTED_FIELD_ATTRIBUTES {
        if let Some(value) = field.remove(*key) {
            lifted.insert((*key).to_string(), value);
        }
    }
    let mut type_settings = match field.remove("typesettings") {
        Some(Value::Object(old)) => old,
        _ => Map::new(),
    };
    for (key, value) in field {
        type_settings.insert(key, value);
    }
    lifted.insert("typesettings".to_string(), Value::Object(type_settings));
    lifted
}
