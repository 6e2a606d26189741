//! Property-based tests for field-layout assembly.

use architect_domain::{
    FieldLayoutAssembler, MemorySchemaStore, SchemaStore, export_field_layout,
    export_required_fields,
};
use architect_types::kind::ObjectKind;
use architect_types::object::SchemaDraft;
use proptest::prelude::*;
use serde_json::{Map, Value, json};

fn arb_layout() -> impl Strategy<Value = (Vec<(String, Vec<String>)>, Vec<String>)> {
    let handle = r"f[a-z]{1,5}";
    (
        prop::collection::vec(
            (r"Tab[A-Z][a-z]{0,4}", prop::collection::vec(handle, 0..5)),
            0..4,
        ),
        prop::collection::vec(handle, 0..6),
    )
}

fn store_with(handles: impl IntoIterator<Item = String>) -> MemorySchemaStore {
    let mut store = MemorySchemaStore::new();
    let group = store.insert(SchemaDraft::new(ObjectKind::FieldGroup).with_name("All"));
    for handle in handles {
        if store
            .find_by_handle(ObjectKind::Field, &handle)
            .unwrap()
            .is_some()
        {
            continue;
        }
        store.insert(
            SchemaDraft::new(ObjectKind::Field)
                .with_handle(&handle)
                .with_name(&handle)
                .with_parent(&group.uid),
        );
    }
    store
}

proptest! {
    #[test]
    fn required_fields_are_a_subset_of_tab_fields(
        (tabs, required) in arb_layout(),
        known_mask in prop::collection::vec(any::<bool>(), 16),
    ) {
        // Only some of the declared handles exist in the store.
        let all: Vec<String> = tabs
            .iter()
            .flat_map(|(_, fields)| fields.iter().cloned())
            .chain(required.iter().cloned())
            .collect();
        let known: Vec<String> = all
            .iter()
            .enumerate()
            .filter(|(i, _)| known_mask[i % known_mask.len()])
            .map(|(_, h)| h.clone())
            .collect();
        let store = store_with(known);

        let mut declared = Map::new();
        for (name, fields) in &tabs {
            declared.insert(name.clone(), json!(fields));
        }
        let mut item = Map::new();
        item.insert("fieldLayout".to_string(), Value::Object(declared));
        item.insert("requiredFields".to_string(), json!(required));

        let layout = FieldLayoutAssembler::new(&store).assemble(&item, "entryType").unwrap();

        let in_tabs: Vec<&str> = layout.field_uids().collect();
        for uid in layout.required_uids() {
            prop_assert!(in_tabs.contains(&uid));
        }
        for handle in export_required_fields(&layout) {
            prop_assert!(required.contains(&handle));
        }
    }

    #[test]
    fn tab_order_survives_export((tabs, _) in arb_layout()) {
        let store = store_with(tabs.iter().flat_map(|(_, f)| f.iter().cloned()));

        let mut declared = Map::new();
        for (name, fields) in &tabs {
            declared.insert(name.clone(), json!(fields));
        }
        let expected_order: Vec<String> = declared.keys().cloned().collect();
        let mut item = Map::new();
        item.insert("fieldLayout".to_string(), Value::Object(declared.clone()));

        let layout = FieldLayoutAssembler::new(&store).assemble(&item, "section").unwrap();
        let exported = export_field_layout(&layout);

        prop_assert_eq!(exported.keys().cloned().collect::<Vec<_>>(), expected_order);
        prop_assert_eq!(Value::Object(exported), Value::Object(declared));
    }
}
