//! Property-based tests for reference resolution.
//!
//! These tests verify that:
//! - `unmap(map(r)) == r` for every resolvable kind
//! - Collections keep the relative order of resolvable entries
//! - Unresolvable entries never survive as partial strings

use architect_domain::{MemorySchemaStore, ReferenceCodec};
use architect_types::kind::{ObjectKind, RefKind};
use architect_types::object::SchemaDraft;
use proptest::prelude::*;
use serde_json::{Value, json};

/// Kinds with a single store lookup, paired with the reference label.
const SINGLE_KINDS: &[(ObjectKind, &str)] = &[
    (ObjectKind::Volume, "volume"),
    (ObjectKind::Section, "section"),
    (ObjectKind::TagGroup, "taggroup"),
    (ObjectKind::Transform, "transform"),
];

fn arb_handles() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(
        prop::string::string_regex(r"[a-y][a-z0-9]{0,8}").unwrap(),
        1..6,
    )
    .prop_map(|set| set.into_iter().collect())
}

fn seed(store: &mut MemorySchemaStore, kind: ObjectKind, handles: &[String]) {
    for handle in handles {
        store.insert(SchemaDraft::new(kind).with_handle(handle).with_name(handle));
    }
}

proptest! {
    #[test]
    fn prefixed_references_round_trip(handles in arb_handles(), pick in 0usize..4) {
        let (kind, label) = SINGLE_KINDS[pick];
        let mut store = MemorySchemaStore::new();
        seed(&mut store, kind, &handles);
        let codec = ReferenceCodec::new(&store);

        let refs: Vec<String> = handles.iter().map(|h| format!("{label}:{h}")).collect();
        let original = json!(refs);

        let mapped = codec.map(&original, &RefKind::parse(label), true).unwrap();
        prop_assert_eq!(mapped.as_array().unwrap().len(), handles.len());

        let back = codec.unmap(&mapped, None).unwrap();
        prop_assert_eq!(back, original);
    }

    #[test]
    fn misses_are_compacted_out(
        known in arb_handles(),
        unknown in prop::collection::vec(r"zz[a-z]{1,4}", 0..4),
    ) {
        let mut store = MemorySchemaStore::new();
        seed(&mut store, ObjectKind::Section, &known);
        let codec = ReferenceCodec::new(&store);

        let mut input: Vec<String> = Vec::new();
        for (i, handle) in known.iter().enumerate() {
            input.push(handle.clone());
            if let Some(miss) = unknown.get(i) {
                input.push(miss.clone());
            }
        }

        let mapped = codec.map(&json!(input), &RefKind::Section, false).unwrap();
        let back = codec.unmap(&mapped, Some(&RefKind::Section)).unwrap();

        let expected: Vec<Value> = known.iter().map(|h| json!(format!("section:{h}"))).collect();
        prop_assert_eq!(back, Value::Array(expected));
    }
}

#[test]
fn group_prefers_category_groups_over_user_groups() {
    let mut store = MemorySchemaStore::new();
    let category = store.insert(
        SchemaDraft::new(ObjectKind::CategoryGroup)
            .with_handle("topics")
            .with_name("Topics"),
    );
    let users = store.insert(
        SchemaDraft::new(ObjectKind::UserGroup)
            .with_handle("editors")
            .with_name("Editors"),
    );
    let codec = ReferenceCodec::new(&store);

    let mapped = codec
        .map(&json!(["group:topics", "group:editors"]), &RefKind::Group, true)
        .unwrap();
    assert_eq!(
        mapped,
        json!([format!("group:{}", category.uid), format!("group:{}", users.uid)])
    );
    assert_eq!(
        codec.unmap(&mapped, None).unwrap(),
        json!(["group:topics", "group:editors"])
    );
}

#[test]
fn asset_prefers_volume_then_folder() {
    let mut store = MemorySchemaStore::new();
    let volume = store.insert(
        SchemaDraft::new(ObjectKind::Volume)
            .with_handle("images")
            .with_name("Images"),
    );
    let folder = store.insert(SchemaDraft::new(ObjectKind::Folder).with_name("docs"));
    let codec = ReferenceCodec::new(&store);

    let mapped = codec
        .map(&json!(["asset:images", "asset:docs", "asset:none"]), &RefKind::Asset, true)
        .unwrap();
    assert_eq!(
        mapped,
        json!([format!("volume:{}", volume.uid), format!("folder:{}", folder.uid)])
    );
}
