use architect_types::layout::{FieldLayout, LayoutField, LayoutTab};
use architect_types::report::{Bucket, ImportReport, ImportSummary, ToolInfo};

#[test]
fn import_report_new_sets_schema_and_defaults() {
    let tool = ToolInfo {
        name: "architect".to_string(),
        version: Some("1.2.3".to_string()),
        commit: None,
    };

    let report = ImportReport::new(tool.clone());

    assert_eq!(report.schema, architect_types::schema::ARCHITECT_IMPORT_REPORT_V1);
    assert_eq!(report.tool, tool);
    assert!(report.no_errors);
    assert!(report.backup_location.is_none());
    assert!(report.results.is_empty());
    assert!(report.pruned_entry_types.is_empty());
    assert_eq!(report.summary, ImportSummary::default());
    assert!(report.ended_at.is_none());
}

#[test]
fn import_order_is_fixed() {
    assert_eq!(
        Bucket::IMPORT_ORDER,
        [
            Bucket::Sections,
            Bucket::FieldGroups,
            Bucket::Fields,
            Bucket::EntryTypes,
            Bucket::UserGroups,
        ]
    );
    let mut sorted = Bucket::IMPORT_ORDER;
    sorted.sort();
    assert_eq!(sorted, Bucket::IMPORT_ORDER);
}

#[test]
fn empty_layout_keeps_kind_tag() {
    let layout = FieldLayout::empty("entryType");
    assert_eq!(layout.kind_tag, "entryType");
    assert!(layout.is_empty());
    assert_eq!(layout.field_uids().count(), 0);
}

#[test]
fn required_uids_follow_tab_order() {
    let field = |uid: &str, required: bool| LayoutField {
        uid: uid.to_string(),
        handle: uid.to_string(),
        required,
    };
    let layout = FieldLayout {
        kind_tag: "entryType".to_string(),
        tabs: vec![
            LayoutTab {
                name: "A".to_string(),
                sort_order: 1,
                fields: vec![field("a1", true), field("a2", false)],
            },
            LayoutTab {
                name: "B".to_string(),
                sort_order: 2,
                fields: vec![field("b1", true)],
            },
        ],
    };

    let required: Vec<&str> = layout.required_uids().collect();
    assert_eq!(required, vec!["a1", "b1"]);
    let all: Vec<&str> = layout.field_uids().collect();
    assert_eq!(all, vec!["a1", "a2", "b1"]);
}
