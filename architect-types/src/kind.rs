use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of object held by the schema store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectKind {
    Volume,
    Folder,
    Section,
    CategoryGroup,
    UserGroup,
    TagGroup,
    Transform,
    Site,
    GlobalSet,
    Field,
    FieldGroup,
    EntryType,
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Volume => "volume",
            ObjectKind::Folder => "folder",
            ObjectKind::Section => "section",
            ObjectKind::CategoryGroup => "categoryGroup",
            ObjectKind::UserGroup => "userGroup",
            ObjectKind::TagGroup => "tagGroup",
            ObjectKind::Transform => "transform",
            ObjectKind::Site => "site",
            ObjectKind::GlobalSet => "globalSet",
            ObjectKind::Field => "field",
            ObjectKind::FieldGroup => "fieldGroup",
            ObjectKind::EntryType => "entryType",
        }
    }

    /// Kinds whose objects carry no handle and are addressed by name.
    pub fn is_named_only(self) -> bool {
        matches!(self, ObjectKind::Folder | ObjectKind::FieldGroup)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind label used inside declarative references (`kind:identifier`).
///
/// This is the reference vocabulary, not the store vocabulary: `asset` may
/// resolve to a volume or a folder, `group` to a category group or a user
/// group. Labels outside the closed set are carried as [`RefKind::Unknown`]
/// and pass through resolution untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RefKind {
    Asset,
    Volume,
    Folder,
    Section,
    Group,
    TagGroup,
    Transform,
    Site,
    GlobalSet,
    Unknown(String),
}

impl RefKind {
    pub fn parse(label: &str) -> Self {
        match label {
            "asset" => RefKind::Asset,
            "volume" => RefKind::Volume,
            "folder" => RefKind::Folder,
            "section" => RefKind::Section,
            "group" => RefKind::Group,
            "taggroup" => RefKind::TagGroup,
            "transform" => RefKind::Transform,
            "site" => RefKind::Site,
            "globalset" => RefKind::GlobalSet,
            other => RefKind::Unknown(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RefKind::Asset => "asset",
            RefKind::Volume => "volume",
            RefKind::Folder => "folder",
            RefKind::Section => "section",
            RefKind::Group => "group",
            RefKind::TagGroup => "taggroup",
            RefKind::Transform => "transform",
            RefKind::Site => "site",
            RefKind::GlobalSet => "globalset",
            RefKind::Unknown(label) => label,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, RefKind::Unknown(_))
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_kind_labels_round_trip() {
        for label in [
            "asset",
            "volume",
            "folder",
            "section",
            "group",
            "taggroup",
            "transform",
            "site",
            "globalset",
        ] {
            let kind = RefKind::parse(label);
            assert!(!kind.is_unknown(), "{label} should be known");
            assert_eq!(kind.label(), label);
        }
    }

    #[test]
    fn unknown_label_is_preserved() {
        let kind = RefKind::parse("widget");
        assert_eq!(kind, RefKind::Unknown("widget".to_string()));
        assert_eq!(kind.to_string(), "widget");
    }

    #[test]
    fn object_kind_serializes_camel_case() {
        let v = serde_json::to_value(ObjectKind::EntryType).expect("serialize");
        assert_eq!(v, serde_json::json!("entryType"));
        assert_eq!(ObjectKind::CategoryGroup.to_string(), "categoryGroup");
    }
}
