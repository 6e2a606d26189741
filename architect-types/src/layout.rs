use serde::{Deserialize, Serialize};

/// Tab/field arrangement attached to a fielded schema object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldLayout {
    /// Kind tag of the owning object (`section`, `entryType`, ...).
    #[serde(default)]
    pub kind_tag: String,

    #[serde(default)]
    pub tabs: Vec<LayoutTab>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutTab {
    pub name: String,
    pub sort_order: i64,
    #[serde(default)]
    pub fields: Vec<LayoutField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutField {
    pub uid: String,
    pub handle: String,
    #[serde(default)]
    pub required: bool,
}

impl FieldLayout {
    pub fn empty(kind_tag: &str) -> Self {
        Self {
            kind_tag: kind_tag.to_string(),
            tabs: Vec::new(),
        }
    }

    pub fn field_uids(&self) -> impl Iterator<Item = &str> {
        self.tabs
            .iter()
            .flat_map(|t| t.fields.iter().map(|f| f.uid.as_str()))
    }

    pub fn required_uids(&self) -> impl Iterator<Item = &str> {
        self.tabs.iter().flat_map(|t| {
            t.fields
                .iter()
                .filter(|f| f.required)
                .map(|f| f.uid.as_str())
        })
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}
