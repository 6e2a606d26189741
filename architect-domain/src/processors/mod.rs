//! One processor per schema-object kind.
//!
//! A processor turns a declarative fragment into a [`SchemaDraft`] (handles
//! resolved to UIDs), saves it through the store, and exports live objects
//! back into fragments the import side accepts.

use crate::permissions::PermissionMiss;
use crate::ports::SchemaStore;
use architect_types::kind::ObjectKind;
use architect_types::object::{ErrorMap, SaveOutcome, SchemaDraft, SchemaObject};
use architect_types::report::Bucket;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

mod entry_type;
mod field;
mod field_group;
mod section;
mod user_group;

pub use entry_type::EntryTypeProcessor;
pub use field::FieldProcessor;
pub use field_group::FieldGroupProcessor;
pub use section::SectionProcessor;
pub use user_group::UserGroupProcessor;

/// Result of parsing one fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    /// `None` when the fragment cannot be turned into a draft.
    pub draft: Option<SchemaDraft>,
    pub errors: ErrorMap,
    pub permission_misses: Vec<PermissionMiss>,
}

impl ParseOutcome {
    pub fn ok(draft: SchemaDraft) -> Self {
        Self {
            draft: Some(draft),
            ..Self::default()
        }
    }

    pub fn failed(errors: ErrorMap) -> Self {
        Self {
            draft: None,
            errors,
            permission_misses: Vec::new(),
        }
    }
}

pub trait Processor {
    fn bucket(&self) -> Bucket;

    fn kind(&self) -> ObjectKind;

    fn parse(&self, store: &dyn SchemaStore, item: &Map<String, Value>)
    -> anyhow::Result<ParseOutcome>;

    fn save(&self, store: &mut dyn SchemaStore, draft: SchemaDraft) -> anyhow::Result<SaveOutcome> {
        store.save(draft)
    }

    fn export(&self, store: &dyn SchemaStore, object: &SchemaObject) -> anyhow::Result<Value>;
}

pub fn builtin_processors() -> Vec<Box<dyn Processor>> {
    vec![
        Box::new(SectionProcessor),
        Box::new(FieldGroupProcessor),
        Box::new(FieldProcessor),
        Box::new(EntryTypeProcessor),
        Box::new(UserGroupProcessor),
    ]
}

/// Processors keyed by the bucket they handle.
pub struct ProcessorRegistry {
    processors: BTreeMap<Bucket, Box<dyn Processor>>,
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::with_processors(builtin_processors())
    }

    /// A registry holding only `processors`; a later entry replaces an
    /// earlier one for the same bucket.
    pub fn with_processors(processors: Vec<Box<dyn Processor>>) -> Self {
        let mut registry = Self {
            processors: BTreeMap::new(),
        };
        for processor in processors {
            registry.register(processor);
        }
        registry
    }

    pub fn register(&mut self, processor: Box<dyn Processor>) {
        self.processors.insert(processor.bucket(), processor);
    }

    pub fn get(&self, bucket: Bucket) -> Option<&dyn Processor> {
        self.processors.get(&bucket).map(|p| p.as_ref())
    }

    pub fn buckets(&self) -> impl Iterator<Item = Bucket> + '_ {
        self.processors.keys().copied()
    }
}

fn str_field<'a>(item: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    item.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Draft with handle and name taken from the fragment. A missing name
/// defaults to the handle.
fn base_draft(kind: ObjectKind, item: &Map<String, Value>) -> SchemaDraft {
    let mut draft = SchemaDraft::new(kind);
    draft.handle = str_field(item, "handle").map(str::to_string);
    draft.name = str_field(item, "name")
        .or(draft.handle.as_deref())
        .unwrap_or_default()
        .to_string();
    draft
}

/// Every entry of `item` except `consumed` keys.
fn remainder(item: &Map<String, Value>, consumed: &[&str]) -> Map<String, Value> {
    item.iter()
        .filter(|(k, _)| !consumed.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Start an exported fragment with `name` and `handle`.
fn export_head(object: &SchemaObject) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("name".to_string(), Value::String(object.name.clone()));
    if let Some(handle) = &object.handle {
        out.insert("handle".to_string(), Value::String(handle.clone()));
    }
    out
}
