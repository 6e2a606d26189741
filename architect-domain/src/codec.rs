//! Bidirectional handle <-> UID translation of declarative references.

use crate::ports::SchemaStore;
use architect_types::kind::{ObjectKind, RefKind};
use architect_types::object::SchemaObject;
use architect_types::reference::{IdentifierSpace, Reference};
use serde_json::Value;
use tracing::debug;

/// Store kinds tried, in order, for a reference kind, with the label the
/// resolved reference carries afterwards.
fn lookup_chain(kind: &RefKind) -> &'static [(ObjectKind, &'static str)] {
    match kind {
        RefKind::Asset => &[(ObjectKind::Volume, "volume"), (ObjectKind::Folder, "folder")],
        RefKind::Volume => &[(ObjectKind::Volume, "volume")],
        RefKind::Folder => &[(ObjectKind::Folder, "folder")],
        RefKind::Section => &[(ObjectKind::Section, "section")],
        RefKind::Group => &[
            (ObjectKind::CategoryGroup, "group"),
            (ObjectKind::UserGroup, "group"),
        ],
        RefKind::TagGroup => &[(ObjectKind::TagGroup, "taggroup")],
        RefKind::Transform => &[(ObjectKind::Transform, "transform")],
        RefKind::Site => &[(ObjectKind::Site, "site")],
        RefKind::GlobalSet => &[(ObjectKind::GlobalSet, "globalset")],
        RefKind::Unknown(_) => &[],
    }
}

/// Outcome of resolving one string entry.
enum Resolved {
    /// Left as-is (wildcard, empty string, unknown kind).
    Keep,
    Hit(String),
    Miss,
}

pub struct ReferenceCodec<'a> {
    store: &'a dyn SchemaStore,
}

impl<'a> ReferenceCodec<'a> {
    pub fn new(store: &'a dyn SchemaStore) -> Self {
        Self { store }
    }

    /// Translate handle references to UIDs.
    ///
    /// Collections drop unresolved entries; a singular miss becomes null.
    pub fn map(&self, value: &Value, expected: &RefKind, use_prefix: bool) -> anyhow::Result<Value> {
        self.translate(value, |raw| self.map_one(raw, expected, use_prefix))
    }

    /// Translate UID references back to `kind:handle`.
    pub fn unmap(&self, value: &Value, expected: Option<&RefKind>) -> anyhow::Result<Value> {
        self.translate(value, |raw| self.unmap_one(raw, expected))
    }

    /// Translate site handles to `prefix + uid`, or `prefix + id` with `use_ids`.
    pub fn map_sites(&self, value: &Value, prefix: &str, use_ids: bool) -> anyhow::Result<Value> {
        self.translate(value, |raw| {
            Ok(match self.store.find_by_handle(ObjectKind::Site, raw)? {
                Some(site) if use_ids => Resolved::Hit(format!("{prefix}{}", site.id)),
                Some(site) => Resolved::Hit(format!("{prefix}{}", site.uid)),
                None => {
                    debug!(handle = raw, "site not found");
                    Resolved::Miss
                }
            })
        })
    }

    /// Translate site UIDs (or numeric ids) back to handles.
    pub fn unmap_sites(&self, value: &Value) -> anyhow::Result<Value> {
        let resolve = |raw: &str| -> anyhow::Result<Resolved> {
            Ok(match self.site_by_reference(raw)? {
                Some(site) => Resolved::Hit(site.natural_handle().to_string()),
                None => Resolved::Miss,
            })
        };
        match value {
            Value::Number(n) => match n.as_u64() {
                Some(id) => Ok(self
                    .store
                    .find_by_id(ObjectKind::Site, id)?
                    .map(|s| Value::String(s.natural_handle().to_string()))
                    .unwrap_or(Value::Null)),
                None => Ok(Value::Null),
            },
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let raw = match item {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        _ => continue,
                    };
                    if let Resolved::Hit(handle) = resolve(&raw)? {
                        out.push(Value::String(handle));
                    }
                }
                Ok(Value::Array(out))
            }
            other => self.translate(other, resolve),
        }
    }

    /// Look a site up by UID, falling back to its numeric id.
    pub fn site_by_reference(&self, raw: &str) -> anyhow::Result<Option<SchemaObject>> {
        if let Some(site) = self.store.find_by_uid(ObjectKind::Site, raw)? {
            return Ok(Some(site));
        }
        match raw.parse::<u64>() {
            Ok(id) => self.store.find_by_id(ObjectKind::Site, id),
            Err(_) => Ok(None),
        }
    }

    fn translate<F>(&self, value: &Value, mut resolve: F) -> anyhow::Result<Value>
    where
        F: FnMut(&str) -> anyhow::Result<Resolved>,
    {
        match value {
            Value::String(raw) => Ok(match resolve(raw)? {
                Resolved::Keep => value.clone(),
                Resolved::Hit(out) => Value::String(out),
                Resolved::Miss => Value::Null,
            }),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let Value::String(raw) = item else {
                        continue;
                    };
                    match resolve(raw)? {
                        Resolved::Keep => out.push(item.clone()),
                        Resolved::Hit(s) => out.push(Value::String(s)),
                        Resolved::Miss => {}
                    }
                }
                Ok(Value::Array(out))
            }
            _ => Ok(Value::Null),
        }
    }

    fn map_one(&self, raw: &str, expected: &RefKind, use_prefix: bool) -> anyhow::Result<Resolved> {
        if Reference::is_passthrough_literal(raw) {
            return Ok(Resolved::Keep);
        }
        let reference = Reference::parse(raw, expected, IdentifierSpace::Handle);
        let chain = lookup_chain(&reference.kind);
        if chain.is_empty() {
            return Ok(Resolved::Keep);
        }
        for (kind, label) in chain {
            if let Some(object) = self.store.find_by_handle(*kind, &reference.identifier)? {
                return Ok(Resolved::Hit(if use_prefix {
                    format!("{label}:{}", object.uid)
                } else {
                    object.uid
                }));
            }
        }
        debug!(reference = %reference, "reference not found");
        Ok(Resolved::Miss)
    }

    fn unmap_one(&self, raw: &str, expected: Option<&RefKind>) -> anyhow::Result<Resolved> {
        if Reference::is_passthrough_literal(raw) {
            return Ok(Resolved::Keep);
        }
        // Without a prefix or an expected kind there is nothing to look up.
        let reference = match expected {
            Some(kind) => Reference::parse(raw, kind, IdentifierSpace::Uid),
            None if Reference::split(raw).is_some() => {
                Reference::parse(raw, &RefKind::Unknown(String::new()), IdentifierSpace::Uid)
            }
            None => return Ok(Resolved::Miss),
        };
        let chain = lookup_chain(&reference.kind);
        if chain.is_empty() {
            return Ok(Resolved::Keep);
        }
        for (kind, label) in chain {
            if let Some(object) = self.store.find_by_uid(*kind, &reference.identifier)? {
                return Ok(Resolved::Hit(format!("{label}:{}", object.natural_handle())));
            }
        }
        debug!(reference = %reference, "reference not found");
        Ok(Resolved::Miss)
    }
}
