//! `action:target` permission strings.
//!
//! The action decides which kind of object the target names. Translation is
//! lenient: a target that cannot be resolved leaves the permission string as
//! it was and is reported as a [`PermissionMiss`].

use crate::ports::SchemaStore;
use architect_types::kind::ObjectKind;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionTarget {
    UserGroup,
    Site,
    Section,
    GlobalSet,
    Category,
    Volume,
    /// Target is carried verbatim (`utility:*`, unknown actions).
    Passthrough,
}

impl PermissionTarget {
    /// Look up the target kind of an action; matching ignores case.
    pub fn for_action(action: &str) -> Self {
        match action.to_ascii_lowercase().as_str() {
            "assignusergroup" => Self::UserGroup,
            "editsite" => Self::Site,
            "editentries"
            | "createentries"
            | "publishentries"
            | "deleteentries"
            | "editpeerentries"
            | "publishpeerentries"
            | "deletepeerentries"
            | "editpeerentrydrafts"
            | "publishpeerentrydrafts"
            | "deletepeerentrydrafts" => Self::Section,
            "editglobalset" => Self::GlobalSet,
            "editcategories" => Self::Category,
            "viewvolume"
            | "saveassetinvolume"
            | "createfoldersinvolume"
            | "deletefilesandfoldersinvolume" => Self::Volume,
            _ => Self::Passthrough,
        }
    }

    fn object_kind(self) -> Option<ObjectKind> {
        match self {
            Self::UserGroup => Some(ObjectKind::UserGroup),
            Self::Site => Some(ObjectKind::Site),
            Self::Section => Some(ObjectKind::Section),
            Self::GlobalSet => Some(ObjectKind::GlobalSet),
            Self::Category => Some(ObjectKind::CategoryGroup),
            Self::Volume => Some(ObjectKind::Volume),
            Self::Passthrough => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum MissReason {
    NotFound,
    StoreError(String),
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissReason::NotFound => f.write_str("not found"),
            MissReason::StoreError(detail) => write!(f, "store error: {detail}"),
        }
    }
}

/// A permission whose target could not be translated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionMiss {
    pub permission: String,
    pub reason: MissReason,
}

#[derive(Clone, Copy)]
enum Direction {
    HandleToUid,
    UidToHandle,
}

pub struct PermissionResolver<'a> {
    store: &'a dyn SchemaStore,
}

impl<'a> PermissionResolver<'a> {
    pub fn new(store: &'a dyn SchemaStore) -> Self {
        Self { store }
    }

    /// Rewrite `action:handle` entries to `action:uid` in place.
    pub fn map_permissions(&self, permissions: &mut [String]) -> Vec<PermissionMiss> {
        self.rewrite(permissions, Direction::HandleToUid)
    }

    /// Rewrite `action:uid` entries to `action:handle` in place.
    pub fn unmap_permissions(&self, permissions: &mut [String]) -> Vec<PermissionMiss> {
        self.rewrite(permissions, Direction::UidToHandle)
    }

    fn rewrite(&self, permissions: &mut [String], direction: Direction) -> Vec<PermissionMiss> {
        let mut misses = Vec::new();
        for permission in permissions.iter_mut() {
            // A leading colon is not an action prefix.
            let Some((action, target)) = permission.split_once(':').filter(|(a, _)| !a.is_empty())
            else {
                continue;
            };
            match self.resolve(action, target, direction) {
                Ok(Some(resolved)) => *permission = format!("{action}:{resolved}"),
                Ok(None) => {
                    debug!(permission = %permission, "permission target not found");
                    misses.push(PermissionMiss {
                        permission: permission.clone(),
                        reason: MissReason::NotFound,
                    });
                }
                Err(err) => {
                    warn!(permission = %permission, error = %err, "permission lookup failed");
                    misses.push(PermissionMiss {
                        permission: permission.clone(),
                        reason: MissReason::StoreError(format!("{err:#}")),
                    });
                }
            }
        }
        misses
    }

    fn resolve(
        &self,
        action: &str,
        target: &str,
        direction: Direction,
    ) -> anyhow::Result<Option<String>> {
        let Some(kind) = PermissionTarget::for_action(action).object_kind() else {
            return Ok(Some(target.to_string()));
        };
        Ok(match direction {
            Direction::HandleToUid => self.store.find_by_handle(kind, target)?.map(|o| o.uid),
            Direction::UidToHandle => self
                .store
                .find_by_uid(kind, target)?
                .map(|o| o.natural_handle().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySchemaStore;
    use architect_types::object::{SaveOutcome, SchemaDraft, SchemaObject};
    use pretty_assertions::assert_eq;

    #[test]
    fn table_is_case_insensitive() {
        assert_eq!(PermissionTarget::for_action("editEntries"), PermissionTarget::Section);
        assert_eq!(PermissionTarget::for_action("viewvolume"), PermissionTarget::Volume);
        assert_eq!(PermissionTarget::for_action("utility"), PermissionTarget::Passthrough);
        assert_eq!(PermissionTarget::for_action("accesscp"), PermissionTarget::Passthrough);
    }

    #[test]
    fn miss_reasons_read_as_plain_text() {
        assert_eq!(MissReason::NotFound.to_string(), "not found");
        assert_eq!(
            MissReason::StoreError("connection reset".into()).to_string(),
            "store error: connection reset"
        );
    }

    #[test]
    fn maps_and_unmaps_known_targets() {
        let mut store = MemorySchemaStore::new();
        let blog = store.insert(
            SchemaDraft::new(ObjectKind::Section)
                .with_handle("blog")
                .with_name("Blog"),
        );
        let resolver = PermissionResolver::new(&store);

        let mut perms = vec![
            "editentries:blog".to_string(),
            "utility:updates".to_string(),
            "accesscp".to_string(),
        ];
        assert!(resolver.map_permissions(&mut perms).is_empty());
        assert_eq!(perms[0], format!("editentries:{}", blog.uid));
        assert_eq!(perms[1], "utility:updates");
        assert_eq!(perms[2], "accesscp");

        assert!(resolver.unmap_permissions(&mut perms).is_empty());
        assert_eq!(perms[0], "editentries:blog");
    }

    #[test]
    fn misses_leave_the_string_and_continue() {
        let store = MemorySchemaStore::new();
        let resolver = PermissionResolver::new(&store);
        let mut perms = vec!["editentries:ghost".to_string(), ":odd".to_string()];

        let misses = resolver.map_permissions(&mut perms);

        assert_eq!(perms, vec!["editentries:ghost".to_string(), ":odd".to_string()]);
        assert_eq!(
            misses,
            vec![PermissionMiss {
                permission: "editentries:ghost".to_string(),
                reason: MissReason::NotFound,
            }]
        );
    }

    struct BrokenStore;

    impl SchemaStore for BrokenStore {
        fn find_by_handle(&self, _: ObjectKind, _: &str) -> anyhow::Result<Option<SchemaObject>> {
            anyhow::bail!("connection reset")
        }
        fn find_by_uid(&self, _: ObjectKind, _: &str) -> anyhow::Result<Option<SchemaObject>> {
            anyhow::bail!("connection reset")
        }
        fn find_by_id(&self, _: ObjectKind, _: u64) -> anyhow::Result<Option<SchemaObject>> {
            anyhow::bail!("connection reset")
        }
        fn list(&self, _: ObjectKind) -> anyhow::Result<Vec<SchemaObject>> {
            anyhow::bail!("connection reset")
        }
        fn assemble_field_layout(
            &self,
            _: &[(String, Vec<String>)],
            _: &[String],
        ) -> anyhow::Result<architect_types::layout::FieldLayout> {
            anyhow::bail!("connection reset")
        }
        fn save(&mut self, _: SchemaDraft) -> anyhow::Result<SaveOutcome> {
            anyhow::bail!("connection reset")
        }
        fn entry_types(&self, _: &str) -> anyhow::Result<Vec<SchemaObject>> {
            anyhow::bail!("connection reset")
        }
        fn delete_entry_type(&mut self, _: &str) -> anyhow::Result<()> {
            anyhow::bail!("connection reset")
        }
    }

    #[test]
    fn store_failures_are_distinguished_from_misses() {
        let resolver = PermissionResolver::new(&BrokenStore);
        let mut perms = vec!["editsite:default".to_string(), "editentries:blog".to_string()];

        let misses = resolver.map_permissions(&mut perms);

        assert_eq!(misses.len(), 2);
        assert!(matches!(misses[0].reason, MissReason::StoreError(ref m) if m.contains("connection reset")));
        assert_eq!(perms[1], "editentries:blog");
    }
}
