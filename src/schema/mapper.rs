//! Field-to-column resolution.
//!
//! Two lookups are involved and they use different keys:
//! - the schema is addressed by the **full** remote path (`rural.rural_sedes`)
//! - the user column mapping is addressed by the **last path segment**
//!   (`rural_sedes`)

use std::collections::BTreeMap;

use crate::config::ColumnMapping;
use crate::error::{Error, Result};

use super::{Field, Resource};

/// Column-mapping lookup key of a remote field: its last dotted segment.
#[must_use]
pub fn mapping_key(remote: &str) -> &str {
    remote.rsplit('.').next().unwrap_or(remote)
}

/// Schema fields of a resource indexed by full remote path, in sorted order.
pub struct FieldMap<T: 'static> {
    by_remote: BTreeMap<&'static str, &'static Field<T>>,
}

impl<T: Resource> FieldMap<T> {
    #[must_use]
    pub fn of() -> Self {
        let by_remote = T::schema().iter().map(|f| (f.remote, f)).collect();
        Self { by_remote }
    }

    /// Local field description for a full remote path.
    #[must_use]
    pub fn get(&self, remote: &str) -> Option<&'static Field<T>> {
        self.by_remote.get(remote).copied()
    }

    /// Remote keys in lexicographic order.
    pub fn remote_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_remote.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_remote.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_remote.is_empty()
    }
}

/// A schema field bound to its target database column.
pub struct ResolvedColumn<T: 'static> {
    pub remote: &'static str,
    pub column: String,
    pub field: &'static Field<T>,
}

impl<T> std::fmt::Debug for ResolvedColumn<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedColumn")
            .field("remote", &self.remote)
            .field("column", &self.column)
            .finish_non_exhaustive()
    }
}

/// Resolve every schema field of `T` to its mapped column.
///
/// Columns come back sorted by remote key so generated statements are
/// reproducible.
///
/// # Errors
///
/// Returns [`Error::MissingColumnMapping`] for the first field (in sorted
/// order) without a mapping entry.
pub fn resolve_columns<T: Resource>(
    mapping: &ColumnMapping,
    table: &str,
) -> Result<Vec<ResolvedColumn<T>>> {
    let fields = FieldMap::<T>::of();
    let mut columns = Vec::with_capacity(fields.len());

    for remote in fields.remote_keys() {
        let field = fields.get(remote).ok_or_else(|| {
            Error::Config(format!("no local field for \"{remote}\" in table \"{table}\""))
        })?;

        let key = mapping_key(remote);
        let column = mapping
            .get(key)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::MissingColumnMapping {
                field: key.to_string(),
                table: table.to_string(),
            })?;

        columns.push(ResolvedColumn {
            remote,
            column: column.clone(),
            field,
        });
    }

    Ok(columns)
}

/// Column holding the primary key of `T`, per the mapping.
///
/// # Errors
///
/// Returns [`Error::MissingColumnMapping`] when the identity field is unmapped.
pub fn identity_column<T: Resource>(mapping: &ColumnMapping, table: &str) -> Result<String> {
    let key = mapping_key(T::IDENTITY_FIELD);
    mapping
        .get(key)
        .cloned()
        .ok_or_else(|| Error::MissingColumnMapping {
            field: key.to_string(),
            table: table.to_string(),
        })
}
