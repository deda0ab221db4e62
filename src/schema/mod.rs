//! Static schema descriptions of the synchronized resources.
//!
//! Every resource type declares, once, the list of remote payload fields it
//! carries: the remote key, the local field name, the value kind and an
//! accessor producing the column value. The sync engine walks this table
//! instead of inspecting types at runtime.
//!
//! # Submodules
//!
//! - [`mapper`] - Resolves schema fields against a user column mapping

pub mod mapper;

use std::collections::HashSet;

use rusqlite::types::Value;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::model::{Banner, Broker, Condominium, Property, ResourceKind};

pub use mapper::{identity_column, mapping_key, resolve_columns, FieldMap, ResolvedColumn};

/// Shape of a column value, used for schema validation and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Real,
    Bool,
    Text,
    DateTime,
    /// A JSON document stored as text (lists, media, calendars).
    Json,
}

impl FieldKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Bool => "bool",
            Self::Text => "text",
            Self::DateTime => "datetime",
            Self::Json => "json",
        }
    }
}

/// One remote field of a resource.
pub struct Field<T> {
    /// Key in the remote payload. Nested keys are dotted (`rural.rural_sedes`).
    pub remote: &'static str,
    /// Name of the local struct field holding the value.
    pub local: &'static str,
    pub kind: FieldKind,
    pub read: fn(&T) -> Value,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("remote", &self.remote)
            .field("local", &self.local)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Builds a [`Field`] whose local field is a direct struct member.
macro_rules! field {
    ($remote:literal => $local:ident : $kind:ident) => {
        $crate::schema::Field {
            remote: $remote,
            local: stringify!($local),
            kind: $crate::schema::FieldKind::$kind,
            read: |r| $crate::model::values::ToColumn::to_column(&r.$local),
        }
    };
}
pub(crate) use field;

/// Anything carrying the integer identifier used as table primary key.
pub trait Identifiable {
    fn identifier(&self) -> i64;
}

/// A synchronized resource type.
pub trait Resource: Identifiable + DeserializeOwned + Send + Sized + 'static {
    const KIND: ResourceKind;

    /// Remote key of the identity field (the primary key column source).
    const IDENTITY_FIELD: &'static str;

    fn schema() -> &'static [Field<Self>];
}

/// Check a resource schema for internal consistency.
///
/// # Errors
///
/// Returns a configuration error for duplicated or malformed remote keys,
/// or when the identity field is missing or not an integer.
pub fn validate_schema<T: Resource>() -> Result<()> {
    let kind = T::KIND.name();
    let mut seen = HashSet::new();

    for field in T::schema() {
        if field.remote.split('.').any(str::is_empty) {
            return Err(Error::Config(format!(
                "{kind}: malformed remote field key \"{}\"",
                field.remote
            )));
        }
        if !seen.insert(field.remote) {
            return Err(Error::Config(format!(
                "{kind}: remote field \"{}\" declared twice",
                field.remote
            )));
        }
    }

    match T::schema().iter().find(|f| f.remote == T::IDENTITY_FIELD) {
        Some(f) if f.kind == FieldKind::Integer => Ok(()),
        Some(f) => Err(Error::Config(format!(
            "{kind}: identity field \"{}\" must be an integer, is {}",
            f.remote,
            f.kind.as_str()
        ))),
        None => Err(Error::Config(format!(
            "{kind}: identity field \"{}\" is not part of the schema",
            T::IDENTITY_FIELD
        ))),
    }
}

/// Validate every resource schema. Run once at startup.
///
/// # Errors
///
/// Returns the first schema inconsistency found.
pub fn validate_all() -> Result<()> {
    validate_schema::<Banner>()?;
    validate_schema::<Broker>()?;
    validate_schema::<Condominium>()?;
    validate_schema::<Property>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_schemas_are_valid() {
        validate_all().unwrap();
    }

    #[test]
    fn test_identity_fields() {
        assert_eq!(Banner::IDENTITY_FIELD, "id_banner");
        assert_eq!(Broker::IDENTITY_FIELD, "id_corretor");
        assert_eq!(Condominium::IDENTITY_FIELD, "id_condominio");
        assert_eq!(Property::IDENTITY_FIELD, "id_imovel");
    }

    #[test]
    fn test_property_schema_has_nested_rural_fields() {
        let rural: Vec<_> = Property::schema()
            .iter()
            .filter(|f| f.remote.starts_with("rural."))
            .map(|f| f.local)
            .collect();
        assert_eq!(
            rural,
            ["rural.activities", "rural.headquarters", "rural.arable_area"]
        );
    }
}
