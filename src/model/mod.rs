//! Resource models replicated from the webservice.
//!
//! This module contains the synchronized resources:
//! - Banner
//! - Broker
//! - Condominium
//! - Property
//!
//! Each resource declares its remote schema (see [`crate::schema`]) next to
//! its struct definition.

pub mod banner;
pub mod broker;
pub mod condominium;
pub mod property;
pub mod values;

pub use banner::Banner;
pub use broker::Broker;
pub use condominium::Condominium;
pub use property::{Property, Rural, SeasonCalendar};

use serde::{Deserialize, Serialize};

/// The kinds of resource restmirror replicates.
///
/// Variants are listed in sync order: a full sync runs them top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Banner,
    Broker,
    Condominium,
    Property,
}

impl ResourceKind {
    /// All kinds, in sync order.
    pub const ALL: [Self; 4] = [Self::Banner, Self::Broker, Self::Condominium, Self::Property];

    /// Path segment of the collection on the webservice.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Banner => "banners",
            Self::Broker => "corretores",
            Self::Condominium => "condominios",
            Self::Property => "imoveis",
        }
    }

    /// Table used when the config does not override it.
    #[must_use]
    pub const fn default_table(&self) -> &'static str {
        match self {
            Self::Banner => "banners",
            Self::Broker => "brokers",
            Self::Condominium => "condominiums",
            Self::Property => "properties",
        }
    }

    /// Human-readable name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Banner => "banner",
            Self::Broker => "broker",
            Self::Condominium => "condominium",
            Self::Property => "property",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
