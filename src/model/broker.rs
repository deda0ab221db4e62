//! Broker model.

use serde::Deserialize;

use crate::model::values::null_as_default;
use crate::model::ResourceKind;
use crate::schema::{field, Field, Identifiable, Resource};

/// A real-estate broker working for the agency.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Broker {
    #[serde(rename = "id_corretor", deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(rename = "nome", deserialize_with = "null_as_default")]
    pub name: String,
    pub email: Option<String>,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    #[serde(rename = "celular")]
    pub mobile_phone: Option<String>,
    pub creci: Option<String>,
    #[serde(rename = "cargo")]
    pub role: Option<String>,
    #[serde(rename = "avatar")]
    pub avatar_url: Option<String>,
}

static BROKER_FIELDS: &[Field<Broker>] = &[
    field!("id_corretor" => id: Integer),
    field!("nome" => name: Text),
    field!("email" => email: Text),
    field!("telefone" => phone: Text),
    field!("celular" => mobile_phone: Text),
    field!("creci" => creci: Text),
    field!("cargo" => role: Text),
    field!("avatar" => avatar_url: Text),
];

impl Identifiable for Broker {
    fn identifier(&self) -> i64 {
        self.id
    }
}

impl Resource for Broker {
    const KIND: ResourceKind = ResourceKind::Broker;
    const IDENTITY_FIELD: &'static str = "id_corretor";

    fn schema() -> &'static [Field<Self>] {
        BROKER_FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::types::Value;

    #[test]
    fn test_decode_broker() {
        let broker: Broker = serde_json::from_str(
            r#"{"id_corretor": 3, "nome": "Ana Souza", "email": "ana@example.com",
                "telefone": null, "creci": "12345-F"}"#,
        )
        .unwrap();

        assert_eq!(broker.identifier(), 3);
        assert_eq!(broker.name, "Ana Souza");
        assert_eq!(broker.phone, None);
        let creci = BROKER_FIELDS.iter().find(|f| f.remote == "creci").unwrap();
        assert_eq!((creci.read)(&broker), Value::Text("12345-F".to_string()));
    }

    #[test]
    fn test_null_scalars_decode_as_zero_values() {
        let broker: Broker = serde_json::from_str(r#"{"id_corretor": null, "nome": null}"#).unwrap();
        assert_eq!(broker.identifier(), 0);
        assert!(broker.name.is_empty());
    }
}
