//! Condominium model.
//!
//! Condominiums group properties and carry construction progress for
//! launches.

use serde::Deserialize;

use crate::model::values::{
    null_as_default, CommaList, JsonList, Media, TextList, Video, WsDateTime,
};
use crate::model::ResourceKind;
use crate::schema::{field, Field, Identifiable, Resource};

/// A condominium (building or gated community).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Condominium {
    #[serde(rename = "id_condominio", deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(rename = "tipo", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(rename = "id_imagem")]
    pub cover_image_id: Option<i64>,
    #[serde(rename = "nome", deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "destaque", deserialize_with = "null_as_default")]
    pub featured: bool,
    #[serde(rename = "lancamento", deserialize_with = "null_as_default")]
    pub launch: bool,
    #[serde(rename = "fechado", deserialize_with = "null_as_default")]
    pub gated: bool,

    // Construction progress, in percent.
    #[serde(rename = "acabamentos")]
    pub finishing_percentage: Option<i64>,
    #[serde(rename = "alvenaria")]
    pub brick_percentage: Option<i64>,
    #[serde(rename = "estruturas")]
    pub structure_percentage: Option<i64>,
    #[serde(rename = "fundacoes")]
    pub foundation_percentage: Option<i64>,
    #[serde(rename = "intalacoes")]
    pub installations_percentage: Option<i64>,
    #[serde(rename = "paisagismo")]
    pub landscaping_percentage: Option<i64>,
    #[serde(rename = "projetos")]
    pub project_percentage: Option<i64>,
    #[serde(rename = "terraplanagem")]
    pub ground_leveling_percentage: Option<i64>,

    #[serde(deserialize_with = "null_as_default")]
    pub latitude: f64,
    // The webservice spells this key without the "d".
    #[serde(rename = "longitue", deserialize_with = "null_as_default")]
    pub longitude: f64,
    #[serde(rename = "observacoes", deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(rename = "registro_incorporacao")]
    pub incorporation_record: Option<String>,

    #[serde(rename = "id_bairro", deserialize_with = "null_as_default")]
    pub neighborhood_id: i64,
    #[serde(rename = "id_cidade", deserialize_with = "null_as_default")]
    pub city_id: i64,
    #[serde(rename = "id_estado", deserialize_with = "null_as_default")]
    pub state_id: i64,
    #[serde(rename = "endereco_cep", deserialize_with = "null_as_default")]
    pub address_zipcode: String,
    #[serde(rename = "endereco_logradouro", deserialize_with = "null_as_default")]
    pub address_street: String,
    #[serde(rename = "endereco_bairro", deserialize_with = "null_as_default")]
    pub address_neighborhood: String,
    #[serde(rename = "endereco_numero", deserialize_with = "null_as_default")]
    pub address_number: String,
    #[serde(rename = "endereco_cidade", deserialize_with = "null_as_default")]
    pub city_name: String,
    #[serde(rename = "endereco_estado", deserialize_with = "null_as_default")]
    pub state_name: String,

    #[serde(rename = "situacao", deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(rename = "entrega_mes")]
    pub delivery_month: Option<i64>,
    #[serde(rename = "entrega_ano")]
    pub delivery_year: Option<i64>,
    #[serde(rename = "administradora")]
    pub administering_company: Option<String>,
    #[serde(rename = "construtora")]
    pub building_company: Option<String>,
    #[serde(rename = "incorporadora")]
    pub developer: Option<String>,
    #[serde(rename = "projeto_arquitetonico")]
    pub architect: Option<String>,
    #[serde(rename = "projeto_paisagismo")]
    pub landscaper: Option<String>,
    #[serde(rename = "projeto_decoracao")]
    pub decorator: Option<String>,
    #[serde(rename = "logotipo", deserialize_with = "null_as_default")]
    pub cover_image: String,
    #[serde(rename = "total_imoveis_disponiveis", deserialize_with = "null_as_default")]
    pub available_properties: i64,

    #[serde(rename = "infraestruturas")]
    pub infrastructures: CommaList,
    #[serde(rename = "etiquetas")]
    pub labels: CommaList,
    pub videos: JsonList<Video>,
    #[serde(rename = "imagens")]
    pub images: JsonList<Media>,
    #[serde(rename = "plantas")]
    pub blueprints: JsonList<Media>,
    #[serde(rename = "tour360")]
    pub ar_tour: TextList,

    #[serde(rename = "data_cadastro")]
    pub created_at: Option<WsDateTime>,
    #[serde(rename = "data_update")]
    pub updated_at: Option<WsDateTime>,
}

static CONDOMINIUM_FIELDS: &[Field<Condominium>] = &[
    field!("id_condominio" => id: Integer),
    field!("tipo" => kind: Text),
    field!("id_imagem" => cover_image_id: Integer),
    field!("nome" => name: Text),
    field!("destaque" => featured: Bool),
    field!("lancamento" => launch: Bool),
    field!("fechado" => gated: Bool),
    field!("acabamentos" => finishing_percentage: Integer),
    field!("alvenaria" => brick_percentage: Integer),
    field!("estruturas" => structure_percentage: Integer),
    field!("fundacoes" => foundation_percentage: Integer),
    field!("intalacoes" => installations_percentage: Integer),
    field!("paisagismo" => landscaping_percentage: Integer),
    field!("projetos" => project_percentage: Integer),
    field!("terraplanagem" => ground_leveling_percentage: Integer),
    field!("latitude" => latitude: Real),
    field!("longitue" => longitude: Real),
    field!("observacoes" => notes: Text),
    field!("registro_incorporacao" => incorporation_record: Text),
    field!("id_bairro" => neighborhood_id: Integer),
    field!("id_cidade" => city_id: Integer),
    field!("id_estado" => state_id: Integer),
    field!("endereco_cep" => address_zipcode: Text),
    field!("endereco_logradouro" => address_street: Text),
    field!("endereco_bairro" => address_neighborhood: Text),
    field!("endereco_numero" => address_number: Text),
    field!("endereco_cidade" => city_name: Text),
    field!("endereco_estado" => state_name: Text),
    field!("situacao" => status: Text),
    field!("entrega_mes" => delivery_month: Integer),
    field!("entrega_ano" => delivery_year: Integer),
    field!("administradora" => administering_company: Text),
    field!("construtora" => building_company: Text),
    field!("incorporadora" => developer: Text),
    field!("projeto_arquitetonico" => architect: Text),
    field!("projeto_paisagismo" => landscaper: Text),
    field!("projeto_decoracao" => decorator: Text),
    field!("logotipo" => cover_image: Text),
    field!("total_imoveis_disponiveis" => available_properties: Integer),
    field!("infraestruturas" => infrastructures: Json),
    field!("etiquetas" => labels: Json),
    field!("videos" => videos: Json),
    field!("imagens" => images: Json),
    field!("plantas" => blueprints: Json),
    field!("tour360" => ar_tour: Json),
    field!("data_cadastro" => created_at: DateTime),
    field!("data_update" => updated_at: DateTime),
];

impl Identifiable for Condominium {
    fn identifier(&self) -> i64 {
        self.id
    }
}

impl Resource for Condominium {
    const KIND: ResourceKind = ResourceKind::Condominium;
    const IDENTITY_FIELD: &'static str = "id_condominio";

    fn schema() -> &'static [Field<Self>] {
        CONDOMINIUM_FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::types::Value;

    fn read(c: &Condominium, remote: &str) -> Value {
        let f = CONDOMINIUM_FIELDS.iter().find(|f| f.remote == remote).unwrap();
        (f.read)(c)
    }

    #[test]
    fn test_decode_condominium_quirks() {
        let c: Condominium = serde_json::from_str(
            r#"{
                "id_condominio": 7,
                "nome": "Residencial Aurora",
                "fechado": true,
                "longitue": -51.2,
                "infraestruturas": "Piscina,Academia",
                "tour360": null,
                "videos": [{"href": "https://v/1", "title": null}],
                "data_cadastro": "2021-11-30 08:00:00"
            }"#,
        )
        .unwrap();

        assert_eq!(c.identifier(), 7);
        assert_eq!(read(&c, "fechado"), Value::Integer(1));
        assert_eq!(read(&c, "longitue"), Value::Real(-51.2));
        assert_eq!(
            read(&c, "infraestruturas"),
            Value::Text(r#"["Piscina","Academia"]"#.to_string())
        );
        assert_eq!(read(&c, "tour360"), Value::Text("[]".to_string()));
        assert_eq!(
            read(&c, "videos"),
            Value::Text(r#"[{"url":"https://v/1","title":null}]"#.to_string())
        );
        assert_eq!(
            read(&c, "data_cadastro"),
            Value::Text("2021-11-30 08:00:00".to_string())
        );
        assert_eq!(read(&c, "data_update"), Value::Null);
    }

    #[test]
    fn test_null_scalars_decode_as_zero_values() {
        let c: Condominium = serde_json::from_str(
            r#"{"id_condominio": 9, "nome": null, "fechado": null, "latitude": null,
                "id_bairro": null, "observacoes": null, "total_imoveis_disponiveis": null}"#,
        )
        .unwrap();

        assert_eq!(c.identifier(), 9);
        assert!(c.name.is_empty());
        assert!(!c.gated);
        assert_eq!(read(&c, "latitude"), Value::Real(0.0));
        assert_eq!(read(&c, "id_bairro"), Value::Integer(0));
        assert_eq!(c.available_properties, 0);
    }
}
