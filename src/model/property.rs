//! Property model.
//!
//! Properties are the bulk of the replicated data. Their payload nests the
//! rural attributes under a `rural` object; those are addressed with dotted
//! remote keys (`rural.rural_sedes`) in the schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::values::{
    null_as_default, CommaList, FeaturedFlag, JsonList, Media, TextList, ToColumn, Video,
    WsDateTime,
};
use crate::model::ResourceKind;
use crate::schema::{field, Field, FieldKind, Identifiable, Resource};

/// Rural attributes, nested under `rural` in the payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Rural {
    #[serde(rename = "atividade_rural")]
    pub activities: CommaList,
    #[serde(rename = "rural_sedes")]
    pub headquarters: Option<i64>,
    #[serde(rename = "rural_area_aravel")]
    pub arable_area: Option<f64>,
}

/// One season-rental price window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonCalendar {
    #[serde(rename(deserialize = "nome"), default)]
    pub name: Option<String>,
    #[serde(rename(deserialize = "inicio"), default)]
    pub start: Option<WsDateTime>,
    #[serde(rename(deserialize = "fim"), default)]
    pub end: Option<WsDateTime>,
    #[serde(rename(deserialize = "valor_diaria"), default)]
    pub daily_rate: Option<f64>,
    #[serde(rename(deserialize = "minimo_diarias"), default)]
    pub minimum_days: Option<i64>,
}

/// A property listing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Property {
    #[serde(rename = "id_imovel", deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(rename = "tipo", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(rename = "subtipo", deserialize_with = "null_as_default")]
    pub subtype: String,
    #[serde(rename = "id_condominio")]
    pub condominium_id: Option<i64>,
    #[serde(rename = "id_corretor", deserialize_with = "null_as_default")]
    pub broker_id: i64,
    #[serde(rename = "id_estado", deserialize_with = "null_as_default")]
    pub state_id: i64,
    #[serde(rename = "id_cidade", deserialize_with = "null_as_default")]
    pub city_id: i64,
    #[serde(rename = "id_bairro", deserialize_with = "null_as_default")]
    pub neighborhood_id: i64,
    #[serde(rename = "codigo", deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(rename = "contrato")]
    pub contracts: CommaList,
    #[serde(rename = "observacoes", deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(rename = "tipo_construcao")]
    pub building_type: Option<String>,
    #[serde(rename = "entrega_ano")]
    pub delivery_year: Option<i64>,
    #[serde(rename = "entrega_mes")]
    pub delivery_month: Option<i64>,
    #[serde(rename = "status", deserialize_with = "null_as_default")]
    pub building_status: String,
    #[serde(rename = "situacao", deserialize_with = "null_as_default")]
    pub occupancy_status: String,

    // Layout
    #[serde(rename = "mobiliado", deserialize_with = "null_as_default")]
    pub furnished: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub suites: i64,
    #[serde(rename = "banheiros", deserialize_with = "null_as_default")]
    pub bathrooms: i64,
    #[serde(rename = "dormitorios", deserialize_with = "null_as_default")]
    pub bedrooms: i64,
    #[serde(rename = "garagens", deserialize_with = "null_as_default")]
    pub garages: i64,
    #[serde(rename = "financiavel", deserialize_with = "null_as_default")]
    pub financeable: i64,
    #[serde(rename = "exclusividade", deserialize_with = "null_as_default")]
    pub has_exclusivity: bool,
    #[serde(rename = "permuta", deserialize_with = "null_as_default")]
    pub accepts_exchange: bool,
    #[serde(rename = "numero_pessoas")]
    pub allowed_guests: Option<i64>,
    #[serde(rename = "andar")]
    pub floor: Option<i64>,

    // Areas
    #[serde(rename = "area_total")]
    pub total_area: Option<f64>,
    #[serde(rename = "area_privativa")]
    pub private_area: Option<f64>,
    #[serde(rename = "area_util")]
    pub useful_area: Option<f64>,
    #[serde(rename = "medida", deserialize_with = "null_as_default")]
    pub measurement_type: String,
    #[serde(rename = "tipo_piso")]
    pub floor_types: CommaList,
    #[serde(rename = "terreno_frente")]
    pub terrain_front: Option<f64>,
    #[serde(rename = "terreno_fundos")]
    pub terrain_back: Option<f64>,
    #[serde(rename = "terreno_esquerdo")]
    pub terrain_left: Option<f64>,
    #[serde(rename = "terreno_direita")]
    pub terrain_right: Option<f64>,
    #[serde(rename = "terreno_total")]
    pub terrain_area: Option<f64>,
    #[serde(rename = "posicao")]
    pub position: Option<String>,
    #[serde(rename = "posicao_solar")]
    pub solar_positions: CommaList,
    #[serde(rename = "distancia_mar")]
    pub sea_distance: Option<i64>,

    // Prices
    #[serde(rename = "valor_condominio_visivel", deserialize_with = "null_as_default")]
    pub show_condominium_value: bool,
    #[serde(rename = "valor_condominio")]
    pub condominium_value: Option<f64>,
    #[serde(rename = "valor_venda_visivel", deserialize_with = "null_as_default")]
    pub show_sale_value: bool,
    #[serde(rename = "valor_venda")]
    pub sale_value: Option<f64>,
    #[serde(rename = "valor_locacao_visivel", deserialize_with = "null_as_default")]
    pub show_rental_value: bool,
    #[serde(rename = "valor_locacao")]
    pub rental_value: Option<f64>,
    #[serde(rename = "valor_temporada_visivel", deserialize_with = "null_as_default")]
    pub show_seasonal_value: bool,
    #[serde(rename = "valor_temporada")]
    pub seasonal_value: Option<f64>,
    #[serde(rename = "periodicidade_iptu")]
    pub iptu_frequency: Option<String>,
    #[serde(rename = "valor_iptu_isento", deserialize_with = "null_as_default")]
    pub iptu_exempt: String,
    #[serde(rename = "valor_iptu_visivel", deserialize_with = "null_as_default")]
    pub show_iptu_value: bool,
    #[serde(rename = "valor_iptu")]
    pub iptu_value: Option<f64>,
    #[serde(rename = "valor_seguro_incendio")]
    pub fire_insurance_value: Option<f64>,
    #[serde(rename = "valor_taxa_limpeza")]
    pub cleaning_fee_value: Option<f64>,
    #[serde(rename = "seguro_fianca")]
    pub surety_insurance: Option<bool>,
    #[serde(rename = "calendario_temporada")]
    pub season_calendar: JsonList<SeasonCalendar>,

    #[serde(deserialize_with = "null_as_default")]
    pub rural: Rural,

    // Listing
    #[serde(rename = "destaque")]
    pub featured: FeaturedFlag,
    #[serde(rename = "destaque_fim")]
    pub featured_until: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub meta_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub meta_description: String,
    #[serde(rename = "titulo_anuncio", deserialize_with = "null_as_default")]
    pub ad_title: String,
    #[serde(rename = "descricao_anuncio", deserialize_with = "null_as_default")]
    pub ad_description: String,
    #[serde(rename = "tags")]
    pub labels: CommaList,
    #[serde(rename = "imovel_comodidades")]
    pub property_infrastructures: CommaList,
    #[serde(rename = "condominio_comodidades")]
    pub condominium_infrastructures: CommaList,

    // Condominium summary
    #[serde(rename = "condominio_tipo")]
    pub condominium_type: Option<String>,
    #[serde(rename = "condominio_nome")]
    pub condominium_name: Option<String>,
    #[serde(rename = "condominio_fechado")]
    pub gated_condominium: Option<bool>,

    // Address
    #[serde(rename = "endereco_completamente_visivel", deserialize_with = "null_as_default")]
    pub show_full_address: bool,
    #[serde(rename = "endereco_estado_visivel", deserialize_with = "null_as_default")]
    pub show_address_state: bool,
    #[serde(rename = "endereco_cidade_visivel", deserialize_with = "null_as_default")]
    pub show_address_city: bool,
    #[serde(rename = "endereco_bairro_visivel", deserialize_with = "null_as_default")]
    pub show_address_neighborhood: bool,
    #[serde(rename = "endereco_logradouro_visivel", deserialize_with = "null_as_default")]
    pub show_address_street: bool,
    #[serde(rename = "endereco_referencia_visivel", deserialize_with = "null_as_default")]
    pub show_address_reference: bool,
    #[serde(rename = "endereco_numero_visivel", deserialize_with = "null_as_default")]
    pub show_address_number: bool,
    #[serde(rename = "andar_visivel", deserialize_with = "null_as_default")]
    pub show_address_floor: bool,
    #[serde(rename = "endereco_estado", deserialize_with = "null_as_default")]
    pub address_state: String,
    #[serde(rename = "endereco_cidade", deserialize_with = "null_as_default")]
    pub address_city: String,
    #[serde(rename = "endereco_bairro", deserialize_with = "null_as_default")]
    pub address_neighborhood: String,
    #[serde(rename = "endereco_logradouro", deserialize_with = "null_as_default")]
    pub address_street: String,
    #[serde(rename = "endereco_cep")]
    pub address_zipcode: Option<String>,
    #[serde(rename = "endereco_referencia", deserialize_with = "null_as_default")]
    pub address_reference: String,
    #[serde(rename = "endereco_numero", deserialize_with = "null_as_default")]
    pub address_number: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(rename = "geoposicionamento_visivel", deserialize_with = "null_as_default")]
    pub geoposition_visibility: i64,

    // Media
    pub videos: JsonList<Video>,
    #[serde(rename = "plantas")]
    pub blueprints: JsonList<Media>,
    #[serde(rename = "imagens")]
    pub images: JsonList<Media>,
    #[serde(rename = "tour360")]
    pub ar_tour: TextList,

    // Timestamps
    #[serde(rename = "data_cadastro")]
    pub created_at: Option<WsDateTime>,
    pub updated_at: Option<WsDateTime>,
    #[serde(rename = "data_atualizacao")]
    pub validated_at: Option<WsDateTime>,
}

impl Property {
    /// Replace contract names through `mapping`, matching keys case-insensitively.
    ///
    /// Contracts without an entry are kept as received.
    #[must_use]
    pub fn with_remapped_contracts(mut self, mapping: &BTreeMap<String, String>) -> Self {
        for contract in &mut self.contracts.0 {
            if let Some(remapped) = mapping.get(&contract.to_lowercase()) {
                contract.clone_from(remapped);
            }
        }
        self
    }
}

static PROPERTY_FIELDS: &[Field<Property>] = &[
    field!("id_imovel" => id: Integer),
    field!("tipo" => kind: Text),
    field!("subtipo" => subtype: Text),
    field!("id_condominio" => condominium_id: Integer),
    field!("id_corretor" => broker_id: Integer),
    field!("id_estado" => state_id: Integer),
    field!("id_cidade" => city_id: Integer),
    field!("id_bairro" => neighborhood_id: Integer),
    field!("codigo" => code: Text),
    field!("contrato" => contracts: Json),
    field!("observacoes" => notes: Text),
    field!("tipo_construcao" => building_type: Text),
    field!("entrega_ano" => delivery_year: Integer),
    field!("entrega_mes" => delivery_month: Integer),
    field!("status" => building_status: Text),
    field!("situacao" => occupancy_status: Text),
    field!("mobiliado" => furnished: Integer),
    field!("suites" => suites: Integer),
    field!("banheiros" => bathrooms: Integer),
    field!("dormitorios" => bedrooms: Integer),
    field!("garagens" => garages: Integer),
    field!("financiavel" => financeable: Integer),
    field!("exclusividade" => has_exclusivity: Bool),
    field!("permuta" => accepts_exchange: Bool),
    field!("numero_pessoas" => allowed_guests: Integer),
    field!("andar" => floor: Integer),
    field!("area_total" => total_area: Real),
    field!("area_privativa" => private_area: Real),
    field!("area_util" => useful_area: Real),
    field!("medida" => measurement_type: Text),
    field!("tipo_piso" => floor_types: Json),
    field!("terreno_frente" => terrain_front: Real),
    field!("terreno_fundos" => terrain_back: Real),
    field!("terreno_esquerdo" => terrain_left: Real),
    field!("terreno_direita" => terrain_right: Real),
    field!("terreno_total" => terrain_area: Real),
    field!("posicao" => position: Text),
    field!("posicao_solar" => solar_positions: Json),
    field!("distancia_mar" => sea_distance: Integer),
    field!("valor_condominio_visivel" => show_condominium_value: Bool),
    field!("valor_condominio" => condominium_value: Real),
    field!("valor_venda_visivel" => show_sale_value: Bool),
    field!("valor_venda" => sale_value: Real),
    field!("valor_locacao_visivel" => show_rental_value: Bool),
    field!("valor_locacao" => rental_value: Real),
    field!("valor_temporada_visivel" => show_seasonal_value: Bool),
    field!("valor_temporada" => seasonal_value: Real),
    field!("periodicidade_iptu" => iptu_frequency: Text),
    field!("valor_iptu_isento" => iptu_exempt: Text),
    field!("valor_iptu_visivel" => show_iptu_value: Bool),
    field!("valor_iptu" => iptu_value: Real),
    field!("valor_seguro_incendio" => fire_insurance_value: Real),
    field!("valor_taxa_limpeza" => cleaning_fee_value: Real),
    field!("seguro_fianca" => surety_insurance: Bool),
    field!("calendario_temporada" => season_calendar: Json),
    Field {
        remote: "rural.atividade_rural",
        local: "rural.activities",
        kind: FieldKind::Json,
        read: |p| p.rural.activities.to_column(),
    },
    Field {
        remote: "rural.rural_sedes",
        local: "rural.headquarters",
        kind: FieldKind::Integer,
        read: |p| p.rural.headquarters.to_column(),
    },
    Field {
        remote: "rural.rural_area_aravel",
        local: "rural.arable_area",
        kind: FieldKind::Real,
        read: |p| p.rural.arable_area.to_column(),
    },
    field!("destaque" => featured: Bool),
    field!("destaque_fim" => featured_until: Text),
    field!("meta_title" => meta_title: Text),
    field!("meta_description" => meta_description: Text),
    field!("titulo_anuncio" => ad_title: Text),
    field!("descricao_anuncio" => ad_description: Text),
    field!("tags" => labels: Json),
    field!("imovel_comodidades" => property_infrastructures: Json),
    field!("condominio_comodidades" => condominium_infrastructures: Json),
    field!("condominio_tipo" => condominium_type: Text),
    field!("condominio_nome" => condominium_name: Text),
    field!("condominio_fechado" => gated_condominium: Bool),
    field!("endereco_completamente_visivel" => show_full_address: Bool),
    field!("endereco_estado_visivel" => show_address_state: Bool),
    field!("endereco_cidade_visivel" => show_address_city: Bool),
    field!("endereco_bairro_visivel" => show_address_neighborhood: Bool),
    field!("endereco_logradouro_visivel" => show_address_street: Bool),
    field!("endereco_referencia_visivel" => show_address_reference: Bool),
    field!("endereco_numero_visivel" => show_address_number: Bool),
    field!("andar_visivel" => show_address_floor: Bool),
    field!("endereco_estado" => address_state: Text),
    field!("endereco_cidade" => address_city: Text),
    field!("endereco_bairro" => address_neighborhood: Text),
    field!("endereco_logradouro" => address_street: Text),
    field!("endereco_cep" => address_zipcode: Text),
    field!("endereco_referencia" => address_reference: Text),
    field!("endereco_numero" => address_number: Text),
    field!("latitude" => latitude: Real),
    field!("longitude" => longitude: Real),
    field!("geoposicionamento_visivel" => geoposition_visibility: Integer),
    field!("videos" => videos: Json),
    field!("plantas" => blueprints: Json),
    field!("imagens" => images: Json),
    field!("tour360" => ar_tour: Json),
    field!("data_cadastro" => created_at: DateTime),
    field!("updated_at" => updated_at: DateTime),
    field!("data_atualizacao" => validated_at: DateTime),
];

impl Identifiable for Property {
    fn identifier(&self) -> i64 {
        self.id
    }
}

impl Resource for Property {
    const KIND: ResourceKind = ResourceKind::Property;
    const IDENTITY_FIELD: &'static str = "id_imovel";

    fn schema() -> &'static [Field<Self>] {
        PROPERTY_FIELDS
    }
}
