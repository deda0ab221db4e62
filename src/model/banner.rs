//! Banner model.
//!
//! Banners are the rotating images/videos of the agency's website.

use serde::Deserialize;

use crate::model::values::{null_as_default, IntBool};
use crate::model::ResourceKind;
use crate::schema::{field, Field, Identifiable, Resource};

/// A website banner.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Banner {
    #[serde(rename = "id_banner", deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(rename = "id_imagem", deserialize_with = "null_as_default")]
    pub image_id: i64,
    #[serde(rename = "link")]
    pub url: Option<String>,
    #[serde(rename = "ordem", deserialize_with = "null_as_default")]
    pub order: i64,
    #[serde(rename = "titulo")]
    pub title: Option<String>,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "abrir_em", deserialize_with = "null_as_default")]
    pub href_target: String,
    pub is_video: IntBool,
    #[serde(rename = "video", deserialize_with = "null_as_default")]
    pub video_url: String,
    #[serde(rename = "imagem", deserialize_with = "null_as_default")]
    pub image_url: String,
}

static BANNER_FIELDS: &[Field<Banner>] = &[
    field!("id_banner" => id: Integer),
    field!("id_imagem" => image_id: Integer),
    field!("link" => url: Text),
    field!("ordem" => order: Integer),
    field!("titulo" => title: Text),
    field!("descricao" => description: Text),
    field!("abrir_em" => href_target: Text),
    field!("is_video" => is_video: Bool),
    field!("video" => video_url: Text),
    field!("imagem" => image_url: Text),
];

impl Identifiable for Banner {
    fn identifier(&self) -> i64 {
        self.id
    }
}

impl Resource for Banner {
    const KIND: ResourceKind = ResourceKind::Banner;
    const IDENTITY_FIELD: &'static str = "id_banner";

    fn schema() -> &'static [Field<Self>] {
        BANNER_FIELDS
    }
}
