use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::catalog::ProductRecord;
use crate::entity::{product_asset, product_media};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Only return products in the category with this slug.
    #[param(example = "lounge-chairs")]
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MediaResponse {
    pub id: i32,
    #[schema(example = "/uploads/chair-1700000000000-42.jpg")]
    pub src: String,
    pub alt: Option<String>,
    /// Zero-based display position.
    pub order: i32,
}

impl From<product_media::Model> for MediaResponse {
    fn from(m: product_media::Model) -> Self {
        Self {
            id: m.id,
            src: m.src,
            alt: m.alt,
            order: m.position,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssetResponse {
    pub id: i32,
    #[serde(rename = "type")]
    #[schema(example = "pdf")]
    pub kind: String,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl From<product_asset::Model> for AssetResponse {
    fn from(a: product_asset::Model) -> Self {
        Self {
            id: a.id,
            kind: a.kind,
            url: a.url,
            title: a.title,
            description: a.description,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpecsResponse {
    pub designer: Option<String>,
    pub dimensions: Option<String>,
    pub materials: Vec<String>,
    pub finish_options: Vec<String>,
    pub light_source: Option<String>,
    pub lead_time: Option<String>,
    pub warranty: Option<String>,
    pub customization: Vec<String>,
}

/// Full product representation returned by every product endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    #[schema(example = "arc-lounge-chair")]
    pub slug: String,
    pub category_id: Uuid,
    #[schema(example = "lounge-chairs")]
    pub category_slug: String,
    #[schema(example = "Arc Lounge Chair")]
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub media: Vec<MediaResponse>,
    pub assets: Vec<AssetResponse>,
    pub specs: SpecsResponse,
}

impl From<ProductRecord> for ProductResponse {
    fn from(record: ProductRecord) -> Self {
        let p = record.product;
        Self {
            id: p.id,
            slug: p.slug,
            category_id: p.category_id,
            category_slug: record.category_slug,
            name: p.name,
            summary: p.summary,
            description: p.description,
            media: record.media.into_iter().map(MediaResponse::from).collect(),
            assets: record.assets.into_iter().map(AssetResponse::from).collect(),
            specs: SpecsResponse {
                designer: p.designer,
                dimensions: p.dimensions,
                materials: record.materials,
                finish_options: record.finish_options,
                light_source: p.light_source,
                lead_time: p.lead_time,
                warranty: p.warranty,
                customization: record.customizations,
            },
        }
    }
}
