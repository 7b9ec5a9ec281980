use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::shared::{double_option, non_blank, normalize_nullable};
use crate::catalog::CategoryRecord;
use crate::catalog::payload::normalize_text;
use crate::catalog::repository::CategoryPayload;
use crate::error::AppError;

/// Create or update body for a category.
///
/// On update every field is optional; absent fields are left untouched and
/// `null` clears a nullable field.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[schema(example = "lounge-chairs")]
    pub slug: Option<String>,
    #[schema(example = "Lounge Chairs")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub headline: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, example = "/uploads/lounge-1700000000000-42.jpg")]
    pub hero_image: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub hero_alt: Option<Option<String>>,
    #[serde(default)]
    pub seo: Option<SeoRequest>,
    /// Sort key; new categories default to the end of the list.
    pub position: Option<i32>,
    /// Replaces the whole highlight list when present.
    pub highlights: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SeoRequest {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

impl CategoryRequest {
    pub fn into_payload(self) -> Result<CategoryPayload, AppError> {
        let seo = self.seo.unwrap_or_default();
        Ok(CategoryPayload {
            slug: non_blank(self.slug, "slug")?,
            name: non_blank(self.name, "name")?,
            headline: normalize_nullable(self.headline),
            description: normalize_nullable(self.description),
            hero_image: normalize_nullable(self.hero_image),
            hero_alt: normalize_nullable(self.hero_alt),
            seo_title: normalize_nullable(seo.title),
            seo_description: normalize_nullable(seo.description),
            position: self.position,
            highlights: self.highlights.map(|items| {
                items
                    .iter()
                    .filter_map(|item| normalize_text(item))
                    .collect()
            }),
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SeoResponse {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    #[schema(example = "lounge-chairs")]
    pub slug: String,
    #[schema(example = "Lounge Chairs")]
    pub name: String,
    pub headline: Option<String>,
    pub description: Option<String>,
    pub hero_image: Option<String>,
    pub hero_alt: Option<String>,
    pub seo: SeoResponse,
    pub highlights: Vec<String>,
    pub position: i32,
}

impl From<CategoryRecord> for CategoryResponse {
    fn from(record: CategoryRecord) -> Self {
        let category = record.category;
        Self {
            id: category.id,
            slug: category.slug,
            name: category.name,
            headline: category.headline,
            description: category.description,
            hero_image: category.hero_image,
            hero_alt: category.hero_alt,
            seo: SeoResponse {
                title: category.seo_title,
                description: category.seo_description,
            },
            highlights: record.highlights,
            position: category.position,
        }
    }
}
