use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,

    pub category_id: Uuid,
    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: HasOne<super::category::Entity>,

    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    // Spec sheet
    pub designer: Option<String>,
    pub dimensions: Option<String>,
    pub light_source: Option<String>,
    pub lead_time: Option<String>,
    pub warranty: Option<String>,

    #[sea_orm(has_many)]
    pub media: HasMany<super::product_media::Entity>,
    #[sea_orm(has_many)]
    pub materials: HasMany<super::product_material::Entity>,
    #[sea_orm(has_many)]
    pub finish_options: HasMany<super::product_finish_option::Entity>,
    #[sea_orm(has_many)]
    pub customizations: HasMany<super::product_customization::Entity>,
    #[sea_orm(has_many)]
    pub assets: HasMany<super::product_asset::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
