use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_media")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub product_id: Uuid,
    #[sea_orm(belongs_to, from = "product_id", to = "id")]
    pub product: HasOne<super::product::Entity>,

    /// Dense 0..N-1 presentation order.
    pub position: i32,
    /// `/uploads/<filename>` for stored files, otherwise an external URL.
    #[sea_orm(column_type = "Text")]
    pub src: String,
    pub alt: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}
