use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category_highlights")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub category_id: Uuid,
    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: HasOne<super::category::Entity>,

    pub content: String,
}

impl ActiveModelBehavior for ActiveModel {}
