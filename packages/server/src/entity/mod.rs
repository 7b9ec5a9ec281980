pub mod admin_user;
pub mod category;
pub mod category_highlight;
pub mod product;
pub mod product_asset;
pub mod product_customization;
pub mod product_finish_option;
pub mod product_material;
pub mod product_media;
