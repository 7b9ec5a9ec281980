use axum::routing::patch;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
        .nest("/catalog/categories", category_routes())
        .nest("/catalog/products", product_routes(config))
        .nest("/uploads", upload_routes())
}

fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::health::health))
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::auth::login))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::auth::session))
}

fn category_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::category::list_categories,
            handlers::category::create_category
        ))
        .routes(routes!(
            handlers::category::get_category,
            handlers::category::update_category,
            handlers::category::delete_category
        ))
        .route("/{id}", patch(handlers::category::update_category))
}

fn product_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::product::list_products,
            handlers::product::create_product
        ))
        .routes(routes!(
            handlers::product::get_product,
            handlers::product::update_product,
            handlers::product::delete_product
        ))
        .route("/{id}", patch(handlers::product::update_product))
        .layer(handlers::product::product_body_limit(&config.storage))
}

fn upload_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::uploads::cleanup_uploads))
}
