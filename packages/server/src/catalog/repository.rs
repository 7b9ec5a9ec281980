use std::collections::{HashMap, HashSet};

use chrono::Utc;
use common::storage::{UploadStore, filename::basename};
use sea_orm::*;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::CatalogError;
use super::payload::{ProductPayload, ResolvedAsset, ResolvedMedia, validate_slug};
use crate::config::{CatalogConfig, CategoryDeletePolicy};
use crate::entity::{
    category, category_highlight, product, product_asset, product_customization,
    product_finish_option, product_material, product_media,
};

/// A category with its highlights, in display order.
#[derive(Debug, Clone)]
pub struct CategoryRecord {
    pub category: category::Model,
    pub highlights: Vec<String>,
}

/// A product with every child collection loaded and ordered.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub product: product::Model,
    pub category_slug: String,
    pub media: Vec<product_media::Model>,
    pub materials: Vec<String>,
    pub finish_options: Vec<String>,
    pub customizations: Vec<String>,
    pub assets: Vec<product_asset::Model>,
}

/// Normalized category write. `None` leaves a field untouched on update.
#[derive(Debug, Clone, Default)]
pub struct CategoryPayload {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub headline: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub hero_image: Option<Option<String>>,
    pub hero_alt: Option<Option<String>>,
    pub seo_title: Option<Option<String>>,
    pub seo_description: Option<Option<String>>,
    pub position: Option<i32>,
    pub highlights: Option<Vec<String>>,
}

/// Persistence for categories and products.
///
/// Every product write runs in one transaction; child collections present in
/// the payload are deleted and reinserted in a fixed order (media, materials,
/// finish options, customizations, assets).
pub struct CatalogRepository<'a> {
    db: &'a DatabaseConnection,
    uploads: &'a dyn UploadStore,
    config: &'a CatalogConfig,
    url_segment: String,
}

impl<'a> CatalogRepository<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        uploads: &'a dyn UploadStore,
        config: &'a CatalogConfig,
        url_segment: impl Into<String>,
    ) -> Self {
        Self {
            db,
            uploads,
            config,
            url_segment: url_segment.into(),
        }
    }

    pub fn url_segment(&self) -> &str {
        &self.url_segment
    }

    // ---------------------------------------------------------------------
    // Categories
    // ---------------------------------------------------------------------

    pub async fn list_categories(&self) -> Result<Vec<CategoryRecord>, CatalogError> {
        let categories = category::Entity::find()
            .order_by_asc(category::Column::Position)
            .order_by_asc(category::Column::Name)
            .all(self.db)
            .await?;
        Ok(load_category_records(self.db, categories).await?)
    }

    pub async fn get_category(&self, reference: &str) -> Result<CategoryRecord, CatalogError> {
        let category = find_category(self.db, reference)
            .await?
            .ok_or(CatalogError::CategoryNotFound)?;
        Ok(load_category_record(self.db, category).await?)
    }

    pub async fn create_category(
        &self,
        payload: CategoryPayload,
    ) -> Result<CategoryRecord, CatalogError> {
        let slug = payload
            .slug
            .ok_or(CatalogError::MissingRequiredField("slug"))?;
        let name = payload
            .name
            .ok_or(CatalogError::MissingRequiredField("name"))?;
        validate_slug(&slug)?;

        let txn = self.db.begin().await?;

        if find_category_by_slug(&txn, &slug).await?.is_some() {
            return Err(CatalogError::SlugTaken(slug));
        }

        let position = match payload.position {
            Some(position) => position,
            None => category::Entity::find().count(&txn).await? as i32,
        };

        let now = Utc::now();
        let model = category::ActiveModel {
            id: Set(Uuid::now_v7()),
            slug: Set(slug),
            name: Set(name),
            headline: Set(payload.headline.flatten()),
            description: Set(payload.description.flatten()),
            hero_image: Set(payload.hero_image.flatten()),
            hero_alt: Set(payload.hero_alt.flatten()),
            seo_title: Set(payload.seo_title.flatten()),
            seo_description: Set(payload.seo_description.flatten()),
            position: Set(position),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if let Some(highlights) = &payload.highlights {
            replace_highlights(&txn, model.id, highlights).await?;
        }

        let record = load_category_record(&txn, model).await?;
        txn.commit().await?;

        info!(category_id = %record.category.id, slug = %record.category.slug, "Category created");
        Ok(record)
    }

    pub async fn update_category(
        &self,
        reference: &str,
        payload: CategoryPayload,
    ) -> Result<CategoryRecord, CatalogError> {
        let existing = find_category(self.db, reference)
            .await?
            .ok_or(CatalogError::CategoryNotFound)?;

        if let Some(slug) = &payload.slug {
            validate_slug(slug)?;
        }

        let txn = self.db.begin().await?;

        if let Some(slug) = &payload.slug
            && let Some(other) = find_category_by_slug(&txn, slug).await?
            && other.id != existing.id
        {
            return Err(CatalogError::SlugTaken(slug.clone()));
        }

        let id = existing.id;
        let mut active: category::ActiveModel = existing.into();
        if let Some(slug) = payload.slug {
            active.slug = Set(slug);
        }
        if let Some(name) = payload.name {
            active.name = Set(name);
        }
        if let Some(headline) = payload.headline {
            active.headline = Set(headline);
        }
        if let Some(description) = payload.description {
            active.description = Set(description);
        }
        if let Some(hero_image) = payload.hero_image {
            active.hero_image = Set(hero_image);
        }
        if let Some(hero_alt) = payload.hero_alt {
            active.hero_alt = Set(hero_alt);
        }
        if let Some(seo_title) = payload.seo_title {
            active.seo_title = Set(seo_title);
        }
        if let Some(seo_description) = payload.seo_description {
            active.seo_description = Set(seo_description);
        }
        if let Some(position) = payload.position {
            active.position = Set(position);
        }
        active.updated_at = Set(Utc::now());
        let model = active.update(&txn).await?;

        if let Some(highlights) = &payload.highlights {
            replace_highlights(&txn, id, highlights).await?;
        }

        let record = load_category_record(&txn, model).await?;
        txn.commit().await?;

        info!(category_id = %id, "Category updated");
        Ok(record)
    }

    /// Delete a category, applying the configured policy to products that
    /// still reference it.
    pub async fn delete_category(&self, reference: &str) -> Result<(), CatalogError> {
        let existing = find_category(self.db, reference)
            .await?
            .ok_or(CatalogError::CategoryNotFound)?;

        let txn = self.db.begin().await?;

        let product_ids: Vec<Uuid> = product::Entity::find()
            .select_only()
            .column(product::Column::Id)
            .filter(product::Column::CategoryId.eq(existing.id))
            .into_tuple()
            .all(&txn)
            .await?;

        if !product_ids.is_empty() {
            match self.config.category_delete_policy {
                CategoryDeletePolicy::Reject => {
                    return Err(CatalogError::CategoryInUse(product_ids.len() as u64));
                }
                CategoryDeletePolicy::Cascade => {
                    for &product_id in &product_ids {
                        delete_product_rows(&txn, product_id).await?;
                    }
                }
            }
        }

        category_highlight::Entity::delete_many()
            .filter(category_highlight::Column::CategoryId.eq(existing.id))
            .exec(&txn)
            .await?;
        category::Entity::delete_by_id(existing.id).exec(&txn).await?;

        txn.commit().await?;

        info!(
            category_id = %existing.id,
            cascaded_products = product_ids.len(),
            "Category deleted"
        );
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Products
    // ---------------------------------------------------------------------

    /// Products ordered by name, optionally limited to one category slug.
    pub async fn list_products(
        &self,
        category_slug: Option<&str>,
    ) -> Result<Vec<ProductRecord>, CatalogError> {
        let mut query = product::Entity::find().order_by_asc(product::Column::Name);

        if let Some(slug) = category_slug {
            let Some(category) = find_category_by_slug(self.db, slug).await? else {
                return Ok(Vec::new());
            };
            query = query.filter(product::Column::CategoryId.eq(category.id));
        }

        let products = query.all(self.db).await?;
        Ok(load_product_records(self.db, products, self.config.assets_enabled).await?)
    }

    pub async fn get_product(&self, reference: &str) -> Result<ProductRecord, CatalogError> {
        let product = find_product(self.db, reference)
            .await?
            .ok_or(CatalogError::ProductNotFound)?;
        self.load_product(self.db, product).await
    }

    /// Insert a product and all of its children in one transaction.
    pub async fn create_product(
        &self,
        payload: &ProductPayload,
        media: &[ResolvedMedia],
    ) -> Result<ProductRecord, CatalogError> {
        let txn = self.db.begin().await?;

        let category_id = resolve_category_id(&txn, &payload.category).await?;
        if find_product_by_slug(&txn, &payload.slug).await?.is_some() {
            return Err(CatalogError::SlugTaken(payload.slug.clone()));
        }

        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(Uuid::now_v7()),
            slug: Set(payload.slug.clone()),
            name: Set(payload.name.clone()),
            category_id: Set(category_id),
            summary: Set(payload.summary.clone().flatten()),
            description: Set(payload.description.clone().flatten()),
            designer: Set(payload.designer.clone().flatten()),
            dimensions: Set(payload.dimensions.clone().flatten()),
            light_source: Set(payload.light_source.clone().flatten()),
            lead_time: Set(payload.lead_time.clone().flatten()),
            warranty: Set(payload.warranty.clone().flatten()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        insert_media(&txn, model.id, media).await?;
        insert_materials(&txn, model.id, payload.materials.as_deref().unwrap_or_default())
            .await?;
        insert_finish_options(
            &txn,
            model.id,
            payload.finish_options.as_deref().unwrap_or_default(),
        )
        .await?;
        insert_customizations(
            &txn,
            model.id,
            payload.customizations.as_deref().unwrap_or_default(),
        )
        .await?;
        if self.config.assets_enabled {
            insert_assets(&txn, model.id, payload.assets.as_deref().unwrap_or_default()).await?;
        }

        let record = self.load_product(&txn, model).await?;
        txn.commit().await?;

        info!(
            product_id = %record.product.id,
            slug = %record.product.slug,
            media = record.media.len(),
            "Product created"
        );
        Ok(record)
    }

    /// Update scalars and fully replace every collection present in the payload.
    ///
    /// `media` is `None` when the request did not carry a media list. Once the
    /// transaction commits, stored uploads dropped from the media list are
    /// removed from the upload store.
    pub async fn update_product(
        &self,
        reference: &str,
        payload: &ProductPayload,
        media: Option<&[ResolvedMedia]>,
    ) -> Result<ProductRecord, CatalogError> {
        let existing = find_product(self.db, reference)
            .await?
            .ok_or(CatalogError::ProductNotFound)?;
        let id = existing.id;

        let txn = self.db.begin().await?;

        let category_id = resolve_category_id(&txn, &payload.category).await?;
        if let Some(other) = find_product_by_slug(&txn, &payload.slug).await?
            && other.id != id
        {
            return Err(CatalogError::SlugTaken(payload.slug.clone()));
        }

        let mut active: product::ActiveModel = existing.into();
        active.slug = Set(payload.slug.clone());
        active.name = Set(payload.name.clone());
        active.category_id = Set(category_id);
        if let Some(summary) = &payload.summary {
            active.summary = Set(summary.clone());
        }
        if let Some(description) = &payload.description {
            active.description = Set(description.clone());
        }
        if let Some(designer) = &payload.designer {
            active.designer = Set(designer.clone());
        }
        if let Some(dimensions) = &payload.dimensions {
            active.dimensions = Set(dimensions.clone());
        }
        if let Some(light_source) = &payload.light_source {
            active.light_source = Set(light_source.clone());
        }
        if let Some(lead_time) = &payload.lead_time {
            active.lead_time = Set(lead_time.clone());
        }
        if let Some(warranty) = &payload.warranty {
            active.warranty = Set(warranty.clone());
        }
        active.updated_at = Set(Utc::now());
        let model = active.update(&txn).await?;

        let mut removed_srcs = Vec::new();
        if let Some(media) = media {
            let previous = product_media::Entity::find()
                .filter(product_media::Column::ProductId.eq(id))
                .all(&txn)
                .await?;
            let kept: HashSet<&str> = media.iter().map(|m| m.src.as_str()).collect();
            removed_srcs = previous
                .into_iter()
                .map(|m| m.src)
                .filter(|src| !kept.contains(src.as_str()))
                .collect();

            clear_media(&txn, id).await?;
            insert_media(&txn, id, media).await?;
        }
        if let Some(materials) = &payload.materials {
            product_material::Entity::delete_many()
                .filter(product_material::Column::ProductId.eq(id))
                .exec(&txn)
                .await?;
            insert_materials(&txn, id, materials).await?;
        }
        if let Some(finish_options) = &payload.finish_options {
            product_finish_option::Entity::delete_many()
                .filter(product_finish_option::Column::ProductId.eq(id))
                .exec(&txn)
                .await?;
            insert_finish_options(&txn, id, finish_options).await?;
        }
        if let Some(customizations) = &payload.customizations {
            product_customization::Entity::delete_many()
                .filter(product_customization::Column::ProductId.eq(id))
                .exec(&txn)
                .await?;
            insert_customizations(&txn, id, customizations).await?;
        }
        if self.config.assets_enabled
            && let Some(assets) = &payload.assets
        {
            product_asset::Entity::delete_many()
                .filter(product_asset::Column::ProductId.eq(id))
                .exec(&txn)
                .await?;
            insert_assets(&txn, id, assets).await?;
        }

        let record = self.load_product(&txn, model).await?;
        txn.commit().await?;

        info!(product_id = %id, removed_media = removed_srcs.len(), "Product updated");

        self.discard_stored_media(&removed_srcs).await;
        Ok(record)
    }

    /// Fail with `ProductNotFound` unless `reference` names a product.
    pub async fn ensure_product(&self, reference: &str) -> Result<(), CatalogError> {
        find_product(self.db, reference)
            .await?
            .map(|_| ())
            .ok_or(CatalogError::ProductNotFound)
    }

    /// Delete a product and its children. Stored uploads are left to the reconciler.
    pub async fn delete_product(&self, reference: &str) -> Result<(), CatalogError> {
        let existing = find_product(self.db, reference)
            .await?
            .ok_or(CatalogError::ProductNotFound)?;

        let txn = self.db.begin().await?;
        delete_product_rows(&txn, existing.id).await?;
        txn.commit().await?;

        info!(product_id = %existing.id, "Product deleted");
        Ok(())
    }

    /// Every media `src` currently stored, across all products.
    pub async fn media_sources(&self) -> Result<Vec<String>, CatalogError> {
        Ok(product_media::Entity::find()
            .select_only()
            .column(product_media::Column::Src)
            .into_tuple()
            .all(self.db)
            .await?)
    }

    /// Upload store filename behind a media `src`, if it points into the store.
    pub fn stored_filename<'s>(&self, src: &'s str) -> Option<&'s str> {
        src.strip_prefix(self.url_segment.as_str())
            .map(basename)
            .filter(|name| !name.is_empty())
    }

    /// Advisory removal of one upload store file.
    pub async fn discard_upload(&self, filename: &str) {
        self.uploads.discard(filename).await;
    }

    /// Remove the store files behind `srcs`, skipping any another media row still uses.
    async fn discard_stored_media(&self, srcs: &[String]) {
        if srcs.is_empty() {
            return;
        }
        let shared: HashSet<String> = match product_media::Entity::find()
            .select_only()
            .column(product_media::Column::Src)
            .filter(product_media::Column::Src.is_in(srcs.iter().cloned()))
            .into_tuple::<String>()
            .all(self.db)
            .await
        {
            Ok(rows) => rows.into_iter().collect(),
            Err(e) => {
                warn!(error = %e, "Could not check shared media, keeping files");
                return;
            }
        };

        for src in srcs.iter().filter(|src| !shared.contains(src.as_str())) {
            if let Some(filename) = self.stored_filename(src) {
                debug!(filename, "Removing media dropped by update");
                self.uploads.discard(filename).await;
            }
        }
    }

    async fn load_product<C: ConnectionTrait>(
        &self,
        conn: &C,
        product: product::Model,
    ) -> Result<ProductRecord, CatalogError> {
        let mut records =
            load_product_records(conn, vec![product], self.config.assets_enabled).await?;
        records.pop().ok_or(CatalogError::ProductNotFound)
    }
}

// -------------------------------------------------------------------------
// Lookups
// -------------------------------------------------------------------------

/// Find a category by UUID or, failing that, by slug.
async fn find_category<C: ConnectionTrait>(
    conn: &C,
    reference: &str,
) -> Result<Option<category::Model>, DbErr> {
    if let Ok(id) = Uuid::parse_str(reference)
        && let Some(found) = category::Entity::find_by_id(id).one(conn).await?
    {
        return Ok(Some(found));
    }
    find_category_by_slug(conn, reference).await
}

async fn find_category_by_slug<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
) -> Result<Option<category::Model>, DbErr> {
    category::Entity::find()
        .filter(category::Column::Slug.eq(slug))
        .one(conn)
        .await
}

/// Find a product by UUID or, failing that, by slug.
async fn find_product<C: ConnectionTrait>(
    conn: &C,
    reference: &str,
) -> Result<Option<product::Model>, DbErr> {
    if let Ok(id) = Uuid::parse_str(reference)
        && let Some(found) = product::Entity::find_by_id(id).one(conn).await?
    {
        return Ok(Some(found));
    }
    find_product_by_slug(conn, reference).await
}

async fn find_product_by_slug<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
) -> Result<Option<product::Model>, DbErr> {
    product::Entity::find()
        .filter(product::Column::Slug.eq(slug))
        .one(conn)
        .await
}

async fn resolve_category_id<C: ConnectionTrait>(
    conn: &C,
    reference: &str,
) -> Result<Uuid, CatalogError> {
    find_category(conn, reference)
        .await?
        .map(|c| c.id)
        .ok_or_else(|| CatalogError::UnknownCategory(reference.to_string()))
}

// -------------------------------------------------------------------------
// Child collections
// -------------------------------------------------------------------------

async fn replace_highlights<C: ConnectionTrait>(
    conn: &C,
    category_id: Uuid,
    highlights: &[String],
) -> Result<(), DbErr> {
    category_highlight::Entity::delete_many()
        .filter(category_highlight::Column::CategoryId.eq(category_id))
        .exec(conn)
        .await?;

    if highlights.is_empty() {
        return Ok(());
    }
    category_highlight::Entity::insert_many(highlights.iter().map(|content| {
        category_highlight::ActiveModel {
            category_id: Set(category_id),
            content: Set(content.clone()),
            ..Default::default()
        }
    }))
    .exec(conn)
    .await?;
    Ok(())
}

async fn clear_media<C: ConnectionTrait>(conn: &C, product_id: Uuid) -> Result<(), DbErr> {
    product_media::Entity::delete_many()
        .filter(product_media::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?;
    Ok(())
}

async fn insert_media<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    media: &[ResolvedMedia],
) -> Result<(), DbErr> {
    if media.is_empty() {
        return Ok(());
    }
    product_media::Entity::insert_many(media.iter().map(|m| product_media::ActiveModel {
        product_id: Set(product_id),
        position: Set(m.position),
        src: Set(m.src.clone()),
        alt: Set(m.alt.clone()),
        ..Default::default()
    }))
    .exec(conn)
    .await?;
    Ok(())
}

async fn insert_materials<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    names: &[String],
) -> Result<(), DbErr> {
    if names.is_empty() {
        return Ok(());
    }
    product_material::Entity::insert_many(names.iter().map(|name| {
        product_material::ActiveModel {
            product_id: Set(product_id),
            name: Set(name.clone()),
            ..Default::default()
        }
    }))
    .exec(conn)
    .await?;
    Ok(())
}

async fn insert_finish_options<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    names: &[String],
) -> Result<(), DbErr> {
    if names.is_empty() {
        return Ok(());
    }
    product_finish_option::Entity::insert_many(names.iter().map(|name| {
        product_finish_option::ActiveModel {
            product_id: Set(product_id),
            name: Set(name.clone()),
            ..Default::default()
        }
    }))
    .exec(conn)
    .await?;
    Ok(())
}

async fn insert_customizations<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    descriptions: &[String],
) -> Result<(), DbErr> {
    if descriptions.is_empty() {
        return Ok(());
    }
    product_customization::Entity::insert_many(descriptions.iter().map(|description| {
        product_customization::ActiveModel {
            product_id: Set(product_id),
            description: Set(description.clone()),
            ..Default::default()
        }
    }))
    .exec(conn)
    .await?;
    Ok(())
}

async fn insert_assets<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    assets: &[ResolvedAsset],
) -> Result<(), DbErr> {
    if assets.is_empty() {
        return Ok(());
    }
    product_asset::Entity::insert_many(assets.iter().map(|a| product_asset::ActiveModel {
        product_id: Set(product_id),
        kind: Set(a.kind.clone()),
        url: Set(a.url.clone()),
        title: Set(a.title.clone()),
        description: Set(a.description.clone()),
        ..Default::default()
    }))
    .exec(conn)
    .await?;
    Ok(())
}

/// Delete a product row together with every child row.
async fn delete_product_rows<C: ConnectionTrait>(conn: &C, product_id: Uuid) -> Result<(), DbErr> {
    clear_media(conn, product_id).await?;
    product_material::Entity::delete_many()
        .filter(product_material::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?;
    product_finish_option::Entity::delete_many()
        .filter(product_finish_option::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?;
    product_customization::Entity::delete_many()
        .filter(product_customization::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?;
    product_asset::Entity::delete_many()
        .filter(product_asset::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?;
    product::Entity::delete_by_id(product_id).exec(conn).await?;
    Ok(())
}

// -------------------------------------------------------------------------
// Loading
// -------------------------------------------------------------------------

async fn load_category_record<C: ConnectionTrait>(
    conn: &C,
    category: category::Model,
) -> Result<CategoryRecord, DbErr> {
    let mut records = load_category_records(conn, vec![category]).await?;
    records
        .pop()
        .ok_or_else(|| DbErr::RecordNotFound("category vanished while loading".into()))
}

async fn load_category_records<C: ConnectionTrait>(
    conn: &C,
    categories: Vec<category::Model>,
) -> Result<Vec<CategoryRecord>, DbErr> {
    let ids: Vec<Uuid> = categories.iter().map(|c| c.id).collect();
    let mut highlights: HashMap<Uuid, Vec<String>> = HashMap::new();

    if !ids.is_empty() {
        for row in category_highlight::Entity::find()
            .filter(category_highlight::Column::CategoryId.is_in(ids))
            .order_by_asc(category_highlight::Column::Id)
            .all(conn)
            .await?
        {
            highlights.entry(row.category_id).or_default().push(row.content);
        }
    }

    Ok(categories
        .into_iter()
        .map(|category| CategoryRecord {
            highlights: highlights.remove(&category.id).unwrap_or_default(),
            category,
        })
        .collect())
}

/// Load children for a batch of products with one query per collection.
async fn load_product_records<C: ConnectionTrait>(
    conn: &C,
    products: Vec<product::Model>,
    with_assets: bool,
) -> Result<Vec<ProductRecord>, DbErr> {
    if products.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let category_ids: HashSet<Uuid> = products.iter().map(|p| p.category_id).collect();

    let category_slugs: HashMap<Uuid, String> = category::Entity::find()
        .select_only()
        .column(category::Column::Id)
        .column(category::Column::Slug)
        .filter(category::Column::Id.is_in(category_ids))
        .into_tuple::<(Uuid, String)>()
        .all(conn)
        .await?
        .into_iter()
        .collect();

    let mut media: HashMap<Uuid, Vec<product_media::Model>> = HashMap::new();
    for row in product_media::Entity::find()
        .filter(product_media::Column::ProductId.is_in(ids.clone()))
        .order_by_asc(product_media::Column::Position)
        .order_by_asc(product_media::Column::Id)
        .all(conn)
        .await?
    {
        media.entry(row.product_id).or_default().push(row);
    }

    let mut materials: HashMap<Uuid, Vec<String>> = HashMap::new();
    for row in product_material::Entity::find()
        .filter(product_material::Column::ProductId.is_in(ids.clone()))
        .order_by_asc(product_material::Column::Id)
        .all(conn)
        .await?
    {
        materials.entry(row.product_id).or_default().push(row.name);
    }

    let mut finish_options: HashMap<Uuid, Vec<String>> = HashMap::new();
    for row in product_finish_option::Entity::find()
        .filter(product_finish_option::Column::ProductId.is_in(ids.clone()))
        .order_by_asc(product_finish_option::Column::Id)
        .all(conn)
        .await?
    {
        finish_options.entry(row.product_id).or_default().push(row.name);
    }

    let mut customizations: HashMap<Uuid, Vec<String>> = HashMap::new();
    for row in product_customization::Entity::find()
        .filter(product_customization::Column::ProductId.is_in(ids.clone()))
        .order_by_asc(product_customization::Column::Id)
        .all(conn)
        .await?
    {
        customizations
            .entry(row.product_id)
            .or_default()
            .push(row.description);
    }

    let mut assets: HashMap<Uuid, Vec<product_asset::Model>> = HashMap::new();
    if with_assets {
        for row in product_asset::Entity::find()
            .filter(product_asset::Column::ProductId.is_in(ids))
            .order_by_asc(product_asset::Column::Id)
            .all(conn)
            .await?
        {
            assets.entry(row.product_id).or_default().push(row);
        }
    }

    Ok(products
        .into_iter()
        .map(|product| {
            let id = product.id;
            ProductRecord {
                category_slug: category_slugs
                    .get(&product.category_id)
                    .cloned()
                    .unwrap_or_default(),
                media: media.remove(&id).unwrap_or_default(),
                materials: materials.remove(&id).unwrap_or_default(),
                finish_options: finish_options.remove(&id).unwrap_or_default(),
                customizations: customizations.remove(&id).unwrap_or_default(),
                assets: assets.remove(&id).unwrap_or_default(),
                product,
            }
        })
        .collect())
}
