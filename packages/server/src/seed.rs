use anyhow::Context;
use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder, SqliteQueryBuilder};
use sea_orm::*;
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::entity::{admin_user, product, product_media};
use crate::utils::hash;

const MEDIA_INDEX: &str = "idx_product_media_product_position";
const PRODUCTS_INDEX: &str = "idx_products_category_name";

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Media listing: WHERE product_id = ? ORDER BY position
    let media = Index::create()
        .if_not_exists()
        .name(MEDIA_INDEX)
        .table(product_media::Entity)
        .col(product_media::Column::ProductId)
        .col(product_media::Column::Position)
        .to_owned();

    // Category filter: WHERE category_id = ? ORDER BY name
    let products = Index::create()
        .if_not_exists()
        .name(PRODUCTS_INDEX)
        .table(product::Entity)
        .col(product::Column::CategoryId)
        .col(product::Column::Name)
        .to_owned();

    create_index(db, MEDIA_INDEX, &media).await;
    create_index(db, PRODUCTS_INDEX, &products).await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: &IndexCreateStatement) {
    let sql = match db.get_database_backend() {
        DbBackend::Postgres => stmt.to_string(PostgresQueryBuilder),
        DbBackend::Sqlite => stmt.to_string(SqliteQueryBuilder),
        backend => {
            warn!(index = name, ?backend, "Skipping index on unsupported backend");
            return;
        }
    };

    match db.execute_unprepared(&sql).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) => warn!("Failed to create index {}: {}", name, e),
    }
}

/// Upsert the configured admin account.
///
/// Does nothing unless both `admin_email` and `admin_password` are set. An
/// existing account keeps its id; its password is replaced when it no longer
/// matches the configured one.
pub async fn ensure_admin(db: &DatabaseConnection, auth: &AuthConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&auth.admin_email, &auth.admin_password) else {
        return Ok(());
    };
    let email = email.trim().to_lowercase();
    if email.is_empty() || password.is_empty() {
        warn!("Ignoring admin account with empty email or password");
        return Ok(());
    }

    let existing = admin_user::Entity::find()
        .filter(admin_user::Column::Email.eq(&email))
        .one(db)
        .await?;

    match existing {
        Some(admin) => {
            let matches = hash::verify_password(password, &admin.password).unwrap_or(false);
            if !matches {
                let hashed = hash::hash_password(password)
                    .map_err(|e| anyhow::anyhow!("Password hash error: {e}"))?;
                let mut active: admin_user::ActiveModel = admin.into();
                active.password = Set(hashed);
                active.update(db).await.context("updating admin password")?;
                info!(%email, "Updated admin password");
            }
        }
        None => {
            let hashed = hash::hash_password(password)
                .map_err(|e| anyhow::anyhow!("Password hash error: {e}"))?;
            admin_user::ActiveModel {
                email: Set(email.clone()),
                password: Set(hashed),
                created_at: Set(chrono::Utc::now()),
                ..Default::default()
            }
            .insert(db)
            .await
            .context("creating admin account")?;
            info!(%email, "Created admin account");
        }
    }

    Ok(())
}
