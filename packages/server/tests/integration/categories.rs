use serde_json::json;

use catalog_server::config::CategoryDeletePolicy;

use crate::common::{TestApp, routes};

fn product_in(category_id: &str, slug: &str) -> serde_json::Value {
    json!({ "name": slug, "slug": slug, "categoryId": category_id })
}

mod creation {
    use super::*;

    #[tokio::test]
    async fn category_is_created_with_normalized_fields() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::CATEGORIES,
                &json!({
                    "slug": "lounge-chairs",
                    "name": "  Lounge Chairs ",
                    "headline": "   ",
                    "heroImage": "/uploads/hero.jpg",
                    "seo": { "title": "Lounge", "description": "Chairs to sink into" },
                    "highlights": ["Deep seats", "  ", " Solid oak "]
                }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["slug"], "lounge-chairs");
        assert_eq!(res.body["name"], "Lounge Chairs");
        assert!(res.body["headline"].is_null());
        assert_eq!(res.body["heroImage"], "/uploads/hero.jpg");
        assert_eq!(res.body["seo"]["title"], "Lounge");
        assert_eq!(res.strings("/highlights"), ["Deep seats", "Solid oak"]);
    }

    #[tokio::test]
    async fn missing_slug_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::CATEGORIES, &json!({ "name": "Sofas" })).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "MISSING_REQUIRED_FIELD");
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_conflict() {
        let app = TestApp::spawn().await;
        app.create_category("sofas", "Sofas").await;

        let res = app
            .post(routes::CATEGORIES, &json!({ "slug": "sofas", "name": "Other" }))
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn slug_with_spaces_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::CATEGORIES, &json!({ "slug": "two words", "name": "X" }))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn categories_are_ordered_by_position() {
        let app = TestApp::spawn().await;
        app.post(
            routes::CATEGORIES,
            &json!({ "slug": "tables", "name": "Tables", "position": 2 }),
        )
        .await;
        app.post(
            routes::CATEGORIES,
            &json!({ "slug": "lamps", "name": "Lamps", "position": 0 }),
        )
        .await;
        app.post(
            routes::CATEGORIES,
            &json!({ "slug": "sofas", "name": "Sofas", "position": 1 }),
        )
        .await;

        let res = app.get(routes::CATEGORIES).await;

        assert_eq!(res.status, 200);
        let slugs: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, ["lamps", "sofas", "tables"]);
    }

    #[tokio::test]
    async fn category_can_be_fetched_by_id_or_slug() {
        let app = TestApp::spawn().await;
        let id = app.create_category("sofas", "Sofas").await;

        let by_id = app.get(&routes::category(&id)).await;
        let by_slug = app.get(&routes::category("sofas")).await;

        assert_eq!(by_id.status, 200);
        assert_eq!(by_slug.status, 200);
        assert_eq!(by_id.body["id"], by_slug.body["id"]);
    }

    #[tokio::test]
    async fn unknown_category_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::category("nope")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn absent_fields_are_untouched_and_highlights_replaced() {
        let app = TestApp::spawn().await;
        let res = app
            .post(
                routes::CATEGORIES,
                &json!({
                    "slug": "sofas",
                    "name": "Sofas",
                    "headline": "Sit back",
                    "description": "Every sofa we make",
                    "highlights": ["A", "B"]
                }),
            )
            .await;
        let id = res.id();

        let res = app
            .put(
                &routes::category(&id),
                &json!({ "headline": null, "highlights": ["C"] }),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Sofas");
        assert!(res.body["headline"].is_null());
        assert_eq!(res.body["description"], "Every sofa we make");
        assert_eq!(res.strings("/highlights"), ["C"]);
    }

    #[tokio::test]
    async fn patch_is_accepted_too() {
        let app = TestApp::spawn().await;
        let id = app.create_category("sofas", "Sofas").await;

        let res = app
            .patch(&routes::category(&id), &json!({ "name": "Couches" }))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Couches");
    }

    #[tokio::test]
    async fn taking_another_categorys_slug_is_a_conflict() {
        let app = TestApp::spawn().await;
        app.create_category("sofas", "Sofas").await;
        let id = app.create_category("lamps", "Lamps").await;

        let res = app
            .put(&routes::category(&id), &json!({ "slug": "sofas" }))
            .await;

        assert_eq!(res.status, 409);
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn empty_category_is_deleted() {
        let app = TestApp::spawn().await;
        let id = app.create_category("sofas", "Sofas").await;

        let res = app.delete(&routes::category(&id)).await;
        assert_eq!(res.status, 204);

        let res = app.get(&routes::category(&id)).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn deleting_a_missing_category_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.delete(&routes::category("ghost")).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn category_with_products_is_kept_by_default() {
        let app = TestApp::spawn().await;
        let id = app.create_category("sofas", "Sofas").await;
        app.create_product(&product_in(&id, "arc-sofa")).await;

        let res = app.delete(&routes::category(&id)).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
        assert_eq!(app.get(&routes::product("arc-sofa")).await.status, 200);
    }

    #[tokio::test]
    async fn cascade_policy_deletes_products_too() {
        let app = TestApp::spawn_with(|config| {
            config.catalog.category_delete_policy = CategoryDeletePolicy::Cascade;
        })
        .await;
        let id = app.create_category("sofas", "Sofas").await;
        app.create_product(&product_in(&id, "arc-sofa")).await;

        let res = app.delete(&routes::category(&id)).await;

        assert_eq!(res.status, 204, "{}", res.text);
        assert_eq!(app.get(&routes::product("arc-sofa")).await.status, 404);
    }
}
