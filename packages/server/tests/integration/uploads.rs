use serde_json::json;

use crate::common::{TestApp, routes};

mod cleanup {
    use super::*;

    #[tokio::test]
    async fn unreferenced_files_are_removed_once() {
        let app = TestApp::spawn().await;
        let category = app.create_category("lounge", "Lounge").await;
        for name in ["a.png", "b.png", "c.png"] {
            app.place_file(name, b"img");
        }
        app.create_product(&json!({
            "name": "Arc",
            "slug": "arc",
            "categoryId": category,
            "media": [{ "src": "/uploads/a.png" }]
        }))
        .await;

        let res = app.post(routes::CLEANUP, &json!({})).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["totalRemoved"], 2);
        let mut removed = res.strings("/removed");
        removed.sort();
        assert_eq!(removed, ["b.png", "c.png"]);
        assert_eq!(app.stored_files(), ["a.png"]);

        let again = app.post(routes::CLEANUP, &json!({})).await;
        assert_eq!(again.body["totalRemoved"], 0);
        assert_eq!(app.stored_files(), ["a.png"]);
    }

    #[tokio::test]
    async fn placeholder_entry_is_never_removed() {
        let app = TestApp::spawn().await;
        app.place_file(".gitkeep", b"");
        app.place_file("stray.png", b"img");

        let res = app.post(routes::CLEANUP, &json!({})).await;

        assert_eq!(res.body["totalRemoved"], 1);
        assert!(app.uploads_dir.join(".gitkeep").exists());
    }

    #[tokio::test]
    async fn grace_period_spares_fresh_files() {
        let app = TestApp::spawn_with(|config| config.catalog.reconcile_grace_secs = 3600).await;
        app.place_file("fresh.png", b"img");

        let res = app.post(routes::CLEANUP, &json!({})).await;

        assert_eq!(res.body["totalRemoved"], 0);
        assert_eq!(app.stored_files(), ["fresh.png"]);
    }

    #[tokio::test]
    async fn absolute_media_urls_still_count_as_references() {
        let app = TestApp::spawn().await;
        let category = app.create_category("lounge", "Lounge").await;
        app.place_file("kept.png", b"img");
        app.create_product(&json!({
            "name": "Arc",
            "slug": "arc",
            "categoryId": category,
            "media": [{ "src": "https://cdn.example.com/uploads/kept.png" }]
        }))
        .await;

        let res = app.post(routes::CLEANUP, &json!({})).await;

        assert_eq!(res.body["totalRemoved"], 0);
    }
}

mod serving {
    use super::*;

    #[tokio::test]
    async fn stored_file_is_served_with_its_content_type() {
        let app = TestApp::spawn().await;
        app.place_file("photo.png", b"png-bytes");

        let res = app
            .client
            .get(format!("http://{}{}", app.addr, routes::upload("photo.png")))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["content-type"], "image/png");
        assert_eq!(res.bytes().await.unwrap().as_ref(), b"png-bytes");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::upload("nope.png")).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn hidden_entries_are_not_served() {
        let app = TestApp::spawn().await;
        app.place_file(".gitkeep", b"");

        let res = app.get(&routes::upload(".gitkeep")).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn encoded_traversal_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::upload("..%2Fcatalog.db")).await;

        assert_eq!(res.status, 400);
    }
}
