use serde_json::json;

use crate::common::{ADMIN_EMAIL, ADMIN_PASSWORD, TestApp, routes};

mod login {
    use super::*;

    #[tokio::test]
    async fn seeded_admin_can_log_in() {
        let app = TestApp::spawn_with_auth().await;

        let res = app
            .post(
                routes::LOGIN,
                &json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(res.body["user"]["email"], ADMIN_EMAIL);
    }

    #[tokio::test]
    async fn email_is_matched_case_insensitively() {
        let app = TestApp::spawn_with_auth().await;

        let res = app
            .post(
                routes::LOGIN,
                &json!({ "email": "  ADMIN@example.com ", "password": ADMIN_PASSWORD }),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn_with_auth().await;

        let res = app
            .post(
                routes::LOGIN,
                &json!({ "email": ADMIN_EMAIL, "password": "not-the-password" }),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn empty_email_is_a_validation_error() {
        let app = TestApp::spawn_with_auth().await;

        let res = app
            .post(routes::LOGIN, &json!({ "email": " ", "password": "x" }))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod guarded_writes {
    use super::*;

    #[tokio::test]
    async fn catalog_writes_need_a_token() {
        let app = TestApp::spawn_with_auth().await;

        let res = app
            .post(routes::CATEGORIES, &json!({ "slug": "sofas", "name": "Sofas" }))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn malformed_token_is_rejected() {
        let mut app = TestApp::spawn_with_auth().await;
        app.token = Some("not-a-jwt".into());

        let res = app.post(routes::CLEANUP, &json!({})).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn reads_stay_public() {
        let app = TestApp::spawn_with_auth().await;

        assert_eq!(app.get(routes::CATEGORIES).await.status, 200);
        assert_eq!(app.get(routes::PRODUCTS).await.status, 200);
    }

    #[tokio::test]
    async fn logged_in_admin_can_write() {
        let mut app = TestApp::spawn_with_auth().await;
        app.login().await;

        let res = app
            .post(routes::CATEGORIES, &json!({ "slug": "sofas", "name": "Sofas" }))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
    }
}

mod session {
    use super::*;

    #[tokio::test]
    async fn session_describes_the_logged_in_admin() {
        let mut app = TestApp::spawn_with_auth().await;
        app.login().await;

        let res = app.get(routes::SESSION).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["email"], ADMIN_EMAIL);
        assert_eq!(res.body["authEnabled"], true);
        assert!(res.body["id"].is_number());
    }

    #[tokio::test]
    async fn disabled_auth_yields_an_anonymous_session() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::SESSION).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["authEnabled"], false);
        assert!(res.body["id"].is_null());
    }
}
