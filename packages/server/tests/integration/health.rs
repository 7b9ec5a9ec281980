use crate::common::{TestApp, routes};

#[tokio::test]
async fn health_reports_ok_when_database_answers() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::HEALTH).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["status"], "ok");
}

#[tokio::test]
async fn api_reference_is_served() {
    let app = TestApp::spawn().await;

    let res = app.get("/scalar").await;

    assert_eq!(res.status, 200);
    assert!(res.text.contains("<html"), "expected an HTML page");
}
