//! Dashboard and the read-only listings.

use axum::http::StatusCode;
use marketmate_admin::db::Collection;
use marketmate_integration_tests::{TestApp, body_text};
use mongodb::bson::doc;

const EMAIL: &str = "ops@marketmate.io";
const PASSWORD: &str = "hunter22!";

async fn logged_in() -> (TestApp, String) {
    let app = TestApp::new();
    app.seed_admin(EMAIL, PASSWORD).await;
    let cookie = app.login(EMAIL, PASSWORD).await;
    (app, cookie)
}

#[tokio::test]
async fn test_dashboard_numbers() {
    let (app, cookie) = logged_in().await;
    let store = app.store().inner();
    store
        .seed(Collection::Devices, [doc! { "name": "cam-1" }, doc! { "name": "cam-2" }])
        .await;
    store
        .seed(Collection::Images, (0..3).map(|i| doc! { "n": i }))
        .await;
    store
        .seed(
            Collection::AnalysisResults,
            [
                doc! { "quality_score": 0.8 },
                doc! { "quality_score": 0.3, "error_flag": true },
                doc! { "note": "pending" },
            ],
        )
        .await;

    let response = app.get("/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains(r#"<span class="label">Devices</span><span class="value">2</span>"#));
    assert!(body.contains(r#"<span class="label">Images</span><span class="value">3</span>"#));
    assert!(body.contains(r#"<span class="label">Feedbacks</span><span class="value">0</span>"#));
    assert!(body.contains(r#"<span class="label">Average score</span><span class="value">0.55</span>"#));
    assert!(body.contains(r#"<span class="label">Excellent</span><span class="value">1</span>"#));
    assert!(body.contains(r#"<span class="label">Low</span><span class="value">0</span>"#));
    assert!(body.contains(r#"<span class="label">Errors</span><span class="value">1</span>"#));
}

#[tokio::test]
async fn test_empty_dashboard() {
    let (app, cookie) = logged_in().await;

    let body = body_text(app.get("/", Some(&cookie)).await).await;
    assert!(body.contains(r#"<span class="label">Admins</span><span class="value">1</span>"#));
    assert!(body.contains(r#"<span class="label">Average score</span><span class="value">0.00</span>"#));
}

#[tokio::test]
async fn test_device_pagination() {
    let (app, cookie) = logged_in().await;
    app.store()
        .inner()
        .seed(
            Collection::Devices,
            (1..=25).map(|i| doc! { "serial": format!("SN{i:03}") }),
        )
        .await;

    let first = body_text(app.get("/devices", Some(&cookie)).await).await;
    assert!(first.contains("SN001"));
    assert!(first.contains("SN010"));
    assert!(!first.contains("SN011"));
    assert!(first.contains("/devices?page=2"));
    assert!(!first.contains("Previous"));

    let last = body_text(app.get("/devices?page=3", Some(&cookie)).await).await;
    assert!(last.contains("SN021"));
    assert!(last.contains("SN025"));
    assert!(!last.contains("SN020"));
    assert!(last.contains("/devices?page=2"));
    assert!(!last.contains("/devices?page=4"));

    for bad in ["abc", "0", "-1"] {
        let body = body_text(app.get(&format!("/devices?page={bad}"), Some(&cookie)).await).await;
        assert!(body.contains("SN001"), "page={bad}");
    }

    let beyond = app.get("/devices?page=9", Some(&cookie)).await;
    assert_eq!(beyond.status(), StatusCode::OK);
    assert!(body_text(beyond).await.contains("No records on this page."));
}

#[tokio::test]
async fn test_every_listing_renders() {
    let (app, cookie) = logged_in().await;
    let store = app.store().inner();
    store.seed(Collection::Images, [doc! { "path": "img/0001.jpg" }]).await;
    store
        .seed(Collection::AnalysisResults, [doc! { "quality_score": 0.91 }])
        .await;
    store
        .seed(Collection::Feedbacks, [doc! { "comment": "blurry <b>photo</b>" }])
        .await;

    let body = body_text(app.get("/images", Some(&cookie)).await).await;
    assert!(body.contains("Images"));
    assert!(body.contains("img/0001.jpg"));

    let body = body_text(app.get("/analysis", Some(&cookie)).await).await;
    assert!(body.contains("Analysis Results"));
    assert!(body.contains("0.91"));

    let body = body_text(app.get("/feedbacks", Some(&cookie)).await).await;
    assert!(body.contains("Feedbacks"));
    assert!(body.contains("blurry &#60;b&#62;photo&#60;/b&#62;") || body.contains("blurry &lt;b&gt;photo&lt;/b&gt;"));
    assert!(!body.contains("<b>photo</b>"));
}

#[tokio::test]
async fn test_store_failure_renders_generic_error() {
    let (app, cookie) = logged_in().await;
    app.store().break_data_access();

    let response = app.get("/devices", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_text(response).await;
    assert!(body.contains("Something went wrong"));
    assert!(!body.contains("test store"));
}
