//! Admin management over HTTP.

use axum::http::StatusCode;
use marketmate_admin::db::Collection;
use marketmate_admin::services::auth::verify_password;
use marketmate_integration_tests::{TestApp, body_text, location};

const EMAIL: &str = "ops@marketmate.io";
const PASSWORD: &str = "hunter22!";

async fn logged_in() -> (TestApp, marketmate_core::AdminId, String) {
    let app = TestApp::new();
    let id = app.seed_admin(EMAIL, PASSWORD).await;
    let cookie = app.login(EMAIL, PASSWORD).await;
    (app, id, cookie)
}

async fn admin_count(app: &TestApp) -> usize {
    app.store().inner().documents(Collection::Admins).await.len()
}

#[tokio::test]
async fn test_list_shows_admins_without_hashes() {
    let (app, id, cookie) = logged_in().await;
    app.seed_admin("second@marketmate.io", "another-pass").await;

    let response = app.get("/admins", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains(EMAIL));
    assert!(body.contains("second@marketmate.io"));
    assert!(body.contains(id.as_str()));
    assert!(!body.contains("$argon2"));
}

#[tokio::test]
async fn test_own_row_has_no_delete_link() {
    let (app, id, cookie) = logged_in().await;

    let body = body_text(app.get("/admins", Some(&cookie)).await).await;
    assert!(!body.contains(&format!("/admins/{id}/delete")));
}

#[tokio::test]
async fn test_add_admin() {
    let (app, _, cookie) = logged_in().await;

    let response = app
        .post_form(
            "/admins/add",
            "email=new@marketmate.io&password=longenough",
            Some(&cookie),
        )
        .await;
    assert_eq!(location(&response), Some("/admins"));
    assert_eq!(admin_count(&app).await, 2);

    let response = app
        .post_form(
            "/add_admin",
            "email=other@marketmate.io&password=longenough",
            Some(&cookie),
        )
        .await;
    assert_eq!(location(&response), Some("/admins"));
    assert_eq!(admin_count(&app).await, 3);

    app.login("new@marketmate.io", "longenough").await;
}

#[tokio::test]
async fn test_add_rejects_bad_input() {
    let (app, _, cookie) = logged_in().await;

    let response = app
        .post_form("/admins/add", "email=new@marketmate.io&password=short", Some(&cookie))
        .await;
    assert_eq!(location(&response), Some("/admins?error=weak_password"));

    let response = app
        .post_form("/admins/add", "email=not-an-email&password=longenough", Some(&cookie))
        .await;
    assert_eq!(location(&response), Some("/admins?error=invalid_email"));

    assert_eq!(admin_count(&app).await, 1);

    let body = body_text(app.get("/admins?error=weak_password", Some(&cookie)).await).await;
    assert!(body.contains("at least 8 characters"));
}

#[tokio::test]
async fn test_self_delete_is_refused() {
    let (app, id, cookie) = logged_in().await;

    let response = app.get(&format!("/admins/{id}/delete"), Some(&cookie)).await;
    assert_eq!(location(&response), Some("/admins?error=self_delete"));
    assert!(app.admin(&id).await.is_some());

    let body = body_text(app.get("/admins?error=self_delete", Some(&cookie)).await).await;
    assert!(body.contains("cannot delete the account you are logged in with"));
}

#[tokio::test]
async fn test_delete_other_admin() {
    let (app, _, cookie) = logged_in().await;
    let other = app.seed_admin("other@marketmate.io", "another-pass").await;

    let response = app.get(&format!("/delete_admin/{other}"), Some(&cookie)).await;
    assert_eq!(location(&response), Some("/admins"));
    assert!(app.admin(&other).await.is_none());

    // Unknown ids are a no-op.
    let response = app.get("/admins/ADMmissing/delete", Some(&cookie)).await;
    assert_eq!(location(&response), Some("/admins"));
    assert_eq!(admin_count(&app).await, 1);
}

#[tokio::test]
async fn test_deleted_admin_loses_access() {
    let (app, _, cookie) = logged_in().await;
    let other = app.seed_admin("other@marketmate.io", "another-pass").await;
    let other_cookie = app.login("other@marketmate.io", "another-pass").await;

    let response = app.get(&format!("/admins/{other}/delete"), Some(&cookie)).await;
    assert_eq!(location(&response), Some("/admins"));

    let response = app.get("/admins", Some(&other_cookie)).await;
    assert_eq!(location(&response), Some("/login"));

    let response = app
        .post_form(
            "/admins/add",
            "email=backdoor@marketmate.io&password=longenough",
            Some(&other_cookie),
        )
        .await;
    assert_eq!(location(&response), Some("/login"));
    assert_eq!(admin_count(&app).await, 1);

    // The surviving admin is unaffected.
    let response = app.get("/admins", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_edit_page() {
    let (app, _, cookie) = logged_in().await;
    let other = app.seed_admin("other@marketmate.io", "another-pass").await;

    let response = app.get(&format!("/admins/{other}/edit"), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("other@marketmate.io"));
    assert!(!body.contains("$argon2"));

    let response = app.get("/edit_admin/ADMmissing", Some(&cookie)).await;
    assert_eq!(location(&response), Some("/admins"));
}

#[tokio::test]
async fn test_edit_with_empty_password_keeps_hash() {
    let (app, _, cookie) = logged_in().await;
    let other = app.seed_admin("other@marketmate.io", "another-pass").await;
    let before = app.admin(&other).await.expect("seeded").password_hash;

    let response = app
        .post_form(
            &format!("/admins/{other}/edit"),
            "email=renamed@marketmate.io&password=",
            Some(&cookie),
        )
        .await;
    assert_eq!(location(&response), Some("/admins"));

    let after = app.admin(&other).await.expect("still there");
    assert_eq!(after.email, "renamed@marketmate.io");
    assert_eq!(after.password_hash, before);
}

#[tokio::test]
async fn test_edit_with_new_password_replaces_hash() {
    let (app, _, cookie) = logged_in().await;
    let other = app.seed_admin("other@marketmate.io", "another-pass").await;

    let response = app
        .post_form(
            &format!("/edit_admin/{other}"),
            "email=other@marketmate.io&password=brand-new-pass",
            Some(&cookie),
        )
        .await;
    assert_eq!(location(&response), Some("/admins"));

    let after = app.admin(&other).await.expect("still there");
    assert!(verify_password(&after.password_hash, "brand-new-pass"));
    assert!(!verify_password(&after.password_hash, "another-pass"));
}

#[tokio::test]
async fn test_edit_rejects_weak_password() {
    let (app, _, cookie) = logged_in().await;
    let other = app.seed_admin("other@marketmate.io", "another-pass").await;

    let response = app
        .post_form(
            &format!("/admins/{other}/edit"),
            "email=other@marketmate.io&password=short",
            Some(&cookie),
        )
        .await;
    assert_eq!(
        location(&response),
        Some(format!("/admins/{other}/edit?error=weak_password").as_str())
    );
    assert!(verify_password(
        &app.admin(&other).await.expect("still there").password_hash,
        "another-pass"
    ));
}

#[tokio::test]
async fn test_self_edit_refreshes_session() {
    let (app, id, cookie) = logged_in().await;

    let response = app
        .post_form(
            &format!("/admins/{id}/edit"),
            "email=lead@marketmate.io&password=",
            Some(&cookie),
        )
        .await;
    assert_eq!(location(&response), Some("/admins"));

    let body = body_text(app.get("/", Some(&cookie)).await).await;
    assert!(body.contains("lead@marketmate.io"));
}
