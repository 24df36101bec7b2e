//! Integration tests for health, static files and admin endpoints

mod common;

use common::{spawn_app, spawn_app_with, test_settings};

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/api/healthz"))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn file_server_hits_are_counted() {
    let app = spawn_app().await;

    for _ in 0..3 {
        let response = app
            .client
            .get(app.url("/app/"))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(200, response.status().as_u16());
    }
    // Not under /app, so not counted
    app.client.get(app.url("/api/healthz")).send().await.unwrap();

    let page = app
        .client
        .get(app.url("/admin/metrics"))
        .send()
        .await
        .expect("Failed to execute request")
        .text()
        .await
        .unwrap();

    assert!(page.contains("Welcome, Chirpy Admin"));
    assert!(page.contains("Chirpy has been visited 3 times!"));
}

#[tokio::test]
async fn reset_clears_users_and_hits_in_dev() {
    let app = spawn_app().await;
    app.signed_in_user("walt@breakingbad.com", "04234").await;
    app.client.get(app.url("/app/")).send().await.unwrap();

    let response = app
        .client
        .post(app.url("/admin/reset"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());

    let page = app
        .client
        .get(app.url("/admin/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("visited 0 times"));

    // The account is gone, so the same email can sign up again
    let response = app.create_user("walt@breakingbad.com", "04234").await;
    assert_eq!(201, response.status().as_u16());
}

#[tokio::test]
async fn reset_is_forbidden_outside_dev() {
    let app = spawn_app_with(test_settings("production")).await;
    app.create_user("walt@breakingbad.com", "04234").await;

    let response = app
        .client
        .post(app.url("/admin/reset"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(403, response.status().as_u16());

    let response = app.create_user("walt@breakingbad.com", "04234").await;
    assert_eq!(409, response.status().as_u16());
}
