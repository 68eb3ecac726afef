/// Integration tests for the Carfolio API
///
/// These tests verify the full system works end-to-end:
/// - Signup and token issuance
/// - Listing CRUD with multipart forms and image files
/// - Keyword search
/// - Owner scoping (other users' listings look absent)
/// - The 10-image cap
///
/// Requires `DATABASE_URL`; every test returns early when it is unset.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::TestContext;
use serde_json::json;
use tower::Service as _;

/// Test signup, duplicate rejection, and token issuance
#[tokio::test]
async fn test_signup_and_token() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let email = format!("signup-{}@example.com", uuid::Uuid::new_v4());

    let signup_body = json!({
        "name": "Jane Doe",
        "email": email,
        "password": "secret"
    })
    .to_string();

    let request = Request::builder()
        .method("POST")
        .uri("/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(signup_body.clone()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["message"], "User created successfully");

    // Duplicate email is a 400
    let request = Request::builder()
        .method("POST")
        .uri("/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(signup_body))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Exchange credentials for a bearer token
    let request = Request::builder()
        .method("POST")
        .uri("/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={}&password=secret", email)))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].as_str().unwrap().len() > 20);

    // Wrong password is a 401
    let request = Request::builder()
        .method("POST")
        .uri("/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={}&password=wrong", email)))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(&email)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await;
}

/// Test that listing routes require a bearer token
#[tokio::test]
async fn test_listings_require_auth() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let request = Request::builder()
        .method("GET")
        .uri("/cars")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await;
}

/// Test create, fetch, and keyword search
#[tokio::test]
async fn test_create_and_search_listing() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let body = common::multipart_body(
        &[
            ("title", "Honda Civic"),
            ("description", "clean, one owner"),
            ("tags", "sedan, cheap"),
        ],
        1,
    );

    let request = Request::builder()
        .method("POST")
        .uri("/cars")
        .header(header::AUTHORIZATION, ctx.auth_header())
        .header(header::CONTENT_TYPE, common::multipart_content_type())
        .header(header::HOST, "localhost:8080")
        .body(Body::from(body))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let created = common::body_json(response).await;
    assert_eq!(created["title"], "Honda Civic");
    assert_eq!(created["tags"], json!(["sedan", "cheap"]));
    assert_eq!(created["owner_id"], json!(ctx.user.id));
    let image_urls = created["image_urls"].as_array().unwrap();
    assert_eq!(image_urls.len(), 1);
    assert!(image_urls[0]
        .as_str()
        .unwrap()
        .starts_with("http://localhost:8080/images/"));

    let id = created["id"].as_i64().unwrap();

    // Fetch it back
    let request = Request::builder()
        .method("GET")
        .uri(format!("/cars/{}", id))
        .header(header::AUTHORIZATION, ctx.auth_header())
        .header(header::HOST, "localhost:8080")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Search matches on a tag
    let request = Request::builder()
        .method("GET")
        .uri("/cars/search?keyword=sedan")
        .header(header::AUTHORIZATION, ctx.auth_header())
        .header(header::HOST, "localhost:8080")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let results = common::body_json(response).await;
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], json!(id));

    // No match is an empty list, not an error
    let request = Request::builder()
        .method("GET")
        .uri("/cars/search?keyword=zeppelin")
        .header(header::AUTHORIZATION, ctx.auth_header())
        .header(header::HOST, "localhost:8080")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let results = common::body_json(response).await;
    assert_eq!(results.as_array().unwrap().len(), 0);

    ctx.cleanup().await;
}

/// Test that another user's listings look absent
#[tokio::test]
async fn test_owner_scoping() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let body = common::multipart_body(
        &[("title", "Private Car"), ("description", "mine only")],
        0,
    );

    let request = Request::builder()
        .method("POST")
        .uri("/cars")
        .header(header::AUTHORIZATION, ctx.auth_header())
        .header(header::CONTENT_TYPE, common::multipart_content_type())
        .header(header::HOST, "localhost:8080")
        .body(Body::from(body))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = common::body_json(response).await;
    let id = created["id"].as_i64().unwrap();

    let (other_user, other_auth) = ctx.create_other_user().await;

    // Fetch, update, and delete all report 404 for the other user
    let request = Request::builder()
        .method("GET")
        .uri(format!("/cars/{}", id))
        .header(header::AUTHORIZATION, &other_auth)
        .header(header::HOST, "localhost:8080")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let update = common::multipart_body(&[("title", "Hijacked")], 0);
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/cars/{}", id))
        .header(header::AUTHORIZATION, &other_auth)
        .header(header::CONTENT_TYPE, common::multipart_content_type())
        .header(header::HOST, "localhost:8080")
        .body(Body::from(update))
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/cars/{}", id))
        .header(header::AUTHORIZATION, &other_auth)
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The other user's list is empty
    let request = Request::builder()
        .method("GET")
        .uri("/cars")
        .header(header::AUTHORIZATION, &other_auth)
        .header(header::HOST, "localhost:8080")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listings = common::body_json(response).await;
    assert_eq!(listings.as_array().unwrap().len(), 0);

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(other_user.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await;
}

/// Test that image uploads beyond the cap are silently dropped
#[tokio::test]
async fn test_image_cap() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let body = common::multipart_body(
        &[("title", "Photogenic Car"), ("description", "lots of angles")],
        12,
    );

    let request = Request::builder()
        .method("POST")
        .uri("/cars")
        .header(header::AUTHORIZATION, ctx.auth_header())
        .header(header::CONTENT_TYPE, common::multipart_content_type())
        .header(header::HOST, "localhost:8080")
        .body(Body::from(body))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let created = common::body_json(response).await;
    assert_eq!(created["image_urls"].as_array().unwrap().len(), 10);

    ctx.cleanup().await;
}

/// Test partial update semantics: absent and empty fields are unchanged
#[tokio::test]
async fn test_update_listing() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let body = common::multipart_body(
        &[
            ("title", "Old Title"),
            ("description", "original description"),
            ("tags", "a, b"),
        ],
        0,
    );

    let request = Request::builder()
        .method("POST")
        .uri("/cars")
        .header(header::AUTHORIZATION, ctx.auth_header())
        .header(header::CONTENT_TYPE, common::multipart_content_type())
        .header(header::HOST, "localhost:8080")
        .body(Body::from(body))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = common::body_json(response).await;
    let id = created["id"].as_i64().unwrap();

    // New title; empty description field means "leave unchanged"
    let body = common::multipart_body(&[("title", "New Title"), ("description", "")], 0);

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/cars/{}", id))
        .header(header::AUTHORIZATION, ctx.auth_header())
        .header(header::CONTENT_TYPE, common::multipart_content_type())
        .header(header::HOST, "localhost:8080")
        .body(Body::from(body))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = common::body_json(response).await;
    assert_eq!(updated["title"], "New Title");
    assert_eq!(updated["description"], "original description");
    assert_eq!(updated["tags"], json!(["a", "b"]));

    ctx.cleanup().await;
}

/// Test that delete removes the listing and its image files
#[tokio::test]
async fn test_delete_listing_removes_files() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let body = common::multipart_body(
        &[("title", "Doomed Car"), ("description", "going away")],
        2,
    );

    let request = Request::builder()
        .method("POST")
        .uri("/cars")
        .header(header::AUTHORIZATION, ctx.auth_header())
        .header(header::CONTENT_TYPE, common::multipart_content_type())
        .header(header::HOST, "localhost:8080")
        .body(Body::from(body))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = common::body_json(response).await;
    let id = created["id"].as_i64().unwrap();

    // The stored files exist on disk
    let filenames: Vec<String> = created["image_urls"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| {
            u.as_str()
                .unwrap()
                .rsplit('/')
                .next()
                .unwrap()
                .to_string()
        })
        .collect();
    for filename in &filenames {
        assert!(ctx.images.root().join(filename).exists());
    }

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/cars/{}", id))
        .header(header::AUTHORIZATION, ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["message"], "Car deleted successfully");

    // Listing and files are gone
    let request = Request::builder()
        .method("GET")
        .uri(format!("/cars/{}", id))
        .header(header::AUTHORIZATION, ctx.auth_header())
        .header(header::HOST, "localhost:8080")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    for filename in &filenames {
        assert!(!ctx.images.root().join(filename).exists());
    }

    ctx.cleanup().await;
}
