mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{init_app, InMemoryRepository};
use serde_json::{json, Value};

#[actix_web::test]
async fn signup_returns_user_and_working_tokens() {
    let repo = InMemoryRepository::new();
    let app = init_app(repo.clone()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({
            "username": " leo ",
            "password": "warandpeace",
            "first_name": "Leo",
            "last_name": "Tolstoy"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(body["user"]["username"], "leo");
    assert_eq!(body["user"]["full_name"], "Leo Tolstoy");
    assert_eq!(body["token_type"], "Bearer");
    let access = body["access_token"].as_str().unwrap();
    assert!(body["refresh_token"].is_string());

    let req = test::TestRequest::post()
        .uri("/api/v1/create")
        .insert_header(("Authorization", format!("Bearer {}", access)))
        .set_json(json!({"text": "first post"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(repo.post_count(), 1);
}

#[actix_web::test]
async fn duplicate_username_is_409() {
    let repo = InMemoryRepository::new();
    repo.add_user("leo");
    let app = init_app(repo).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({"username": "leo", "password": "warandpeace"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[actix_web::test]
async fn weak_signup_is_rejected_per_field() {
    let app = init_app(InMemoryRepository::new()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({
            "username": "leo tolstoy",
            "password": "1234",
            "email": "not-an-email"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;

    assert!(body["fields"]["username"].is_array());
    assert!(body["fields"]["password"].is_array());
    assert!(body["fields"]["email"].is_array());
}

#[actix_web::test]
async fn login_after_signup() {
    let app = init_app(InMemoryRepository::new()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({"username": "anna", "password": "karenina1877"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"username": "anna", "password": "karenina1877"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["username"], "anna");
    assert!(body["access_token"].is_string());
}

#[actix_web::test]
async fn bad_credentials_share_one_message() {
    let app = init_app(InMemoryRepository::new()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({"username": "anna", "password": "karenina1877"}))
        .to_request();
    test::call_service(&app, req).await;

    let mut messages = Vec::new();
    for payload in [
        json!({"username": "anna", "password": "vronsky"}),
        json!({"username": "levin", "password": "karenina1877"}),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        messages.push(body["error"].clone());
    }
    assert_eq!(messages[0], messages[1]);
}

#[actix_web::test]
async fn login_requires_both_fields() {
    let app = init_app(InMemoryRepository::new()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"username": "  "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["fields"]["username"][0], "This field is required.");
    assert_eq!(body["fields"]["password"][0], "This field is required.");
}
