use super::*;
use axum::{body, body::Body, http::Request};
use tower::ServiceExt;

async fn test_app() -> (Router, Storage) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let api = ApiContext {
        storage: storage.clone(),
    };
    let app = build_router(Arc::new(AppState { api }), 16 * 1024);
    (app, storage)
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

fn post_person(name: &str, number: &str) -> Request<Body> {
    Request::post(PERSONS_ROUTE)
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "name": name, "number": number }).to_string(),
        ))
        .expect("request")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _storage) = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn create_then_list_returns_contact_with_assigned_id() {
    let (app, _storage) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_person("Ada Lovelace", "39-44-5323523"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Contact = read_json(response).await;
    assert_eq!(created.name, "Ada Lovelace");

    let list = Request::get(PERSONS_ROUTE)
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(list).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let contacts: Vec<Contact> = read_json(response).await;
    assert_eq!(contacts, vec![created]);
}

#[tokio::test]
async fn duplicate_create_returns_error_body() {
    let (app, _storage) = test_app().await;
    app.clone()
        .oneshot(post_person("Arto Hellas", "040-123456"))
        .await
        .expect("first");

    let response = app
        .oneshot(post_person("Arto Hellas", "040-000"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.message, "Arto Hellas is already added to phonebook");
}

#[tokio::test]
async fn malformed_payload_returns_error_body() {
    let (app, _storage) = test_app().await;
    let request = Request::post(PERSONS_ROUTE)
        .header("content-type", "application/json")
        .body(Body::from(r#"{"name": 12}"#))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert!(response.status().is_client_error());
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::Malformed);
}

#[tokio::test]
async fn delete_twice_reports_not_found_the_second_time() {
    let (app, storage) = test_app().await;
    let stored = storage
        .insert_contact("Dan Abramov", "12-43-234345")
        .await
        .expect("insert")
        .expect("new name");
    let uri = format!("{PERSONS_ROUTE}/{}", stored.contact_id);

    let first = Request::delete(uri.as_str())
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(first).await.expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let second = Request::delete(uri.as_str())
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(second).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn get_single_person_and_info_page() {
    let (app, storage) = test_app().await;
    let stored = storage
        .insert_contact("Mary Poppendieck", "39-23-6423122")
        .await
        .expect("insert")
        .expect("new name");

    let request = Request::get(format!("{PERSONS_ROUTE}/{}", stored.contact_id))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let contact: Contact = read_json(response).await;
    assert_eq!(contact.number, "39-23-6423122");

    let request = Request::get("/info").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let text = String::from_utf8(body.to_vec()).expect("utf8");
    assert!(text.starts_with("Phonebook has info for 1 people"));
}
