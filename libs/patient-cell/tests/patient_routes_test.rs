use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use patient_cell::patient_routes;
use shared_utils::test_utils::{JwtTestUtils, MockDatabaseResponses, TestConfig, TestUser};

const PATIENTS: &str = "/rest/v1/patients";
const APPOINTMENTS: &str = "/rest/v1/appointments";

async fn send(config: &TestConfig, request: Request<Body>) -> (StatusCode, Value) {
    let response = patient_routes(config.to_arc()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", JwtTestUtils::bearer(token));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn test_register_patient() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_database_url(&mock_server.uri());
    let patient_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path(PATIENTS))
        .and(query_param("email", "eq.jane@test.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(PATIENTS))
        .and(body_partial_json(json!({ "email": "jane@test.com", "birth_date": "1990-01-01" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockDatabaseResponses::patient_response(&patient_id, "jane@test.com", "Jane")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = json!({
        "name": "Jane",
        "email": "jane@test.com",
        "password": "secret",
        "birthDate": "1990-01-01",
        "cellphone": "+1234567890"
    });
    let (status, body) = send(&config, request("POST", "/", None, Some(body))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], patient_id);
    assert_eq!(body["data"]["birthDate"], "1990-01-01");
    assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_get_patient_with_expired_token() {
    let config = TestConfig::default();
    let token = JwtTestUtils::create_expired_token(&TestUser::patient("jane@test.com"), &config.jwt_secret);

    let (status, body) = send(&config, request("GET", &format!("/{}", Uuid::new_v4()), Some(&token), None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_delete_patient_forbidden_for_doctor() {
    let config = TestConfig::default();
    let token = JwtTestUtils::create_test_token(&TestUser::doctor("doc@test.com"), &config.jwt_secret, None);

    let (status, _) = send(&config, request("DELETE", &format!("/{}", Uuid::new_v4()), Some(&token), None)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_unknown_patient() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_database_url(&mock_server.uri());
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(PATIENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(PATIENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let token = JwtTestUtils::create_test_token(&TestUser::patient("jane@test.com"), &config.jwt_secret, None);
    let (status, body) = send(&config, request("DELETE", &format!("/{}", patient_id), Some(&token), None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], format!("Resource Patient for id: {} not found", patient_id));
}

#[tokio::test]
async fn test_delete_patient_removes_their_appointments() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_database_url(&mock_server.uri());
    let patient_id = Uuid::new_v4().to_string();
    let row = MockDatabaseResponses::patient_response(&patient_id, "jane@test.com", "Jane");
    let booked = MockDatabaseResponses::appointment_response(
        &Uuid::new_v4().to_string(),
        &Uuid::new_v4().to_string(),
        &patient_id,
        "10/03/2031",
        "09:00",
    );

    Mock::given(method("GET"))
        .and(path(PATIENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row.clone()])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(APPOINTMENTS))
        .and(query_param("patient_id", format!("eq.{}", patient_id).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([booked])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(PATIENTS))
        .and(query_param("id", format!("eq.{}", patient_id).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let token = JwtTestUtils::create_test_token(&TestUser::patient("jane@test.com"), &config.jwt_secret, None);
    let (status, _) = send(&config, request("DELETE", &format!("/{}", patient_id), Some(&token), None)).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_delete_patient_rejected_by_foreign_key() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_database_url(&mock_server.uri());
    let patient_id = Uuid::new_v4().to_string();
    let row = MockDatabaseResponses::patient_response(&patient_id, "jane@test.com", "Jane");

    Mock::given(method("GET"))
        .and(path(PATIENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(APPOINTMENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(PATIENTS))
        .respond_with(ResponseTemplate::new(409).set_body_json(MockDatabaseResponses::error_response(
            "update or delete on table \"patients\" violates foreign key constraint",
            "23503",
        )))
        .mount(&mock_server)
        .await;

    let token = JwtTestUtils::create_test_token(&TestUser::patient("jane@test.com"), &config.jwt_secret, None);
    let (status, body) = send(&config, request("DELETE", &format!("/{}", patient_id), Some(&token), None)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Patient still has appointments");
}
