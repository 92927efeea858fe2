//! Tests for user record handlers over the in-memory store.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test as actix_test, web};
use chrono::{DateTime, TimeZone, Utc};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use crate::inbound::http::configure;
use crate::test_support::{MutableClock, in_memory_state};

#[fixture]
fn clock() -> Arc<MutableClock> {
    let start: DateTime<Utc> = Utc
        .with_ymd_and_hms(2026, 1, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    Arc::new(MutableClock::new(start))
}

async fn init_app(
    clock: Arc<MutableClock>,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    let state = in_memory_state(clock);
    actix_test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure),
    )
    .await
}

async fn send(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    request: actix_test::TestRequest,
) -> (StatusCode, Value) {
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

async fn create(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    body: Value,
) -> Value {
    let (status, value) = send(
        app,
        actix_test::TestRequest::post().uri("/users").set_json(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body {value}");
    value
}

fn id_of(record: &Value) -> String {
    record
        .get("id")
        .and_then(Value::as_str)
        .expect("record id")
        .to_owned()
}

fn violations(body: &Value) -> Vec<(String, String)> {
    body.pointer("/details/errors")
        .and_then(Value::as_array)
        .expect("validation errors")
        .iter()
        .map(|entry| {
            (
                entry["field"].as_str().expect("field").to_owned(),
                entry["message"].as_str().expect("message").to_owned(),
            )
        })
        .collect()
}

#[rstest]
#[actix_web::test]
async fn create_returns_record_with_defaults(clock: Arc<MutableClock>) {
    let app = init_app(clock).await;

    let record = create(&app, json!({"name": "Ada", "email": "ada@example.com"})).await;

    assert_eq!(record["name"], "Ada");
    assert_eq!(record["email"], "ada@example.com");
    assert_eq!(record["score"], 0);
    assert_eq!(record["createdAt"], "2026-01-01T12:00:00Z");
    assert_eq!(record["updatedAt"], record["createdAt"]);
    assert_eq!(id_of(&record).len(), 36);
}

#[rstest]
#[actix_web::test]
async fn create_accepts_integral_float_score(clock: Arc<MutableClock>) {
    let app = init_app(clock).await;

    let record = create(&app, json!({"name": "Ada", "email": "ada@example.com", "score": 100.0})).await;

    assert_eq!(record["score"], json!(100));
}

#[rstest]
#[actix_web::test]
async fn round_trip_create_read_delete(clock: Arc<MutableClock>) {
    let app = init_app(clock).await;
    let record = create(&app, json!({"name": "Ada", "email": "ada@example.com", "score": 7})).await;
    let uri = format!("/users/{}", id_of(&record));

    let (status, fetched) = send(&app, actix_test::TestRequest::get().uri(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, record);

    let (status, body) = send(&app, actix_test::TestRequest::delete().uri(&uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, actix_test::TestRequest::get().uri(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["message"], "User not found");
}

#[rstest]
#[actix_web::test]
async fn duplicate_email_conflicts_and_keeps_first_record(clock: Arc<MutableClock>) {
    let app = init_app(clock).await;
    let first = create(&app, json!({"name": "Ada", "email": "ada@example.com"})).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/users")
            .set_json(json!({"name": "Someone Else", "email": "ada@example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
    assert_eq!(body["message"], "Email already exists");
    assert_eq!(body["details"]["field"], "email");

    let uri = format!("/users/{}", id_of(&first));
    let (_, fetched) = send(&app, actix_test::TestRequest::get().uri(&uri)).await;
    assert_eq!(fetched, first);
}

#[rstest]
#[actix_web::test]
async fn create_reports_every_violation(clock: Arc<MutableClock>) {
    let app = init_app(clock).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/users")
            .set_json(json!({"email": "nope", "score": 101})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["message"], "Validation Error");
    let fields: Vec<String> = violations(&body).into_iter().map(|(f, _)| f).collect();
    assert_eq!(fields, vec!["name", "email", "score"]);
}

#[rstest]
#[case::syntax("{\"name\": ", "application/json")]
#[case::empty("", "application/json")]
#[case::content_type("{\"name\":\"Ada\",\"email\":\"ada@example.com\"}", "text/plain")]
#[actix_web::test]
async fn unreadable_bodies_are_malformed_requests(
    clock: Arc<MutableClock>,
    #[case] payload: &'static str,
    #[case] content_type: &'static str,
) {
    let app = init_app(clock).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/users")
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "malformed_request");
    assert_eq!(body["message"], "Invalid JSON format");
}

#[rstest]
#[case::get(actix_test::TestRequest::get())]
#[case::delete(actix_test::TestRequest::delete())]
#[actix_web::test]
async fn bad_id_is_a_validation_error_not_a_miss(
    clock: Arc<MutableClock>,
    #[case] request: actix_test::TestRequest,
) {
    let app = init_app(clock).await;

    let (status, body) = send(&app, request.uri("/users/not-a-uuid")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(violations(&body)[0].0, "id");
}

#[rstest]
#[actix_web::test]
async fn update_with_no_fields_is_rejected(clock: Arc<MutableClock>) {
    let app = init_app(clock).await;
    let record = create(&app, json!({"name": "Ada", "email": "ada@example.com"})).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/users/{}", id_of(&record)))
            .set_json(json!({"nickname": "ignored"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        violations(&body),
        vec![(
            "body".to_owned(),
            "At least one field must be provided for update".to_owned()
        )]
    );
}

#[rstest]
#[actix_web::test]
async fn update_changes_given_fields_and_refreshes_timestamp(clock: Arc<MutableClock>) {
    let app = init_app(clock.clone()).await;
    let record = create(&app, json!({"name": "Ada", "email": "ada@example.com"})).await;
    clock.advance_seconds(90);

    let (status, updated) = send(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/users/{}", id_of(&record)))
            .set_json(json!({"score": 100})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["score"], 100);
    assert_eq!(updated["name"], "Ada");
    assert_eq!(updated["createdAt"], record["createdAt"]);
    assert_eq!(updated["updatedAt"], "2026-01-01T12:01:30Z");
}

#[rstest]
#[actix_web::test]
async fn update_missing_record_is_not_found(clock: Arc<MutableClock>) {
    let app = init_app(clock).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::put()
            .uri("/users/7c9e6679-7425-40de-944b-e07fc1f90ae7")
            .set_json(json!({"score": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[rstest]
#[actix_web::test]
async fn list_applies_min_score_and_default_ordering(clock: Arc<MutableClock>) {
    let app = init_app(clock.clone()).await;
    for (name, score) in [("Low", 10), ("Mid", 50), ("High", 90)] {
        create(
            &app,
            json!({"name": name, "email": format!("{name}@example.com"), "score": score}),
        )
        .await;
        clock.advance_seconds(1);
    }

    let (status, body) = send(
        &app,
        actix_test::TestRequest::get().uri("/users?minScore=40"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .expect("data array")
        .iter()
        .filter_map(|user| user["name"].as_str())
        .collect();
    assert_eq!(names, vec!["High", "Mid"]);
    assert_eq!(
        body["pagination"],
        json!({"total": 2, "page": 1, "limit": 10, "totalPages": 1})
    );
}

#[rstest]
#[actix_web::test]
async fn list_pages_partition_the_sorted_set(clock: Arc<MutableClock>) {
    let app = init_app(clock).await;
    for index in 0..5 {
        create(
            &app,
            json!({"name": format!("user{index}"), "email": format!("u{index}@example.com"), "score": 5}),
        )
        .await;
    }

    let mut seen = Vec::new();
    for page in 1..=3 {
        let uri = format!("/users?sortBy=score&sortOrder=asc&limit=2&page={page}");
        let (_, body) = send(&app, actix_test::TestRequest::get().uri(&uri)).await;
        assert_eq!(body["pagination"]["totalPages"], 3);
        seen.extend(body["data"].as_array().expect("data array").iter().map(id_of));
    }

    let mut unique = seen.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(seen.len(), 5);
    assert_eq!(unique.len(), 5);
}

#[rstest]
#[actix_web::test]
async fn list_names_every_bad_parameter(clock: Arc<MutableClock>) {
    let app = init_app(clock).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::get().uri("/users?page=abc&limit=xyz&sortBy=age"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<String> = violations(&body).into_iter().map(|(f, _)| f).collect();
    assert_eq!(fields, vec!["page", "limit", "sortBy"]);
}

#[rstest]
#[actix_web::test]
async fn list_of_empty_store_is_an_empty_page(clock: Arc<MutableClock>) {
    let app = init_app(clock).await;

    let (status, body) = send(&app, actix_test::TestRequest::get().uri("/users?name=")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"data": [], "pagination": {"total": 0, "page": 1, "limit": 10, "totalPages": 0}})
    );
}
