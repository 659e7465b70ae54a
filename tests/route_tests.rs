// HTTP route tests

mod common;

use actix_web::{test, web, App};
use clinic_assistant::core::DeliveryPolicy;
use clinic_assistant::models::{ErrorResponse, HealthResponse, QueryResponse};
use clinic_assistant::routes::{self, AppState};
use common::*;
use serde_json::json;
use std::sync::Arc;

fn state(store: FakeClinicStore, model: FakeModel, dispatcher: FakeDispatcher) -> AppState {
    AppState {
        pipeline: Arc::new(pipeline(
            Arc::new(store),
            Arc::new(FakeMatcher::empty()),
            Arc::new(model),
            Arc::new(dispatcher),
            options(DeliveryPolicy::ReportOnly),
        )),
    }
}

fn healthy_state() -> AppState {
    state(
        FakeClinicStore::with(clinic("9am-6pm")),
        FakeModel::hours_reader(),
        FakeDispatcher::with_status(200),
    )
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(routes::json_config())
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_query_returns_answer() {
    let app = init_app!(healthy_state());

    let req = test::TestRequest::post()
        .uri("/query")
        .set_json(json!({"message": "What are your operating hours?"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: QueryResponse = test::read_body_json(resp).await;
    assert_eq!(body.response, "Our operating hours are 9am-6pm.");
    assert!(body.delivered);
}

#[actix_web::test]
async fn test_missing_message_is_accepted() {
    let app = init_app!(healthy_state());

    let req = test::TestRequest::post().uri("/query").set_json(json!({})).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_invalid_json_is_rejected() {
    let app = init_app!(healthy_state());

    let req = test::TestRequest::post()
        .uri("/query")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"message\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "invalid_json");
}

#[actix_web::test]
async fn test_json_body_without_content_type_is_accepted() {
    let app = init_app!(healthy_state());

    let req = test::TestRequest::post()
        .uri("/query")
        .set_payload(r#"{"message": "What are your operating hours?"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: QueryResponse = test::read_body_json(resp).await;
    assert_eq!(body.response, "Our operating hours are 9am-6pm.");
}

#[actix_web::test]
async fn test_json_body_sent_as_plain_text_is_accepted() {
    let app = init_app!(healthy_state());

    let req = test::TestRequest::post()
        .uri("/query")
        .insert_header(("content-type", "text/plain"))
        .set_payload(r#"{"message": "What are your operating hours?"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: QueryResponse = test::read_body_json(resp).await;
    assert!(body.delivered);
}

#[actix_web::test]
async fn test_overlong_message_is_rejected() {
    let app = init_app!(healthy_state());

    let req = test::TestRequest::post()
        .uri("/query")
        .set_json(json!({"message": "a".repeat(5000)}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "validation_failed");
}

#[actix_web::test]
async fn test_store_failure_maps_to_bad_gateway() {
    let app = init_app!(state(
        FakeClinicStore::failing(),
        FakeModel::replying("unused"),
        FakeDispatcher::with_status(200),
    ));

    let req = test::TestRequest::post()
        .uri("/query")
        .set_json(json!({"message": "hours?"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 502);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "clinic_store_error");
    assert_eq!(body.status_code, 502);
    assert!(body.message.contains("store unavailable"));
}

#[actix_web::test]
async fn test_undelivered_answer_still_returned() {
    let app = init_app!(state(
        FakeClinicStore::with(clinic("9am-6pm")),
        FakeModel::hours_reader(),
        FakeDispatcher::with_status(500),
    ));

    let req = test::TestRequest::post()
        .uri("/query")
        .set_json(json!({"message": "hours?"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: QueryResponse = test::read_body_json(resp).await;
    assert!(!body.delivered);
    assert!(body.response.contains("9am-6pm"));
}

#[actix_web::test]
async fn test_health_check() {
    let app = init_app!(healthy_state());

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: HealthResponse = test::read_body_json(resp).await;
    assert_eq!(body.status, "healthy");
}
