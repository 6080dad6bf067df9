use crate::ApiError;

use tq_consumer::ConsumerError;
use tq_db::DbError;

use std::panic::Location;

use axum::response::{IntoResponse, Response};
use error_location::ErrorLocation;
use http::StatusCode;
use http_body_util::BodyExt;

async fn body_json(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn given_not_found_when_rendered_then_404_with_json_body() {
    // Given
    let error = ApiError::NotFound {
        message: "No consumer for tenant t1".into(),
        location: ErrorLocation::from(Location::caller()),
    };

    // When
    let response = error.into_response();

    // Then
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
    assert_eq!(json["error"]["message"], "No consumer for tenant t1");
    assert!(json["error"].get("field").is_none());
}

#[tokio::test]
async fn given_validation_error_when_rendered_then_400_with_field() {
    let response = ApiError::validation("bad limit", Some("limit")).into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["field"], "limit");
}

#[tokio::test]
async fn given_duplicate_consumer_error_when_converted_then_409() {
    let error: ApiError = ConsumerError::already_exists("t1").into();

    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "ALREADY_EXISTS");
    assert!(json["error"]["message"].as_str().unwrap().contains("t1"));
}

#[tokio::test]
async fn given_missing_consumer_error_when_converted_then_404() {
    let error: ApiError = ConsumerError::not_found("ghost").into();

    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_invalid_worker_count_when_converted_then_400_on_workers_field() {
    let error: ApiError = ConsumerError::invalid_worker_count(0, 64).into();

    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["field"], "workers");
    assert!(json["error"]["message"].as_str().unwrap().contains("64"));
}

#[tokio::test]
async fn given_queue_full_when_converted_then_503() {
    let error: ApiError = ConsumerError::queue_full("t1", 10).into();

    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "QUEUE_FULL");
}

#[tokio::test]
async fn given_broker_failure_when_converted_then_500_without_details() {
    let error: ApiError = ConsumerError::broker("publish", "channel closed by peer").into();

    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
    assert!(
        !json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("channel closed")
    );
}

#[tokio::test]
async fn given_invalid_cursor_when_converted_then_400_on_cursor_field() {
    let error: ApiError = DbError::InvalidCursor {
        cursor: "nope".into(),
        location: ErrorLocation::from(Location::caller()),
    }
    .into();

    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["field"], "cursor");
}
