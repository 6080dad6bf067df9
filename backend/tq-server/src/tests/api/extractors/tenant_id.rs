use crate::TenantId;

use axum::{Router, body::Body, http::Request, routing::get};
use googletest::prelude::*;
use http::StatusCode;
use tower::ServiceExt;

#[test]
fn given_valid_ids_when_parsed_then_accepted() {
    let longest = "a".repeat(128);

    for raw in ["t1", "tenant-42", "ACME_corp", longest.as_str()] {
        assert_that!(TenantId::parse(raw), ok(anything()));
        assert_eq!(TenantId::parse(raw).unwrap(), TenantId(raw.to_string()));
    }
}

#[test]
fn given_empty_or_oversized_id_when_parsed_then_rejected() {
    assert!(TenantId::parse("").is_err());
    assert!(TenantId::parse(&"a".repeat(129)).is_err());
}

#[test]
fn given_id_with_separator_characters_when_parsed_then_rejected() {
    for raw in ["a.b", "a/b", "a b", "tënant"] {
        assert!(TenantId::parse(raw).is_err(), "{raw} should be rejected");
    }
}

#[tokio::test]
async fn given_route_with_tenant_segment_when_requested_then_extractor_validates() {
    // Given
    let app: Router = Router::new().route(
        "/tenants/{tenant_id}",
        get(|TenantId(id): TenantId| async move { id }),
    );

    // When
    let ok = app
        .clone()
        .oneshot(Request::get("/tenants/t-1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bad = app
        .oneshot(Request::get("/tenants/t.1").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // Then
    assert_eq!(ok.status(), StatusCode::OK);
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}
