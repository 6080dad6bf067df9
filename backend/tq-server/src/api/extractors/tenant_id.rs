//! Tenant id path extractor

use crate::ApiError;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

pub const MAX_TENANT_ID_LEN: usize = 128;

/// Tenant id taken from the `{tenant_id}` path segment.
///
/// Only ASCII letters, digits, `-` and `_` are accepted since the id ends
/// up in broker queue names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        if raw.is_empty() || raw.len() > MAX_TENANT_ID_LEN {
            return Err(ApiError::validation(
                format!("tenant id must be 1-{} characters", MAX_TENANT_ID_LEN),
                Some("tenantId"),
            ));
        }

        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ApiError::validation(
                "tenant id may only contain letters, digits, '-' and '_'",
                Some("tenantId"),
            ));
        }

        Ok(Self(raw.to_string()))
    }
}

impl<S> FromRequestParts<S> for TenantId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::validation(e.body_text(), Some("tenantId")))?;

        TenantId::parse(&raw)
    }
}
