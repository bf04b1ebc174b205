//! Principal extractor.
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! actor as `x-principal-id` and `x-principal-role` headers.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use rollcall_core::{Principal, Role};
use uuid::Uuid;

use crate::error::ApiError;

pub const PRINCIPAL_ID_HEADER: &str = "x-principal-id";
pub const PRINCIPAL_ROLE_HEADER: &str = "x-principal-role";

/// The principal a request is made on behalf of.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Principal);

/// Read the principal from request headers.
pub fn principal_from_headers(headers: &HeaderMap) -> Result<Principal, ApiError> {
  let id: Uuid = header(headers, PRINCIPAL_ID_HEADER)?
    .parse()
    .map_err(|_| ApiError::Unauthorized(format!("malformed {PRINCIPAL_ID_HEADER} header")))?;
  let role: Role = header(headers, PRINCIPAL_ROLE_HEADER)?.parse().map_err(ApiError::Unauthorized)?;

  Ok(Principal { id, role })
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApiError> {
  headers
    .get(name)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| ApiError::Unauthorized(format!("missing {name} header")))
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    principal_from_headers(&parts.headers).map(Caller)
  }
}
