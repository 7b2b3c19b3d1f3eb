use crate::error::{Error, PrepResult};
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

/// Bearer credential presented by the caller, forwarded to Google APIs
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Pull the bearer token out of the `Authorization` header
pub fn extract_bearer(parts: &Parts) -> PrepResult<String> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(Error::Unauthorized)?;

    let auth_str = auth_header.to_str().map_err(|_| Error::Unauthorized)?;

    let (scheme, token) = auth_str.trim().split_once(' ').ok_or(Error::Unauthorized)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(Error::Unauthorized);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(Error::Unauthorized);
    }

    Ok(token.to_string())
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_bearer(parts).map(BearerToken)
    }
}
