//! Acting-identity extraction.
//!
//! Authentication mechanics live outside this service; the only thing the
//! core needs is the user-identity value. A request carries it in the
//! `X-User-Id` header, and its absence means guest mode, which routes all
//! storage to the device-local backend.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

pub const HEADER_USER_ID: &str = "x-user-id";

#[derive(Debug, Clone)]
pub struct Identity(pub Option<String>);

impl Identity {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(HEADER_USER_ID)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        Ok(Identity(user_id))
    }
}
