//! Bearer token extraction.
//!
//! The gateway never rejects at extraction time: a missing or malformed
//! header yields an anonymous caller, and the access engine decides what
//! an anonymous caller may do (nothing).

use std::convert::Infallible;
use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest};

use crate::domain::AccessToken;

/// The caller's bearer token, if a well-formed `Authorization` header was
/// presented.
#[derive(Debug, Clone)]
pub struct BearerAuth(Option<AccessToken>);

impl BearerAuth {
    /// The extracted token, when present.
    pub fn token(&self) -> Option<&AccessToken> {
        self.0.as_ref()
    }
}

fn bearer_token(request: &HttpRequest) -> Option<AccessToken> {
    let header = request.headers().get(header::AUTHORIZATION)?;
    let value = header.to_str().ok()?;
    let raw = value.strip_prefix("Bearer ")?;
    AccessToken::new(raw)
}

impl FromRequest for BearerAuth {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(request: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self(bearer_token(request))))
    }
}
