use crate::http_api::HttpJsonApi;
use http::Method;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Serialize, Debug)]
pub struct RefreshTokenRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct RefreshedToken {
    pub access: String,
    /// Present when the server rotates refresh tokens.
    #[serde(default)]
    pub refresh: Option<String>,
}

/// `POST /token/refresh/`. Sent without a bearer credential.
pub struct RefreshToken<'a> {
    request: RefreshTokenRequest<'a>,
}

impl<'a> RefreshToken<'a> {
    pub fn new(refresh: &'a str) -> Self {
        Self {
            request: RefreshTokenRequest { refresh },
        }
    }
}

impl<'a> HttpJsonApi for RefreshToken<'a> {
    type Request = RefreshTokenRequest<'a>;
    type SuccessResponse = RefreshedToken;

    fn method(&self) -> Method {
        Method::POST
    }

    fn path_segments(&self) -> impl Iterator<Item = Cow<str>> {
        [Cow::Borrowed("token"), Cow::Borrowed("refresh")].into_iter()
    }

    fn request(&self) -> Option<&Self::Request> {
        Some(&self.request)
    }
}
