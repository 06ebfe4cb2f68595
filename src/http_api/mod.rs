use anyhow::Context;
use bytes::{BufMut, Bytes, BytesMut};
use http::Method;
use std::borrow::Cow;
use url::Url;

use crate::utils::HttpBaseUrl;

mod build;
mod call_source;
mod json;
mod reqwest_source;
#[cfg(test)]
pub mod testing;

pub use build::*;
pub use call_source::*;
pub use json::*;

/// Describes one HTTP exchange independently of the client that performs it.
pub trait HttpApi {
    type Response;

    fn method(&self) -> Method;

    /// Path segments relative to the API root. Each one is emitted with a
    /// trailing slash.
    fn path_segments(&self) -> impl Iterator<Item = Cow<str>>;
    fn queries(&self) -> impl Iterator<Item = (Cow<str>, Cow<str>)>;

    fn request_content_type(&self) -> Option<Cow<str>>;

    fn write_request_body(&self, buf: impl BufMut) -> anyhow::Result<()>;

    fn expected_response_type(&self) -> Option<Cow<str>>;

    fn deserialize_response(
        &self,
        status_code: http::StatusCode,
        content_type: Option<&str>,
        buf: &[u8],
    ) -> Self::Response;

    fn full_url(&self, base: &HttpBaseUrl) -> anyhow::Result<Url> {
        build_http_url(self, base).context("Building request URL")
    }

    fn request_body(&self) -> anyhow::Result<Option<Bytes>> {
        if self.request_content_type().is_none() {
            return Ok(None);
        }

        let mut buf = BytesMut::new();
        self.write_request_body(&mut buf)?;
        Ok((!buf.is_empty()).then(|| buf.freeze()))
    }
}
