use crate::http_api::HttpApi;
use anyhow::Context;
use bytes::BufMut;
use derive_more::Display;
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

const JSON_CONTENT_TYPE: &str = "application/json";

/// An [HttpApi] whose request and successful response are both JSON.
pub trait HttpJsonApi {
    type Request: Serialize;
    type SuccessResponse: DeserializeOwned;

    fn method(&self) -> Method;
    fn path_segments(&self) -> impl Iterator<Item = Cow<str>>;

    fn queries(&self) -> impl Iterator<Item = (Cow<str>, Cow<str>)> {
        std::iter::empty()
    }

    fn request(&self) -> Option<&Self::Request> {
        None
    }
}

impl<T: HttpJsonApi> HttpApi for T {
    type Response = Result<<Self as HttpJsonApi>::SuccessResponse, HttpJsonApiError>;

    fn method(&self) -> Method {
        <Self as HttpJsonApi>::method(self)
    }

    fn path_segments(&self) -> impl Iterator<Item = Cow<str>> {
        <Self as HttpJsonApi>::path_segments(self)
    }

    fn queries(&self) -> impl Iterator<Item = (Cow<str>, Cow<str>)> {
        <Self as HttpJsonApi>::queries(self)
    }

    fn request_content_type(&self) -> Option<Cow<str>> {
        self.request().map(|_| Cow::Borrowed(JSON_CONTENT_TYPE))
    }

    fn write_request_body(&self, buf: impl BufMut) -> anyhow::Result<()> {
        if let Some(body) = self.request() {
            serde_json::to_writer(buf.writer(), body).context("Serializing request to JSON")?;
        }

        Ok(())
    }

    fn expected_response_type(&self) -> Option<Cow<str>> {
        Some(Cow::Borrowed(JSON_CONTENT_TYPE))
    }

    fn deserialize_response(
        &self,
        status_code: StatusCode,
        content_type: Option<&str>,
        buf: &[u8],
    ) -> Self::Response {
        // Acknowledgement endpoints may answer with an empty body.
        let buf = if buf.iter().all(u8::is_ascii_whitespace) {
            b"null".as_slice()
        } else {
            buf
        };

        match (status_code, content_type) {
            (code, Some(t)) if code.is_success() && t.starts_with(JSON_CONTENT_TYPE) => {
                Ok(serde_json::from_slice(buf)?)
            }

            (code, None) if code.is_success() => Ok(serde_json::from_slice(buf)?),

            (code, Some(t)) if code.is_success() => Err(HttpJsonApiError::InvalidContentType {
                actual: t.to_string(),
            }),

            (code, Some(t))
                if t.starts_with("text/") || t.starts_with(JSON_CONTENT_TYPE) =>
            {
                let message = std::str::from_utf8(buf)
                    .ok()
                    .filter(|s| *s != "null")
                    .map(|s| s.to_string());
                Err(HttpJsonApiError::UnsuccessfulResponse {
                    status_code: code,
                    message,
                })
            }

            (code, _) => Err(HttpJsonApiError::UnsuccessfulResponse {
                status_code: code,
                message: None,
            }),
        }
    }
}

#[derive(Debug, Error, Display)]
pub enum HttpJsonApiError {
    #[display("Error deserializing JSON: {_0}")]
    InvalidJson(#[from] serde_json::Error),

    #[display("Expecting a application/json content type but got: {actual}")]
    InvalidContentType { actual: String },

    #[display("HTTP request failed with status code: {status_code}, msg = {message:?}")]
    UnsuccessfulResponse {
        status_code: StatusCode,
        message: Option<String>,
    },
}

impl HttpJsonApiError {
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            HttpJsonApiError::UnsuccessfulResponse { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(StatusCode::UNAUTHORIZED)
    }
}
