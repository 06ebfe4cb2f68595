//! Scripted [HttpCallSource] for exercising the API layer without a server.

use super::{build_http_url, HttpApi, HttpCallSource};
use crate::utils::HttpBaseUrl;
use http::StatusCode;
use std::cell::RefCell;
use std::collections::VecDeque;
use thiserror::Error;
use tokio::sync::oneshot;

pub const BASE_URL: &str = "http://api.test/";

pub fn base_url() -> HttpBaseUrl {
    HttpBaseUrl::new(BASE_URL).unwrap()
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FakeError {
    #[error("Nothing scripted for {0}")]
    Unscripted(String),

    #[error("Connection timed out")]
    TimedOut,
}

enum Reply {
    Respond {
        status: StatusCode,
        body: String,
        gate: Option<oneshot::Receiver<()>>,
    },
    Fail(FakeError),
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// `METHOD /path?query`
    pub route: String,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

#[derive(Default)]
pub struct FakeCallSource {
    script: RefCell<VecDeque<(String, Reply)>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl FakeCallSource {
    /// Queues a reply for the next call to `route`. Replies to the same route
    /// are served in the order they were queued.
    pub fn respond(&self, route: &str, status: StatusCode, body: serde_json::Value) -> &Self {
        self.push_response(route, status, body, None)
    }

    /// Like [Self::respond], but the call is held after being recorded until
    /// `gate` fires (or its sender is dropped).
    pub fn respond_after(
        &self,
        route: &str,
        status: StatusCode,
        body: serde_json::Value,
        gate: oneshot::Receiver<()>,
    ) -> &Self {
        self.push_response(route, status, body, Some(gate))
    }

    fn push_response(
        &self,
        route: &str,
        status: StatusCode,
        body: serde_json::Value,
        gate: Option<oneshot::Receiver<()>>,
    ) -> &Self {
        self.script.borrow_mut().push_back((
            route.to_string(),
            Reply::Respond {
                status,
                body: body.to_string(),
                gate,
            },
        ));
        self
    }

    pub fn fail(&self, route: &str, error: FakeError) -> &Self {
        self.script
            .borrow_mut()
            .push_back((route.to_string(), Reply::Fail(error)));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, route: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.route == route).count()
    }

    pub fn pending(&self) -> usize {
        self.script.borrow().len()
    }
}

impl HttpCallSource for FakeCallSource {
    type Error = FakeError;

    async fn invoke<Api: HttpApi>(
        &self,
        base: &HttpBaseUrl,
        bearer: Option<&str>,
        api: &Api,
    ) -> Result<Api::Response, Self::Error> {
        let url = build_http_url(api, base).expect("To build URL");
        let route = match url.query() {
            Some(q) => format!("{} {}?{q}", api.method(), url.path()),
            None => format!("{} {}", api.method(), url.path()),
        };

        let body = api
            .request_body()
            .expect("To serialize body")
            .map(|b| serde_json::from_slice(&b).expect("Request body to be JSON"));

        self.calls.borrow_mut().push(RecordedCall {
            route: route.clone(),
            bearer: bearer.map(str::to_string),
            body,
        });

        let reply = {
            let mut script = self.script.borrow_mut();
            let index = script.iter().position(|(r, _)| *r == route);
            index.and_then(|i| script.remove(i))
        };

        match reply {
            Some((_, Reply::Respond { status, body, gate })) => {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }

                Ok(api.deserialize_response(
                    status,
                    Some("application/json"),
                    body.as_bytes(),
                ))
            }
            Some((_, Reply::Fail(e))) => Err(e),
            None => Err(FakeError::Unscripted(route)),
        }
    }
}
