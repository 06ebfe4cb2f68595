use super::HttpApi;
use crate::utils::HttpBaseUrl;
use http::header::{ACCEPT, CONTENT_TYPE};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReqwestSourceError {
    #[error("Error preparing request: {0:?}")]
    Prepare(anyhow::Error),

    #[error("Error while performing request: {0}")]
    Request(#[from] reqwest::Error),
}

impl super::HttpCallSource for reqwest::Client {
    type Error = ReqwestSourceError;

    async fn invoke<Api: HttpApi>(
        &self,
        base: &HttpBaseUrl,
        bearer: Option<&str>,
        api: &Api,
    ) -> Result<Api::Response, Self::Error> {
        let url = api.full_url(base).map_err(ReqwestSourceError::Prepare)?;
        log::debug!("{} {url}", api.method());

        let mut request = self.request(api.method(), url);

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        if let Some(content_type) = api.request_content_type() {
            request = request.header(CONTENT_TYPE, content_type.as_ref());
            if let Some(body) = api.request_body().map_err(ReqwestSourceError::Prepare)? {
                request = request.body(body);
            }
        }

        if let Some(accept) = api.expected_response_type() {
            request = request.header(ACCEPT, accept.as_ref());
        }

        let resp = request.send().await?;
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| Some(v.to_str().ok()?.to_string()));

        log::debug!("Received {status} ({content_type:?})");

        Ok(api.deserialize_response(
            status,
            content_type.as_deref(),
            &resp.bytes().await?,
        ))
    }
}
