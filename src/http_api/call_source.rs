use super::HttpApi;
use crate::utils::HttpBaseUrl;

/// Something able to carry an [HttpApi] exchange to the server. The error is
/// reserved for transport failures; HTTP-level failures travel inside
/// `Api::Response`.
pub trait HttpCallSource {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn invoke<Api: HttpApi>(
        &self,
        base: &HttpBaseUrl,
        bearer: Option<&str>,
        api: &Api,
    ) -> Result<Api::Response, Self::Error>;
}
