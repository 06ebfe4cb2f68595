use super::token::{RefreshToken, RefreshedToken};
use super::ApiError;
use crate::http_api::{HttpApi, HttpCallSource, HttpJsonApi};
use crate::session::Session;
use crate::utils::HttpBaseUrl;

/// Performs requests on behalf of a [Session].
///
/// Every call carries the session's access token. When the server answers
/// `401`, the refresh token is exchanged once and the call is replayed once;
/// if that also fails authorization the session is signed out.
pub struct ApiClient<CS> {
    source: CS,
    base: HttpBaseUrl,
    session: Session,
}

impl<CS: HttpCallSource> ApiClient<CS> {
    pub fn new(source: CS, base: HttpBaseUrl, session: Session) -> Self {
        Self {
            source,
            base,
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    pub fn source(&self) -> &CS {
        &self.source
    }

    pub async fn call<Api: HttpJsonApi>(&self, api: &Api) -> super::Result<Api::SuccessResponse> {
        let token = self.session.access_token().ok_or(ApiError::SignedOut)?;

        match self.invoke(Some(token.as_str()), api).await? {
            Err(e) if e.is_unauthorized() => {
                log::info!("Access token rejected, refreshing");
            }
            resp => return resp.map_err(ApiError::from),
        }

        let token = match self.session.access_token() {
            // Someone else refreshed while this call was in flight.
            Some(current) if current != token => current,
            _ => self.refresh().await?,
        };

        match self.invoke(Some(token.as_str()), api).await? {
            Err(e) if e.is_unauthorized() => {
                self.session.sign_out();
                Err(ApiError::SignedOut)
            }
            resp => resp.map_err(ApiError::from),
        }
    }

    async fn refresh(&self) -> super::Result<String> {
        let Some(refresh_token) = self.session.refresh_token() else {
            self.session.sign_out();
            return Err(ApiError::SignedOut);
        };

        match self.invoke(None, &RefreshToken::new(&refresh_token)).await? {
            Ok(RefreshedToken { access, refresh }) => {
                log::debug!("Access token refreshed");
                self.session.apply_refreshed(access.clone(), refresh);
                Ok(access)
            }
            Err(e) => {
                log::warn!("Refreshing access token failed: {e}");
                self.session.sign_out();
                Err(ApiError::SignedOut)
            }
        }
    }

    async fn invoke<Api: HttpApi>(
        &self,
        bearer: Option<&str>,
        api: &Api,
    ) -> super::Result<Api::Response> {
        self.source
            .invoke(&self.base, bearer, api)
            .await
            .map_err(|e| ApiError::Transport(Box::new(e)))
    }
}
