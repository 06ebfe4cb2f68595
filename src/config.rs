use crate::session::Credentials;
use crate::utils::HttpBaseUrl;
use anyhow::Context;
use clap::Args;
use std::time::Duration;

#[derive(Args, Debug, Clone)]
pub struct ConnectionConfig {
    /// Root of the marketplace REST API
    #[clap(long, env = "GIGBOARD_API_URL", default_value = "http://localhost:8000/api/")]
    pub api_url: String,

    /// Username of the signed-in account
    #[clap(short, long, env = "GIGBOARD_USERNAME")]
    pub username: String,

    #[clap(long, env = "GIGBOARD_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    #[clap(long, env = "GIGBOARD_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,

    #[clap(long, env = "GIGBOARD_REQUEST_TIMEOUT_SECS", default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..))]
    pub request_timeout_secs: u64,

    #[clap(long, env = "GIGBOARD_MESSAGE_POLL_SECS", default_value_t = 8,
        value_parser = clap::value_parser!(u64).range(1..))]
    pub message_poll_secs: u64,

    #[clap(long, env = "GIGBOARD_NOTIFICATION_POLL_SECS", default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..))]
    pub notification_poll_secs: u64,
}

impl ConnectionConfig {
    pub fn base_url(&self) -> anyhow::Result<HttpBaseUrl> {
        HttpBaseUrl::new(self.api_url.as_str())
            .with_context(|| format!("Invalid API URL: {}", self.api_url))
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }

    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .build()
            .context("Building HTTP client")
    }

    pub fn message_poll_interval(&self) -> Duration {
        Duration::from_secs(self.message_poll_secs)
    }

    pub fn notification_poll_interval(&self) -> Duration {
        Duration::from_secs(self.notification_poll_secs)
    }
}
