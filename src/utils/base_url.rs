use derive_more::{AsRef, Deref, Display};
use reqwest::IntoUrl;
use url::Url;

/// Root of the REST API, e.g. `https://example.com/api/`. Always ends with a
/// slash so relative endpoint paths join underneath it.
#[derive(Debug, Clone, Deref, AsRef, Display)]
pub struct HttpBaseUrl(Url);

impl HttpBaseUrl {
    pub fn new(url: impl IntoUrl) -> Option<Self> {
        let mut url = url.into_url().ok()?;

        if !(url.scheme().eq_ignore_ascii_case("http") || url.scheme().eq_ignore_ascii_case("https"))
            || !url.has_host()
            || url.query().is_some()
            || url.fragment().is_some()
        {
            return None;
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Some(Self(url))
    }
}
