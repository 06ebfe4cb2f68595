use url::Url;

use super::HttpApi;
use crate::utils::HttpBaseUrl;

pub fn build_http_url(
    api: &(impl HttpApi + ?Sized),
    base_url: &HttpBaseUrl,
) -> Result<Url, url::ParseError> {
    let mut path = String::new();
    for segment in api.path_segments() {
        path.push_str(segment.trim_matches('/'));
        path.push('/');
    }

    let mut url = base_url.join(&path)?;

    for (query_name, query_value) in api.queries() {
        url.query_pairs_mut().append_pair(&query_name, &query_value);
    }

    Ok(url)
}
