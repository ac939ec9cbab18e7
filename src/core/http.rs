use crate::core::ExtractionError;
use serde_json::Value;

/// Fetch a JSON document, fatal on transport errors, non-2xx status or a
/// body that does not decode. The `video_id` only labels log output.
pub async fn fetch_json(
    client: &reqwest::Client,
    url: &str,
    video_id: &str,
    query: Option<&[(&str, &str)]>,
) -> Result<Value, ExtractionError> {
    tracing::debug!("{}: downloading JSON from {}", video_id, url);

    let mut request = client.get(url).header("Accept", "application/json");
    if let Some(pairs) = query {
        request = request.query(pairs);
    }

    let response = request.send().await.map_err(|source| ExtractionError::Http {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractionError::Status {
            url: url.to_string(),
            status,
        });
    }

    response.json().await.map_err(|source| ExtractionError::Json {
        url: url.to_string(),
        source,
    })
}

/// HTTP client shared by extractors, configured like a regular browser.
pub fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .timeout(std::time::Duration::from_secs(30))
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .expect("Failed to create HTTP client")
}
