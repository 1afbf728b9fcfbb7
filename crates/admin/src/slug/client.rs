//! Backend slug lookup.

use serde::Deserialize;
use tracing::instrument;
use url::Url;

use super::{SlugAvailability, SlugError};

/// Path of the slug lookup, relative to the backend base URL.
const CHECK_SLUG_PATH: &str = "api/animeTribes/products/check-slug";

#[derive(Debug, Deserialize)]
struct CheckSlugResponse {
    exists: bool,
}

/// Asks the backend whether a product slug is already taken.
#[derive(Debug, Clone)]
pub struct SlugClient {
    client: reqwest::Client,
    base_url: Url,
}

impl SlugClient {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn check_url(&self, slug: &str) -> String {
        format!(
            "{}/{CHECK_SLUG_PATH}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            urlencoding::encode(slug)
        )
    }

    /// Look up `slug`. A blank slug is [`SlugAvailability::Unknown`] and
    /// sends no request.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError`] if the request fails or the backend answers
    /// with a non-success status.
    #[instrument(skip(self))]
    pub async fn check(&self, slug: &str) -> Result<SlugAvailability, SlugError> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Ok(SlugAvailability::Unknown);
        }

        let response = self.client.get(self.check_url(slug)).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(SlugError::Backend {
                status: status.as_u16(),
            });
        }

        let body: CheckSlugResponse = response.json().await?;
        tracing::debug!(exists = body.exists, "Slug checked");
        Ok(SlugAvailability::from_exists(body.exists))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_check_url_encodes_slug() {
        let client = SlugClient::new(Url::parse("http://localhost:5000").unwrap());
        assert_eq!(
            client.check_url("a b/c"),
            "http://localhost:5000/api/animeTribes/products/check-slug/a%20b%2Fc"
        );
    }

    #[tokio::test]
    async fn test_blank_slug_is_unknown_without_request() {
        // Nothing listens on port 9; a request would fail.
        let client = SlugClient::new(Url::parse("http://127.0.0.1:9").unwrap());
        assert_eq!(client.check("   ").await.unwrap(), SlugAvailability::Unknown);
    }
}
