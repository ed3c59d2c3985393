//! Image loading through the image proxy.
//!
//! `GET <proxy_base>/<content path>` with the session's spartan key in
//! `X-343-Authorization-Spartan`. Any failure is `None`; the caller falls
//! back to the embedded low-resolution image of the catalog entry.

use std::time::Duration;

use log::{debug, warn};

/// The one header the proxy lets through to the image host
/// (`X-343-Authorization-Spartan`; header names are case-insensitive).
pub const SPARTAN_AUTH_HEADER: &str = "x-343-authorization-spartan";

#[derive(Clone)]
pub struct ImageLoader {
    base_url: String,
    client: reqwest::Client,
}

impl ImageLoader {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client for images: {}", e);
                reqwest::Client::new()
            });
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Fetches the raw image bytes for `content_path`.
    pub async fn fetch(&self, content_path: &str, spartan_key: &str) -> Option<Vec<u8>> {
        let url = format!("{}/{}", self.base_url, content_path.trim_start_matches('/'));
        let response = match self
            .client
            .get(&url)
            .header(SPARTAN_AUTH_HEADER, spartan_key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Image fetch failed for {}: {}", content_path, e);
                return None;
            }
        };

        if !response.status().is_success() {
            debug!("Image {} returned HTTP {}", content_path, response.status());
            return None;
        }

        match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                warn!("Image body read failed for {}: {}", content_path, e);
                None
            }
        }
    }
}
