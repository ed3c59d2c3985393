//! HTTP implementation of `ArmoryBackend` on top of reqwest.
//!
//! Every request goes through one `reqwest::Client` built with the
//! configured timeout, so a hung backend surfaces as `ApiError::Timeout`
//! instead of leaving the screen loading forever.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use super::backend::{ApiError, ArmoryBackend};
use super::types::{ArmorCoreRequest, ArmorCoreResponse, KitBatch, SpartanResponse};
use crate::core::item::{CurrentlyEquipped, CustomKit};
use crate::core::session::GamerInfo;

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request and decodes a JSON body, mapping statuses to `ApiError`.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        debug!("Backend response status: {}", status);

        if status == reqwest::StatusCode::FORBIDDEN {
            warn!("Backend rejected session (HTTP 403)");
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Backend error: {} - {}", status.as_u16(), message);
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ArmoryBackend for HttpBackend {
    async fn fetch_spartan(
        &self,
        session: &GamerInfo,
        include_armory: bool,
    ) -> Result<SpartanResponse, ApiError> {
        info!(
            "Fetching inventory for {} (includeArmory={})",
            session.gamertag, include_armory
        );
        let request = self
            .client
            .post(self.url("/spartan"))
            .query(&[("includeArmory", include_armory)])
            .json(session);
        self.send_json(request).await
    }

    async fn fetch_custom_kits(&self, session: &GamerInfo) -> Result<Vec<CustomKit>, ApiError> {
        let request = self.client.post(self.url("/getCustomKit")).json(session);
        let batches: Vec<KitBatch> = self.send_json(request).await?;
        let kits = batches
            .into_iter()
            .next()
            .map(|batch| batch.loadouts)
            .unwrap_or_default();
        debug!("Fetched {} custom kit(s)", kits.len());
        Ok(kits)
    }

    async fn equip(
        &self,
        session: &GamerInfo,
        equipped: &CurrentlyEquipped,
    ) -> Result<ArmorCoreResponse, ApiError> {
        let body = ArmorCoreRequest {
            gamer_info: session,
            currently_equipped: equipped,
        };
        let request = self.client.post(self.url("/armorcore")).json(&body);
        self.send_json(request).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let response = self.client.get(self.url("/logout")).send().await?;
        debug!("Logout response status: {}", response.status());
        Ok(())
    }
}
