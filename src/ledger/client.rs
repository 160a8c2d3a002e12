use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::header::{CACHE_CONTROL, EXPIRES, PRAGMA};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::models::{Account, AccountId, RawPurchase, RawTransfer};

use super::{CreatedResponse, Ledger, NewPurchase, NewTransfer};

/// Query parameter carrying the per-request freshness token.
pub(crate) const CACHE_BUST_PARAM: &str = "_ts";

/// HTTP client for the sandbox ledger.
///
/// Reads are sent with no-cache headers and a unique `_ts` query token,
/// since the sandbox may otherwise serve stale collections.
pub struct LedgerClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
    clock: Arc<dyn Clock>,
    nonce: AtomicU64,
}

impl LedgerClient {
    pub fn new(base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            clock: Arc::new(SystemClock),
            nonce: AtomicU64::new(0),
        }
    }

    /// Build a client from configuration. Fails if no API key is configured.
    pub fn from_config(config: &LedgerConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LedgerError::Config("ledger.api_key is not set".to_string()))?;
        Ok(Self::new(
            config.base_url.clone(),
            SecretString::from(api_key.to_string()),
        ))
    }

    /// Use a custom reqwest client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Point the client at a different host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn cache_bust_token(&self) -> String {
        let seq = self.nonce.fetch_add(1, Ordering::Relaxed);
        format!("{}-{seq}", self.clock.unix_millis())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, path: &str) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(path, status = status.as_u16(), "Ledger request failed");
            return Err(LedgerError::RemoteRequest {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(method = "GET", path, "Ledger request");
        let token = self.cache_bust_token();
        let request = self
            .client
            .get(self.url(path))
            .query(&[
                ("key", self.api_key.expose_secret()),
                (CACHE_BUST_PARAM, token.as_str()),
            ])
            .header(CACHE_CONTROL, "no-cache, no-store, must-revalidate")
            .header(PRAGMA, "no-cache")
            .header(EXPIRES, "0");
        self.send(request, path).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!(method = "POST", path, "Ledger request");
        let request = self
            .client
            .post(self.url(path))
            .query(&[("key", self.api_key.expose_secret())])
            .json(body);
        self.send(request, path).await
    }
}

#[async_trait::async_trait]
impl Ledger for LedgerClient {
    async fn get_account(&self, account_id: &AccountId) -> Result<Account> {
        self.get_json(&format!("/accounts/{account_id}")).await
    }

    async fn get_purchases(&self, account_id: &AccountId) -> Result<Vec<RawPurchase>> {
        self.get_json(&format!("/accounts/{account_id}/purchases"))
            .await
    }

    async fn get_transfers(&self, account_id: &AccountId) -> Result<Vec<RawTransfer>> {
        self.get_json(&format!("/accounts/{account_id}/transfers"))
            .await
    }

    async fn create_purchase(
        &self,
        account_id: &AccountId,
        body: &NewPurchase,
    ) -> Result<CreatedResponse> {
        self.post_json(&format!("/accounts/{account_id}/purchases"), body)
            .await
    }

    async fn create_transfer(
        &self,
        account_id: &AccountId,
        body: &NewTransfer,
    ) -> Result<CreatedResponse> {
        self.post_json(&format!("/accounts/{account_id}/transfers"), body)
            .await
    }
}
