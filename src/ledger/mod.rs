//! Access to the sandbox ledger API.

mod client;

pub use client::LedgerClient;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};
use crate::models::{Account, AccountId, RawPurchase, RawTransfer};

/// Funding source for ledger writes. The demo only ever spends balance.
pub const MEDIUM_BALANCE: &str = "balance";

/// Body of `POST /accounts/{id}/purchases`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPurchase {
    pub merchant_id: AccountId,
    pub medium: String,
    pub purchase_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of `POST /accounts/{id}/transfers`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransfer {
    pub medium: String,
    pub payee_id: AccountId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
}

/// Ledger acknowledgement for a write.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedResponse {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "objectCreated", default)]
    pub object_created: Option<CreatedObject>,
    /// Some deployments answer with the created object itself.
    #[serde(rename = "_id", default)]
    pub id: Option<AccountId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedObject {
    #[serde(rename = "_id")]
    pub id: AccountId,
}

impl CreatedResponse {
    /// Identifier of the created purchase or transfer.
    pub fn created_id(&self) -> std::result::Result<AccountId, ParseError> {
        self.object_created
            .as_ref()
            .map(|obj| obj.id.clone())
            .or_else(|| self.id.clone())
            .ok_or_else(|| ParseError::Payload {
                reason: "response has no objectCreated._id".to_string(),
            })
    }
}

/// Read/write operations against the ledger.
#[async_trait::async_trait]
pub trait Ledger: Send + Sync {
    async fn get_account(&self, account_id: &AccountId) -> Result<Account>;

    async fn get_purchases(&self, account_id: &AccountId) -> Result<Vec<RawPurchase>>;

    async fn get_transfers(&self, account_id: &AccountId) -> Result<Vec<RawTransfer>>;

    async fn create_purchase(
        &self,
        account_id: &AccountId,
        body: &NewPurchase,
    ) -> Result<CreatedResponse>;

    async fn create_transfer(
        &self,
        account_id: &AccountId,
        body: &NewTransfer,
    ) -> Result<CreatedResponse>;
}

/// Everything the feed needs for one account.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    pub account: Account,
    pub purchases: Vec<RawPurchase>,
    pub transfers: Vec<RawTransfer>,
}

/// Fetch account, purchases and transfers concurrently.
///
/// Fails as a whole if any of the three reads fails.
pub async fn fetch_snapshot(ledger: &dyn Ledger, account_id: &AccountId) -> Result<LedgerSnapshot> {
    let (account, purchases, transfers) = tokio::try_join!(
        ledger.get_account(account_id),
        ledger.get_purchases(account_id),
        ledger.get_transfers(account_id),
    )?;
    Ok(LedgerSnapshot {
        account,
        purchases,
        transfers,
    })
}
