use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AccountId;

/// Purchase as returned by `GET /accounts/{id}/purchases`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPurchase {
    #[serde(rename = "_id")]
    pub id: AccountId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_id: Option<AccountId>,
    pub amount: Decimal,
    /// Calendar date as sent by the ledger. Parsed lazily so one bad value
    /// cannot fail the whole collection.
    #[serde(default, deserialize_with = "super::wire::lenient_date")]
    pub purchase_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
}
