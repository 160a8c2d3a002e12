use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

use super::{AccountId, RawPurchase, RawTransfer};

/// Shown when a transaction has no description.
pub const DEFAULT_DESCRIPTION: &str = "Movimiento";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Purchase,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Transfer => "transfer",
        }
    }
}

/// Status as reported by the ledger.
///
/// The ledger sends free-form text; anything outside the three known values
/// maps to `Unknown` rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    Pending,
    Cancelled,
    Unknown,
}

impl TransactionStatus {
    /// Case-insensitive parse; `None` and unrecognized values become `Unknown`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("completed") => Self::Completed,
            Some("pending") => Self::Pending,
            Some("cancelled") | Some("canceled") => Self::Cancelled,
            _ => Self::Unknown,
        }
    }
}

/// A purchase or transfer normalized into one shape for the feed.
///
/// `amount` is always the positive magnitude from the ledger; the sign is
/// derived per reference account by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedTransaction {
    #[serde(rename = "_id")]
    pub id: AccountId,
    pub kind: TransactionKind,
    pub amount: Decimal,
    /// Raw `purchase_date` or `transaction_date`, depending on `kind`.
    pub occurred_on: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_id: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee_id: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
}

impl UnifiedTransaction {
    /// Description for display, falling back to [`DEFAULT_DESCRIPTION`].
    pub fn display_description(&self) -> &str {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_DESCRIPTION)
    }

    pub fn status(&self) -> TransactionStatus {
        TransactionStatus::parse(self.status.as_deref())
    }

    /// The account (or merchant) on the other side of the movement.
    pub fn counterparty(&self) -> Option<&AccountId> {
        match self.kind {
            TransactionKind::Purchase => self.merchant_id.as_ref(),
            TransactionKind::Transfer => self.payee_id.as_ref(),
        }
    }

    /// Decode a transaction handed over as JSON between screens.
    ///
    /// Accepts both the ledger's raw shape (`purchase_date` /
    /// `transaction_date`) and the unified shape (`occurred_on` + `kind`).
    pub fn from_payload(payload: &str) -> Result<Self, ParseError> {
        let raw: DetailPayload =
            serde_json::from_str(payload).map_err(|err| ParseError::Payload {
                reason: err.to_string(),
            })?;

        let (kind, occurred_on) = match (raw.kind, raw.occurred_on, raw.purchase_date, raw.transaction_date) {
            (Some(kind), Some(date), _, _) => (kind, date),
            (_, _, Some(date), _) => (TransactionKind::Purchase, date),
            (_, _, _, Some(date)) => (TransactionKind::Transfer, date),
            _ => {
                return Err(ParseError::Payload {
                    reason: "missing purchase_date or transaction_date".to_string(),
                })
            }
        };

        Ok(Self {
            id: raw.id,
            kind,
            amount: raw.amount,
            occurred_on,
            description: raw.description,
            status: raw.status,
            payer_id: raw.payer_id,
            payee_id: raw.payee_id,
            merchant_id: raw.merchant_id,
            medium: raw.medium,
        })
    }
}

#[derive(Deserialize)]
struct DetailPayload {
    #[serde(rename = "_id")]
    id: AccountId,
    amount: Decimal,
    #[serde(default)]
    kind: Option<TransactionKind>,
    #[serde(default)]
    occurred_on: Option<String>,
    #[serde(default)]
    purchase_date: Option<String>,
    #[serde(default)]
    transaction_date: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    payer_id: Option<AccountId>,
    #[serde(default)]
    payee_id: Option<AccountId>,
    #[serde(default)]
    merchant_id: Option<AccountId>,
    #[serde(default)]
    medium: Option<String>,
}

impl From<RawPurchase> for UnifiedTransaction {
    fn from(p: RawPurchase) -> Self {
        Self {
            id: p.id,
            kind: TransactionKind::Purchase,
            amount: p.amount,
            occurred_on: p.purchase_date,
            description: p.description,
            status: p.status,
            payer_id: p.payer_id,
            payee_id: None,
            merchant_id: p.merchant_id,
            medium: p.medium,
        }
    }
}

impl From<RawTransfer> for UnifiedTransaction {
    fn from(t: RawTransfer) -> Self {
        Self {
            id: t.id,
            kind: TransactionKind::Transfer,
            amount: t.amount,
            occurred_on: t.transaction_date,
            description: t.description,
            status: t.status,
            payer_id: t.payer_id,
            payee_id: t.payee_id,
            merchant_id: None,
            medium: t.medium,
        }
    }
}
