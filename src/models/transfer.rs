use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AccountId;

/// Transfer as returned by `GET /accounts/{id}/transfers`.
///
/// The ledger lists transfers in both directions for an account, so
/// `payer_id` is what tells an outgoing transfer from an incoming one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransfer {
    #[serde(rename = "_id")]
    pub id: AccountId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_id: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee_id: Option<AccountId>,
    pub amount: Decimal,
    #[serde(default, deserialize_with = "super::wire::lenient_date")]
    pub transaction_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_ledger_transfer() {
        let json = r#"{
            "_id": "68fd0b1a9683f20dd51a3f80",
            "type": "p2p",
            "transaction_date": "2025-10-25",
            "status": "pending",
            "medium": "balance",
            "payer_id": "68fc67519683f20dd51a3f65",
            "payee_id": "68fc678a9683f20dd51a3f68",
            "amount": 250.5,
            "description": "Renta"
        }"#;

        let transfer: RawTransfer = serde_json::from_str(json).unwrap();
        assert_eq!(transfer.amount, Decimal::new(2505, 1));
        assert_eq!(transfer.transaction_date, "2025-10-25");
        assert_eq!(
            transfer.payee_id.as_ref().map(AccountId::as_str),
            Some("68fc678a9683f20dd51a3f68")
        );
        assert_eq!(transfer.status.as_deref(), Some("pending"));
    }

    #[test]
    fn numeric_date_is_kept_as_text() {
        let json = r#"[
            {"_id":"t1","transaction_date":20250103,"amount":100},
            {"_id":"t2","transaction_date":"2025-01-04","amount":10}
        ]"#;

        let transfers: Vec<RawTransfer> = serde_json::from_str(json).unwrap();
        assert_eq!(transfers.len(), 2);
        assert_eq!(transfers[0].transaction_date, "20250103");
        assert_eq!(transfers[1].transaction_date, "2025-01-04");
    }
}
