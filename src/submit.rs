//! Validation and submission of new purchases and transfers.
//!
//! Validation runs before any network call. Submissions are never retried;
//! after a success the caller is expected to refresh the feed.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{LedgerError, Result};
use crate::ledger::{Ledger, NewPurchase, NewTransfer, MEDIUM_BALANCE};
use crate::models::AccountId;

/// Status stamped on transfers created from the app.
pub const NEW_TRANSFER_STATUS: &str = "pending";

/// Parse a user-entered amount.
///
/// Accepts an optional leading `$` and thousands separators (`1,250.50`).
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let amount = Decimal::from_str(cleaned.trim())
        .map_err(|_| LedgerError::validation(format!("Invalid amount: {raw:?}")))?;
    validate_amount(amount)?;
    Ok(amount)
}

/// Amounts must be strictly positive.
pub fn validate_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "Amount must be greater than zero, got {amount}"
        )));
    }
    Ok(())
}

/// Validate a payee typed by the user.
pub fn validate_payee(raw: &str) -> Result<AccountId> {
    AccountId::parse(raw).map_err(|err| LedgerError::validation(err.to_string()))
}

/// Look up a pay-service key (e.g. `internet`) in the merchant catalog.
pub fn resolve_merchant(catalog: &BTreeMap<String, AccountId>, service: &str) -> Result<AccountId> {
    catalog
        .get(&service.trim().to_lowercase())
        .cloned()
        .ok_or_else(|| {
            let known: Vec<&str> = catalog.keys().map(String::as_str).collect();
            LedgerError::validation(format!(
                "Unknown service {service:?} (known: {})",
                known.join(", ")
            ))
        })
}

fn clean_description(description: &str) -> Option<String> {
    let trimmed = description.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Submits purchases and transfers on behalf of one payer.
pub struct Submitter {
    ledger: Arc<dyn Ledger>,
    clock: Arc<dyn Clock>,
    preflight: bool,
}

impl Submitter {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self {
            ledger,
            clock: Arc::new(SystemClock),
            preflight: true,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Toggle the account-existence checks run before transfers.
    pub fn with_preflight(mut self, preflight: bool) -> Self {
        self.preflight = preflight;
        self
    }

    /// Pay a merchant from `account_id`. Returns the created purchase id.
    pub async fn submit_purchase(
        &self,
        account_id: &AccountId,
        merchant_id: &AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<AccountId> {
        validate_amount(amount)?;
        if merchant_id.as_str().trim().is_empty() {
            return Err(LedgerError::validation("Merchant is required"));
        }

        let body = NewPurchase {
            merchant_id: merchant_id.clone(),
            medium: MEDIUM_BALANCE.to_string(),
            purchase_date: self.clock.today(),
            amount,
            description: clean_description(description),
        };

        let created = self
            .ledger
            .create_purchase(account_id, &body)
            .await
            .inspect_err(|err| warn!(account_id = %account_id, error = %err, "Purchase failed"))?;
        let id = created.created_id()?;
        info!(account_id = %account_id, purchase_id = %id, "Purchase created");
        Ok(id)
    }

    /// Transfer from `payer_id` to the user-entered `payee`.
    /// Returns the created transfer id.
    pub async fn submit_transfer(
        &self,
        payer_id: &AccountId,
        payee: &str,
        amount: Decimal,
        description: &str,
    ) -> Result<AccountId> {
        validate_amount(amount)?;
        let payee_id = validate_payee(payee)?;

        if self.preflight {
            self.ensure_accounts_exist(payer_id, &payee_id).await?;
        }

        let body = NewTransfer {
            medium: MEDIUM_BALANCE.to_string(),
            payee_id: payee_id.clone(),
            amount,
            transaction_date: self.clock.today(),
            description: clean_description(description),
            status: NEW_TRANSFER_STATUS.to_string(),
        };

        let created = self
            .ledger
            .create_transfer(payer_id, &body)
            .await
            .inspect_err(|err| warn!(payer_id = %payer_id, error = %err, "Transfer failed"))?;
        let id = created.created_id()?;
        info!(payer_id = %payer_id, payee_id = %payee_id, transfer_id = %id, "Transfer created");
        Ok(id)
    }

    async fn ensure_accounts_exist(&self, payer_id: &AccountId, payee_id: &AccountId) -> Result<()> {
        let lookup = |id: &AccountId| {
            let id = id.clone();
            let ledger = Arc::clone(&self.ledger);
            async move {
                match ledger.get_account(&id).await {
                    Ok(_) => Ok(()),
                    Err(err) if err.is_not_found() => Err(LedgerError::AccountNotFound(id.to_string())),
                    Err(err) => Err(err),
                }
            }
        };
        tokio::try_join!(lookup(payer_id), lookup(payee_id))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_accepts_common_formats() {
        assert_eq!(parse_amount("100").unwrap(), Decimal::from(100));
        assert_eq!(parse_amount(" $1,250.50 ").unwrap(), Decimal::new(125050, 2));
        assert_eq!(parse_amount("0.01").unwrap(), Decimal::new(1, 2));
    }

    #[test]
    fn parse_amount_rejects_zero_negative_and_garbage() {
        for raw in ["0", "0.00", "-5", "", "abc", "NaN", "inf", "1e400"] {
            assert!(
                matches!(parse_amount(raw), Err(LedgerError::Validation(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn validate_payee_requires_hex_id() {
        assert!(validate_payee("68fc678a9683f20dd51a3f68").is_ok());
        assert!(matches!(
            validate_payee("Juan Perez"),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn resolve_merchant_is_case_insensitive() {
        let catalog = crate::config::default_merchants();
        assert_eq!(
            resolve_merchant(&catalog, "Internet").unwrap().as_str(),
            "57cf75cea73e494d8675ec49"
        );
        let err = resolve_merchant(&catalog, "gym").unwrap_err();
        assert!(err.user_message().contains("internet"));
    }

    #[test]
    fn blank_description_is_omitted() {
        assert_eq!(clean_description("   "), None);
        assert_eq!(clean_description(" Renta "), Some("Renta".to_string()));
    }
}
