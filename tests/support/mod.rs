#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sandbank::ledger::{CreatedResponse, Ledger, NewPurchase, NewTransfer};
use sandbank::models::{Account, AccountId, RawPurchase, RawTransfer};
use sandbank::{LedgerError, Result};

pub const ACCOUNT_A: &str = "68fc67519683f20dd51a3f65";
pub const ACCOUNT_B: &str = "68fc678a9683f20dd51a3f68";
pub const MERCHANT: &str = "57cf75cea73e494d8675ec49";

pub fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).expect("decimal literal")
}

pub fn account(id: &str, balance: &str) -> Account {
    Account {
        id: AccountId::from_string(id),
        account_type: Some("Checking".to_string()),
        nickname: Some("Main".to_string()),
        rewards: Some(0),
        balance: dec(balance),
        account_number: None,
        customer_id: None,
    }
}

pub fn purchase(id: &str, date: &str, amount: &str, description: &str) -> RawPurchase {
    RawPurchase {
        id: AccountId::from_string(id),
        merchant_id: Some(AccountId::from_string(MERCHANT)),
        payer_id: None,
        amount: dec(amount),
        purchase_date: date.to_string(),
        description: Some(description.to_string()),
        status: Some("executed".to_string()),
        medium: Some("balance".to_string()),
    }
}

pub fn transfer(id: &str, date: &str, amount: &str, payer: &str, payee: &str) -> RawTransfer {
    RawTransfer {
        id: AccountId::from_string(id),
        payer_id: Some(AccountId::from_string(payer)),
        payee_id: Some(AccountId::from_string(payee)),
        amount: dec(amount),
        transaction_date: date.to_string(),
        description: None,
        status: Some("pending".to_string()),
        medium: Some("balance".to_string()),
    }
}

/// In-memory ledger with scripted responses.
///
/// Reads fall back to the configured defaults once their queues are empty.
/// Queued purchase responses carry a delay so tests can make an older
/// refresh finish after a newer one.
#[derive(Default)]
pub struct FakeLedger {
    accounts: Mutex<HashMap<String, Account>>,
    purchases: Mutex<Vec<RawPurchase>>,
    transfers: Mutex<Vec<RawTransfer>>,
    scripted_purchases: Mutex<VecDeque<(Duration, Vec<RawPurchase>)>>,
    account_failures: Mutex<VecDeque<u16>>,
    write_failure: Mutex<Option<(u16, String)>>,
    pub created_purchases: Mutex<Vec<(AccountId, NewPurchase)>>,
    pub created_transfers: Mutex<Vec<(AccountId, NewTransfer)>>,
    pub account_calls: AtomicUsize,
    pub read_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, account: Account) -> Self {
        self.put_account(account);
        self
    }

    pub fn with_purchases(self, purchases: Vec<RawPurchase>) -> Self {
        self.set_purchases(purchases);
        self
    }

    pub fn with_transfers(self, transfers: Vec<RawTransfer>) -> Self {
        *self.transfers.lock().unwrap() = transfers;
        self
    }

    pub fn put_account(&self, account: Account) {
        self.accounts
            .lock()
            .unwrap()
            .insert(account.id.to_string(), account);
    }

    pub fn set_purchases(&self, purchases: Vec<RawPurchase>) {
        *self.purchases.lock().unwrap() = purchases;
    }

    /// Queue one purchase listing returned after `delay`.
    pub fn script_purchases(&self, delay: Duration, purchases: Vec<RawPurchase>) {
        self.scripted_purchases
            .lock()
            .unwrap()
            .push_back((delay, purchases));
    }

    /// Make the next `get_account` call fail with `status`.
    pub fn fail_next_account(&self, status: u16) {
        self.account_failures.lock().unwrap().push_back(status);
    }

    /// Make every write fail with `status` and a ledger-style message body.
    pub fn fail_writes(&self, status: u16, message: &str) {
        let body = serde_json::json!({ "code": status, "message": message }).to_string();
        *self.write_failure.lock().unwrap() = Some((status, body));
    }

    pub fn writes(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    fn check_write(&self) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        match self.write_failure.lock().unwrap().clone() {
            Some((status, body)) => Err(LedgerError::RemoteRequest { status, body }),
            None => Ok(()),
        }
    }

    fn created(id: &str) -> CreatedResponse {
        serde_json::from_value(serde_json::json!({
            "code": 201,
            "message": "Created",
            "objectCreated": { "_id": id }
        }))
        .expect("created response")
    }
}

fn not_found() -> LedgerError {
    LedgerError::RemoteRequest {
        status: 404,
        body: r#"{"code":404,"message":"Invalid ID"}"#.to_string(),
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn get_account(&self, account_id: &AccountId) -> Result<Account> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.account_failures.lock().unwrap().pop_front() {
            return Err(LedgerError::RemoteRequest {
                status,
                body: format!(r#"{{"code":{status},"message":"Scripted failure"}}"#),
            });
        }
        self.accounts
            .lock()
            .unwrap()
            .get(account_id.as_str())
            .cloned()
            .ok_or_else(not_found)
    }

    async fn get_purchases(&self, _account_id: &AccountId) -> Result<Vec<RawPurchase>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.scripted_purchases.lock().unwrap().pop_front();
        match scripted {
            Some((delay, purchases)) => {
                tokio::time::sleep(delay).await;
                Ok(purchases)
            }
            None => Ok(self.purchases.lock().unwrap().clone()),
        }
    }

    async fn get_transfers(&self, _account_id: &AccountId) -> Result<Vec<RawTransfer>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.transfers.lock().unwrap().clone())
    }

    async fn create_purchase(
        &self,
        account_id: &AccountId,
        body: &NewPurchase,
    ) -> Result<CreatedResponse> {
        self.check_write()?;
        let mut created = self.created_purchases.lock().unwrap();
        created.push((account_id.clone(), body.clone()));
        Ok(Self::created(&format!("purchase-{}", created.len())))
    }

    async fn create_transfer(
        &self,
        account_id: &AccountId,
        body: &NewTransfer,
    ) -> Result<CreatedResponse> {
        self.check_write()?;
        let mut created = self.created_transfers.lock().unwrap();
        created.push((account_id.clone(), body.clone()));
        Ok(Self::created(&format!("transfer-{}", created.len())))
    }
}
