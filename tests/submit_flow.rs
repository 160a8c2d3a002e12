use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sandbank::clock::FixedClock;
use sandbank::config::default_merchants;
use sandbank::feed::{Direction, FeedController, RefreshMode};
use sandbank::ledger::Ledger;
use sandbank::models::AccountId;
use sandbank::submit::{parse_amount, resolve_merchant, Submitter, NEW_TRANSFER_STATUS};
use sandbank::LedgerError;

mod support;
use support::{account, dec, FakeLedger, ACCOUNT_A, ACCOUNT_B, MERCHANT};

fn submitter(ledger: &Arc<FakeLedger>) -> Submitter {
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 10, 26, 18, 30, 0).unwrap());
    let ledger: Arc<dyn Ledger> = ledger.clone();
    Submitter::new(ledger).with_clock(Arc::new(clock))
}

fn both_accounts() -> FakeLedger {
    FakeLedger::new()
        .with_account(account(ACCOUNT_A, "5000"))
        .with_account(account(ACCOUNT_B, "100"))
}

#[tokio::test]
async fn zero_amount_is_rejected_before_any_request() -> Result<()> {
    let ledger = Arc::new(both_accounts());
    let submit = submitter(&ledger);
    let payer = AccountId::from_string(ACCOUNT_A);

    let err = submit
        .submit_transfer(&payer, ACCOUNT_B, Decimal::ZERO, "")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    let err = submit
        .submit_purchase(&payer, &AccountId::from_string(MERCHANT), dec("-3"), "")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    assert!(matches!(parse_amount("0"), Err(LedgerError::Validation(_))));
    assert_eq!(ledger.writes(), 0);
    assert_eq!(ledger.account_calls.load(std::sync::atomic::Ordering::SeqCst), 0);

    Ok(())
}

#[tokio::test]
async fn malformed_payee_is_rejected_before_any_request() -> Result<()> {
    let ledger = Arc::new(both_accounts());
    let err = submitter(&ledger)
        .submit_transfer(&AccountId::from_string(ACCOUNT_A), "Juan Perez", dec("10"), "")
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(ledger.writes(), 0);
    assert_eq!(ledger.account_calls.load(std::sync::atomic::Ordering::SeqCst), 0);

    Ok(())
}

#[tokio::test]
async fn unknown_payee_fails_preflight_without_writing() -> Result<()> {
    let ledger = Arc::new(FakeLedger::new().with_account(account(ACCOUNT_A, "5000")));
    let err = submitter(&ledger)
        .submit_transfer(&AccountId::from_string(ACCOUNT_A), ACCOUNT_B, dec("10"), "")
        .await
        .unwrap_err();

    match &err {
        LedgerError::AccountNotFound(id) => assert_eq!(id, ACCOUNT_B),
        other => panic!("expected AccountNotFound, got {other:?}"),
    }
    assert!(err.user_message().contains(ACCOUNT_B));
    assert_eq!(ledger.writes(), 0);

    Ok(())
}

#[tokio::test]
async fn transfer_is_created_pending_with_todays_date() -> Result<()> {
    let ledger = Arc::new(both_accounts());
    let id = submitter(&ledger)
        .submit_transfer(
            &AccountId::from_string(ACCOUNT_A),
            &format!("  {ACCOUNT_B} "),
            dec("150.50"),
            " Renta ",
        )
        .await?;
    assert_eq!(id.as_str(), "transfer-1");

    let created = ledger.created_transfers.lock().unwrap();
    let (payer, body) = &created[0];
    assert_eq!(payer.as_str(), ACCOUNT_A);
    assert_eq!(body.payee_id.as_str(), ACCOUNT_B);
    assert_eq!(body.amount, dec("150.50"));
    assert_eq!(body.medium, "balance");
    assert_eq!(body.status, NEW_TRANSFER_STATUS);
    assert_eq!(body.description.as_deref(), Some("Renta"));
    assert_eq!(
        body.transaction_date,
        NaiveDate::from_ymd_opt(2025, 10, 26).unwrap()
    );

    Ok(())
}

#[tokio::test]
async fn service_payment_posts_purchase_to_catalog_merchant() -> Result<()> {
    let ledger = Arc::new(both_accounts());
    let merchant = resolve_merchant(&default_merchants(), "internet")?;
    let id = submitter(&ledger)
        .submit_purchase(&AccountId::from_string(ACCOUNT_A), &merchant, dec("599"), "")
        .await?;
    assert_eq!(id.as_str(), "purchase-1");

    let created = ledger.created_purchases.lock().unwrap();
    let (_, body) = &created[0];
    assert_eq!(body.merchant_id.as_str(), MERCHANT);
    assert_eq!(body.description, None);
    assert_eq!(
        body.purchase_date,
        NaiveDate::from_ymd_opt(2025, 10, 26).unwrap()
    );

    Ok(())
}

#[tokio::test]
async fn ledger_rejection_surfaces_server_message() -> Result<()> {
    let ledger = Arc::new(both_accounts());
    ledger.fail_writes(400, "Insufficient funds");

    let err = submitter(&ledger)
        .with_preflight(false)
        .submit_transfer(&AccountId::from_string(ACCOUNT_A), ACCOUNT_B, dec("9999"), "")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.user_message(), "Insufficient funds");
    assert_eq!(ledger.writes(), 1);
    assert!(ledger.created_transfers.lock().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn submitted_transfer_shows_up_after_refresh() -> Result<()> {
    let ledger = Arc::new(both_accounts());
    let payer = AccountId::from_string(ACCOUNT_A);
    submitter(&ledger)
        .submit_transfer(&payer, ACCOUNT_B, dec("75.43"), "Cena")
        .await?;

    // The fake does not echo writes back; mirror what the ledger would list.
    let (_, body) = ledger.created_transfers.lock().unwrap()[0].clone();
    let ledger = Arc::new(
        both_accounts().with_transfers(vec![sandbank::models::RawTransfer {
            id: AccountId::from_string("transfer-1"),
            payer_id: Some(payer.clone()),
            payee_id: Some(body.payee_id),
            amount: body.amount,
            transaction_date: body.transaction_date.to_string(),
            description: body.description,
            status: Some(body.status),
            medium: Some(body.medium),
        }]),
    );

    let dyn_ledger: Arc<dyn Ledger> = ledger.clone();
    let feed = FeedController::new(dyn_ledger, payer);
    feed.refresh(RefreshMode::Focus).await;

    let entries = feed.visible();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].classification.direction, Direction::Outgoing);
    assert_eq!(entries[0].classification.status.label, "Pendiente");
    assert_eq!(entries[0].transaction.occurred_on, "2025-10-26");

    Ok(())
}
