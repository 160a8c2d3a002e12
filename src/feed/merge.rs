//! Merge purchases and transfers into one feed, most recent first.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::error::ParseError;
use crate::models::{RawPurchase, RawTransfer, UnifiedTransaction};

/// Parse a ledger date.
///
/// Accepts plain calendar dates (`2025-10-25`), RFC 3339 timestamps and
/// offset-less ISO timestamps; timestamps keep only their date part.
pub fn parse_occurred_on(raw: &str) -> Result<NaiveDate, ParseError> {
    let trimmed = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(ts.date());
    }

    Err(ParseError::Date {
        raw: raw.to_string(),
    })
}

/// Combine both collections into a new feed sorted by date, newest first.
///
/// Ordering rules:
/// - Purchases are laid out before transfers, then entries with a parseable
///   date are stably sorted descending, so same-day entries keep that
///   concatenation order.
/// - Entries whose date does not parse never move: they keep their
///   concatenation index and the dated entries are sorted around them.
///
/// Inputs are left untouched and identical inputs always give identical output.
pub fn merge(purchases: &[RawPurchase], transfers: &[RawTransfer]) -> Vec<UnifiedTransaction> {
    let mut entries: Vec<UnifiedTransaction> = purchases
        .iter()
        .cloned()
        .map(UnifiedTransaction::from)
        .chain(transfers.iter().cloned().map(UnifiedTransaction::from))
        .collect();

    let mut slots = Vec::with_capacity(entries.len());
    let mut dated = Vec::with_capacity(entries.len());
    for (idx, tx) in entries.iter().enumerate() {
        match parse_occurred_on(&tx.occurred_on) {
            Ok(date) => {
                slots.push(idx);
                dated.push((date, tx.clone()));
            }
            Err(err) => {
                warn!(transaction_id = %tx.id, error = %err, "Keeping undated transaction in place");
            }
        }
    }

    // `sort_by` is stable; ties keep concatenation order.
    dated.sort_by(|a, b| b.0.cmp(&a.0));

    for (slot, (_, tx)) in slots.into_iter().zip(dated) {
        entries[slot] = tx;
    }

    entries
}
