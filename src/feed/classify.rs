//! Direction and status presentation for a transaction, relative to the
//! account whose feed is being shown. Shared by the feed and the detail view.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{AccountId, TransactionStatus, UnifiedTransaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Decreases the reference account's balance.
    Outgoing,
    /// Increases the reference account's balance.
    Incoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Green,
    Amber,
    Red,
}

impl StatusTone {
    pub fn hex(&self) -> &'static str {
        match self {
            Self::Green => "#10B981",
            Self::Amber => "#F59E0B",
            Self::Red => "#EF4444",
        }
    }
}

/// How a status is shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayStatus {
    /// Status driving the presentation. `Unknown` never appears here.
    pub status: TransactionStatus,
    pub label: &'static str,
    pub tone: StatusTone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub direction: Direction,
    pub status: DisplayStatus,
}

/// Classify `tx` for the account `reference`.
pub fn classify(tx: &UnifiedTransaction, reference: &AccountId) -> Classification {
    Classification {
        direction: direction(tx, reference),
        status: display_status(tx.status()),
    }
}

/// Classify `tx` when no reference account is known, e.g. a detail view
/// opened without an account. Direction comes from the amount sign alone.
pub fn classify_by_sign(tx: &UnifiedTransaction) -> Classification {
    Classification {
        direction: sign_direction(tx.amount),
        status: display_status(tx.status()),
    }
}

/// `Outgoing` iff the reference account paid.
///
/// Without a `payer_id` the sign of the amount decides: negative is
/// outgoing, anything else incoming. Ledger amounts are positive, so such
/// entries show as incoming.
pub fn direction(tx: &UnifiedTransaction, reference: &AccountId) -> Direction {
    match &tx.payer_id {
        Some(payer) if payer == reference => Direction::Outgoing,
        Some(_) => Direction::Incoming,
        None => sign_direction(tx.amount),
    }
}

fn sign_direction(amount: Decimal) -> Direction {
    if amount.is_sign_negative() && !amount.is_zero() {
        Direction::Outgoing
    } else {
        Direction::Incoming
    }
}

/// Fixed status lookup. `Unknown` (missing or unrecognized text) is shown
/// exactly like `Completed`.
pub fn display_status(status: TransactionStatus) -> DisplayStatus {
    match status {
        TransactionStatus::Pending => DisplayStatus {
            status,
            label: "Pendiente",
            tone: StatusTone::Amber,
        },
        TransactionStatus::Cancelled => DisplayStatus {
            status,
            label: "Cancelado",
            tone: StatusTone::Red,
        },
        TransactionStatus::Completed | TransactionStatus::Unknown => DisplayStatus {
            status: TransactionStatus::Completed,
            label: "Completado",
            tone: StatusTone::Green,
        },
    }
}

/// Amount with the sign implied by `direction`.
pub fn signed_amount(amount: Decimal, direction: Direction) -> Decimal {
    match direction {
        Direction::Outgoing => -amount.abs(),
        Direction::Incoming => amount.abs(),
    }
}
