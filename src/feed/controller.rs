//! Refresh orchestration for one account's feed.
//!
//! Every refresh takes a sequence number when it starts. A response is only
//! applied if no newer refresh has been applied already, so a slow older
//! request can never overwrite fresher data.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ledger::{fetch_snapshot, Ledger, LedgerSnapshot};
use crate::models::{Account, AccountId, UnifiedTransaction};

use super::category::{Category, Categorizer};
use super::classify::{classify, Classification};
use super::merge::merge;
use super::window::Window;

/// What triggered a refresh. Both share the same fetch; they differ only in
/// which loading flag is raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Screen gained focus. Shows the full-screen indicator only while no
    /// data has been loaded yet.
    Focus,
    /// User pulled to refresh.
    Pull,
}

/// A classified feed row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    pub transaction: UnifiedTransaction,
    pub classification: Classification,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { seq: u64, entries: usize },
    /// A newer refresh was applied first; this response was dropped.
    Discarded { seq: u64, latest: u64 },
    /// Prior state was kept; `message` is what the error banner shows.
    Failed { seq: u64, message: String },
}

#[derive(Debug, Clone, Default)]
pub struct FeedState {
    pub account: Option<Account>,
    pub entries: Vec<FeedEntry>,
    pub window: Window,
    pub loading: bool,
    pub refreshing: bool,
    pub error: Option<String>,
    applied_seq: u64,
    error_seq: u64,
}

impl FeedState {
    pub fn visible(&self) -> &[FeedEntry] {
        self.window.visible(&self.entries)
    }

    pub fn has_more(&self) -> bool {
        self.window.has_more(self.entries.len())
    }

    /// Sequence number of the data currently shown (0 before the first load).
    pub fn applied_seq(&self) -> u64 {
        self.applied_seq
    }
}

pub struct FeedController {
    ledger: Arc<dyn Ledger>,
    account_id: AccountId,
    categorizer: Categorizer,
    issued: AtomicU64,
    state: Mutex<FeedState>,
}

impl FeedController {
    pub fn new(ledger: Arc<dyn Ledger>, account_id: AccountId) -> Self {
        Self {
            ledger,
            account_id,
            categorizer: Categorizer::builtin(),
            issued: AtomicU64::new(0),
            state: Mutex::new(FeedState::default()),
        }
    }

    pub fn with_categorizer(mut self, categorizer: Categorizer) -> Self {
        self.categorizer = categorizer;
        self
    }

    pub fn with_page_size(self, page_size: usize) -> Self {
        self.lock().window = Window::with_increment(page_size);
        self
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> FeedState {
        self.lock().clone()
    }

    pub fn visible(&self) -> Vec<FeedEntry> {
        self.lock().visible().to_vec()
    }

    pub fn has_more(&self) -> bool {
        self.lock().has_more()
    }

    /// Reveal the next page of entries.
    pub fn load_more(&self) {
        let mut state = self.lock();
        let total = state.entries.len();
        state.window.grow(total);
    }

    pub fn dismiss_error(&self) {
        self.lock().error = None;
    }

    /// Fetch account, purchases and transfers and replace the feed.
    ///
    /// Failures keep whatever was shown before and set `error`.
    pub async fn refresh(&self, mode: RefreshMode) -> RefreshOutcome {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.lock();
            match mode {
                RefreshMode::Focus if state.account.is_none() => state.loading = true,
                RefreshMode::Focus => {}
                RefreshMode::Pull => state.refreshing = true,
            }
        }
        debug!(seq, account_id = %self.account_id, ?mode, "Refreshing feed");

        let result = fetch_snapshot(self.ledger.as_ref(), &self.account_id).await;

        let mut state = self.lock();
        let outcome = match result {
            _ if seq < state.applied_seq => {
                info!(seq, latest = state.applied_seq, "Discarding out-of-order feed response");
                RefreshOutcome::Discarded {
                    seq,
                    latest: state.applied_seq,
                }
            }
            Ok(snapshot) => {
                let entries = self.build_entries(&snapshot);
                let count = entries.len();
                state.account = Some(snapshot.account);
                state.entries = entries;
                state.applied_seq = seq;
                if seq > state.error_seq {
                    state.error = None;
                }
                debug!(seq, entries = count, "Applied feed refresh");
                RefreshOutcome::Applied {
                    seq,
                    entries: count,
                }
            }
            Err(err) => {
                let message = err.user_message();
                warn!(seq, account_id = %self.account_id, error = %err, "Feed refresh failed");
                state.error = Some(message.clone());
                state.error_seq = seq;
                RefreshOutcome::Failed { seq, message }
            }
        };

        if seq == self.issued.load(Ordering::SeqCst) {
            state.loading = false;
            state.refreshing = false;
        }

        outcome
    }

    fn build_entries(&self, snapshot: &LedgerSnapshot) -> Vec<FeedEntry> {
        merge(&snapshot.purchases, &snapshot.transfers)
            .into_iter()
            .map(|transaction| {
                let classification = classify(&transaction, &self.account_id);
                let category = self.categorizer.categorize(transaction.display_description());
                FeedEntry {
                    transaction,
                    classification,
                    category,
                }
            })
            .collect()
    }
}
