//! The unified transaction feed: merge, classify, categorize and window.

mod category;
mod classify;
mod controller;
mod merge;
mod window;

pub use category::{Categorizer, Category};
pub use classify::{
    classify, classify_by_sign, direction, display_status, signed_amount, Classification, Direction, DisplayStatus,
    StatusTone,
};
pub use controller::{FeedController, FeedEntry, FeedState, RefreshMode, RefreshOutcome};
pub use merge::{merge, parse_occurred_on};
pub use window::{grow, visible, Window, WINDOW_INCREMENT};
