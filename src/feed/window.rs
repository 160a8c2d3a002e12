//! Incremental reveal of the in-memory feed. The ledger has no server-side
//! paging; the full collection is always fetched.

/// Entries revealed initially and by each "load more".
pub const WINDOW_INCREMENT: usize = 8;

/// The first `window` items, or all of them if there are fewer.
pub fn visible<T>(items: &[T], window: usize) -> &[T] {
    &items[..window.min(items.len())]
}

/// Next window size after a "load more".
pub fn grow(window: usize) -> usize {
    window.saturating_add(WINDOW_INCREMENT)
}

/// Windowing state for one feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    size: usize,
    increment: usize,
}

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}

impl Window {
    pub fn new() -> Self {
        Self::with_increment(WINDOW_INCREMENT)
    }

    /// A window that starts at and grows by `increment` (at least 1).
    pub fn with_increment(increment: usize) -> Self {
        let increment = increment.max(1);
        Self {
            size: increment,
            increment,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        visible(items, self.size)
    }

    /// Whether a "load more" control should be offered.
    pub fn has_more(&self, total: usize) -> bool {
        self.size < total
    }

    /// Reveal one more page. No-op once everything is visible.
    pub fn grow(&mut self, total: usize) {
        if self.has_more(total) {
            self.size = self.size.saturating_add(self.increment);
        }
    }

    pub fn reset(&mut self) {
        self.size = self.increment;
    }
}
