//! Ordering normalization for daily history.
//!
//! Providers do not promise ascending dates. Everything that reads a series
//! front-to-back (the what-if calculator in particular) goes through
//! [`normalize_history`] first.

use crate::Bar;

/// Return `bars` sorted ascending by `date`.
///
/// The sort is stable: bars sharing a timestamp keep their original relative
/// order. The input order is never assumed.
pub fn normalize_history(mut bars: Vec<Bar>) -> Vec<Bar> {
    bars.sort_by_key(|b| b.date);
    bars
}

/// True when `bars` is non-decreasing by `date`.
pub fn is_ascending(bars: &[Bar]) -> bool {
    bars.windows(2).all(|w| w[0].date <= w[1].date)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
