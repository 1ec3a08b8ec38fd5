//! Bar source port trait.

use crate::domain::error::TraderError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDateTime;

pub trait DataPort {
    /// Bars in source order with timestamps inside `[start, end]`; an absent
    /// bound is open.
    fn fetch_ohlcv(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<OhlcvBar>, TraderError>;
}

/// Shared bound check for adapters.
pub fn in_range(ts: NaiveDateTime, start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> bool {
    start.is_none_or(|s| ts >= s) && end.is_none_or(|e| ts <= e)
}
