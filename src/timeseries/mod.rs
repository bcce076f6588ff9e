//! Time-range resolution and step/tick selection.
//!
//! Pure numeric functions: the same inputs always yield the same outputs.
//! The only impure entry point is [`resolve_time_range`], which anchors a
//! window at the current wall clock.

use crate::datamodel::TimeRange;
use hifitime::Epoch;

/// Upper bound on the number of points a range query may return. Longer
/// ranges get coarser steps to stay under it.
pub const MAX_POINTS: i64 = 300;

/// Step candidates in seconds, from fine to coarse.
const STEP_LADDER: &[i64] = &[
    1, 2, 5, 10, 15, 30, 60, 120, 300, 600, 900, 1800, 3600, 7200, 14400, 43200, 86400,
];

/// Tick-interval candidates in seconds. Aims at roughly ten gridlines.
const TICK_LADDER: &[i64] = &[
    1, 2, 5, 10, 15, 30, 60, 120, 300, 600, 900, 1800, 3600, 7200, 14400, 21600, 43200, 86400,
    172800, 604800,
];

/// Start/end/step of a range query, in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRangeInfo {
    pub start: i64,
    pub end: i64,
    pub step: u64,
}

/// Concrete epoch bounds for an abstract time range, ending now.
pub fn resolve_time_range(range: TimeRange) -> (i64, i64) {
    let end = now_unix();
    (end - range.span_seconds(), end)
}

fn now_unix() -> i64 {
    match Epoch::now() {
        Ok(epoch) => epoch.to_unix_seconds() as i64,
        // The system clock being unavailable is not worth failing a
        // dashboard query over.
        Err(_) => 0,
    }
}

/// The finest ladder step keeping `span / step` under [`MAX_POINTS`].
/// A one-hour window resolves to 15s, i.e. 240 points.
pub fn proper_step(start: i64, end: i64) -> u64 {
    let span = (end - start).max(1);
    for &step in STEP_LADDER {
        if span / step <= MAX_POINTS {
            return step as u64;
        }
    }
    // Past the ladder, force the budget directly, rounding up.
    ((span + MAX_POINTS - 1) / MAX_POINTS) as u64
}

/// Normalize query bounds: pick the step and align the start down to a
/// step boundary so that consecutive refreshes sample the same buckets.
pub fn query_range_info(start: i64, end: i64) -> QueryRangeInfo {
    let step = proper_step(start, end);
    let aligned_start = start - start.rem_euclid(step as i64);
    QueryRangeInfo {
        start: aligned_start,
        end,
        step,
    }
}

/// The smallest tick interval giving at most ten gridlines over a span.
pub fn proper_tick_interval(span: i64) -> i64 {
    tick_interval_by_gap(span / 10)
}

/// The smallest ladder entry at least as coarse as a desired gap.
pub fn tick_interval_by_gap(gap: i64) -> i64 {
    for &tick in TICK_LADDER {
        if tick >= gap {
            return tick;
        }
    }
    // Very long spans: fall back to whole days, rounding up.
    (gap + 86399) / 86400 * 86400
}
