//! Process-wide accumulator counters, compiled in only with the
//! `accumulator-stats` feature.

#[cfg(feature = "accumulator-stats")]
mod counters {
    use std::sync::atomic::{AtomicU64, Ordering};

    static UPDATES: AtomicU64 = AtomicU64::new(0);
    static REFRESHES: AtomicU64 = AtomicU64::new(0);

    #[inline(always)]
    pub fn count_update() {
        UPDATES.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn count_refresh() {
        REFRESHES.fetch_add(1, Ordering::Relaxed);
    }

    /// (updates, refreshes) since the last reset.
    pub fn accumulator_stats() -> (u64, u64) {
        (
            UPDATES.load(Ordering::Relaxed),
            REFRESHES.load(Ordering::Relaxed),
        )
    }

    pub fn reset_accumulator_stats() {
        UPDATES.store(0, Ordering::Relaxed);
        REFRESHES.store(0, Ordering::Relaxed);
    }
}

#[cfg(feature = "accumulator-stats")]
pub use counters::{accumulator_stats, reset_accumulator_stats};

#[cfg(feature = "accumulator-stats")]
pub(crate) use counters::{count_refresh, count_update};

#[cfg(not(feature = "accumulator-stats"))]
#[inline(always)]
pub(crate) fn count_update() {}

#[cfg(not(feature = "accumulator-stats"))]
#[inline(always)]
pub(crate) fn count_refresh() {}
