//! Millisecond wall clock used for event keys.

use std::sync::atomic::{AtomicI64, Ordering};

static LAST_MILLIS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// Never returns a value smaller than a previous call in the same process, even if the
/// system clock steps backwards.
pub fn now_millis() -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    let previous = LAST_MILLIS.fetch_max(now, Ordering::AcqRel);
    previous.max(now)
}
