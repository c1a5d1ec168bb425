//! Client-side transaction references (`<prefix>-<millis>`)

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

pub const DEFAULT_PREFIX: &str = "MC";

static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Next millisecond stamp, strictly greater than any previously handed out
/// in this process.
fn next_millis() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_MILLIS.load(Ordering::Relaxed);
    loop {
        let candidate = if now > last { now } else { last + 1 };
        match LAST_MILLIS.compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
        {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}

/// Generate a unique transaction reference, e.g. `MC-1718000000000`.
pub fn generate_reference(prefix: Option<&str>) -> String {
    let prefix = match prefix {
        Some(p) if !p.is_empty() => p,
        _ => DEFAULT_PREFIX,
    };
    format!("{}-{}", prefix, next_millis())
}
