//! Millisecond nonces that never repeat within one client.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Produces strictly increasing millisecond-epoch nonces.
///
/// Follows the wall clock, but when two calls land in the same millisecond
/// (or the clock steps backwards) the nonce is bumped past the last one
/// issued.
#[derive(Debug, Default)]
pub struct NonceSource {
    last: AtomicI64,
}

impl NonceSource {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    /// Issue the next nonce.
    pub fn next(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(current) => last = current,
            }
        }
    }
}
