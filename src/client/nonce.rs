//! Nonce generation
//!
//! Venues reject a private request whose nonce is not greater than the last
//! one they saw. Issuance is a single compare-and-swap so concurrent callers
//! in one session still observe strictly increasing values.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::utils::time::now_ms;

/// Strictly increasing epoch-millisecond nonces
#[derive(Debug, Default)]
pub struct NonceGenerator {
    last: AtomicU64,
}

impl NonceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `max(now_ms, last + 1)`
    pub fn next(&self) -> u64 {
        let now = u64::try_from(now_ms()).unwrap_or(0);
        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|current| current);
        now.max(previous.saturating_add(1))
    }

    /// Last nonce handed out, 0 if none yet
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_back_to_back_nonces_increase() {
        let nonce = NonceGenerator::new();
        let mut previous = nonce.next();
        for _ in 0..1000 {
            let next = nonce.next();
            assert!(next > previous, "{next} <= {previous}");
            previous = next;
        }
        assert_eq!(nonce.last(), previous);
    }

    #[test]
    fn test_nonce_tracks_wall_clock() {
        let nonce = NonceGenerator::new();
        let before = now_ms() as u64;
        assert!(nonce.next() >= before);
    }

    #[test]
    fn test_concurrent_nonces_are_unique() {
        let nonce = Arc::new(NonceGenerator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let nonce = Arc::clone(&nonce);
                std::thread::spawn(move || (0..500).map(|_| nonce.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            let values = handle.join().unwrap();
            assert!(values.windows(2).all(|w| w[0] < w[1]));
            for v in values {
                assert!(seen.insert(v), "duplicate nonce {v}");
            }
        }
        assert_eq!(seen.len(), 4000);
    }
}
