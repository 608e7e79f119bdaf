//! Injectable randomness (§4.7, §5, §9): the only source of
//! nondeterminism in the walker is which NS/address is picked among
//! several candidates. Abstracted behind a trait so tests can supply a
//! fixed sequence, with a `fastrand`-backed default — the same RNG crate
//! the donor codebase uses throughout its load-balancer and cache jitter.

pub trait Rng: Send + Sync {
    /// Returns a uniformly chosen index in `0..len`. `len` is never 0.
    fn pick(&self, len: usize) -> usize;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FastrandRng;

impl Rng for FastrandRng {
    fn pick(&self, len: usize) -> usize {
        fastrand::usize(0..len)
    }
}

/// A deterministic RNG for tests: cycles through a fixed sequence of
/// indices, wrapping as needed.
#[derive(Debug, Clone)]
pub struct FixedRng {
    sequence: Vec<usize>,
    cursor: std::sync::atomic::AtomicUsize,
}

impl FixedRng {
    pub fn new(sequence: Vec<usize>) -> Self {
        Self {
            sequence,
            cursor: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

impl Rng for FixedRng {
    fn pick(&self, len: usize) -> usize {
        let i = self
            .cursor
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.sequence.get(i % self.sequence.len().max(1)).copied().unwrap_or(0) % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_rng_replays_same_sequence() {
        let rng = FixedRng::new(vec![1, 0, 2]);
        assert_eq!(rng.pick(3), 1);
        assert_eq!(rng.pick(3), 0);
        assert_eq!(rng.pick(3), 2);
        assert_eq!(rng.pick(3), 1);
    }
}
