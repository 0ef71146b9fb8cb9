//! Rotation strategies
//!
//! Selects one credential per request. The server keeps no cursor: in
//! round-robin mode the caller supplies the index and advances it itself.

use rand::Rng;

use super::credential::Credential;
use super::pool::KeyPool;

// ============================================================================
// Rotation Mode
// ============================================================================

/// Query value that selects random rotation; anything else is round-robin
pub const RANDOM_MODE: &str = "random";

/// Default query value for the `mode` parameter
pub const DEFAULT_MODE: &str = "round";

/// Rotation policy for a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationMode {
    /// Use `index mod pool.len()`
    RoundRobin { index: u64 },
    /// Uniformly random pick, independent per request
    Random,
}

impl RotationMode {
    /// Build the mode from raw `mode` and `index` query values
    ///
    /// Empty values are treated as absent.
    pub fn from_query(mode: Option<&str>, index: Option<&str>) -> Self {
        match mode.filter(|m| !m.is_empty()) {
            Some(RANDOM_MODE) => Self::Random,
            _ => Self::RoundRobin {
                index: parse_index(index.filter(|i| !i.is_empty()).unwrap_or("0")),
            },
        }
    }
}

impl Default for RotationMode {
    fn default() -> Self {
        Self::RoundRobin { index: 0 }
    }
}

impl std::fmt::Display for RotationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RoundRobin { .. } => write!(f, "{}", DEFAULT_MODE),
            Self::Random => write!(f, "{}", RANDOM_MODE),
        }
    }
}

/// Parse a caller-supplied index with leading-integer semantics
///
/// Leading whitespace and an optional sign are accepted, then the leading
/// run of ASCII digits. No digits or a negative value yield 0. Values past
/// `u64::MAX` saturate.
pub fn parse_index(raw: &str) -> u64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: u64 = 0;
    let mut seen_digit = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen_digit = true;
        value = value
            .saturating_mul(10)
            .saturating_add(u64::from(b - b'0'));
    }

    if !seen_digit || negative {
        return 0;
    }
    value
}

// ============================================================================
// Random Source
// ============================================================================

/// Source of uniformly distributed indices for random rotation
pub trait RandomSource: Send + Sync {
    /// Return an index in `[0, upper)`; `upper` is never zero
    fn index_below(&self, upper: usize) -> usize;
}

/// Thread-local RNG backed source used in production
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index_below(&self, upper: usize) -> usize {
        rand::thread_rng().gen_range(0..upper)
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Position in the pool the mode resolves to
pub fn effective_index(pool: &KeyPool, mode: RotationMode, rng: &dyn RandomSource) -> usize {
    let len = pool.len();
    match mode {
        RotationMode::Random => rng.index_below(len) % len,
        // usize -> u64 is lossless on every supported target
        RotationMode::RoundRobin { index } => (index % len as u64) as usize,
    }
}

/// Pick the credential for this request
pub fn select<'a>(pool: &'a KeyPool, mode: RotationMode, rng: &dyn RandomSource) -> &'a Credential {
    // KeyPool is never empty and the position is always < len
    &pool[effective_index(pool, mode, rng)]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic stub returning a fixed index
    struct FixedRandom(usize);

    impl RandomSource for FixedRandom {
        fn index_below(&self, _upper: usize) -> usize {
            self.0
        }
    }

    fn pool(raw: &str) -> KeyPool {
        KeyPool::parse(Some(raw)).unwrap()
    }

    #[test]
    fn test_mode_from_query() {
        assert_eq!(RotationMode::from_query(None, None), RotationMode::RoundRobin { index: 0 });
        assert_eq!(RotationMode::from_query(Some("random"), Some("4")), RotationMode::Random);
        assert_eq!(
            RotationMode::from_query(Some("round"), Some("7")),
            RotationMode::RoundRobin { index: 7 }
        );
        assert_eq!(
            RotationMode::from_query(Some(""), Some("")),
            RotationMode::RoundRobin { index: 0 }
        );
        // Unknown modes fall back to round-robin
        assert_eq!(
            RotationMode::from_query(Some("RANDOM"), Some("2")),
            RotationMode::RoundRobin { index: 2 }
        );
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0"), 0);
        assert_eq!(parse_index("42"), 42);
        assert_eq!(parse_index("  12"), 12);
        assert_eq!(parse_index("+3"), 3);
        assert_eq!(parse_index("12abc"), 12);
        assert_eq!(parse_index("abc"), 0);
        assert_eq!(parse_index(""), 0);
        assert_eq!(parse_index("-5"), 0);
        assert_eq!(parse_index("-"), 0);
        assert_eq!(parse_index("99999999999999999999999"), u64::MAX);
    }

    #[test]
    fn test_round_robin_selects_requested_index() {
        let pool = pool("abc,def,ghi");
        let rng = FixedRandom(0);
        let cred = select(&pool, RotationMode::RoundRobin { index: 1 }, &rng);
        assert_eq!(cred.expose(), "def");
    }

    #[test]
    fn test_round_robin_wraps_modulo() {
        let pool = pool("abc,def,ghi");
        let rng = FixedRandom(0);
        for i in 0..50u64 {
            let a = select(&pool, RotationMode::RoundRobin { index: i }, &rng);
            let b = select(&pool, RotationMode::RoundRobin { index: i + 3 }, &rng);
            assert_eq!(a, b);
        }
        let last = select(&pool, RotationMode::RoundRobin { index: u64::MAX }, &rng);
        assert_eq!(last.expose(), "abc"); // u64::MAX % 3 == 0
    }

    #[test]
    fn test_effective_index_in_range() {
        let pool = pool("a,b,c,d,e,f,g");
        let rng = FixedRandom(0);
        for i in [0u64, 1, 6, 7, 100, 12345, u64::MAX] {
            let idx = effective_index(&pool, RotationMode::RoundRobin { index: i }, &rng);
            assert!(idx < pool.len());
        }
    }

    #[test]
    fn test_random_uses_injected_source() {
        let pool = pool("k0,k1,k2,k3");
        let cred = select(&pool, RotationMode::Random, &FixedRandom(2));
        assert_eq!(cred.expose(), "k2");
    }

    #[test]
    fn test_random_single_key_pool() {
        let pool = pool("solo");
        for _ in 0..100 {
            assert_eq!(select(&pool, RotationMode::Random, &ThreadRandom).expose(), "solo");
        }
    }

    #[test]
    fn test_random_distribution() {
        let pool = pool("k0,k1,k2,k3,k4");
        let mut counts = [0usize; 5];
        for _ in 0..10_000 {
            counts[effective_index(&pool, RotationMode::Random, &ThreadRandom)] += 1;
        }
        // Expected 2000 each; std dev is ~40 so this bound is very loose
        for count in counts {
            assert!((1700..=2300).contains(&count), "skewed distribution: {:?}", counts);
        }
    }
}
