//! Wall-clock helper for timestamping protocol-level observations
//! (gap detection times, replay summaries). Not used on the per-message
//! hot path; ITCH messages carry their own exchange timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in nanoseconds since the Unix epoch.
pub fn wall_clock_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before Unix epoch")
        .as_nanos() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_clock_advances() {
        let a = wall_clock_ns();
        let b = wall_clock_ns();
        assert!(b >= a);
        // sanity: after 2020-01-01
        assert!(a > 1_577_836_800_000_000_000);
    }
}
