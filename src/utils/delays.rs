//! Anti-blocking delay between page fetches.

use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// Pick a uniformly random delay inside the configured window.
///
/// Split out from the sleep so the bounds are testable without waiting.
#[must_use]
pub fn pick_delay(min_secs: f64, max_secs: f64) -> Duration {
    let (lo, hi) = if min_secs <= max_secs {
        (min_secs, max_secs)
    } else {
        (max_secs, min_secs)
    };
    let secs = if (hi - lo).abs() < f64::EPSILON {
        lo
    } else {
        rand::rng().random_range(lo..=hi)
    };
    Duration::from_millis((secs.max(0.0) * 1000.0) as u64)
}

/// Sleep for a random duration inside `[min_secs, max_secs]`.
///
/// Applied once per page fetch to mimic human browsing cadence; retries do
/// not re-apply it.
pub async fn random_delay(min_secs: f64, max_secs: f64) {
    let delay = pick_delay(min_secs, max_secs);
    debug!(delay_ms = delay.as_millis() as u64, "applying anti-blocking delay");
    tokio::time::sleep(delay).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_stays_inside_window() {
        for _ in 0..100 {
            let d = pick_delay(1.0, 2.0);
            assert!(d >= Duration::from_millis(1000));
            assert!(d <= Duration::from_millis(2000));
        }
    }

    #[test]
    fn degenerate_window_is_exact() {
        assert_eq!(pick_delay(1.5, 1.5), Duration::from_millis(1500));
    }

    #[test]
    fn inverted_window_is_tolerated() {
        let d = pick_delay(3.0, 1.0);
        assert!(d >= Duration::from_millis(1000));
        assert!(d <= Duration::from_millis(3000));
    }
}
