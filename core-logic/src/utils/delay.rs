use rand::Rng;
use std::time::Duration;

const JITTER_MIN: f64 = 0.8;
const JITTER_MAX: f64 = 1.2;

/// Delay to actually wait: `base_ms` as is, or scaled by a uniform factor in
/// [0.8, 1.2] and floored.
pub fn jittered_delay(base_ms: u64, use_jitter: bool) -> Duration {
    if !use_jitter || base_ms == 0 {
        return Duration::from_millis(base_ms);
    }
    let factor = rand::thread_rng().gen_range(JITTER_MIN..=JITTER_MAX);
    Duration::from_millis((base_ms as f64 * factor).floor() as u64)
}

/// Suspends the calling task for roughly `base_ms`. Never fails.
pub async fn pause(base_ms: u64, use_jitter: bool) {
    let delay = jittered_delay(base_ms, use_jitter);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Sleeps for `total`, calling `on_tick` with the remaining time before each
/// slice of at most `tick`.
pub async fn countdown<F>(total: Duration, tick: Duration, mut on_tick: F)
where
    F: FnMut(Duration),
{
    if tick.is_zero() {
        tokio::time::sleep(total).await;
        return;
    }

    let deadline = tokio::time::Instant::now() + total;
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            break;
        }
        on_tick(remaining);
        tokio::time::sleep(remaining.min(tick)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_stays_in_band() {
        let base = 10_000u64;
        let samples: Vec<u64> = (0..1000)
            .map(|_| jittered_delay(base, true).as_millis() as u64)
            .collect();

        assert!(samples.iter().all(|&ms| (8_000..=12_000).contains(&ms)));

        let mean = samples.iter().sum::<u64>() as f64 / samples.len() as f64;
        assert!((mean - base as f64).abs() <= base as f64 * 0.02, "mean {}", mean);
    }

    #[test]
    fn test_no_jitter_is_exact() {
        assert_eq!(jittered_delay(1234, false), Duration::from_millis(1234));
        assert_eq!(jittered_delay(0, true), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_countdown_ticks_until_done() {
        let mut ticks = Vec::new();
        countdown(Duration::from_millis(50), Duration::from_millis(20), |r| {
            ticks.push(r)
        })
        .await;

        assert!(!ticks.is_empty());
        assert!(ticks[0] <= Duration::from_millis(50));
        assert!(ticks.windows(2).all(|w| w[0] > w[1]));
    }

    #[tokio::test]
    async fn test_pause_waits_at_least_base() {
        let start = tokio::time::Instant::now();
        pause(20, false).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
