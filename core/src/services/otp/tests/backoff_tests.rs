use std::time::Duration;

use civic_shared::OtpConfig;

use crate::services::otp::backoff::ExponentialBackoff;

#[test]
fn test_delay_values() {
    let backoff = ExponentialBackoff::default();
    assert_eq!(backoff.delay(0), Duration::from_millis(1000));
    assert_eq!(backoff.delay(1), Duration::from_millis(2000));
    assert_eq!(backoff.delay(2), Duration::from_millis(4000));
    assert_eq!(backoff.delay(4), Duration::from_millis(16_000));
    assert_eq!(backoff.delay(5), Duration::from_millis(30_000));
}

#[test]
fn test_delay_is_monotonic_and_capped() {
    let backoff = ExponentialBackoff::default();
    let mut previous = Duration::ZERO;
    for attempt in 0..200 {
        let delay = backoff.delay(attempt);
        assert!(delay >= previous, "delay decreased at attempt {}", attempt);
        assert!(delay <= Duration::from_millis(30_000));
        previous = delay;
    }
    assert_eq!(backoff.delay(u32::MAX), Duration::from_millis(30_000));
}


#[test]
fn test_from_config() {
    let config = OtpConfig {
        backoff_base_ms: 500,
        backoff_max_ms: 3000,
        ..OtpConfig::default()
    };
    let backoff = ExponentialBackoff::from_config(&config);
    assert_eq!(backoff.delay(0), Duration::from_millis(500));
    assert_eq!(backoff.delay(2), Duration::from_millis(2000));
    assert_eq!(backoff.delay(3), Duration::from_millis(3000));
}

#[tokio::test(start_paused = true)]
async fn test_wait_sleeps_for_delay() {
    let backoff = ExponentialBackoff::default();
    let start = tokio::time::Instant::now();
    backoff.wait(2).await;
    assert!(start.elapsed() >= Duration::from_millis(4000));
}
