//! Tests for the fixed-window rate limiter.

use rowsmith_core::BatchConfig;
use rowsmith_error::BatchErrorKind;
use rowsmith_rate_limit::RateLimiter;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_grants_up_to_max_then_denies() {
    let limiter = RateLimiter::from_config(&BatchConfig::default());

    for i in 0..60 {
        assert!(limiter.try_acquire(), "permit {} should be granted", i + 1);
    }
    assert!(!limiter.try_acquire(), "61st permit should be denied");
    assert_eq!(limiter.remaining(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_acquire_reports_rate_limit_exceeded() {
    let limiter = RateLimiter::new(1, Duration::from_secs(60));
    limiter.acquire().unwrap();

    let err = limiter.acquire().unwrap_err();
    assert_eq!(
        err.kind(),
        &BatchErrorKind::RateLimitExceeded {
            max: 1,
            window_ms: 60_000
        }
    );
    assert!(!err.kind().is_retryable());
}

#[tokio::test(start_paused = true)]
async fn test_window_resets_after_elapsed() {
    let limiter = RateLimiter::new(2, Duration::from_millis(1_000));
    assert!(limiter.try_acquire());
    assert!(limiter.try_acquire());
    assert!(!limiter.try_acquire());

    // Exactly one window later is still the same window
    tokio::time::advance(Duration::from_millis(1_000)).await;
    assert!(!limiter.try_acquire());

    tokio::time::advance(Duration::from_millis(1)).await;
    assert_eq!(limiter.remaining(), 2);
    assert!(limiter.try_acquire());
    assert_eq!(limiter.remaining(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reset_restores_full_window() {
    let limiter = RateLimiter::new(3, Duration::from_secs(60));
    assert!(limiter.try_acquire());
    assert!(limiter.try_acquire());
    assert_eq!(limiter.remaining(), 1);

    limiter.reset();
    assert_eq!(limiter.remaining(), 3);
    assert_eq!(limiter.max_per_window(), 3);
    assert_eq!(limiter.window(), Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_zero_max_denies_everything() {
    let limiter = RateLimiter::new(0, Duration::from_secs(1));
    assert!(!limiter.try_acquire());
    assert!(limiter.acquire().is_err());
}
