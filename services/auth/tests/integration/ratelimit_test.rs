use chrono::Duration;

use atelier_auth::domain::repository::RateLimitStore;
use atelier_auth::error::AuthServiceError;
use atelier_auth::infra::memory::MemoryRateLimitStore;
use atelier_auth::ratelimit::RateLimiter;

#[tokio::test]
async fn should_reject_the_call_that_passes_the_threshold() {
    let limiter = RateLimiter::new(MemoryRateLimitStore::default(), Duration::hours(1));

    for _ in 0..3 {
        limiter.check("k", 3).await.unwrap();
    }
    let result = limiter.check("k", 3).await;
    assert!(
        matches!(result, Err(AuthServiceError::RateLimitExceeded)),
        "expected RateLimitExceeded on call 4 of limit 3, got {result:?}"
    );

    // Once breached, the window stays breached.
    let result = limiter.check("k", 3).await;
    assert!(matches!(result, Err(AuthServiceError::RateLimitExceeded)));

    // Other keys are unaffected.
    limiter.check("other", 3).await.unwrap();
}

#[tokio::test]
async fn should_start_a_fresh_window_after_reset_time() {
    let store = MemoryRateLimitStore::default();
    let limiter = RateLimiter::new(store.clone(), Duration::milliseconds(20));

    limiter.check("k", 1).await.unwrap();
    let result = limiter.check("k", 1).await;
    assert!(matches!(result, Err(AuthServiceError::RateLimitExceeded)));

    tokio::time::sleep(std::time::Duration::from_millis(40)).await;

    // The lapsed entry is treated as absent and recreated at count 1.
    limiter.check("k", 1).await.unwrap();
    let entry = store.increment("k", Duration::milliseconds(20)).await.unwrap();
    assert_eq!(entry.count, 2);
}

#[tokio::test]
async fn should_unblock_a_key_on_administrative_reset() {
    let limiter = RateLimiter::new(MemoryRateLimitStore::default(), Duration::hours(1));

    limiter.check("k", 1).await.unwrap();
    assert!(limiter.check("k", 1).await.is_err());

    limiter.reset("k").await.unwrap();
    limiter.check("k", 1).await.unwrap();
}

#[tokio::test]
async fn should_sweep_lapsed_windows_only() {
    let store = MemoryRateLimitStore::default();
    let limiter = RateLimiter::new(store.clone(), Duration::hours(1));

    store.increment("lapsed", Duration::zero()).await.unwrap();
    limiter.check("live", 5).await.unwrap();

    let removed = limiter.sweep_expired().await.unwrap();
    assert_eq!(removed, 1);

    let entry = store.increment("live", Duration::hours(1)).await.unwrap();
    assert_eq!(entry.count, 2, "the live window must survive the sweep");
}
