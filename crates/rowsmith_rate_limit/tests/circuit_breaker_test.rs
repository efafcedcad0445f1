//! Tests for the circuit breaker state machine.

use rowsmith_error::{BatchError, BatchErrorKind};
use rowsmith_rate_limit::{CircuitBreaker, CircuitState};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

const COOLDOWN: Duration = Duration::from_millis(60_000);

fn breaker() -> CircuitBreaker {
    CircuitBreaker::new(5, COOLDOWN, 2)
}

async fn fail(breaker: &CircuitBreaker) -> Result<(), BatchError> {
    breaker
        .execute(|| async {
            Err(BatchError::new(BatchErrorKind::TransientService(
                "HTTP 503".to_string(),
            )))
        })
        .await
}

async fn succeed(breaker: &CircuitBreaker) -> Result<(), BatchError> {
    breaker.execute(|| async { Ok(()) }).await
}

async fn open(breaker: &CircuitBreaker) {
    for _ in 0..5 {
        let _ = fail(breaker).await;
    }
    assert_eq!(breaker.state(), CircuitState::Open);
}

#[tokio::test(start_paused = true)]
async fn test_opens_after_threshold_failures() {
    let breaker = breaker();

    for _ in 0..4 {
        assert!(fail(&breaker).await.is_err());
        assert_eq!(breaker.state(), CircuitState::Closed);
    }
    assert!(fail(&breaker).await.is_err());
    assert_eq!(breaker.state(), CircuitState::Open);
    assert_eq!(breaker.snapshot().failure_count, 5);
}

#[tokio::test(start_paused = true)]
async fn test_open_circuit_fails_fast_without_calling() {
    let breaker = breaker();
    open(&breaker).await;

    let calls = AtomicU32::new(0);
    let err = breaker
        .execute(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(matches!(err.kind(), BatchErrorKind::CircuitOpen { retry_in_ms } if *retry_in_ms > 0));
    // Rejected calls do not count as failures
    assert_eq!(breaker.snapshot().failure_count, 5);
}

#[tokio::test(start_paused = true)]
async fn test_success_while_closed_resets_failures() {
    let breaker = breaker();
    for _ in 0..4 {
        let _ = fail(&breaker).await;
    }
    succeed(&breaker).await.unwrap();
    assert_eq!(breaker.snapshot().failure_count, 0);

    for _ in 0..4 {
        let _ = fail(&breaker).await;
    }
    assert_eq!(breaker.state(), CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_leads_to_half_open_then_closed() {
    let breaker = breaker();
    open(&breaker).await;

    tokio::time::advance(COOLDOWN).await;
    assert!(fail_fast(&breaker).await, "still open exactly at cooldown");

    tokio::time::advance(Duration::from_millis(1)).await;
    succeed(&breaker).await.unwrap();
    assert_eq!(breaker.state(), CircuitState::HalfOpen);

    succeed(&breaker).await.unwrap();
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(breaker.snapshot().failure_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_half_open_failure_reopens_and_restarts_cooldown() {
    let breaker = breaker();
    open(&breaker).await;
    let first_opened = breaker.snapshot().last_failure_at;

    tokio::time::advance(COOLDOWN + Duration::from_millis(1)).await;
    succeed(&breaker).await.unwrap();
    assert_eq!(breaker.state(), CircuitState::HalfOpen);

    assert!(fail(&breaker).await.is_err());
    assert_eq!(breaker.state(), CircuitState::Open);
    assert_eq!(breaker.snapshot().success_count, 0);
    assert!(breaker.snapshot().last_failure_at > first_opened);

    tokio::time::advance(Duration::from_millis(1_000)).await;
    assert!(fail_fast(&breaker).await);
}

#[tokio::test(start_paused = true)]
async fn test_half_open_admits_single_probe() {
    let breaker = Arc::new(breaker());
    open(&breaker).await;
    tokio::time::advance(COOLDOWN + Duration::from_millis(1)).await;

    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
    let probe = {
        let breaker = breaker.clone();
        tokio::spawn(async move {
            breaker
                .execute(|| async move {
                    let _ = release_rx.await;
                    Ok(())
                })
                .await
        })
    };
    tokio::task::yield_now().await;
    assert_eq!(breaker.state(), CircuitState::HalfOpen);

    let calls = AtomicU32::new(0);
    let rejected = breaker
        .execute(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;
    assert!(matches!(
        rejected.unwrap_err().kind(),
        BatchErrorKind::CircuitOpen { .. }
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let _ = release_tx.send(());
    probe.await.unwrap().unwrap();
    assert_eq!(breaker.snapshot().success_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_probe_releases_slot() {
    let breaker = breaker();
    open(&breaker).await;
    tokio::time::advance(COOLDOWN + Duration::from_millis(1)).await;

    let stalled = tokio::time::timeout(
        Duration::from_millis(10),
        breaker.execute(|| std::future::pending::<Result<(), BatchError>>()),
    )
    .await;
    assert!(stalled.is_err());

    succeed(&breaker).await.unwrap();
    assert_eq!(breaker.snapshot().success_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_reset_closes_circuit() {
    let breaker = breaker();
    open(&breaker).await;
    breaker.reset();
    assert_eq!(breaker.state(), CircuitState::Closed);
    succeed(&breaker).await.unwrap();
}

#[test]
fn test_state_display() {
    assert_eq!(CircuitState::HalfOpen.to_string(), "half_open");
    assert_eq!(CircuitState::Closed.to_string(), "closed");
}

async fn fail_fast(breaker: &CircuitBreaker) -> bool {
    matches!(
        succeed(breaker).await,
        Err(ref e) if matches!(e.kind(), BatchErrorKind::CircuitOpen { .. })
    )
}
