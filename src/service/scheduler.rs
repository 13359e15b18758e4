//! Periodic background ingestion.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::StationService;

/// Runs `job` every `period`, first one period after the call.
///
/// Ticks missed while a run is still in progress are skipped, not
/// replayed. Returns `None` without spawning when `period` is zero.
pub fn spawn_periodic<F, Fut>(
    name: &'static str,
    period: Duration,
    mut job: F,
) -> Option<JoinHandle<()>>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    if period.is_zero() {
        tracing::info!(task = name, "periodic task disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(task = name, period_secs = period.as_secs(), "periodic task scheduled");
        loop {
            ticker.tick().await;
            tracing::debug!(task = name, "periodic task tick");
            job().await;
        }
    }))
}

/// Schedules [`StationService::ingest`] every `period`.
///
/// Failures are logged and retried on the next tick only.
pub fn spawn_ingest_schedule(
    service: Arc<StationService>,
    period: Duration,
) -> Option<JoinHandle<()>> {
    spawn_periodic("ingest", period, move || {
        let service = Arc::clone(&service);
        async move {
            if let Err(e) = service.ingest().await {
                tracing::error!(error = %e, code = e.error_code(), "scheduled ingestion failed");
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_job(
        counter: &Arc<AtomicUsize>,
    ) -> impl FnMut() -> std::future::Ready<()> + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test]
    async fn zero_period_disables() {
        let counter = Arc::new(AtomicUsize::new(0));
        assert!(spawn_periodic("test", Duration::ZERO, counting_job(&counter)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn first_run_waits_one_period() {
        let counter = Arc::new(AtomicUsize::new(0));
        let Some(handle) = spawn_periodic("test", Duration::from_secs(60), counting_job(&counter))
        else {
            panic!("task should be spawned");
        };

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn slow_runs_skip_missed_ticks() {
        let counter = Arc::new(AtomicUsize::new(0));
        let runs = Arc::clone(&counter);
        let Some(handle) = spawn_periodic("test", Duration::from_secs(10), move || {
            let runs = Arc::clone(&runs);
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(35)).await;
            }
        }) else {
            panic!("task should be spawned");
        };

        // Runs start at 10s and 50s; ticks at 20s, 30s and 40s are skipped.
        tokio::time::sleep(Duration::from_secs(55)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        handle.abort();
    }
}
