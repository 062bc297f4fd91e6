//! Background recurrence worker.
//!
//! Runs the materializer for every user on a fixed interval until the shutdown
//! future completes. A failed run is logged and retried on the next tick.

use crate::{
    api::AppState,
    core::recurrence::{self, MaterializeReport},
};
use std::future::Future;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{error, info};

/// Materializes all due definitions once.
pub async fn run_once(state: &AppState) -> Option<MaterializeReport> {
    match recurrence::materialize_due(
        &state.db,
        state.clock.as_ref(),
        &state.config.recurrence,
        None,
    )
    .await
    {
        Ok(report) => Some(report),
        Err(e) => {
            error!("Recurrence run failed: {}", e);
            None
        }
    }
}

/// Ticks until `shutdown` resolves. The first tick fires immediately.
pub async fn run_recurrence_worker<F>(state: AppState, shutdown: F)
where
    F: Future<Output = ()>,
{
    let mut interval = tokio::time::interval(state.config.recurrence.interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!(
        "Recurrence worker started, checking every {}s",
        state.config.recurrence.interval_secs
    );
    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => break,
            _ = interval.tick() => {
                run_once(&state).await;
            }
        }
    }
    info!("Recurrence worker stopped");
}

/// Spawns [`run_recurrence_worker`] onto the runtime.
pub fn spawn_recurrence_worker<F>(state: AppState, shutdown: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(run_recurrence_worker(state, shutdown))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::recurring::create_recurring;
    use crate::entities::Transaction;
    use crate::errors::Result;
    use crate::test_utils::*;
    use sea_orm::EntityTrait;
    use std::time::Duration;

    #[tokio::test]
    async fn test_worker_fires_on_first_tick_and_stops() -> Result<()> {
        init_test_tracing();
        let (db, user) = setup_with_user().await?;
        create_recurring(&db, user.id, monthly_rent(utc(2024, 6, 1, 9)), test_now()).await?;

        let state = test_state(db.clone());
        run_recurrence_worker(state, tokio::time::sleep(Duration::from_millis(50))).await;

        assert_eq!(Transaction::find().all(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_run_once_reports() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        create_recurring(&db, user.id, monthly_rent(utc(2024, 5, 1, 9)), test_now()).await?;

        let report = run_once(&test_state(db)).await.unwrap();
        // May 1 and June 1 are both before the test clock
        assert_eq!(report.fired.len(), 2);
        assert!(report.failures.is_empty());
        Ok(())
    }
}
