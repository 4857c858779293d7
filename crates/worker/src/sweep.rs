//! Periodic scheduled-close sweep.
//!
//! Closes every published survey whose scheduled close has passed. Runs on
//! a fixed interval using `tokio::time::interval` until cancelled.

use std::time::Duration;

use surveys_core::lifecycle::SurveyLifecycle;
use surveys_core::store::SurveyStore;
use tokio_util::sync::CancellationToken;

/// Run the sweep loop until `cancel` is triggered.
///
/// The first sweep runs immediately. Failures are logged and retried on the
/// next tick.
pub async fn run<S: SurveyStore>(
    lifecycle: SurveyLifecycle<S>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = interval.as_secs(), "Scheduled-close sweep started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Scheduled-close sweep stopping");
                break;
            }
            _ = ticker.tick() => {
                match lifecycle.close_expired().await {
                    Ok(0) => tracing::debug!("Scheduled-close sweep: nothing to close"),
                    Ok(closed) => tracing::info!(closed, "Scheduled-close sweep: closed surveys"),
                    Err(e) => tracing::error!(error = %e, "Scheduled-close sweep failed"),
                }
            }
        }
    }
}
