//! Periodic GNSS feed polling.
//!
//! One tick fetches one sample, runs it through the detector and updates
//! shared state. Ticks run sequentially inside this task, so history is
//! never mutated by two ticks at once. Failed ticks are skipped; the next
//! scheduled tick is the only retry.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::{interval, MissedTickBehavior};

use crate::state::MonitorState;
use gnss_core::display;
use gnss_feed::FeedClient;

/// Shortest tick period; `interval` rejects a zero period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Start the GNSS polling loop.
///
/// `period` is clamped to at least one millisecond.
pub async fn run_gnss_poll_loop(
    state: Arc<MonitorState>,
    mut client: FeedClient,
    period: Duration,
    console: bool,
    mut shutdown: broadcast::Receiver<()>,
) {
    let period = period.max(MIN_PERIOD);
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        "GNSS poll loop started: {} endpoint(s) every {:?} ({} selection)",
        client.endpoints().len(),
        period,
        client.selection()
    );

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("GNSS poll loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                let fetched = client.fetch_next().await;

                if !still_running(&mut shutdown) {
                    tracing::debug!("Discarding in-flight GNSS fetch after shutdown");
                    break;
                }

                let fetched = match fetched {
                    Ok(fetched) => fetched,
                    Err(e) => {
                        tracing::warn!("GNSS fetch failed: {}", e);
                        state.record_transport_failure(&e);
                        continue;
                    }
                };

                match state.ingest(&fetched.endpoint, &fetched.raw) {
                    Ok(reading) => {
                        if reading.is_anomalous() {
                            tracing::warn!(
                                "Spoofing suspected at ({:.5}, {:.5}): {}",
                                reading.sample.latitude,
                                reading.sample.longitude,
                                reading.anomaly_flags.join("; ")
                            );
                        }
                        if console {
                            tracing::info!("{}", display::render_line(&reading));
                        } else {
                            tracing::debug!("Ingested GNSS sample from {}", fetched.endpoint);
                        }
                    }
                    Err(rejection) => {
                        tracing::debug!(
                            "Skipping GNSS sample from {}: {}",
                            fetched.endpoint,
                            rejection
                        );
                    }
                }
            }
        }
    }
}

/// Liveness check for results that complete after shutdown was requested.
fn still_running(shutdown: &mut broadcast::Receiver<()>) -> bool {
    matches!(shutdown.try_recv(), Err(TryRecvError::Empty))
}
