//! The refresh loop.
//!
//! Re-fetches the watched series on the filter's refresh frequency, and
//! immediately whenever the filter or the watched target changes, which
//! also replaces the pending timer. In-flight queries are not cancelled:
//! a late response simply overwrites the stored view, so out-of-order
//! completion can show stale data for one cycle.

use crate::store::DashboardStore;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::debug;

pub fn spawn(store: Arc<DashboardStore>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(run(store))
}

pub async fn run(store: Arc<DashboardStore>) {
    let mut filter_rx = store.subscribe_filter();
    let mut target_rx = store.subscribe_target();

    loop {
        if store.target().is_some() {
            debug!("refreshing watched series");
            store.fetch_target().await;
        }

        match store.filter().frequency.as_duration() {
            Some(period) => {
                tokio::select! {
                    _ = sleep(period) => {}
                    changed = filter_rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                    changed = target_rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                }
            }
            None => {
                // Manual refresh only: sleep until a parameter changes.
                tokio::select! {
                    changed = filter_rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                    changed = target_rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                }
            }
        }
    }
}
