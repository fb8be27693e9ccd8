use crate::dispatcher::DispatcherHandle;
use crate::format::Publication;
use log::{debug, info};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

/// Publishes a liveness marker every `period` until the dispatcher stops
///
/// Clients filter the marker out and treat a long silence as a dead server.
pub async fn run_heartbeat(dispatcher: DispatcherHandle, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Skip the first tick since it fires immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        debug!("Heartbeat");

        if !dispatcher.publish(Publication::Ping) {
            info!("Dispatcher stopped, heartbeat exiting");
            return;
        }
    }
}
