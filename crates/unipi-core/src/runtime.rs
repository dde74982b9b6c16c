// ── Trigger loop ──
//
// Drives a `Bridge` the way a hub would: one start trigger, then heartbeats
// on a fixed interval interleaved with inbound events, until cancelled.
// Every hook runs to completion before the next branch is polled, so
// triggers never overlap.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::bridge::Bridge;
use crate::command::HubEvent;
use crate::hub::DeviceRepository;

/// Owns a bridge for the lifetime of a run.
pub struct Runtime<R> {
    bridge: Bridge<R>,
}

impl<R: DeviceRepository> Runtime<R> {
    pub fn new(bridge: Bridge<R>) -> Self {
        Self { bridge }
    }

    pub fn bridge(&self) -> &Bridge<R> {
        &self.bridge
    }

    /// Run until `cancel` fires, then hand the bridge back.
    ///
    /// A closed event channel does not stop the loop; heartbeats continue.
    pub async fn run(
        self,
        mut events: mpsc::Receiver<HubEvent>,
        cancel: CancellationToken,
    ) -> Bridge<R> {
        let bridge = self.bridge;

        if let Some(report) = bridge.on_start().await {
            info!(units = report.units_consumed, created = report.created.len(), "startup pass");
        }

        let mut heartbeat = tokio::time::interval(bridge.config().heartbeat);
        heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        heartbeat.tick().await; // consume the immediate first tick

        let mut events_open = true;
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                event = events.recv(), if events_open => {
                    match event {
                        Some(event) => bridge.dispatch(event).await,
                        None => {
                            debug!("event channel closed, continuing with heartbeats only");
                            events_open = false;
                        }
                    }
                }
                _ = heartbeat.tick() => {
                    bridge.on_heartbeat().await;
                }
            }
        }

        bridge.on_stop();
        bridge
    }
}
