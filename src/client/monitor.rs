//! Liveness monitor.
//!
//! Owns every reconnect decision. When no input has arrived for
//! `stale_after`, the connection is dropped and a new one is opened after
//! `reconnect_delay`. A failed attempt is retried on the next check.
//! Cancellation of the session ends the loop and sends the shutdown QUIT.

use std::sync::Arc;

use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tracing::{info, warn};

use super::{Core, PING_TIMEOUT_REASON};
use crate::event::Event;
use crate::state::{ConnectionState, LivenessCheck};

pub(crate) async fn run(core: Arc<Core>) {
    let timeouts = core.config.timeouts().clone();
    let mut ticker = interval(timeouts.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut check = LivenessCheck::new(
        timeouts.check_interval,
        timeouts.stale_after,
        Instant::now(),
    );
    let mut retrying = false;

    loop {
        tokio::select! {
            _ = core.cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        if !check.poll(Instant::now(), core.liveness.last_input()) {
            continue;
        }

        if retrying {
            info!("retrying connection");
        } else {
            warn!(idle = ?core.liveness.idle(), "ping timeout");
            core.state.set_connection_state(ConnectionState::Reconnecting);
            core.events.call_event(&Event::Disconnected {
                reason: PING_TIMEOUT_REASON.to_owned(),
            });
        }
        core.disconnect(PING_TIMEOUT_REASON).await;

        tokio::select! {
            _ = core.cancel.cancelled() => break,
            _ = sleep(timeouts.reconnect_delay) => {}
        }

        match core.connect().await {
            Ok(()) => retrying = false,
            Err(e) => {
                warn!(error = %e, "reconnect failed");
                core.state.set_connection_state(ConnectionState::Reconnecting);
                retrying = true;
            }
        }
    }

    core.state.set_connection_state(ConnectionState::Shutdown);
    core.disconnect(&core.state.shutdown_reason()).await;
    info!("session stopped");
}
