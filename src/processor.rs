//! Line processor task.
//!
//! The single consumer of raw lines read after registration. Each line is
//! decoded and dispatched inside an isolation boundary: a handler error or
//! panic is logged and the line is dropped, and the processor carries on.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::client::Core;

/// Dispatch one line, containing any failure.
pub(crate) fn process_line(core: &Core, line: &str) {
    match catch_unwind(AssertUnwindSafe(|| core.dispatcher.dispatch(core, line))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(error = %e, %line, "dropping line"),
        Err(_) => error!(%line, "line handler panicked"),
    }
}

/// Consume lines until the session is cancelled or every sender is gone.
pub(crate) async fn run(
    core: Arc<Core>,
    mut lines: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            line = lines.recv() => match line {
                Some(line) => process_line(&core, &line),
                None => break,
            },
        }
    }
    debug!("line processor stopped");
}
