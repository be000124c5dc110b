//! Two-tier output writer.
//!
//! Lines are queued on one of two unbounded channels. The writer task
//! always drains the priority tier first; the normal tier stays closed
//! until [`Outbound::open_normal`] is called at the end of registration.

use std::time::Duration;

use futures_util::SinkExt;
use parking_lot::Mutex;
use tokio::io::AsyncWrite;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::codec::FramedWrite;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::ProtocolError;
use crate::line::LineCodec;

/// Sending side of one connection's output.
#[derive(Debug)]
pub(crate) struct Outbound {
    priority: mpsc::UnboundedSender<String>,
    normal: mpsc::UnboundedSender<String>,
    ready: watch::Sender<bool>,
    closing: CancellationToken,
    writer: Mutex<Option<JoinHandle<()>>>,
}

/// Receiving side, consumed by the writer task.
#[derive(Debug)]
pub(crate) struct Queues {
    pub(crate) priority: mpsc::UnboundedReceiver<String>,
    pub(crate) normal: mpsc::UnboundedReceiver<String>,
    pub(crate) ready: watch::Receiver<bool>,
    closing: CancellationToken,
}

impl Outbound {
    /// Create an empty output pair with the normal tier closed.
    pub(crate) fn new() -> (Self, Queues) {
        let (priority_tx, priority_rx) = mpsc::unbounded_channel();
        let (normal_tx, normal_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = watch::channel(false);
        let closing = CancellationToken::new();

        let outbound = Self {
            priority: priority_tx,
            normal: normal_tx,
            ready: ready_tx,
            closing: closing.clone(),
            writer: Mutex::new(None),
        };
        let queues = Queues {
            priority: priority_rx,
            normal: normal_rx,
            ready: ready_rx,
            closing,
        };
        (outbound, queues)
    }

    /// Start the writer task on `writer`.
    pub(crate) fn spawn_writer<W>(&self, queues: Queues, writer: W)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let sink = FramedWrite::new(writer, LineCodec::new());
        let handle = tokio::spawn(write_loop(queues, sink));
        *self.writer.lock() = Some(handle);
    }

    /// Queue a line. Returns false if the writer is gone.
    pub(crate) fn send(&self, line: String, priority: bool) -> bool {
        let queue = if priority { &self.priority } else { &self.normal };
        queue.send(line).is_ok()
    }

    /// Let the writer drain the normal tier.
    pub(crate) fn open_normal(&self) {
        self.ready.send_replace(true);
    }

    /// Queue `QUIT :<reason>`, flush the priority tier and close the socket.
    ///
    /// The writer gets at most `flush` to finish; after that it is aborted.
    pub(crate) async fn close(&self, reason: &str, flush: Duration) {
        self.send(format!("QUIT :{}", reason), true);
        self.closing.cancel();

        let handle = self.writer.lock().take();
        if let Some(mut handle) = handle {
            if tokio::time::timeout(flush, &mut handle).await.is_err() {
                warn!("output did not flush in time, aborting writer");
                handle.abort();
            }
        }
    }
}

async fn write_loop<W>(mut queues: Queues, mut sink: FramedWrite<W, LineCodec>)
where
    W: AsyncWrite + Unpin,
{
    loop {
        let normal_open = *queues.ready.borrow();

        tokio::select! {
            biased;

            line = queues.priority.recv() => match line {
                Some(line) => {
                    if !write_line(&mut sink, line).await {
                        return;
                    }
                }
                None => break,
            },

            _ = queues.closing.cancelled() => {
                while let Ok(line) = queues.priority.try_recv() {
                    if !write_line(&mut sink, line).await {
                        return;
                    }
                }
                break;
            }

            Some(line) = queues.normal.recv(), if normal_open => {
                if !write_line(&mut sink, line).await {
                    return;
                }
            }

            changed = queues.ready.changed(), if !normal_open => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    if let Err(e) = sink.close().await {
        debug!(error = %e, "error closing output");
    }
}

/// Write one line. Returns false when the connection is unusable.
async fn write_line<W>(sink: &mut FramedWrite<W, LineCodec>, line: String) -> bool
where
    W: AsyncWrite + Unpin,
{
    trace!(%line, "send");
    match sink.send(line).await {
        Ok(()) => true,
        Err(ProtocolError::Io(e)) => {
            warn!(error = %e, "write failed, stopping output");
            false
        }
        Err(e) => {
            warn!(error = %e, "dropping outgoing line");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};

    async fn read_lines<R>(reader: R, count: usize) -> Vec<String>
    where
        R: tokio::io::AsyncRead + Unpin,
    {
        let mut lines = BufReader::new(reader).lines();
        let mut out = Vec::new();
        while out.len() < count {
            match lines.next_line().await.unwrap() {
                Some(line) => out.push(line),
                None => break,
            }
        }
        out
    }

    #[tokio::test]
    async fn test_priority_before_normal() {
        let (client, server) = tokio::io::duplex(4096);
        let (outbound, queues) = Outbound::new();

        outbound.send("PRIVMSG #c :one".into(), false);
        outbound.send("NICK kitten".into(), true);
        outbound.send("PRIVMSG #c :two".into(), false);
        outbound.send("USER k 8 * :k".into(), true);
        outbound.spawn_writer(queues, client);

        let first = read_lines(server, 2).await;
        assert_eq!(first, vec!["NICK kitten", "USER k 8 * :k"]);
    }

    #[tokio::test]
    async fn test_normal_tier_held_until_open() {
        let (client, server) = tokio::io::duplex(4096);
        let (outbound, queues) = Outbound::new();

        outbound.send("PRIVMSG #c :held".into(), false);
        outbound.send("NICK kitten".into(), true);
        outbound.spawn_writer(queues, client);

        let mut server = BufReader::new(server).lines();
        assert_eq!(server.next_line().await.unwrap().as_deref(), Some("NICK kitten"));

        outbound.send("JOIN :#c".into(), true);
        assert_eq!(server.next_line().await.unwrap().as_deref(), Some("JOIN :#c"));

        outbound.open_normal();
        assert_eq!(
            server.next_line().await.unwrap().as_deref(),
            Some("PRIVMSG #c :held")
        );
    }

    #[tokio::test]
    async fn test_close_sends_quit_and_eof() {
        let (client, server) = tokio::io::duplex(4096);
        let (outbound, queues) = Outbound::new();
        outbound.spawn_writer(queues, client);
        outbound.send("NICK kitten".into(), true);

        outbound.close("bye", Duration::from_secs(5)).await;

        let lines = read_lines(server, 10).await;
        assert_eq!(lines, vec!["NICK kitten", "QUIT :bye"]);
        assert!(!outbound.send("PRIVMSG #c :late".into(), true));
    }

    #[tokio::test]
    async fn test_illegal_line_dropped() {
        let (client, server) = tokio::io::duplex(4096);
        let (outbound, queues) = Outbound::new();
        outbound.spawn_writer(queues, client);
        outbound.send("PRIVMSG #c :a\0b".into(), true);
        outbound.send("PRIVMSG #c :ok".into(), true);

        let lines = read_lines(server, 1).await;
        assert_eq!(lines, vec!["PRIVMSG #c :ok"]);
    }
}
