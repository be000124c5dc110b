//! Input reader task.
//!
//! Reads lines off the socket once registration is done. Every line
//! refreshes the liveness timestamp; server `PING`s are answered on the
//! spot and everything else is forwarded untouched to the line processor.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::{answer_ping, Outbound};
use crate::line::LineCodec;
use crate::state::Liveness;

pub(crate) async fn read_loop<R>(
    mut reader: FramedRead<R, LineCodec>,
    outbound: Arc<Outbound>,
    liveness: Arc<Liveness>,
    lines: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
) where
    R: AsyncRead + Unpin,
{
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("input reader cancelled");
                break;
            }
            next = reader.next() => match next {
                Some(Ok(line)) => {
                    liveness.touch();
                    trace!(%line, "recv");
                    if let Some(pong) = answer_ping(&line) {
                        outbound.send(pong, true);
                        continue;
                    }
                    if lines.send(line).is_err() {
                        debug!("line processor gone, stopping input");
                        break;
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "read error");
                    break;
                }
                None => {
                    info!("server closed the connection");
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_forwards_lines_and_answers_ping() {
        let (mut server, client) = tokio::io::duplex(4096);
        let (outbound, mut queues) = Outbound::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let task = tokio::spawn(read_loop(
            FramedRead::new(client, LineCodec::new()),
            Arc::new(outbound),
            Arc::new(Liveness::new()),
            tx,
            cancel.clone(),
        ));

        server
            .write_all(b"PING :irc.example.net\r\n:a!b@c PRIVMSG #c :hi\r\n")
            .await
            .unwrap();

        assert_eq!(rx.recv().await.as_deref(), Some(":a!b@c PRIVMSG #c :hi"));
        assert_eq!(
            queues.priority.recv().await.as_deref(),
            Some("PONG :irc.example.net")
        );

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_stops_on_eof() {
        let (server, client) = tokio::io::duplex(64);
        let (outbound, _queues) = Outbound::new();
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        drop(server);

        read_loop(
            FramedRead::new(client, LineCodec::new()),
            Arc::new(outbound),
            Arc::new(Liveness::new()),
            tx,
            CancellationToken::new(),
        )
        .await;
        assert!(rx.recv().await.is_none());
    }
}
