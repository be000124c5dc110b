//! Socket setup and the per-connection I/O tasks.
//!
//! A connection is one TCP stream split in two halves. The write half is
//! owned by the output writer ([`output`]), the read half by the lifecycle
//! manager during registration and by the input reader ([`input`]) after.

pub(crate) mod input;
pub(crate) mod output;

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};
use tokio::net::{lookup_host, TcpSocket, TcpStream};
use tracing::{debug, warn};

pub(crate) use self::output::Outbound;

/// Resolve `server` and connect to the first address that accepts.
///
/// A local bind failure is logged and ignored; the connect goes ahead from
/// an ephemeral address.
pub(crate) async fn open(server: &str, bind: Option<SocketAddr>) -> io::Result<TcpStream> {
    let mut last_err = None;

    for addr in lookup_host(server).await? {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };

        if let Some(bind) = bind {
            if let Err(e) = socket.bind(bind) {
                warn!(%bind, error = %e, "failed to bind local address");
            }
        }

        match socket.connect(addr).await {
            Ok(stream) => {
                if let Err(e) = enable_keepalive(&stream) {
                    warn!("failed to enable TCP keepalive: {}", e);
                }
                return Ok(stream);
            }
            Err(e) => {
                debug!(%addr, error = %e, "connect attempt failed");
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "server address did not resolve")
    }))
}

fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));

    sock.set_tcp_keepalive(&keepalive)
}

/// The `PONG` answer for a server `PING` line, if `line` is one.
pub(crate) fn answer_ping(line: &str) -> Option<String> {
    line.strip_prefix("PING ").map(|rest| format!("PONG {}", rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_ping() {
        assert_eq!(answer_ping("PING :irc.example.net").as_deref(), Some("PONG :irc.example.net"));
        assert_eq!(answer_ping("PING 12345").as_deref(), Some("PONG 12345"));
        assert_eq!(answer_ping(":s PING :x"), None);
        assert_eq!(answer_ping("PINGX"), None);
    }

    #[tokio::test]
    async fn test_open_connects() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accept = tokio::spawn(async move { listener.accept().await.map(|(_, peer)| peer) });

        let stream = open(&addr.to_string(), Some("127.0.0.1:0".parse().unwrap()))
            .await
            .unwrap();
        let peer = accept.await.unwrap().unwrap();
        assert_eq!(stream.local_addr().unwrap(), peer);
    }

    #[tokio::test]
    async fn test_open_ignores_bind_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accept = tokio::spawn(async move { listener.accept().await.map(|(_, peer)| peer) });

        // TEST-NET-3, never assigned to a local interface.
        let stream = open(&addr.to_string(), Some("203.0.113.7:0".parse().unwrap()))
            .await
            .unwrap();
        let peer = accept.await.unwrap().unwrap();
        assert_eq!(stream.local_addr().unwrap(), peer);
        assert_ne!(peer.ip().to_string(), "203.0.113.7");
    }

    #[tokio::test]
    async fn test_open_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        assert!(open(&addr.to_string(), None).await.is_err());
    }
}
