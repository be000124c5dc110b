//! Connection establishment and registration.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;
use tracing::{debug, info, warn, Instrument};

use super::Core;
use crate::config::ConfigKey;
use crate::error::{ClientError, Result};
use crate::event::Event;
use crate::line::LineCodec;
use crate::message::Line;
use crate::processor::process_line;
use crate::response::{is_error_code, Response};
use crate::state::ConnectionState;
use crate::transport::{self, answer_ping, input, Outbound};

impl Core {
    /// Open a new connection, register, and start its input reader.
    ///
    /// On error the half-open connection is torn down without a QUIT.
    pub(crate) async fn connect(self: &Arc<Self>) -> Result<()> {
        let server = self.config.require(ConfigKey::ServerAddress)?.to_owned();
        let span = tracing::info_span!("connection", server = %server);
        self.establish(server).instrument(span).await
    }

    async fn establish(self: &Arc<Self>, server: String) -> Result<()> {
        if !self.state.set_connection_state(ConnectionState::Handshaking) {
            return Err(ClientError::NotConnected);
        }
        self.caps.reset();

        let bind = match self.config.bind_address() {
            Some(Ok(addr)) => Some(addr),
            Some(Err(e)) => {
                warn!(error = %e, "ignoring invalid bind address");
                None
            }
            None => None,
        };

        info!("connecting");
        let stream = transport::open(&server, bind).await?;
        let (read, write) = stream.into_split();

        let (outbound, queues) = Outbound::new();
        outbound.spawn_writer(queues, write);
        let outbound = Arc::new(outbound);
        *self.outbound.write() = Some(Arc::clone(&outbound));

        self.send_registration();

        let mut reader = FramedRead::new(read, LineCodec::new());
        let registration = self.config.timeouts().registration;
        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => Err(ClientError::NotConnected),
            res = tokio::time::timeout(registration, self.handshake(&mut reader)) => {
                res.unwrap_or(Err(ClientError::RegistrationTimeout))
            }
        };
        if let Err(e) = outcome {
            warn!(error = %e, "registration failed");
            self.outbound.write().take();
            return Err(e);
        }

        self.state.set_connection_state(ConnectionState::Registered);
        self.after_registration();
        outbound.open_normal();

        let token = self.cancel.child_token();
        if let Some(previous) = self.connection.lock().replace(token.clone()) {
            previous.cancel();
        }
        tokio::spawn(
            input::read_loop(
                reader,
                outbound,
                Arc::clone(&self.liveness),
                self.lines.clone(),
                token,
            )
            .in_current_span(),
        );

        self.liveness.touch();
        if !self.state.set_connection_state(ConnectionState::Running) {
            return Err(ClientError::NotConnected);
        }
        info!(nick = %self.state.current_nick(), "registered");
        self.events.call_event(&Event::Connected { server });
        Ok(())
    }

    /// `PASS`, `USER` and `NICK`, all at priority.
    fn send_registration(&self) {
        if let Some(pass) = self.config.get(ConfigKey::ServerPassword) {
            self.send(format!("PASS {}", pass), true);
        }
        let user = self.config.get(ConfigKey::User).unwrap_or_default();
        let real_name = self.config.get(ConfigKey::RealName).unwrap_or_default();
        self.send(format!("USER {} 8 * :{}", user, real_name), true);
        self.send_nick(&self.state.intended_nick());
    }

    /// Read until 004. PINGs are answered here since the input reader is
    /// not running yet. Liveness is left alone until registration succeeds,
    /// so a failed attempt stays stale for the monitor.
    async fn handshake<R>(&self, reader: &mut FramedRead<R, LineCodec>) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        while let Some(line) = reader.next().await {
            let line = line?;

            if let Some(pong) = answer_ping(&line) {
                self.send(pong, true);
                continue;
            }

            process_line(self, &line);

            let numeric = Line::parse(&line).and_then(|l| l.numeric());
            match numeric {
                Some(n) if n == Response::RPL_MYINFO.code() => return Ok(()),
                Some(n) if is_error_code(n) && !self.dispatcher.handles(n) => {
                    return Err(ClientError::Registration { line });
                }
                _ => debug!(%line, "handshake"),
            }
        }
        Err(ClientError::ConnectionClosed)
    }

    /// Nick reclaim, services login and channel joins.
    fn after_registration(&self) {
        let intended = self.state.intended_nick();
        if let Some(auth) = self.state.auth() {
            if let Some(reclaim) = auth.reclaim_for(&self.state.current_nick(), &intended) {
                info!(nick = %intended, "reclaiming nick");
                self.send(reclaim.to_owned(), true);
                self.send_nick(&intended);
            }
            self.send(auth.command().to_owned(), true);
        }
        for channel in self.state.channels().names() {
            self.send(format!("JOIN :{}", channel), true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{core_with_queues, drain};
    use crate::auth::AuthType;

    #[test]
    fn test_registration_lines() {
        let (core, mut queues) = core_with_queues("kitten");
        core.send_registration();
        assert_eq!(
            drain(&mut queues.priority),
            vec!["USER slirc 8 * :slirc-client", "NICK kitten"]
        );
    }

    #[test]
    fn test_after_registration_reclaims_and_joins() {
        let (core, mut queues) = core_with_queues("kitten");
        core.state.set_auth(AuthType::NickServ, "kitten", "hunter2");
        core.state.set_current_nick("kitten`");
        core.state.channels().insert("#kitteh");

        core.after_registration();
        assert_eq!(
            drain(&mut queues.priority),
            vec![
                "PRIVMSG NickServ :ghost kitten hunter2",
                "NICK kitten",
                "PRIVMSG NickServ :identify hunter2",
                "JOIN :#kitteh",
            ]
        );
        assert_eq!(core.state.current_nick(), "kitten");
    }

    #[test]
    fn test_after_registration_without_auth() {
        let (core, mut queues) = core_with_queues("kitten");
        core.state.set_current_nick("kitten`");
        core.after_registration();
        assert!(drain(&mut queues.priority).is_empty());
        assert_eq!(core.state.current_nick(), "kitten`");
    }
}
