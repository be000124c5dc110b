//! The client session and its public handle.
//!
//! [`Client::start`] connects, registers and then leaves three tasks
//! running for the lifetime of the session:
//!
//! - the **monitor**, which owns reconnect decisions,
//! - the **line processor**, which decodes and dispatches every line,
//! - per connection, the **input reader** and **output writer**.
//!
//! ```no_run
//! use std::sync::Arc;
//! use slirc_client::{Client, Config, Event, EventManager};
//!
//! # async fn run() -> slirc_client::Result<()> {
//! let events = Arc::new(EventManager::new());
//! events.register(|event: &Event| {
//!     if let Event::PrivateMessage { actor, message } = event {
//!         println!("<{}> {}", actor.name(), message);
//!     }
//! });
//!
//! let config = Config::builder("irc.libera.chat:6667").nick("kitten").build();
//! let client = Client::start(config, events).await?;
//! client.add_channel(["#kitteh"]);
//! client.send_message("#kitteh", "hello")?;
//! client.shutdown(Some("bye"));
//! client.wait().await;
//! # Ok(())
//! # }
//! ```

mod connect;
mod monitor;

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::auth::AuthType;
use crate::chan::ChannelExt;
use crate::config::{Config, ConfigKey};
use crate::dispatch::Dispatcher;
use crate::error::{ClientError, Result};
use crate::event::EventManager;
use crate::isupport::{CapabilityTable, SharedCapabilities};
use crate::processor;
use crate::state::{ConnectionState, Liveness, SessionState};
use crate::transport::Outbound;

/// Quit message used when the monitor drops a stale connection.
pub const PING_TIMEOUT_REASON: &str = "Ping timeout! Reconnecting...";

/// State shared by the client handle and every worker task.
pub(crate) struct Core {
    pub(crate) config: Config,
    pub(crate) state: SessionState,
    pub(crate) caps: SharedCapabilities,
    pub(crate) events: Arc<EventManager>,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) liveness: Arc<Liveness>,
    pub(crate) cancel: CancellationToken,
    outbound: RwLock<Option<Arc<Outbound>>>,
    connection: Mutex<Option<CancellationToken>>,
    lines: mpsc::UnboundedSender<String>,
}

impl Core {
    pub(crate) fn new(
        config: Config,
        events: Arc<EventManager>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let nick = config.get(ConfigKey::Nick).unwrap_or_default().to_owned();
        let (lines, rx) = mpsc::unbounded_channel();
        let core = Arc::new(Self {
            state: SessionState::new(&nick),
            config,
            caps: SharedCapabilities::new(),
            events,
            dispatcher: Dispatcher::new(),
            liveness: Arc::new(Liveness::new()),
            cancel: CancellationToken::new(),
            outbound: RwLock::new(None),
            connection: Mutex::new(None),
            lines,
        });
        (core, rx)
    }

    /// Queue a line on the current connection.
    ///
    /// Returns false when there is no connection to queue on.
    pub(crate) fn send(&self, line: impl Into<String>, priority: bool) -> bool {
        let outbound = self.outbound.read().clone();
        match outbound {
            Some(outbound) => outbound.send(line.into(), priority),
            None => {
                debug!(line = %line.into(), "no connection, dropping line");
                false
            }
        }
    }

    /// Send `NICK` at priority and adopt the nick as current.
    pub(crate) fn send_nick(&self, nick: &str) {
        self.state.set_current_nick(nick);
        self.send(format!("NICK {}", nick), true);
    }

    /// Tear down the current connection, sending `QUIT :<reason>`.
    pub(crate) async fn disconnect(&self, reason: &str) {
        if let Some(token) = self.connection.lock().take() {
            token.cancel();
        }
        let outbound = self.outbound.write().take();
        if let Some(outbound) = outbound {
            outbound
                .close(reason, self.config.timeouts().shutdown_flush)
                .await;
        }
    }

    fn require_connection(&self, sent: bool) -> Result<()> {
        if sent {
            Ok(())
        } else {
            Err(ClientError::NotConnected)
        }
    }
}

/// Handle to a running IRC session.
pub struct Client {
    core: Arc<Core>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Client {
    /// Connect, register and start the session.
    ///
    /// Errors from the first connection attempt are returned; later
    /// reconnects are handled by the monitor.
    pub async fn start(config: Config, events: Arc<EventManager>) -> Result<Client> {
        for key in [
            ConfigKey::ServerAddress,
            ConfigKey::Nick,
            ConfigKey::User,
            ConfigKey::RealName,
        ] {
            config.require(key)?;
        }

        let (core, lines) = Core::new(config, events);
        let processor = tokio::spawn(processor::run(
            Arc::clone(&core),
            lines,
            core.cancel.clone(),
        ));

        if let Err(e) = core.connect().await {
            core.state.set_connection_state(ConnectionState::Shutdown);
            core.cancel.cancel();
            return Err(e);
        }

        let monitor = tokio::spawn(monitor::run(Arc::clone(&core)));
        Ok(Client {
            core,
            tasks: Mutex::new(vec![monitor, processor]),
        })
    }

    /// The event manager listeners are registered on.
    pub fn events(&self) -> &Arc<EventManager> {
        &self.core.events
    }

    /// Add channels to the session; they are joined now if connected and
    /// after every reconnect. Names that are not channel-shaped are skipped.
    pub fn add_channel<I, S>(&self, channels: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for channel in channels {
            let channel = channel.as_ref();
            if !channel.is_channel_name() {
                debug!(%channel, "not a channel name, skipping");
                continue;
            }
            self.core.state.channels().insert(channel);
            if self.core.state.is_connected() {
                self.core.send(format!("JOIN :{}", channel), true);
            }
        }
    }

    /// Remove a channel from the session, parting it if connected.
    pub fn remove_channel(&self, channel: &str) {
        if self.core.state.channels().remove(channel) && self.core.state.is_connected() {
            self.core.send(format!("PART {}", channel), true);
        }
    }

    /// Channels the session joins.
    pub fn channels(&self) -> Vec<String> {
        self.core.state.channels().names()
    }

    /// The nick the server currently knows us by.
    pub fn nick(&self) -> String {
        self.core.state.current_nick()
    }

    /// The nick the session wants.
    pub fn intended_nick(&self) -> String {
        self.core.state.intended_nick()
    }

    /// The session name from [`ConfigKey::BotName`].
    pub fn name(&self) -> &str {
        self.core.config.get(ConfigKey::BotName).unwrap_or_default()
    }

    /// Change nick, both intended and current.
    pub fn set_nick(&self, nick: &str) {
        let nick = nick.trim();
        self.core.state.set_nick(nick);
        self.core.send(format!("NICK {}", nick), true);
    }

    /// Configure services authentication for the next registration.
    pub fn set_auth(&self, kind: AuthType, nick: &str, pass: &str) {
        self.core.state.set_auth(kind, nick, pass);
    }

    /// Send a PRIVMSG.
    pub fn send_message(&self, target: &str, message: &str) -> Result<()> {
        check_target(target)?;
        self.send_raw_line(format!("PRIVMSG {} :{}", target, message))
    }

    /// Send a NOTICE.
    pub fn send_notice(&self, target: &str, message: &str) -> Result<()> {
        check_target(target)?;
        self.send_raw_line(format!("NOTICE {} :{}", target, message))
    }

    /// Queue a raw line at normal priority.
    pub fn send_raw_line(&self, line: impl Into<String>) -> Result<()> {
        let sent = self.core.send(line, false);
        self.core.require_connection(sent)
    }

    /// Queue a raw line ahead of all normal-priority lines.
    pub fn send_raw_line_priority(&self, line: impl Into<String>) -> Result<()> {
        let sent = self.core.send(line, true);
        self.core.require_connection(sent)
    }

    /// Returns true while registered on a live connection.
    pub fn is_connected(&self) -> bool {
        self.core.state.is_connected()
    }

    /// Where the session is in its lifecycle.
    pub fn connection_state(&self) -> ConnectionState {
        self.core.state.connection_state()
    }

    /// The server capabilities learned on the current connection.
    pub fn capabilities(&self) -> Arc<CapabilityTable> {
        self.core.caps.snapshot()
    }

    /// Stop the session. The server is sent `QUIT :<reason>`.
    pub fn shutdown(&self, reason: Option<&str>) {
        info!(reason = reason.unwrap_or_default(), "shutting down");
        self.core.state.set_shutdown_reason(reason);
        self.core.state.set_connection_state(ConnectionState::Shutdown);
        self.core.cancel.cancel();
    }

    /// Wait until every session task has stopped.
    pub async fn wait(&self) {
        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                debug!(error = %e, "session task ended abnormally");
            }
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("name", &self.name())
            .field("nick", &self.nick())
            .field("state", &self.connection_state())
            .finish()
    }
}

fn check_target(target: &str) -> Result<()> {
    if target.is_empty() || target.contains(' ') {
        return Err(ClientError::InvalidTarget(target.to_owned()));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_check_target() {
        assert!(check_target("#kitteh").is_ok());
        assert!(check_target("alice").is_ok());
        assert!(matches!(
            check_target("two words"),
            Err(ClientError::InvalidTarget(_))
        ));
        assert!(check_target("").is_err());
    }

    #[test]
    fn test_send_without_connection() {
        let config = Config::builder("127.0.0.1:6667").build();
        let (core, _lines) = Core::new(config, Arc::new(EventManager::new()));
        assert!(!core.send("PRIVMSG #c :hi", false));
        assert!(matches!(
            core.require_connection(false),
            Err(ClientError::NotConnected)
        ));
    }

    #[test]
    fn test_send_nick_updates_current() {
        let (core, mut queues) = core_with_queues("kitten");
        core.send_nick("cat");
        assert_eq!(core.state.current_nick(), "cat");
        assert_eq!(core.state.intended_nick(), "kitten");
        assert_eq!(drain(&mut queues.priority), vec!["NICK cat"]);
    }

    #[tokio::test]
    async fn test_disconnect_without_writer() {
        let (core, _queues) = core_with_queues("kitten");
        core.disconnect("bye").await;
        assert!(!core.send("PRIVMSG #c :hi", true));
    }

    #[tokio::test]
    async fn test_start_requires_server() {
        let config = Config::builder("").build();
        let err = Client::start(config, Arc::new(EventManager::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Config(ConfigKey::ServerAddress)));
    }
}
