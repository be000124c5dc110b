//! Session state shared between the client handle and its worker tasks.
//!
//! Nothing in here performs I/O. The line processor and the lifecycle
//! manager mutate [`SessionState`]; the input reader writes [`Liveness`]
//! and the monitor reads it through a [`LivenessCheck`].

use std::fmt;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::time::Instant;

use crate::auth::{Auth, AuthType};
use crate::casemap::irc_eq;
use crate::chan::ChannelSet;

/// Marker appended to the nick when the server reports it in use.
pub const NICK_COLLISION_SUFFIX: char = '`';

/// Lifecycle of the session's connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionState {
    /// No connection yet.
    #[default]
    Disconnected,
    /// Socket open, registration lines sent, waiting for 004.
    Handshaking,
    /// 004 received, post-registration lines being queued.
    Registered,
    /// Fully connected; the input reader and normal output tier run.
    Running,
    /// The connection went stale and is being replaced.
    Reconnecting,
    /// `shutdown` was called; terminal.
    Shutdown,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Handshaking => "handshaking",
            Self::Registered => "registered",
            Self::Running => "running",
            Self::Reconnecting => "reconnecting",
            Self::Shutdown => "shutdown",
        };
        f.write_str(name)
    }
}

/// Who a PRIVMSG, NOTICE, MODE or INVITE was addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageTarget {
    /// A channel in the session's channel set.
    Channel,
    /// Our current nick.
    Private,
    /// Anything else.
    Unknown,
}

/// Mutable per-session state.
#[derive(Debug)]
pub struct SessionState {
    intended_nick: RwLock<String>,
    current_nick: RwLock<String>,
    channels: ChannelSet,
    auth: RwLock<Option<Auth>>,
    connection: RwLock<ConnectionState>,
    shutdown_reason: Mutex<Option<String>>,
}

impl SessionState {
    /// Create the state for a session that wants to be called `nick`.
    pub fn new(nick: &str) -> Self {
        Self {
            intended_nick: RwLock::new(nick.to_owned()),
            current_nick: RwLock::new(nick.to_owned()),
            channels: ChannelSet::new(),
            auth: RwLock::new(None),
            connection: RwLock::new(ConnectionState::Disconnected),
            shutdown_reason: Mutex::new(None),
        }
    }

    /// The nick the session wants.
    pub fn intended_nick(&self) -> String {
        self.intended_nick.read().clone()
    }

    /// The nick the server currently knows us by.
    pub fn current_nick(&self) -> String {
        self.current_nick.read().clone()
    }

    /// Set the nick the server knows us by.
    pub fn set_current_nick(&self, nick: &str) {
        *self.current_nick.write() = nick.to_owned();
    }

    /// Set both the intended and the current nick.
    pub fn set_nick(&self, nick: &str) {
        *self.intended_nick.write() = nick.to_owned();
        *self.current_nick.write() = nick.to_owned();
    }

    /// Append the collision marker to the current nick and return it.
    pub fn collide_nick(&self) -> String {
        let mut current = self.current_nick.write();
        current.push(NICK_COLLISION_SUFFIX);
        current.clone()
    }

    /// Returns true if `nick` is our current nick.
    pub fn is_me(&self, nick: &str) -> bool {
        irc_eq(&self.current_nick.read(), nick)
    }

    /// Channels joined or to be joined.
    pub fn channels(&self) -> &ChannelSet {
        &self.channels
    }

    /// Classify a message target.
    pub fn target_of(&self, target: &str) -> MessageTarget {
        if self.is_me(target) {
            MessageTarget::Private
        } else if self.channels.contains(target) {
            MessageTarget::Channel
        } else {
            MessageTarget::Unknown
        }
    }

    /// Configure services authentication.
    pub fn set_auth(&self, kind: AuthType, nick: &str, pass: &str) {
        *self.auth.write() = Some(Auth::new(kind, nick, pass));
    }

    /// The configured services authentication.
    pub fn auth(&self) -> Option<Auth> {
        self.auth.read().clone()
    }

    /// Current lifecycle state.
    pub fn connection_state(&self) -> ConnectionState {
        *self.connection.read()
    }

    /// Move to another lifecycle state. `Shutdown` is terminal.
    pub fn set_connection_state(&self, next: ConnectionState) -> bool {
        let mut state = self.connection.write();
        if *state == ConnectionState::Shutdown {
            return false;
        }
        *state = next;
        true
    }

    /// Returns true once registration completed and until the connection
    /// is dropped.
    pub fn is_connected(&self) -> bool {
        self.connection_state() == ConnectionState::Running
    }

    /// Record why the session is shutting down.
    pub fn set_shutdown_reason(&self, reason: Option<&str>) {
        *self.shutdown_reason.lock() = Some(reason.unwrap_or_default().to_owned());
    }

    /// The shutdown reason, empty if none was given.
    pub fn shutdown_reason(&self) -> String {
        self.shutdown_reason.lock().clone().unwrap_or_default()
    }
}

/// Timestamp of the last line read from the server.
#[derive(Debug)]
pub struct Liveness {
    last_input: Mutex<Instant>,
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

impl Liveness {
    /// Start counting from now.
    pub fn new() -> Self {
        Self {
            last_input: Mutex::new(Instant::now()),
        }
    }

    /// Record input.
    pub fn touch(&self) {
        *self.last_input.lock() = Instant::now();
    }

    /// Instant of the last input.
    pub fn last_input(&self) -> Instant {
        *self.last_input.lock()
    }

    /// Time since the last input.
    pub fn idle(&self) -> Duration {
        self.last_input().elapsed()
    }
}

/// Decides when the monitor should treat the connection as dead.
///
/// Checks run at most once per `check_interval`; a check fires when the
/// last input is older than `stale_after`.
#[derive(Debug, Clone)]
pub struct LivenessCheck {
    check_interval: Duration,
    stale_after: Duration,
    last_check: Instant,
}

impl LivenessCheck {
    /// Create a check whose first evaluation is due one interval from
    /// `now`.
    pub fn new(check_interval: Duration, stale_after: Duration, now: Instant) -> Self {
        Self {
            check_interval,
            stale_after,
            last_check: now,
        }
    }

    /// Returns true if a check is due at `now` and finds the connection
    /// stale.
    pub fn poll(&mut self, now: Instant, last_input: Instant) -> bool {
        if now.saturating_duration_since(self.last_check) <= self.check_interval {
            return false;
        }
        self.last_check = now;
        now.saturating_duration_since(last_input) > self.stale_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nick_collision() {
        let state = SessionState::new("kitten");
        assert_eq!(state.collide_nick(), "kitten`");
        assert_eq!(state.collide_nick(), "kitten``");
        assert_eq!(state.intended_nick(), "kitten");
        state.set_nick("cat");
        assert_eq!(state.current_nick(), "cat");
        assert_eq!(state.intended_nick(), "cat");
    }

    #[test]
    fn test_target_classification() {
        let state = SessionState::new("Kitten");
        state.channels().insert("#kitteh");
        assert_eq!(state.target_of("kitten"), MessageTarget::Private);
        assert_eq!(state.target_of("#KITTEH"), MessageTarget::Channel);
        assert_eq!(state.target_of("#other"), MessageTarget::Unknown);
        assert_eq!(state.target_of("someone"), MessageTarget::Unknown);
    }

    #[test]
    fn test_shutdown_is_terminal() {
        let state = SessionState::new("kitten");
        assert!(state.set_connection_state(ConnectionState::Running));
        assert!(state.is_connected());
        assert!(state.set_connection_state(ConnectionState::Shutdown));
        assert!(!state.set_connection_state(ConnectionState::Reconnecting));
        assert_eq!(state.connection_state(), ConnectionState::Shutdown);
    }

    #[test]
    fn test_shutdown_reason_defaults_empty() {
        let state = SessionState::new("kitten");
        state.set_shutdown_reason(None);
        assert_eq!(state.shutdown_reason(), "");
        state.set_shutdown_reason(Some("bye"));
        assert_eq!(state.shutdown_reason(), "bye");
    }

    #[tokio::test(start_paused = true)]
    async fn test_liveness_check_fires_once_per_stale_period() {
        let liveness = Liveness::new();
        let start = Instant::now();
        let mut check =
            LivenessCheck::new(Duration::from_secs(5), Duration::from_secs(250), start);

        let mut fired = 0;
        for _ in 0..260 {
            tokio::time::advance(Duration::from_secs(1)).await;
            if check.poll(Instant::now(), liveness.last_input()) {
                fired += 1;
                liveness.touch();
            }
        }
        assert_eq!(fired, 1);
        assert!(liveness.idle() < Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_liveness_check_respects_interval() {
        let start = Instant::now();
        let mut check = LivenessCheck::new(Duration::from_secs(5), Duration::from_secs(1), start);
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(!check.poll(Instant::now(), start));
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(check.poll(Instant::now(), start));
        assert!(!check.poll(Instant::now(), start));
    }
}
