//! Connection parameters for a client session.
//!
//! The session treats configuration as an opaque key/value lookup: every
//! connection parameter is addressed by a [`ConfigKey`] and read through
//! [`Config::get`]. Timing knobs for the session pipeline live in
//! [`Timeouts`].
//!
//! # Example
//!
//! ```
//! use slirc_client::config::{Config, ConfigKey};
//!
//! let config = Config::builder("irc.libera.chat:6667")
//!     .nick("kitten")
//!     .user("kitten")
//!     .real_name("A friendly bot")
//!     .build();
//!
//! assert_eq!(config.get(ConfigKey::Nick), Some("kitten"));
//! assert_eq!(config.get(ConfigKey::ServerPassword), None);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{ClientError, Result};

/// Keys understood by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ConfigKey {
    /// `host:port` of the IRC server.
    ServerAddress,
    /// Local `ip:port` to bind before connecting.
    BindAddress,
    /// Password sent with `PASS` before registration.
    ServerPassword,
    /// Username (ident) sent with `USER`.
    User,
    /// Real name / GECOS sent with `USER`.
    RealName,
    /// Desired nickname.
    Nick,
    /// Name identifying this session in logs.
    BotName,
}

impl ConfigKey {
    /// Returns the snake_case name of this key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServerAddress => "server_address",
            Self::BindAddress => "bind_address",
            Self::ServerPassword => "server_password",
            Self::User => "user",
            Self::RealName => "real_name",
            Self::Nick => "nick",
            Self::BotName => "bot_name",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing of the liveness monitor, reconnect path and handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct Timeouts {
    /// How often the monitor wakes up.
    pub poll_interval: Duration,
    /// Minimum time between two liveness checks.
    pub check_interval: Duration,
    /// Input silence after which the connection is considered dead.
    pub stale_after: Duration,
    /// Pause between tearing down a dead connection and reconnecting.
    pub reconnect_delay: Duration,
    /// Upper bound for the registration handshake.
    pub registration: Duration,
    /// Time the writer gets to flush the QUIT line on shutdown.
    pub shutdown_flush: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            check_interval: Duration::from_secs(5),
            stale_after: Duration::from_secs(250),
            reconnect_delay: Duration::from_secs(10),
            registration: Duration::from_secs(120),
            shutdown_flush: Duration::from_secs(5),
        }
    }
}

/// Session configuration.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    values: HashMap<ConfigKey, String>,
    #[cfg_attr(feature = "serde", serde(default))]
    timeouts: Timeouts,
}

impl Config {
    /// Start building a configuration for the given `host:port`.
    pub fn builder(server_address: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(server_address)
    }

    /// Look up a value by key.
    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        self.values
            .get(&key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Look up a value that the session cannot work without.
    pub fn require(&self, key: ConfigKey) -> Result<&str> {
        self.get(key).ok_or(ClientError::Config(key))
    }

    /// Set or replace a value.
    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// Parse the configured bind address, if any.
    ///
    /// Returns `Some(Err(_))` for a value that is not an `ip:port`.
    pub fn bind_address(&self) -> Option<std::result::Result<SocketAddr, std::net::AddrParseError>> {
        self.get(ConfigKey::BindAddress).map(str::parse)
    }

    /// Timing knobs for this session.
    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }
}

/// Builder for [`Config`].
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    fn new(server_address: impl Into<String>) -> Self {
        let mut config = Config::default();
        config.set(ConfigKey::ServerAddress, server_address);
        config.set(ConfigKey::Nick, "slirc");
        config.set(ConfigKey::User, "slirc");
        config.set(ConfigKey::RealName, "slirc-client");
        config.set(ConfigKey::BotName, "slirc");
        Self { config }
    }

    /// Set the desired nickname.
    pub fn nick(mut self, nick: impl Into<String>) -> Self {
        self.config.set(ConfigKey::Nick, nick);
        self
    }

    /// Set the username (ident).
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.config.set(ConfigKey::User, user);
        self
    }

    /// Set the real name.
    pub fn real_name(mut self, real_name: impl Into<String>) -> Self {
        self.config.set(ConfigKey::RealName, real_name);
        self
    }

    /// Set the session name used in logs.
    pub fn bot_name(mut self, name: impl Into<String>) -> Self {
        self.config.set(ConfigKey::BotName, name);
        self
    }

    /// Set the server password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.set(ConfigKey::ServerPassword, password);
        self
    }

    /// Bind the local end of the socket to `ip:port` before connecting.
    pub fn bind_address(mut self, addr: impl Into<String>) -> Self {
        self.config.set(ConfigKey::BindAddress, addr);
        self
    }

    /// Override the session timing.
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.config.timeouts = timeouts;
        self
    }

    /// Finish building.
    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = Config::builder("irc.example.net:6667").build();
        assert_eq!(
            config.get(ConfigKey::ServerAddress),
            Some("irc.example.net:6667")
        );
        assert_eq!(config.get(ConfigKey::Nick), Some("slirc"));
        assert!(config.get(ConfigKey::BindAddress).is_none());
        assert!(config.bind_address().is_none());
        assert_eq!(config.timeouts(), &Timeouts::default());
    }

    #[test]
    fn test_empty_value_is_missing() {
        let config = Config::builder("").build();
        assert!(config.get(ConfigKey::ServerAddress).is_none());
        assert!(matches!(
            config.require(ConfigKey::ServerAddress),
            Err(ClientError::Config(ConfigKey::ServerAddress))
        ));
    }

    #[test]
    fn test_bind_address_parse() {
        let config = Config::builder("irc.example.net:6667")
            .bind_address("127.0.0.1:0")
            .build();
        let addr = config.bind_address().unwrap().unwrap();
        assert!(addr.ip().is_loopback());

        let config = Config::builder("irc.example.net:6667")
            .bind_address("not an address")
            .build();
        assert!(config.bind_address().unwrap().is_err());
    }

    #[test]
    fn test_default_timeouts() {
        let t = Timeouts::default();
        assert_eq!(t.check_interval, Duration::from_secs(5));
        assert_eq!(t.stale_after, Duration::from_secs(250));
        assert_eq!(t.reconnect_delay, Duration::from_secs(10));
    }
}
