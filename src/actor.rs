//! Source identities decoded from a line's prefix.
//!
//! An actor is either a user (`nick!user@host`), a server (a bare name
//! containing a dot) or a channel (a name starting with a channel prefix).
//! Channels only appear as actors when a target is resolved to one.

use std::fmt;

use crate::chan::ChannelExt;

/// A decoded protocol identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Actor {
    /// A user, as `nick!user@host`. User and host are absent when the
    /// source only carried a nickname.
    User {
        /// Nickname.
        nick: String,
        /// Username (ident).
        user: Option<String>,
        /// Hostname.
        host: Option<String>,
    },
    /// A server name (e.g. `irc.example.net`).
    Server {
        /// Server name.
        name: String,
    },
    /// A channel.
    Channel {
        /// Channel name including its prefix.
        name: String,
    },
}

impl Actor {
    /// Decode an actor from a prefix string (without the leading `:`).
    ///
    /// This is a lenient parser: it never fails, it only classifies.
    pub fn parse(s: &str) -> Self {
        if s.is_channel_name() {
            return Actor::Channel { name: s.to_owned() };
        }

        #[derive(Copy, Clone, Eq, PartialEq)]
        enum Part {
            Name,
            User,
            Host,
        }

        let mut name = String::new();
        let mut user = None::<String>;
        let mut host = None::<String>;
        let mut part = Part::Name;

        for c in s.chars() {
            match c {
                '!' if part == Part::Name => {
                    part = Part::User;
                    user = Some(String::new());
                }
                '@' if part != Part::Host => {
                    part = Part::Host;
                    host = Some(String::new());
                }
                _ => match part {
                    Part::Name => name.push(c),
                    Part::User => user.get_or_insert_with(String::new).push(c),
                    Part::Host => host.get_or_insert_with(String::new).push(c),
                },
            }
        }

        if part == Part::Name && name.contains('.') {
            Actor::Server { name }
        } else {
            Actor::User {
                nick: name,
                user: user.filter(|u| !u.is_empty()),
                host: host.filter(|h| !h.is_empty()),
            }
        }
    }

    /// Create a channel actor.
    pub fn channel(name: impl Into<String>) -> Self {
        Actor::Channel { name: name.into() }
    }

    /// The short name: nickname, server name or channel name.
    pub fn name(&self) -> &str {
        match self {
            Actor::User { nick, .. } => nick,
            Actor::Server { name } | Actor::Channel { name } => name,
        }
    }

    /// The nickname if this is a user.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Actor::User { nick, .. } => Some(nick),
            _ => None,
        }
    }

    /// Returns true for [`Actor::User`].
    pub fn is_user(&self) -> bool {
        matches!(self, Actor::User { .. })
    }

    /// Returns true for [`Actor::Server`].
    pub fn is_server(&self) -> bool {
        matches!(self, Actor::Server { .. })
    }

    /// Returns true for [`Actor::Channel`].
    pub fn is_channel(&self) -> bool {
        matches!(self, Actor::Channel { .. })
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::User { nick, user, host } => {
                f.write_str(nick)?;
                if let Some(user) = user {
                    write!(f, "!{}", user)?;
                }
                if let Some(host) = host {
                    write!(f, "@{}", host)?;
                }
                Ok(())
            }
            Actor::Server { name } | Actor::Channel { name } => f.write_str(name),
        }
    }
}
