//! CTCP (Client-to-Client Protocol) framing and built-in replies.
//!
//! CTCP requests travel inside PRIVMSG bodies wrapped in `\x01`; replies go
//! back as NOTICEs with the same framing.
//!
//! See <https://modern.ircdocs.horse/ctcp.html>.
//!
//! # Example
//!
//! ```
//! use slirc_client::ctcp::{self, Ctcp, CtcpKind};
//!
//! let payload = ctcp::unwrap("\x01PING 1234\x01").unwrap();
//! let request = Ctcp::parse(payload).unwrap();
//! assert_eq!(request.kind, CtcpKind::Ping);
//! assert_eq!(ctcp::builtin_reply(payload).as_deref(), Some("PING 1234"));
//! assert_eq!(ctcp::wrap("PING 1234"), "\x01PING 1234\x01");
//! ```

use std::fmt;

/// The CTCP delimiter character (`\x01`).
pub const CTCP_DELIM: char = '\x01';

/// Reply to a `FINGER` request.
pub const FINGER_REPLY: &str = "FINGER om nom nom tasty finger";

/// CTCP requests the engine knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CtcpKind {
    /// `/me` actions.
    Action,
    /// Client name and version.
    Version,
    /// Latency probe; the token is echoed back.
    Ping,
    /// Local time of the client.
    Time,
    /// Legacy user info.
    Finger,
    /// Anything else; see [`Ctcp::command`].
    Other,
}

impl CtcpKind {
    /// Classify a request word, ignoring ASCII case.
    pub fn from_command(command: &str) -> Self {
        const KNOWN: [(&str, CtcpKind); 5] = [
            ("ACTION", CtcpKind::Action),
            ("VERSION", CtcpKind::Version),
            ("PING", CtcpKind::Ping),
            ("TIME", CtcpKind::Time),
            ("FINGER", CtcpKind::Finger),
        ];
        KNOWN
            .iter()
            .find(|(word, _)| word.eq_ignore_ascii_case(command))
            .map_or(CtcpKind::Other, |(_, kind)| *kind)
    }
}

/// An unwrapped request split at its first space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    /// Classification of [`command`](Self::command).
    pub kind: CtcpKind,
    /// The request word as sent.
    pub command: &'a str,
    /// Everything after the first space, if non-empty.
    pub params: Option<&'a str>,
}

impl<'a> Ctcp<'a> {
    /// Split an unwrapped payload such as `PING 1234`.
    ///
    /// Returns `None` for an empty payload.
    pub fn parse(payload: &'a str) -> Option<Self> {
        if payload.is_empty() {
            return None;
        }
        let (command, params) = match payload.split_once(' ') {
            Some((command, rest)) => (command, (!rest.is_empty()).then_some(rest)),
            None => (payload, None),
        };
        Some(Ctcp {
            kind: CtcpKind::from_command(command),
            command,
            params,
        })
    }
}

impl fmt::Display for Ctcp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.params {
            Some(params) => write!(f, "{} {}", self.command, params),
            None => f.write_str(self.command),
        }
    }
}

/// Strip CTCP framing from a message body.
///
/// The body must start and end with `\x01` and be at least two characters
/// long; anything else is an ordinary message.
pub fn unwrap(body: &str) -> Option<&str> {
    if body.len() < 2 {
        return None;
    }
    body.strip_prefix(CTCP_DELIM)?.strip_suffix(CTCP_DELIM)
}

/// Frame a payload for sending.
pub fn wrap(payload: &str) -> String {
    format!("{}{}{}", CTCP_DELIM, payload, CTCP_DELIM)
}

/// Reply the engine proposes for a private CTCP request, if any.
///
/// `VERSION`, `TIME` and `FINGER` are answered when sent without
/// parameters; `PING <token>` is echoed back unchanged.
pub fn builtin_reply(payload: &str) -> Option<String> {
    let ctcp = Ctcp::parse(payload)?;
    match (ctcp.kind, ctcp.params) {
        (CtcpKind::Version, None) => Some(version_reply()),
        (CtcpKind::Time, None) => Some(format!("TIME {}", chrono::Local::now().to_rfc2822())),
        (CtcpKind::Finger, None) => Some(FINGER_REPLY.to_owned()),
        (CtcpKind::Ping, Some(_)) => Some(payload.to_owned()),
        _ => None,
    }
}

/// The `VERSION` reply text.
pub fn version_reply() -> String {
    format!(
        "VERSION {} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap() {
        assert_eq!(unwrap("\x01VERSION\x01"), Some("VERSION"));
        assert_eq!(unwrap("\x01\x01"), Some(""));
        assert_eq!(unwrap("\x01"), None);
        assert_eq!(unwrap("\x01VERSION"), None);
        assert_eq!(unwrap("hello"), None);
    }

    #[test]
    fn test_parse() {
        let ctcp = Ctcp::parse("ACTION waves hello").unwrap();
        assert_eq!(ctcp.kind, CtcpKind::Action);
        assert_eq!(ctcp.params, Some("waves hello"));
        assert_eq!(ctcp.to_string(), "ACTION waves hello");

        let ctcp = Ctcp::parse("clientinfo").unwrap();
        assert_eq!(ctcp.kind, CtcpKind::Other);
        assert_eq!(ctcp.command, "clientinfo");
        assert_eq!(Ctcp::parse("version").unwrap().kind, CtcpKind::Version);
        assert!(Ctcp::parse("").is_none());
    }

    #[test]
    fn test_builtin_replies() {
        assert_eq!(
            builtin_reply("VERSION"),
            Some(format!("VERSION slirc-client {}", env!("CARGO_PKG_VERSION")))
        );
        assert_eq!(builtin_reply("FINGER").as_deref(), Some(FINGER_REPLY));
        assert_eq!(builtin_reply("PING 42 abc").as_deref(), Some("PING 42 abc"));
        assert!(builtin_reply("TIME").unwrap().starts_with("TIME "));
    }

    #[test]
    fn test_no_builtin_reply() {
        assert_eq!(builtin_reply("PING"), None);
        assert_eq!(builtin_reply("ACTION dances"), None);
        assert_eq!(builtin_reply("SOURCE"), None);
        assert_eq!(builtin_reply(""), None);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("VERSION x"), "\x01VERSION x\x01");
    }
}
