//! Services authentication.

use std::fmt;

/// Services flavour used to identify the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum AuthType {
    /// GameSurge `AuthServ`; accounts are not tied to a nickname.
    GameSurge,
    /// Classic `NickServ`; the account owns its nickname.
    NickServ,
}

impl AuthType {
    /// Returns true if the services can free up a nickname owned by the
    /// account (`GHOST`).
    pub fn is_nick_owned(self) -> bool {
        matches!(self, AuthType::NickServ)
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthType::GameSurge => f.write_str("GameSurge"),
            AuthType::NickServ => f.write_str("NickServ"),
        }
    }
}

/// Pre-built services commands for one account.
#[derive(Clone, PartialEq, Eq)]
pub struct Auth {
    kind: AuthType,
    command: String,
    reclaim: Option<String>,
}

impl Auth {
    /// Build the identify and reclaim lines for an account.
    pub fn new(kind: AuthType, nick: &str, pass: &str) -> Self {
        let (command, reclaim) = match kind {
            AuthType::GameSurge => (
                format!("PRIVMSG AuthServ@services.gamesurge.net :auth {} {}", nick, pass),
                None,
            ),
            AuthType::NickServ => (
                format!("PRIVMSG NickServ :identify {}", pass),
                Some(format!("PRIVMSG NickServ :ghost {} {}", nick, pass)),
            ),
        };
        Self {
            kind,
            command,
            reclaim,
        }
    }

    /// The services flavour.
    pub fn kind(&self) -> AuthType {
        self.kind
    }

    /// Line that identifies the session.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Line that disconnects whoever holds our nick, if supported.
    pub fn reclaim(&self) -> Option<&str> {
        self.reclaim.as_deref()
    }

    /// The reclaim line, when a nick collision should be resolved with it.
    pub fn reclaim_for(&self, current: &str, intended: &str) -> Option<&str> {
        if current == intended || !self.kind.is_nick_owned() {
            return None;
        }
        self.reclaim()
    }
}

// Lines carry the password; keep them out of logs.
impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth").field("kind", &self.kind).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gamesurge() {
        let auth = Auth::new(AuthType::GameSurge, "kitten", "hunter2");
        assert_eq!(
            auth.command(),
            "PRIVMSG AuthServ@services.gamesurge.net :auth kitten hunter2"
        );
        assert_eq!(auth.reclaim(), None);
        assert_eq!(auth.reclaim_for("kitten`", "kitten"), None);
    }

    #[test]
    fn test_nickserv() {
        let auth = Auth::new(AuthType::NickServ, "kitten", "hunter2");
        assert_eq!(auth.command(), "PRIVMSG NickServ :identify hunter2");
        assert_eq!(auth.reclaim(), Some("PRIVMSG NickServ :ghost kitten hunter2"));
        assert_eq!(
            auth.reclaim_for("kitten`", "kitten"),
            Some("PRIVMSG NickServ :ghost kitten hunter2")
        );
        assert_eq!(auth.reclaim_for("kitten", "kitten"), None);
    }

    #[test]
    fn test_debug_hides_password() {
        let auth = Auth::new(AuthType::NickServ, "kitten", "hunter2");
        assert!(!format!("{:?}", auth).contains("hunter2"));
    }
}
