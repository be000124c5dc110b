//! Channel names and the session's channel set.

use parking_lot::RwLock;

use crate::casemap::irc_eq;

/// Characters that introduce a channel name.
pub const CHANNEL_PREFIXES: [char; 4] = ['#', '&', '+', '!'];

/// Shape checks for channel names.
pub trait ChannelExt {
    /// Returns true if this looks like a channel name: a channel prefix
    /// followed by at least one character, and no space, comma or BEL.
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        let mut chars = self.chars();
        match chars.next() {
            Some(c) if CHANNEL_PREFIXES.contains(&c) => {}
            _ => return false,
        }
        self.len() > 1 && !self.contains([' ', ',', '\x07'])
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }
}

/// Channels this session is in or intends to join.
///
/// Membership uses RFC 1459 case-insensitive identity; the spelling used
/// when a channel was first added is kept for outgoing `JOIN` lines.
/// Iteration follows insertion order.
#[derive(Debug, Default)]
pub struct ChannelSet {
    names: RwLock<Vec<String>>,
}

impl ChannelSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel. Returns false if it was already present.
    pub fn insert(&self, name: &str) -> bool {
        let mut names = self.names.write();
        if names.iter().any(|n| irc_eq(n, name)) {
            return false;
        }
        names.push(name.to_owned());
        true
    }

    /// Remove a channel. Returns false if it was not present.
    pub fn remove(&self, name: &str) -> bool {
        let mut names = self.names.write();
        let before = names.len();
        names.retain(|n| !irc_eq(n, name));
        names.len() != before
    }

    /// Returns true if the channel is in the set.
    pub fn contains(&self, name: &str) -> bool {
        self.names.read().iter().any(|n| irc_eq(n, name))
    }

    /// Snapshot of all names, in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.names.read().clone()
    }

    /// Number of channels in the set.
    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }
}
