//! Server capability table learned from `RPL_ISUPPORT` (005).
//!
//! Two tables decide how a MODE flag string is read:
//!
//! - the *prefix table* maps membership modes to their display symbol
//!   (`PREFIX=(ov)@+`), and
//! - the *class table* maps every other channel mode to one of the four
//!   `CHANMODES` classes.
//!
//! [`CapabilityTable`] is a plain value. The session keeps the current one
//! in a [`SharedCapabilities`] slot and swaps in a rebuilt copy whenever the
//! server advertises new tokens.
//!
//! # Example
//!
//! ```
//! use slirc_client::isupport::{CapabilityTable, ModeClass};
//!
//! let mut table = CapabilityTable::default();
//! table.apply_isupport(["PREFIX=(qaohv)~&@%+", "CHANMODES=beI,k,l,imnpst"]);
//!
//! assert_eq!(table.prefix_symbol('h'), Some('%'));
//! assert_eq!(table.mode_class('I'), Some(ModeClass::List));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// `CHANMODES` class of a channel mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModeClass {
    /// Type A: list mode, parameter on set and unset (e.g. `b`).
    List,
    /// Type B: parameter on set and unset (e.g. `k`).
    Parameter,
    /// Type C: parameter on set only (e.g. `l`).
    ParameterOnSet,
    /// Type D: never takes a parameter (e.g. `n`).
    Flag,
}

impl ModeClass {
    /// Class of the `index`-th `CHANMODES` group, if there is one.
    pub fn from_group(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::List),
            1 => Some(Self::Parameter),
            2 => Some(Self::ParameterOnSet),
            3 => Some(Self::Flag),
            _ => None,
        }
    }

    /// Returns true if a change of this class consumes a parameter.
    #[inline]
    pub fn takes_param(self, adding: bool) -> bool {
        match self {
            Self::List | Self::Parameter => true,
            Self::ParameterOnSet => adding,
            Self::Flag => false,
        }
    }
}

/// Prefix and mode-class tables for one connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilityTable {
    prefixes: Vec<(char, char)>,
    classes: HashMap<char, ModeClass>,
}

impl Default for CapabilityTable {
    fn default() -> Self {
        let mut classes = HashMap::new();
        classes.insert('b', ModeClass::List);
        classes.insert('k', ModeClass::Parameter);
        classes.insert('l', ModeClass::ParameterOnSet);
        for c in ['i', 'm', 'n', 'p', 's', 't'] {
            classes.insert(c, ModeClass::Flag);
        }

        Self {
            prefixes: vec![('o', '@'), ('v', '+')],
            classes,
        }
    }
}

impl CapabilityTable {
    /// Probe a single ISUPPORT token for `PREFIX=(<modes>)<symbols>`.
    ///
    /// Returns true when the token is a PREFIX token. The prefix table is
    /// only replaced when modes and symbols have the same length.
    pub fn apply_prefix_token(&mut self, token: &str) -> bool {
        let Some(spec) = PrefixSpec::parse(token) else {
            return false;
        };

        if spec.modes.chars().count() == spec.symbols.chars().count() {
            self.prefixes = spec.modes.chars().zip(spec.symbols.chars()).collect();
        } else {
            tracing::debug!(token, "PREFIX modes and symbols differ in length, ignoring");
        }
        true
    }

    /// Probe a single ISUPPORT token for `CHANMODES=<A>,<B>,<C>,<D>`.
    ///
    /// Returns true when recognised; the class table is then rebuilt from
    /// scratch. Groups past the fourth are ignored.
    pub fn apply_chanmodes_token(&mut self, token: &str) -> bool {
        let Some(value) = token.strip_prefix("CHANMODES=") else {
            return false;
        };
        if value.is_empty() || !value.chars().all(|c| c == ',' || c.is_ascii_alphabetic()) {
            return false;
        }

        let mut classes = HashMap::new();
        for (index, group) in value.split(',').enumerate() {
            let Some(class) = ModeClass::from_group(index) else {
                break;
            };
            for c in group.chars() {
                classes.insert(c, class);
            }
        }
        self.classes = classes;
        true
    }

    /// Run every token through the PREFIX probe, then the CHANMODES probe.
    pub fn apply_isupport<'a, I>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for token in tokens {
            if !self.apply_prefix_token(token) {
                self.apply_chanmodes_token(token);
            }
        }
    }

    /// Display symbol of a membership mode.
    pub fn prefix_symbol(&self, mode: char) -> Option<char> {
        self.prefixes
            .iter()
            .find(|(m, _)| *m == mode)
            .map(|(_, symbol)| *symbol)
    }

    /// Returns true if `mode` is a membership (prefix) mode.
    pub fn is_prefix_mode(&self, mode: char) -> bool {
        self.prefix_symbol(mode).is_some()
    }

    /// `CHANMODES` class of a mode.
    pub fn mode_class(&self, mode: char) -> Option<ModeClass> {
        self.classes.get(&mode).copied()
    }

    /// Membership modes with their symbols, highest rank first.
    pub fn prefixes(&self) -> &[(char, char)] {
        &self.prefixes
    }
}

/// Parsed `PREFIX=(modes)symbols` value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PrefixSpec<'a> {
    modes: &'a str,
    symbols: &'a str,
}

impl<'a> PrefixSpec<'a> {
    fn parse(token: &'a str) -> Option<Self> {
        let rest = token.strip_prefix("PREFIX=(")?;
        let close = rest.find(')')?;
        let modes = &rest[..close];
        let symbols = &rest[close + 1..];

        if modes.is_empty() || !modes.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        if symbols.is_empty() {
            return None;
        }
        Some(PrefixSpec { modes, symbols })
    }
}

/// Shared slot holding the current [`CapabilityTable`].
///
/// Readers take an [`Arc`] snapshot and never observe a half-built table.
#[derive(Debug, Default)]
pub struct SharedCapabilities {
    current: RwLock<Arc<CapabilityTable>>,
}

impl SharedCapabilities {
    /// Create a slot holding the default table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current table.
    pub fn snapshot(&self) -> Arc<CapabilityTable> {
        Arc::clone(&self.current.read())
    }

    /// Copy the current table, modify the copy and swap it in.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut CapabilityTable),
    {
        let mut slot = self.current.write();
        let mut next = CapabilityTable::clone(&slot);
        f(&mut next);
        *slot = Arc::new(next);
    }

    /// Go back to the default table.
    pub fn reset(&self) {
        *self.current.write() = Arc::new(CapabilityTable::default());
    }
}
