//! Channel mode changes.
//!
//! A MODE line such as `MODE #chan +ov-k alice bob secret` is read against
//! the connection's [`CapabilityTable`](crate::isupport::CapabilityTable)
//! and turned into one [`ModeChange`] per flag character. See
//! [`interpret`].

mod parse;

use std::fmt;

pub use self::parse::interpret;

/// One resolved mode change.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeChange {
    /// True for `+`, false for `-`.
    pub adding: bool,
    /// The mode character.
    pub mode: char,
    /// The parameter consumed by this change, if any.
    pub argument: Option<String>,
}

impl ModeChange {
    /// Create a change without a parameter.
    pub fn new(adding: bool, mode: char) -> Self {
        Self {
            adding,
            mode,
            argument: None,
        }
    }

    /// Create a change carrying a parameter.
    pub fn with_argument(adding: bool, mode: char, argument: impl Into<String>) -> Self {
        Self {
            adding,
            mode,
            argument: Some(argument.into()),
        }
    }
}

impl fmt::Display for ModeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.adding { '+' } else { '-' };
        match &self.argument {
            Some(arg) => write!(f, "{}{} {}", sign, self.mode, arg),
            None => write!(f, "{}{}", sign, self.mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ModeChange::new(true, 'n').to_string(), "+n");
        assert_eq!(
            ModeChange::with_argument(false, 'o', "alice").to_string(),
            "-o alice"
        );
    }
}
