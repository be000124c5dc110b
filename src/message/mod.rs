//! Protocol grammar decoder.
//!
//! Turns one raw line into its source, verb and parameters:
//!
//! ```text
//! :<source> <command|numeric> [params...] [:trailing]
//! ```
//!
//! Lines that do not start with a source, or that have fewer than two
//! tokens, are not errors: [`Line::parse`] returns `None` and the caller
//! drops them.
//!
//! # Example
//!
//! ```
//! use slirc_client::message::{Line, Verb};
//!
//! let line = Line::parse(":alice!a@host PRIVMSG #rust :hello there").unwrap();
//! assert_eq!(line.verb(), &Verb::Command("PRIVMSG"));
//! assert_eq!(line.params(), &["#rust", "hello there"]);
//!
//! let numeric = Line::parse(":irc.example.net 004 kitten irc.example.net v1").unwrap();
//! assert_eq!(numeric.numeric(), Some(4));
//!
//! assert!(Line::parse("PING :irc.example.net").is_none());
//! ```

mod nom_parser;

use crate::actor::Actor;

use self::nom_parser::{parse_head, split_params};

/// The command part of a decoded line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb<'a> {
    /// A three-digit numeric reply.
    Numeric(u16),
    /// A keyword command such as `PRIVMSG`.
    Command(&'a str),
}

impl<'a> Verb<'a> {
    fn parse(word: &'a str) -> Self {
        if word.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(code) = word.parse::<u16>() {
                return Verb::Numeric(code);
            }
        }
        Verb::Command(word)
    }
}

/// A decoded line borrowing from the raw input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line<'a> {
    raw: &'a str,
    source: &'a str,
    verb: Verb<'a>,
    params: Vec<&'a str>,
}

impl<'a> Line<'a> {
    /// Decode a raw line. Trailing CR/LF is ignored.
    ///
    /// Returns `None` for lines without a `:` source or without a verb.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let raw = raw.trim_end_matches(['\r', '\n']);
        let (rest, (source, verb)) = parse_head(raw).ok()?;

        Some(Line {
            raw,
            source,
            verb: Verb::parse(verb),
            params: split_params(rest),
        })
    }

    /// The raw line, without line terminator.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// The source prefix without its leading `:`.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Decode the source into an [`Actor`].
    pub fn actor(&self) -> Actor {
        Actor::parse(self.source)
    }

    /// The command or numeric.
    pub fn verb(&self) -> &Verb<'a> {
        &self.verb
    }

    /// The numeric code, if this line is a numeric reply.
    pub fn numeric(&self) -> Option<u16> {
        match self.verb {
            Verb::Numeric(code) => Some(code),
            Verb::Command(_) => None,
        }
    }

    /// The command word, if this line is a keyword command.
    pub fn command(&self) -> Option<&'a str> {
        match self.verb {
            Verb::Command(word) => Some(word),
            Verb::Numeric(_) => None,
        }
    }

    /// Decoded parameters; the trailing parameter (if any) is last.
    pub fn params(&self) -> &[&'a str] {
        &self.params
    }

    /// One parameter by index.
    pub fn param(&self, index: usize) -> Option<&'a str> {
        self.params.get(index).copied()
    }

    /// Every space-delimited word of the raw line, source and verb included.
    ///
    /// Unlike [`params`](Self::params) this does not treat `:` specially.
    pub fn words(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.raw.split(' ').filter(|w| !w.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_command() {
        let line = Line::parse(":nick!user@host PRIVMSG #channel :Hello, world!").unwrap();
        assert_eq!(line.source(), "nick!user@host");
        assert_eq!(line.command(), Some("PRIVMSG"));
        assert_eq!(line.numeric(), None);
        assert_eq!(line.params(), &["#channel", "Hello, world!"]);
        assert_eq!(line.actor().nick(), Some("nick"));
    }

    #[test]
    fn test_numeric_reply() {
        let line = Line::parse(":irc.example.net 433 * kitten :Nickname is already in use").unwrap();
        assert_eq!(line.verb(), &Verb::Numeric(433));
        assert_eq!(line.param(1), Some("kitten"));
        assert!(line.actor().is_server());
    }

    #[test]
    fn test_numeric_parse_failure_is_keyword() {
        let line = Line::parse(":server 99999 x").unwrap();
        assert_eq!(line.verb(), &Verb::Command("99999"));
        let line = Line::parse(":server 4a2 x").unwrap();
        assert_eq!(line.command(), Some("4a2"));
    }

    #[test]
    fn test_discarded_lines() {
        assert!(Line::parse("").is_none());
        assert!(Line::parse("PING :server").is_none());
        assert!(Line::parse(":onlysource").is_none());
        assert!(Line::parse("ERROR :Closing link").is_none());
    }

    #[test]
    fn test_line_terminators_ignored() {
        let line = Line::parse(":s 001 me :Welcome\r\n").unwrap();
        assert_eq!(line.raw(), ":s 001 me :Welcome");
        assert_eq!(line.param(1), Some("Welcome"));
    }

    #[test]
    fn test_no_params() {
        let line = Line::parse(":alice QUIT").unwrap();
        assert!(line.params().is_empty());
        assert_eq!(line.param(0), None);
    }

    #[test]
    fn test_words() {
        let line = Line::parse(":s 005 me PREFIX=(ov)@+ CHANMODES=b,k,l,imnpst :are supported").unwrap();
        let words: Vec<_> = line.words().collect();
        assert_eq!(
            words,
            vec![
                ":s",
                "005",
                "me",
                "PREFIX=(ov)@+",
                "CHANMODES=b,k,l,imnpst",
                ":are",
                "supported"
            ]
        );
    }
}
