//! IRC numeric replies the client engine knows by name.
//!
//! Numerics are three-digit codes sent by servers as the command word of a
//! line. Only the replies the session reacts to, or deliberately ignores,
//! are listed here; anything else decodes as [`Verb::Numeric`] and is left
//! to listeners.
//!
//! [`Verb::Numeric`]: crate::message::Verb::Numeric
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol
//! - Modern IRC documentation: <https://modern.ircdocs.horse/>

#![allow(non_camel_case_types)]

use std::fmt;
use std::str::FromStr;

/// Declares [`Response`] and its code lookup from one table.
macro_rules! responses {
    ($($(#[$meta:meta])* $name:ident = $code:literal,)*) => {
        /// A numeric reply known by name.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u16)]
        #[non_exhaustive]
        pub enum Response {
            $($(#[$meta])* $name = $code,)*
        }

        impl Response {
            /// Look up a code; `None` for codes not listed here.
            pub fn from_code(code: u16) -> Option<Response> {
                match code {
                    $($code => Some(Response::$name),)*
                    _ => None,
                }
            }
        }
    };
}

responses! {
    /// `001`, first line after a successful registration.
    RPL_WELCOME = 1,
    /// `002`, server host and version.
    RPL_YOURHOST = 2,
    /// `003`, server creation date.
    RPL_CREATED = 3,
    /// `004`, server name, version and modes. Ends the handshake.
    RPL_MYINFO = 4,
    /// `005`, ISUPPORT tokens.
    RPL_ISUPPORT = 5,

    /// `250`, highest connection count.
    RPL_STATSCONN = 250,
    /// `251`, users and servers on the network.
    RPL_LUSERCLIENT = 251,
    /// `252`, operators online.
    RPL_LUSEROP = 252,
    /// `253`, unregistered connections.
    RPL_LUSERUNKNOWN = 253,
    /// `254`, channels formed.
    RPL_LUSERCHANNELS = 254,
    /// `255`, local clients and servers.
    RPL_LUSERME = 255,
    /// `265`, local user counts.
    RPL_LOCALUSERS = 265,
    /// `266`, global user counts.
    RPL_GLOBALUSERS = 266,

    /// `332`, channel topic on join.
    RPL_TOPIC = 332,
    /// `333`, who set the topic and when.
    RPL_TOPICWHOTIME = 333,
    /// `353`, channel member list.
    RPL_NAMREPLY = 353,
    /// `366`, end of the member list.
    RPL_ENDOFNAMES = 366,

    /// `372`, one MOTD line.
    RPL_MOTD = 372,
    /// `375`, MOTD header.
    RPL_MOTDSTART = 375,
    /// `376`, MOTD trailer.
    RPL_ENDOFMOTD = 376,

    /// `401`, target nick or channel does not exist.
    ERR_NOSUCHNICK = 401,
    /// `403`, channel does not exist.
    ERR_NOSUCHCHANNEL = 403,
    /// `404`, message refused by the channel.
    ERR_CANNOTSENDTOCHAN = 404,
    /// `421`, command not understood.
    ERR_UNKNOWNCOMMAND = 421,
    /// `422`, the server has no MOTD. Not fatal.
    ERR_NOMOTD = 422,
    /// `431`, `NICK` without a nickname.
    ERR_NONICKNAMEGIVEN = 431,
    /// `432`, nickname rejected by the server.
    ERR_ERRONEOUSNICKNAME = 432,
    /// `433`, nickname taken. Retried during registration.
    ERR_NICKNAMEINUSE = 433,
    /// `436`, nickname collision across servers.
    ERR_NICKCOLLISION = 436,
    /// `437`, nick or channel temporarily held.
    ERR_UNAVAILRESOURCE = 437,
    /// `451`, command sent before registration.
    ERR_NOTREGISTERED = 451,
    /// `461`, missing parameters.
    ERR_NEEDMOREPARAMS = 461,
    /// `462`, registration sent twice.
    ERR_ALREADYREGISTERED = 462,
    /// `464`, wrong server password.
    ERR_PASSWDMISMATCH = 464,
    /// `465`, banned from the server.
    ERR_YOUREBANNEDCREEP = 465,
    /// `471`, channel user limit reached.
    ERR_CHANNELISFULL = 471,
    /// `473`, channel is invite-only.
    ERR_INVITEONLYCHAN = 473,
    /// `474`, banned from the channel.
    ERR_BANNEDFROMCHAN = 474,
    /// `475`, wrong channel key.
    ERR_BADCHANNELKEY = 475,
    /// `482`, channel operator status required.
    ERR_CHANOPRIVSNEEDED = 482,
}

impl Response {
    /// The numeric code.
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Returns true for 4xx and 5xx codes.
    #[inline]
    pub fn is_error(&self) -> bool {
        is_error_code(self.code())
    }

    /// Returns true for the 001-099 registration burst.
    #[inline]
    pub fn is_registration(&self) -> bool {
        self.code() < 100
    }
}

/// Returns true for codes in the 400-599 error range, known or not.
#[inline]
pub fn is_error_code(code: u16) -> bool {
    (400..600).contains(&code)
}

impl FromStr for Response {
    type Err = ParseResponseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u16 = s.parse().map_err(|_| ParseResponseError::InvalidFormat)?;
        Response::from_code(code).ok_or(ParseResponseError::UnknownCode(code))
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

/// Error when parsing a response code
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseResponseError {
    /// The string was not a valid number
    InvalidFormat,
    /// The numeric code is not a known response
    UnknownCode(u16),
}

impl fmt::Display for ParseResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat => write!(f, "invalid response code format"),
            Self::UnknownCode(code) => write!(f, "unknown response code: {}", code),
        }
    }
}

impl std::error::Error for ParseResponseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_code() {
        assert_eq!(Response::RPL_WELCOME.code(), 1);
        assert_eq!(Response::ERR_NICKNAMEINUSE.code(), 433);
        assert_eq!(Response::RPL_ENDOFMOTD.code(), 376);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Response::from_code(4), Some(Response::RPL_MYINFO));
        assert_eq!(Response::from_code(433), Some(Response::ERR_NICKNAMEINUSE));
        assert_eq!(Response::from_code(999), None);
    }

    #[test]
    fn test_is_error() {
        assert!(!Response::RPL_WELCOME.is_error());
        assert!(Response::ERR_NICKNAMEINUSE.is_error());
        assert!(Response::ERR_NOMOTD.is_error());
        assert!(is_error_code(599));
        assert!(!is_error_code(600));
        assert!(Response::RPL_ISUPPORT.is_registration());
    }

    #[test]
    fn test_parse() {
        assert_eq!("001".parse::<Response>().unwrap(), Response::RPL_WELCOME);
        assert_eq!(
            "465".parse::<Response>(),
            Ok(Response::ERR_YOUREBANNEDCREEP)
        );
        assert_eq!("abc".parse::<Response>(), Err(ParseResponseError::InvalidFormat));
        assert_eq!("999".parse::<Response>(), Err(ParseResponseError::UnknownCode(999)));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Response::RPL_WELCOME), "001");
        assert_eq!(format!("{}", Response::ERR_NICKNAMEINUSE), "433");
    }
}
