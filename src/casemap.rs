//! IRC case-mapping functions.
//!
//! IRC uses a special case-insensitive comparison where some characters
//! are considered equivalent (e.g., `[` and `{`). This implements the
//! `rfc1459` case mapping, which is what servers assume when they do not
//! advertise `CASEMAPPING`.

/// Fold one character using RFC 1459 rules.
///
/// In addition to ASCII lowercase conversion, this maps:
/// - `[` → `{`
/// - `]` → `}`
/// - `\` → `|`
/// - `~` → `^`
#[inline]
pub fn irc_fold(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => c.to_ascii_lowercase(),
        _ => c,
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(irc_fold).collect()
}

/// Compare two strings using IRC case-insensitive comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .chars()
            .zip(b.chars())
            .all(|(ca, cb)| irc_fold(ca) == irc_fold(cb))
}
