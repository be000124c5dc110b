//! Nom-based line head parser.
//!
//! Splits the `:<source> <verb>` head off a raw line; the remainder is
//! handed to [`split_params`].

use nom::{
    bytes::complete::take_while1,
    character::complete::char,
    error::{context, VerboseError},
    sequence::preceded,
    IResult,
};

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// Parse the source prefix (the part after `:` and before the first space).
fn parse_source(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing line source",
        preceded(char(':'), take_while1(|c: char| c != ' ')),
    )(input)
}

/// Parse the command word or numeric.
fn parse_verb(input: &str) -> ParseResult<&str, &str> {
    context("parsing command", take_while1(|c: char| c != ' '))(input)
}

/// Parse `:<source> <verb>`, returning the unparsed rest of the line.
///
/// Lines without a source or without a verb fail.
pub(crate) fn parse_head(input: &str) -> ParseResult<&str, (&str, &str)> {
    let (input, source) = parse_source(input)?;
    let (input, _) = context("expecting space after source", char(' '))(input)?;
    let (input, verb) = parse_verb(input)?;
    Ok((input, (source, verb)))
}

/// Split the parameter section of a line.
///
/// `rest` is whatever followed the verb, starting with its separating
/// space. A token starting with `:` opens the trailing parameter, which
/// runs to the end of the line with spaces preserved. Empty tokens from
/// doubled spaces are skipped.
pub(crate) fn split_params(rest: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut rest = rest;

    while let Some(after) = rest.strip_prefix(' ') {
        if let Some(trailing) = after.strip_prefix(':') {
            params.push(trailing);
            break;
        }

        let end = after.find(' ').unwrap_or(after.len());
        let token = &after[..end];
        if !token.is_empty() {
            params.push(token);
        }
        rest = &after[end..];
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head() {
        let (rest, (source, verb)) = parse_head(":nick!u@h PRIVMSG #c :hi").unwrap();
        assert_eq!(source, "nick!u@h");
        assert_eq!(verb, "PRIVMSG");
        assert_eq!(rest, " #c :hi");
    }

    #[test]
    fn test_head_requires_source() {
        assert!(parse_head("PING :server").is_err());
        assert!(parse_head(":lonely").is_err());
        assert!(parse_head(": CMD").is_err());
    }

    #[test]
    fn test_params() {
        assert_eq!(split_params(" #c +o alice"), vec!["#c", "+o", "alice"]);
        assert_eq!(split_params(" #c :hello there"), vec!["#c", "hello there"]);
        assert_eq!(split_params(" a  b"), vec!["a", "b"]);
        assert_eq!(split_params(" :"), vec![""]);
        assert!(split_params("").is_empty());
    }
}
