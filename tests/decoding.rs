//! Integration tests for the line decoder and mode interpretation as seen
//! through the public API.

use slirc_client::isupport::CapabilityTable;
use slirc_client::{mode, Actor, Ctcp, CtcpKind, Line, Response, Verb};

#[test]
fn test_welcome_numeric() {
    let line = Line::parse(":irc.example.net 001 kitten :Welcome to the network").unwrap();
    assert_eq!(line.numeric(), Some(Response::RPL_WELCOME.code()));
    assert_eq!(line.params(), &["kitten", "Welcome to the network"]);
    assert!(line.actor().is_server());
}

#[test]
fn test_user_source_and_trailing() {
    let line = Line::parse(":alice!~a@host.example PRIVMSG #kitteh :ping pong : colons").unwrap();
    assert_eq!(line.verb(), &Verb::Command("PRIVMSG"));
    assert_eq!(line.param(1), Some("ping pong : colons"));

    match line.actor() {
        Actor::User { nick, user, host } => {
            assert_eq!(nick, "alice");
            assert_eq!(user.as_deref(), Some("~a"));
            assert_eq!(host.as_deref(), Some("host.example"));
        }
        other => panic!("expected a user, got {other:?}"),
    }
}

#[test]
fn test_lines_without_source_are_dropped() {
    assert!(Line::parse("PING :irc.example.net").is_none());
    assert!(Line::parse("").is_none());
    assert!(Line::parse(":lonely").is_none());
}

#[test]
fn test_numeric_needs_all_digits() {
    let line = Line::parse(":s 4x4 kitten").unwrap();
    assert_eq!(line.numeric(), None);
    assert_eq!(line.command(), Some("4x4"));
}

#[test]
fn test_isupport_then_modes() {
    let raw = ":irc.example.net 005 kitten PREFIX=(ohv)@%+ CHANMODES=beI,k,l,imnpst :are supported";
    let line = Line::parse(raw).unwrap();

    let mut table = CapabilityTable::default();
    table.apply_isupport(line.words().skip(2));
    assert_eq!(table.prefix_symbol('h'), Some('%'));

    let changes = mode::interpret("+hI-k+l", &["bob", "*!*@friend", "key", "25"], &table);
    let shown: Vec<String> = changes.iter().map(ToString::to_string).collect();
    assert_eq!(shown, ["+h bob", "+I *!*@friend", "-k key", "+l 25"]);
}

#[test]
fn test_ctcp_framing() {
    let line = Line::parse(":alice!a@h PRIVMSG kitten :\x01PING 12345\x01").unwrap();
    let payload = slirc_client::ctcp::unwrap(line.param(1).unwrap()).unwrap();
    let ctcp = Ctcp::parse(payload).unwrap();
    assert_eq!(ctcp.kind, CtcpKind::Ping);
    assert_eq!(
        slirc_client::ctcp::builtin_reply(payload).as_deref(),
        Some("PING 12345")
    );
}
