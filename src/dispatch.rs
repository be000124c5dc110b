//! Command and numeric dispatch.
//!
//! Decoded lines are routed through two lookup tables built once per
//! session: one keyed by numeric code, one by upper-case command word.
//! Handlers are plain functions over the session core. Lines nobody
//! handles are dropped.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::actor::Actor;
use crate::client::Core;
use crate::ctcp;
use crate::error::DispatchError;
use crate::event::{Event, PrivateCtcpEvent};
use crate::message::{Line, Verb};
use crate::mode;
use crate::response::Response;
use crate::state::MessageTarget;

type Handler = fn(&Core, &Line<'_>) -> Result<(), DispatchError>;

/// Numerics that are known and deliberately ignored.
const INFORMATIONAL: &[Response] = &[
    Response::RPL_WELCOME,
    Response::RPL_YOURHOST,
    Response::RPL_CREATED,
    Response::RPL_MYINFO,
    Response::RPL_STATSCONN,
    Response::RPL_LUSERCLIENT,
    Response::RPL_LUSEROP,
    Response::RPL_LUSERUNKNOWN,
    Response::RPL_LUSERCHANNELS,
    Response::RPL_LUSERME,
    Response::RPL_LOCALUSERS,
    Response::RPL_GLOBALUSERS,
    Response::RPL_TOPIC,
    Response::RPL_TOPICWHOTIME,
    Response::RPL_NAMREPLY,
    Response::RPL_ENDOFNAMES,
    Response::RPL_MOTD,
    Response::RPL_MOTDSTART,
    Response::RPL_ENDOFMOTD,
    Response::ERR_NOMOTD,
];

/// Routes decoded lines to their handlers.
pub(crate) struct Dispatcher {
    numerics: HashMap<u16, Handler>,
    commands: HashMap<&'static str, Handler>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Build the dispatch tables.
    pub(crate) fn new() -> Self {
        let mut numerics: HashMap<u16, Handler> = HashMap::new();
        for response in INFORMATIONAL {
            numerics.insert(response.code(), ignore);
        }
        numerics.insert(Response::RPL_ISUPPORT.code(), isupport);
        numerics.insert(Response::ERR_NICKNAMEINUSE.code(), nick_in_use);

        let mut commands: HashMap<&'static str, Handler> = HashMap::new();
        commands.insert("PRIVMSG", privmsg);
        commands.insert("NOTICE", notice);
        commands.insert("MODE", channel_mode);
        commands.insert("INVITE", invite);
        commands.insert("JOIN", join);
        commands.insert("PART", part);
        commands.insert("QUIT", quit);
        commands.insert("KICK", kick);
        commands.insert("NICK", nick);

        Self { numerics, commands }
    }

    /// Returns true if `numeric` has a handler, even a no-op one.
    pub(crate) fn handles(&self, numeric: u16) -> bool {
        self.numerics.contains_key(&numeric)
    }

    /// Decode and dispatch one raw line.
    pub(crate) fn dispatch(&self, core: &Core, raw: &str) -> Result<(), DispatchError> {
        let Some(line) = Line::parse(raw) else {
            trace!(raw, "discarding undecodable line");
            return Ok(());
        };

        let handler = match line.verb() {
            Verb::Numeric(code) => self.numerics.get(code),
            Verb::Command(word) => self.commands.get(word.to_ascii_uppercase().as_str()),
        };

        match handler {
            Some(handler) => handler(core, &line),
            None => {
                trace!(verb = ?line.verb(), "unhandled line");
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("numerics", &self.numerics.len())
            .field("commands", &self.commands.len())
            .finish()
    }
}

fn require<'a>(line: &Line<'a>, index: usize) -> Result<&'a str, DispatchError> {
    line.param(index).ok_or_else(|| DispatchError::MissingParameter {
        command: match line.verb() {
            Verb::Numeric(code) => format!("{:03}", code),
            Verb::Command(word) => word.to_ascii_uppercase(),
        },
        index,
    })
}

fn ignore(_core: &Core, _line: &Line<'_>) -> Result<(), DispatchError> {
    Ok(())
}

fn isupport(core: &Core, line: &Line<'_>) -> Result<(), DispatchError> {
    core.caps.update(|table| table.apply_isupport(line.words().skip(2)));
    debug!(capabilities = ?core.caps.snapshot(), "capabilities updated");
    Ok(())
}

fn nick_in_use(core: &Core, _line: &Line<'_>) -> Result<(), DispatchError> {
    if core.state.is_connected() {
        return Ok(());
    }
    let nick = core.state.collide_nick();
    debug!(%nick, "nickname in use, retrying");
    core.send(format!("NICK {}", nick), true);
    Ok(())
}

fn privmsg(core: &Core, line: &Line<'_>) -> Result<(), DispatchError> {
    let target = require(line, 0)?;
    let body = require(line, 1)?;
    let actor = line.actor();

    if let Some(payload) = ctcp::unwrap(body) {
        handle_ctcp(core, actor, target, payload);
        return Ok(());
    }

    let event = match core.state.target_of(target) {
        MessageTarget::Channel => Event::ChannelMessage {
            actor,
            channel: Actor::channel(target),
            message: body.to_owned(),
        },
        MessageTarget::Private => Event::PrivateMessage {
            actor,
            message: body.to_owned(),
        },
        MessageTarget::Unknown => return Ok(()),
    };
    core.events.call_event(&event);
    Ok(())
}

fn handle_ctcp(core: &Core, actor: Actor, target: &str, payload: &str) {
    let reply = match core.state.target_of(target) {
        MessageTarget::Private => {
            let event = Event::PrivateCtcp(PrivateCtcpEvent::new(
                actor.clone(),
                payload,
                ctcp::builtin_reply(payload),
            ));
            core.events.call_event(&event);
            match event {
                Event::PrivateCtcp(ctcp) => ctcp.into_reply(),
                _ => None,
            }
        }
        MessageTarget::Channel => {
            core.events.call_event(&Event::ChannelCtcp {
                actor: actor.clone(),
                channel: Actor::channel(target),
                payload: payload.to_owned(),
            });
            None
        }
        MessageTarget::Unknown => None,
    };

    if let Some(reply) = reply.filter(|r| !r.is_empty()) {
        core.send(
            format!("NOTICE {} :{}", actor.name(), ctcp::wrap(&reply)),
            false,
        );
    }
}

fn notice(core: &Core, line: &Line<'_>) -> Result<(), DispatchError> {
    let target = require(line, 0)?;
    let message = require(line, 1)?.to_owned();
    let actor = line.actor();

    let event = match core.state.target_of(target) {
        MessageTarget::Channel => Event::ChannelNotice {
            actor,
            channel: Actor::channel(target),
            message,
        },
        MessageTarget::Private => Event::PrivateNotice { actor, message },
        MessageTarget::Unknown => return Ok(()),
    };
    core.events.call_event(&event);
    Ok(())
}

fn channel_mode(core: &Core, line: &Line<'_>) -> Result<(), DispatchError> {
    let target = require(line, 0)?;
    if core.state.target_of(target) != MessageTarget::Channel {
        return Ok(());
    }
    let flags = require(line, 1)?;

    let table = core.caps.snapshot();
    let actor = line.actor();
    let channel = Actor::channel(target);
    for change in mode::interpret(flags, &line.params()[2..], &table) {
        core.events.call_event(&Event::ChannelMode {
            actor: actor.clone(),
            channel: channel.clone(),
            change,
        });
    }
    Ok(())
}

fn invite(core: &Core, line: &Line<'_>) -> Result<(), DispatchError> {
    let target = require(line, 0)?;
    let channel = require(line, 1)?;

    if core.state.target_of(target) == MessageTarget::Private
        && core.state.channels().contains(channel)
    {
        core.send(format!("JOIN {}", channel), false);
    }

    core.events.call_event(&Event::Invite {
        actor: line.actor(),
        target: target.to_owned(),
        channel: channel.to_owned(),
    });
    Ok(())
}

fn join(core: &Core, line: &Line<'_>) -> Result<(), DispatchError> {
    let channel = require(line, 0)?;
    core.events.call_event(&Event::Join {
        actor: line.actor(),
        channel: Actor::channel(channel),
    });
    Ok(())
}

fn part(core: &Core, line: &Line<'_>) -> Result<(), DispatchError> {
    let channel = require(line, 0)?;
    core.events.call_event(&Event::Part {
        actor: line.actor(),
        channel: Actor::channel(channel),
        reason: line.param(1).map(str::to_owned),
    });
    Ok(())
}

fn quit(core: &Core, line: &Line<'_>) -> Result<(), DispatchError> {
    core.events.call_event(&Event::Quit {
        actor: line.actor(),
        reason: line.param(0).map(str::to_owned),
    });
    Ok(())
}

fn kick(core: &Core, line: &Line<'_>) -> Result<(), DispatchError> {
    let channel = require(line, 0)?;
    let target = require(line, 1)?;
    core.events.call_event(&Event::Kick {
        actor: line.actor(),
        channel: Actor::channel(channel),
        target: target.to_owned(),
        reason: line.param(2).map(str::to_owned),
    });
    Ok(())
}

fn nick(core: &Core, line: &Line<'_>) -> Result<(), DispatchError> {
    let new_nick = require(line, 0)?;
    let actor = line.actor();

    if actor.nick().is_some_and(|old| core.state.is_me(old)) {
        debug!(%new_nick, "our nick changed");
        core.state.set_current_nick(new_nick);
    }

    core.events.call_event(&Event::NickChange {
        actor,
        new_nick: new_nick.to_owned(),
    });
    Ok(())
}
