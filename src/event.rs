//! Events published by the session and the synchronous event manager.
//!
//! Every decoded line that means something to an application becomes an
//! [`Event`] and is handed to [`EventManager::call_event`]. Listeners run
//! on the line processor task, one after another, in registration order.
//!
//! # Example
//!
//! ```
//! use slirc_client::event::{Event, EventManager};
//!
//! let events = EventManager::new();
//! events.register(|event: &Event| {
//!     if let Event::PrivateCtcp(ctcp) = event {
//!         if ctcp.payload() == "VERSION" {
//!             ctcp.set_reply(Some("VERSION my-bot 1.0".to_owned()));
//!         }
//!     }
//! });
//! assert_eq!(events.len(), 1);
//! ```

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::error;

use crate::actor::Actor;
use crate::mode::ModeChange;

/// Something that happened on the connection.
#[derive(Debug)]
#[non_exhaustive]
pub enum Event {
    /// A PRIVMSG to a channel we are in.
    ChannelMessage {
        /// Sender.
        actor: Actor,
        /// Target channel.
        channel: Actor,
        /// Message text.
        message: String,
    },
    /// A PRIVMSG addressed to our nick.
    PrivateMessage {
        /// Sender.
        actor: Actor,
        /// Message text.
        message: String,
    },
    /// A NOTICE to a channel we are in.
    ChannelNotice {
        /// Sender.
        actor: Actor,
        /// Target channel.
        channel: Actor,
        /// Notice text.
        message: String,
    },
    /// A NOTICE addressed to our nick.
    PrivateNotice {
        /// Sender.
        actor: Actor,
        /// Notice text.
        message: String,
    },
    /// A CTCP request sent to a channel.
    ChannelCtcp {
        /// Sender.
        actor: Actor,
        /// Target channel.
        channel: Actor,
        /// Unwrapped CTCP payload.
        payload: String,
    },
    /// A CTCP request sent to us; see [`PrivateCtcpEvent`].
    PrivateCtcp(PrivateCtcpEvent),
    /// One mode change on a channel.
    ChannelMode {
        /// Who set the mode.
        actor: Actor,
        /// Channel the mode applies to.
        channel: Actor,
        /// The change itself.
        change: ModeChange,
    },
    /// An INVITE.
    Invite {
        /// Who invited.
        actor: Actor,
        /// Invited nick.
        target: String,
        /// Channel invited to.
        channel: String,
    },
    /// Someone joined a channel.
    Join {
        /// Who joined.
        actor: Actor,
        /// Channel joined.
        channel: Actor,
    },
    /// Someone left a channel.
    Part {
        /// Who left.
        actor: Actor,
        /// Channel left.
        channel: Actor,
        /// Part message.
        reason: Option<String>,
    },
    /// Someone disconnected from the network.
    Quit {
        /// Who quit.
        actor: Actor,
        /// Quit message.
        reason: Option<String>,
    },
    /// Someone was kicked from a channel.
    Kick {
        /// Who kicked.
        actor: Actor,
        /// Channel kicked from.
        channel: Actor,
        /// Nick that was kicked.
        target: String,
        /// Kick message.
        reason: Option<String>,
    },
    /// Someone changed nick.
    NickChange {
        /// The old identity.
        actor: Actor,
        /// The new nickname.
        new_nick: String,
    },
    /// Registration completed and the session is live.
    Connected {
        /// `host:port` of the server.
        server: String,
    },
    /// The connection was dropped by the liveness monitor.
    Disconnected {
        /// Why the connection was dropped.
        reason: String,
    },
}

impl Event {
    /// Short name of the variant, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Event::ChannelMessage { .. } => "channel_message",
            Event::PrivateMessage { .. } => "private_message",
            Event::ChannelNotice { .. } => "channel_notice",
            Event::PrivateNotice { .. } => "private_notice",
            Event::ChannelCtcp { .. } => "channel_ctcp",
            Event::PrivateCtcp(_) => "private_ctcp",
            Event::ChannelMode { .. } => "channel_mode",
            Event::Invite { .. } => "invite",
            Event::Join { .. } => "join",
            Event::Part { .. } => "part",
            Event::Quit { .. } => "quit",
            Event::Kick { .. } => "kick",
            Event::NickChange { .. } => "nick_change",
            Event::Connected { .. } => "connected",
            Event::Disconnected { .. } => "disconnected",
        }
    }
}

/// A private CTCP request with an overridable reply.
///
/// The engine fills in the built-in reply (if any) before publishing.
/// Listeners may replace it, or clear it to send nothing; the value left
/// after all listeners ran is sent back.
#[derive(Debug)]
pub struct PrivateCtcpEvent {
    actor: Actor,
    payload: String,
    reply: Mutex<Option<String>>,
}

impl PrivateCtcpEvent {
    /// Create the event with the proposed reply.
    pub fn new(actor: Actor, payload: impl Into<String>, reply: Option<String>) -> Self {
        Self {
            actor,
            payload: payload.into(),
            reply: Mutex::new(reply),
        }
    }

    /// Sender of the request.
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Unwrapped CTCP payload, e.g. `PING 1234`.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// The reply that will be sent.
    pub fn reply(&self) -> Option<String> {
        self.reply.lock().clone()
    }

    /// Replace the reply; `None` suppresses it.
    pub fn set_reply(&self, reply: Option<String>) {
        *self.reply.lock() = reply;
    }

    /// Consume the event, returning the final reply.
    pub fn into_reply(self) -> Option<String> {
        self.reply.into_inner()
    }
}

/// Receives published events.
///
/// Implemented for every `Fn(&Event) + Send + Sync` closure.
pub trait Listener: Send + Sync {
    /// Handle one event.
    fn on_event(&self, event: &Event);
}

impl<F> Listener for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn on_event(&self, event: &Event) {
        self(event)
    }
}

/// Fire-and-forget synchronous publish/subscribe hub.
#[derive(Default)]
pub struct EventManager {
    listeners: RwLock<Vec<Arc<dyn Listener>>>,
}

impl EventManager {
    /// Create a manager with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener. Listeners are called in registration order.
    pub fn register<L>(&self, listener: L)
    where
        L: Listener + 'static,
    {
        self.listeners.write().push(Arc::new(listener));
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// Returns true when nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Publish an event to every listener.
    ///
    /// A panicking listener is logged and skipped; the remaining listeners
    /// still see the event.
    pub fn call_event(&self, event: &Event) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            let result = catch_unwind(AssertUnwindSafe(|| listener.on_event(event)));
            if result.is_err() {
                error!(event = event.name(), "event listener panicked");
            }
        }
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("listener_count", &self.len())
            .finish()
    }
}
