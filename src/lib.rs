//! # slirc-client
//!
//! A resilient IRC client engine built on Tokio.
//!
//! ## Features
//!
//! - Registration handshake with server password, nick collision retry and
//!   services authentication (NickServ, GameSurge)
//! - Two-tier output queue: registration and PONG lines jump ahead of chat
//! - ISUPPORT-aware channel mode interpretation (`PREFIX`, `CHANMODES`)
//! - CTCP VERSION / PING / TIME / FINGER answered automatically
//! - Liveness monitor that drops stale connections and reconnects
//! - Typed events delivered to listeners on a single processor task

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use slirc_client::{Client, Config, Event, EventManager};
//!
//! #[tokio::main]
//! async fn main() -> slirc_client::Result<()> {
//!     let events = Arc::new(EventManager::new());
//!     events.register(|event: &Event| println!("{}", event.name()));
//!
//!     let config = Config::builder("irc.libera.chat:6667")
//!         .nick("kitten")
//!         .real_name("A friendly bot")
//!         .build();
//!
//!     let client = Client::start(config, events).await?;
//!     client.add_channel(["#kitteh"]);
//!     client.wait().await;
//!     Ok(())
//! }
//! ```
//!
//! ### Interpreting Modes
//!
//! ```rust
//! use slirc_client::isupport::CapabilityTable;
//! use slirc_client::mode;
//!
//! let mut table = CapabilityTable::default();
//! table.apply_isupport(["PREFIX=(qov)~@+", "CHANMODES=b,k,l,imnpst"]);
//!
//! let changes = mode::interpret("+qk-l", &["alice", "secret"], &table);
//! let shown: Vec<String> = changes.iter().map(ToString::to_string).collect();
//! assert_eq!(shown, ["+q alice", "+k secret", "-l"]);
//! ```

pub mod actor;
pub mod auth;
pub mod casemap;
pub mod chan;
pub mod client;
pub mod config;
pub mod ctcp;
pub mod error;
pub mod event;
pub mod isupport;
pub mod line;
pub mod message;
pub mod mode;
pub mod response;
pub mod state;

mod dispatch;
mod processor;
mod transport;

pub use self::actor::Actor;
pub use self::auth::{Auth, AuthType};
pub use self::casemap::{irc_eq, irc_to_lower};
pub use self::chan::{ChannelExt, ChannelSet};
pub use self::client::Client;
pub use self::config::{Config, ConfigBuilder, ConfigKey, Timeouts};
pub use self::ctcp::{Ctcp, CtcpKind};
pub use self::error::{ClientError, DispatchError, ProtocolError, Result};
pub use self::event::{Event, EventManager, Listener, PrivateCtcpEvent};
pub use self::isupport::{CapabilityTable, ModeClass};
pub use self::line::{LineCodec, MAX_LINE_LEN};
pub use self::message::{Line, Verb};
pub use self::mode::ModeChange;
pub use self::response::Response;
pub use self::state::ConnectionState;
