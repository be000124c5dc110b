//! Echo bot example
//!
//! Connects to a server, joins a channel and repeats every channel message
//! that mentions the bot. Private messages are echoed back to the sender.
//!
//! ```text
//! RUST_LOG=slirc_client=debug cargo run --example echo_bot -- irc.libera.chat:6667 '#slirc-test'
//! ```

use std::sync::Arc;

use anyhow::Context;
use slirc_client::{Client, Config, Event, EventManager};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let server = args.next().unwrap_or_else(|| "irc.libera.chat:6667".to_owned());
    let channel = args.next().unwrap_or_else(|| "#slirc-test".to_owned());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let events = Arc::new(EventManager::new());
    events.register(move |event: &Event| match event {
        Event::ChannelMessage {
            actor,
            channel,
            message,
        } if message.to_ascii_lowercase().contains("echo") => {
            let text = format!("{}: {}", actor.name(), message);
            let _ = tx.send((channel.name().to_owned(), text));
        }
        Event::PrivateMessage { actor, message } => {
            let _ = tx.send((actor.name().to_owned(), message.clone()));
        }
        Event::Connected { server } => println!("✓ connected to {}", server),
        Event::Disconnected { reason } => println!("✗ disconnected: {}", reason),
        _ => {}
    });

    let config = Config::builder(server)
        .nick("slirc_echo")
        .user("echo")
        .real_name("slirc-client echo bot")
        .build();
    let client = Client::start(config, events)
        .await
        .context("could not connect")?;
    client.add_channel([channel.as_str()]);

    println!("--- Listening for messages (Ctrl+C to exit) ---");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            reply = rx.recv() => match reply {
                Some((target, text)) => {
                    if let Err(e) = client.send_message(&target, &text) {
                        eprintln!("could not reply: {}", e);
                    }
                }
                None => break,
            },
        }
    }

    client.shutdown(Some("Goodbye!"));
    client.wait().await;
    Ok(())
}
