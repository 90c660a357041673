//! `conversationbot chat` — talk to the bot from a terminal.
//!
//! Each line goes through the same dispatcher as Telegram messages, against
//! the configured snapshot, so a terminal conversation continues a Telegram
//! one for the same actor ID and vice versa.  Lines starting with `/` are
//! sent as commands; `/exit` and `/quit` leave the REPL.

use std::sync::Arc;

use cb_domain::config::Config;
use rustyline::error::ReadlineError;

use crate::bootstrap;
use crate::channel::console::ConsoleSender;
use crate::channel::{ChatId, InboundEvent};
use crate::dispatcher::Dispatcher;

pub async fn chat(config: &Config, actor: i64) -> anyhow::Result<()> {
    bootstrap::check_config(config)?;
    let (store, snapshot_path) = bootstrap::open_store(&config.storage);
    let dispatcher = Dispatcher::new(store, Arc::new(ConsoleSender), snapshot_path, 1);

    let mut rl = rustyline::DefaultEditor::new()?;

    eprintln!("conversationbot chat (actor {actor})");
    eprintln!("Try /start.  /exit or Ctrl+D to quit.");
    eprintln!();

    loop {
        match rl.readline("you> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed).ok();

                if matches!(trimmed, "/exit" | "/quit") {
                    break;
                }
                dispatcher.handle(console_event(actor, trimmed)).await;
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("(Use Ctrl+D or /exit to quit)");
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {e}");
                break;
            }
        }
    }

    dispatcher.flush().await;
    eprintln!("Goodbye!");
    Ok(())
}

/// The terminal has no entity markup; a leading `/` marks a command.
fn console_event(actor: i64, line: &str) -> InboundEvent {
    let mut event = if line.starts_with('/') {
        InboundEvent::command(actor, line)
    } else {
        InboundEvent::text(actor, line)
    };
    event.chat = ChatId(actor);
    event.sender = Some("console".into());
    event
}
