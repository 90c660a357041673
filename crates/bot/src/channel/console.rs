//! Terminal gateway used by `conversationbot chat`.

use async_trait::async_trait;
use cb_dialogue::{Reply, ReplyMarkup};
use cb_domain::error::Result;

use super::{ChatId, ReplySender};

/// Prints replies to stdout.  Menus are shown as a `[a | b]` hint line.
#[derive(Debug, Default)]
pub struct ConsoleSender;

#[async_trait]
impl ReplySender for ConsoleSender {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, _chat: ChatId, reply: &Reply) -> Result<()> {
        println!("{}", render(reply));
        Ok(())
    }
}

/// Terminal rendering of a reply.
pub fn render(reply: &Reply) -> String {
    let mut out = String::new();
    for (i, line) in reply.text.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(if i == 0 { "bot> " } else { "     " });
        out.push_str(line);
    }

    if let Some(ReplyMarkup::Menu(rows)) = &reply.markup {
        let buttons: Vec<&str> = rows.iter().flatten().map(String::as_str).collect();
        out.push_str("\n     [");
        out.push_str(&buttons.join(" | "));
        out.push(']');
    }
    out
}
