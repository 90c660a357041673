//! Messaging gateways.
//!
//! A gateway feeds [`InboundEvent`]s into an `mpsc` channel and delivers
//! replies through [`ReplySender`].  The dispatcher never sees wire formats.

pub mod console;
pub mod telegram;

use std::fmt;

use async_trait::async_trait;
use cb_dialogue::Reply;
use cb_domain::error::Result;
use cb_sessions::ActorId;

/// Conversation a reply is delivered to.  For private chats this equals the
/// actor's own ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One text message received from a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub actor: ActorId,
    pub chat: ChatId,
    pub text: String,
    /// The gateway recognised the text as a bot command.
    pub is_command: bool,
    /// Display name, for logs only.
    pub sender: Option<String>,
}

impl InboundEvent {
    /// A plain text message in the actor's private chat.
    pub fn text(actor: i64, text: impl Into<String>) -> Self {
        Self {
            actor: ActorId(actor),
            chat: ChatId(actor),
            text: text.into(),
            is_command: false,
            sender: None,
        }
    }

    /// A command (`/start`, `/show`, …) in the actor's private chat.
    pub fn command(actor: i64, text: impl Into<String>) -> Self {
        Self {
            is_command: true,
            ..Self::text(actor, text)
        }
    }
}

/// Outbound half of a gateway.
#[async_trait]
pub trait ReplySender: Send + Sync {
    /// Gateway name for logs (`"telegram"`, `"console"`).
    fn name(&self) -> &str;

    /// Deliver one reply.  Failures are reported, never retried here.
    async fn send(&self, chat: ChatId, reply: &Reply) -> Result<()>;
}
