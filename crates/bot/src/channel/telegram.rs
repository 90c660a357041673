//! Telegram Bot API gateway.
//!
//! Inbound: `getUpdates` long polling, one [`InboundEvent`] per text message.
//! Outbound: `sendMessage`, with the dialogue's menu rendered as a reply
//! keyboard.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cb_dialogue::{Reply, ReplyMarkup};
use cb_domain::config::TelegramConfig;
use cb_domain::error::{Error, Result};
use cb_sessions::ActorId;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{ChatId, InboundEvent, ReplySender};

const GATEWAY: &str = "telegram";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Bot API client.  Created once; the `reqwest::Client` pools connections
/// for both the poller and reply delivery.
#[derive(Debug, Clone)]
pub struct TelegramGateway {
    http: Client,
    /// `{api_base_url}/bot{token}`.  Never logged.
    endpoint: String,
    poll_timeout_secs: u64,
    retry_backoff: Duration,
}

impl TelegramGateway {
    pub fn new(cfg: &TelegramConfig, token: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/bot{}", cfg.api_base_url.trim_end_matches('/'), token),
            poll_timeout_secs: cfg.poll_timeout_secs,
            retry_backoff: Duration::from_millis(cfg.retry_backoff_ms),
        })
    }

    /// Check the token.  Returns the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me: User = self.call("getMe", &serde_json::json!({})).await?;
        Ok(me.username.unwrap_or(me.first_name))
    }

    /// Long-poll for updates and push text messages into `tx` until
    /// `shutdown` fires or the receiver is dropped.  Dropping `tx` on return
    /// closes the inbound stream.
    ///
    /// Before returning, the offset reached so far is confirmed to Telegram
    /// so the next start does not receive the same updates again.
    pub async fn poll(
        self: Arc<Self>,
        tx: mpsc::Sender<InboundEvent>,
        shutdown: CancellationToken,
    ) {
        let mut offset: i64 = 0;
        tracing::info!(timeout_secs = self.poll_timeout_secs, "telegram poller started");

        'poll: loop {
            let batch = tokio::select! {
                _ = shutdown.cancelled() => break,
                batch = self.get_updates(offset, self.poll_timeout_secs) => batch,
            };

            match batch {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        let Some(event) = update.message.and_then(to_inbound) else {
                            tracing::debug!(update_id = update.update_id, "skipping non-text update");
                            continue;
                        };
                        if tx.send(event).await.is_err() {
                            tracing::info!("dispatcher gone, telegram poller stopping");
                            break 'poll;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, backoff_ms = self.retry_backoff.as_millis() as u64, "getUpdates failed");
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.retry_backoff) => {}
                    }
                }
            }
        }

        self.confirm(offset).await;
        tracing::info!("telegram poller stopped");
    }

    /// Confirm every update below `offset` without waiting for new ones.
    async fn confirm(&self, offset: i64) {
        if offset == 0 {
            return;
        }
        match self.get_updates(offset, 0).await {
            Ok(_) => tracing::debug!(offset, "confirmed telegram updates"),
            Err(e) => tracing::warn!(offset, error = %e, "could not confirm telegram updates"),
        }
    }

    async fn get_updates(&self, offset: i64, timeout: u64) -> Result<Vec<Update>> {
        let req = GetUpdates {
            offset,
            timeout,
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &req).await
    }

    /// POST a Bot API method and unwrap the `{ok, result}` envelope.
    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .http
            .post(format!("{}/{}", self.endpoint, method))
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Http(format!("{method}: {}", e.without_url())))?;

        let envelope: ApiResponse<T> = resp
            .json()
            .await
            .map_err(|e| Error::Http(format!("{method}: {}", e.without_url())))?;
        envelope.into_result(method)
    }
}

#[async_trait]
impl ReplySender for TelegramGateway {
    fn name(&self) -> &str {
        GATEWAY
    }

    async fn send(&self, chat: ChatId, reply: &Reply) -> Result<()> {
        let _sent: serde_json::Value = self
            .call("sendMessage", &SendMessage::new(chat, reply))
            .await?;
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

impl<T> ApiResponse<T> {
    fn into_result(self, method: &str) -> Result<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(Error::Gateway {
                gateway: GATEWAY.into(),
                message: format!("{method}: ok response without result"),
            }),
            (false, _) => Err(Error::Gateway {
                gateway: GATEWAY.into(),
                message: format!(
                    "{method}: {} ({})",
                    self.description.as_deref().unwrap_or("request rejected"),
                    self.error_code.unwrap_or_default()
                ),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct GetUpdates<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    #[serde(default)]
    from: Option<User>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    entities: Vec<MessageEntity>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
    first_name: String,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct MessageEntity {
    #[serde(rename = "type")]
    kind: String,
    offset: usize,
}

/// Text messages with a sender become events; everything else is dropped.
fn to_inbound(msg: Message) -> Option<InboundEvent> {
    let from = msg.from?;
    let text = msg.text?;
    let is_command = msg
        .entities
        .iter()
        .any(|e| e.kind == "bot_command" && e.offset == 0);

    Some(InboundEvent {
        actor: ActorId(from.id),
        chat: ChatId(msg.chat.id),
        text,
        is_command,
        sender: Some(from.username.unwrap_or(from.first_name)),
    })
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<Keyboard<'a>>,
}

impl<'a> SendMessage<'a> {
    fn new(chat: ChatId, reply: &'a Reply) -> Self {
        Self {
            chat_id: chat.0,
            text: &reply.text,
            reply_markup: reply.markup.as_ref().map(Keyboard::from_markup),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Keyboard<'a> {
    Show {
        keyboard: Vec<Vec<KeyboardButton<'a>>>,
        one_time_keyboard: bool,
        resize_keyboard: bool,
    },
    Remove {
        remove_keyboard: bool,
    },
}

#[derive(Debug, Serialize)]
struct KeyboardButton<'a> {
    text: &'a str,
}

impl<'a> Keyboard<'a> {
    fn from_markup(markup: &'a ReplyMarkup) -> Self {
        match markup {
            ReplyMarkup::Menu(rows) => Keyboard::Show {
                keyboard: rows
                    .iter()
                    .map(|row| row.iter().map(|text| KeyboardButton { text }).collect())
                    .collect(),
                one_time_keyboard: true,
                resize_keyboard: true,
            },
            ReplyMarkup::RemoveMenu => Keyboard::Remove {
                remove_keyboard: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_dialogue::main_menu;
    use serde_json::json;

    fn parse_updates(raw: serde_json::Value) -> Vec<Update> {
        let envelope: ApiResponse<Vec<Update>> = serde_json::from_value(raw).unwrap();
        envelope.into_result("getUpdates").unwrap()
    }

    #[test]
    fn command_message_becomes_command_event() {
        let updates = parse_updates(json!({
            "ok": true,
            "result": [{
                "update_id": 10,
                "message": {
                    "message_id": 1,
                    "date": 0,
                    "chat": {"id": 42, "type": "private"},
                    "from": {"id": 42, "is_bot": false, "first_name": "Ada", "username": "ada"},
                    "text": "/start",
                    "entities": [{"type": "bot_command", "offset": 0, "length": 6}]
                }
            }]
        }));

        let msg = updates.into_iter().next().unwrap().message.unwrap();
        let event = to_inbound(msg).unwrap();
        assert_eq!(event, InboundEvent {
            sender: Some("ada".into()),
            ..InboundEvent::command(42, "/start")
        });
    }

    #[test]
    fn plain_text_is_not_a_command() {
        let updates = parse_updates(json!({
            "ok": true,
            "result": [{
                "update_id": 11,
                "message": {
                    "chat": {"id": -5},
                    "from": {"id": 7, "first_name": "Bo"},
                    "text": "see /start later",
                    "entities": [{"type": "bot_command", "offset": 4, "length": 6}]
                }
            }]
        }));

        let event = to_inbound(updates.into_iter().next().unwrap().message.unwrap()).unwrap();
        assert!(!event.is_command);
        assert_eq!(event.actor, ActorId(7));
        assert_eq!(event.chat, ChatId(-5));
        assert_eq!(event.sender.as_deref(), Some("Bo"));
    }

    #[test]
    fn non_text_messages_are_dropped() {
        let updates = parse_updates(json!({
            "ok": true,
            "result": [
                {"update_id": 1, "message": {"chat": {"id": 1}, "from": {"id": 1, "first_name": "A"}, "sticker": {}}},
                {"update_id": 2, "edited_message": {"chat": {"id": 1}, "text": "x"}}
            ]
        }));
        let events: Vec<_> = updates
            .into_iter()
            .filter_map(|u| u.message.and_then(to_inbound))
            .collect();
        assert!(events.is_empty());
    }

    #[test]
    fn api_error_maps_to_gateway_error() {
        let envelope: ApiResponse<User> = serde_json::from_value(json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        }))
        .unwrap();
        let err = envelope.into_result("getMe").unwrap_err();
        assert!(matches!(err, Error::Gateway { .. }));
        assert!(err.to_string().contains("Unauthorized (401)"));
    }

    #[test]
    fn menu_renders_as_one_time_keyboard() {
        let reply = Reply::text("hi").with_markup(main_menu());
        let body = serde_json::to_value(SendMessage::new(ChatId(3), &reply)).unwrap();
        assert_eq!(
            body,
            json!({
                "chat_id": 3,
                "text": "hi",
                "reply_markup": {
                    "keyboard": [
                        [{"text": "Age"}, {"text": "Favourite colour"}],
                        [{"text": "Number of siblings"}, {"text": "Something else..."}],
                        [{"text": "Done"}]
                    ],
                    "one_time_keyboard": true,
                    "resize_keyboard": true
                }
            })
        );
    }

    #[test]
    fn remove_menu_and_plain_text() {
        let reply = Reply::text("bye").with_markup(ReplyMarkup::RemoveMenu);
        let body = serde_json::to_value(SendMessage::new(ChatId(3), &reply)).unwrap();
        assert_eq!(body["reply_markup"], json!({"remove_keyboard": true}));

        let plain = Reply::text("facts");
        let body = serde_json::to_value(SendMessage::new(ChatId(3), &plain)).unwrap();
        assert!(body.get("reply_markup").is_none());
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let cfg = TelegramConfig {
            api_base_url: "http://localhost:8081/".into(),
            ..TelegramConfig::default()
        };
        let gw = TelegramGateway::new(&cfg, "123:abc").unwrap();
        assert_eq!(gw.endpoint, "http://localhost:8081/bot123:abc");
    }
}
