//! Minimal Telegram Bot API client: the handful of methods the bot needs,
//! the update types it reads and the reply sink it hands to the core.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use mood_bot::{InboundEvent, KeyboardHint, ReplySink, TextFormat, TransportError, UserId};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

/// Where replies to an update go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTarget {
    pub chat_id: i64,
    pub message_id: i64,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    disable_web_page_preview: bool,
}

// ---------------------------------------------------------------------------
// Keyboard
// ---------------------------------------------------------------------------

pub const BUTTON_RESTAURANT: &str = "🍽 Ресторан";
pub const BUTTON_CINEMA: &str = "🎬 Кино";
pub const BUTTON_THEATRE: &str = "🎭 Театр";
pub const BUTTON_MUSEUM: &str = "🖼 Музей";
pub const BUTTON_BORED: &str = "🤷‍♂️ Мне скучно";
pub const BUTTON_LOCATION: &str = "📍 Отправить геолокацию";

/// Main reply keyboard; the last button asks the client to share location.
pub fn main_keyboard() -> Value {
    json!({
        "keyboard": [
            [{"text": BUTTON_RESTAURANT}, {"text": BUTTON_CINEMA}],
            [{"text": BUTTON_THEATRE}, {"text": BUTTON_MUSEUM}],
            [{"text": BUTTON_BORED}, {"text": BUTTON_LOCATION, "request_location": true}]
        ],
        "resize_keyboard": true
    })
}

// ---------------------------------------------------------------------------
// Update -> InboundEvent
// ---------------------------------------------------------------------------

/// Convert an update into a core event plus its reply target. Updates the
/// bot does not understand (edits, stickers, channel posts) yield `None`.
pub fn to_event(update: &Update) -> Option<(InboundEvent, ReplyTarget)> {
    let message = update.message.as_ref()?;
    let user_id = UserId(message.from.as_ref().map_or(message.chat.id, |u| u.id));
    let target = ReplyTarget {
        chat_id: message.chat.id,
        message_id: message.message_id,
    };

    if let Some(location) = &message.location {
        return Some((
            InboundEvent::location(user_id, location.latitude, location.longitude),
            target,
        ));
    }

    let text = message.text.as_deref()?.trim();
    if text.is_empty() {
        return None;
    }

    let event = match parse_command(text) {
        Some((name, args)) => InboundEvent::command(user_id, name, args),
        None => InboundEvent::text(user_id, text),
    };
    Some((event, target))
}

/// `/start@MoodBot foo bar` -> `("start", "foo bar")`.
fn parse_command(text: &str) -> Option<(String, String)> {
    let rest = text.strip_prefix('/')?;
    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim()),
        None => (rest, ""),
    };
    let name = head.split('@').next().unwrap_or(head);
    if name.is_empty() {
        return None;
    }
    Some((name.to_lowercase(), args.to_string()))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct TelegramClient {
    client: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(client: Client, api_base_url: &str, token: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/bot{}", api_base_url.trim_end_matches('/'), token),
        }
    }

    /// POST a Bot API method and unwrap the `{ok, result, description}` envelope.
    /// Error messages never contain the request URL, which embeds the token.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &impl Serialize,
        timeout: Option<Duration>,
    ) -> Result<T> {
        let mut request = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| anyhow!("Telegram {} request failed: {}", method, e.without_url()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| anyhow!("Telegram {} body read failed: {}", method, e.without_url()))?;

        let envelope: ApiEnvelope<T> = serde_json::from_str(&text).with_context(|| {
            let preview: String = text.chars().take(200).collect();
            format!("Telegram {} returned HTTP {} with unexpected body: {}", method, status, preview)
        })?;

        if !envelope.ok {
            return Err(anyhow!(
                "Telegram {} failed (HTTP {}): {}",
                method,
                status,
                envelope.description.unwrap_or_else(|| "no description".to_string())
            ));
        }
        envelope
            .result
            .ok_or_else(|| anyhow!("Telegram {} returned ok without result", method))
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        format: TextFormat,
        reply_to: Option<i64>,
        keyboard: KeyboardHint,
    ) -> Result<()> {
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: match format {
                TextFormat::Html => Some("HTML"),
                TextFormat::Plain => None,
            },
            reply_to_message_id: reply_to,
            reply_markup: match keyboard {
                KeyboardHint::MainMenu => Some(main_keyboard()),
                KeyboardHint::None => None,
            },
            disable_web_page_preview: format == TextFormat::Html,
        };
        let _: Value = self.call("sendMessage", &body, None).await?;
        Ok(())
    }

    /// Long-poll for updates. The HTTP timeout is stretched past the poll timeout.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call(
            "getUpdates",
            &body,
            Some(Duration::from_secs(timeout_secs + 10)),
        )
        .await
    }

    pub async fn set_webhook(
        &self,
        url: &str,
        drop_pending_updates: bool,
        secret_token: Option<&str>,
    ) -> Result<()> {
        let mut body = json!({
            "url": url,
            "drop_pending_updates": drop_pending_updates,
            "allowed_updates": ["message"],
        });
        if let Some(secret) = secret_token {
            body["secret_token"] = json!(secret);
        }
        let _: bool = self.call("setWebhook", &body, None).await?;
        Ok(())
    }

    pub async fn delete_webhook(&self, drop_pending_updates: bool) -> Result<()> {
        let body = json!({ "drop_pending_updates": drop_pending_updates });
        let _: bool = self.call("deleteWebhook", &body, None).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Reply sink
// ---------------------------------------------------------------------------

/// Reply sink bound to the chat and message of one update.
pub struct TelegramReplySink {
    client: Arc<TelegramClient>,
    target: ReplyTarget,
}

impl TelegramReplySink {
    pub fn new(client: Arc<TelegramClient>, target: ReplyTarget) -> Self {
        Self { client, target }
    }
}

#[async_trait]
impl ReplySink for TelegramReplySink {
    async fn reply(
        &self,
        text: &str,
        format: TextFormat,
        keyboard: KeyboardHint,
    ) -> Result<(), TransportError> {
        self.client
            .send_message(
                self.target.chat_id,
                text,
                format,
                Some(self.target.message_id),
                keyboard,
            )
            .await
            .map_err(|e| TransportError(e.to_string()))
    }

    async fn answer(&self, text: &str, keyboard: KeyboardHint) -> Result<(), TransportError> {
        self.client
            .send_message(self.target.chat_id, text, TextFormat::Plain, None, keyboard)
            .await
            .map_err(|e| TransportError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mood_bot::EventKind;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn update(json: Value) -> Update {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_text_message_to_event() {
        let update = update(json!({
            "update_id": 10,
            "message": {
                "message_id": 5,
                "chat": {"id": -100},
                "from": {"id": 42},
                "text": "  Хочу в ресторан "
            }
        }));
        let (event, target) = to_event(&update).unwrap();
        assert_eq!(event, InboundEvent::text(42, "Хочу в ресторан"));
        assert_eq!(target, ReplyTarget { chat_id: -100, message_id: 5 });
    }

    #[test]
    fn test_location_message_to_event() {
        let update = update(json!({
            "update_id": 11,
            "message": {
                "message_id": 6,
                "chat": {"id": 42},
                "location": {"latitude": 55.75, "longitude": 37.61}
            }
        }));
        let (event, _) = to_event(&update).unwrap();
        assert_eq!(event.user_id, UserId(42));
        assert_eq!(
            event.kind,
            EventKind::Location { latitude: 55.75, longitude: 37.61 }
        );
    }

    #[test]
    fn test_command_strips_bot_suffix() {
        let update = update(json!({
            "update_id": 12,
            "message": {"message_id": 7, "chat": {"id": 1}, "text": "/Start@MoodBot"}
        }));
        let (event, _) = to_event(&update).unwrap();
        assert_eq!(event, InboundEvent::command(1, "start", ""));

        assert_eq!(
            parse_command("/find@MoodBot  театр рядом"),
            Some(("find".to_string(), "театр рядом".to_string()))
        );
        assert_eq!(parse_command("/"), None);
        assert_eq!(parse_command("no slash"), None);
    }

    #[test]
    fn test_unsupported_updates_ignored() {
        let sticker = update(json!({
            "update_id": 13,
            "message": {"message_id": 8, "chat": {"id": 1}}
        }));
        assert!(to_event(&sticker).is_none());

        let edited = update(json!({"update_id": 14, "edited_message": {"message_id": 9}}));
        assert!(to_event(&edited).is_none());
    }

    #[test]
    fn test_keyboard_layout() {
        let keyboard = main_keyboard();
        let rows = keyboard["keyboard"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0]["text"], BUTTON_RESTAURANT);
        assert_eq!(rows[2][1]["request_location"], true);
        assert_eq!(keyboard["resize_keyboard"], true);
    }

    #[tokio::test]
    async fn test_reply_quotes_message_with_html() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .and(body_json(json!({
                "chat_id": 7,
                "text": "📍 <b>Пушкин</b>",
                "parse_mode": "HTML",
                "reply_to_message_id": 99,
                "disable_web_page_preview": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {"message_id": 100}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = Arc::new(TelegramClient::new(Client::new(), &server.uri(), "TOKEN"));
        let sink = TelegramReplySink::new(client, ReplyTarget { chat_id: 7, message_id: 99 });
        sink.reply("📍 <b>Пушкин</b>", TextFormat::Html, KeyboardHint::None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_answer_attaches_keyboard() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .and(body_partial_json(json!({
                "chat_id": 7,
                "text": "Привет!",
                "reply_markup": {"resize_keyboard": true}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {"message_id": 101}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = Arc::new(TelegramClient::new(Client::new(), &server.uri(), "TOKEN"));
        let sink = TelegramReplySink::new(client, ReplyTarget { chat_id: 7, message_id: 99 });
        sink.answer("Привет!", KeyboardHint::MainMenu).await.unwrap();
    }

    #[tokio::test]
    async fn test_api_error_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "ok": false,
                "error_code": 403,
                "description": "Forbidden: bot was blocked by the user"
            })))
            .mount(&server)
            .await;

        let client = Arc::new(TelegramClient::new(Client::new(), &server.uri(), "TOKEN"));
        let sink = TelegramReplySink::new(client, ReplyTarget { chat_id: 7, message_id: 1 });
        let err = sink
            .answer("hi", KeyboardHint::None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("blocked by the user"));
        assert!(!err.to_string().contains("TOKEN"));
    }

    #[tokio::test]
    async fn test_set_webhook_sends_secret_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/setWebhook"))
            .and(body_json(json!({
                "url": "https://mood-bot.example.com/webhook",
                "drop_pending_updates": true,
                "allowed_updates": ["message"],
                "secret_token": "s3cret"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = TelegramClient::new(Client::new(), &server.uri(), "TOKEN");
        client
            .set_webhook("https://mood-bot.example.com/webhook", true, Some("s3cret"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_updates_parses_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/getUpdates"))
            .and(body_partial_json(json!({"offset": 5, "timeout": 0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": [
                    {"update_id": 5, "message": {"message_id": 1, "chat": {"id": 3}, "text": "кино"}},
                    {"update_id": 6}
                ]
            })))
            .mount(&server)
            .await;

        let client = TelegramClient::new(Client::new(), &server.uri(), "TOKEN");
        let updates = client.get_updates(Some(5), 0).await.unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1].update_id, 6);
        assert!(updates[1].message.is_none());
    }
}
