//! LINE Messaging API adapter.
//!
//! Webhook payload types, `X-Line-Signature` verification and the reply
//! API client.

use crate::domain::ports::Messenger;
use crate::utils::error::{BotError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

pub const SIGNATURE_HEADER: &str = "x-line-signature";
pub const DEFAULT_API_BASE_URL: &str = "https://api.line.me";

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub message: Option<EventMessage>,
    #[serde(default)]
    pub source: Option<EventSource>,
}

#[derive(Debug, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
}

/// 文字訊息事件裡 bot 需要的部分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage<'a> {
    pub reply_token: &'a str,
    pub text: &'a str,
    pub user_id: Option<&'a str>,
}

impl WebhookEvent {
    /// 只處理 message 事件中的 text 訊息，其餘回傳 `None`
    pub fn as_text_message(&self) -> Option<TextMessage<'_>> {
        if self.event_type != "message" {
            return None;
        }
        let message = self.message.as_ref()?;
        if message.kind != "text" {
            return None;
        }
        Some(TextMessage {
            reply_token: self.reply_token.as_deref()?,
            text: message.text.as_deref()?,
            user_id: self
                .source
                .as_ref()
                .and_then(|s| s.user_id.as_deref()),
        })
    }
}

pub fn parse_payload(body: &[u8]) -> Result<WebhookPayload> {
    serde_json::from_slice(body).map_err(|e| BotError::WebhookError {
        message: e.to_string(),
    })
}

/// 計算 base64(HMAC-SHA256(channel_secret, body))
pub fn sign(channel_secret: &str, body: &[u8]) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(channel_secret.as_bytes()).map_err(|e| {
        BotError::SignatureError {
            reason: e.to_string(),
        }
    })?;
    mac.update(body);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// 驗證 `X-Line-Signature`，比較時使用常數時間
pub fn verify_signature(channel_secret: &str, signature: &str, body: &[u8]) -> Result<()> {
    let expected = STANDARD
        .decode(signature.trim())
        .map_err(|_| BotError::SignatureError {
            reason: "signature is not valid base64".to_string(),
        })?;

    let mut mac = Hmac::<Sha256>::new_from_slice(channel_secret.as_bytes()).map_err(|e| {
        BotError::SignatureError {
            reason: e.to_string(),
        }
    })?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| BotError::SignatureError {
            reason: "signature mismatch".to_string(),
        })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: [ReplyText<'a>; 1],
}

#[derive(Serialize)]
struct ReplyText<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Clone)]
pub struct LineMessenger {
    client: Client,
    access_token: String,
    api_base_url: String,
}

impl LineMessenger {
    pub fn new(access_token: String, api_base_url: String) -> Self {
        Self {
            client: Client::new(),
            access_token,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn reply_url(&self) -> String {
        format!("{}/v2/bot/message/reply", self.api_base_url)
    }
}

#[async_trait]
impl Messenger for LineMessenger {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()> {
        let request = ReplyRequest {
            reply_token,
            messages: [ReplyText { kind: "text", text }],
        };

        tracing::debug!("Sending LINE reply to: {}", self.reply_url());
        let response = self
            .client
            .post(self.reply_url())
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BotError::MessagingApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
