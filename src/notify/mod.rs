//! Telegram alerts for detected burns.
//!
//! Delivery policy is at-most-once: each alert gets a single send attempt.
//! Failures are logged and the alert is dropped; nothing is retried or
//! queued. Moving to at-least-once means adding an outbox here, not changing
//! callers.

use crate::classifier::BurnEvent;
use crate::metadata::{MetadataCache, TokenMetadata};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },
}

/// The bot account behind the token.
#[derive(Debug, Clone, Deserialize)]
pub struct BotIdentity {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

/// Messaging channel operations.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn get_me(&self) -> Result<BotIdentity, NotifyError>;

    /// Send an HTML message.
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        disable_preview: bool,
    ) -> Result<(), NotifyError>;
}

/// Telegram Bot API client.
pub struct TelegramBot {
    http: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<Option<T>, NotifyError> {
        if self.ok {
            Ok(self.result)
        } else {
            Err(NotifyError::Api {
                code: self.error_code.unwrap_or(0),
                description: self.description.unwrap_or_default(),
            })
        }
    }
}

impl TelegramBot {
    pub fn new(api_url: &str, token: &str) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        }
    }
}

#[async_trait]
impl Messenger for TelegramBot {
    async fn get_me(&self) -> Result<BotIdentity, NotifyError> {
        let resp: ApiResponse<BotIdentity> = self
            .http
            .get(format!("{}/getMe", self.base_url))
            .send()
            .await?
            .json()
            .await?;
        resp.into_result()?.ok_or_else(|| NotifyError::Api {
            code: 0,
            description: "getMe returned no result".to_string(),
        })
    }

    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        disable_preview: bool,
    ) -> Result<(), NotifyError> {
        let body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": disable_preview,
        });
        let resp: ApiResponse<serde_json::Value> = self
            .http
            .post(format!("{}/sendMessage", self.base_url))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        resp.into_result().map(|_| ())
    }
}

/// Settings shown in the startup announcement.
#[derive(Debug, Clone)]
pub struct StartupInfo {
    pub monitored: String,
    pub interval_secs: u64,
    pub min_burn_percent: f64,
}

/// Escape text for Telegram's HTML parse mode.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// `first8...last8`, or the whole address if it's short.
pub fn short_address(addr: &str) -> String {
    let chars: Vec<char> = addr.chars().collect();
    if chars.len() <= 16 {
        return addr.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 8..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Render the alert body.
pub fn render_alert(event: &BurnEvent, token: &TokenMetadata) -> String {
    format!(
        "🔥 <b>LP BURN DETECTED!</b> 🔥\n\
         \n\
         📊 <b>Token:</b> {name} ({symbol})\n\
         📍 <b>Address:</b> <code>{short}</code>\n\
         💯 <b>LP Burned:</b> ~{pct}%\n\
         ⏰ <b>Time:</b> {time}\n\
         \n\
         🔗 <a href=\"https://solscan.io/tx/{sig}\">View Transaction</a>\n\
         📈 <a href=\"https://dexscreener.com/solana/{addr}\">DexScreener</a>\n\
         🐦 <a href=\"https://birdeye.so/token/{addr}?chain=solana\">Birdeye</a>\n\
         \n\
         ⚠️ <i>Always DYOR! LP burn doesn't guarantee safety.</i>",
        name = escape_html(&token.name),
        symbol = escape_html(&token.symbol),
        short = short_address(&event.token_address),
        pct = event.burn_percent,
        time = event.timestamp(),
        sig = event.signature,
        addr = event.token_address,
    )
}

pub fn render_startup(info: &StartupInfo) -> String {
    format!(
        "🤖 <b>LP Burn Monitor Started!</b>\n\
         \n\
         📍 Monitoring: {}\n\
         ⏱ Interval: {}s\n\
         🔥 Min Burn: {}%\n\
         \n\
         <i>Ready to detect LP burns...</i>",
        escape_html(&info.monitored),
        info.interval_secs,
        info.min_burn_percent
    )
}

/// Formats and sends alerts to one channel.
pub struct Notifier {
    messenger: Box<dyn Messenger>,
    channel_id: String,
    metadata: MetadataCache,
}

impl Notifier {
    pub fn new(messenger: Box<dyn Messenger>, channel_id: String, metadata: MetadataCache) -> Self {
        Self {
            messenger,
            channel_id,
            metadata,
        }
    }

    /// Startup probe. Errors here are for the caller to decide on.
    pub async fn verify(&self) -> Result<BotIdentity, NotifyError> {
        self.messenger.get_me().await
    }

    /// Send one alert, at most once. Returns whether Telegram accepted it.
    pub async fn notify(&self, event: &BurnEvent) -> bool {
        let token = self.metadata.resolve(&event.token_address).await;
        let text = render_alert(event, &token);

        match self
            .messenger
            .send_message(&self.channel_id, &text, true)
            .await
        {
            Ok(()) => {
                info!(
                    symbol = %token.symbol,
                    signature = %event.signature,
                    "notification sent"
                );
                true
            }
            Err(e) => {
                error!(
                    signature = %event.signature,
                    error = %e,
                    "failed to send notification, dropping"
                );
                false
            }
        }
    }

    /// Best-effort startup message.
    pub async fn announce_startup(&self, info: &StartupInfo) -> bool {
        match self
            .messenger
            .send_message(&self.channel_id, &render_startup(info), false)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "could not send startup message");
                false
            }
        }
    }
}
