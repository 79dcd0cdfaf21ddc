use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

pub struct TelegramClient {
    client: Client,
    send_message_url: String,
    chat_id: i64,
}

impl TelegramClient {
    pub fn new(token: &str, chat_id: i64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            send_message_url: format!("{TELEGRAM_API_URL}/bot{token}/sendMessage"),
            chat_id,
        }
    }

    /// Send one HTML-formatted message to the configured chat. Link previews
    /// stay enabled so forwarded articles expand in the chat.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let request = SendMessageRequest {
            chat_id: self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: false,
        };

        let response = self
            .client
            .post(&self.send_message_url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            let description = serde_json::from_str::<SendMessageResponse>(&error_text)
                .ok()
                .and_then(|r| r.description)
                .unwrap_or(error_text);
            return Err(AppError::TelegramApi(description));
        }

        let api_response: SendMessageResponse = response.json().await?;
        if !api_response.ok {
            return Err(AppError::TelegramApi(
                api_response
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(())
    }
}
