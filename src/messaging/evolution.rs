// ==========================================
// Marmita Express - Evolution API 客户端
// ==========================================
// 接口: POST {api_url}（形如 .../message/sendText/{instance}）
// 认证: apikey 请求头
// ==========================================

use crate::messaging::error::{MessagingError, MessagingResult};
use crate::messaging::traits::MessagingClient;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

/// 模拟"正在输入"的延迟（毫秒）
const TYPING_DELAY_MS: u32 = 123;

#[derive(Debug, Serialize)]
struct SendOptions<'a> {
    delay: u32,
    presence: &'a str,
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendTextPayload<'a> {
    number: &'a str,
    options: SendOptions<'a>,
    text_message: TextMessage<'a>,
}

pub struct EvolutionApiClient {
    http: reqwest::Client,
    api_url: String,
    api_token: String,
}

impl EvolutionApiClient {
    pub fn new(
        http: reqwest::Client,
        api_url: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            api_token: api_token.into(),
        }
    }
}

#[async_trait]
impl MessagingClient for EvolutionApiClient {
    #[instrument(skip(self, text), fields(number = %number))]
    async fn send_text(&self, number: &str, text: &str) -> MessagingResult<serde_json::Value> {
        let payload = SendTextPayload {
            number,
            options: SendOptions {
                delay: TYPING_DELAY_MS,
                presence: "composing",
            },
            text_message: TextMessage { text },
        };

        debug!("Sending text through Evolution API");

        let response = self
            .http
            .post(&self.api_url)
            .header("apikey", &self.api_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        let body: serde_json::Value =
            serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw.clone()));

        if !status.is_success() {
            let message = body
                .get("message")
                .map(|m| m.as_str().map(str::to_string).unwrap_or_else(|| m.to_string()))
                .unwrap_or_else(|| raw.clone());
            return Err(MessagingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Evolution API response: {}", body);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let payload = SendTextPayload {
            number: "5511999999999",
            options: SendOptions {
                delay: TYPING_DELAY_MS,
                presence: "composing",
            },
            text_message: TextMessage { text: "olá" },
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["number"], "5511999999999");
        assert_eq!(value["options"]["delay"], 123);
        assert_eq!(value["options"]["presence"], "composing");
        assert_eq!(value["textMessage"]["text"], "olá");
    }
}
