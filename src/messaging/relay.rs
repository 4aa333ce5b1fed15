// ==========================================
// Marmita Express - 支付回调转发
// ==========================================
// 职责: 把支付渠道回调格式化成文本，转发到消息通道
// 红线: 不验签、不去重、不持久化
// ==========================================

use crate::config::ConfigManager;
use crate::i18n::t_for;
use crate::messaging::error::{MessagingError, MessagingResult};
use crate::messaging::evolution::EvolutionApiClient;
use crate::messaging::traits::MessagingClient;
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;

#[derive(Clone)]
pub struct WebhookRelay {
    client: Option<Arc<dyn MessagingClient>>,
    notify_number: Option<String>,
    locale: String,
}

impl WebhookRelay {
    pub fn new(
        client: Option<Arc<dyn MessagingClient>>,
        notify_number: Option<String>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            client,
            notify_number,
            locale: locale.into(),
        }
    }

    /// 按配置构造（URL 与 token 都存在时才启用 Evolution API）
    pub fn from_config(config: &ConfigManager, http: reqwest::Client) -> Self {
        let client: Option<Arc<dyn MessagingClient>> =
            match (config.get_messaging_api_url(), config.get_messaging_api_token()) {
                (Some(url), Some(token)) => Some(Arc::new(EvolutionApiClient::new(http, url, token))),
                _ => {
                    tracing::warn!("消息通道未配置，支付回调将不会被转发");
                    None
                }
            };
        Self::new(client, config.get_notify_number(), config.get_default_locale())
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some() && self.notify_number.is_some()
    }

    /// 通知文本: 固定前缀 + 原始载荷 JSON
    pub fn format_notification(&self, payload: &serde_json::Value) -> String {
        format!("{}\n{}", t_for(&self.locale, "webhook.received"), payload)
    }

    /// 转发回调
    ///
    /// 返回 {"received": true, "evolution": <通道响应>}
    #[instrument(skip(self, payload))]
    pub async fn relay(&self, payload: &serde_json::Value) -> MessagingResult<serde_json::Value> {
        tracing::info!("Webhook recebido: {}", payload);

        let (client, number) = match (&self.client, &self.notify_number) {
            (Some(client), Some(number)) => (client, number),
            (None, _) => return Err(MessagingError::NotConfigured("messaging.api_url / api_token")),
            (_, None) => return Err(MessagingError::NotConfigured("messaging.notify_number")),
        };

        let text = self.format_notification(payload);
        let result = client.send_text(number, &text).await?;
        Ok(json!({ "received": true, "evolution": result }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl MessagingClient for RecordingClient {
        async fn send_text(&self, number: &str, text: &str) -> MessagingResult<serde_json::Value> {
            self.sent
                .lock()
                .unwrap()
                .push((number.to_string(), text.to_string()));
            Ok(json!({"key": {"id": "msg-1"}}))
        }
    }

    #[tokio::test]
    async fn test_relay_formats_and_sends() {
        let client = Arc::new(RecordingClient::default());
        let channel: Arc<dyn MessagingClient> = client.clone();
        let relay = WebhookRelay::new(Some(channel), Some("5511900000000".into()), "pt-BR");

        let result = relay.relay(&json!({"id": 99, "type": "payment"})).await.unwrap();
        assert_eq!(result["received"], true);
        assert_eq!(result["evolution"]["key"]["id"], "msg-1");

        let sent = client.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "5511900000000");
        assert!(sent[0].1.starts_with("WebHook recebido ! Dados: \n"));
        assert!(sent[0].1.contains("\"type\":\"payment\""));
    }

    #[tokio::test]
    async fn test_relay_without_channel_fails() {
        let relay = WebhookRelay::new(None, Some("5511900000000".into()), "pt-BR");
        assert!(!relay.is_configured());
        assert!(matches!(
            relay.relay(&json!({})).await,
            Err(MessagingError::NotConfigured(_))
        ));
    }
}
