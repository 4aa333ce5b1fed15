// ==========================================
// Marmita Express - 消息通道 Trait
// ==========================================

use crate::messaging::error::MessagingResult;
use async_trait::async_trait;

#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// 发送纯文本消息，返回通道原始响应
    async fn send_text(&self, number: &str, text: &str) -> MessagingResult<serde_json::Value>;
}
