// ==========================================
// Marmita Express - 消息通知层
// ==========================================
// 职责: 支付回调 → WhatsApp 文本通知
// ==========================================

pub mod error;
pub mod evolution;
pub mod relay;
pub mod traits;

pub use error::{MessagingError, MessagingResult};
pub use evolution::EvolutionApiClient;
pub use relay::WebhookRelay;
pub use traits::MessagingClient;
