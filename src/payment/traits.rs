// ==========================================
// Marmita Express - 支付渠道 Trait
// ==========================================
// 每个渠道一个实现，由配置项 payment.provider 选择
// ==========================================

use crate::domain::types::PaymentProviderKind;
use crate::payment::error::PaymentResult;
use crate::payment::models::{PaymentSession, PaymentSessionRequest};
use async_trait::async_trait;

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// 渠道类型
    fn kind(&self) -> PaymentProviderKind;

    /// 创建支付会话，返回跳转地址
    ///
    /// 不重试；失败直接返回给调用方展示
    async fn create_session(&self, request: &PaymentSessionRequest) -> PaymentResult<PaymentSession>;
}
