// ==========================================
// Marmita Express - 支付数据模型
// ==========================================
// CreatePaymentRequest: 前端 → 本服务 的下单载荷（金额为主单位）
// PaymentSessionRequest: 本服务 → 支付渠道 的统一请求（金额为最小单位）
// ==========================================

use crate::domain::money::Money;
use crate::domain::types::PaymentProviderKind;
use serde::{Deserialize, Serialize};

/// 付款人地址
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayerAddress {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub number: String,
}

/// 付款人
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// CPF（未勾选时为空）
    #[serde(default)]
    pub document: String,
    #[serde(default)]
    pub address: PayerAddress,
}

/// 创建支付请求（POST /api/create-payment）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    /// 金额（主单位，如 64.9）
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub order_id: String,
    #[serde(default)]
    pub payer: Payer,
    #[serde(default)]
    pub notification_url: Option<String>,
}

fn default_currency() -> String {
    "BRL".to_string()
}

/// 创建支付响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePaymentResponse {
    pub redirect_url: String,
}

/// 统一的支付会话请求（已补齐商户侧字段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSessionRequest {
    pub amount: Money,
    pub currency: String,
    pub country: String,
    pub order_id: String,
    pub description: String,
    pub success_url: String,
    pub back_url: String,
    pub notification_url: Option<String>,
    pub payer: Payer,
}

/// 支付会话
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    pub provider: PaymentProviderKind,
    /// 跳转地址（整页重定向）
    pub redirect_url: String,
    /// 渠道侧的支付/偏好 id
    pub provider_reference: Option<String>,
}
