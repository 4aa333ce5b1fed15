// ==========================================
// Marmita Express - dLocal Go 支付渠道
// ==========================================
// 接口: POST {base}/v1/payments
// 认证: Authorization: Bearer {api_key}:{api_secret}
// 金额: 最小单位（分）
// ==========================================

use crate::domain::types::{PaymentProviderKind, ProviderEnvironment};
use crate::payment::error::{PaymentError, PaymentResult};
use crate::payment::models::{PaymentSession, PaymentSessionRequest};
use crate::payment::traits::PaymentProvider;
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, instrument};

const SANDBOX_BASE_URL: &str = "https://api-sbx.dlocalgo.com";
const PRODUCTION_BASE_URL: &str = "https://api.dlocalgo.com";

/// dLocal Go 客户端
pub struct DlocalGoProvider {
    http: reqwest::Client,
    api_key: String,
    api_secret: String,
    base_url: String,
}

impl DlocalGoProvider {
    /// 按环境选择 API 地址
    pub fn new(
        http: reqwest::Client,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        environment: ProviderEnvironment,
    ) -> Self {
        let base_url = match environment {
            ProviderEnvironment::Sandbox => SANDBOX_BASE_URL,
            ProviderEnvironment::Production => PRODUCTION_BASE_URL,
        };
        Self::with_base_url(http, api_key, api_secret, base_url)
    }

    /// 使用自定义 API 地址（测试/代理）
    pub fn with_base_url(
        http: reqwest::Client,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn payments_url(&self) -> String {
        format!("{}/v1/payments", self.base_url)
    }

    fn build_body(&self, request: &PaymentSessionRequest) -> serde_json::Value {
        json!({
            "currency": request.currency,
            "amount": request.amount.minor_units(),
            "country": request.country,
            "order_id": request.order_id,
            "description": request.description,
            "success_url": request.success_url,
            "back_url": request.back_url,
            "notification_url": request.notification_url,
            "payer": request.payer,
        })
    }
}

#[async_trait]
impl PaymentProvider for DlocalGoProvider {
    fn kind(&self) -> PaymentProviderKind {
        PaymentProviderKind::DlocalGo
    }

    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    async fn create_session(&self, request: &PaymentSessionRequest) -> PaymentResult<PaymentSession> {
        debug!("Sending payment to dLocal Go");

        let response = self
            .http
            .post(self.payments_url())
            .header(
                "Authorization",
                format!("Bearer {}:{}", self.api_key, self.api_secret),
            )
            .json(&self.build_body(request))
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        let body: serde_json::Value = serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null);

        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Erro ao criar pagamento")
                .to_string();
            tracing::error!("dLocal Go 拒绝支付: status={}, body={}", status, raw);
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let redirect_url = body
            .get("redirect_url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| PaymentError::InvalidResponse("缺少 redirect_url".to_string()))?;

        Ok(PaymentSession {
            provider: PaymentProviderKind::DlocalGo,
            redirect_url: redirect_url.to_string(),
            provider_reference: body.get("id").and_then(|v| v.as_str()).map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use crate::payment::models::Payer;

    #[test]
    fn test_environment_selects_url() {
        let sandbox = DlocalGoProvider::new(
            reqwest::Client::new(),
            "k",
            "s",
            ProviderEnvironment::Sandbox,
        );
        assert_eq!(sandbox.payments_url(), "https://api-sbx.dlocalgo.com/v1/payments");

        let production = DlocalGoProvider::new(
            reqwest::Client::new(),
            "k",
            "s",
            ProviderEnvironment::Production,
        );
        assert_eq!(production.payments_url(), "https://api.dlocalgo.com/v1/payments");
    }

    #[test]
    fn test_body_uses_minor_units() {
        let provider =
            DlocalGoProvider::with_base_url(reqwest::Client::new(), "k", "s", "http://stub/");
        let body = provider.build_body(&PaymentSessionRequest {
            amount: Money::from_minor(6490),
            currency: "BRL".into(),
            country: "BR".into(),
            order_id: "order-1".into(),
            description: "Pedido order-1 - Marmitaria Express".into(),
            success_url: "https://example.com/success".into(),
            back_url: "https://example.com/".into(),
            notification_url: None,
            payer: Payer::default(),
        });
        assert_eq!(body["amount"], 6490);
        assert_eq!(body["description"], "Pedido order-1 - Marmitaria Express");
        assert_eq!(provider.payments_url(), "http://stub/v1/payments");
    }
}
