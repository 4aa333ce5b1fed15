// ==========================================
// Marmita Express - Mercado Pago 支付渠道
// ==========================================
// 接口: POST {base}/checkout/preferences
// 认证: Authorization: Bearer {access_token}
// 金额: 主单位（items[].unit_price）
// ==========================================

use crate::domain::types::{PaymentProviderKind, ProviderEnvironment};
use crate::payment::error::{PaymentError, PaymentResult};
use crate::payment::models::{PaymentSession, PaymentSessionRequest};
use crate::payment::traits::PaymentProvider;
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, instrument};

const DEFAULT_BASE_URL: &str = "https://api.mercadopago.com";

/// Mercado Pago Checkout Pro 客户端
pub struct MercadoPagoProvider {
    http: reqwest::Client,
    access_token: String,
    base_url: String,
    environment: ProviderEnvironment,
}

impl MercadoPagoProvider {
    pub fn new(
        http: reqwest::Client,
        access_token: impl Into<String>,
        environment: ProviderEnvironment,
    ) -> Self {
        Self::with_base_url(http, access_token, environment, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        http: reqwest::Client,
        access_token: impl Into<String>,
        environment: ProviderEnvironment,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            access_token: access_token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            environment,
        }
    }

    pub fn preferences_url(&self) -> String {
        format!("{}/checkout/preferences", self.base_url)
    }

    fn build_body(&self, request: &PaymentSessionRequest) -> serde_json::Value {
        let payer = &request.payer;
        let mut body = json!({
            "items": [{
                "id": request.order_id,
                "title": request.description,
                "quantity": 1,
                "currency_id": request.currency,
                "unit_price": request.amount.to_major(),
            }],
            "external_reference": request.order_id,
            "payer": {
                "name": payer.name,
                "email": payer.email,
                "address": {
                    "zip_code": payer.address.zip_code,
                    "street_name": payer.address.street,
                    "street_number": payer.address.number,
                },
            },
            "back_urls": {
                "success": request.success_url,
                "failure": request.back_url,
                "pending": request.back_url,
            },
            "auto_return": "approved",
        });

        if !payer.document.is_empty() {
            body["payer"]["identification"] = json!({
                "type": "CPF",
                "number": payer.document,
            });
        }
        if let Some(url) = &request.notification_url {
            body["notification_url"] = json!(url);
        }
        body
    }
}

#[async_trait]
impl PaymentProvider for MercadoPagoProvider {
    fn kind(&self) -> PaymentProviderKind {
        PaymentProviderKind::MercadoPago
    }

    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    async fn create_session(&self, request: &PaymentSessionRequest) -> PaymentResult<PaymentSession> {
        debug!("Creating Mercado Pago preference");

        let response = self
            .http
            .post(self.preferences_url())
            .bearer_auth(&self.access_token)
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
            tracing::error!("Mercado Pago 拒绝支付: status={}, body={}", status, raw);
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        // 沙箱优先使用 sandbox_init_point
        let field = match self.environment {
            ProviderEnvironment::Sandbox => "sandbox_init_point",
            ProviderEnvironment::Production => "init_point",
        };
        let redirect_url = body
            .get(field)
            .or_else(|| body.get("init_point"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| PaymentError::InvalidResponse("缺少 init_point".to_string()))?;

        Ok(PaymentSession {
            provider: PaymentProviderKind::MercadoPago,
            redirect_url: redirect_url.to_string(),
            provider_reference: body.get("id").and_then(|v| v.as_str()).map(str::to_string),
        })
    }
}
