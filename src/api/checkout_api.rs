// ==========================================
// Marmita Express - 结账 API
// ==========================================
// 职责: 草稿 → 校验 → 支付请求载荷 → 创建支付会话 → 跳转地址
// 红线: 失败只返回错误消息，不重试
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::CheckoutValidator;
use crate::domain::catalog::Catalog;
use crate::domain::contact::digits_only;
use crate::domain::draft::OrderDraft;
use crate::engine::configurator::OrderConfigurator;
use crate::engine::pricing::PricingEngine;
use crate::i18n::DEFAULT_LOCALE;
use crate::payment::models::{CreatePaymentRequest, CreatePaymentResponse, Payer, PayerAddress};
use crate::payment::service::PaymentService;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

/// 支付回调路径（相对于 public_base_url）
pub const PAYMENT_WEBHOOK_PATH: &str = "/api/webhooks/payment";

/// 下单接口路径
pub const CREATE_PAYMENT_PATH: &str = "/api/create-payment";

// ==========================================
// CheckoutGateway - 支付会话创建入口
// ==========================================

/// 支付会话创建入口
///
/// 前端场景走 HTTP 调用后端；同进程场景直接调用 PaymentService
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_payment(&self, request: &CreatePaymentRequest) -> ApiResult<CreatePaymentResponse>;
}

#[async_trait]
impl CheckoutGateway for PaymentService {
    async fn create_payment(&self, request: &CreatePaymentRequest) -> ApiResult<CreatePaymentResponse> {
        Ok(PaymentService::create_payment(self, request).await?)
    }
}

/// 后端响应: {redirect_url} 或 {error}
#[derive(Debug, Deserialize)]
struct GatewayResponse {
    #[serde(default)]
    redirect_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// 通过 HTTP 调用后端 create-payment 接口
pub struct HttpCheckoutGateway {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpCheckoutGateway {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), CREATE_PAYMENT_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CheckoutGateway for HttpCheckoutGateway {
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    async fn create_payment(&self, request: &CreatePaymentRequest) -> ApiResult<CreatePaymentResponse> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::PaymentSessionFailed {
                status: 502,
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body: GatewayResponse = response.json().await.map_err(|e| ApiError::PaymentSessionFailed {
            status,
            message: format!("resposta inválida: {}", e),
        })?;

        match (body.redirect_url, body.error) {
            (_, Some(message)) => Err(ApiError::PaymentSessionFailed { status, message }),
            (Some(url), None) if !url.is_empty() => Ok(CreatePaymentResponse { redirect_url: url }),
            _ => Err(ApiError::PaymentSessionFailed {
                status,
                message: "redirect_url ausente".to_string(),
            }),
        }
    }
}

// ==========================================
// CheckoutApi
// ==========================================

/// 结账 API
pub struct CheckoutApi {
    gateway: Arc<dyn CheckoutGateway>,
    public_base_url: String,
    currency: String,
    locale: String,
}

impl CheckoutApi {
    pub fn new(
        gateway: Arc<dyn CheckoutGateway>,
        public_base_url: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            public_base_url: public_base_url.into(),
            currency: currency.into(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// 支付渠道回调地址
    pub fn notification_url(&self) -> String {
        format!(
            "{}{}",
            self.public_base_url.trim_end_matches('/'),
            PAYMENT_WEBHOOK_PATH
        )
    }

    /// 组装支付请求载荷
    ///
    /// 先做完整的表单校验；订单号为 order-<unix 毫秒>
    pub fn build_payment_request(
        &self,
        draft: &OrderDraft,
        catalog: &Catalog,
        now: DateTime<Utc>,
    ) -> ApiResult<CreatePaymentRequest> {
        CheckoutValidator::new(&self.locale).validate(draft)?;

        let total = PricingEngine::new(catalog).total(draft);
        if !total.is_positive() {
            return Err(ApiError::InvalidInput(format!("订单金额无效: {}", total)));
        }

        let contact = &draft.contact;
        let address = &draft.address;
        Ok(CreatePaymentRequest {
            amount: total.to_major(),
            currency: self.currency.clone(),
            order_id: format!("order-{}", now.timestamp_millis()),
            payer: Payer {
                name: contact.name.trim().to_string(),
                email: String::new(),
                document: if contact.tax_id_requested {
                    digits_only(&contact.tax_id)
                } else {
                    String::new()
                },
                address: PayerAddress {
                    state: address.region.clone(),
                    city: address.locality.clone(),
                    zip_code: digits_only(&address.postal_code),
                    street: address.street.trim().to_string(),
                    number: address.number.trim().to_string(),
                },
            },
            notification_url: Some(self.notification_url()),
        })
    }

    /// 提交结账，成功时返回整页跳转地址
    #[instrument(skip(self, configurator), fields(session_id = %configurator.draft().session_id))]
    pub async fn submit(&self, configurator: &OrderConfigurator) -> ApiResult<String> {
        let request =
            self.build_payment_request(configurator.draft(), configurator.catalog(), Utc::now())?;

        match self.gateway.create_payment(&request).await {
            Ok(response) => {
                tracing::info!(
                    "支付会话已创建: order_id={}, amount={}",
                    request.order_id,
                    request.amount
                );
                Ok(response.redirect_url)
            }
            Err(e) => {
                tracing::warn!("创建支付失败: order_id={}, error={}", request.order_id, e);
                Err(e)
            }
        }
    }
}
