// ==========================================
// Marmita Express - 支付服务
// ==========================================
// 职责: 校验下单载荷 → 补齐商户字段 → 调用选定渠道
// ==========================================

use crate::config::ConfigManager;
use crate::domain::money::Money;
use crate::domain::types::PaymentProviderKind;
use crate::payment::dlocal::DlocalGoProvider;
use crate::payment::error::{PaymentError, PaymentResult};
use crate::payment::mercadopago::MercadoPagoProvider;
use crate::payment::models::{CreatePaymentRequest, CreatePaymentResponse, PaymentSessionRequest};
use crate::payment::traits::PaymentProvider;
use std::sync::Arc;
use tracing::instrument;

/// 商户侧固定参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantSettings {
    pub currency: String,
    pub country: String,
    pub store_name: String,
    pub success_url: String,
    pub back_url: String,
}

impl MerchantSettings {
    pub fn from_config(config: &ConfigManager) -> Self {
        Self {
            currency: config.get_currency(),
            country: config.get_country(),
            store_name: config.get_store_name(),
            success_url: config.get_success_url(),
            back_url: config.get_back_url(),
        }
    }

    /// 支付描述: "Pedido {order_id} - {店铺名}"
    pub fn description_for(&self, order_id: &str) -> String {
        format!("Pedido {} - {}", order_id, self.store_name)
    }
}

/// 支付服务
#[derive(Clone)]
pub struct PaymentService {
    provider: Arc<dyn PaymentProvider>,
    merchant: MerchantSettings,
}

impl PaymentService {
    pub fn new(provider: Arc<dyn PaymentProvider>, merchant: MerchantSettings) -> Self {
        Self { provider, merchant }
    }

    /// 按配置构造渠道
    ///
    /// 凭证缺失不在启动时报错，而是在第一次创建支付时返回 MissingCredentials
    pub fn from_config(config: &ConfigManager, http: reqwest::Client) -> PaymentResult<Self> {
        let kind = config
            .get_payment_provider()
            .map_err(|e| PaymentError::InvalidRequest(e.to_string()))?;
        let environment = config.get_payment_environment();
        let base_url = config.get_payment_base_url();

        let provider: Arc<dyn PaymentProvider> = match kind {
            PaymentProviderKind::DlocalGo => {
                match (config.get_dlocal_api_key(), config.get_dlocal_api_secret()) {
                    (Some(key), Some(secret)) => match base_url {
                        Some(url) => Arc::new(DlocalGoProvider::with_base_url(http, key, secret, url)),
                        None => Arc::new(DlocalGoProvider::new(http, key, secret, environment)),
                    },
                    _ => Arc::new(UnconfiguredProvider(kind)),
                }
            }
            PaymentProviderKind::MercadoPago => match config.get_mercadopago_access_token() {
                Some(token) => match base_url {
                    Some(url) => Arc::new(MercadoPagoProvider::with_base_url(
                        http,
                        token,
                        environment,
                        url,
                    )),
                    None => Arc::new(MercadoPagoProvider::new(http, token, environment)),
                },
                None => Arc::new(UnconfiguredProvider(kind)),
            },
        };

        tracing::info!("支付渠道: {}, 环境: {:?}", kind, environment);
        Ok(Self::new(provider, MerchantSettings::from_config(config)))
    }

    pub fn provider_kind(&self) -> PaymentProviderKind {
        self.provider.kind()
    }

    pub fn merchant(&self) -> &MerchantSettings {
        &self.merchant
    }

    /// 创建支付会话
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn create_payment(
        &self,
        request: &CreatePaymentRequest,
    ) -> PaymentResult<CreatePaymentResponse> {
        let session_request = self.build_session_request(request)?;
        let session = self.provider.create_session(&session_request).await?;
        tracing::info!(
            "支付会话已创建: provider={}, order_id={}",
            session.provider,
            session_request.order_id
        );
        Ok(CreatePaymentResponse {
            redirect_url: session.redirect_url,
        })
    }

    /// 校验并补齐渠道请求
    pub fn build_session_request(
        &self,
        request: &CreatePaymentRequest,
    ) -> PaymentResult<PaymentSessionRequest> {
        if !request.amount.is_finite() || request.amount <= 0.0 {
            return Err(PaymentError::InvalidRequest(format!(
                "金额必须大于 0: {}",
                request.amount
            )));
        }
        let order_id = request.order_id.trim();
        if order_id.is_empty() {
            return Err(PaymentError::InvalidRequest("order_id 不能为空".to_string()));
        }

        Ok(PaymentSessionRequest {
            amount: Money::from_major(request.amount),
            currency: if request.currency.trim().is_empty() {
                self.merchant.currency.clone()
            } else {
                request.currency.clone()
            },
            country: self.merchant.country.clone(),
            order_id: order_id.to_string(),
            description: self.merchant.description_for(order_id),
            success_url: self.merchant.success_url.clone(),
            back_url: self.merchant.back_url.clone(),
            notification_url: request.notification_url.clone(),
            payer: request.payer.clone(),
        })
    }
}

/// 凭证缺失时的占位渠道
struct UnconfiguredProvider(PaymentProviderKind);

#[async_trait::async_trait]
impl PaymentProvider for UnconfiguredProvider {
    fn kind(&self) -> PaymentProviderKind {
        self.0
    }

    async fn create_session(
        &self,
        _request: &PaymentSessionRequest,
    ) -> PaymentResult<crate::payment::models::PaymentSession> {
        tracing::error!("支付渠道 {} 凭证未配置", self.0);
        Err(PaymentError::MissingCredentials(match self.0 {
            PaymentProviderKind::DlocalGo => "DLOCAL_API_KEY / DLOCAL_API_SECRET",
            PaymentProviderKind::MercadoPago => "PAYMENT_MERCADOPAGO_ACCESS_TOKEN",
        }))
    }
}
