// ==========================================
// Mock 外部服务 - 用于集成测试
// ==========================================
// 支付渠道 / 消息通道 / 地址查询 的内存实现
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;

use marmita_express::domain::{PaymentProviderKind, PostalAddress};
use marmita_express::lookup::{
    GeoAddress, IpLocation, IpLocator, LookupError, LookupResult, PostalCodeLookup, ReverseGeocoder,
};
use marmita_express::messaging::{MessagingClient, MessagingError, MessagingResult};
use marmita_express::payment::{
    PaymentError, PaymentProvider, PaymentResult, PaymentSession, PaymentSessionRequest,
};

// ==========================================
// 支付渠道
// ==========================================

/// 记录请求的支付渠道
pub struct MockPaymentProvider {
    pub requests: Mutex<Vec<PaymentSessionRequest>>,
    reject_with: Option<(u16, String)>,
}

impl MockPaymentProvider {
    /// 总是成功，跳转地址为 https://pay.example/{order_id}
    pub fn accepting() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reject_with: None,
        }
    }

    /// 总是拒绝
    pub fn rejecting(status: u16, message: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reject_with: Some((status, message.to_string())),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<PaymentSessionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    fn kind(&self) -> PaymentProviderKind {
        PaymentProviderKind::DlocalGo
    }

    async fn create_session(&self, request: &PaymentSessionRequest) -> PaymentResult<PaymentSession> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some((status, message)) = &self.reject_with {
            return Err(PaymentError::Rejected {
                status: *status,
                message: message.clone(),
            });
        }
        Ok(PaymentSession {
            provider: PaymentProviderKind::DlocalGo,
            redirect_url: format!("https://pay.example/{}", request.order_id),
            provider_reference: Some("PAY-1".to_string()),
        })
    }
}

// ==========================================
// 消息通道
// ==========================================

/// 记录发送内容的消息通道
#[derive(Default)]
pub struct RecordingMessaging {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl RecordingMessaging {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MessagingClient for RecordingMessaging {
    async fn send_text(&self, number: &str, text: &str) -> MessagingResult<serde_json::Value> {
        if self.fail {
            return Err(MessagingError::Api {
                status: 500,
                message: "instance offline".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((number.to_string(), text.to_string()));
        Ok(json!({"key": {"id": "MSG-1"}, "status": "PENDING"}))
    }
}

// ==========================================
// 地址查询
// ==========================================

/// 固定结果的邮编查询
pub struct FixedPostalLookup(pub Option<PostalAddress>);

#[async_trait]
impl PostalCodeLookup for FixedPostalLookup {
    async fn lookup(&self, _postal_code: &str) -> LookupResult<Option<PostalAddress>> {
        Ok(self.0.clone())
    }
}

/// 总是失败的反向地理编码
pub struct UnavailableGeocoder;

#[async_trait]
impl ReverseGeocoder for UnavailableGeocoder {
    async fn reverse(&self, _latitude: f64, _longitude: f64) -> LookupResult<Option<GeoAddress>> {
        Err(LookupError::Status(503))
    }
}

/// 固定结果的 IP 定位
pub struct FixedIpLocator(pub IpLocation);

#[async_trait]
impl IpLocator for FixedIpLocator {
    async fn locate(&self) -> LookupResult<IpLocation> {
        Ok(self.0.clone())
    }
}
