// ==========================================
// Marmita Express - 支付层
// ==========================================
// 职责: 统一的支付渠道接口 + 各渠道实现
// 红线: 不保存订单、不做对账、不重试
// ==========================================

pub mod dlocal;
pub mod error;
pub mod mercadopago;
pub mod models;
pub mod service;
pub mod traits;

pub use dlocal::DlocalGoProvider;
pub use error::{PaymentError, PaymentResult};
pub use mercadopago::MercadoPagoProvider;
pub use models::{
    CreatePaymentRequest, CreatePaymentResponse, Payer, PayerAddress, PaymentSession,
    PaymentSessionRequest,
};
pub use service::{MerchantSettings, PaymentService};
pub use traits::PaymentProvider;
