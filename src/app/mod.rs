// ==========================================
// Marmita Express - 应用层
// ==========================================
// 职责: HTTP 服务，连接前端与支付/消息/地址查询服务
// ==========================================

pub mod handlers;
pub mod router;
pub mod state;

// 重导出
pub use handlers::ErrorResponse;
pub use router::{create_router, LEGACY_CREATE_PAYMENT_PATH, LEGACY_WEBHOOK_PATH};
pub use state::{build_http_client, load_regions, AppState};
