// ==========================================
// Marmita Express - HTTP 路由
// ==========================================
// 路由: /health, 下单, 支付回调, 目录/报价/地址查询
// 兼容: /.netlify/functions/* 旧路径作为别名保留
// ==========================================

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Level;

use crate::api::{CREATE_PAYMENT_PATH, PAYMENT_WEBHOOK_PATH};
use crate::app::handlers::{
    create_payment, create_payment_method_not_allowed, get_catalog, get_regions, health, locate,
    lookup_postal_code, payment_webhook, quote, webhook_method_not_allowed,
};
use crate::app::state::AppState;

/// 旧版下单路径
pub const LEGACY_CREATE_PAYMENT_PATH: &str = "/.netlify/functions/create-payment";

/// 旧版回调路径
pub const LEGACY_WEBHOOK_PATH: &str = "/.netlify/functions/notifications";

/// 请求体上限（1 MiB）
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::permissive();
    let body_limit = RequestBodyLimitLayer::new(BODY_LIMIT_BYTES);
    let trace = TraceLayer::new_for_http()
        .make_span_with(|req: &axum::http::Request<_>| {
            let req_id = req
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %req.method(),
                uri = %req.uri(),
                req_id
            )
        })
        .on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
        .on_response(
            tower_http::trace::DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(tower_http::LatencyUnit::Millis),
        );
    let req_id = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id());

    let create_payment_route = post(create_payment).fallback(create_payment_method_not_allowed);
    let webhook_route = post(payment_webhook).fallback(webhook_method_not_allowed);

    Router::new()
        .route("/health", get(health))
        .route(CREATE_PAYMENT_PATH, create_payment_route.clone())
        .route(LEGACY_CREATE_PAYMENT_PATH, create_payment_route)
        .route(PAYMENT_WEBHOOK_PATH, webhook_route.clone())
        .route(LEGACY_WEBHOOK_PATH, webhook_route)
        .route("/api/catalog", get(get_catalog))
        .route("/api/regions", get(get_regions))
        .route("/api/quote", post(quote))
        .route("/api/postal-code/{code}", get(lookup_postal_code))
        .route("/api/locate", get(locate))
        .layer(cors)
        .layer(trace)
        .layer(req_id)
        .layer(body_limit)
        .with_state(state)
}
