// ==========================================
// Marmita Express - HTTP 处理器
// ==========================================
// 职责: 请求解析 → 调用服务 → 统一 JSON 响应
// 错误响应体: {"error": "<消息>"}
// ==========================================

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::app::state::AppState;
use crate::domain::catalog::ITEMS_PER_COMBO;
use crate::domain::draft::OrderDraft;
use crate::engine::lookup::LookupOutcome;
use crate::engine::snapshot::render_snapshot;
use crate::i18n::t_for;
use crate::payment::models::CreatePaymentRequest;

/// 报价接口接受的最大份数
const MAX_QUOTE_QUANTITY: u32 = 50;

/// 统一错误响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// 把 ApiError 转为 HTTP 响应
pub fn error_response(locale: &str, err: &ApiError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = match (err, err.message_key()) {
        (ApiError::PaymentSessionFailed { message, .. }, _) if !message.is_empty() => message.clone(),
        (ApiError::PaymentSessionFailed { .. }, _) => t_for(locale, "payment.provider_error"),
        (ApiError::InvalidInput(_), _) => t_for(locale, "payment.invalid_request"),
        (_, Some(key)) => t_for(locale, key),
        (other, None) => other.to_string(),
    };

    if status.is_server_error() {
        tracing::error!("请求失败: {}", err);
    } else {
        tracing::warn!("请求被拒绝: {}", err);
    }
    (status, Json(ErrorResponse { error: message })).into_response()
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}

/// POST /api/create-payment
pub async fn create_payment(
    State(state): State<AppState>,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return error_response(&state.locale, &ApiError::InvalidInput(rejection.body_text()));
        }
    };

    match state.payment_service.create_payment(&request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(&state.locale, &ApiError::from(e)),
    }
}

/// 非 POST 的下单请求
pub async fn create_payment_method_not_allowed(State(state): State<AppState>) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            error: t_for(&state.locale, "payment.method_not_allowed"),
        }),
    )
        .into_response()
}

/// POST /api/webhooks/payment
///
/// 载荷不是合法 JSON 时返回 400 且不转发
pub async fn payment_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("回调载荷无法解析: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                t_for(&state.locale, "webhook.invalid_payload"),
            )
                .into_response();
        }
    };

    match state.webhook_relay.relay(&payload).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(&state.locale, &ApiError::from(e)),
    }
}

/// 非 POST 的回调请求
pub async fn webhook_method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response()
}

/// GET /api/catalog
pub async fn get_catalog(State(state): State<AppState>) -> Response {
    Json(state.catalog.as_ref().clone()).into_response()
}

/// GET /api/regions
pub async fn get_regions(State(state): State<AppState>) -> Response {
    Json(state.regions.as_ref().clone()).into_response()
}

/// POST /api/quote
///
/// 按草稿计算总价与汇总行（服务端复核价格）
pub async fn quote(
    State(state): State<AppState>,
    payload: Result<Json<OrderDraft>, JsonRejection>,
) -> Response {
    let Json(draft) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return error_response(&state.locale, &ApiError::InvalidInput(rejection.body_text()));
        }
    };
    if !(1..=MAX_QUOTE_QUANTITY).contains(&draft.combo_quantity)
        || draft.selected_items.len() > ITEMS_PER_COMBO
    {
        return error_response(
            &state.locale,
            &ApiError::InvalidInput(format!("草稿无效: 份数={}", draft.combo_quantity)),
        );
    }
    let snapshot = render_snapshot(&draft, &state.catalog, true, &state.locale, None);
    Json(snapshot).into_response()
}

/// GET /api/postal-code/{code}
pub async fn lookup_postal_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Response {
    let outcome = state.address_api.lookup_postal_code(&code).await;
    lookup_response(outcome)
}

#[derive(Debug, Deserialize)]
pub struct LocateQuery {
    pub lat: f64,
    pub lon: f64,
}

/// GET /api/locate?lat=..&lon=..
pub async fn locate(State(state): State<AppState>, Query(query): Query<LocateQuery>) -> Response {
    let outcome = state.address_api.locate(query.lat, query.lon).await;
    lookup_response(outcome)
}

/// 查询失败也返回 200，由调用方降级为手工输入
fn lookup_response<T: Serialize>(outcome: LookupOutcome<T>) -> Response {
    Json(outcome).into_response()
}
