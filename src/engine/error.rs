// ==========================================
// Marmita Express - 引擎层错误类型
// ==========================================

use crate::domain::types::Stage;
use thiserror::Error;

/// 草稿状态迁移错误
///
/// 仅表示非法意图（未知 id、阶段未开放等），
/// "第三份餐" 这类业务拒绝不走错误通道，见 `Rejection`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("未知餐品: {0}")]
    UnknownItem(String),

    #[error("未知加料: {0}")]
    UnknownAddOn(String),

    #[error("未知饮料: {0}")]
    UnknownBeverage(String),

    #[error("餐品未被选中: {0}")]
    ItemNotSelected(String),

    #[error("套餐份数必须 ≥ 1, 实际: {0}")]
    InvalidComboQuantity(u32),

    #[error("未知州代码: {0}")]
    UnknownRegion(String),

    #[error("城市 {locality} 不属于州 {region}")]
    UnknownLocality { region: String, locality: String },

    #[error("阶段未开放: {0}")]
    StageLocked(Stage),

    #[error("下单流程尚未开始")]
    NotStarted,
}

pub type DraftResult<T> = Result<T, DraftError>;
