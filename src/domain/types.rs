// ==========================================
// Marmita Express - 领域类型定义
// ==========================================
// 职责: 下单流程阶段、支付渠道、地址查询类型等枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 下单阶段 (Order Stage)
// ==========================================
// 顺序固定: 选餐 → 加料 → 饮料与份数 → 地址与汇总
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    ItemSelection,       // 选择两份餐
    AddOns,              // 每份餐加料
    BeverageAndQuantity, // 饮料 + 套餐份数
    AddressAndSummary,   // 地址 + 订单汇总
}

impl Stage {
    /// 全部阶段（按流程顺序）
    pub const ALL: [Stage; 4] = [
        Stage::ItemSelection,
        Stage::AddOns,
        Stage::BeverageAndQuantity,
        Stage::AddressAndSummary,
    ];

    /// 阶段序号（从 1 开始，用于步骤指示条）
    pub fn step_number(&self) -> u8 {
        match self {
            Stage::ItemSelection => 1,
            Stage::AddOns => 2,
            Stage::BeverageAndQuantity => 3,
            Stage::AddressAndSummary => 4,
        }
    }

    /// 步骤指示条的 i18n 键
    pub fn label_key(&self) -> &'static str {
        match self {
            Stage::ItemSelection => "stage.item_selection",
            Stage::AddOns => "stage.add_ons",
            Stage::BeverageAndQuantity => "stage.beverage",
            Stage::AddressAndSummary => "stage.address",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::ItemSelection => write!(f, "ITEM_SELECTION"),
            Stage::AddOns => write!(f, "ADD_ONS"),
            Stage::BeverageAndQuantity => write!(f, "BEVERAGE_AND_QUANTITY"),
            Stage::AddressAndSummary => write!(f, "ADDRESS_AND_SUMMARY"),
        }
    }
}

// ==========================================
// 支付渠道 (Payment Provider Kind)
// ==========================================
// 由配置项 payment.provider 选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentProviderKind {
    DlocalGo,
    MercadoPago,
}

impl fmt::Display for PaymentProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentProviderKind::DlocalGo => write!(f, "dlocal_go"),
            PaymentProviderKind::MercadoPago => write!(f, "mercado_pago"),
        }
    }
}

impl std::str::FromStr for PaymentProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "dlocal" | "dlocal_go" | "dlocalgo" => Ok(PaymentProviderKind::DlocalGo),
            "mercado_pago" | "mercadopago" => Ok(PaymentProviderKind::MercadoPago),
            other => Err(format!("未知的支付渠道: {}", other)),
        }
    }
}

// ==========================================
// 运行环境 (Provider Environment)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderEnvironment {
    Sandbox,
    Production,
}

impl ProviderEnvironment {
    /// 解析环境标识，只有 "sandbox" 视为沙箱
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("sandbox") {
            ProviderEnvironment::Sandbox
        } else {
            ProviderEnvironment::Production
        }
    }
}

// ==========================================
// 异步查询类型 (Lookup Kind)
// ==========================================
// 每类查询各自维护请求令牌
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    PostalCode,
    ReverseGeocode,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKind::PostalCode => write!(f, "postal_code"),
            LookupKind::ReverseGeocode => write!(f, "reverse_geocode"),
        }
    }
}

// ==========================================
// 邮编问题 (Postal Code Issue)
// ==========================================
// 邮编失焦校验/查询结果产生的问题标记，存在即视为邮编无效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostalCodeIssue {
    Malformed,        // 位数不为 8
    NotFound,         // 查询返回不存在
    OutsideLocality,  // 与已选城市不一致
}

impl PostalCodeIssue {
    pub fn message_key(&self) -> &'static str {
        match self {
            PostalCodeIssue::Malformed => "validation.postal_code_invalid",
            PostalCodeIssue::NotFound => "validation.postal_code_not_found",
            PostalCodeIssue::OutsideLocality => "validation.postal_code_outside_locality",
        }
    }
}
