// ==========================================
// Marmita Express - 计价引擎
// ==========================================
// 职责: OrderDraft → 总价（纯函数）+ 汇总明细行
// 规则:
//   1. 套餐基价 = 断点一口价 或 单价 × 份数
//   2. 甜品加购整单一次
//   3. 单品加料 × 份数
//   4. 通用加料 × 份数
//   5. 饮料 × 各自数量（不乘份数）
// ==========================================

use crate::config::PricingProfile;
use crate::domain::catalog::{Catalog, NO_BEVERAGE_ID};
use crate::domain::draft::OrderDraft;
use crate::domain::money::Money;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// 套餐基价
///
/// 命中断点时使用一口价，否则线性计价
pub fn tiered_price(profile: &PricingProfile, quantity: u32) -> Money {
    profile
        .tier_for(quantity)
        .unwrap_or(profile.unit_price * quantity)
}

/// 汇总行类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryLineKind {
    /// 套餐中的一份餐（含在套餐价内）
    Item,
    Dessert,
    GeneralAddOn,
    Beverage,
}

/// 汇总明细行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryLine {
    pub kind: SummaryLineKind,
    pub label: String,
    /// 附加说明（单品行为加料名，逗号分隔）
    pub detail: Option<String>,
    pub quantity: u32,
    /// None 表示含在套餐价内
    pub amount: Option<Money>,
}

/// 价格分解
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub combo_quantity: u32,
    pub base: Money,
    /// 命中的断点份数
    pub tier_applied: Option<u32>,
    pub dessert: Money,
    pub item_add_ons: Money,
    pub general_add_ons: Money,
    pub beverages: Money,
    pub total: Money,
    pub lines: Vec<SummaryLine>,
}

// ==========================================
// PricingEngine
// ==========================================

pub struct PricingEngine<'a> {
    catalog: &'a Catalog,
}

impl<'a> PricingEngine<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// 套餐基价
    pub fn base_price(&self, quantity: u32) -> Money {
        tiered_price(&self.catalog.pricing, quantity)
    }

    /// 订单总价（不构建汇总行）
    pub fn total(&self, draft: &OrderDraft) -> Money {
        self.amounts(draft).total
    }

    /// 计算价格分解与汇总行
    ///
    /// 行数只与所选餐品、加料、饮料种类有关，与份数无关
    #[instrument(skip(self, draft), fields(session_id = %draft.session_id))]
    pub fn breakdown(&self, draft: &OrderDraft) -> PriceBreakdown {
        let mut breakdown = self.amounts(draft);
        breakdown.lines = self.summary_lines(draft);
        breakdown
    }

    /// 各部分金额
    ///
    /// 草稿中未知的 id 直接跳过（reducer 已保证不会出现）
    fn amounts(&self, draft: &OrderDraft) -> PriceBreakdown {
        let q = draft.combo_quantity;
        let profile = &self.catalog.pricing;

        // 1. 套餐基价
        let base = self.base_price(q);
        let tier_applied = profile.tier_for(q).map(|_| q);

        // 2. 甜品
        let dessert = if draft.dessert {
            profile.dessert_price
        } else {
            Money::ZERO
        };

        // 3. 单品加料 × 份数
        let item_add_ons: Money = draft
            .selected_items
            .iter()
            .flat_map(|item_id| draft.add_ons_for(item_id))
            .filter_map(|id| self.catalog.add_on(id))
            .map(|a| a.price * q)
            .sum();

        // 4. 通用加料 × 份数
        let general_add_ons: Money = draft
            .general_add_ons
            .iter()
            .filter_map(|id| self.catalog.add_on(id))
            .map(|a| a.price * q)
            .sum();

        // 5. 饮料 × 各自数量
        let beverages: Money = draft
            .beverage_quantities
            .iter()
            .filter(|(id, _)| id.as_str() != NO_BEVERAGE_ID)
            .filter_map(|(id, qty)| self.catalog.beverage(id).map(|b| b.price * *qty))
            .sum();

        let total = base + dessert + item_add_ons + general_add_ons + beverages;
        tracing::debug!("计价完成: q={}, total={}", q, total);

        PriceBreakdown {
            combo_quantity: q,
            base,
            tier_applied,
            dessert,
            item_add_ons,
            general_add_ons,
            beverages,
            total,
            lines: Vec::new(),
        }
    }

    /// 汇总明细行
    ///
    /// 单品行每个餐品一行，quantity 为套餐份数；甜品行 label 留空，由渲染层按语言填写
    fn summary_lines(&self, draft: &OrderDraft) -> Vec<SummaryLine> {
        let q = draft.combo_quantity;
        let profile = &self.catalog.pricing;
        let mut lines = Vec::new();

        for item_id in &draft.selected_items {
            let Some(item) = self.catalog.item(item_id) else {
                continue;
            };
            let names: Vec<&str> = draft
                .add_ons_for(item_id)
                .filter_map(|id| self.catalog.add_on(id))
                .map(|a| a.name.as_str())
                .collect();
            lines.push(SummaryLine {
                kind: SummaryLineKind::Item,
                label: item.name.clone(),
                detail: (!names.is_empty()).then(|| names.join(", ")),
                quantity: q,
                amount: None,
            });
        }

        if draft.dessert {
            lines.push(SummaryLine {
                kind: SummaryLineKind::Dessert,
                label: String::new(),
                detail: None,
                quantity: 1,
                amount: Some(profile.dessert_price),
            });
        }

        for add_on in draft
            .general_add_ons
            .iter()
            .filter_map(|id| self.catalog.add_on(id))
        {
            lines.push(SummaryLine {
                kind: SummaryLineKind::GeneralAddOn,
                label: add_on.name.clone(),
                detail: None,
                quantity: q,
                amount: Some(add_on.price * q),
            });
        }

        for (id, qty) in &draft.beverage_quantities {
            if id == NO_BEVERAGE_ID || *qty == 0 {
                continue;
            }
            let Some(beverage) = self.catalog.beverage(id) else {
                continue;
            };
            lines.push(SummaryLine {
                kind: SummaryLineKind::Beverage,
                label: beverage.name.clone(),
                detail: None,
                quantity: *qty,
                amount: Some(beverage.price * *qty),
            });
        }

        lines
    }
}
