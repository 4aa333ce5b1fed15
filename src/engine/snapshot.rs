// ==========================================
// Marmita Express - 视图快照
// ==========================================
// 职责: 草稿 → 渲染层所需的全部派生数据
// 说明: 每次被接受的意图后重新生成一次（单次重绘）
// ==========================================

use crate::domain::catalog::Catalog;
use crate::domain::draft::OrderDraft;
use crate::domain::money::CurrencyFormat;
use crate::domain::types::Stage;
use crate::engine::pricing::{PricingEngine, SummaryLine, SummaryLineKind};
use crate::engine::visibility::StageVisibility;
use crate::i18n::{t_for, t_for_with_args};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 步骤指示条中的一步
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepIndicator {
    pub stage: Stage,
    pub number: u8,
    pub label: String,
    pub active: bool,
}

/// 已渲染的汇总行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedLine {
    pub kind: SummaryLineKind,
    pub label: String,
    pub amount: String,
}

/// 草稿视图快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub session_id: Uuid,
    pub locale: String,
    pub visibility: StageVisibility,
    pub steps: Vec<StepIndicator>,
    pub selected_items: Vec<String>,
    pub combo_quantity: u32,
    /// 套餐基价（最小单位）
    pub base_minor: i64,
    pub base_display: String,
    /// 总价（最小单位）
    pub total_minor: i64,
    pub total_display: String,
    /// 命中断点时的促销文案
    pub promo_label: Option<String>,
    /// 下一个断点的交叉促销横幅
    pub cross_sell: Option<String>,
    /// 甜品加购文案（饮料阶段可见时）
    pub dessert_offer: Option<String>,
    pub lines: Vec<RenderedLine>,
    /// 邮编问题提示
    pub postal_code_message: Option<String>,
    /// 最近一次被拒绝意图的提示
    pub warning: Option<String>,
}

/// 渲染快照
///
/// 金额与文案均按 `locale` 输出，不读取全局语言
pub fn render_snapshot(
    draft: &OrderDraft,
    catalog: &Catalog,
    started: bool,
    locale: &str,
    warning: Option<String>,
) -> DraftSnapshot {
    let visibility = StageVisibility::compute(draft, started);
    let breakdown = PricingEngine::new(catalog).breakdown(draft);
    let currency = CurrencyFormat::for_locale(locale);
    let profile = &catalog.pricing;

    let steps = Stage::ALL
        .iter()
        .map(|stage| StepIndicator {
            stage: *stage,
            number: stage.step_number(),
            label: t_for(locale, stage.label_key()),
            active: visibility.current_stage == Some(*stage),
        })
        .collect();

    let promo_label = breakdown.tier_applied.map(|q| {
        let price = breakdown.base.format(&currency);
        promo_text(locale, q, &price)
    });

    let cross_sell = if visibility.summary_visible {
        profile
            .next_tier_above(draft.combo_quantity)
            .map(|(count, price)| {
                t_for_with_args(
                    locale,
                    "promo.cross_sell",
                    &[("count", &count.to_string()), ("price", &price.format(&currency))],
                )
            })
    } else {
        None
    };

    let dessert_offer = visibility.dessert_offer_visible.then(|| {
        t_for_with_args(
            locale,
            "promo.dessert_offer",
            &[("price", &profile.dessert_price.format(&currency))],
        )
    });

    let lines = if visibility.summary_visible {
        breakdown
            .lines
            .iter()
            .map(|line| render_line(line, locale, &currency))
            .collect()
    } else {
        Vec::new()
    };

    DraftSnapshot {
        session_id: draft.session_id,
        locale: locale.to_string(),
        steps,
        selected_items: draft.selected_items.clone(),
        combo_quantity: draft.combo_quantity,
        base_minor: breakdown.base.minor_units(),
        base_display: breakdown.base.format(&currency),
        total_minor: breakdown.total.minor_units(),
        total_display: breakdown.total.format(&currency),
        promo_label,
        cross_sell,
        dessert_offer,
        lines,
        postal_code_message: draft
            .address
            .postal_code_issue
            .map(|issue| t_for(locale, issue.message_key())),
        warning,
        visibility,
    }
}

/// 断点促销文案；没有专用文案的断点使用通用模板
fn promo_text(locale: &str, quantity: u32, price: &str) -> String {
    let key = format!("promo.tier_{}", quantity);
    let text = t_for_with_args(locale, &key, &[("price", price)]);
    // rust-i18n 缺失键时原样返回键名
    if text.ends_with(&key) {
        t_for_with_args(
            locale,
            "promo.tier_generic",
            &[("count", &quantity.to_string()), ("price", price)],
        )
    } else {
        text
    }
}

fn render_line(line: &SummaryLine, locale: &str, currency: &CurrencyFormat) -> RenderedLine {
    let label = match line.kind {
        SummaryLineKind::Item => {
            let name = match &line.detail {
                Some(add_ons) => format!("{} + {}", line.label, add_ons),
                None => line.label.clone(),
            };
            if line.quantity > 1 {
                t_for_with_args(
                    locale,
                    "summary.item_line",
                    &[("name", &name), ("count", &line.quantity.to_string())],
                )
            } else {
                name
            }
        }
        SummaryLineKind::Dessert => t_for(locale, "summary.dessert"),
        SummaryLineKind::GeneralAddOn => line.label.clone(),
        SummaryLineKind::Beverage => t_for_with_args(
            locale,
            "summary.beverage_line",
            &[("name", &line.label), ("count", &line.quantity.to_string())],
        ),
    };
    let amount = match line.amount {
        Some(amount) => amount.format(currency),
        None => t_for(locale, "summary.included"),
    };
    RenderedLine {
        kind: line.kind,
        label,
        amount,
    }
}
