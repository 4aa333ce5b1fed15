// ==========================================
// Marmita Express - 步骤可见性编排
// ==========================================
// 职责: 由草稿推导四个阶段的可见性
// 规则: 阶段 N 可见 ⇔ 阶段 N-1 可见 且 其完成条件成立
// 红线: 回退（取消选择）必须确定性地隐藏所有后续阶段
// ==========================================

use crate::domain::draft::OrderDraft;
use crate::domain::types::Stage;
use serde::{Deserialize, Serialize};

/// 阶段完成条件
///
/// - 选餐: 恰好两份
/// - 加料: 可选项，始终完成
/// - 饮料与份数: 份数 ≥ 1 且饮料互斥不变量成立
/// - 地址与汇总: 终态，交给结账校验
pub fn stage_complete(stage: Stage, draft: &OrderDraft) -> bool {
    match stage {
        Stage::ItemSelection => draft.is_combo_complete(),
        Stage::AddOns => true,
        Stage::BeverageAndQuantity => {
            draft.combo_quantity >= 1 && draft.beverage_invariant_holds()
        }
        Stage::AddressAndSummary => false,
    }
}

/// 阶段可见性快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageVisibility {
    /// 是否已点击"开始下单"
    pub started: bool,
    pub item_selection: bool,
    pub add_ons: bool,
    pub beverage_and_quantity: bool,
    pub address_and_summary: bool,
    /// 最远的可见阶段
    pub current_stage: Option<Stage>,
    /// 汇总面板（⇔ 已选两份）
    pub summary_visible: bool,
    /// 甜品加购与饮料阶段同时出现
    pub dessert_offer_visible: bool,
}

impl StageVisibility {
    /// 由草稿计算可见性
    pub fn compute(draft: &OrderDraft, started: bool) -> Self {
        let mut visible = [false; 4];
        if started {
            visible[0] = true;
            for i in 1..Stage::ALL.len() {
                visible[i] = visible[i - 1] && stage_complete(Stage::ALL[i - 1], draft);
            }
        }

        let current_stage = Stage::ALL
            .iter()
            .zip(visible.iter())
            .filter(|(_, v)| **v)
            .map(|(s, _)| *s)
            .last();

        Self {
            started,
            item_selection: visible[0],
            add_ons: visible[1],
            beverage_and_quantity: visible[2],
            address_and_summary: visible[3],
            current_stage,
            summary_visible: started && draft.is_combo_complete(),
            dessert_offer_visible: visible[2],
        }
    }

    pub fn is_visible(&self, stage: Stage) -> bool {
        match stage {
            Stage::ItemSelection => self.item_selection,
            Stage::AddOns => self.add_ons,
            Stage::BeverageAndQuantity => self.beverage_and_quantity,
            Stage::AddressAndSummary => self.address_and_summary,
        }
    }

    /// 步骤指示条序号（未开始为 0）
    pub fn step_number(&self) -> u8 {
        self.current_stage.map(|s| s.step_number()).unwrap_or(0)
    }
}
