// ==========================================
// Marmita Express - 订单草稿
// ==========================================
// 职责: 一次浏览会话内的未提交订单状态
// 生命周期: 每次"开始下单"时重置
// ==========================================

use crate::domain::catalog::{ITEMS_PER_COMBO, NO_BEVERAGE_ID};
use crate::domain::contact::{ContactInfo, DeliveryAddress};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// 订单草稿
///
/// 不变量：
/// - selected_items 长度 ∈ {0, 1, 2}
/// - add_ons_by_item 只包含 selected_items 中的餐品
/// - combo_quantity ≥ 1
/// - 任一付费饮料数量 > 0 时不含 "none"；否则 "none" 数量 = combo_quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    /// 会话 ID（每次重置重新生成）
    pub session_id: Uuid,
    /// 已选餐品（保持选择顺序）
    pub selected_items: Vec<String>,
    /// 餐品 → 加料集合
    pub add_ons_by_item: BTreeMap<String, BTreeSet<String>>,
    /// 套餐份数
    pub combo_quantity: u32,
    /// 饮料 → 数量
    pub beverage_quantities: BTreeMap<String, u32>,
    /// 整单通用加料（按份数计价）
    pub general_add_ons: BTreeSet<String>,
    /// 甜品加购（整单一次）
    pub dessert: bool,
    pub contact: ContactInfo,
    pub address: DeliveryAddress,
}

impl OrderDraft {
    /// 创建空草稿（1 份套餐，不要饮料）
    pub fn new() -> Self {
        let mut beverage_quantities = BTreeMap::new();
        beverage_quantities.insert(NO_BEVERAGE_ID.to_string(), 1);

        Self {
            session_id: Uuid::new_v4(),
            selected_items: Vec::new(),
            add_ons_by_item: BTreeMap::new(),
            combo_quantity: 1,
            beverage_quantities,
            general_add_ons: BTreeSet::new(),
            dessert: false,
            contact: ContactInfo::default(),
            address: DeliveryAddress::default(),
        }
    }

    /// 两份餐是否已选齐
    pub fn is_combo_complete(&self) -> bool {
        self.selected_items.len() == ITEMS_PER_COMBO
    }

    pub fn is_item_selected(&self, item_id: &str) -> bool {
        self.selected_items.iter().any(|id| id == item_id)
    }

    /// 指定餐品的加料（未选时为空）
    pub fn add_ons_for(&self, item_id: &str) -> impl Iterator<Item = &String> {
        self.add_ons_by_item.get(item_id).into_iter().flatten()
    }

    pub fn beverage_quantity(&self, beverage_id: &str) -> u32 {
        self.beverage_quantities.get(beverage_id).copied().unwrap_or(0)
    }

    /// 付费饮料总数
    pub fn priced_beverage_count(&self) -> u32 {
        self.beverage_quantities
            .iter()
            .filter(|(id, _)| id.as_str() != NO_BEVERAGE_ID)
            .map(|(_, qty)| *qty)
            .sum()
    }

    /// 校验饮料互斥不变量
    pub fn beverage_invariant_holds(&self) -> bool {
        let priced = self.priced_beverage_count();
        let none = self.beverage_quantity(NO_BEVERAGE_ID);
        if priced > 0 {
            none == 0
        } else {
            none == self.combo_quantity
        }
    }
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self::new()
    }
}
