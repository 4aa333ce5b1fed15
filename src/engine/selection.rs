// ==========================================
// Marmita Express - 选择控制器（草稿 reducer）
// ==========================================
// 职责: 把用户意图 (OrderIntent) 应用到草稿，产出新草稿
// 红线: 纯函数，不做 IO，不修改入参草稿
// 红线: 第三份餐被拒绝时草稿保持不变
// ==========================================

use crate::domain::catalog::{Catalog, ITEMS_PER_COMBO, NO_BEVERAGE_ID};
use crate::domain::contact::{digits_only, mask_phone, mask_postal_code, PostalAddress};
use crate::domain::draft::OrderDraft;
use crate::domain::region::{normalize_place_name, LocationHint, RegionCatalog};
use crate::domain::types::{PostalCodeIssue, Stage};
use crate::engine::error::{DraftError, DraftResult};
use crate::engine::events::DraftEventType;
use crate::engine::visibility::StageVisibility;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// CPF 最多 11 位
const TAX_ID_DIGITS: usize = 11;

// ==========================================
// OrderIntent - 用户意图
// ==========================================

/// 用户意图（一次离散交互）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum OrderIntent {
    /// 开始下单（重置草稿）
    StartOrder,
    ToggleItem(String),
    ToggleItemAddOn { item_id: String, add_on_id: String },
    ToggleGeneralAddOn(String),
    SetComboQuantity(u32),
    IncrementComboQuantity,
    DecrementComboQuantity,
    IncrementBeverage(String),
    DecrementBeverage(String),
    SelectNoBeverage,
    SetDessert(bool),
    SetContactName(String),
    SetPhone(String),
    SetTaxIdRequested(bool),
    SetTaxId(String),
    /// 空字符串表示清空
    SelectRegion(String),
    /// 空字符串表示清空
    SelectLocality(String),
    SetPostalCode(String),
    /// 邮编输入框失焦
    PostalCodeBlurred,
    SetStreet(String),
    SetNumber(String),
    SetNeighborhood(String),
    /// 邮编查询结果回填（None = 邮编不存在）
    ApplyPostalLookup(Option<PostalAddress>),
    /// 定位结果回填
    ApplyLocationHint(LocationHint),
}

impl OrderIntent {
    /// 意图对应的事件类型
    pub fn event_type(&self) -> DraftEventType {
        match self {
            OrderIntent::StartOrder => DraftEventType::OrderStarted,
            OrderIntent::ToggleItem(_) => DraftEventType::ItemsChanged,
            OrderIntent::ToggleItemAddOn { .. } | OrderIntent::ToggleGeneralAddOn(_) => {
                DraftEventType::AddOnsChanged
            }
            OrderIntent::SetComboQuantity(_)
            | OrderIntent::IncrementComboQuantity
            | OrderIntent::DecrementComboQuantity => DraftEventType::QuantityChanged,
            OrderIntent::IncrementBeverage(_)
            | OrderIntent::DecrementBeverage(_)
            | OrderIntent::SelectNoBeverage => DraftEventType::BeveragesChanged,
            OrderIntent::SetDessert(_) => DraftEventType::DessertChanged,
            OrderIntent::SetContactName(_)
            | OrderIntent::SetPhone(_)
            | OrderIntent::SetTaxIdRequested(_)
            | OrderIntent::SetTaxId(_) => DraftEventType::ContactChanged,
            OrderIntent::SelectRegion(_)
            | OrderIntent::SelectLocality(_)
            | OrderIntent::SetPostalCode(_)
            | OrderIntent::PostalCodeBlurred
            | OrderIntent::SetStreet(_)
            | OrderIntent::SetNumber(_)
            | OrderIntent::SetNeighborhood(_)
            | OrderIntent::ApplyPostalLookup(_)
            | OrderIntent::ApplyLocationHint(_) => DraftEventType::AddressChanged,
        }
    }

    /// 意图所属阶段；None 表示不受阶段限制（联系人/地址随时可填）
    pub fn required_stage(&self) -> Option<Stage> {
        match self.event_type() {
            DraftEventType::AddOnsChanged => Some(Stage::AddOns),
            DraftEventType::QuantityChanged
            | DraftEventType::BeveragesChanged
            | DraftEventType::DessertChanged => Some(Stage::BeverageAndQuantity),
            _ => None,
        }
    }
}

// ==========================================
// Transition - 迁移结果
// ==========================================

/// 业务拒绝（展示提示，不改状态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// 已选满两份
    SelectionFull { limit: usize },
}

impl Rejection {
    pub fn message_key(&self) -> &'static str {
        match self {
            Rejection::SelectionFull { .. } => "selection.limit_reached",
        }
    }
}

/// 意图应用结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// 产生新草稿
    Changed(OrderDraft),
    /// 意图合法但无实际变化
    Unchanged,
    /// 被业务规则拒绝
    Rejected(Rejection),
}

// ==========================================
// SelectionController
// ==========================================

/// 选择控制器
pub struct SelectionController<'a> {
    catalog: &'a Catalog,
    regions: &'a RegionCatalog,
}

impl<'a> SelectionController<'a> {
    pub fn new(catalog: &'a Catalog, regions: &'a RegionCatalog) -> Self {
        Self { catalog, regions }
    }

    /// 应用意图
    ///
    /// # 参数
    /// - draft: 当前草稿（只读）
    /// - started: 是否已开始下单（决定阶段可见性）
    #[instrument(skip(self, draft), fields(session_id = %draft.session_id))]
    pub fn apply(
        &self,
        draft: &OrderDraft,
        started: bool,
        intent: &OrderIntent,
    ) -> DraftResult<Transition> {
        if let OrderIntent::StartOrder = intent {
            return Ok(Transition::Changed(OrderDraft::new()));
        }

        if let Some(stage) = intent.required_stage() {
            if !StageVisibility::compute(draft, started).is_visible(stage) {
                return Err(DraftError::StageLocked(stage));
            }
        }

        let mut next = draft.clone();
        if let Some(rejection) = self.mutate(&mut next, intent)? {
            tracing::debug!("意图被拒绝: {:?}", rejection);
            return Ok(Transition::Rejected(rejection));
        }

        if next == *draft {
            Ok(Transition::Unchanged)
        } else {
            Ok(Transition::Changed(next))
        }
    }

    /// 就地修改草稿副本；返回 Some 表示业务拒绝
    fn mutate(&self, draft: &mut OrderDraft, intent: &OrderIntent) -> DraftResult<Option<Rejection>> {
        match intent {
            OrderIntent::StartOrder => {}
            OrderIntent::ToggleItem(id) => return self.toggle_item(draft, id),
            OrderIntent::ToggleItemAddOn { item_id, add_on_id } => {
                self.toggle_item_add_on(draft, item_id, add_on_id)?
            }
            OrderIntent::ToggleGeneralAddOn(id) => {
                self.require_add_on(id)?;
                if !draft.general_add_ons.remove(id) {
                    draft.general_add_ons.insert(id.clone());
                }
            }
            OrderIntent::SetComboQuantity(q) => set_combo_quantity(draft, *q)?,
            OrderIntent::IncrementComboQuantity => {
                let quantity = draft.combo_quantity.saturating_add(1);
                set_combo_quantity(draft, quantity)?
            }
            OrderIntent::DecrementComboQuantity => {
                let quantity = draft.combo_quantity;
                if quantity > 1 {
                    set_combo_quantity(draft, quantity - 1)?
                }
            }
            OrderIntent::IncrementBeverage(id) => self.increment_beverage(draft, id)?,
            OrderIntent::DecrementBeverage(id) => self.decrement_beverage(draft, id)?,
            OrderIntent::SelectNoBeverage => select_no_beverage(draft),
            OrderIntent::SetDessert(flag) => draft.dessert = *flag,
            OrderIntent::SetContactName(name) => draft.contact.name = name.clone(),
            OrderIntent::SetPhone(raw) => draft.contact.phone = mask_phone(raw),
            OrderIntent::SetTaxIdRequested(flag) => {
                draft.contact.tax_id_requested = *flag;
                if !flag {
                    draft.contact.tax_id.clear();
                }
            }
            OrderIntent::SetTaxId(raw) => {
                draft.contact.tax_id = digits_only(raw).chars().take(TAX_ID_DIGITS).collect();
            }
            OrderIntent::SelectRegion(code) => self.select_region(draft, code)?,
            OrderIntent::SelectLocality(name) => self.select_locality(draft, name)?,
            OrderIntent::SetPostalCode(raw) => {
                draft.address.postal_code = mask_postal_code(raw);
                draft.address.postal_code_issue = None;
            }
            OrderIntent::PostalCodeBlurred => {
                let digits = digits_only(&draft.address.postal_code);
                draft.address.postal_code_issue = if digits.is_empty() {
                    None
                } else if digits.len() != 8 {
                    Some(PostalCodeIssue::Malformed)
                } else {
                    draft.address.postal_code_issue
                };
            }
            OrderIntent::SetStreet(street) => draft.address.street = street.clone(),
            OrderIntent::SetNumber(number) => draft.address.number = number.clone(),
            OrderIntent::SetNeighborhood(value) => draft.address.neighborhood = value.clone(),
            OrderIntent::ApplyPostalLookup(found) => apply_postal_lookup(draft, found.as_ref()),
            OrderIntent::ApplyLocationHint(hint) => self.apply_location_hint(draft, hint),
        }
        Ok(None)
    }

    // ==========================================
    // 选餐
    // ==========================================

    fn toggle_item(&self, draft: &mut OrderDraft, id: &str) -> DraftResult<Option<Rejection>> {
        if self.catalog.item(id).is_none() {
            return Err(DraftError::UnknownItem(id.to_string()));
        }

        if let Some(pos) = draft.selected_items.iter().position(|s| s == id) {
            draft.selected_items.remove(pos);
            draft.add_ons_by_item.remove(id);
            return Ok(None);
        }

        if draft.selected_items.len() >= ITEMS_PER_COMBO {
            return Ok(Some(Rejection::SelectionFull {
                limit: ITEMS_PER_COMBO,
            }));
        }

        draft.selected_items.push(id.to_string());
        Ok(None)
    }

    fn toggle_item_add_on(
        &self,
        draft: &mut OrderDraft,
        item_id: &str,
        add_on_id: &str,
    ) -> DraftResult<()> {
        if !draft.is_item_selected(item_id) {
            return Err(DraftError::ItemNotSelected(item_id.to_string()));
        }
        self.require_add_on(add_on_id)?;

        let set = draft.add_ons_by_item.entry(item_id.to_string()).or_default();
        if !set.remove(add_on_id) {
            set.insert(add_on_id.to_string());
        }
        if set.is_empty() {
            draft.add_ons_by_item.remove(item_id);
        }
        Ok(())
    }

    fn require_add_on(&self, id: &str) -> DraftResult<()> {
        match self.catalog.add_on(id) {
            Some(_) => Ok(()),
            None => Err(DraftError::UnknownAddOn(id.to_string())),
        }
    }

    // ==========================================
    // 饮料
    // ==========================================

    fn increment_beverage(&self, draft: &mut OrderDraft, id: &str) -> DraftResult<()> {
        let beverage = self
            .catalog
            .beverage(id)
            .ok_or_else(|| DraftError::UnknownBeverage(id.to_string()))?;

        if beverage.is_none_option() {
            select_no_beverage(draft);
            return Ok(());
        }

        draft.beverage_quantities.remove(NO_BEVERAGE_ID);
        *draft.beverage_quantities.entry(id.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn decrement_beverage(&self, draft: &mut OrderDraft, id: &str) -> DraftResult<()> {
        let beverage = self
            .catalog
            .beverage(id)
            .ok_or_else(|| DraftError::UnknownBeverage(id.to_string()))?;

        // "不要饮料" 只能通过选择付费饮料来取消
        if beverage.is_none_option() {
            return Ok(());
        }

        match draft.beverage_quantities.get_mut(id) {
            Some(qty) if *qty > 1 => *qty -= 1,
            Some(_) => {
                draft.beverage_quantities.remove(id);
            }
            None => return Ok(()),
        }

        if draft.priced_beverage_count() == 0 {
            select_no_beverage(draft);
        }
        Ok(())
    }

    // ==========================================
    // 州/城市
    // ==========================================

    fn select_region(&self, draft: &mut OrderDraft, code: &str) -> DraftResult<()> {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            draft.address.region.clear();
            draft.address.locality.clear();
            return Ok(());
        }
        if self.regions.region(&code).is_none() {
            return Err(DraftError::UnknownRegion(code));
        }
        if draft.address.region != code {
            draft.address.region = code;
            draft.address.locality.clear();
        }
        Ok(())
    }

    fn select_locality(&self, draft: &mut OrderDraft, name: &str) -> DraftResult<()> {
        if name.trim().is_empty() {
            draft.address.locality.clear();
            return Ok(());
        }
        if !self.regions.contains_locality(&draft.address.region, name) {
            return Err(DraftError::UnknownLocality {
                region: draft.address.region.clone(),
                locality: name.to_string(),
            });
        }
        draft.address.locality = name.to_string();
        Ok(())
    }

    /// 定位回填：只写入能在目录中匹配到的值，匹配不到则忽略
    fn apply_location_hint(&self, draft: &mut OrderDraft, hint: &LocationHint) {
        if let Some(code) = hint.region_code.as_deref() {
            let code = code.trim().to_uppercase();
            if self.regions.region(&code).is_some() {
                if draft.address.region != code {
                    draft.address.region = code;
                    draft.address.locality.clear();
                }
            } else {
                tracing::warn!("定位得到的州代码不在目录中: {}", code);
            }
        }

        if let Some(name) = hint.locality.as_deref() {
            match self.regions.match_locality(&draft.address.region, name) {
                Some(matched) => draft.address.locality = matched.to_string(),
                None => tracing::warn!("定位得到的城市未匹配: {}", name),
            }
        }
    }
}

// ==========================================
// 辅助函数
// ==========================================

fn set_combo_quantity(draft: &mut OrderDraft, quantity: u32) -> DraftResult<()> {
    if quantity < 1 {
        return Err(DraftError::InvalidComboQuantity(quantity));
    }
    draft.combo_quantity = quantity;
    // "不要饮料" 的数量跟随份数
    if let Some(none_qty) = draft.beverage_quantities.get_mut(NO_BEVERAGE_ID) {
        *none_qty = quantity;
    }
    Ok(())
}

fn select_no_beverage(draft: &mut OrderDraft) {
    draft.beverage_quantities.clear();
    draft
        .beverage_quantities
        .insert(NO_BEVERAGE_ID.to_string(), draft.combo_quantity);
}

/// 邮编查询回填
///
/// 找到地址时覆盖街道/街区；已选城市与查询城市不一致时标记问题
fn apply_postal_lookup(draft: &mut OrderDraft, found: Option<&PostalAddress>) {
    let Some(found) = found else {
        draft.address.postal_code_issue = Some(PostalCodeIssue::NotFound);
        return;
    };

    draft.address.street = found.street.clone();
    draft.address.neighborhood = found.neighborhood.clone();

    let selected = normalize_place_name(&draft.address.locality);
    let looked_up = normalize_place_name(&found.locality);
    draft.address.postal_code_issue = if !selected.is_empty() && selected != looked_up {
        Some(PostalCodeIssue::OutsideLocality)
    } else {
        None
    };
}
