// ==========================================
// Marmita Express - 下单配置器
// ==========================================
// 职责: 独占草稿，串联 选择控制器 → 快照渲染 → 事件发布
// 流程: 意图 → SelectionController::apply → 新草稿 → 快照 → 发布
// 红线: 草稿只由本结构持有，外部只能通过意图修改
// ==========================================

use crate::domain::catalog::Catalog;
use crate::domain::contact::{digits_only, PostalAddress};
use crate::domain::draft::OrderDraft;
use crate::domain::region::{LocationHint, RegionCatalog};
use crate::domain::types::LookupKind;
use crate::engine::error::{DraftError, DraftResult};
use crate::engine::events::{DraftEvent, DraftEventType, OptionalEventPublisher};
use crate::engine::lookup::{LookupOutcome, LookupTicket, LookupTracker};
use crate::engine::selection::{OrderIntent, SelectionController, Transition};
use crate::engine::snapshot::{render_snapshot, DraftSnapshot};
use crate::i18n::{t_for, t_for_with_args, DEFAULT_LOCALE};
use std::sync::Arc;
use tracing::instrument;

/// 意图分发结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 草稿已更新，附带新快照
    Applied(DraftSnapshot),
    /// 意图合法但无变化（不重绘）
    Unchanged,
    /// 被业务规则拒绝，快照携带提示
    Rejected(DraftSnapshot),
}

impl DispatchOutcome {
    pub fn snapshot(&self) -> Option<&DraftSnapshot> {
        match self {
            DispatchOutcome::Applied(s) | DispatchOutcome::Rejected(s) => Some(s),
            DispatchOutcome::Unchanged => None,
        }
    }
}

/// 查询结果回填的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupApplied {
    Applied(DraftSnapshot),
    /// 票据过期或输入已变，结果被丢弃
    Discarded,
    /// 查询失败，降级为手工输入
    Degraded,
}

// ==========================================
// OrderConfigurator
// ==========================================

pub struct OrderConfigurator {
    catalog: Arc<Catalog>,
    regions: Arc<RegionCatalog>,
    draft: OrderDraft,
    started: bool,
    locale: String,
    lookups: LookupTracker,
    publisher: OptionalEventPublisher,
}

impl OrderConfigurator {
    pub fn new(catalog: Arc<Catalog>, regions: Arc<RegionCatalog>) -> Self {
        Self {
            catalog,
            regions,
            draft: OrderDraft::new(),
            started: false,
            locale: DEFAULT_LOCALE.to_string(),
            lookups: LookupTracker::new(),
            publisher: OptionalEventPublisher::none(),
        }
    }

    /// 设置事件发布者（渲染层订阅）
    pub fn with_publisher(mut self, publisher: OptionalEventPublisher) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// 当前快照
    pub fn snapshot(&self) -> DraftSnapshot {
        render_snapshot(&self.draft, &self.catalog, self.started, &self.locale, None)
    }

    // ==========================================
    // 意图分发
    // ==========================================

    /// 开始下单：重置草稿并展示第一阶段
    pub fn start_order(&mut self) -> DraftSnapshot {
        self.started = true;
        self.lookups = LookupTracker::new();
        self.draft = OrderDraft::new();
        tracing::info!("开始下单: session_id={}", self.draft.session_id);
        let snapshot = self.snapshot();
        self.publish(DraftEventType::OrderStarted, &snapshot);
        snapshot
    }

    /// 分发意图
    #[instrument(skip(self), fields(session_id = %self.draft.session_id))]
    pub fn dispatch(&mut self, intent: OrderIntent) -> DraftResult<DispatchOutcome> {
        if let OrderIntent::StartOrder = intent {
            return Ok(DispatchOutcome::Applied(self.start_order()));
        }
        if !self.started {
            return Err(DraftError::NotStarted);
        }

        // 手动改州/城市时，未完成的定位结果不再回填
        if matches!(
            intent,
            OrderIntent::SelectRegion(_) | OrderIntent::SelectLocality(_)
        ) {
            self.lookups.cancel(LookupKind::ReverseGeocode);
        }

        let controller = SelectionController::new(&self.catalog, &self.regions);
        match controller.apply(&self.draft, self.started, &intent)? {
            Transition::Changed(next) => {
                self.draft = next;
                let snapshot = self.snapshot();
                self.publish(intent.event_type(), &snapshot);
                Ok(DispatchOutcome::Applied(snapshot))
            }
            Transition::Unchanged => Ok(DispatchOutcome::Unchanged),
            Transition::Rejected(rejection) => {
                let warning = t_for_with_args(
                    &self.locale,
                    rejection.message_key(),
                    &[("limit", &crate::domain::ITEMS_PER_COMBO.to_string())],
                );
                tracing::info!("意图被拒绝: {}", warning);
                Ok(DispatchOutcome::Rejected(render_snapshot(
                    &self.draft,
                    &self.catalog,
                    self.started,
                    &self.locale,
                    Some(warning),
                )))
            }
        }
    }

    /// 选择/取消一份餐
    pub fn toggle_item(&mut self, item_id: &str) -> DraftResult<DispatchOutcome> {
        self.dispatch(OrderIntent::ToggleItem(item_id.to_string()))
    }

    // ==========================================
    // 异步查询
    // ==========================================

    /// 邮编失焦：先做格式校验，合法时领取查询票据
    ///
    /// 返回 None 表示无需发起查询（空邮编或格式错误）
    pub fn begin_postal_lookup(&mut self) -> DraftResult<Option<LookupTicket>> {
        self.dispatch(OrderIntent::PostalCodeBlurred)?;
        let digits = digits_only(&self.draft.address.postal_code);
        if digits.len() != 8 {
            self.lookups.cancel(LookupKind::PostalCode);
            return Ok(None);
        }
        Ok(Some(self.lookups.begin(LookupKind::PostalCode, digits)))
    }

    /// 回填邮编查询结果
    ///
    /// 票据过期或当前邮编已与票据不一致时丢弃
    pub fn apply_postal_lookup(
        &mut self,
        ticket: &LookupTicket,
        outcome: LookupOutcome<PostalAddress>,
    ) -> DraftResult<LookupApplied> {
        if !self.lookups.finish(ticket)
            || digits_only(&self.draft.address.postal_code) != ticket.input
        {
            tracing::debug!("丢弃过期的邮编查询结果: token={}", ticket.token);
            return Ok(LookupApplied::Discarded);
        }

        let found = match outcome {
            LookupOutcome::Found(address) => Some(address),
            LookupOutcome::NotFound => None,
            LookupOutcome::Failed(reason) => {
                tracing::warn!("邮编查询失败，降级为手工输入: {}", reason);
                return Ok(LookupApplied::Degraded);
            }
        };

        match self.dispatch(OrderIntent::ApplyPostalLookup(found))? {
            DispatchOutcome::Applied(snapshot) | DispatchOutcome::Rejected(snapshot) => {
                Ok(LookupApplied::Applied(snapshot))
            }
            DispatchOutcome::Unchanged => Ok(LookupApplied::Applied(self.snapshot())),
        }
    }

    /// 发起定位查询（坐标文本仅用于日志与比对）
    pub fn begin_location_lookup(&mut self, input: impl Into<String>) -> LookupTicket {
        self.lookups.begin(LookupKind::ReverseGeocode, input)
    }

    /// 回填定位结果
    pub fn apply_location_hint(
        &mut self,
        ticket: &LookupTicket,
        outcome: LookupOutcome<LocationHint>,
    ) -> DraftResult<LookupApplied> {
        if !self.lookups.finish(ticket) {
            tracing::debug!("丢弃过期的定位结果: token={}", ticket.token);
            return Ok(LookupApplied::Discarded);
        }

        let hint = match outcome {
            LookupOutcome::Found(hint) => hint,
            LookupOutcome::NotFound => return Ok(LookupApplied::Degraded),
            LookupOutcome::Failed(reason) => {
                tracing::warn!("定位失败，降级为手工选择: {}", reason);
                return Ok(LookupApplied::Degraded);
            }
        };

        match self.dispatch(OrderIntent::ApplyLocationHint(hint))? {
            DispatchOutcome::Applied(snapshot) | DispatchOutcome::Rejected(snapshot) => {
                Ok(LookupApplied::Applied(snapshot))
            }
            DispatchOutcome::Unchanged => Ok(LookupApplied::Degraded),
        }
    }

    /// 放弃某类未完成的查询
    pub fn abandon_lookup(&mut self, kind: LookupKind) {
        self.lookups.cancel(kind);
    }

    /// 本地化提示文案（供渲染层复用）
    pub fn message(&self, key: &str) -> String {
        t_for(&self.locale, key)
    }

    fn publish(&self, event_type: DraftEventType, snapshot: &DraftSnapshot) {
        let event = DraftEvent::new(event_type, snapshot.clone());
        if let Err(e) = self.publisher.publish(event) {
            // 发布失败不影响草稿状态
            tracing::warn!("草稿事件发布失败: {}", e);
        }
    }
}
