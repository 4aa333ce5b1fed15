// ==========================================
// Marmita Express - 引擎层
// ==========================================
// 职责: 草稿状态迁移、计价、步骤可见性、快照渲染
// 红线: Engine 不做网络 IO, 只处理内存中的草稿
// ==========================================

pub mod configurator;
pub mod error;
pub mod events;
pub mod lookup;
pub mod pricing;
pub mod selection;
pub mod snapshot;
pub mod visibility;

// 重导出核心引擎
pub use configurator::{DispatchOutcome, LookupApplied, OrderConfigurator};
pub use error::{DraftError, DraftResult};
pub use events::{
    BroadcastEventPublisher, DraftEvent, DraftEventPublisher, DraftEventType,
    NoOpEventPublisher, OptionalEventPublisher,
};
pub use lookup::{LookupOutcome, LookupTicket, LookupTracker};
pub use pricing::{tiered_price, PriceBreakdown, PricingEngine, SummaryLine, SummaryLineKind};
pub use selection::{OrderIntent, Rejection, SelectionController, Transition};
pub use snapshot::{render_snapshot, DraftSnapshot, RenderedLine, StepIndicator};
pub use visibility::{stage_complete, StageVisibility};
