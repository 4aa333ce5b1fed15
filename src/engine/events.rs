// ==========================================
// Marmita Express - 草稿变更事件发布
// ==========================================
// 职责: 定义草稿变更事件与发布 trait（观察者）
// 说明: Engine 层只负责发布，渲染层订阅并重绘
// ==========================================

use crate::engine::snapshot::DraftSnapshot;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

// ==========================================
// 草稿事件类型
// ==========================================

/// 草稿事件触发类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftEventType {
    /// 开始下单（草稿重置）
    OrderStarted,
    /// 餐品选择变更
    ItemsChanged,
    /// 加料变更（单品或通用）
    AddOnsChanged,
    /// 套餐份数变更
    QuantityChanged,
    /// 饮料变更
    BeveragesChanged,
    /// 甜品加购变更
    DessertChanged,
    /// 联系人信息变更
    ContactChanged,
    /// 地址变更（含查询回填）
    AddressChanged,
}

impl DraftEventType {
    /// 转换为字符串标识
    pub fn as_str(&self) -> &str {
        match self {
            DraftEventType::OrderStarted => "OrderStarted",
            DraftEventType::ItemsChanged => "ItemsChanged",
            DraftEventType::AddOnsChanged => "AddOnsChanged",
            DraftEventType::QuantityChanged => "QuantityChanged",
            DraftEventType::BeveragesChanged => "BeveragesChanged",
            DraftEventType::DessertChanged => "DessertChanged",
            DraftEventType::ContactChanged => "ContactChanged",
            DraftEventType::AddressChanged => "AddressChanged",
        }
    }
}

/// 草稿事件
///
/// 每次被接受的意图产生一个事件，携带重算后的快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftEvent {
    /// 草稿会话 ID
    pub session_id: Uuid,
    /// 事件类型
    pub event_type: DraftEventType,
    /// 重算后的视图快照
    pub snapshot: DraftSnapshot,
}

impl DraftEvent {
    pub fn new(event_type: DraftEventType, snapshot: DraftSnapshot) -> Self {
        Self {
            session_id: snapshot.session_id,
            event_type,
            snapshot,
        }
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 草稿事件发布者 Trait
///
/// # 实现说明
/// - `BroadcastEventPublisher`: 推送到 tokio broadcast 通道，供渲染层订阅
/// - `NoOpEventPublisher`: 单元测试/无界面场景
pub trait DraftEventPublisher: Send + Sync {
    /// 发布草稿事件
    fn publish(&self, event: DraftEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl DraftEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: DraftEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpEventPublisher: 跳过事件发布 - session_id={}, event_type={}",
            event.session_id,
            event.event_type.as_str()
        );
        Ok(())
    }
}

/// 广播事件发布者
///
/// 没有订阅者时发布不算失败（事件直接丢弃）
#[derive(Debug, Clone)]
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<DraftEvent>,
}

impl BroadcastEventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 订阅事件流
    pub fn subscribe(&self) -> broadcast::Receiver<DraftEvent> {
        self.sender.subscribe()
    }
}

impl DraftEventPublisher for BroadcastEventPublisher {
    fn publish(&self, event: DraftEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.sender.receiver_count() == 0 {
            tracing::trace!("无订阅者，丢弃事件: {}", event.event_type.as_str());
            return Ok(());
        }
        self.sender.send(event)?;
        Ok(())
    }
}

/// 可选的事件发布者包装
///
/// 简化 Option<Arc<dyn DraftEventPublisher>> 的使用
#[derive(Clone)]
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn DraftEventPublisher>>,
}

impl OptionalEventPublisher {
    /// 创建带发布者的实例
    pub fn with_publisher(publisher: Arc<dyn DraftEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    /// 创建空实例（不发布事件）
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 发布事件（如果有发布者）
    pub fn publish(&self, event: DraftEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        match &self.inner {
            Some(publisher) => publisher.publish(event),
            None => {
                tracing::debug!(
                    "OptionalEventPublisher: 未配置发布者，跳过事件 - session_id={}, event_type={}",
                    event.session_id,
                    event.event_type.as_str()
                );
                Ok(())
            }
        }
    }

    /// 检查是否配置了发布者
    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalEventPublisher {
    fn default() -> Self {
        Self::none()
    }
}
