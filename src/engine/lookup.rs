// ==========================================
// Marmita Express - 异步查询令牌
// ==========================================
// 职责: 为邮编查询/反向地理编码分配请求令牌
// 规则: 结果到达时令牌或输入已变化 → 丢弃
// ==========================================

use crate::domain::types::LookupKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 查询票据（发起查询时领取，回填时交回）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTicket {
    pub kind: LookupKind,
    pub token: u64,
    /// 发起查询时的输入（邮编数字或坐标文本）
    pub input: String,
}

/// 查询结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum LookupOutcome<T> {
    Found(T),
    NotFound,
    /// 网络/解析失败（仅记录日志，不阻塞手工输入）
    Failed(String),
}

impl<T> LookupOutcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }
}

/// 请求令牌跟踪器
///
/// 每类查询只保留最新一个未完成的票据
#[derive(Debug, Default)]
pub struct LookupTracker {
    next_token: u64,
    pending: HashMap<LookupKind, LookupTicket>,
}

impl LookupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 发起查询，覆盖同类旧票据
    pub fn begin(&mut self, kind: LookupKind, input: impl Into<String>) -> LookupTicket {
        self.next_token += 1;
        let ticket = LookupTicket {
            kind,
            token: self.next_token,
            input: input.into(),
        };
        if let Some(old) = self.pending.insert(kind, ticket.clone()) {
            tracing::debug!("查询被新请求取代: kind={}, token={}", kind, old.token);
        }
        ticket
    }

    /// 票据是否仍为该类最新请求
    pub fn is_current(&self, ticket: &LookupTicket) -> bool {
        self.pending
            .get(&ticket.kind)
            .map(|t| t.token == ticket.token)
            .unwrap_or(false)
    }

    /// 完成查询；过期票据返回 false
    pub fn finish(&mut self, ticket: &LookupTicket) -> bool {
        if self.is_current(ticket) {
            self.pending.remove(&ticket.kind);
            true
        } else {
            false
        }
    }

    /// 取消某类未完成的查询
    pub fn cancel(&mut self, kind: LookupKind) -> Option<LookupTicket> {
        self.pending.remove(&kind)
    }

    pub fn pending(&self, kind: LookupKind) -> Option<&LookupTicket> {
        self.pending.get(&kind)
    }
}
