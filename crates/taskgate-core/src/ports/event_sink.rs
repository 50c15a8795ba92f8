//! EventSink port - 監査イベントの記録
//!
//! - TracingEventSink: `tracing` に構造化ログとして出力（デフォルト）
//! - RecordingEventSink: メモリに保持（テスト用）

use std::sync::Mutex;

use crate::domain::DomainEvent;

/// EventSink はドメインイベントを記録
///
/// 記録の失敗で業務処理を止めないため、戻り値はありません。
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: DomainEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => tracing::info!(target: "taskgate::audit", kind = event.kind(), %payload, "audit"),
            Err(e) => tracing::warn!(target: "taskgate::audit", kind = event.kind(), error = %e, "audit event not serializable"),
        }
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: DomainEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
