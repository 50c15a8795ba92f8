//! Errors - エンジン由来のエラー分類
//!
//! # 伝播ポリシー
//! - コアはエンジンのエラーを握りつぶさない（そのまま呼び出し元へ）
//! - 例外は DeploymentImporter のユニット単位の継続のみ（ImportReport に記録）

use thiserror::Error;

use super::ids::{TaskId, TenantId};

/// Failures reported by the process engine port.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("deployment of '{name}' failed: {reason}")]
    DeploymentFailed { name: String, reason: String },

    #[error("no process definition '{key}' for tenant {tenant}")]
    ProcessNotFound { key: String, tenant: TenantId },

    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("task {task} is already claimed by {assignee}")]
    AlreadyClaimed { task: TaskId, assignee: String },

    #[error("engine unavailable: {0}")]
    Unavailable(String),
}
