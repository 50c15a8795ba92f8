//! Domain identifiers (strongly-typed IDs).
//!
//! エンジンが払い出す ID（task / process instance / deployment）は不透明な文字列です。
//! Phantom type パターンで `Id<T>` を共通実装にしつつ、TaskId と DeploymentId を
//! コンパイル時に混同できないようにしています。
//!
//! ## 生成
//! - 外部エンジンの ID はそのまま `Id::new()` で包む
//! - InMemoryEngine は `IdGenerator` 経由で ULID ベースの ID を生成（"task-01H..." 形式）

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// ULID から生成するときのプレフィックス（"task-", "proc-", ...）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// `T` は PhantomData で、実行時にはメモリを消費しません。
/// シリアライズ時は中身の文字列だけになります。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    /// Wrap an identifier handed out by the engine.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    /// ULID から Id を作成（プレフィックス付き）
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self::new(format!("{}{}", T::prefix(), ulid))
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T: IdMarker> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Task のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl IdMarker for Task {
    fn prefix() -> &'static str {
        "task-"
    }
}

/// ProcessInstance のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProcessInstance {}

impl IdMarker for ProcessInstance {
    fn prefix() -> &'static str {
        "proc-"
    }
}

/// Deployment のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Deployment {}

impl IdMarker for Deployment {
    fn prefix() -> &'static str {
        "deploy-"
    }
}

// ========================================
// Type Alias
// ========================================

/// Identifier of a human task inside the engine.
pub type TaskId = Id<Task>;

/// Identifier of a running process instance.
pub type ProcessInstanceId = Id<ProcessInstance>;

/// Identifier of one deployment unit accepted by the engine.
pub type DeploymentId = Id<Deployment>;

/// Tenant identifier.
///
/// Every deployment, process instance and task query is scoped to exactly one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TenantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TenantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
