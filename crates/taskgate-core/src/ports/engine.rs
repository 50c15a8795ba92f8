//! ProcessEngine port - 外部プロセスエンジン（ブラックボックス）
//!
//! BPMN の実行（トークン、ゲートウェイ、タイマー）はエンジン側の責務です。
//! コアが必要とするのは以下の契約だけ：
//! - テナント付きのデプロイ
//! - テナント付きのプロセス開始
//! - 述語合成つきのタスク検索
//! - claim / unclaim / complete
//!
//! # 実装
//! - **InMemoryEngine**: テスト・デモ用（`impls::inmem_engine`）

use async_trait::async_trait;

use crate::domain::{
    Deployment, DeploymentId, DeploymentUnit, EngineError, ProcessInstance, Task, TaskId,
    TenantId, Variables,
};
use crate::query::{DeploymentQuery, Page, PageRequest, TaskQuerySpec};

/// Query and mutation contract of the process engine.
///
/// # 設計原則
/// - 各メソッドはエンジン側で atomic（claim の競合は先勝ち）
/// - リトライ・タイムアウトはコアでは行わない
/// - 変更系メソッドは認可を行わない（呼び出し側が事前にクエリで確認する）
#[async_trait]
pub trait ProcessEngine: Send + Sync {
    async fn deploy(&self, unit: DeploymentUnit) -> Result<DeploymentId, EngineError>;

    async fn list_deployments(
        &self,
        query: &DeploymentQuery,
        page: PageRequest,
    ) -> Result<Page<Deployment>, EngineError>;

    async fn start_process_instance(
        &self,
        definition_key: &str,
        tenant: &TenantId,
        variables: Variables,
    ) -> Result<ProcessInstance, EngineError>;

    async fn query_tasks(
        &self,
        spec: &TaskQuerySpec,
        page: PageRequest,
    ) -> Result<Page<Task>, EngineError>;

    async fn claim_task(&self, task_id: &TaskId, user_id: &str) -> Result<(), EngineError>;

    async fn unclaim_task(&self, task_id: &TaskId) -> Result<(), EngineError>;

    async fn complete_task(&self, task_id: &TaskId, variables: Variables) -> Result<(), EngineError>;
}
