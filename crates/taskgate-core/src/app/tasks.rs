//! TaskAuthorizationEngine - タスク可視性と変更操作
//!
//! # 設計原則
//! - 状態を持たない（エンジンハンドルのみ）
//! - 可視性ルールは `query::builder` の純粋関数で組み立てる
//! - claim / unclaim / complete 自体は認可しない
//!   （呼び出し側が find_* で確認してから呼ぶ: find-then-mutate）
//! - エンジンのエラーはそのまま返す

use std::sync::Arc;

use crate::domain::{
    DomainEvent, EngineError, NullAssignee, Task, TaskId, TenantId, Variables,
};
use crate::ports::{EventSink, ProcessEngine};
use crate::query::{Page, PageRequest, TaskFilter, TaskQuerySpec, builder};

#[derive(Clone)]
pub struct TaskAuthorizationEngine {
    engine: Arc<dyn ProcessEngine>,
    events: Arc<dyn EventSink>,
}

impl TaskAuthorizationEngine {
    pub fn new(engine: Arc<dyn ProcessEngine>, events: Arc<dyn EventSink>) -> Self {
        Self { engine, events }
    }

    /// Unassigned tasks of `tenant` offered to `user` or any of `groups`.
    ///
    /// With neither a user nor groups: every unassigned task of the tenant.
    pub fn find_claimable_tasks(
        &self,
        tenant: &TenantId,
        user: Option<&str>,
        groups: &[String],
        filter: &TaskFilter,
    ) -> TaskQuerySpec {
        let spec = builder::claimable_tasks(tenant, user, groups, filter);
        tracing::debug!(%tenant, ?user, ?groups, predicate = ?spec.predicate, "claimable tasks query");
        spec
    }

    pub fn find_assigned_tasks(
        &self,
        tenant: &TenantId,
        user: &str,
        filter: &TaskFilter,
    ) -> TaskQuerySpec {
        let spec = builder::assigned_tasks(tenant, user, filter);
        tracing::debug!(%tenant, user, predicate = ?spec.predicate, "assigned tasks query");
        spec
    }

    pub async fn find_claimable_task(
        &self,
        tenant: &TenantId,
        task_id: &TaskId,
        user: Option<&str>,
        groups: &[String],
    ) -> Result<Option<Task>, EngineError> {
        self.single(builder::claimable_task(tenant, task_id, user, groups))
            .await
    }

    pub async fn find_assigned_task(
        &self,
        tenant: &TenantId,
        task_id: &TaskId,
        assignee: &str,
    ) -> Result<Option<Task>, EngineError> {
        self.single(builder::assigned_task(tenant, task_id, assignee))
            .await
    }

    /// Any active task with this id in `tenant`.
    pub async fn find_task(
        &self,
        tenant: &TenantId,
        task_id: &TaskId,
    ) -> Result<Option<Task>, EngineError> {
        self.single(builder::task_in_tenant(tenant, task_id)).await
    }

    pub async fn list(
        &self,
        spec: &TaskQuerySpec,
        page: PageRequest,
    ) -> Result<Page<Task>, EngineError> {
        self.engine.query_tasks(spec, page).await
    }

    pub async fn claim(&self, task_id: &TaskId, user_id: &str) -> Result<(), EngineError> {
        self.engine.claim_task(task_id, user_id).await?;
        tracing::info!(%task_id, user_id, "task claimed");
        self.events.emit(DomainEvent::TaskClaimed {
            task_id: task_id.clone(),
            user_id: user_id.to_string(),
        });
        Ok(())
    }

    pub async fn unclaim(&self, task_id: &TaskId) -> Result<(), EngineError> {
        self.engine.unclaim_task(task_id).await?;
        tracing::info!(%task_id, "task unclaimed");
        self.events.emit(DomainEvent::TaskUnclaimed {
            task_id: task_id.clone(),
        });
        Ok(())
    }

    pub async fn complete(&self, task_id: &TaskId, variables: Variables) -> Result<(), EngineError> {
        let names: Vec<&String> = variables.keys().collect();
        tracing::info!(%task_id, variables = ?names, "completing task");
        self.engine.complete_task(task_id, variables).await?;
        self.events.emit(DomainEvent::TaskCompleted {
            task_id: task_id.clone(),
        });
        Ok(())
    }

    /// Case-insensitive assignee check. A task nobody holds is a caller error.
    ///
    /// Unlike `find_assigned_task`, which compares the assignee exactly.
    pub fn is_assigned(&self, task: &Task, user_id: &str) -> Result<bool, NullAssignee> {
        task.is_assigned(user_id)
    }

    async fn single(&self, spec: TaskQuerySpec) -> Result<Option<Task>, EngineError> {
        let page = self.engine.query_tasks(&spec, PageRequest::single()).await?;
        Ok(page.into_first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryEngine;
    use crate::ports::RecordingEventSink;
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::json;

    fn acme() -> TenantId {
        TenantId::new("acme")
    }

    fn task(id: &str, tenant: &str) -> Task {
        Task::new(TaskId::new(id), id, TenantId::new(tenant), "hire:1:d", Utc::now())
    }

    async fn setup() -> (TaskAuthorizationEngine, Arc<InMemoryEngine>, Arc<RecordingEventSink>) {
        let engine = Arc::new(InMemoryEngine::new());
        engine
            .insert_task(task("t-managers", "acme").with_candidate_groups(["dev-managers"]))
            .await;
        engine
            .insert_task(task("t-phw", "acme").with_candidate_users(["phw"]))
            .await;
        engine
            .insert_task(task("t-beta", "beta").with_candidate_groups(["dev-managers"]))
            .await;
        engine
            .insert_task(task("t-held", "acme").with_candidate_users(["phw"]).with_assignee("kermit"))
            .await;
        let events = Arc::new(RecordingEventSink::new());
        let tasks = TaskAuthorizationEngine::new(engine.clone(), events.clone());
        (tasks, engine, events)
    }

    async fn ids(tasks: &TaskAuthorizationEngine, spec: &TaskQuerySpec) -> Vec<String> {
        tasks
            .list(spec, PageRequest::default())
            .await
            .unwrap()
            .items
            .into_iter()
            .map(|t| t.id.to_string())
            .collect()
    }

    #[rstest]
    #[case(None, &[], &["t-managers", "t-phw"])]
    #[case(Some("phw"), &[], &["t-phw"])]
    #[case(None, &["dev-managers"], &["t-managers"])]
    #[case(Some("phw"), &["dev-managers"], &["t-managers", "t-phw"])]
    #[case(Some("nobody"), &["nobody"], &[])]
    #[tokio::test]
    async fn claimable_visibility(
        #[case] user: Option<&str>,
        #[case] groups: &[&str],
        #[case] expected: &[&str],
    ) {
        let (tasks, _, _) = setup().await;
        let groups: Vec<String> = groups.iter().map(|g| g.to_string()).collect();
        let spec = tasks.find_claimable_tasks(&acme(), user, &groups, &TaskFilter::default());
        assert_eq!(ids(&tasks, &spec).await, expected);
    }

    #[tokio::test]
    async fn claimable_lookup_respects_tenant() {
        let (tasks, _, _) = setup().await;
        let groups = vec!["dev-managers".to_string()];
        let found = tasks
            .find_claimable_task(&TenantId::new("other"), &TaskId::new("t-managers"), None, &groups)
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn claim_moves_task_between_sets_and_emits_event() {
        let (tasks, _, events) = setup().await;
        let id = TaskId::new("t-phw");

        tasks.claim(&id, "phw").await.unwrap();

        let assigned = tasks.find_assigned_tasks(&acme(), "phw", &TaskFilter::default());
        assert_eq!(ids(&tasks, &assigned).await, vec!["t-phw"]);
        assert!(
            tasks
                .find_claimable_task(&acme(), &id, Some("phw"), &[])
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(
            events.events(),
            vec![DomainEvent::TaskClaimed {
                task_id: id,
                user_id: "phw".into()
            }]
        );
    }

    #[tokio::test]
    async fn unclaim_restores_claimability() {
        let (tasks, _, _) = setup().await;
        let id = TaskId::new("t-phw");
        tasks.claim(&id, "phw").await.unwrap();
        tasks.unclaim(&id).await.unwrap();

        let found = tasks
            .find_claimable_task(&acme(), &id, Some("phw"), &[])
            .await
            .unwrap();
        assert_eq!(found.map(|t| t.id), Some(id));
    }

    #[tokio::test]
    async fn complete_removes_from_every_set() {
        let (tasks, engine, _) = setup().await;
        let id = TaskId::new("t-held");
        let mut vars = Variables::new();
        vars.insert("outcome".into(), json!(true));

        tasks.complete(&id, vars).await.unwrap();

        assert!(tasks.find_task(&acme(), &id).await.unwrap().is_none());
        assert!(
            tasks
                .find_assigned_task(&acme(), &id, "kermit")
                .await
                .unwrap()
                .is_none()
        );
        assert!(engine.task(&id).await.is_none());
    }

    #[tokio::test]
    async fn engine_errors_propagate() {
        let (tasks, _, events) = setup().await;
        let err = tasks.claim(&TaskId::new("t-held"), "phw").await.unwrap_err();
        assert!(matches!(err, EngineError::AlreadyClaimed { .. }));
        assert!(events.events().is_empty());
    }

    #[tokio::test]
    async fn concurrent_claims_have_one_winner() {
        let (tasks, _, _) = setup().await;
        let id = TaskId::new("t-managers");

        let (a, b) = tokio::join!(tasks.claim(&id, "phw"), tasks.claim(&id, "kermit"));
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        let loser = if a.is_err() { a } else { b };
        assert!(matches!(loser, Err(EngineError::AlreadyClaimed { .. })));
    }

    #[tokio::test]
    async fn is_assigned_ignores_case() {
        let (tasks, engine, _) = setup().await;
        let held = engine.task(&TaskId::new("t-held")).await.unwrap();
        assert_eq!(tasks.is_assigned(&held, "KERMIT"), Ok(true));
        assert_eq!(tasks.is_assigned(&held, "phw"), Ok(false));
        // the assigned-task lookup stays exact
        assert!(
            tasks
                .find_assigned_task(&acme(), &held.id, "KERMIT")
                .await
                .unwrap()
                .is_none()
        );

        let free = engine.task(&TaskId::new("t-phw")).await.unwrap();
        assert_eq!(
            tasks.is_assigned(&free, "phw"),
            Err(NullAssignee(TaskId::new("t-phw")))
        );
    }
}
