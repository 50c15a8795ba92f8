//! InMemoryEngine - 開発・テスト用のプロセスエンジン
//!
//! BPMN は解釈しません。代わりに：
//! - デプロイされた `.bpmn` / `.bpmn20.xml` をファイル名の stem で定義として登録
//! - `define_user_tasks()` で「開始時に生成されるユーザータスク」を登録
//! - `on_complete()` で「あるタスクの完了後に生成されるタスク」を登録
//!
//! これだけで claim/unclaim/complete と可視性ルールの検証には十分です。

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ArtifactKind, Deployment, DeploymentId, DeploymentUnit, EngineError, ProcessInstance,
    ProcessInstanceId, Task, TaskId, TenantId, Variables, definition_key_of,
};
use crate::ports::{Clock, IdGenerator, ProcessEngine, SystemClock, UlidGenerator};
use crate::query::{DeploymentQuery, Page, PageRequest, TaskQuerySpec};

/// Blueprint of a user task materialized by the in-memory engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserTaskTemplate {
    pub name: String,
    pub task_key: Option<String>,
    pub candidate_users: BTreeSet<String>,
    pub candidate_groups: BTreeSet<String>,
    pub priority: Option<i32>,
}

impl UserTaskTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn candidate_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidate_users = users.into_iter().map(Into::into).collect();
        self
    }

    pub fn candidate_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidate_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Deployed process definition, versioned per (tenant, key).
#[derive(Debug, Clone)]
struct ProcessDefinition {
    id: String,
    key: String,
}

/// Running instance plus its accumulated variables.
#[derive(Debug, Clone)]
struct InstanceRecord {
    instance: ProcessInstance,
    variables: Variables,
}

/// In-memory engine state.
struct InMemoryEngineState {
    deployments: BTreeMap<DeploymentId, Deployment>,

    /// (tenant, key) -> versions, latest last.
    definitions: HashMap<(TenantId, String), Vec<ProcessDefinition>>,

    /// definition key -> tasks created on start.
    start_tasks: HashMap<String, Vec<UserTaskTemplate>>,

    /// (definition key, completed task name) -> tasks created afterwards.
    follow_ups: HashMap<(String, String), Vec<UserTaskTemplate>>,

    instances: HashMap<ProcessInstanceId, InstanceRecord>,

    /// Active tasks only (single source of truth for task state).
    tasks: BTreeMap<TaskId, Task>,

    /// Artifact names whose deployment is rejected (failure injection).
    rejected_artifacts: HashSet<String>,

    /// Number of deploy calls received, successful or not.
    deploy_attempts: usize,
}

impl InMemoryEngineState {
    fn new() -> Self {
        Self {
            deployments: BTreeMap::new(),
            definitions: HashMap::new(),
            start_tasks: HashMap::new(),
            follow_ups: HashMap::new(),
            instances: HashMap::new(),
            tasks: BTreeMap::new(),
            rejected_artifacts: HashSet::new(),
            deploy_attempts: 0,
        }
    }

    fn register_definition(&mut self, tenant: &TenantId, key: &str, deployment_id: &DeploymentId) {
        let versions = self
            .definitions
            .entry((tenant.clone(), key.to_string()))
            .or_default();
        let version = versions.len() + 1;
        versions.push(ProcessDefinition {
            id: format!("{key}:{version}:{deployment_id}"),
            key: key.to_string(),
        });
    }

    fn latest_definition(&self, tenant: &TenantId, key: &str) -> Option<&ProcessDefinition> {
        self.definitions
            .get(&(tenant.clone(), key.to_string()))
            .and_then(|versions| versions.last())
    }
}

/// In-memory implementation of the `ProcessEngine` port.
pub struct InMemoryEngine {
    state: Arc<Mutex<InMemoryEngineState>>,
    clock: Arc<dyn Clock>,
    ids: Box<dyn IdGenerator>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryEngineState::new())),
            ids: Box::new(UlidGenerator::new(Arc::clone(&clock))),
            clock,
        }
    }

    /// Tasks created when an instance of `definition_key` starts (any tenant).
    pub async fn define_user_tasks(&self, definition_key: &str, templates: Vec<UserTaskTemplate>) {
        let mut state = self.state.lock().await;
        state.start_tasks.insert(definition_key.to_string(), templates);
    }

    /// Tasks created after a task named `task_name` of `definition_key` completes.
    pub async fn on_complete(
        &self,
        definition_key: &str,
        task_name: &str,
        templates: Vec<UserTaskTemplate>,
    ) {
        let mut state = self.state.lock().await;
        state
            .follow_ups
            .insert((definition_key.to_string(), task_name.to_string()), templates);
    }

    /// Make every future deployment of `artifact_name` fail.
    pub async fn reject_deployments_of(&self, artifact_name: &str) {
        let mut state = self.state.lock().await;
        state.rejected_artifacts.insert(artifact_name.to_string());
    }

    /// Seed a task directly (bypassing process instances).
    pub async fn insert_task(&self, task: Task) {
        let mut state = self.state.lock().await;
        state.tasks.insert(task.id.clone(), task);
    }

    pub async fn task(&self, task_id: &TaskId) -> Option<Task> {
        let state = self.state.lock().await;
        state.tasks.get(task_id).cloned()
    }

    pub async fn deployments(&self) -> Vec<Deployment> {
        let state = self.state.lock().await;
        state.deployments.values().cloned().collect()
    }

    pub async fn deploy_attempts(&self) -> usize {
        let state = self.state.lock().await;
        state.deploy_attempts
    }

    pub async fn process_variables(&self, instance_id: &ProcessInstanceId) -> Option<Variables> {
        let state = self.state.lock().await;
        state.instances.get(instance_id).map(|r| r.variables.clone())
    }

    fn materialize(
        &self,
        template: &UserTaskTemplate,
        instance: &ProcessInstance,
    ) -> Task {
        let mut task = Task::new(
            self.ids.generate_task_id(),
            template.name.clone(),
            instance.tenant_id.clone(),
            instance.definition_id.clone(),
            self.clock.now(),
        )
        .with_process_instance(instance.id.clone());
        task.definition_key = template.task_key.clone();
        task.candidate_users = template.candidate_users.clone();
        task.candidate_groups = template.candidate_groups.clone();
        if let Some(priority) = template.priority {
            task.priority = priority;
        }
        task
    }
}

impl Default for InMemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessEngine for InMemoryEngine {
    async fn deploy(&self, unit: DeploymentUnit) -> Result<DeploymentId, EngineError> {
        let mut state = self.state.lock().await;
        state.deploy_attempts += 1;

        if state.rejected_artifacts.contains(&unit.name) {
            return Err(EngineError::DeploymentFailed {
                name: unit.name,
                reason: "rejected by engine".to_string(),
            });
        }

        let id = self.ids.generate_deployment_id();
        if let Some(tenant) = &unit.tenant
            && ArtifactKind::from_file_name(&unit.name) == Some(ArtifactKind::ProcessDefinition)
        {
            state.register_definition(tenant, definition_key_of(&unit.name), &id);
        }

        let deployment = Deployment {
            id: id.clone(),
            name: unit.name,
            tenant_id: unit.tenant,
            deployed_at: self.clock.now(),
        };
        state.deployments.insert(id.clone(), deployment);
        Ok(id)
    }

    async fn list_deployments(
        &self,
        query: &DeploymentQuery,
        page: PageRequest,
    ) -> Result<Page<Deployment>, EngineError> {
        let state = self.state.lock().await;
        let mut matching: Vec<Deployment> = state
            .deployments
            .values()
            .filter(|d| query.matches(d))
            .cloned()
            .collect();
        matching.sort_by(|a, b| query.compare(a, b));
        Ok(Page::slice(matching, page))
    }

    async fn start_process_instance(
        &self,
        definition_key: &str,
        tenant: &TenantId,
        variables: Variables,
    ) -> Result<ProcessInstance, EngineError> {
        let mut state = self.state.lock().await;
        let definition = state
            .latest_definition(tenant, definition_key)
            .cloned()
            .ok_or_else(|| EngineError::ProcessNotFound {
                key: definition_key.to_string(),
                tenant: tenant.clone(),
            })?;

        let instance = ProcessInstance {
            id: self.ids.generate_process_instance_id(),
            definition_id: definition.id,
            definition_key: definition.key,
            tenant_id: tenant.clone(),
        };

        let templates = state
            .start_tasks
            .get(definition_key)
            .cloned()
            .unwrap_or_default();
        for template in &templates {
            let task = self.materialize(template, &instance);
            state.tasks.insert(task.id.clone(), task);
        }

        state.instances.insert(
            instance.id.clone(),
            InstanceRecord {
                instance: instance.clone(),
                variables,
            },
        );
        Ok(instance)
    }

    async fn query_tasks(
        &self,
        spec: &TaskQuerySpec,
        page: PageRequest,
    ) -> Result<Page<Task>, EngineError> {
        let state = self.state.lock().await;
        let mut matching: Vec<Task> = state
            .tasks
            .values()
            .filter(|t| spec.matches(t))
            .cloned()
            .collect();
        // Stable: ties keep id order.
        matching.sort_by(|a, b| spec.compare(a, b));
        Ok(Page::slice(matching, page))
    }

    async fn claim_task(&self, task_id: &TaskId, user_id: &str) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| EngineError::TaskNotFound(task_id.clone()))?;

        match &task.assignee {
            Some(current) if current != user_id => Err(EngineError::AlreadyClaimed {
                task: task_id.clone(),
                assignee: current.clone(),
            }),
            _ => {
                task.assignee = Some(user_id.to_string());
                Ok(())
            }
        }
    }

    async fn unclaim_task(&self, task_id: &TaskId) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| EngineError::TaskNotFound(task_id.clone()))?;
        task.assignee = None;
        Ok(())
    }

    async fn complete_task(&self, task_id: &TaskId, variables: Variables) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        let task = state
            .tasks
            .remove(task_id)
            .ok_or_else(|| EngineError::TaskNotFound(task_id.clone()))?;

        let Some(instance_id) = task.process_instance_id else {
            return Ok(());
        };
        let Some(record) = state.instances.get_mut(&instance_id) else {
            return Ok(());
        };
        record.variables.extend(variables);
        let instance = record.instance.clone();

        let follow_ups = state
            .follow_ups
            .get(&(instance.definition_key.clone(), task.name.clone()))
            .cloned()
            .unwrap_or_default();
        for template in &follow_ups {
            let next = self.materialize(template, &instance);
            state.tasks.insert(next.id.clone(), next);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::FixedClock;
    use crate::query::{Direction, Predicate, SortKey};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn acme() -> TenantId {
        TenantId::new("acme")
    }

    async fn engine_with_hire_process() -> InMemoryEngine {
        let engine = InMemoryEngine::new();
        engine
            .deploy(DeploymentUnit {
                name: "hire.bpmn20.xml".into(),
                content: b"<definitions/>".to_vec(),
                tenant: Some(acme()),
            })
            .await
            .unwrap();
        engine
            .define_user_tasks(
                "hire",
                vec![UserTaskTemplate::new("Telephone interview").candidate_groups(["dev-managers"])],
            )
            .await;
        engine
    }

    #[tokio::test]
    async fn deploy_registers_definition_per_tenant() {
        let engine = engine_with_hire_process().await;

        let instance = engine
            .start_process_instance("hire", &acme(), Variables::new())
            .await
            .unwrap();
        assert_eq!(instance.definition_key, "hire");
        assert!(instance.definition_id.starts_with("hire:1:"));

        let err = engine
            .start_process_instance("hire", &TenantId::new("beta"), Variables::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ProcessNotFound { .. }));
    }

    #[tokio::test]
    async fn redeploy_bumps_version() {
        let engine = engine_with_hire_process().await;
        engine
            .deploy(DeploymentUnit {
                name: "hire.bpmn20.xml".into(),
                content: b"<definitions/>".to_vec(),
                tenant: Some(acme()),
            })
            .await
            .unwrap();
        let instance = engine
            .start_process_instance("hire", &acme(), Variables::new())
            .await
            .unwrap();
        assert!(instance.definition_id.starts_with("hire:2:"));
    }

    #[tokio::test]
    async fn start_materializes_tasks() {
        let engine = engine_with_hire_process().await;
        let instance = engine
            .start_process_instance("hire", &acme(), Variables::new())
            .await
            .unwrap();

        let spec = TaskQuerySpec::new(acme(), Predicate::ProcessInstanceId(instance.id.clone()));
        let page = engine.query_tasks(&spec, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Telephone interview");
        assert_eq!(page.items[0].tenant_id, acme());
    }

    #[tokio::test]
    async fn claim_by_other_user_is_rejected() {
        let engine = engine_with_hire_process().await;
        engine
            .start_process_instance("hire", &acme(), Variables::new())
            .await
            .unwrap();
        let spec = TaskQuerySpec::new(acme(), Predicate::Unassigned);
        let task = engine
            .query_tasks(&spec, PageRequest::single())
            .await
            .unwrap()
            .into_first()
            .unwrap();

        engine.claim_task(&task.id, "phw").await.unwrap();
        // same user again is a no-op
        engine.claim_task(&task.id, "phw").await.unwrap();

        let err = engine.claim_task(&task.id, "kermit").await.unwrap_err();
        assert_eq!(
            err,
            EngineError::AlreadyClaimed {
                task: task.id.clone(),
                assignee: "phw".into()
            }
        );
    }

    #[tokio::test]
    async fn complete_merges_variables_and_spawns_follow_ups() {
        let engine = engine_with_hire_process().await;
        engine
            .on_complete(
                "hire",
                "Telephone interview",
                vec![
                    UserTaskTemplate::new("Tech interview").candidate_groups(["dev-managers"]),
                    UserTaskTemplate::new("Financial negotiation").candidate_groups(["finance"]),
                ],
            )
            .await;
        let instance = engine
            .start_process_instance("hire", &acme(), Variables::new())
            .await
            .unwrap();
        let spec = TaskQuerySpec::new(acme(), Predicate::ProcessInstanceId(instance.id.clone()))
            .order_by(SortKey::Name, Direction::Asc);
        let first = engine
            .query_tasks(&spec, PageRequest::default())
            .await
            .unwrap()
            .into_first()
            .unwrap();

        let mut vars = Variables::new();
        vars.insert("telephoneInterviewOutcome".into(), json!(true));
        engine.complete_task(&first.id, vars).await.unwrap();

        let names: Vec<_> = engine
            .query_tasks(&spec, PageRequest::default())
            .await
            .unwrap()
            .items
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Financial negotiation", "Tech interview"]);
        assert_eq!(
            engine.process_variables(&instance.id).await.unwrap()["telephoneInterviewOutcome"],
            json!(true)
        );
        assert!(engine.task(&first.id).await.is_none());
    }

    #[tokio::test]
    async fn mutating_unknown_task_fails() {
        let engine = InMemoryEngine::new();
        let id = TaskId::new("missing");
        assert_eq!(
            engine.unclaim_task(&id).await.unwrap_err(),
            EngineError::TaskNotFound(id.clone())
        );
        assert_eq!(
            engine.complete_task(&id, Variables::new()).await.unwrap_err(),
            EngineError::TaskNotFound(id)
        );
    }

    #[tokio::test]
    async fn deployments_are_stamped_by_the_clock() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let engine = InMemoryEngine::with_clock(Arc::new(FixedClock::new(at)));
        engine
            .deploy(DeploymentUnit {
                name: "bundle.zip".into(),
                content: b"PK".to_vec(),
                tenant: None,
            })
            .await
            .unwrap();

        let deployments = engine.deployments().await;
        assert_eq!(deployments[0].deployed_at, at);
        assert_eq!(deployments[0].tenant_id, None);
    }

    #[tokio::test]
    async fn rejected_artifacts_fail_but_are_counted() {
        let engine = InMemoryEngine::new();
        engine.reject_deployments_of("broken.bpmn").await;
        let err = engine
            .deploy(DeploymentUnit {
                name: "broken.bpmn".into(),
                content: Vec::new(),
                tenant: Some(acme()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DeploymentFailed { .. }));
        assert_eq!(engine.deploy_attempts().await, 1);
        assert!(engine.deployments().await.is_empty());
    }
}
