//! TaskRequestGateway - リクエスト単位の入口
//!
//! テナントとプリンシパルは解決済みで渡されます（スレッドローカルは使わない）。
//!
//! # 2 系統の操作
//! - **管理者用**: ユーザー・グループを引数で指定できる。`principal.admin` が必須
//! - **セルフサービス (`my_*`)**: ユーザー・グループは常にプリンシパルから取る
//!
//! 変更系は find-then-mutate：先に可視性クエリで対象を確認し、
//! 見つからなければ `Ok(false)`、見つかればエンジンに委譲します。
//! エンジン側の競合（AlreadyClaimed など）はエラーとして返ります。

use crate::app::deployments::DeploymentService;
use crate::app::processes::ProcessOrchestrationFacade;
use crate::app::tasks::TaskAuthorizationEngine;
use crate::domain::{
    Deployment, DeploymentId, ProcessInstance, Principal, Task, TaskId, TenantId, Variables,
};
use crate::error::GatewayError;
use crate::query::{DeploymentQuery, Page, Pageable, TaskFilter};

#[derive(Clone)]
pub struct TaskRequestGateway {
    tasks: TaskAuthorizationEngine,
    processes: ProcessOrchestrationFacade,
    deployments: DeploymentService,
}

impl TaskRequestGateway {
    pub fn new(
        tasks: TaskAuthorizationEngine,
        processes: ProcessOrchestrationFacade,
        deployments: DeploymentService,
    ) -> Self {
        Self {
            tasks,
            processes,
            deployments,
        }
    }

    pub async fn start_process(
        &self,
        tenant: &TenantId,
        definition_key: &str,
        variables: Variables,
    ) -> Result<ProcessInstance, GatewayError> {
        Ok(self
            .processes
            .start_process(tenant, definition_key, variables)
            .await?)
    }

    // ---- admin ----

    pub async fn claimable_tasks(
        &self,
        tenant: &TenantId,
        principal: &Principal,
        user: Option<&str>,
        groups: &[String],
        filter: &TaskFilter,
        pageable: &Pageable,
    ) -> Result<Page<Task>, GatewayError> {
        require_admin(principal, "list claimable tasks")?;
        let spec = self
            .tasks
            .find_claimable_tasks(tenant, user, groups, filter)
            .with_sort(&pageable.sort);
        Ok(self.tasks.list(&spec, pageable.page).await?)
    }

    pub async fn assigned_tasks(
        &self,
        tenant: &TenantId,
        principal: &Principal,
        user: &str,
        filter: &TaskFilter,
        pageable: &Pageable,
    ) -> Result<Page<Task>, GatewayError> {
        require_admin(principal, "list assigned tasks")?;
        let spec = self
            .tasks
            .find_assigned_tasks(tenant, user, filter)
            .with_sort(&pageable.sort);
        Ok(self.tasks.list(&spec, pageable.page).await?)
    }

    /// Claim an unassigned task of `tenant` on behalf of `user_id`.
    pub async fn claim(
        &self,
        tenant: &TenantId,
        principal: &Principal,
        task_id: &TaskId,
        user_id: &str,
    ) -> Result<bool, GatewayError> {
        require_admin(principal, "claim tasks for others")?;
        if self
            .tasks
            .find_claimable_task(tenant, task_id, None, &[])
            .await?
            .is_none()
        {
            return Ok(false);
        }
        self.tasks.claim(task_id, user_id).await?;
        Ok(true)
    }

    pub async fn unclaim(
        &self,
        tenant: &TenantId,
        principal: &Principal,
        task_id: &TaskId,
    ) -> Result<bool, GatewayError> {
        require_admin(principal, "unclaim tasks")?;
        if self.tasks.find_task(tenant, task_id).await?.is_none() {
            return Ok(false);
        }
        self.tasks.unclaim(task_id).await?;
        Ok(true)
    }

    pub async fn complete(
        &self,
        tenant: &TenantId,
        principal: &Principal,
        task_id: &TaskId,
        variables: Variables,
    ) -> Result<bool, GatewayError> {
        require_admin(principal, "complete tasks")?;
        if self.tasks.find_task(tenant, task_id).await?.is_none() {
            return Ok(false);
        }
        self.tasks.complete(task_id, variables).await?;
        Ok(true)
    }

    pub async fn list_deployments(
        &self,
        principal: &Principal,
        filter: DeploymentQuery,
        pageable: &Pageable,
    ) -> Result<Page<Deployment>, GatewayError> {
        require_admin(principal, "list deployments")?;
        Ok(self.deployments.list_deployments(filter, pageable).await?)
    }

    pub async fn upload(
        &self,
        principal: &Principal,
        tenant: Option<TenantId>,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<DeploymentId, GatewayError> {
        require_admin(principal, "upload deployments")?;
        Ok(self.deployments.upload(tenant, file_name, content).await?)
    }

    // ---- self-service ----

    pub async fn my_claimable_tasks(
        &self,
        tenant: &TenantId,
        principal: &Principal,
        filter: &TaskFilter,
        pageable: &Pageable,
    ) -> Result<Page<Task>, GatewayError> {
        let spec = self
            .tasks
            .find_claimable_tasks(tenant, Some(&principal.user_id), &principal.groups, filter)
            .with_sort(&pageable.sort);
        Ok(self.tasks.list(&spec, pageable.page).await?)
    }

    pub async fn my_assigned_tasks(
        &self,
        tenant: &TenantId,
        principal: &Principal,
        filter: &TaskFilter,
        pageable: &Pageable,
    ) -> Result<Page<Task>, GatewayError> {
        let spec = self
            .tasks
            .find_assigned_tasks(tenant, &principal.user_id, filter)
            .with_sort(&pageable.sort);
        Ok(self.tasks.list(&spec, pageable.page).await?)
    }

    pub async fn my_claim(
        &self,
        tenant: &TenantId,
        principal: &Principal,
        task_id: &TaskId,
    ) -> Result<bool, GatewayError> {
        if !self.claimable_by(tenant, principal, task_id).await? {
            return Ok(false);
        }
        self.tasks.claim(task_id, &principal.user_id).await?;
        Ok(true)
    }

    pub async fn my_unclaim(
        &self,
        tenant: &TenantId,
        principal: &Principal,
        task_id: &TaskId,
    ) -> Result<bool, GatewayError> {
        if !self.assigned_to(tenant, principal, task_id).await? {
            return Ok(false);
        }
        self.tasks.unclaim(task_id).await?;
        Ok(true)
    }

    /// Completes a task the principal holds or could claim.
    pub async fn my_complete(
        &self,
        tenant: &TenantId,
        principal: &Principal,
        task_id: &TaskId,
        variables: Variables,
    ) -> Result<bool, GatewayError> {
        let allowed = self.claimable_by(tenant, principal, task_id).await?
            || self.assigned_to(tenant, principal, task_id).await?;
        if !allowed {
            return Ok(false);
        }
        self.tasks.complete(task_id, variables).await?;
        Ok(true)
    }

    async fn claimable_by(
        &self,
        tenant: &TenantId,
        principal: &Principal,
        task_id: &TaskId,
    ) -> Result<bool, GatewayError> {
        let found = self
            .tasks
            .find_claimable_task(tenant, task_id, Some(&principal.user_id), &principal.groups)
            .await?;
        Ok(found.is_some())
    }

    async fn assigned_to(
        &self,
        tenant: &TenantId,
        principal: &Principal,
        task_id: &TaskId,
    ) -> Result<bool, GatewayError> {
        let found = self
            .tasks
            .find_assigned_task(tenant, task_id, &principal.user_id)
            .await?;
        Ok(found.is_some())
    }
}

fn require_admin(principal: &Principal, operation: &'static str) -> Result<(), GatewayError> {
    if principal.admin {
        Ok(())
    } else {
        tracing::warn!(user_id = %principal.user_id, operation, "admin operation refused");
        Err(GatewayError::Forbidden {
            user_id: principal.user_id.clone(),
            operation,
        })
    }
}
