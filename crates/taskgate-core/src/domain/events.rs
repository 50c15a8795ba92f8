//! Events - ドメインイベント（監査用）
//!
//! 認可チェックと状態遷移を別々に記録できるように、
//! 変更系オペレーションは EventSink にイベントを送ります。

use serde::{Deserialize, Serialize};

use super::ids::{DeploymentId, ProcessInstanceId, TaskId, TenantId};

/// DomainEvent はコアが発行した変更要求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    ArtifactDeployed {
        deployment_id: DeploymentId,
        name: String,
        tenant: Option<TenantId>,
    },
    ProcessStarted {
        instance_id: ProcessInstanceId,
        definition_key: String,
        tenant: TenantId,
    },
    TaskClaimed {
        task_id: TaskId,
        user_id: String,
    },
    TaskUnclaimed {
        task_id: TaskId,
    },
    TaskCompleted {
        task_id: TaskId,
    },
}

impl DomainEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::ArtifactDeployed { .. } => "artifact_deployed",
            DomainEvent::ProcessStarted { .. } => "process_started",
            DomainEvent::TaskClaimed { .. } => "task_claimed",
            DomainEvent::TaskUnclaimed { .. } => "task_unclaimed",
            DomainEvent::TaskCompleted { .. } => "task_completed",
        }
    }
}
