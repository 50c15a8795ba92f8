//! TaskQuerySpec - tenant scope + predicate + ordering.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::page::{Direction, SortParam};
use super::predicate::Predicate;
use crate::domain::{Task, TenantId};

/// Task attributes the engine can order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Id,
    Name,
    Description,
    DueDate,
    CreateTime,
    Priority,
    ExecutionId,
    TenantId,
    DefinitionKey,
    Assignee,
    Owner,
    ProcessInstanceId,
    ProcessDefinitionId,
}

impl SortKey {
    pub const ALL: [SortKey; 13] = [
        SortKey::Id,
        SortKey::Name,
        SortKey::Description,
        SortKey::DueDate,
        SortKey::CreateTime,
        SortKey::Priority,
        SortKey::ExecutionId,
        SortKey::TenantId,
        SortKey::DefinitionKey,
        SortKey::Assignee,
        SortKey::Owner,
        SortKey::ProcessInstanceId,
        SortKey::ProcessDefinitionId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Name => "name",
            SortKey::Description => "description",
            SortKey::DueDate => "dueDate",
            SortKey::CreateTime => "createTime",
            SortKey::Priority => "priority",
            SortKey::ExecutionId => "executionId",
            SortKey::TenantId => "tenantId",
            SortKey::DefinitionKey => "definitionKey",
            SortKey::Assignee => "assignee",
            SortKey::Owner => "owner",
            SortKey::ProcessInstanceId => "processInstanceId",
            SortKey::ProcessDefinitionId => "processDefinitionId",
        }
    }

    /// Case-insensitive lookup by property name.
    pub fn parse(property: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(property))
    }

    /// Ascending comparison on this attribute. Missing values sort first.
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Description => a.description.cmp(&b.description),
            SortKey::DueDate => a.due_date.cmp(&b.due_date),
            SortKey::CreateTime => a.create_time.cmp(&b.create_time),
            SortKey::Priority => a.priority.cmp(&b.priority),
            SortKey::ExecutionId => a.execution_id.cmp(&b.execution_id),
            SortKey::TenantId => a.tenant_id.cmp(&b.tenant_id),
            SortKey::DefinitionKey => a.definition_key.cmp(&b.definition_key),
            SortKey::Assignee => a.assignee.cmp(&b.assignee),
            SortKey::Owner => a.owner.cmp(&b.owner),
            SortKey::ProcessInstanceId => a.process_instance_id.cmp(&b.process_instance_id),
            SortKey::ProcessDefinitionId => a.process_definition_id.cmp(&b.process_definition_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOrder {
    pub key: SortKey,
    pub direction: Direction,
}

/// Immutable description of a task query.
///
/// Built by the pure functions in `query::builder`; handed as-is to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskQuerySpec {
    pub tenant: TenantId,
    pub predicate: Predicate,
    #[serde(default)]
    pub ordering: Vec<TaskOrder>,
}

impl TaskQuerySpec {
    pub fn new(tenant: TenantId, predicate: Predicate) -> Self {
        Self {
            tenant,
            predicate,
            ordering: Vec::new(),
        }
    }

    pub fn order_by(mut self, key: SortKey, direction: Direction) -> Self {
        self.ordering.push(TaskOrder { key, direction });
        self
    }

    /// Apply caller-supplied sort parameters; unknown properties are skipped.
    pub fn with_sort(self, sort: &[SortParam]) -> Self {
        sort.iter().fold(self, |spec, param| match SortKey::parse(&param.property) {
            Some(key) => spec.order_by(key, param.direction),
            None => {
                tracing::debug!(property = %param.property, "ignoring unknown task sort property");
                spec
            }
        })
    }

    pub fn matches(&self, task: &Task) -> bool {
        task.tenant_id == self.tenant && self.predicate.evaluate(task)
    }

    /// Lexicographic comparison over `ordering`.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        self.ordering
            .iter()
            .map(|order| {
                let ord = order.key.compare(a, b);
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}
