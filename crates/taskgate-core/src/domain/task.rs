//! Human task as reported by the process engine.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ProcessInstanceId, TaskId, TenantId};

/// Task state (active set only).
///
/// State transitions:
/// - Unassigned -> Claimed (claim)
/// - Claimed -> Unassigned (unclaim)
/// - Unassigned | Claimed -> (completed, leaves the active set)
///
/// Completed tasks are not represented: the engine drops them from every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Unassigned,
    Claimed,
}

/// A unit of human work belonging to exactly one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tenant_id: TenantId,
    pub process_definition_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_instance_id: Option<ProcessInstanceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<String>,
    /// Key of the task element inside the process definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub assignee: Option<String>,
    #[serde(default)]
    pub candidate_users: BTreeSet<String>,
    #[serde(default)]
    pub candidate_groups: BTreeSet<String>,
    pub create_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub priority: i32,
}

/// `is_assigned` was asked about a task nobody holds.
///
/// Callers must check `Task::state()` first; comparing an empty assignment is a
/// logic error, not a `false`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("task {0} has no assignee")]
pub struct NullAssignee(pub TaskId);

impl Task {
    /// Minimal unassigned task; the remaining attributes use engine defaults.
    pub fn new(
        id: TaskId,
        name: impl Into<String>,
        tenant_id: TenantId,
        process_definition_id: impl Into<String>,
        create_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            tenant_id,
            process_definition_id: process_definition_id.into(),
            process_instance_id: None,
            execution_id: None,
            definition_key: None,
            owner: None,
            assignee: None,
            candidate_users: BTreeSet::new(),
            candidate_groups: BTreeSet::new(),
            create_time,
            due_date: None,
            priority: 50,
        }
    }

    pub fn with_candidate_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidate_users = users.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_candidate_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidate_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_process_instance(mut self, id: ProcessInstanceId) -> Self {
        self.process_instance_id = Some(id);
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn state(&self) -> TaskState {
        match self.assignee {
            Some(_) => TaskState::Claimed,
            None => TaskState::Unassigned,
        }
    }

    /// Claimable by `user`/`groups`: unassigned and either the user is a candidate
    /// or one of the groups is a candidate group.
    pub fn is_claimable_by(&self, user: Option<&str>, groups: &[String]) -> bool {
        if self.state() != TaskState::Unassigned {
            return false;
        }
        let by_user = user.is_some_and(|u| self.candidate_users.contains(u));
        let by_group = groups.iter().any(|g| self.candidate_groups.contains(g));
        by_user || by_group
    }

    /// Case-insensitive comparison of the assignee with `user_id`.
    ///
    /// `Predicate::Assignee` matches exactly, so a task accepted here may still be
    /// missing from an assigned-task query for a differently cased user id.
    pub fn is_assigned(&self, user_id: &str) -> Result<bool, NullAssignee> {
        let assignee = self
            .assignee
            .as_deref()
            .ok_or_else(|| NullAssignee(self.id.clone()))?;
        Ok(assignee.to_lowercase() == user_id.to_lowercase())
    }
}
