//! Visibility rules as pure functions from request parameters to `TaskQuerySpec`.
//!
//! Claimable = tenant ∧ unassigned ∧ (candidate user ∨ candidate group).
//! The disjunction is only added when the caller has an identity to match; with
//! neither a user nor groups the query is the administrative "every unassigned
//! task of the tenant" view.
//!
//! Assigned = tenant ∧ assignee = user.

use serde::{Deserialize, Serialize};

use super::predicate::Predicate;
use super::spec::TaskQuerySpec;
use crate::domain::{ProcessInstanceId, TaskId, TenantId};

/// Optional narrowing filters shared by list queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub process_definition_id: Option<String>,
    #[serde(default)]
    pub process_instance_id: Option<ProcessInstanceId>,
}

impl TaskFilter {
    pub fn process_instance(id: ProcessInstanceId) -> Self {
        Self {
            process_instance_id: Some(id),
            ..Self::default()
        }
    }

    fn narrow(&self, predicate: Predicate) -> Predicate {
        let predicate = match &self.process_definition_id {
            Some(id) => predicate.and(Predicate::ProcessDefinitionId(id.clone())),
            None => predicate,
        };
        match &self.process_instance_id {
            Some(id) => predicate.and(Predicate::ProcessInstanceId(id.clone())),
            None => predicate,
        }
    }
}

/// `CandidateUser ∨ CandidateGroup`, or `None` when there is nothing to match.
///
/// Only an absent user drops the user term; `Some("")` still restricts (and matches
/// no task), so a degenerate identity never falls back to the unscoped view.
fn candidate_disjunction(user: Option<&str>, groups: &[String]) -> Option<Predicate> {
    let by_user = user.map(|u| Predicate::CandidateUser(u.to_string()));
    let by_group = (!groups.is_empty()).then(|| Predicate::candidate_group(groups.iter().cloned()));
    match (by_user, by_group) {
        (Some(u), Some(g)) => Some(u.or(g)),
        (Some(p), None) | (None, Some(p)) => Some(p),
        (None, None) => None,
    }
}

fn claimable(user: Option<&str>, groups: &[String]) -> Predicate {
    match candidate_disjunction(user, groups) {
        Some(candidates) => Predicate::Unassigned.and(candidates),
        None => Predicate::Unassigned,
    }
}

pub fn claimable_tasks(
    tenant: &TenantId,
    user: Option<&str>,
    groups: &[String],
    filter: &TaskFilter,
) -> TaskQuerySpec {
    TaskQuerySpec::new(tenant.clone(), filter.narrow(claimable(user, groups)))
}

pub fn assigned_tasks(tenant: &TenantId, user: &str, filter: &TaskFilter) -> TaskQuerySpec {
    let predicate = Predicate::Assignee(user.to_string());
    TaskQuerySpec::new(tenant.clone(), filter.narrow(predicate))
}

pub fn claimable_task(
    tenant: &TenantId,
    task_id: &TaskId,
    user: Option<&str>,
    groups: &[String],
) -> TaskQuerySpec {
    let predicate = Predicate::TaskId(task_id.clone()).and(claimable(user, groups));
    TaskQuerySpec::new(tenant.clone(), predicate)
}

pub fn assigned_task(tenant: &TenantId, task_id: &TaskId, assignee: &str) -> TaskQuerySpec {
    let predicate = Predicate::TaskId(task_id.clone()).and(Predicate::Assignee(assignee.to_string()));
    TaskQuerySpec::new(tenant.clone(), predicate)
}

/// Any active task with this id in the tenant (administrative existence check).
pub fn task_in_tenant(tenant: &TenantId, task_id: &TaskId) -> TaskQuerySpec {
    TaskQuerySpec::new(tenant.clone(), Predicate::TaskId(task_id.clone()))
}
