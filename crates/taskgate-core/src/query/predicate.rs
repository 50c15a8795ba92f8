//! Predicate tree for task queries.
//!
//! Design:
//! - Explicit sum type instead of begin-or / end-or bracketing on a mutable query.
//! - `evaluate` is the reference interpreter; engine adapters translate the same
//!   tree into their native query capability.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{ProcessInstanceId, Task, TaskId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum Predicate {
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    /// `user` is in the task's candidate users.
    CandidateUser(String),
    /// At least one of the groups is a candidate group of the task.
    CandidateGroup(BTreeSet<String>),
    Assignee(String),
    Unassigned,
    TaskId(TaskId),
    ProcessDefinitionId(String),
    ProcessInstanceId(ProcessInstanceId),
}

impl Predicate {
    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    pub fn candidate_group<I, S>(groups: I) -> Predicate
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::CandidateGroup(groups.into_iter().map(Into::into).collect())
    }

    pub fn evaluate(&self, task: &Task) -> bool {
        match self {
            Predicate::And(lhs, rhs) => lhs.evaluate(task) && rhs.evaluate(task),
            Predicate::Or(lhs, rhs) => lhs.evaluate(task) || rhs.evaluate(task),
            Predicate::CandidateUser(user) => task.candidate_users.contains(user),
            Predicate::CandidateGroup(groups) => {
                !task.candidate_groups.is_disjoint(groups)
            }
            Predicate::Assignee(user) => task.assignee.as_deref() == Some(user.as_str()),
            Predicate::Unassigned => task.assignee.is_none(),
            Predicate::TaskId(id) => &task.id == id,
            Predicate::ProcessDefinitionId(id) => &task.process_definition_id == id,
            Predicate::ProcessInstanceId(id) => task.process_instance_id.as_ref() == Some(id),
        }
    }
}
