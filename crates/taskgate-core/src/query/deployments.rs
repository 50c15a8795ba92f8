//! Deployment listing: filters and ordering for the administrative view.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::page::{Direction, SortParam};
use crate::domain::Deployment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeploymentSortKey {
    Id,
    Name,
    DeployTime,
    TenantId,
}

impl DeploymentSortKey {
    pub fn parse(property: &str) -> Option<Self> {
        [
            ("id", DeploymentSortKey::Id),
            ("name", DeploymentSortKey::Name),
            ("deployTime", DeploymentSortKey::DeployTime),
            ("tenantId", DeploymentSortKey::TenantId),
        ]
        .into_iter()
        .find_map(|(name, key)| name.eq_ignore_ascii_case(property).then_some(key))
    }

    fn compare(self, a: &Deployment, b: &Deployment) -> Ordering {
        match self {
            DeploymentSortKey::Id => a.id.cmp(&b.id),
            DeploymentSortKey::Name => a.name.cmp(&b.name),
            DeploymentSortKey::DeployTime => a.deployed_at.cmp(&b.deployed_at),
            DeploymentSortKey::TenantId => a.tenant_id.cmp(&b.tenant_id),
        }
    }
}

/// Deployment filters. Every field that is set must match.
///
/// `*_like` fields use SQL `LIKE` syntax (`%` any run, `_` one character).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentQuery {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub name_like: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub tenant_id_like: Option<String>,
    #[serde(default)]
    pub without_tenant_id: bool,
    #[serde(default)]
    pub ordering: Vec<(DeploymentSortKey, Direction)>,
}

impl DeploymentQuery {
    pub fn tenant(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: Some(tenant_id.into()),
            ..Self::default()
        }
    }

    /// Apply sort parameters, falling back to `id` ascending when none is usable.
    pub fn with_sort(mut self, sort: &[SortParam]) -> Self {
        self.ordering = sort
            .iter()
            .filter_map(|p| DeploymentSortKey::parse(&p.property).map(|k| (k, p.direction)))
            .collect();
        if self.ordering.is_empty() {
            self.ordering.push((DeploymentSortKey::Id, Direction::Asc));
        }
        self
    }

    pub fn matches(&self, deployment: &Deployment) -> bool {
        let tenant = deployment.tenant_id.as_ref().map(|t| t.as_str());
        self.name.as_deref().is_none_or(|n| deployment.name == n)
            && self
                .name_like
                .as_deref()
                .is_none_or(|p| sql_like(p, &deployment.name))
            && self.tenant_id.as_deref().is_none_or(|t| tenant == Some(t))
            && self
                .tenant_id_like
                .as_deref()
                .is_none_or(|p| tenant.is_some_and(|t| sql_like(p, t)))
            && (!self.without_tenant_id || tenant.is_none())
    }

    pub fn compare(&self, a: &Deployment, b: &Deployment) -> Ordering {
        self.ordering
            .iter()
            .map(|(key, direction)| match direction {
                Direction::Asc => key.compare(a, b),
                Direction::Desc => key.compare(a, b).reverse(),
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// SQL `LIKE` matcher over chars.
fn sql_like(pattern: &str, value: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let v: Vec<char> = value.chars().collect();
    // dp[j]: pattern[..i] matches value[..j]
    let mut dp = vec![false; v.len() + 1];
    dp[0] = true;
    for &pc in &p {
        let mut next = vec![false; v.len() + 1];
        if pc == '%' {
            let mut seen = false;
            for j in 0..=v.len() {
                seen |= dp[j];
                next[j] = seen;
            }
        } else {
            for j in 1..=v.len() {
                next[j] = dp[j - 1] && (pc == '_' || pc == v[j - 1]);
            }
        }
        dp = next;
    }
    dp[v.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeploymentId, TenantId};
    use chrono::Utc;
    use rstest::rstest;

    fn deployment(id: &str, name: &str, tenant: Option<&str>) -> Deployment {
        Deployment {
            id: DeploymentId::new(id),
            name: name.to_string(),
            tenant_id: tenant.map(TenantId::new),
            deployed_at: Utc::now(),
        }
    }

    #[rstest]
    #[case("hire%", "hire.bpmn", true)]
    #[case("%.bpmn", "hire.bpmn", true)]
    #[case("h_re.bpmn", "hire.bpmn", true)]
    #[case("%xml", "hire.bpmn", false)]
    #[case("%", "", true)]
    #[case("hire", "hire.bpmn", false)]
    fn like_patterns(#[case] pattern: &str, #[case] value: &str, #[case] expected: bool) {
        assert_eq!(sql_like(pattern, value), expected);
    }

    #[test]
    fn filters_combine() {
        let q = DeploymentQuery {
            name_like: Some("hire%".into()),
            ..DeploymentQuery::tenant("acme")
        };
        assert!(q.matches(&deployment("1", "hire.bpmn", Some("acme"))));
        assert!(!q.matches(&deployment("2", "hire.bpmn", Some("beta"))));
        assert!(!q.matches(&deployment("3", "extra.bpmn", Some("acme"))));
    }

    #[test]
    fn without_tenant_only_keeps_untagged() {
        let q = DeploymentQuery {
            without_tenant_id: true,
            ..DeploymentQuery::default()
        };
        assert!(q.matches(&deployment("1", "a.bpmn", None)));
        assert!(!q.matches(&deployment("2", "a.bpmn", Some("acme"))));
    }

    #[test]
    fn default_ordering_is_id() {
        let q = DeploymentQuery::default().with_sort(&[SortParam::parse("nope").unwrap()]);
        assert_eq!(q.ordering, vec![(DeploymentSortKey::Id, Direction::Asc)]);
    }
}
