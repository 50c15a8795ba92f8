//! Deployment artifacts and the units submitted to the engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{DeploymentId, TenantId};

/// Where an artifact was discovered.
///
/// The shared group is deployed to every tenant, a tenant group only to the tenant
/// it is named after.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactGroup {
    Shared,
    Tenant(TenantId),
}

impl fmt::Display for ArtifactGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactGroup::Shared => f.write_str("shared"),
            ArtifactGroup::Tenant(tenant) => write!(f, "tenant:{tenant}"),
        }
    }
}

/// A named byte-content unit (process definition file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentArtifact {
    pub name: String,
    pub content: Vec<u8>,
    pub group: ArtifactGroup,
}

impl DeploymentArtifact {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>, group: ArtifactGroup) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            group,
        }
    }
}

/// File types the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// `.bpmn20.xml` / `.bpmn`
    ProcessDefinition,
    /// `.bar` / `.zip` business archive
    Archive,
}

impl ArtifactKind {
    /// Classify by file name.
    ///
    /// Process definition suffixes are matched exactly, archive suffixes
    /// case-insensitively.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(".bpmn20.xml") || name.ends_with(".bpmn") {
            return Some(ArtifactKind::ProcessDefinition);
        }
        let lower = name.to_lowercase();
        if lower.ends_with(".bar") || lower.ends_with(".zip") {
            return Some(ArtifactKind::Archive);
        }
        None
    }
}

/// Process definition key derived from an artifact name (`hire.bpmn20.xml` -> `hire`).
pub fn definition_key_of(name: &str) -> &str {
    [".bpmn20.xml", ".bpmn", ".xml"]
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .unwrap_or(name)
}

/// One artifact for one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentUnit {
    pub name: String,
    pub content: Vec<u8>,
    /// `None` only for untagged uploads; the startup importer always tags.
    pub tenant: Option<TenantId>,
}

impl DeploymentUnit {
    pub fn for_tenant(artifact: &DeploymentArtifact, tenant: &TenantId) -> Self {
        Self {
            name: artifact.name.clone(),
            content: artifact.content.clone(),
            tenant: Some(tenant.clone()),
        }
    }
}

/// Deployment record kept by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: DeploymentId,
    pub name: String,
    pub tenant_id: Option<TenantId>,
    pub deployed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("hire.bpmn20.xml", Some(ArtifactKind::ProcessDefinition))]
    #[case("hire.bpmn", Some(ArtifactKind::ProcessDefinition))]
    #[case("bundle.BAR", Some(ArtifactKind::Archive))]
    #[case("bundle.zip", Some(ArtifactKind::Archive))]
    #[case("notes.txt", None)]
    #[case("HIRE.BPMN", None)]
    fn classify_artifacts(#[case] name: &str, #[case] expected: Option<ArtifactKind>) {
        assert_eq!(ArtifactKind::from_file_name(name), expected);
    }

    #[rstest]
    #[case("hireProcess.bpmn20.xml", "hireProcess")]
    #[case("extra.bpmn", "extra")]
    #[case("plain", "plain")]
    fn definition_key_strips_known_suffixes(#[case] name: &str, #[case] key: &str) {
        assert_eq!(definition_key_of(name), key);
    }

    #[test]
    fn unit_is_tagged_with_tenant() {
        let artifact = DeploymentArtifact::new("hire.bpmn", b"<xml/>".to_vec(), ArtifactGroup::Shared);
        let unit = DeploymentUnit::for_tenant(&artifact, &TenantId::new("acme"));
        assert_eq!(unit.name, "hire.bpmn");
        assert_eq!(unit.tenant, Some(TenantId::new("acme")));
    }
}
