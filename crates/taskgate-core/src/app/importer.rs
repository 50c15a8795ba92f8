//! DeploymentImporter - 起動時のプロセス定義インポート
//!
//! # 方針
//! - (artifact, tenant) ごとに 1 デプロイ
//! - 1 ユニットの失敗で残りを止めない（ベストエフォート）
//! - 失敗は `ImportReport` に記録し、件数で呼び出し元が起動失敗を判断する
//!
//! # 順序
//! テナントはレジストリ順、artifact はファイル名順。再実行しても同じ順序になります。

use std::sync::Arc;

use crate::app::registry::TenantRegistry;
use crate::domain::{
    ArtifactGroup, DeploymentId, DeploymentUnit, DomainEvent, EngineError, TenantId,
};
use crate::error::ImportError;
use crate::ports::{ArtifactSource, EventSink, ProcessEngine};

/// Result of one (artifact, tenant) deployment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOutcome {
    pub artifact: String,
    pub tenant: TenantId,
    pub result: Result<DeploymentId, EngineError>,
}

impl UnitOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-unit outcomes of an import run, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    outcomes: Vec<UnitOutcome>,
}

impl ImportReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: UnitOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn merge(&mut self, other: ImportReport) {
        self.outcomes.extend(other.outcomes);
    }

    pub fn outcomes(&self) -> &[UnitOutcome] {
        &self.outcomes
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &UnitOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn is_clean(&self) -> bool {
        self.failure_count() == 0
    }
}

/// Deploys artifact groups to their tenants.
#[derive(Clone)]
pub struct DeploymentImporter {
    engine: Arc<dyn ProcessEngine>,
    source: Arc<dyn ArtifactSource>,
    registry: Arc<TenantRegistry>,
    events: Arc<dyn EventSink>,
    shared_group: String,
}

impl DeploymentImporter {
    pub fn new(
        engine: Arc<dyn ProcessEngine>,
        source: Arc<dyn ArtifactSource>,
        registry: Arc<TenantRegistry>,
        events: Arc<dyn EventSink>,
        shared_group: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            source,
            registry,
            events,
            shared_group: shared_group.into(),
        }
    }

    /// Folder name of a group under the artifact base.
    pub fn group_path<'a>(&'a self, group: &'a ArtifactGroup) -> &'a str {
        match group {
            ArtifactGroup::Shared => &self.shared_group,
            ArtifactGroup::Tenant(tenant) => tenant.as_str(),
        }
    }

    /// Deploy every artifact of `group` to each of `tenants`.
    ///
    /// # Errors
    /// Only when the source cannot be listed at all; per-unit failures are recorded
    /// in the report.
    pub async fn import_group(
        &self,
        group: &ArtifactGroup,
        tenants: &[TenantId],
    ) -> Result<ImportReport, ImportError> {
        let path = self.group_path(group);
        let artifacts = self.source.list(path, group)?;
        tracing::debug!(group = %group, path, artifacts = artifacts.len(), "importing artifact group");

        let mut report = ImportReport::new();
        for tenant in tenants {
            for artifact in &artifacts {
                let unit = DeploymentUnit::for_tenant(artifact, tenant);
                let result = match self.engine.deploy(unit).await {
                    Ok(deployment_id) => {
                        tracing::info!(artifact = %artifact.name, %tenant, %deployment_id, "artifact deployed");
                        self.events.emit(DomainEvent::ArtifactDeployed {
                            deployment_id: deployment_id.clone(),
                            name: artifact.name.clone(),
                            tenant: Some(tenant.clone()),
                        });
                        Ok(deployment_id)
                    }
                    Err(e) => {
                        tracing::warn!(artifact = %artifact.name, %tenant, error = %e, "artifact deployment failed");
                        Err(e)
                    }
                };
                report.record(UnitOutcome {
                    artifact: artifact.name.clone(),
                    tenant: tenant.clone(),
                    result,
                });
            }
        }
        Ok(report)
    }

    /// Shared group to every tenant, then each tenant's own group to that tenant.
    ///
    /// Without configured tenants this is a no-op. A tenant named like the shared
    /// folder gets that folder once.
    pub async fn import_all(&self) -> Result<ImportReport, ImportError> {
        let tenants = match self.registry.list_tenants() {
            Ok(tenants) => tenants,
            Err(reason) => {
                tracing::info!(%reason, "multi-tenant import skipped");
                return Ok(ImportReport::new());
            }
        };

        let mut report = self.import_group(&ArtifactGroup::Shared, tenants).await?;
        for tenant in tenants {
            // its folder is the shared one, already deployed to it above
            if tenant.as_str() == self.shared_group {
                tracing::debug!(%tenant, "tenant group is the shared group, skipped");
                continue;
            }
            let group = ArtifactGroup::Tenant(tenant.clone());
            report.merge(self.import_group(&group, std::slice::from_ref(tenant)).await?);
        }

        tracing::info!(
            attempted = report.attempted(),
            succeeded = report.succeeded(),
            failed = report.failure_count(),
            "import finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryEngine;
    use crate::ports::{InMemoryArtifactSource, RecordingEventSink};

    fn importer(
        engine: Arc<InMemoryEngine>,
        source: InMemoryArtifactSource,
        registry: TenantRegistry,
    ) -> (DeploymentImporter, Arc<RecordingEventSink>) {
        let events = Arc::new(RecordingEventSink::new());
        let importer = DeploymentImporter::new(
            engine,
            Arc::new(source),
            Arc::new(registry),
            events.clone(),
            "all",
        );
        (importer, events)
    }

    #[tokio::test]
    async fn shared_group_goes_to_every_tenant_in_order() {
        let engine = Arc::new(InMemoryEngine::new());
        let source = InMemoryArtifactSource::new()
            .with_artifact("all", "b.bpmn", "<b/>")
            .with_artifact("all", "a.bpmn", "<a/>");
        let (importer, events) = importer(engine, source, TenantRegistry::new(["acme", "beta"]));

        let tenants = [TenantId::new("acme"), TenantId::new("beta")];
        let report = importer
            .import_group(&ArtifactGroup::Shared, &tenants)
            .await
            .unwrap();

        let order: Vec<_> = report
            .outcomes()
            .iter()
            .map(|o| format!("{}@{}", o.artifact, o.tenant))
            .collect();
        assert_eq!(order, vec!["a.bpmn@acme", "b.bpmn@acme", "a.bpmn@beta", "b.bpmn@beta"]);
        assert!(report.is_clean());
        assert_eq!(events.events().len(), 4);
    }

    #[tokio::test]
    async fn failing_unit_does_not_stop_the_rest() {
        let engine = Arc::new(InMemoryEngine::new());
        engine.reject_deployments_of("broken.bpmn").await;
        let source = InMemoryArtifactSource::new()
            .with_artifact("all", "a.bpmn", "<a/>")
            .with_artifact("all", "broken.bpmn", "<x/>")
            .with_artifact("all", "c.bpmn", "<c/>");
        let (importer, _) = importer(engine.clone(), source, TenantRegistry::new(["acme"]));

        let report = importer
            .import_group(&ArtifactGroup::Shared, &[TenantId::new("acme")])
            .await
            .unwrap();

        assert_eq!(report.attempted(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failure_count(), 1);
        let failure = report.failures().next().unwrap();
        assert_eq!(failure.artifact, "broken.bpmn");
        assert!(matches!(
            failure.result,
            Err(EngineError::DeploymentFailed { ref name, .. }) if name == "broken.bpmn"
        ));
        assert_eq!(engine.deployments().await.len(), 2);
    }

    #[tokio::test]
    async fn tenant_named_like_shared_group_gets_it_once() {
        let engine = Arc::new(InMemoryEngine::new());
        let source = InMemoryArtifactSource::new().with_artifact("all", "hire.bpmn", "<d/>");
        let (importer, _) = importer(engine.clone(), source, TenantRegistry::new(["all", "beta"]));

        let report = importer.import_all().await.unwrap();

        assert_eq!(report.attempted(), 2);
        let to_all = engine
            .deployments()
            .await
            .into_iter()
            .filter(|d| d.tenant_id == Some(TenantId::new("all")))
            .count();
        assert_eq!(to_all, 1);
    }

    #[tokio::test]
    async fn import_all_without_tenants_is_noop() {
        let engine = Arc::new(InMemoryEngine::new());
        let source = InMemoryArtifactSource::new().with_artifact("all", "a.bpmn", "<a/>");
        let (importer, _) = importer(engine.clone(), source, TenantRegistry::default());

        let report = importer.import_all().await.unwrap();
        assert_eq!(report.attempted(), 0);
        assert_eq!(engine.deploy_attempts().await, 0);
    }

    #[tokio::test]
    async fn missing_group_is_empty() {
        let engine = Arc::new(InMemoryEngine::new());
        let (importer, _) = importer(engine, InMemoryArtifactSource::new(), TenantRegistry::new(["acme"]));

        let group = ArtifactGroup::Tenant(TenantId::new("acme"));
        let report = importer
            .import_group(&group, &[TenantId::new("acme")])
            .await
            .unwrap();
        assert_eq!(report.attempted(), 0);
    }
}
