//! DeploymentService - デプロイ一覧と手動アップロード

use std::sync::Arc;

use crate::domain::{
    ArtifactKind, Deployment, DeploymentId, DeploymentUnit, DomainEvent, EngineError, TenantId,
};
use crate::error::DeploymentError;
use crate::ports::{EventSink, ProcessEngine};
use crate::query::{DeploymentQuery, Page, Pageable};

#[derive(Clone)]
pub struct DeploymentService {
    engine: Arc<dyn ProcessEngine>,
    events: Arc<dyn EventSink>,
}

impl DeploymentService {
    pub fn new(engine: Arc<dyn ProcessEngine>, events: Arc<dyn EventSink>) -> Self {
        Self { engine, events }
    }

    /// Sort properties come from `pageable`; unknown ones fall back to `id`.
    pub async fn list_deployments(
        &self,
        filter: DeploymentQuery,
        pageable: &Pageable,
    ) -> Result<Page<Deployment>, EngineError> {
        let query = filter.with_sort(&pageable.sort);
        self.engine.list_deployments(&query, pageable.page).await
    }

    /// Deploy one uploaded file, optionally tagged with a tenant.
    ///
    /// # Errors
    /// - `InvalidArtifact`: unsupported file type or empty content
    /// - `Engine`: the engine rejected the deployment
    pub async fn upload(
        &self,
        tenant: Option<TenantId>,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<DeploymentId, DeploymentError> {
        if ArtifactKind::from_file_name(file_name).is_none() {
            return Err(DeploymentError::InvalidArtifact {
                name: file_name.to_string(),
                reason: "only .bpmn20.xml, .bpmn, .bar and .zip files are supported".to_string(),
            });
        }
        if content.is_empty() {
            return Err(DeploymentError::InvalidArtifact {
                name: file_name.to_string(),
                reason: "empty content".to_string(),
            });
        }

        let unit = DeploymentUnit {
            name: file_name.to_string(),
            content,
            tenant: tenant.clone(),
        };
        let deployment_id = self.engine.deploy(unit).await?;
        tracing::info!(file_name, tenant = ?tenant, %deployment_id, "artifact uploaded");
        self.events.emit(DomainEvent::ArtifactDeployed {
            deployment_id: deployment_id.clone(),
            name: file_name.to_string(),
            tenant,
        });
        Ok(deployment_id)
    }
}
