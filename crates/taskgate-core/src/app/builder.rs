//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - テナント設定は build() 時に検証（空白 ID は起動エラー）
//! - 未指定のポートはデフォルト実装で埋める
//!   - ArtifactSource: `processes.base_path` を起点とする FsArtifactSource
//!   - EventSink: TracingEventSink

use std::sync::Arc;

use crate::app::deployments::DeploymentService;
use crate::app::gateway::TaskRequestGateway;
use crate::app::importer::DeploymentImporter;
use crate::app::processes::ProcessOrchestrationFacade;
use crate::app::registry::TenantRegistry;
use crate::app::tasks::TaskAuthorizationEngine;
use crate::config::{ConfigError, TaskgateConfig};
use crate::ports::{ArtifactSource, EventSink, FsArtifactSource, ProcessEngine, TracingEventSink};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new(Arc::new(InMemoryEngine::new()))
///     .config(TaskgateConfig::load("taskgate.toml")?)
///     .build()?;
/// let report = app.importer().import_all().await?;
/// ```
pub struct AppBuilder {
    engine: Arc<dyn ProcessEngine>,
    config: TaskgateConfig,
    source: Option<Arc<dyn ArtifactSource>>,
    events: Option<Arc<dyn EventSink>>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid tenant configuration: {0}")]
    Tenants(#[from] ConfigError),
}

impl AppBuilder {
    pub fn new(engine: Arc<dyn ProcessEngine>) -> Self {
        Self {
            engine,
            config: TaskgateConfig::default(),
            source: None,
            events: None,
        }
    }

    pub fn config(mut self, config: TaskgateConfig) -> Self {
        self.config = config;
        self
    }

    pub fn artifact_source(mut self, source: Arc<dyn ArtifactSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// # 検証
    /// - テナント一覧に空白 ID があれば BuildError::Tenants
    pub fn build(self) -> Result<App, BuildError> {
        let registry = Arc::new(TenantRegistry::from_config(&self.config)?);
        let source: Arc<dyn ArtifactSource> = match self.source {
            Some(source) => source,
            None => Arc::new(FsArtifactSource::new(self.config.processes.base_path.clone())),
        };
        let events: Arc<dyn EventSink> = match self.events {
            Some(events) => events,
            None => Arc::new(TracingEventSink),
        };

        let tasks = TaskAuthorizationEngine::new(Arc::clone(&self.engine), Arc::clone(&events));
        let processes = ProcessOrchestrationFacade::new(Arc::clone(&self.engine), Arc::clone(&events));
        let deployments = DeploymentService::new(Arc::clone(&self.engine), Arc::clone(&events));
        let importer = DeploymentImporter::new(
            Arc::clone(&self.engine),
            source,
            Arc::clone(&registry),
            events,
            self.config.processes.shared_group.clone(),
        );
        let gateway = TaskRequestGateway::new(tasks.clone(), processes.clone(), deployments.clone());

        Ok(App {
            registry,
            importer,
            tasks,
            processes,
            deployments,
            gateway,
        })
    }
}

/// App は構築済みのサービス一式
///
/// 各サービスは `Arc` ハンドルのみを持つので clone は安価です。
#[derive(Clone)]
pub struct App {
    registry: Arc<TenantRegistry>,
    importer: DeploymentImporter,
    tasks: TaskAuthorizationEngine,
    processes: ProcessOrchestrationFacade,
    deployments: DeploymentService,
    gateway: TaskRequestGateway,
}

impl App {
    pub fn registry(&self) -> &TenantRegistry {
        &self.registry
    }

    pub fn importer(&self) -> &DeploymentImporter {
        &self.importer
    }

    pub fn tasks(&self) -> &TaskAuthorizationEngine {
        &self.tasks
    }

    pub fn processes(&self) -> &ProcessOrchestrationFacade {
        &self.processes
    }

    pub fn deployments(&self) -> &DeploymentService {
        &self.deployments
    }

    pub fn gateway(&self) -> &TaskRequestGateway {
        &self.gateway
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TenantId;
    use crate::impls::InMemoryEngine;
    use crate::ports::{InMemoryArtifactSource, RecordingEventSink};

    #[test]
    fn build_with_defaults() {
        let app = AppBuilder::new(Arc::new(InMemoryEngine::new())).build();
        assert!(app.is_ok());
    }

    #[test]
    fn build_rejects_blank_tenant() {
        let config = TaskgateConfig::default().with_tenants(["acme", " "]);
        let app = AppBuilder::new(Arc::new(InMemoryEngine::new()))
            .config(config)
            .build();
        assert!(matches!(
            app,
            Err(BuildError::Tenants(ConfigError::BlankTenant(1)))
        ));
    }

    #[tokio::test]
    async fn built_app_imports_through_configured_ports() {
        let engine = Arc::new(InMemoryEngine::new());
        let events = Arc::new(RecordingEventSink::new());
        let app = AppBuilder::new(engine.clone())
            .config(TaskgateConfig::default().with_tenants(["acme"]))
            .artifact_source(Arc::new(
                InMemoryArtifactSource::new().with_artifact("all", "hire.bpmn", "<d/>"),
            ))
            .event_sink(events.clone())
            .build()
            .unwrap();

        assert!(app.registry().contains(&TenantId::new("acme")));
        let report = app.importer().import_all().await.unwrap();
        assert_eq!(report.succeeded(), 1);
        assert_eq!(events.events().len(), 1);
    }
}
