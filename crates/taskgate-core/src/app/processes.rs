//! ProcessOrchestrationFacade - テナント付きのプロセス開始

use std::sync::Arc;

use crate::domain::{DomainEvent, EngineError, ProcessInstance, TenantId, Variables};
use crate::ports::{EventSink, ProcessEngine};

#[derive(Clone)]
pub struct ProcessOrchestrationFacade {
    engine: Arc<dyn ProcessEngine>,
    events: Arc<dyn EventSink>,
}

impl ProcessOrchestrationFacade {
    pub fn new(engine: Arc<dyn ProcessEngine>, events: Arc<dyn EventSink>) -> Self {
        Self { engine, events }
    }

    /// Start the latest definition of `definition_key` deployed to `tenant`.
    ///
    /// # Errors
    /// `EngineError::ProcessNotFound` when the tenant has no such definition.
    pub async fn start_process(
        &self,
        tenant: &TenantId,
        definition_key: &str,
        variables: Variables,
    ) -> Result<ProcessInstance, EngineError> {
        let instance = self
            .engine
            .start_process_instance(definition_key, tenant, variables)
            .await?;
        tracing::info!(%tenant, definition_key, instance_id = %instance.id, "process started");
        self.events.emit(DomainEvent::ProcessStarted {
            instance_id: instance.id.clone(),
            definition_key: instance.definition_key.clone(),
            tenant: tenant.clone(),
        });
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DeploymentUnit;
    use crate::impls::InMemoryEngine;
    use crate::ports::{ProcessEngine, RecordingEventSink};

    #[tokio::test]
    async fn start_is_tenant_scoped() {
        let engine = Arc::new(InMemoryEngine::new());
        engine
            .deploy(DeploymentUnit {
                name: "hire.bpmn".into(),
                content: b"<definitions/>".to_vec(),
                tenant: Some(TenantId::new("acme")),
            })
            .await
            .unwrap();
        let events = Arc::new(RecordingEventSink::new());
        let facade = ProcessOrchestrationFacade::new(engine, events.clone());

        let instance = facade
            .start_process(&TenantId::new("acme"), "hire", Variables::new())
            .await
            .unwrap();
        assert_eq!(instance.tenant_id, TenantId::new("acme"));
        assert_eq!(events.events().len(), 1);

        let err = facade
            .start_process(&TenantId::new("beta"), "hire", Variables::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::ProcessNotFound {
                key: "hire".into(),
                tenant: TenantId::new("beta")
            }
        );
        assert_eq!(events.events().len(), 1);
    }
}
