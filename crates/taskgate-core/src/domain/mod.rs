//! Domain model (IDs, tasks, principals, deployments, process instances, errors, events).

pub mod deployment;
pub mod errors;
pub mod events;
pub mod ids;
pub mod principal;
pub mod process;
pub mod task;

pub use self::deployment::{
    ArtifactGroup, ArtifactKind, Deployment, DeploymentArtifact, DeploymentUnit, definition_key_of,
};
pub use self::errors::EngineError;
pub use self::events::DomainEvent;
pub use self::ids::{DeploymentId, Id, IdMarker, ProcessInstanceId, TaskId, TenantId};
pub use self::principal::Principal;
pub use self::process::{ProcessInstance, Variables};
pub use self::task::{NullAssignee, Task, TaskState};
