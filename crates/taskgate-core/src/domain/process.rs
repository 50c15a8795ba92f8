//! Process instances and the variables passed to the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ids::{ProcessInstanceId, TenantId};

/// Business payload forwarded to the engine on start/complete.
///
/// The core never interprets these values.
pub type Variables = BTreeMap<String, serde_json::Value>;

/// Handle returned by the engine after instantiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInstance {
    pub id: ProcessInstanceId,
    /// Versioned definition id, e.g. `hireProcess:1:deploy-...`.
    pub definition_id: String,
    pub definition_key: String,
    pub tenant_id: TenantId,
}
