//! TenantRegistry - 設定されたテナント一覧
//!
//! 構築後は読み取り専用（ロック不要）。

use crate::config::{ConfigError, TaskgateConfig};
use crate::domain::TenantId;

/// Configured tenants, in configuration order without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantRegistry {
    tenants: Option<Vec<TenantId>>,
}

impl TenantRegistry {
    /// # Errors
    /// `ConfigError::BlankTenant` if any configured id is blank.
    pub fn from_config(config: &TaskgateConfig) -> Result<Self, ConfigError> {
        let Some(raw) = &config.tenants else {
            return Ok(Self { tenants: None });
        };

        let mut tenants: Vec<TenantId> = Vec::with_capacity(raw.len());
        for (index, id) in raw.iter().enumerate() {
            let id = id.trim();
            if id.is_empty() {
                return Err(ConfigError::BlankTenant(index));
            }
            let tenant = TenantId::new(id);
            // first occurrence wins
            if !tenants.contains(&tenant) {
                tenants.push(tenant);
            }
        }
        Ok(Self {
            tenants: Some(tenants),
        })
    }

    pub fn new<I, S>(tenants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TenantId>,
    {
        let mut list: Vec<TenantId> = Vec::new();
        for tenant in tenants.into_iter().map(Into::into) {
            if !list.contains(&tenant) {
                list.push(tenant);
            }
        }
        Self { tenants: Some(list) }
    }

    /// # Errors
    /// - `ConfigError::Missing`: no tenant list configured
    /// - `ConfigError::NoTenants`: the list is empty
    pub fn list_tenants(&self) -> Result<&[TenantId], ConfigError> {
        match &self.tenants {
            None => Err(ConfigError::Missing),
            Some(tenants) if tenants.is_empty() => Err(ConfigError::NoTenants),
            Some(tenants) => Ok(tenants),
        }
    }

    pub fn contains(&self, tenant: &TenantId) -> bool {
        self.tenants
            .as_ref()
            .is_some_and(|tenants| tenants.contains(tenant))
    }
}
