use serde::{Deserialize, Serialize};

/// The caller on whose behalf a request runs.
///
/// Identity is resolved outside this crate (OAuth roles, session, ...); groups are
/// the caller's roles and are matched against task candidate groups as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    #[serde(default)]
    pub groups: Vec<String>,
    /// Administrative callers may act on any task of their tenant.
    #[serde(default)]
    pub admin: bool,
}

impl Principal {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            groups: Vec::new(),
            admin: false,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            admin: true,
            ..Self::user(user_id)
        }
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }
}
