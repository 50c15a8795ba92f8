//! Query module: predicate tree, query spec, visibility builders and paging.

pub mod builder;
mod deployments;
mod page;
mod predicate;
mod spec;

pub use builder::TaskFilter;
pub use deployments::{DeploymentQuery, DeploymentSortKey};
pub use page::{Direction, Page, PageRequest, Pageable, SortParam};
pub use predicate::Predicate;
pub use spec::{SortKey, TaskOrder, TaskQuerySpec};
