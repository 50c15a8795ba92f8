//! IdGenerator port - ID 生成の抽象化
//!
//! 外部エンジンは自前で ID を払い出しますが、InMemoryEngine は
//! この trait を通して ID を作ります。
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース

use crate::domain::ids::{DeploymentId, ProcessInstanceId, TaskId};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator はエンジン側の ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
pub trait IdGenerator: Send + Sync {
    fn generate_task_id(&self) -> TaskId;

    fn generate_process_instance_id(&self) -> ProcessInstanceId;

    fn generate_deployment_id(&self) -> DeploymentId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// ULID は時刻順にソートできるので、`id` での並び替えが作成順になります。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_task_id(&self) -> TaskId {
        TaskId::from_ulid(self.next_ulid())
    }

    fn generate_process_instance_id(&self) -> ProcessInstanceId {
        ProcessInstanceId::from_ulid(self.next_ulid())
    }

    fn generate_deployment_id(&self) -> DeploymentId {
        DeploymentId::from_ulid(self.next_ulid())
    }
}
