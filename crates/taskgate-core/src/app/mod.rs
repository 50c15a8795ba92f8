//! App - アプリケーション層
//!
//! ports を組み合わせてテナント対応のファサードを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: 構築とワイヤリング
//! - **TenantRegistry**: 設定されたテナント一覧
//! - **DeploymentImporter**: 起動時のプロセス定義インポート
//! - **TaskAuthorizationEngine**: タスク可視性と claim/unclaim/complete
//! - **ProcessOrchestrationFacade**: プロセス開始
//! - **DeploymentService**: デプロイ一覧・アップロード
//! - **TaskRequestGateway**: 管理者用・セルフサービスの入口

pub mod builder;
pub mod deployments;
pub mod gateway;
pub mod importer;
pub mod processes;
pub mod registry;
pub mod tasks;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::deployments::DeploymentService;
pub use self::gateway::TaskRequestGateway;
pub use self::importer::{DeploymentImporter, ImportReport, UnitOutcome};
pub use self::processes::ProcessOrchestrationFacade;
pub use self::registry::TenantRegistry;
pub use self::tasks::TaskAuthorizationEngine;
