//! Impls - 実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryEngine**: BPMN を解釈しないインメモリのプロセスエンジン
//!
//! # 本番用実装
//! 実エンジン（REST / 組み込み）へのアダプタは別クレートに配置します。

pub mod inmem_engine;

pub use self::inmem_engine::{InMemoryEngine, UserTaskTemplate};
