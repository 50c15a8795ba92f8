//! taskgate-core
//!
//! Tenant-aware façade over an external BPMN process engine.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task, principal, deployment, process, errors, events）
//! - **query**: タスク検索の述語・ソート・ページング（純粋関数）
//! - **ports**: 抽象化レイヤー（ProcessEngine, ArtifactSource, EventSink, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（registry, importer, tasks, processes, gateway, builder）
//! - **impls**: 実装（InMemoryEngine）
//! - **config**: `taskgate.toml`

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;
pub mod query;
