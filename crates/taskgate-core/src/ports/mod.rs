//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」を定義します。
//! 外部プロセスエンジン・ファイルシステム・監査ログへの依存はここに閉じ込め、
//! アプリケーション層（`app`）は trait だけを見ます。

pub mod artifact_source;
pub mod clock;
pub mod engine;
pub mod event_sink;
pub mod id_generator;

// 主要な trait を再エクスポート
pub use self::artifact_source::{
    ArtifactSource, ArtifactSourceError, FsArtifactSource, InMemoryArtifactSource,
};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::engine::ProcessEngine;
pub use self::event_sink::{EventSink, RecordingEventSink, TracingEventSink};
pub use self::id_generator::{IdGenerator, UlidGenerator};
