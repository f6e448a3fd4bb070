//! uplog-core
//!
//! ログをいつアップロードするかを決める policy と、それを回す driver。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（StorageStatus, Decision, LogRecord, BatchId, events, errors）
//! - **ports**: 抽象化レイヤー（UploadDecisionPolicy, Clock, LogStorage, LogUploader, EventSink）
//! - **policy**: 判定の実装（Periodic, CountThreshold, VolumeThreshold, AnyOf）
//! - **config**: serde で読める policy 設定
//! - **app**: アップロードループ（DriverBuilder, UploadDriver）
//! - **impls**: 実装（InMemoryLogStorage, TracingEventSink など）

pub mod domain;
pub mod ports;
pub mod policy;
pub mod config;
pub mod app;
pub mod impls;

pub use app::{DriverBuilder, TickOutcome, UploadDriver};
pub use config::{Interval, PolicyConfig, TimeUnit};
pub use domain::{Decision, PolicyError, StorageStatus};
pub use ports::UploadDecisionPolicy;
