//! App - アプリケーション層
//!
//! ports を組み合わせてアップロードループを組み立てます。
//!
//! # 主要コンポーネント
//! - **DriverBuilder**: 構築とワイヤリング（起動時検証）
//! - **UploadDriver**: tick ごとに policy に問い合わせ、batch を転送
//! - **DriverHandle**: バックグラウンド実行の停止
//! - **DriverStats**: カウンタのスナップショット

pub mod builder;
pub mod driver;
pub mod status;

pub use self::builder::{BuildError, DriverBuilder};
pub use self::driver::{DriverHandle, FlushSummary, TickOutcome, UploadDriver};
pub use self::status::DriverStats;
