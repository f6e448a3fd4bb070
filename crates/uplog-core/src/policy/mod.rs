//! Policy - UploadDecisionPolicy の実装
//!
//! - **PeriodicPolicy**: 前回のアップロードから一定時間経ったら Upload
//! - **CountThresholdPolicy**: レコード数がしきい値に達したら Upload
//! - **VolumeThresholdPolicy**: バイト数がしきい値に達したら Upload
//! - **AnyOfPolicy**: どれか 1 つでも Upload なら Upload

pub mod periodic;
pub mod count_threshold;
pub mod volume_threshold;
pub mod any_of;

pub use self::periodic::{ArmingRule, PeriodicPolicy};
pub use self::count_threshold::CountThresholdPolicy;
pub use self::volume_threshold::VolumeThresholdPolicy;
pub use self::any_of::AnyOfPolicy;
