//! LogUploader port - 転送
//!
//! 実際のネットワーク転送はこのクレートの範囲外です。

use async_trait::async_trait;

use crate::domain::{LogBatch, UploadError};

#[async_trait]
pub trait LogUploader: Send + Sync {
    async fn upload(&self, batch: &LogBatch) -> Result<(), UploadError>;
}
