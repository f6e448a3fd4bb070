//! Errors - エラー型
//!
//! - PolicyError: 設定時に検出されるエラー（evaluate は失敗しない）
//! - UploadError: 転送側のエラー（driver が扱い、policy には見えない）

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl PolicyError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        PolicyError::InvalidConfiguration(message.into())
    }
}

/// Failure reported by a `LogUploader`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("transport failed: {0}")]
    Transport(String),

    #[error("upload rejected: {0}")]
    Rejected(String),

    #[error("upload timed out after {0:?}")]
    Timeout(std::time::Duration),
}
