//! Decision model: what the driver should do after a status check.

use serde::{Deserialize, Serialize};

/// Result of one policy evaluation.
///
/// Produced fresh on every call and never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Leave the buffer alone.
    #[default]
    Noop,

    /// Flush the buffer now.
    Upload,
}

impl Decision {
    pub fn is_upload(self) -> bool {
        matches!(self, Decision::Upload)
    }
}
