use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result of one reconciliation pass. `skipped` means another holder owned the lock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReconciliationSummary {
    pub processed: usize,
    pub completed: usize,
    pub failed: usize,
    pub still_pending: usize,
    pub errored: usize,
    pub skipped: bool,
}

impl ReconciliationSummary {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}
