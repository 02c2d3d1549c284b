use crate::app_state::AppState;
use payout_primitives::models::entities::audit_log::NewAuditLog;
use tracing::warn;
use uuid::Uuid;

pub struct AuditService;

impl AuditService {
    /// Best effort: a failed audit write is logged and never fails the caller.
    pub async fn log_event(
        state: &AppState,
        actor_id: Option<Uuid>,
        event_type: &str,
        target_type: Option<&str>,
        target_id: Option<&str>,
        metadata: serde_json::Value,
    ) {
        let new_log = NewAuditLog {
            id: Uuid::new_v4(),
            actor_id,
            event_type: event_type.to_string(),
            target_type: target_type.map(|s| s.to_string()),
            target_id: target_id.map(|s| s.to_string()),
            metadata,
        };

        if let Err(e) = state.ledger.append_audit(new_log).await {
            warn!(error = %e, event_type, "Failed to write audit log");
        }
    }
}
