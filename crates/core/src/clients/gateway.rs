use async_trait::async_trait;
use payout_primitives::error::ApiError;
use payout_primitives::models::entities::{Destination, PayoutRail};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What a gateway said about a payout.
///
/// `TransportError` is not a decline: the request may or may not have reached
/// the provider, so callers must never treat it as safe to resubmit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayResult {
    Success { gateway_txn_ref: Option<String> },
    Pending { gateway_txn_ref: Option<String> },
    Failed { reason_code: String, message: String },
    TransportError { cause: String },
}

impl GatewayResult {
    pub fn transport(cause: impl fmt::Display) -> Self {
        GatewayResult::TransportError {
            cause: cause.to_string(),
        }
    }

    pub fn gateway_txn_ref(&self) -> Option<&str> {
        match self {
            GatewayResult::Success { gateway_txn_ref } | GatewayResult::Pending { gateway_txn_ref } => {
                gateway_txn_ref.as_deref()
            }
            _ => None,
        }
    }
}

impl fmt::Display for GatewayResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayResult::Success { gateway_txn_ref } => {
                write!(f, "success ({})", gateway_txn_ref.as_deref().unwrap_or("-"))
            }
            GatewayResult::Pending { gateway_txn_ref } => {
                write!(f, "pending ({})", gateway_txn_ref.as_deref().unwrap_or("-"))
            }
            GatewayResult::Failed {
                reason_code,
                message,
            } => write!(f, "failed [{}]: {}", reason_code, message),
            GatewayResult::TransportError { cause } => write!(f, "transport error: {}", cause),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PayoutInstruction<'a> {
    pub idempotency_key: &'a str,
    /// Paise.
    pub amount: i64,
    pub beneficiary_name: &'a str,
    pub destination: &'a Destination,
}

#[derive(Debug, Clone)]
pub struct StatusLookup<'a> {
    pub idempotency_key: &'a str,
    pub gateway_txn_ref: Option<&'a str>,
}

/// One adapter per payout rail.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    fn rail(&self) -> PayoutRail;

    async fn submit_payout(&self, instruction: &PayoutInstruction<'_>) -> GatewayResult;

    async fn check_status(&self, lookup: &StatusLookup<'_>) -> GatewayResult;

    /// Name registered with the provider for `destination`.
    async fn resolve_account(&self, destination: &Destination) -> Result<String, ApiError>;
}

/// Rail -> client lookup table.
#[derive(Clone, Default)]
pub struct GatewayRegistry {
    clients: HashMap<PayoutRail, Arc<dyn GatewayClient>>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, client: Arc<dyn GatewayClient>) -> Self {
        self.clients.insert(client.rail(), client);
        self
    }

    pub fn for_rail(&self, rail: PayoutRail) -> Result<Arc<dyn GatewayClient>, ApiError> {
        self.clients
            .get(&rail)
            .cloned()
            .ok_or_else(|| ApiError::InvalidRequest(format!("No gateway configured for {}", rail)))
    }
}

/// A client error that refuses the payout itself. Auth, routing, conflict
/// and throttling answers say nothing about whether money moved.
pub(crate) fn is_decline(status: StatusCode) -> bool {
    status.is_client_error() && !matches!(status.as_u16(), 401 | 403 | 404 | 408 | 409 | 429)
}

/// Trims provider bodies before they land in logs or failure messages.
pub(crate) fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}
