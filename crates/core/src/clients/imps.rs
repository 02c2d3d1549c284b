use super::gateway::{is_decline, snippet, GatewayClient, GatewayResult, PayoutInstruction, StatusLookup};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use payout_primitives::error::ApiError;
use payout_primitives::models::app_state::ImpsInfo;
use payout_primitives::models::dtos::gateway_dto::{
    ImpsAccountResolveReply, ImpsAccountResolveRequest, ImpsPayoutReply, ImpsPayoutRequest,
};
use payout_primitives::models::entities::{Destination, PayoutRail};
use payout_primitives::utility::from_minor_units;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::Sha256;
use tracing::{info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Bank-transfer (IMPS) payout gateway.
///
/// Every request carries the bearer secret, `X-Client-Id`, an `X-Timestamp`
/// and `X-Signature = hex(HMAC-SHA256(secret, "{timestamp}.{body}"))`.
#[derive(Clone)]
pub struct ImpsClient {
    http: Client,
    base_url: Url,
    client_id: String,
    secret_key: SecretString,
}

impl ImpsClient {
    pub fn new(http: Client, info: &ImpsInfo) -> Result<Self, ApiError> {
        let base_url = Url::parse(&info.imps_api_url)
            .map_err(|_| ApiError::Internal("Invalid IMPS base URL".into()))?;

        Ok(Self {
            http,
            base_url,
            client_id: info.imps_client_id.clone(),
            secret_key: info.imps_secret_key.clone(),
        })
    }

    pub fn sign(secret: &str, timestamp: i64, body: &str) -> Result<String, ApiError> {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| ApiError::Internal("Invalid IMPS signing key".into()))?;
        mac.update(format!("{}.{}", timestamp, body).as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Maps an HTTP reply from the payout endpoint. A refusing 4xx is a
    /// decline; any other non-2xx leaves the outcome unknown.
    pub fn interpret(status: StatusCode, body: &str) -> GatewayResult {
        if !status.is_success() && !is_decline(status) {
            return GatewayResult::transport(format!("IMPS gateway returned HTTP {}", status));
        }

        let reply = match Self::parse(body) {
            Ok(reply) => reply,
            Err(transport) => return transport,
        };

        if status.is_client_error() {
            return GatewayResult::Failed {
                reason_code: reply
                    .error_code
                    .unwrap_or_else(|| format!("HTTP_{}", status.as_u16())),
                message: reply
                    .message
                    .unwrap_or_else(|| "Rejected by IMPS gateway".into()),
            };
        }

        Self::read_state(reply)
    }

    /// Maps an HTTP reply from the status endpoint. Only a 2xx naming a
    /// payout state is trusted.
    pub fn interpret_status(status: StatusCode, body: &str) -> GatewayResult {
        if !status.is_success() {
            return GatewayResult::transport(format!("IMPS status lookup returned HTTP {}", status));
        }

        match Self::parse(body) {
            Ok(reply) => Self::read_state(reply),
            Err(transport) => transport,
        }
    }

    fn parse(body: &str) -> Result<ImpsPayoutReply, GatewayResult> {
        serde_json::from_str(body).map_err(|e| {
            GatewayResult::transport(format!(
                "Unparsable IMPS response ({}): {}",
                e,
                snippet(body)
            ))
        })
    }

    fn read_state(reply: ImpsPayoutReply) -> GatewayResult {
        let state = reply.status.unwrap_or_default().to_ascii_uppercase();
        match state.as_str() {
            "SUCCESS" | "COMPLETED" => GatewayResult::Success {
                gateway_txn_ref: reply.transaction_no,
            },
            "PENDING" | "PROCESSING" | "ACCEPTED" => GatewayResult::Pending {
                gateway_txn_ref: reply.transaction_no,
            },
            "FAILED" | "FAILURE" | "REJECTED" => GatewayResult::Failed {
                reason_code: reply.error_code.unwrap_or_else(|| "FAILED".into()),
                message: reply
                    .message
                    .unwrap_or_else(|| "Payout failed at IMPS gateway".into()),
            },
            other => GatewayResult::transport(format!("Unknown IMPS status '{}'", other)),
        }
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url
    }

    /// Sends a signed request. `Err` carries the transport failure.
    async fn send<T: Serialize>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&T>,
        idempotency_key: Option<&str>,
    ) -> Result<(StatusCode, String), GatewayResult> {
        let body = match payload {
            Some(p) => serde_json::to_string(p).map_err(GatewayResult::transport)?,
            None => String::new(),
        };

        let timestamp = Utc::now().timestamp();
        let signature = Self::sign(self.secret_key.expose_secret(), timestamp, &body)
            .map_err(GatewayResult::transport)?;

        let mut request = self
            .http
            .request(method, self.endpoint(path))
            .bearer_auth(self.secret_key.expose_secret())
            .header("X-Client-Id", &self.client_id)
            .header("X-Timestamp", timestamp.to_string())
            .header("X-Signature", signature);

        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        if payload.is_some() {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, path, "IMPS gateway unreachable");
            GatewayResult::transport(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(GatewayResult::transport)?;

        Ok((status, text))
    }
}

#[async_trait]
impl GatewayClient for ImpsClient {
    fn rail(&self) -> PayoutRail {
        PayoutRail::Imps
    }

    async fn submit_payout(&self, instruction: &PayoutInstruction<'_>) -> GatewayResult {
        let Destination::BankAccount {
            account_number,
            ifsc,
        } = instruction.destination
        else {
            return GatewayResult::Failed {
                reason_code: "INVALID_DESTINATION".into(),
                message: "IMPS payouts need an account number and IFSC".into(),
            };
        };

        let payload = ImpsPayoutRequest {
            client_reference: instruction.idempotency_key,
            amount: from_minor_units(instruction.amount).to_string(),
            beneficiary_name: instruction.beneficiary_name,
            account_number,
            ifsc,
            mode: "IMPS",
        };

        let result = match self
            .send(
                Method::POST,
                "/v1/payouts",
                Some(&payload),
                Some(instruction.idempotency_key),
            )
            .await
        {
            Ok((status, body)) => Self::interpret(status, &body),
            Err(transport) => transport,
        };

        info!(
            transaction_id = %instruction.idempotency_key,
            result = %result,
            "IMPS payout submitted"
        );
        result
    }

    async fn check_status(&self, lookup: &StatusLookup<'_>) -> GatewayResult {
        let path = format!("/v1/payouts/{}", lookup.idempotency_key);

        match self
            .send::<()>(Method::GET, &path, None, Some(lookup.idempotency_key))
            .await
        {
            Ok((status, body)) => Self::interpret_status(status, &body),
            Err(transport) => transport,
        }
    }

    async fn resolve_account(&self, destination: &Destination) -> Result<String, ApiError> {
        let Destination::BankAccount {
            account_number,
            ifsc,
        } = destination
        else {
            return Err(ApiError::InvalidRequest(
                "IMPS can only resolve bank accounts".into(),
            ));
        };

        let payload = ImpsAccountResolveRequest {
            account_number,
            ifsc,
        };

        let (status, body) = self
            .send(Method::POST, "/v1/accounts/resolve", Some(&payload), None)
            .await
            .map_err(|transport| ApiError::Transport(transport.to_string()))?;

        if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
            return Err(ApiError::Transport(format!(
                "IMPS account resolution returned HTTP {}",
                status
            )));
        }

        let reply: ImpsAccountResolveReply = serde_json::from_str(&body).map_err(|e| {
            ApiError::Transport(format!("Unparsable IMPS resolve response: {}", e))
        })?;

        let resolved = status.is_success()
            && reply
                .status
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("SUCCESS"));

        match (resolved, reply.account_holder_name) {
            (true, Some(name)) => Ok(name),
            _ => Err(ApiError::GatewayRejected {
                code: reply.error_code.unwrap_or_else(|| "ACCOUNT_NOT_FOUND".into()),
                message: reply
                    .message
                    .unwrap_or_else(|| "Account could not be resolved".into()),
            }),
        }
    }
}
