use super::gateway::{is_decline, snippet, GatewayClient, GatewayResult, PayoutInstruction, StatusLookup};
use async_trait::async_trait;
use payout_primitives::error::ApiError;
use payout_primitives::models::app_state::UpiInfo;
use payout_primitives::models::dtos::gateway_dto::{
    UpiPayoutReply, UpiPayoutRequest, UpiVpaValidateReply, UpiVpaValidateRequest,
};
use payout_primitives::models::entities::{Destination, PayoutRail};
use payout_primitives::utility::from_minor_units;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

#[derive(Clone)]
pub struct UpiClient {
    http: Client,
    base_url: Url,
    client_id: String,
    client_secret: SecretString,
}

impl UpiClient {
    pub fn new(http: Client, info: &UpiInfo) -> Result<Self, ApiError> {
        let base_url = Url::parse(&info.upi_api_url)
            .map_err(|_| ApiError::Internal("Invalid UPI base URL".into()))?;

        Ok(Self {
            http,
            base_url,
            client_id: info.upi_client_id.clone(),
            client_secret: info.upi_client_secret.clone(),
        })
    }

    /// Maps an HTTP reply from the payout endpoint. A refusing 4xx is a
    /// decline; any other non-2xx leaves the outcome unknown.
    pub fn interpret(status: StatusCode, body: &str) -> GatewayResult {
        if !status.is_success() && !is_decline(status) {
            return GatewayResult::transport(format!("UPI gateway returned HTTP {}", status));
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
                    .error_description
                    .unwrap_or_else(|| "Rejected by UPI gateway".into()),
            };
        }

        Self::read_state(reply)
    }

    /// Status lookups only trust a 2xx that names a payout state.
    pub fn interpret_status(status: StatusCode, body: &str) -> GatewayResult {
        if !status.is_success() {
            return GatewayResult::transport(format!("UPI status lookup returned HTTP {}", status));
        }

        match Self::parse(body) {
            Ok(reply) => Self::read_state(reply),
            Err(transport) => transport,
        }
    }

    fn parse(body: &str) -> Result<UpiPayoutReply, GatewayResult> {
        serde_json::from_str(body).map_err(|e| {
            GatewayResult::transport(format!("Unparsable UPI response ({}): {}", e, snippet(body)))
        })
    }

    fn read_state(reply: UpiPayoutReply) -> GatewayResult {
        match reply.txn_status.unwrap_or_default().to_ascii_uppercase().as_str() {
            "SUCCESS" => GatewayResult::Success {
                gateway_txn_ref: reply.rrn,
            },
            "PENDING" | "DEEMED" | "INITIATED" => GatewayResult::Pending {
                gateway_txn_ref: reply.rrn,
            },
            "FAILURE" | "FAILED" | "DECLINED" => GatewayResult::Failed {
                reason_code: reply.error_code.unwrap_or_else(|| "FAILURE".into()),
                message: reply
                    .error_description
                    .unwrap_or_else(|| "Payout declined by UPI gateway".into()),
            },
            other => GatewayResult::transport(format!("Unknown UPI status '{}'", other)),
        }
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url
    }

    fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-Client-Id", &self.client_id)
            .header("X-Client-Secret", self.client_secret.expose_secret())
    }

    async fn execute(&self, request: RequestBuilder) -> Result<(StatusCode, String), GatewayResult> {
        let response = self.authorised(request).send().await.map_err(|e| {
            warn!(error = %e, "UPI gateway unreachable");
            GatewayResult::transport(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(GatewayResult::transport)?;
        Ok((status, text))
    }
}

#[async_trait]
impl GatewayClient for UpiClient {
    fn rail(&self) -> PayoutRail {
        PayoutRail::Upi
    }

    async fn submit_payout(&self, instruction: &PayoutInstruction<'_>) -> GatewayResult {
        let Destination::Vpa(vpa) = instruction.destination else {
            return GatewayResult::Failed {
                reason_code: "INVALID_DESTINATION".into(),
                message: "UPI payouts need a VPA".into(),
            };
        };

        let payload = UpiPayoutRequest {
            client_txn_id: instruction.idempotency_key,
            payee_vpa: vpa,
            payee_name: instruction.beneficiary_name,
            amount: from_minor_units(instruction.amount).to_string(),
        };

        let request = self
            .http
            .post(self.endpoint("/upi/v1/payouts"))
            .header("Idempotency-Key", instruction.idempotency_key)
            .json(&payload);

        let result = match self.execute(request).await {
            Ok((status, body)) => Self::interpret(status, &body),
            Err(transport) => transport,
        };

        info!(
            transaction_id = %instruction.idempotency_key,
            result = %result,
            "UPI payout submitted"
        );
        result
    }

    async fn check_status(&self, lookup: &StatusLookup<'_>) -> GatewayResult {
        let path = format!("/upi/v1/payouts/{}", lookup.idempotency_key);
        let request = self.http.get(self.endpoint(&path));

        match self.execute(request).await {
            Ok((status, body)) => Self::interpret_status(status, &body),
            Err(transport) => transport,
        }
    }

    async fn resolve_account(&self, destination: &Destination) -> Result<String, ApiError> {
        let Destination::Vpa(vpa) = destination else {
            return Err(ApiError::InvalidRequest("UPI can only resolve VPAs".into()));
        };

        let request = self
            .http
            .post(self.endpoint("/upi/v1/vpa/validate"))
            .json(&UpiVpaValidateRequest { vpa });

        let (status, body) = self
            .execute(request)
            .await
            .map_err(|transport| ApiError::Transport(transport.to_string()))?;

        if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
            return Err(ApiError::Transport(format!(
                "UPI VPA validation returned HTTP {}",
                status
            )));
        }

        let reply: UpiVpaValidateReply = serde_json::from_str(&body)
            .map_err(|e| ApiError::Transport(format!("Unparsable UPI validate response: {}", e)))?;

        match (status.is_success() && reply.valid, reply.payee_name) {
            (true, Some(name)) => Ok(name),
            _ => Err(ApiError::GatewayRejected {
                code: "INVALID_VPA".into(),
                message: reply
                    .error_description
                    .unwrap_or_else(|| "VPA could not be validated".into()),
            }),
        }
    }
}
