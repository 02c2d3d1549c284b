use eyre::eyre;
use eyre::Report;
use secrecy::SecretString;
use std::env;

/// Bank-transfer (IMPS) provider credentials. The secret key doubles as the
/// HMAC key for request signatures.
#[derive(Debug, Clone)]
pub struct ImpsInfo {
    pub imps_api_url: String,
    pub imps_client_id: String,
    pub imps_secret_key: SecretString,
}

impl ImpsInfo {
    pub fn new() -> Result<Self, Report> {
        Ok(Self {
            imps_api_url: env::var("IMPS_API_URL")
                .unwrap_or_else(|_| "https://api.imps-gateway.in".into()),

            imps_client_id: env::var("IMPS_CLIENT_ID")
                .map_err(|_| eyre!("IMPS_CLIENT_ID must be set"))?,

            imps_secret_key: SecretString::new(
                env::var("IMPS_SECRET_KEY")
                    .map_err(|_| eyre!("IMPS_SECRET_KEY must be set"))?
                    .into(),
            ),
        })
    }
}
