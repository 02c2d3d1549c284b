use eyre::eyre;
use eyre::Report;
use secrecy::SecretString;
use std::env;

#[derive(Debug, Clone)]
pub struct UpiInfo {
    pub upi_api_url: String,
    pub upi_client_id: String,
    pub upi_client_secret: SecretString,
}

impl UpiInfo {
    pub fn new() -> Result<Self, Report> {
        Ok(Self {
            upi_api_url: env::var("UPI_API_URL")
                .unwrap_or_else(|_| "https://api.upi-gateway.in".into()),

            upi_client_id: env::var("UPI_CLIENT_ID")
                .map_err(|_| eyre!("UPI_CLIENT_ID must be set"))?,

            upi_client_secret: SecretString::new(
                env::var("UPI_CLIENT_SECRET")
                    .map_err(|_| eyre!("UPI_CLIENT_SECRET must be set"))?
                    .into(),
            ),
        })
    }
}
