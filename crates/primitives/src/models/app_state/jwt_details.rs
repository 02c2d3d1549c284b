use eyre::{eyre, Report};
use secrecy::{ExposeSecret, SecretString};
use std::env;

#[derive(Clone, Debug)]
pub struct JWTInfo {
    pub jwt_secret: SecretString,
    pub jwt_issuer: String,
    pub jwt_audience: String,
}

impl JWTInfo {
    pub fn new() -> Result<JWTInfo, Report> {
        let jwt_secret = SecretString::new(
            env::var("JWT_SECRET")
                .map_err(|_| eyre!("JWT_SECRET must be set in environment variables"))?
                .into(),
        );

        if jwt_secret.expose_secret().len() < 32 {
            return Err(eyre!("JWT_SECRET must be at least 32 characters long"));
        }

        Ok(Self {
            jwt_secret,
            jwt_issuer: env::var("ISSUER")
                .map_err(|e| eyre!("Issuer environment variable not set: {}", e))?,
            jwt_audience: env::var("AUDIENCE")
                .map_err(|e| eyre!("Audience environment variable not set: {}", e))?,
        })
    }
}
