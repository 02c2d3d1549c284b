use crate::app_state::AppState;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{Duration, Utc};
use http::HeaderMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use payout_primitives::error::{ApiError, AuthError};
use payout_primitives::models::app_state::JWTInfo;
use payout_primitives::models::entities::VerificationStatus;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

/// Identity and authorisation context supplied by the session collaborator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub user_type: VerificationStatus,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
    pub jti: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, ApiError> {
        Uuid::parse_str(&self.sub).map_err(|e| {
            error!("Invalid user ID in claims: {}", e);
            ApiError::Auth(AuthError::InvalidToken("Invalid user ID".to_string()))
        })
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == VerificationStatus::Admin
    }
}

pub struct SecurityConfig;

impl SecurityConfig {
    /// Issues a token. Only tests and the seeder mint tokens; production
    /// tokens come from the session service.
    pub fn create_token(
        jwt: &JWTInfo,
        user_id: Uuid,
        user_type: VerificationStatus,
        ttl: Duration,
    ) -> Result<String, ApiError> {
        let now = Utc::now();

        let claims = Claims {
            sub: user_id.to_string(),
            user_type,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: jwt.jwt_issuer.clone(),
            aud: jwt.jwt_audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());

        encode(
            &header,
            &claims,
            &EncodingKey::from_secret(jwt.jwt_secret.expose_secret().as_bytes()),
        )
        .map_err(|e| {
            error!("JWT encoding error: {}", e);
            ApiError::Internal("Token creation failed".into())
        })
    }

    pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
        let auth_header = headers
            .get("Authorization")
            .ok_or(AuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidFormat)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidFormat)?
            .trim();

        if token.is_empty() {
            return Err(AuthError::InvalidFormat);
        }

        Ok(token.to_string())
    }

    pub fn verify_token(jwt: &JWTInfo, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[jwt.jwt_issuer.as_str()]);
        validation.set_audience(&[jwt.jwt_audience.as_str()]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(jwt.jwt_secret.expose_secret().as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken("Invalid or expired token".into()))
    }

    pub async fn auth_middleware(
        State(state): State<Arc<AppState>>,
        mut req: Request<axum::body::Body>,
        next: Next,
    ) -> Result<Response, Response> {
        let token = Self::extract_bearer_token(req.headers())
            .map_err(|e| ApiError::from(e).into_response())?;

        let claims = Self::verify_token(&state.config.jwt_details, &token)
            .map_err(|e| ApiError::from(e).into_response())?;

        req.extensions_mut().insert(claims);
        Ok(next.run(req).await)
    }

    /// Runs after `auth_middleware`; rejects anyone without the ADMIN user type.
    pub async fn admin_middleware(
        req: Request<axum::body::Body>,
        next: Next,
    ) -> Result<Response, Response> {
        let claims = req
            .extensions()
            .get::<Claims>()
            .ok_or_else(|| ApiError::from(AuthError::MissingHeader).into_response())?;

        if !claims.is_admin() {
            warn!(sub = %claims.sub, "Non-admin attempted an admin route");
            return Err(ApiError::from(AuthError::InsufficientRole).into_response());
        }

        Ok(next.run(req).await)
    }
}
