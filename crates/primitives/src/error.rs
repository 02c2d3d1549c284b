use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::r2d2;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug)]
pub enum ApiError {
    Database(diesel::result::Error),
    DatabaseConnection(String),
    Validation(validator::ValidationErrors),
    Auth(AuthError),
    InvalidRequest(String),
    Forbidden(String),
    NotFound(String),
    InsufficientBalance { required: i64, available: i64 },
    OutOfRangeAmount(i64),
    AmbiguousChargeRule(String),
    Transport(String),
    GatewayRejected { code: String, message: String },
    InternalInconsistency(String),
    Internal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    MissingHeader,
    InvalidFormat,
    InvalidToken(String),
    InsufficientRole,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingHeader => write!(f, "Missing Authorization header"),
            AuthError::InvalidFormat => write!(f, "Malformed Authorization header"),
            AuthError::InvalidToken(msg) => write!(f, "{}", msg),
            AuthError::InsufficientRole => write!(f, "Admin privileges required"),
        }
    }
}

/// Body returned for every non-2xx response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    pub code: String,
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Database(e) => write!(f, "Database error: {}", e),
            ApiError::DatabaseConnection(e) => write!(f, "Database connection error: {}", e),
            ApiError::Validation(e) => write!(f, "Validation error: {}", e),
            ApiError::Auth(e) => write!(f, "Authentication error: {}", e),
            ApiError::InvalidRequest(e) => write!(f, "Invalid request: {}", e),
            ApiError::Forbidden(e) => write!(f, "Forbidden: {}", e),
            ApiError::NotFound(e) => write!(f, "Not found: {}", e),
            ApiError::InsufficientBalance {
                required,
                available,
            } => write!(
                f,
                "Insufficient balance: required {} minor units, available {}",
                required, available
            ),
            ApiError::OutOfRangeAmount(amount) => {
                write!(f, "Amount {} is outside every configured charge band", amount)
            }
            ApiError::AmbiguousChargeRule(e) => write!(f, "Charge rule integrity error: {}", e),
            ApiError::Transport(e) => write!(f, "Gateway unreachable: {}", e),
            ApiError::GatewayRejected { code, message } => {
                write!(f, "Gateway rejected the request ({}): {}", code, message)
            }
            ApiError::InternalInconsistency(e) => write!(f, "Internal inconsistency: {}", e),
            ApiError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Database(e) => Some(e),
            ApiError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl ApiError {
    /// Stable machine-readable code used in response bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Database(_) | ApiError::DatabaseConnection(_) => "DATABASE_ERROR",
            ApiError::Validation(_) | ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::Auth(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            ApiError::OutOfRangeAmount(_) => "OUT_OF_RANGE_AMOUNT",
            ApiError::AmbiguousChargeRule(_) => "AMBIGUOUS_CHARGE_RULE",
            ApiError::Transport(_) => "TRANSPORT_ERROR",
            ApiError::GatewayRejected { .. } => "GATEWAY_REJECTED",
            ApiError::InternalInconsistency(_) => "INTERNAL_INCONSISTENCY",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(AuthError::InsufficientRole) => StatusCode::FORBIDDEN,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
            ApiError::OutOfRangeAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Transport(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::GatewayRejected { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Database(diesel::result::Error::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Database(_)
            | ApiError::DatabaseConnection(_)
            | ApiError::AmbiguousChargeRule(_)
            | ApiError::InternalInconsistency(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<r2d2::Error> for ApiError {
    fn from(err: r2d2::Error) -> Self {
        ApiError::DatabaseConnection(err.to_string())
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(err: diesel::result::Error) -> Self {
        ApiError::Database(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<ApiError> for (StatusCode, ApiErrorResponse) {
    fn from(err: ApiError) -> Self {
        let status = err.status_code();
        let message = match &err {
            // never leak driver details to callers
            ApiError::Database(_) | ApiError::DatabaseConnection(_) => {
                "A storage error occurred".to_string()
            }
            _ => err.to_string(),
        };
        (
            status,
            ApiErrorResponse {
                code: err.code().to_string(),
                message,
            },
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body): (StatusCode, ApiErrorResponse) = self.into();
        (status, Json(body)).into_response()
    }
}
