use crate::error::ApiError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use validator::ValidationError;

const MINOR_UNIT_SCALE: u32 = 2;
const MIN_KEY_LEN: usize = 8;
const MAX_KEY_LEN: usize = 64;

/// Converts a rupee amount into paise. Rejects more than two fractional digits
/// and values that do not fit in an `i64`.
pub fn to_minor_units(amount: Decimal) -> Result<i64, ApiError> {
    let normalized = amount.normalize();

    if normalized.scale() > MINOR_UNIT_SCALE {
        return Err(ApiError::InvalidRequest(format!(
            "Amount {} has more than {} decimal places",
            amount, MINOR_UNIT_SCALE
        )));
    }

    (normalized * Decimal::ONE_HUNDRED)
        .to_i64()
        .ok_or_else(|| ApiError::InvalidRequest(format!("Amount {} is out of range", amount)))
}

pub fn from_minor_units(amount: i64) -> Decimal {
    Decimal::new(amount, MINOR_UNIT_SCALE)
}

/// Idempotency keys travel to every gateway, so keep them short and header-safe.
pub fn validate_idempotency_key(key: &str) -> Result<(), ValidationError> {
    let len = key.len();

    if !(MIN_KEY_LEN..=MAX_KEY_LEN).contains(&len) {
        let mut err = ValidationError::new("idempotency_key_length");
        err.add_param("min_length".into(), &MIN_KEY_LEN);
        err.add_param("max_length".into(), &MAX_KEY_LEN);
        return Err(err);
    }

    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::new("idempotency_key_charset"));
    }

    Ok(())
}
