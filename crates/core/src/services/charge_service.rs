use payout_primitives::error::ApiError;
use payout_primitives::models::entities::charge_rule::ChargeRule;

/// Maps a payout amount to its flat fee using one snapshot of the band table.
///
/// Pure: no I/O, and the same amount always yields the same charge for the
/// same snapshot. Bands that overlap or leave holes are reported, never
/// papered over by picking one.
#[derive(Debug, Clone)]
pub struct ChargeResolver {
    rules: Vec<ChargeRule>,
}

impl ChargeResolver {
    pub fn new(mut rules: Vec<ChargeRule>) -> Self {
        rules.sort_by_key(|r| (r.min_amount, r.max_amount));
        Self { rules }
    }

    pub fn rules(&self) -> &[ChargeRule] {
        &self.rules
    }

    /// `[lowest min, highest max]` across all bands.
    pub fn envelope(&self) -> Option<(i64, i64)> {
        let min = self.rules.iter().map(|r| r.min_amount).min()?;
        let max = self.rules.iter().map(|r| r.max_amount).max()?;
        Some((min, max))
    }

    /// Checks the band table is contiguous and non-overlapping.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.rules.is_empty() {
            return Err(ApiError::AmbiguousChargeRule(
                "No active charge rules configured".into(),
            ));
        }

        for rule in &self.rules {
            if rule.charge < 0 {
                return Err(ApiError::AmbiguousChargeRule(format!(
                    "Rule {} has a negative charge",
                    rule.id
                )));
            }
            if rule.min_amount > rule.max_amount {
                return Err(ApiError::AmbiguousChargeRule(format!(
                    "Rule {} has min {} above max {}",
                    rule.id, rule.min_amount, rule.max_amount
                )));
            }
        }

        for pair in self.rules.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);

            if next.min_amount <= prev.max_amount {
                return Err(ApiError::AmbiguousChargeRule(format!(
                    "Bands [{}, {}] and [{}, {}] overlap",
                    prev.min_amount, prev.max_amount, next.min_amount, next.max_amount
                )));
            }
            if next.min_amount != prev.max_amount + 1 {
                return Err(ApiError::AmbiguousChargeRule(format!(
                    "Gap between {} and {}",
                    prev.max_amount, next.min_amount
                )));
            }
        }

        Ok(())
    }

    pub fn resolve(&self, amount: i64) -> Result<i64, ApiError> {
        if amount <= 0 {
            return Err(ApiError::InvalidRequest(
                "Amount must be greater than zero".into(),
            ));
        }

        let (min, max) = self.envelope().ok_or_else(|| {
            ApiError::AmbiguousChargeRule("No active charge rules configured".into())
        })?;

        if amount < min || amount > max {
            return Err(ApiError::OutOfRangeAmount(amount));
        }

        let mut matching = self.rules.iter().filter(|r| r.contains(amount));

        match (matching.next(), matching.next()) {
            (Some(rule), None) => Ok(rule.charge),
            (None, _) => Err(ApiError::AmbiguousChargeRule(format!(
                "No band covers amount {}",
                amount
            ))),
            (Some(_), Some(_)) => Err(ApiError::AmbiguousChargeRule(format!(
                "More than one band covers amount {}",
                amount
            ))),
        }
    }
}
