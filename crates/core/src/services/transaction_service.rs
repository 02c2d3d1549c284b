use crate::app_state::AppState;
use crate::security::Claims;
use payout_primitives::error::ApiError;
use payout_primitives::models::dtos::transaction_dto::{TransactionResponse, TransactionsResponse};

pub const MAX_RECENT_TRANSACTIONS: i64 = 50;

pub struct TransactionService;

impl TransactionService {
    /// Lookup by idempotency key. Callers only see their own payouts; admins see all.
    pub async fn get_transaction_status(
        state: &AppState,
        claims: &Claims,
        transaction_id: &str,
    ) -> Result<TransactionResponse, ApiError> {
        let user_id = claims.user_id()?;

        let tx = state
            .ledger
            .find_transaction_by_key(transaction_id)
            .await?
            .filter(|tx| tx.user_id == user_id || claims.is_admin())
            .ok_or_else(|| ApiError::NotFound("Transaction not found".into()))?;

        Ok(tx.into())
    }

    pub async fn recent_transactions(
        state: &AppState,
        claims: &Claims,
        limit: Option<i64>,
    ) -> Result<TransactionsResponse, ApiError> {
        let user_id = claims.user_id()?;
        let limit = limit
            .unwrap_or(MAX_RECENT_TRANSACTIONS)
            .clamp(1, MAX_RECENT_TRANSACTIONS);

        let transactions = state
            .ledger
            .recent_transactions(user_id, limit)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(TransactionsResponse { transactions })
    }
}
