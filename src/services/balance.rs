//! Balance service — read and apply signed deltas to a user's balance.
//!
//! The update is a single conditional statement: a delta that would take the
//! balance negative matches no row and leaves the stored value untouched, so
//! two racing debits cannot jointly overdraw the account.

use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    #[error("user not found")]
    NotFound,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Current balance for a user.
pub async fn get_balance(pool: &PgPool, user_id: Uuid) -> Result<i64, BalanceError> {
    let row = sqlx::query("SELECT balance FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(BalanceError::NotFound)?;
    Ok(row.get("balance"))
}

/// Apply a signed delta. Returns the resulting balance.
///
/// # Errors
///
/// `InsufficientFunds` if the resulting balance would be negative; the
/// stored balance is unchanged in that case.
pub async fn update_balance(pool: &PgPool, user_id: Uuid, amount: i64) -> Result<i64, BalanceError> {
    let row = sqlx::query(
        "UPDATE users SET balance = balance + $2, updated_at = now()
         WHERE id = $1 AND balance + $2 >= 0
         RETURNING balance",
    )
    .bind(user_id)
    .bind(amount)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(r) => Ok(r.get("balance")),
        // No row matched: either the user is unknown or the guard blocked it.
        None => {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
            if exists {
                Err(BalanceError::InsufficientFunds)
            } else {
                Err(BalanceError::NotFound)
            }
        }
    }
}
