use chrono::Utc;
use diesel::prelude::*;
use payout_primitives::error::ApiError;
use payout_primitives::models::entities::user::{NewUser, User};
use payout_primitives::schema::users;
use uuid::Uuid;

pub struct UserRepository;

impl UserRepository {
    pub fn find_by_id(conn: &mut PgConnection, user_id: Uuid) -> Result<Option<User>, ApiError> {
        users::table
            .find(user_id)
            .first::<User>(conn)
            .optional()
            .map_err(ApiError::Database)
    }

    pub fn find_by_id_for_update(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Option<User>, ApiError> {
        users::table
            .find(user_id)
            .for_update()
            .first::<User>(conn)
            .optional()
            .map_err(ApiError::Database)
    }

    pub fn find_by_email(conn: &mut PgConnection, email: &str) -> Result<Option<User>, ApiError> {
        users::table
            .filter(users::email.eq(email))
            .first::<User>(conn)
            .optional()
            .map_err(ApiError::Database)
    }

    pub fn create(conn: &mut PgConnection, new_user: NewUser) -> Result<User, ApiError> {
        diesel::insert_into(users::table)
            .values(&new_user)
            .get_result::<User>(conn)
            .map_err(|e| {
                if matches!(
                    e,
                    diesel::result::Error::DatabaseError(
                        diesel::result::DatabaseErrorKind::UniqueViolation,
                        _
                    )
                ) {
                    ApiError::InvalidRequest("Email already registered".into())
                } else {
                    ApiError::Database(e)
                }
            })
    }

    /// Decrements the balance only when the unheld part covers `amount`.
    /// Returns the new balance, or `None` when the user is missing or short.
    pub fn debit_if_sufficient(
        conn: &mut PgConnection,
        user_id: Uuid,
        amount: i64,
    ) -> Result<Option<i64>, ApiError> {
        diesel::update(
            users::table
                .filter(users::id.eq(user_id))
                .filter(users::balance.ge(users::reserved + amount)),
        )
        .set((
            users::balance.eq(users::balance - amount),
            users::updated_at.eq(Utc::now()),
        ))
        .returning(users::balance)
        .get_result::<i64>(conn)
        .optional()
        .map_err(ApiError::Database)
    }

    /// Places a hold of `amount` when the unheld balance covers it.
    /// `None` when the user is missing or short.
    pub fn reserve(
        conn: &mut PgConnection,
        user_id: Uuid,
        amount: i64,
    ) -> Result<Option<User>, ApiError> {
        diesel::update(
            users::table
                .filter(users::id.eq(user_id))
                .filter(users::balance.ge(users::reserved + amount)),
        )
        .set((
            users::reserved.eq(users::reserved + amount),
            users::updated_at.eq(Utc::now()),
        ))
        .get_result::<User>(conn)
        .optional()
        .map_err(ApiError::Database)
    }

    /// Drops a hold without touching the balance.
    pub fn release_hold(conn: &mut PgConnection, user_id: Uuid, amount: i64) -> Result<bool, ApiError> {
        let affected = diesel::update(
            users::table
                .filter(users::id.eq(user_id))
                .filter(users::reserved.ge(amount)),
        )
        .set((
            users::reserved.eq(users::reserved - amount),
            users::updated_at.eq(Utc::now()),
        ))
        .execute(conn)
        .map_err(ApiError::Database)?;

        Ok(affected == 1)
    }

    /// Turns a hold into a debit. Returns the new balance, or `None` when the
    /// hold or the balance behind it is gone.
    pub fn settle_hold(
        conn: &mut PgConnection,
        user_id: Uuid,
        amount: i64,
    ) -> Result<Option<i64>, ApiError> {
        diesel::update(
            users::table
                .filter(users::id.eq(user_id))
                .filter(users::reserved.ge(amount))
                .filter(users::balance.ge(amount)),
        )
        .set((
            users::balance.eq(users::balance - amount),
            users::reserved.eq(users::reserved - amount),
            users::updated_at.eq(Utc::now()),
        ))
        .returning(users::balance)
        .get_result::<i64>(conn)
        .optional()
        .map_err(ApiError::Database)
    }

    /// Increments the balance and returns the new value.
    pub fn credit(conn: &mut PgConnection, user_id: Uuid, amount: i64) -> Result<i64, ApiError> {
        diesel::update(users::table.filter(users::id.eq(user_id)))
            .set((
                users::balance.eq(users::balance + amount),
                users::updated_at.eq(Utc::now()),
            ))
            .returning(users::balance)
            .get_result::<i64>(conn)
            .optional()
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))
    }

    /// Maps a failed conditional debit to the error the caller should see.
    pub fn shortfall(conn: &mut PgConnection, user_id: Uuid, required: i64) -> ApiError {
        match Self::find_by_id(conn, user_id) {
            Ok(Some(user)) => ApiError::InsufficientBalance {
                required,
                available: user.available(),
            },
            Ok(None) => ApiError::NotFound("User not found".into()),
            Err(e) => e,
        }
    }
}
