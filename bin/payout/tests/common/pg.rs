use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use payout::utility::db_pool::run_migrations;
use payout_core::app_state::DbPool;
use payout_core::ledger::PgLedgerStore;
use payout_core::repositories::beneficiary_repository::BeneficiaryRepository;
use payout_core::repositories::user_repository::UserRepository;
use payout_primitives::models::entities::{
    Beneficiary, NewBeneficiary, NewTransaction, NewUser, PayoutRail, TransactionStatus, User,
    VerificationStatus,
};
use uuid::Uuid;

pub struct PgContext {
    pub store: PgLedgerStore,
    pub pool: DbPool,
}

/// Postgres ledger over `TEST_DATABASE_URL`, migrated and emptied. `None`
/// when no test database is configured.
pub fn pg_ledger() -> Option<PgContext> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping Postgres ledger test");
        return None;
    };

    let pool = Pool::builder()
        .max_size(8)
        .build(ConnectionManager::<PgConnection>::new(database_url))
        .expect("test database pool");

    run_migrations(&pool).expect("migrations");

    let mut conn = pool.get().expect("test connection");
    diesel::sql_query(
        "TRUNCATE audit_logs, balance_adjustments, balance_requests, transactions, \
         beneficiaries, charge_rules, cron_locks, users CASCADE",
    )
    .execute(&mut conn)
    .expect("truncate");

    Some(PgContext {
        store: PgLedgerStore::new(pool.clone()),
        pool,
    })
}

pub fn seed_account(pool: &DbPool, balance: i64) -> (User, Beneficiary) {
    let mut conn = pool.get().expect("test connection");
    let id = Uuid::new_v4();
    let email = format!("pg{}@example.com", id.simple());

    let user = UserRepository::create(
        &mut conn,
        NewUser {
            id,
            name: "Asha Rao",
            email: &email,
            balance,
            verification_status: VerificationStatus::Verified,
            imps_enabled: true,
            upi_enabled: true,
        },
    )
    .expect("seed user");

    let beneficiary = BeneficiaryRepository::create(
        &mut conn,
        NewBeneficiary {
            id: Uuid::new_v4(),
            user_id: user.id,
            name: "Ravi Kumar",
            account_number: Some("50100012345678"),
            ifsc: Some("HDFC0001234"),
            vpa: None,
            is_verified: true,
        },
    )
    .expect("seed beneficiary");

    (user, beneficiary)
}

/// Overwrites balance and holds directly, bypassing the ledger.
pub fn force_balance(pool: &DbPool, user_id: Uuid, balance: i64, reserved: i64) {
    use payout_primitives::schema::users;

    let mut conn = pool.get().expect("test connection");
    diesel::update(users::table.find(user_id))
        .set((users::balance.eq(balance), users::reserved.eq(reserved)))
        .execute(&mut conn)
        .expect("force balance");
}

/// A 10.00 IMPS payout with a 0.50 charge, in the given state.
pub fn payout(user: &User, beneficiary: &Beneficiary, key: &str, status: TransactionStatus) -> NewTransaction {
    let completed = status == TransactionStatus::Completed;
    NewTransaction {
        id: Uuid::new_v4(),
        user_id: user.id,
        beneficiary_id: beneficiary.id,
        rail: PayoutRail::Imps,
        amount: 1_000,
        charge_amount: 50,
        transaction_id: key.to_string(),
        reference_no: Some(format!("GW-{}", key)),
        status,
        failure_kind: None,
        failure_code: None,
        failure_message: None,
        balance_applied: completed,
        settled_at: completed.then(chrono::Utc::now),
    }
}
