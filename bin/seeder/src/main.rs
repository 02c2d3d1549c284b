use chrono::{Duration, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use dotenvy::dotenv;
use eyre::{eyre, Report};
use payout_core::repositories::beneficiary_repository::BeneficiaryRepository;
use payout_core::repositories::charge_rule_repository::ChargeRuleRepository;
use payout_core::repositories::user_repository::UserRepository;
use payout_core::services::charge_service::ChargeResolver;
use payout_core::SecurityConfig;
use payout_primitives::models::app_state::JWTInfo;
use payout_primitives::models::entities::{
    ChargeRule, NewBeneficiary, NewChargeRule, NewUser, VerificationStatus,
};
use std::env;
use uuid::Uuid;

/// Flat fee bands in paise: (min, max, charge).
const CHARGE_BANDS: [(i64, i64, i64); 4] = [
    (1, 100_000, 500),
    (100_001, 500_000, 1_500),
    (500_001, 2_500_000, 2_360),
    (2_500_001, 20_000_000, 5_000),
];

fn establish_connection() -> Result<PgConnection, Report> {
    let database_url = env::var("DATABASE_URL").map_err(|_| eyre!("DATABASE_URL must be set"))?;
    PgConnection::establish(&database_url).map_err(|e| eyre!("Error connecting to database: {}", e))
}

fn main() -> Result<(), Report> {
    dotenv().ok();
    println!("Seeding database...");

    let mut conn = establish_connection()?;

    // 1. Charge rules, validated before they are written
    seed_charge_rules(&mut conn)?;

    // 2. Users
    let admin_id = seed_user(
        &mut conn,
        "admin@payout.local",
        "Ops Admin",
        0,
        VerificationStatus::Admin,
    )?;
    let user_id = seed_user(
        &mut conn,
        "merchant@payout.local",
        "Asha Rao",
        10_000_000, // ₹1,00,000.00
        VerificationStatus::Verified,
    )?;

    // 3. Beneficiaries
    seed_beneficiaries(&mut conn, user_id)?;

    // 4. Tokens, when JWT settings are present
    print_tokens(admin_id, user_id);

    println!("Database seeded successfully");
    Ok(())
}

fn seed_charge_rules(conn: &mut PgConnection) -> Result<(), Report> {
    let now = Utc::now();
    let candidate = ChargeResolver::new(
        CHARGE_BANDS
            .iter()
            .map(|&(min_amount, max_amount, charge)| ChargeRule {
                id: Uuid::new_v4(),
                min_amount,
                max_amount,
                charge,
                is_active: true,
                created_at: now,
            })
            .collect(),
    );
    candidate
        .validate()
        .map_err(|e| eyre!("Refusing to seed charge rules: {}", e))?;

    let rules = CHARGE_BANDS
        .iter()
        .map(|&(min_amount, max_amount, charge)| NewChargeRule {
            min_amount,
            max_amount,
            charge,
        })
        .collect();

    let written = ChargeRuleRepository::replace_active(conn, rules)?;
    println!("Seeded {} charge bands", written.len());
    Ok(())
}

fn seed_user(
    conn: &mut PgConnection,
    email: &str,
    name: &str,
    balance: i64,
    verification_status: VerificationStatus,
) -> Result<Uuid, Report> {
    if let Some(user) = UserRepository::find_by_email(conn, email)? {
        println!("User {} already exists", email);
        return Ok(user.id);
    }

    let user = UserRepository::create(
        conn,
        NewUser {
            id: Uuid::new_v4(),
            name,
            email,
            balance,
            verification_status,
            imps_enabled: true,
            upi_enabled: true,
        },
    )?;

    println!("Created user {} ({})", email, user.id);
    Ok(user.id)
}

fn seed_beneficiaries(conn: &mut PgConnection, user_id: Uuid) -> Result<(), Report> {
    let bank = BeneficiaryRepository::create(
        conn,
        NewBeneficiary {
            id: Uuid::new_v4(),
            user_id,
            name: "Ravi Kumar",
            account_number: Some("50100012345678"),
            ifsc: Some("HDFC0001234"),
            vpa: None,
            is_verified: false,
        },
    )?;

    let vpa = BeneficiaryRepository::create(
        conn,
        NewBeneficiary {
            id: Uuid::new_v4(),
            user_id,
            name: "Meera Iyer",
            account_number: None,
            ifsc: None,
            vpa: Some("meera@okicici"),
            is_verified: true,
        },
    )?;

    println!("Created beneficiaries {} (IMPS, unverified) and {} (UPI)", bank.id, vpa.id);
    Ok(())
}

fn print_tokens(admin_id: Uuid, user_id: Uuid) {
    let jwt = match JWTInfo::new() {
        Ok(jwt) => jwt,
        Err(e) => {
            println!("Skipping tokens: {}", e);
            return;
        }
    };

    for (label, id, kind) in [
        ("admin", admin_id, VerificationStatus::Admin),
        ("user", user_id, VerificationStatus::Verified),
    ] {
        match SecurityConfig::create_token(&jwt, id, kind, Duration::days(7)) {
            Ok(token) => println!("{} token: {}", label, token),
            Err(e) => println!("Could not mint {} token: {}", label, e),
        }
    }
}
