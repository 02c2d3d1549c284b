mod common;

use chrono::{Duration, Utc};
use common::pg::{force_balance, payout, pg_ledger, seed_account};
use payout_core::ledger::{AdjustmentInstruction, LedgerStore, PayoutRecord, Settlement};
use payout_primitives::error::ApiError;
use payout_primitives::models::entities::{AdjustmentKind, TransactionStatus};
use serial_test::serial;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn racing_writers_leave_one_row_and_one_debit() {
    let Some(ctx) = pg_ledger() else { return };
    let (user, ben) = seed_account(&ctx.pool, 100_000);
    let store = Arc::new(ctx.store);

    // every racer took its own hold before calling the gateway
    for _ in 0..4 {
        store.reserve_funds(user.id, 1_050).await.unwrap();
    }

    let mut handles = Vec::new();
    for _ in 0..4 {
        let store = store.clone();
        let new_tx = payout(&user, &ben, "PG-RACE-0001", TransactionStatus::Completed);
        handles.push(tokio::spawn(async move { store.record_payout(new_tx).await }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            PayoutRecord::Created(_) => created += 1,
            PayoutRecord::Existing(tx) => assert_eq!(tx.transaction_id, "PG-RACE-0001"),
            other => panic!("unexpected record {other:?}"),
        }
    }
    assert_eq!(created, 1);

    let after = store.find_user(user.id).await.unwrap().unwrap();
    assert_eq!(after.balance, 98_950);
    assert_eq!(after.reserved, 0);
    assert_eq!(store.recent_transactions(user.id, 10).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn concurrent_holds_cannot_overdraw() {
    let Some(ctx) = pg_ledger() else { return };
    let (user, _) = seed_account(&ctx.pool, 1_500);
    let store = Arc::new(ctx.store);
    let user_id = user.id;

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.reserve_funds(user_id, 1_050).await })
        })
        .collect();

    let mut held = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => held += 1,
            Err(ApiError::InsufficientBalance {
                required,
                available,
            }) => assert_eq!((required, available), (1_050, 450)),
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }
    assert_eq!(held, 1);

    // held funds are out of reach for admin deductions too
    let err = store
        .apply_adjustment(AdjustmentInstruction {
            admin_id: Uuid::new_v4(),
            user_id: user.id,
            kind: AdjustmentKind::Deduction,
            amount: 500,
            reason: "chargeback".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InsufficientBalance { available: 450, .. }));

    store.release_funds(user.id, 1_050).await.unwrap();
    let after = store.find_user(user.id).await.unwrap().unwrap();
    assert_eq!((after.balance, after.reserved), (1_500, 0));
}

#[tokio::test]
#[serial]
async fn lost_debit_is_kept_pending_and_settled_later() {
    let Some(ctx) = pg_ledger() else { return };
    let (user, ben) = seed_account(&ctx.pool, 5_000);

    ctx.store.reserve_funds(user.id, 1_050).await.unwrap();
    force_balance(&ctx.pool, user.id, 0, 0);

    let record = ctx
        .store
        .record_payout(payout(&user, &ben, "PG-UNSETTLED", TransactionStatus::Completed))
        .await
        .unwrap();
    let PayoutRecord::Unsettled(tx) = record else {
        panic!("expected an unsettled record, got {record:?}");
    };
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert!(!tx.balance_applied);
    assert_eq!(tx.failure_code.as_deref(), Some("DEBIT_FAILED"));

    ctx.store
        .apply_adjustment(AdjustmentInstruction {
            admin_id: user.id,
            user_id: user.id,
            kind: AdjustmentKind::Addition,
            amount: 5_000,
            reason: "top up".into(),
        })
        .await
        .unwrap();

    let settled = ctx
        .store
        .settle_transaction(tx.id, Settlement::Completed { reference_no: None })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(settled.status, TransactionStatus::Completed);
    assert!(settled.failure_code.is_none());
    assert_eq!(settled.reference_no.as_deref(), Some("GW-PG-UNSETTLED"));

    let after = ctx.store.find_user(user.id).await.unwrap().unwrap();
    assert_eq!(after.balance, 3_950);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn racing_settlements_debit_once() {
    let Some(ctx) = pg_ledger() else { return };
    let (user, ben) = seed_account(&ctx.pool, 5_000);
    let store = Arc::new(ctx.store);

    let created = store
        .record_payout(payout(&user, &ben, "PG-SETTLE-01", TransactionStatus::Pending))
        .await
        .unwrap();
    let id = created.transaction().id;

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .settle_transaction(id, Settlement::Completed { reference_no: None })
                    .await
            })
        })
        .collect();

    let mut moved = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().is_some() {
            moved += 1;
        }
    }
    assert_eq!(moved, 1);

    let after = store.find_user(user.id).await.unwrap().unwrap();
    assert_eq!(after.balance, 3_950);
}

#[tokio::test]
#[serial]
async fn cron_lock_lifecycle() {
    let Some(ctx) = pg_ledger() else { return };
    let store = ctx.store;
    let timeout = Duration::minutes(10);
    let now = Utc::now();

    assert!(store.try_acquire_lock("pg-job", "a", now, timeout).await.unwrap());
    assert!(!store.try_acquire_lock("pg-job", "b", now, timeout).await.unwrap());

    // renewed at +8, so still held at +15
    assert!(store.renew_lock("pg-job", "a", now + Duration::minutes(8)).await.unwrap());
    assert!(!store
        .try_acquire_lock("pg-job", "b", now + Duration::minutes(15), timeout)
        .await
        .unwrap());

    // stale at +19
    assert!(store
        .try_acquire_lock("pg-job", "b", now + Duration::minutes(19), timeout)
        .await
        .unwrap());
    assert!(!store.renew_lock("pg-job", "a", now + Duration::minutes(19)).await.unwrap());

    store.release_lock("pg-job", "a").await.unwrap();
    let lock = store.find_lock("pg-job").await.unwrap().unwrap();
    assert!(lock.is_locked);
    assert_eq!(lock.locked_by.as_deref(), Some("b"));

    store.release_lock("pg-job", "b").await.unwrap();
    assert!(!store.find_lock("pg-job").await.unwrap().unwrap().is_locked);
}
