// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::ledger::{EntityKind, NewAccount, NewTransaction, SyncRecord};
use billfold::models::{
    Account, AccountTerms, Direction, RecordMeta, SyncStatus, Transaction, TransactionSource,
};
use billfold::store::{self, transactions::TransactionFilter};
use billfold::{LedgerEngine, LedgerStore};
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

fn setup() -> LedgerEngine {
    LedgerEngine::builder()
        .store(LedgerStore::open_in_memory().unwrap())
        .build()
        .unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 2).unwrap()
}

fn remote_account(balance: &str) -> Account {
    Account {
        id: Uuid::new_v4(),
        name: "Remote checking".into(),
        terms: AccountTerms::Bank,
        balance: dec(balance),
        opening_balance: dec(balance),
        is_active: true,
        meta: RecordMeta::new(),
    }
}

#[test]
fn local_changes_are_dirty_until_marked_synced() {
    let mut engine = setup();
    let a = engine.create_account(NewAccount::bank("A", dec("100"))).unwrap();
    engine
        .create_transaction(NewTransaction::debit(a.id, dec("10"), date()))
        .unwrap();

    let dirty = engine.dirty_records(EntityKind::Account).unwrap();
    assert_eq!(dirty.len(), 1);
    assert_eq!(dirty[0].kind(), EntityKind::Account);
    assert_eq!(dirty[0].id(), a.id);
    let stamp = dirty[0].meta().updated_at;

    let changed = engine.mark_synced(EntityKind::Account, &[a.id]).unwrap();
    assert_eq!(changed, 1);
    assert!(engine.dirty_records(EntityKind::Account).unwrap().is_empty());
    let stored = engine.get_account(a.id).unwrap();
    assert_eq!(stored.meta.sync_status, SyncStatus::Synced);
    assert_eq!(stored.meta.updated_at, stamp);
    assert_eq!(engine.dirty_records(EntityKind::Transaction).unwrap().len(), 1);

    // the next local edit makes it dirty again
    engine.adjust_balance(a.id, dec("1")).unwrap();
    assert_eq!(engine.dirty_records(EntityKind::Account).unwrap().len(), 1);
}

#[test]
fn tombstones_are_reported_and_stay_deleted() {
    let mut engine = setup();
    let a = engine.create_account(NewAccount::bank("A", dec("100"))).unwrap();
    let before = a.meta.updated_at - Duration::seconds(1);
    engine.delete_account(a.id).unwrap();

    let gone = engine.tombstones_since(EntityKind::Account, before).unwrap();
    assert_eq!(gone.len(), 1);
    assert!(gone[0].meta().is_deleted());
    assert!(
        engine
            .tombstones_since(EntityKind::Account, gone[0].meta().updated_at)
            .unwrap()
            .is_empty()
    );

    assert_eq!(engine.mark_synced(EntityKind::Account, &[a.id]).unwrap(), 0);
    let raw: Account = store::find_any(engine.store().conn(), a.id).unwrap().unwrap();
    assert_eq!(raw.meta.sync_status, SyncStatus::Deleted);
}

#[test]
fn newer_remote_wins_and_is_written_verbatim() {
    let mut engine = setup();
    let local = engine.create_account(NewAccount::bank("Mine", dec("100"))).unwrap();

    let mut remote = local.clone();
    remote.name = "Renamed elsewhere".into();
    remote.balance = dec("42");
    remote.meta.updated_at = local.meta.updated_at + Duration::seconds(5);
    assert!(engine.upsert_from_cloud(SyncRecord::Account(remote.clone())).unwrap());

    let stored = engine.get_account(local.id).unwrap();
    assert_eq!(stored.name, "Renamed elsewhere");
    assert_eq!(stored.balance, dec("42"));
    assert_eq!(stored.meta.sync_status, SyncStatus::Synced);
    assert_eq!(stored.meta.updated_at, remote.meta.updated_at);

    let mut stale = remote.clone();
    stale.name = "Old news".into();
    stale.meta.updated_at = remote.meta.updated_at - Duration::seconds(60);
    assert!(!engine.upsert_from_cloud(SyncRecord::Account(stale)).unwrap());
    assert!(!engine.upsert_from_cloud(SyncRecord::Account(remote)).unwrap());
    assert_eq!(engine.get_account(local.id).unwrap().name, "Renamed elsewhere");
}

#[test]
fn remote_transactions_do_not_reapply_deltas() {
    let mut engine = setup();
    let account = remote_account("500");
    let tx = Transaction {
        id: Uuid::new_v4(),
        account_id: account.id,
        direction: Direction::Debit,
        amount: dec("75"),
        date: date(),
        category_id: None,
        payee: Some("Remote shop".into()),
        note: None,
        source: TransactionSource::Direct,
        is_split: false,
        is_reconciled: false,
        meta: RecordMeta::new(),
    };
    // child first: foreign keys are only checked at commit
    let applied = engine
        .upsert_batch_from_cloud(vec![
            SyncRecord::Transaction(tx.clone()),
            SyncRecord::Account(account.clone()),
        ])
        .unwrap();
    assert_eq!(applied, 2);
    assert_eq!(engine.get_account(account.id).unwrap().balance, dec("500"));
    assert_eq!(engine.get_transaction(tx.id).unwrap().payee.as_deref(), Some("Remote shop"));
    assert!(engine.dirty_records(EntityKind::Transaction).unwrap().is_empty());
}

#[test]
fn failed_batch_applies_nothing() {
    let mut engine = setup();
    let account = remote_account("10");
    let orphan = Transaction {
        id: Uuid::new_v4(),
        account_id: Uuid::new_v4(),
        direction: Direction::Credit,
        amount: dec("1"),
        date: date(),
        category_id: None,
        payee: None,
        note: None,
        source: TransactionSource::Direct,
        is_split: false,
        is_reconciled: false,
        meta: RecordMeta::new(),
    };
    let res = engine.upsert_batch_from_cloud(vec![
        SyncRecord::Account(account.clone()),
        SyncRecord::Transaction(orphan),
    ]);
    assert!(res.is_err());
    assert!(engine.list_accounts().unwrap().is_empty());
    assert!(
        engine
            .list_transactions(&TransactionFilter::default())
            .unwrap()
            .is_empty()
    );
}

#[test]
fn sync_record_wire_shape_names_the_entity() {
    let account = remote_account("1");
    let v = serde_json::to_value(SyncRecord::Account(account.clone())).unwrap();
    assert_eq!(v["entity"], "account");
    assert_eq!(v["record"]["name"], "Remote checking");
    let back: SyncRecord = serde_json::from_value(v).unwrap();
    assert_eq!(back, SyncRecord::Account(account));
    assert_eq!("transaction_split".parse::<EntityKind>().unwrap(), EntityKind::TransactionSplit);
    assert!("envelope".parse::<EntityKind>().is_err());
}
