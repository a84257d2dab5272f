// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::ledger::{NewAccount, NewTransfer};
use billfold::models::Direction;
use billfold::store::transactions::TransactionFilter;
use billfold::{ErrorKind, LedgerEngine, LedgerStore};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

fn setup() -> (LedgerEngine, Uuid, Uuid) {
    let mut engine = LedgerEngine::builder()
        .store(LedgerStore::open_in_memory().unwrap())
        .build()
        .unwrap();
    let x = engine
        .create_account(NewAccount::bank("X", dec("1000")))
        .unwrap()
        .id;
    let y = engine
        .create_account(NewAccount::bank("Y", dec("200")))
        .unwrap()
        .id;
    (engine, x, y)
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 12).unwrap()
}

fn balance(engine: &LedgerEngine, id: Uuid) -> Decimal {
    engine.get_account(id).unwrap().balance
}

#[test]
fn transfer_moves_amount_and_delete_restores() {
    let (mut engine, x, y) = setup();
    let receipt = engine
        .create_transfer(NewTransfer::new(x, y, dec("333.33"), date()))
        .unwrap();
    assert!(!receipt.is_bill_payment);
    assert_eq!(balance(&engine, x), dec("666.67"));
    assert_eq!(balance(&engine, y), dec("533.33"));

    let from = &receipt.from_transaction;
    let to = &receipt.to_transaction;
    assert_eq!(from.direction, Direction::Debit);
    assert_eq!(to.direction, Direction::Credit);
    assert_eq!(from.transfer_id(), Some(receipt.transfer.id));
    assert_eq!(to.transfer_id(), Some(receipt.transfer.id));
    assert_eq!(receipt.transfer.from_transaction_id, from.id);
    assert_eq!(
        engine.get_transfer(receipt.transfer.id).unwrap(),
        receipt.transfer
    );

    engine.delete_transfer(receipt.transfer.id).unwrap();
    assert_eq!(balance(&engine, x), dec("1000"));
    assert_eq!(balance(&engine, y), dec("200"));
    assert!(
        engine
            .list_transactions(&TransactionFilter::default())
            .unwrap()
            .is_empty()
    );
    assert!(engine.list_transfers().unwrap().is_empty());

    let err = engine.delete_transfer(receipt.transfer.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(balance(&engine, x), dec("1000"));
}

#[test]
fn same_account_and_bad_amounts_are_rejected() {
    let (mut engine, x, y) = setup();
    let err = engine
        .create_transfer(NewTransfer::new(x, x, dec("1"), date()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = engine
        .create_transfer(NewTransfer::new(x, y, Decimal::ZERO, date()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn short_source_aborts_whole_transfer() {
    let (mut engine, x, y) = setup();
    let err = engine
        .create_transfer(NewTransfer::new(y, x, dec("200.01"), date()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    assert_eq!(balance(&engine, x), dec("1000"));
    assert_eq!(balance(&engine, y), dec("200"));
    assert!(engine.list_transfers().unwrap().is_empty());
    assert!(
        engine
            .list_transactions(&TransactionFilter::default())
            .unwrap()
            .is_empty()
    );
}

#[test]
fn missing_destination_rolls_back_source_leg() {
    let (mut engine, x, _) = setup();
    let err = engine
        .create_transfer(NewTransfer::new(x, Uuid::new_v4(), dec("10"), date()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(balance(&engine, x), dec("1000"));
}

#[test]
fn loan_payment_counts_as_bill_payment() {
    let (mut engine, x, _) = setup();
    let loan = engine
        .create_account(NewAccount::loan("Mortgage", dec("90000")))
        .unwrap();
    let receipt = engine
        .create_transfer(NewTransfer::new(x, loan.id, dec("900"), date()))
        .unwrap();
    assert!(receipt.is_bill_payment);
    assert_eq!(balance(&engine, loan.id), dec("89100"));
    assert_eq!(balance(&engine, x), dec("100"));
    let summary = engine.get_summary().unwrap();
    assert_eq!(summary.net_worth, dec("100") + dec("200") - dec("89100"));
}
