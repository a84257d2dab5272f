// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::ledger::{MarkPaid, NewAccount, NewPayable, NewTransaction, PayableChanges};
use billfold::models::{Direction, Frequency, PayableSchedule, RecurrenceRule};
use billfold::store::transactions::TransactionFilter;
use billfold::{ErrorKind, LedgerEngine, LedgerStore};
use chrono::NaiveDate;
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

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn monthly() -> PayableSchedule {
    PayableSchedule::Recurring {
        rule: RecurrenceRule {
            frequency: Frequency::Monthly {
                interval: 1,
                day_of_month: None,
            },
            end_date: None,
        },
    }
}

fn balance(engine: &LedgerEngine, id: Uuid) -> Decimal {
    engine.get_account(id).unwrap().balance
}

#[test]
fn rent_paid_then_unpaid_restores_balance() {
    let mut engine = setup();
    let today = day(2025, 6, 1);
    let a = engine.create_account(NewAccount::bank("A", dec("1000.00"))).unwrap().id;
    engine
        .create_transaction(NewTransaction::debit(a, dec("250.00"), today))
        .unwrap();
    assert_eq!(balance(&engine, a), dec("750.00"));

    let rent = engine
        .create_payable(NewPayable::new("Rent", dec("750.00"), today))
        .unwrap();
    let outcome = engine
        .mark_payable_paid(MarkPaid::new(rent.id, a).on(today))
        .unwrap();
    assert_eq!(balance(&engine, a), dec("0.00"));
    assert!(outcome.payable.is_paid());
    assert!(outcome.successor.is_none());
    assert_eq!(outcome.transaction.direction, Direction::Debit);
    assert_eq!(outcome.transaction.amount, dec("750.00"));
    assert_eq!(outcome.transaction.linked_payable_id(), Some(rent.id));
    assert_eq!(outcome.transaction.payee.as_deref(), Some("Rent"));
    let payment = outcome.payable.payment.clone().unwrap();
    assert_eq!(payment.linked_transaction_id, outcome.transaction.id);
    assert_eq!(payment.paid_from_account_id, a);
    assert_eq!(payment.paid_date, today);

    let unpaid = engine.mark_payable_unpaid(rent.id).unwrap();
    assert!(!unpaid.is_paid());
    assert!(unpaid.payment.is_none());
    assert_eq!(balance(&engine, a), dec("750.00"));
    assert_eq!(
        engine.get_transaction(outcome.transaction.id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert!(!engine.get_payable(rent.id).unwrap().is_paid());
    assert!(engine.verify_balances().unwrap().is_empty());
}

#[test]
fn paying_twice_and_unpaying_unpaid_fail() {
    let mut engine = setup();
    let a = engine.create_account(NewAccount::bank("A", dec("100"))).unwrap().id;
    let bill = engine
        .create_payable(NewPayable::new("Phone", dec("40"), day(2025, 6, 3)))
        .unwrap();
    assert_eq!(
        engine.mark_payable_unpaid(bill.id).unwrap_err().kind(),
        ErrorKind::Validation
    );
    engine
        .mark_payable_paid(MarkPaid::new(bill.id, a).on(day(2025, 6, 3)))
        .unwrap();
    let err = engine
        .mark_payable_paid(MarkPaid::new(bill.id, a).on(day(2025, 6, 4)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(balance(&engine, a), dec("60"));
}

#[test]
fn insufficient_funds_leaves_payable_unpaid() {
    let mut engine = setup();
    let a = engine.create_account(NewAccount::bank("A", dec("10"))).unwrap().id;
    let bill = engine
        .create_payable(NewPayable::new("Insurance", dec("90"), day(2025, 6, 3)).schedule(monthly()))
        .unwrap();
    let err = engine
        .mark_payable_paid(MarkPaid::new(bill.id, a).on(day(2025, 6, 3)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    assert!(!engine.get_payable(bill.id).unwrap().is_paid());
    assert_eq!(engine.list_payables(true).unwrap().len(), 1);
    assert_eq!(balance(&engine, a), dec("10"));
}

#[test]
fn actual_amount_overrides_bill_amount() {
    let mut engine = setup();
    let a = engine.create_account(NewAccount::bank("A", dec("500"))).unwrap().id;
    let bill = engine
        .create_payable(NewPayable::new("Power", dec("80"), day(2025, 7, 1)).schedule(monthly()))
        .unwrap();
    let mut pay = MarkPaid::new(bill.id, a).on(day(2025, 6, 29));
    pay.actual_amount = Some(dec("93.17"));
    let outcome = engine.mark_payable_paid(pay).unwrap();
    assert_eq!(balance(&engine, a), dec("406.83"));
    assert_eq!(outcome.payable.payment.unwrap().amount, dec("93.17"));
    // the next bill keeps the planned amount
    assert_eq!(outcome.successor.unwrap().amount, dec("80"));
}

#[test]
fn monthly_bill_on_the_31st_clamps_then_recovers() {
    let mut engine = setup();
    let a = engine.create_account(NewAccount::bank("A", dec("5000"))).unwrap().id;
    let gym = engine
        .create_payable(NewPayable::new("Gym", dec("45"), day(2025, 1, 31)).schedule(monthly()))
        .unwrap();

    let first = engine
        .mark_payable_paid(MarkPaid::new(gym.id, a).on(day(2025, 1, 30)))
        .unwrap();
    let feb = first.successor.unwrap();
    assert_eq!(feb.due_date, day(2025, 2, 28));
    assert_eq!(feb.parent_payable_id, Some(gym.id));
    assert!(!feb.is_paid());

    let second = engine
        .mark_payable_paid(MarkPaid::new(feb.id, a).on(day(2025, 2, 27)))
        .unwrap();
    assert_eq!(second.successor.unwrap().due_date, day(2025, 3, 31));
}

#[test]
fn leap_year_february_gets_the_29th() {
    let mut engine = setup();
    let a = engine.create_account(NewAccount::bank("A", dec("100"))).unwrap().id;
    let bill = engine
        .create_payable(NewPayable::new("Stream", dec("9.99"), day(2024, 1, 31)).schedule(monthly()))
        .unwrap();
    let outcome = engine
        .mark_payable_paid(MarkPaid::new(bill.id, a).on(day(2024, 1, 31)))
        .unwrap();
    assert_eq!(outcome.successor.unwrap().due_date, day(2024, 2, 29));
}

#[test]
fn unpaid_then_repaid_reuses_existing_successor() {
    let mut engine = setup();
    let a = engine.create_account(NewAccount::bank("A", dec("1000"))).unwrap().id;
    let bill = engine
        .create_payable(NewPayable::new("Water", dec("30"), day(2025, 3, 10)).schedule(monthly()))
        .unwrap();
    let paid = engine
        .mark_payable_paid(MarkPaid::new(bill.id, a).on(day(2025, 3, 9)))
        .unwrap();
    let successor = paid.successor.unwrap();

    engine.mark_payable_unpaid(bill.id).unwrap();
    // the successor stays
    assert_eq!(engine.get_payable(successor.id).unwrap().due_date, day(2025, 4, 10));

    let repaid = engine
        .mark_payable_paid(MarkPaid::new(bill.id, a).on(day(2025, 3, 10)))
        .unwrap();
    assert_eq!(repaid.successor.unwrap().id, successor.id);
    assert_eq!(engine.list_payables(true).unwrap().len(), 2);
    assert_eq!(balance(&engine, a), dec("970"));
}

#[test]
fn recurrence_stops_after_end_date() {
    let mut engine = setup();
    let a = engine.create_account(NewAccount::bank("A", dec("1000"))).unwrap().id;
    let schedule = PayableSchedule::Recurring {
        rule: RecurrenceRule {
            frequency: Frequency::Weekly {
                interval: 2,
                day_of_week: None,
            },
            end_date: Some(day(2025, 5, 10)),
        },
    };
    let bill = engine
        .create_payable(NewPayable::new("Lessons", dec("25"), day(2025, 4, 28)).schedule(schedule))
        .unwrap();
    let outcome = engine
        .mark_payable_paid(MarkPaid::new(bill.id, a).on(day(2025, 4, 28)))
        .unwrap();
    assert!(outcome.successor.is_none());
}

#[test]
fn moving_the_due_date_moves_the_monthly_anchor() {
    let mut engine = setup();
    let a = engine.create_account(NewAccount::bank("A", dec("500"))).unwrap().id;
    let bill = engine
        .create_payable(NewPayable::new("Phone", dec("40"), day(2025, 1, 15)).schedule(monthly()))
        .unwrap();
    engine
        .update_payable(
            bill.id,
            PayableChanges {
                due_date: Some(day(2025, 1, 31)),
                ..Default::default()
            },
        )
        .unwrap();
    let first = engine
        .mark_payable_paid(MarkPaid::new(bill.id, a).on(day(2025, 1, 31)))
        .unwrap();
    let feb = first.successor.unwrap();
    assert_eq!(feb.due_date, day(2025, 2, 28));
    let second = engine
        .mark_payable_paid(MarkPaid::new(feb.id, a).on(day(2025, 2, 28)))
        .unwrap();
    assert_eq!(second.successor.unwrap().due_date, day(2025, 3, 31));
}

#[test]
fn recurrence_past_the_calendar_has_no_successor() {
    let mut engine = setup();
    let a = engine.create_account(NewAccount::bank("A", dec("100"))).unwrap().id;
    for frequency in [
        Frequency::Daily { interval: u32::MAX },
        Frequency::Weekly {
            interval: u32::MAX,
            day_of_week: None,
        },
        Frequency::Biweekly {
            interval: u32::MAX,
            day_of_week: None,
        },
        Frequency::Monthly {
            interval: u32::MAX,
            day_of_month: None,
        },
        Frequency::Yearly {
            interval: 400_000_000,
        },
    ] {
        let schedule = PayableSchedule::Recurring {
            rule: RecurrenceRule {
                frequency,
                end_date: None,
            },
        };
        let bill = engine
            .create_payable(NewPayable::new("Far", dec("1"), day(2025, 1, 1)).schedule(schedule))
            .unwrap();
        let outcome = engine
            .mark_payable_paid(MarkPaid::new(bill.id, a).on(day(2025, 1, 1)))
            .unwrap();
        assert!(outcome.payable.is_paid());
        assert!(outcome.successor.is_none());
    }
    assert_eq!(balance(&engine, a), dec("95"));
}

#[test]
fn invalid_recurrence_is_rejected() {
    let mut engine = setup();
    let schedule = PayableSchedule::Recurring {
        rule: RecurrenceRule {
            frequency: Frequency::Daily { interval: 0 },
            end_date: None,
        },
    };
    let err = engine
        .create_payable(NewPayable::new("Never", dec("1"), day(2025, 1, 1)).schedule(schedule))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn paid_payables_resist_edits_and_deletes() {
    let mut engine = setup();
    let a = engine.create_account(NewAccount::bank("A", dec("100"))).unwrap().id;
    let bill = engine
        .create_payable(NewPayable::new("Internet", dec("50"), day(2025, 8, 1)))
        .unwrap();
    engine
        .mark_payable_paid(MarkPaid::new(bill.id, a).on(day(2025, 8, 1)))
        .unwrap();

    let err = engine
        .update_payable(
            bill.id,
            PayableChanges {
                amount: Some(dec("55")),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(engine.delete_payable(bill.id).unwrap_err().kind(), ErrorKind::Validation);

    let renamed = engine
        .update_payable(
            bill.id,
            PayableChanges {
                name: Some("Fiber".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(renamed.name, "Fiber");
    assert!(renamed.is_paid());

    engine.mark_payable_unpaid(bill.id).unwrap();
    engine.delete_payable(bill.id).unwrap();
    assert_eq!(engine.get_payable(bill.id).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn payment_transaction_cannot_be_deleted_directly() {
    let mut engine = setup();
    let a = engine.create_account(NewAccount::bank("A", dec("100"))).unwrap().id;
    let bill = engine
        .create_payable(NewPayable::new("Tax", dec("20"), day(2025, 4, 15)))
        .unwrap();
    let outcome = engine
        .mark_payable_paid(MarkPaid::new(bill.id, a).on(day(2025, 4, 15)))
        .unwrap();
    let err = engine.delete_transaction(outcome.transaction.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        engine
            .list_transactions(&TransactionFilter::default())
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn listing_and_upcoming() {
    let mut engine = setup();
    let a = engine.create_account(NewAccount::bank("A", dec("1000"))).unwrap().id;
    let late = engine
        .create_payable(NewPayable::new("Late", dec("10"), day(2025, 1, 5)))
        .unwrap();
    engine
        .create_payable(NewPayable::new("Soon", dec("20"), day(2025, 1, 20)))
        .unwrap();
    engine
        .create_payable(NewPayable::new("Far", dec("30"), day(2025, 3, 1)))
        .unwrap();
    let paid = engine
        .create_payable(NewPayable::new("Done", dec("5"), day(2025, 1, 10)))
        .unwrap();
    engine
        .mark_payable_paid(MarkPaid::new(paid.id, a).on(day(2025, 1, 10)))
        .unwrap();

    let upcoming = engine.upcoming_payables(day(2025, 1, 31)).unwrap();
    let names: Vec<_> = upcoming.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Late", "Soon"]);
    assert_eq!(upcoming[0].id, late.id);

    assert_eq!(engine.list_payables(false).unwrap().len(), 3);
    assert_eq!(engine.list_payables(true).unwrap().len(), 4);
}
