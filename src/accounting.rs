// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Sign conventions for every balance change in the ledger.
//!
//! Bank balances hold money the user has; credit and loan balances hold money
//! the user owes. A credit (deposit, payment) therefore raises a bank balance
//! and lowers a debt, while a debit (spend, charge, fee) does the opposite.

use rust_decimal::Decimal;

use crate::models::{AccountKind, Direction, Transaction};

pub fn delta(direction: Direction, amount: Decimal, kind: AccountKind) -> Decimal {
    match (kind, direction) {
        (AccountKind::Bank, Direction::Credit) => amount,
        (AccountKind::Bank, Direction::Debit) => -amount,
        (AccountKind::Credit | AccountKind::Loan, Direction::Credit) => -amount,
        (AccountKind::Credit | AccountKind::Loan, Direction::Debit) => amount,
    }
}

pub fn reversal(direction: Direction, amount: Decimal, kind: AccountKind) -> Decimal {
    -delta(direction, amount, kind)
}

pub fn transaction_delta(tx: &Transaction, kind: AccountKind) -> Decimal {
    delta(tx.direction, tx.amount, kind)
}

/// Inverse of [`delta`]: the direction and positive amount producing `change`.
/// Returns `None` for a zero change.
pub fn entry_for(change: Decimal, kind: AccountKind) -> Option<(Direction, Decimal)> {
    if change.is_zero() {
        return None;
    }
    let raises = change > Decimal::ZERO;
    let direction = match (kind, raises) {
        (AccountKind::Bank, true) => Direction::Credit,
        (AccountKind::Bank, false) => Direction::Debit,
        (_, true) => Direction::Debit,
        (_, false) => Direction::Credit,
    };
    Some((direction, change.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn bank_credit_adds_debit_subtracts() {
        assert_eq!(delta(Direction::Credit, d("10"), AccountKind::Bank), d("10"));
        assert_eq!(delta(Direction::Debit, d("10"), AccountKind::Bank), d("-10"));
    }

    #[test]
    fn debt_accounts_invert_the_sign() {
        for kind in [AccountKind::Credit, AccountKind::Loan] {
            assert_eq!(delta(Direction::Credit, d("5.25"), kind), d("-5.25"));
            assert_eq!(delta(Direction::Debit, d("5.25"), kind), d("5.25"));
        }
    }

    #[test]
    fn reversal_cancels_delta() {
        for kind in [AccountKind::Bank, AccountKind::Credit, AccountKind::Loan] {
            for dir in [Direction::Debit, Direction::Credit] {
                assert!((delta(dir, d("42.10"), kind) + reversal(dir, d("42.10"), kind)).is_zero());
            }
        }
    }

    #[test]
    fn entry_for_inverts_delta() {
        for kind in [AccountKind::Bank, AccountKind::Credit, AccountKind::Loan] {
            for change in [d("3.50"), d("-3.50")] {
                let (dir, amount) = entry_for(change, kind).unwrap();
                assert_eq!(delta(dir, amount, kind), change);
            }
        }
        assert!(entry_for(Decimal::ZERO, AccountKind::Bank).is_none());
    }
}
