// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::LedgerEngine;
use super::input::NewTransfer;
use super::posting::{self, Entry};
use crate::error::{LedgerError, Result};
use crate::models::{Account, AccountKind, Direction, RecordMeta, Transaction, TransactionSource, Transfer};
use crate::store::{self, Record};
use crate::utils::{normalize_text, require_positive};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferReceipt {
    pub transfer: Transfer,
    pub from_transaction: Transaction,
    pub to_transaction: Transaction,
    /// Destination is a credit or loan account.
    pub is_bill_payment: bool,
}

impl LedgerEngine {
    pub fn create_transfer(&mut self, input: NewTransfer) -> Result<TransferReceipt> {
        if input.from_account_id == input.to_account_id {
            return Err(LedgerError::validation(
                "transfer source and destination must differ",
            ));
        }
        require_positive(input.amount, "transfer amount")?;
        let allow = self.overdraft_allowed(input.allow_overdraft);
        let note = normalize_text(input.note);

        let receipt = self.store.scoped(|conn| {
            let to_account: Account = store::require(conn, input.to_account_id)?;
            let transfer_id = Uuid::new_v4();
            let leg = |account_id, direction| Entry {
                account_id,
                direction,
                amount: input.amount,
                date: input.date,
                category_id: None,
                payee: None,
                note: note.clone(),
                source: TransactionSource::Transfer { transfer_id },
            };
            let from_transaction =
                posting::post(conn, leg(input.from_account_id, Direction::Debit), allow)?;
            let to_transaction =
                posting::post(conn, leg(input.to_account_id, Direction::Credit), allow)?;
            let transfer = Transfer {
                id: transfer_id,
                from_account_id: input.from_account_id,
                to_account_id: input.to_account_id,
                amount: input.amount,
                date: input.date,
                note: note.clone(),
                from_transaction_id: from_transaction.id,
                to_transaction_id: to_transaction.id,
                meta: RecordMeta::new(),
            };
            transfer.save(conn)?;
            Ok(TransferReceipt {
                transfer,
                from_transaction,
                to_transaction,
                is_bill_payment: to_account.kind() != AccountKind::Bank,
            })
        })?;
        info!(
            transfer_id = %receipt.transfer.id,
            from = %receipt.transfer.from_account_id,
            to = %receipt.transfer.to_account_id,
            amount = %receipt.transfer.amount,
            bill_payment = receipt.is_bill_payment,
            "transfer created"
        );
        Ok(receipt)
    }

    /// Reverses both legs and tombstones them with the transfer.
    pub fn delete_transfer(&mut self, id: Uuid) -> Result<()> {
        self.store.scoped(|conn| {
            let transfer: Transfer = store::require(conn, id)?;
            for leg_id in [transfer.from_transaction_id, transfer.to_transaction_id] {
                match store::find::<Transaction>(conn, leg_id)? {
                    Some(leg) => {
                        posting::reverse(conn, leg)?;
                    }
                    None => warn!(transfer_id = %id, transaction_id = %leg_id, "transfer leg already gone"),
                }
            }
            store::tombstone::<Transfer>(conn, id).map(|_| ())
        })?;
        info!(transfer_id = %id, "transfer deleted");
        Ok(())
    }

    pub fn get_transfer(&self, id: Uuid) -> Result<Transfer> {
        store::require(self.store.conn(), id)
    }

    pub fn list_transfers(&self) -> Result<Vec<Transfer>> {
        store::select(self.store.conn(), "ORDER BY date DESC, created_at DESC", [])
    }
}
