// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::LedgerEngine;
use super::input::NewGoal;
use crate::error::{LedgerError, Result};
use crate::models::{Account, Goal, RecordMeta};
use crate::store::{self, Record};
use crate::utils::require_positive;

impl LedgerEngine {
    pub fn create_goal(&mut self, input: NewGoal) -> Result<Goal> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(LedgerError::validation("goal name must not be empty"));
        }
        require_positive(input.target_amount, "goal target")?;
        let goal = Goal {
            id: Uuid::new_v4(),
            name,
            target_amount: input.target_amount,
            current_amount: Decimal::ZERO,
            linked_account_id: input.linked_account_id,
            target_date: input.target_date,
            is_completed: false,
            meta: RecordMeta::new(),
        };
        self.store.scoped(|conn| {
            if let Some(account_id) = goal.linked_account_id {
                store::require::<Account>(conn, account_id)?;
            }
            Ok(goal.save(conn)?)
        })?;
        info!(goal_id = %goal.id, target = %goal.target_amount, "goal created");
        Ok(goal)
    }

    pub fn contribute_to_goal(&mut self, id: Uuid, amount: Decimal) -> Result<Goal> {
        require_positive(amount, "contribution")?;
        self.shift_goal(id, amount)
    }

    pub fn withdraw_from_goal(&mut self, id: Uuid, amount: Decimal) -> Result<Goal> {
        require_positive(amount, "withdrawal")?;
        self.shift_goal(id, -amount)
    }

    fn shift_goal(&mut self, id: Uuid, change: Decimal) -> Result<Goal> {
        let goal = self.store.scoped(|conn| {
            let mut goal: Goal = store::require(conn, id)?;
            let next = goal.current_amount + change;
            if next < Decimal::ZERO {
                return Err(LedgerError::validation(format!(
                    "goal {} holds only {}",
                    goal.id, goal.current_amount
                )));
            }
            goal.current_amount = next;
            goal.is_completed = next >= goal.target_amount;
            store::touch_and_save(conn, &mut goal)?;
            Ok(goal)
        })?;
        info!(goal_id = %id, current = %goal.current_amount, completed = goal.is_completed, "goal updated");
        Ok(goal)
    }

    pub fn delete_goal(&mut self, id: Uuid) -> Result<()> {
        self.store
            .scoped(|conn| store::tombstone::<Goal>(conn, id).map(|_| ()))?;
        info!(goal_id = %id, "goal deleted");
        Ok(())
    }

    pub fn get_goal(&self, id: Uuid) -> Result<Goal> {
        store::require(self.store.conn(), id)
    }

    pub fn list_goals(&self) -> Result<Vec<Goal>> {
        store::select(self.store.conn(), "ORDER BY name", [])
    }
}
