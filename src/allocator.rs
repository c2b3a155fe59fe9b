// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! First-in-first-out lot selection.
//!
//! A lot's remaining capacity is always derived: original quantity minus the
//! live allocations against it. Nothing here mutates deposit rows, and
//! planning is a pure function, so re-running it over identical inputs
//! reproduces the identical split. That determinism is what lets the edit
//! path rebuild an unchanged withdrawal byte-for-byte.

use crate::base::{DepositId, ProductKey, WithdrawalId};
use crate::store::Snapshot;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

/// A deposit lot with its derived remaining capacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotCapacity {
    pub deposit_id: DepositId,
    pub deposit_date: NaiveDateTime,
    /// Original received amount.
    pub quantity: Decimal,
    /// `quantity` minus every live allocation against the lot.
    pub remaining: Decimal,
}

/// One lot's share of a withdrawal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotShare {
    pub deposit_id: DepositId,
    pub deposit_date: NaiveDateTime,
    pub quantity: Decimal,
}

/// Result of planning a withdrawal against the available lots.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationPlan {
    pub shares: Vec<LotShare>,
    /// Demand left unsatisfied after every lot was exhausted. Not an error;
    /// callers surface it to the operator.
    pub shortfall: Decimal,
}

impl AllocationPlan {
    pub fn allocated(&self) -> Decimal {
        self.shares.iter().map(|share| share.quantity).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.shortfall.is_zero()
    }
}

/// Every lot of `key` with its derived standing, oldest first.
///
/// Ties on `deposit_date` break on id ascending so the order is total even
/// when timestamps collide. Allocations belonging to `exclude` are treated
/// as already reversed, which lets the edit path replan in a single step.
pub fn lot_capacities(
    snapshot: &Snapshot,
    key: &ProductKey,
    exclude: Option<WithdrawalId>,
) -> Vec<LotCapacity> {
    let mut lots: Vec<LotCapacity> = snapshot
        .deposits
        .iter()
        .filter(|deposit| &deposit.key == key)
        .map(|deposit| {
            let allocated: Decimal = snapshot
                .allocations_for_deposit(deposit.id)
                .filter(|allocation| Some(allocation.withdrawal_id) != exclude)
                .map(|allocation| allocation.quantity)
                .sum();
            LotCapacity {
                deposit_id: deposit.id,
                deposit_date: deposit.deposit_date,
                quantity: deposit.quantity,
                remaining: deposit.quantity - allocated,
            }
        })
        .collect();
    lots.sort_by(|a, b| {
        a.deposit_date
            .cmp(&b.deposit_date)
            .then(a.deposit_id.cmp(&b.deposit_id))
    });
    lots
}

/// Lots of `key` that still have capacity to give, oldest first.
pub fn fifo_lots(
    snapshot: &Snapshot,
    key: &ProductKey,
    exclude: Option<WithdrawalId>,
) -> Vec<LotCapacity> {
    let mut lots = lot_capacities(snapshot, key, exclude);
    lots.retain(|lot| lot.remaining > Decimal::ZERO);
    lots
}

/// Walks `lots` oldest-first, taking `min(remaining, demand)` from each.
///
/// `lots` must already be in FIFO order (see [`fifo_lots`]).
pub fn plan(lots: &[LotCapacity], demand: Decimal) -> AllocationPlan {
    let mut shares = Vec::new();
    let mut remaining = demand;
    for lot in lots {
        if remaining <= Decimal::ZERO {
            break;
        }
        let take = lot.remaining.min(remaining);
        shares.push(LotShare {
            deposit_id: lot.deposit_id,
            deposit_date: lot.deposit_date,
            quantity: take,
        });
        remaining -= take;
    }
    AllocationPlan {
        shares,
        shortfall: remaining.max(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Allocation, Deposit};
    use crate::base::AllocationId;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn key() -> ProductKey {
        ProductKey::new("STK-1", "Widget", "pcs")
    }

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn lot(id: u64, day: u32, quantity: Decimal) -> Deposit {
        Deposit {
            id: DepositId(id),
            key: key(),
            quantity,
            deposit_date: ts(day),
            notes: None,
        }
    }

    fn allocation(id: u64, deposit: u64, withdrawal: u64, quantity: Decimal) -> Allocation {
        Allocation {
            id: AllocationId(id),
            deposit_id: DepositId(deposit),
            withdrawal_id: WithdrawalId(withdrawal),
            quantity,
            allocation_date: ts(10),
        }
    }

    #[test]
    fn oldest_lot_is_consumed_first() {
        let snapshot = Snapshot {
            deposits: vec![lot(1, 1, dec!(5.00)), lot(2, 5, dec!(5.00))],
            ..Snapshot::default()
        };
        let result = plan(&fifo_lots(&snapshot, &key(), None), dec!(7.00));

        assert_eq!(result.shares.len(), 2);
        assert_eq!(result.shares[0].deposit_id, DepositId(1));
        assert_eq!(result.shares[0].quantity, dec!(5.00));
        assert_eq!(result.shares[1].deposit_id, DepositId(2));
        assert_eq!(result.shares[1].quantity, dec!(2.00));
        assert!(result.is_complete());
    }

    #[test]
    fn tied_dates_break_on_id() {
        let snapshot = Snapshot {
            deposits: vec![lot(9, 1, dec!(3.00)), lot(2, 1, dec!(3.00))],
            ..Snapshot::default()
        };
        let lots = fifo_lots(&snapshot, &key(), None);
        assert_eq!(lots[0].deposit_id, DepositId(2));
        assert_eq!(lots[1].deposit_id, DepositId(9));
    }

    #[test]
    fn shortfall_reported_when_lots_run_out() {
        let snapshot = Snapshot {
            deposits: vec![lot(1, 1, dec!(3.00))],
            ..Snapshot::default()
        };
        let result = plan(&fifo_lots(&snapshot, &key(), None), dec!(10.00));
        assert_eq!(result.allocated(), dec!(3.00));
        assert_eq!(result.shortfall, dec!(7.00));
    }

    #[test]
    fn no_lots_means_full_shortfall() {
        let snapshot = Snapshot::default();
        let result = plan(&fifo_lots(&snapshot, &key(), None), dec!(4.00));
        assert!(result.shares.is_empty());
        assert_eq!(result.shortfall, dec!(4.00));
    }

    #[test]
    fn remaining_capacity_is_derived_from_live_allocations() {
        let snapshot = Snapshot {
            deposits: vec![lot(1, 1, dec!(10.00))],
            allocations: vec![allocation(1, 1, 1, dec!(4.00))],
            ..Snapshot::default()
        };
        let lots = fifo_lots(&snapshot, &key(), None);
        assert_eq!(lots[0].remaining, dec!(6.00));
    }

    #[test]
    fn exhausted_lots_are_skipped() {
        let snapshot = Snapshot {
            deposits: vec![lot(1, 1, dec!(4.00)), lot(2, 2, dec!(4.00))],
            allocations: vec![allocation(1, 1, 1, dec!(4.00))],
            ..Snapshot::default()
        };
        let lots = fifo_lots(&snapshot, &key(), None);
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].deposit_id, DepositId(2));
    }

    #[test]
    fn excluded_withdrawal_frees_its_capacity() {
        let snapshot = Snapshot {
            deposits: vec![lot(1, 1, dec!(10.00))],
            allocations: vec![
                allocation(1, 1, 1, dec!(4.00)),
                allocation(2, 1, 2, dec!(3.00)),
            ],
            ..Snapshot::default()
        };
        let lots = fifo_lots(&snapshot, &key(), Some(WithdrawalId(1)));
        // withdrawal 1's share is treated as reversed, withdrawal 2's is not
        assert_eq!(lots[0].remaining, dec!(7.00));
    }

    #[test]
    fn lot_capacities_keeps_exhausted_lots() {
        let snapshot = Snapshot {
            deposits: vec![lot(1, 1, dec!(4.00))],
            allocations: vec![allocation(1, 1, 1, dec!(4.00))],
            ..Snapshot::default()
        };
        let lots = lot_capacities(&snapshot, &key(), None);
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].remaining, Decimal::ZERO);
    }

    #[test]
    fn other_product_keys_are_ignored() {
        let other = Deposit {
            id: DepositId(7),
            key: ProductKey::new("STK-2", "Gadget", "pcs"),
            quantity: dec!(100.00),
            deposit_date: ts(1),
            notes: None,
        };
        let snapshot = Snapshot {
            deposits: vec![lot(1, 2, dec!(1.00)), other],
            ..Snapshot::default()
        };
        let lots = fifo_lots(&snapshot, &key(), None);
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].deposit_id, DepositId(1));
    }
}
