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

//! Aggregate stock math over a ledger snapshot.
//!
//! The headline balance is purely aggregate: deposits in minus withdrawals
//! out, regardless of which lots were allocated. Lot-level remaining
//! capacity lives in the allocator and is a separate derived value.

use crate::base::ProductKey;
use crate::store::Snapshot;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

/// Logical on-hand balance for a key. May go negative when more stock was
/// withdrawn than ever deposited.
pub fn net_quantity(snapshot: &Snapshot, key: &ProductKey) -> Decimal {
    let deposited: Decimal = snapshot
        .deposits
        .iter()
        .filter(|deposit| &deposit.key == key)
        .map(|deposit| deposit.quantity)
        .sum();
    let withdrawn: Decimal = snapshot
        .withdrawals
        .iter()
        .filter(|withdrawal| &withdrawal.key == key)
        .map(|withdrawal| withdrawal.quantity)
        .sum();
    deposited - withdrawn
}

/// Withdrawal total for `key` with `from <= withdrawal_date < to`.
pub fn monthly_consumption(
    snapshot: &Snapshot,
    key: &ProductKey,
    from: NaiveDate,
    to: NaiveDate,
) -> Decimal {
    snapshot
        .withdrawals
        .iter()
        .filter(|withdrawal| &withdrawal.key == key)
        .filter(|withdrawal| {
            let date = withdrawal.withdrawal_date.date();
            date >= from && date < to
        })
        .map(|withdrawal| withdrawal.quantity)
        .sum()
}

/// Bounds of the calendar month preceding the one containing `reference`,
/// as a half-open `[first day of last month, first day of this month)`.
pub fn previous_month_bounds(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let this_month = reference.with_day(1).unwrap(); // day 1 always exists
    let (year, month) = if this_month.month() == 1 {
        (this_month.year() - 1, 12)
    } else {
        (this_month.year(), this_month.month() - 1)
    };
    let last_month = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    (last_month, this_month)
}

/// One row of the inventory overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockLevel {
    pub key: ProductKey,
    pub on_hand: Decimal,
    /// What the previous calendar month consumed.
    pub previous_month_consumption: Decimal,
    pub first_deposit_date: NaiveDateTime,
    /// Balance dropped below last month's consumption.
    pub reorder_needed: bool,
}

/// Inventory overview: one row per key holding a positive balance, ordered
/// by first deposit date.
pub fn stock_levels(snapshot: &Snapshot, reference: NaiveDate) -> Vec<StockLevel> {
    let (from, to) = previous_month_bounds(reference);
    let keys: BTreeSet<&ProductKey> = snapshot.deposits.iter().map(|d| &d.key).collect();

    let mut rows = Vec::new();
    for key in keys {
        let on_hand = net_quantity(snapshot, key);
        if on_hand <= Decimal::ZERO {
            continue;
        }
        let Some(first_deposit_date) = snapshot
            .deposits
            .iter()
            .filter(|deposit| &deposit.key == key)
            .map(|deposit| deposit.deposit_date)
            .min()
        else {
            continue;
        };
        let consumed = monthly_consumption(snapshot, key, from, to);
        rows.push(StockLevel {
            key: key.clone(),
            on_hand,
            previous_month_consumption: consumed,
            first_deposit_date,
            reorder_needed: on_hand < consumed,
        });
    }
    rows.sort_by(|a, b| a.first_deposit_date.cmp(&b.first_deposit_date));
    rows
}

/// Direction of a ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MovementKind {
    Deposit,
    Withdrawal,
}

/// One ledger movement for a key, with the balance right after it applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movement {
    pub id: u64,
    pub kind: MovementKind,
    pub date: NaiveDateTime,
    pub quantity: Decimal,
    pub balance_after: Decimal,
}

/// Movement history for `key`, newest first.
///
/// The running balance is accumulated over the full history before the date
/// filter applies, so a filtered view still shows truthful balances.
pub fn movements(
    snapshot: &Snapshot,
    key: &ProductKey,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<Movement> {
    let mut entries: Vec<(u64, MovementKind, NaiveDateTime, Decimal)> = snapshot
        .deposits
        .iter()
        .filter(|deposit| &deposit.key == key)
        .map(|d| (d.id.0, MovementKind::Deposit, d.deposit_date, d.quantity))
        .chain(
            snapshot
                .withdrawals
                .iter()
                .filter(|withdrawal| &withdrawal.key == key)
                .map(|w| (w.id.0, MovementKind::Withdrawal, w.withdrawal_date, w.quantity)),
        )
        .collect();
    entries.sort_by_key(|(id, kind, date, _)| {
        (*date, matches!(*kind, MovementKind::Withdrawal), *id)
    });

    let mut balance = Decimal::ZERO;
    let mut rows = Vec::with_capacity(entries.len());
    for (id, kind, date, quantity) in entries {
        match kind {
            MovementKind::Deposit => balance += quantity,
            MovementKind::Withdrawal => balance -= quantity,
        }
        rows.push(Movement {
            id,
            kind,
            date,
            quantity,
            balance_after: balance,
        });
    }

    if let Some(from) = from {
        rows.retain(|movement| movement.date.date() >= from);
    }
    if let Some(to) = to {
        rows.retain(|movement| movement.date.date() <= to);
    }
    rows.reverse();
    rows
}

/// Per-day deposit and withdrawal totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMovement {
    pub date: NaiveDate,
    pub deposited: Decimal,
    pub withdrawn: Decimal,
}

/// Zero-filled daily totals for the `days`-long window ending at `until`
/// inclusive. Chart data for the stock movement graph.
pub fn daily_movements(
    snapshot: &Snapshot,
    key: &ProductKey,
    until: NaiveDate,
    days: u32,
) -> Vec<DailyMovement> {
    let days = days.max(1);
    let start = until - Duration::days(i64::from(days) - 1);
    let mut rows: Vec<DailyMovement> = (0..days)
        .map(|offset| DailyMovement {
            date: start + Duration::days(i64::from(offset)),
            deposited: Decimal::ZERO,
            withdrawn: Decimal::ZERO,
        })
        .collect();

    let day_index = |date: NaiveDate| -> Option<usize> {
        let offset = (date - start).num_days();
        (0..i64::from(days)).contains(&offset).then_some(offset as usize)
    };

    for deposit in snapshot.deposits.iter().filter(|d| &d.key == key) {
        if let Some(index) = day_index(deposit.deposit_date.date()) {
            rows[index].deposited += deposit.quantity;
        }
    }
    for withdrawal in snapshot.withdrawals.iter().filter(|w| &w.key == key) {
        if let Some(index) = day_index(withdrawal.withdrawal_date.date()) {
            rows[index].withdrawn += withdrawal.quantity;
        }
    }
    rows
}
