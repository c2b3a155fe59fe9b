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

//! Inventory ledger engine.
//!
//! The [`Engine`] is the single entry point for every ledger mutation. Writes
//! touching a product key hold that key's mutex, so two withdrawals can never
//! read the same lot capacity before either commits; writes on different keys
//! proceed in parallel. Each write is one atomic store commit: a withdrawal
//! and its allocation rows land together or not at all.
//!
//! Reads are served from one store snapshot per call. Display data may
//! therefore be briefly stale, which is acceptable; the write path is not
//! allowed that slack.

use crate::allocator::{self, AllocationPlan, LotCapacity, LotShare};
use crate::availability::{self, DailyMovement, Movement, StockLevel};
use crate::base::{AllocationId, DepositId, OrderId, ProductKey, WithdrawalId};
use crate::catalog;
use crate::error::LedgerError;
use crate::order::{self, Order, OrderItem};
use crate::record::{Allocation, Deposit, Withdrawal, normalize_quantity};
use crate::store::{MemoryStore, Op, Store, StoreError, Table};
use chrono::{NaiveDate, NaiveDateTime};
use dashmap::DashMap;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of recording (or re-recording) a withdrawal.
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalReceipt {
    pub withdrawal_id: WithdrawalId,
    /// Which lots funded the withdrawal, oldest first.
    pub shares: Vec<LotShare>,
    /// Demand the lots could not cover. Zero when fully allocated.
    pub shortfall: Decimal,
}

/// Replacement fields for a withdrawal edit.
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalEdit {
    pub key: ProductKey,
    pub quantity: Decimal,
    pub shop_name: String,
    pub withdrawal_date: NaiveDateTime,
    pub notes: Option<String>,
}

/// Replacement fields for a deposit edit.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositEdit {
    pub key: ProductKey,
    pub quantity: Decimal,
    pub deposit_date: NaiveDateTime,
    pub notes: Option<String>,
}

/// A requested order line.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub key: ProductKey,
    pub quantity: Decimal,
}

/// Outcome of placing an order: one withdrawal receipt per line.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub order_number: String,
    pub items: Vec<WithdrawalReceipt>,
}

/// Inventory ledger engine over an injected [`Store`].
///
/// # Invariants
///
/// - A lot's live allocations never sum past its original quantity.
/// - A withdrawal's live allocations never sum past its quantity; they reach
///   it exactly unless a shortfall was reported when it was recorded.
/// - Ledger records referenced by live allocations only change through the
///   reversal path.
pub struct Engine<S = MemoryStore> {
    store: S,
    /// One mutex per product key; write paths hold every key they touch.
    key_locks: DashMap<ProductKey, Arc<Mutex<()>>>,
}

impl Engine<MemoryStore> {
    /// Creates an engine over a fresh in-memory store.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Default for Engine<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Store> Engine<S> {
    /// Creates an engine over an injected store.
    pub fn with_store(store: S) -> Self {
        Engine {
            store,
            key_locks: DashMap::new(),
        }
    }

    fn key_lock(&self, key: &ProductKey) -> Arc<Mutex<()>> {
        self.key_locks.entry(key.clone()).or_default().clone()
    }

    /// Runs a store call, retrying once when the backend reports itself
    /// unavailable. A second failure is surfaced as-is: an unconfirmed write
    /// is reported failed, never assumed committed.
    fn with_retry<T>(&self, mut call: impl FnMut(&S) -> Result<T, StoreError>) -> Result<T, LedgerError> {
        match call(&self.store) {
            Err(StoreError::Unavailable) => {
                warn!("storage unavailable, retrying once");
                call(&self.store).map_err(LedgerError::from)
            }
            other => other.map_err(LedgerError::from),
        }
    }

    /// Builds the allocation rows for a planned withdrawal.
    fn allocation_ops(
        &self,
        withdrawal: &Withdrawal,
        plan: &AllocationPlan,
    ) -> Result<Vec<Op>, LedgerError> {
        let mut ops = Vec::with_capacity(plan.shares.len());
        for share in &plan.shares {
            let id = AllocationId(self.with_retry(|s| s.next_id(Table::Allocations))?);
            ops.push(Op::PutAllocation(Allocation {
                id,
                deposit_id: share.deposit_id,
                withdrawal_id: withdrawal.id,
                quantity: share.quantity,
                allocation_date: withdrawal.withdrawal_date,
            }));
        }
        Ok(ops)
    }

    // === Write path ===

    /// Records stock entering inventory as a new lot.
    pub fn record_deposit(
        &self,
        key: ProductKey,
        quantity: Decimal,
        deposit_date: NaiveDateTime,
        notes: Option<String>,
    ) -> Result<DepositId, LedgerError> {
        let quantity = normalize_quantity(quantity)?;
        let lock = self.key_lock(&key);
        let _guard = lock.lock();

        let id = DepositId(self.with_retry(|s| s.next_id(Table::Deposits))?);
        let deposit = Deposit {
            id,
            key,
            quantity,
            deposit_date,
            notes,
        };
        self.with_retry(|s| s.commit(vec![Op::PutDeposit(deposit.clone())]))?;
        debug!(deposit = %id, quantity = %quantity, "recorded deposit");
        Ok(id)
    }

    /// Records stock leaving inventory and allocates it against the oldest
    /// lots, atomically.
    ///
    /// An under-stocked key is not an error: the withdrawal is persisted with
    /// whatever the lots could cover and the receipt reports the shortfall.
    pub fn record_withdrawal(
        &self,
        key: ProductKey,
        quantity: Decimal,
        shop_name: &str,
        withdrawal_date: NaiveDateTime,
        notes: Option<String>,
    ) -> Result<WithdrawalReceipt, LedgerError> {
        let quantity = normalize_quantity(quantity)?;
        let lock = self.key_lock(&key);
        let _guard = lock.lock();

        let snapshot = self.with_retry(|s| s.snapshot())?;
        let id = WithdrawalId(self.with_retry(|s| s.next_id(Table::Withdrawals))?);
        let withdrawal = Withdrawal {
            id,
            key: key.clone(),
            quantity,
            shop_name: shop_name.to_owned(),
            withdrawal_date,
            notes,
        };

        let plan = allocator::plan(&allocator::fifo_lots(&snapshot, &key, None), quantity);
        let mut ops = vec![Op::PutWithdrawal(withdrawal.clone())];
        ops.extend(self.allocation_ops(&withdrawal, &plan)?);
        self.with_retry(|s| s.commit(ops.clone()))?;

        if !plan.shortfall.is_zero() {
            warn!(withdrawal = %id, shortfall = %plan.shortfall, "withdrawal under-allocated");
        }
        debug!(withdrawal = %id, lots = plan.shares.len(), "recorded withdrawal");
        Ok(WithdrawalReceipt {
            withdrawal_id: id,
            shares: plan.shares,
            shortfall: plan.shortfall,
        })
    }

    /// Rewrites a withdrawal: its prior allocations are reversed and the new
    /// demand replanned against the freed capacity, in one commit.
    ///
    /// Editing a withdrawal back to identical fields reproduces the identical
    /// allocation set.
    pub fn edit_withdrawal(
        &self,
        id: WithdrawalId,
        edit: WithdrawalEdit,
    ) -> Result<WithdrawalReceipt, LedgerError> {
        let quantity = normalize_quantity(edit.quantity)?;
        loop {
            let peek = self.with_retry(|s| s.snapshot())?;
            let current_key = peek
                .withdrawal(id)
                .ok_or(LedgerError::UnknownWithdrawal(id))?
                .key
                .clone();

            let mut keys = vec![current_key.clone(), edit.key.clone()];
            keys.sort();
            keys.dedup();
            let locks: Vec<_> = keys.iter().map(|key| self.key_lock(key)).collect();
            let _guards: Vec<_> = locks.iter().map(|lock| lock.lock()).collect();

            let snapshot = self.with_retry(|s| s.snapshot())?;
            let existing = snapshot
                .withdrawal(id)
                .ok_or(LedgerError::UnknownWithdrawal(id))?;
            if existing.key != current_key {
                // key moved between peek and lock; take the locks again
                continue;
            }

            let updated = Withdrawal {
                id,
                key: edit.key.clone(),
                quantity,
                shop_name: edit.shop_name.clone(),
                withdrawal_date: edit.withdrawal_date,
                notes: edit.notes.clone(),
            };
            let plan = allocator::plan(
                &allocator::fifo_lots(&snapshot, &edit.key, Some(id)),
                quantity,
            );

            let mut ops: Vec<Op> = snapshot
                .allocations_for_withdrawal(id)
                .map(|allocation| Op::DeleteAllocation(allocation.id))
                .collect();
            ops.push(Op::PutWithdrawal(updated.clone()));
            ops.extend(self.allocation_ops(&updated, &plan)?);
            self.with_retry(|s| s.commit(ops.clone()))?;

            if !plan.shortfall.is_zero() {
                warn!(withdrawal = %id, shortfall = %plan.shortfall, "withdrawal under-allocated");
            }
            debug!(withdrawal = %id, "reallocated withdrawal");
            return Ok(WithdrawalReceipt {
                withdrawal_id: id,
                shares: plan.shares,
                shortfall: plan.shortfall,
            });
        }
    }

    /// Deletes a withdrawal, releasing its allocations in the same commit.
    pub fn delete_withdrawal(&self, id: WithdrawalId) -> Result<(), LedgerError> {
        loop {
            let peek = self.with_retry(|s| s.snapshot())?;
            let current_key = peek
                .withdrawal(id)
                .ok_or(LedgerError::UnknownWithdrawal(id))?
                .key
                .clone();
            let lock = self.key_lock(&current_key);
            let _guard = lock.lock();

            let snapshot = self.with_retry(|s| s.snapshot())?;
            let existing = snapshot
                .withdrawal(id)
                .ok_or(LedgerError::UnknownWithdrawal(id))?;
            if existing.key != current_key {
                continue;
            }

            let mut ops: Vec<Op> = snapshot
                .allocations_for_withdrawal(id)
                .map(|allocation| Op::DeleteAllocation(allocation.id))
                .collect();
            ops.push(Op::DeleteWithdrawal(id));
            self.with_retry(|s| s.commit(ops.clone()))?;
            debug!(withdrawal = %id, "deleted withdrawal");
            return Ok(());
        }
    }

    /// Rewrites a deposit.
    ///
    /// While live allocations reference the lot, the key must stay fixed and
    /// the new quantity must still cover the allocated sum; otherwise the
    /// blocking withdrawals are reported and nothing changes.
    pub fn edit_deposit(&self, id: DepositId, edit: DepositEdit) -> Result<(), LedgerError> {
        let quantity = normalize_quantity(edit.quantity)?;
        loop {
            let peek = self.with_retry(|s| s.snapshot())?;
            let current_key = peek
                .deposit(id)
                .ok_or(LedgerError::UnknownDeposit(id))?
                .key
                .clone();

            let mut keys = vec![current_key.clone(), edit.key.clone()];
            keys.sort();
            keys.dedup();
            let locks: Vec<_> = keys.iter().map(|key| self.key_lock(key)).collect();
            let _guards: Vec<_> = locks.iter().map(|lock| lock.lock()).collect();

            let snapshot = self.with_retry(|s| s.snapshot())?;
            let existing = snapshot.deposit(id).ok_or(LedgerError::UnknownDeposit(id))?;
            if existing.key != current_key {
                continue;
            }

            let mut blockers: Vec<WithdrawalId> = snapshot
                .allocations_for_deposit(id)
                .map(|allocation| allocation.withdrawal_id)
                .collect();
            blockers.sort();
            blockers.dedup();
            let allocated: Decimal = snapshot
                .allocations_for_deposit(id)
                .map(|allocation| allocation.quantity)
                .sum();
            if !blockers.is_empty() && (edit.key != existing.key || quantity < allocated) {
                return Err(LedgerError::DepositInUse {
                    deposit: id,
                    withdrawals: blockers,
                });
            }

            let updated = Deposit {
                id,
                key: edit.key.clone(),
                quantity,
                deposit_date: edit.deposit_date,
                notes: edit.notes.clone(),
            };
            self.with_retry(|s| s.commit(vec![Op::PutDeposit(updated.clone())]))?;
            debug!(deposit = %id, "edited deposit");
            return Ok(());
        }
    }

    /// Deletes an unreferenced lot.
    ///
    /// Refused while live allocations reference it; the blocking withdrawal
    /// ids are reported so the caller can resolve them first.
    pub fn delete_deposit(&self, id: DepositId) -> Result<(), LedgerError> {
        loop {
            let peek = self.with_retry(|s| s.snapshot())?;
            let current_key = peek
                .deposit(id)
                .ok_or(LedgerError::UnknownDeposit(id))?
                .key
                .clone();
            let lock = self.key_lock(&current_key);
            let _guard = lock.lock();

            let snapshot = self.with_retry(|s| s.snapshot())?;
            let existing = snapshot.deposit(id).ok_or(LedgerError::UnknownDeposit(id))?;
            if existing.key != current_key {
                continue;
            }

            let mut blockers: Vec<WithdrawalId> = snapshot
                .allocations_for_deposit(id)
                .map(|allocation| allocation.withdrawal_id)
                .collect();
            blockers.sort();
            blockers.dedup();
            if !blockers.is_empty() {
                return Err(LedgerError::DepositInUse {
                    deposit: id,
                    withdrawals: blockers,
                });
            }

            self.with_retry(|s| s.commit(vec![Op::DeleteDeposit(id)]))?;
            debug!(deposit = %id, "deleted deposit");
            return Ok(());
        }
    }

    /// Places an order: the order row, one withdrawal per line, and every
    /// allocation land in a single commit.
    ///
    /// Lines allocate in the given sequence, so a later line for the same key
    /// sees the capacity already claimed by an earlier one.
    pub fn place_order(
        &self,
        shop_name: &str,
        lines: Vec<OrderLine>,
        order_date: NaiveDateTime,
        notes: Option<String>,
        order_number: Option<String>,
    ) -> Result<OrderReceipt, LedgerError> {
        if lines.is_empty() {
            return Err(LedgerError::EmptyOrder);
        }
        let mut normalized = Vec::with_capacity(lines.len());
        for line in &lines {
            normalized.push((line.key.clone(), normalize_quantity(line.quantity)?));
        }

        let mut keys: Vec<ProductKey> = normalized.iter().map(|(key, _)| key.clone()).collect();
        keys.sort();
        keys.dedup();
        let locks: Vec<_> = keys.iter().map(|key| self.key_lock(key)).collect();
        let _guards: Vec<_> = locks.iter().map(|lock| lock.lock()).collect();

        let snapshot = self.with_retry(|s| s.snapshot())?;
        let order_number = match order_number {
            Some(number) => {
                if snapshot.orders.iter().any(|order| order.order_number == number) {
                    return Err(LedgerError::DuplicateOrderNumber(number));
                }
                number
            }
            None => order::format_order_number(self.with_retry(|s| s.next_id(Table::OrderNumbers))?),
        };
        let order_id = OrderId(self.with_retry(|s| s.next_id(Table::Orders))?);

        // Working view that accumulates this order's own rows, so each line
        // plans against the capacity left by the previous ones.
        let mut working = snapshot;
        let mut ops: Vec<Op> = Vec::new();
        let mut items = Vec::with_capacity(normalized.len());
        let mut receipts = Vec::with_capacity(normalized.len());
        for (key, quantity) in normalized {
            let withdrawal_id = WithdrawalId(self.with_retry(|s| s.next_id(Table::Withdrawals))?);
            let withdrawal = Withdrawal {
                id: withdrawal_id,
                key: key.clone(),
                quantity,
                shop_name: shop_name.to_owned(),
                withdrawal_date: order_date,
                notes: None,
            };
            let plan = allocator::plan(&allocator::fifo_lots(&working, &key, None), quantity);
            ops.push(Op::PutWithdrawal(withdrawal.clone()));
            let allocation_ops = self.allocation_ops(&withdrawal, &plan)?;
            for op in &allocation_ops {
                if let Op::PutAllocation(allocation) = op {
                    working.allocations.push(allocation.clone());
                }
            }
            working.withdrawals.push(withdrawal);
            ops.extend(allocation_ops);

            items.push(OrderItem {
                key,
                quantity,
                withdrawal_id,
            });
            receipts.push(WithdrawalReceipt {
                withdrawal_id,
                shares: plan.shares,
                shortfall: plan.shortfall,
            });
        }

        let order = Order {
            id: order_id,
            order_number: order_number.clone(),
            shop_name: shop_name.to_owned(),
            order_date,
            notes,
            items,
        };
        ops.push(Op::PutOrder(order));
        self.with_retry(|s| s.commit(ops.clone()))?;

        for receipt in &receipts {
            if !receipt.shortfall.is_zero() {
                warn!(
                    order = %order_number,
                    withdrawal = %receipt.withdrawal_id,
                    shortfall = %receipt.shortfall,
                    "order line under-allocated"
                );
            }
        }
        debug!(order = %order_number, lines = receipts.len(), "placed order");
        Ok(OrderReceipt {
            order_id,
            order_number,
            items: receipts,
        })
    }

    /// Deletes an order, reversing every item withdrawal it still owns.
    pub fn delete_order(&self, id: OrderId) -> Result<(), LedgerError> {
        loop {
            let peek = self.with_retry(|s| s.snapshot())?;
            let order = peek.order(id).ok_or(LedgerError::UnknownOrder(id))?.clone();

            let mut keys: Vec<ProductKey> =
                order.items.iter().map(|item| item.key.clone()).collect();
            for item in &order.items {
                if let Some(withdrawal) = peek.withdrawal(item.withdrawal_id) {
                    keys.push(withdrawal.key.clone());
                }
            }
            keys.sort();
            keys.dedup();
            let locks: Vec<_> = keys.iter().map(|key| self.key_lock(key)).collect();
            let _guards: Vec<_> = locks.iter().map(|lock| lock.lock()).collect();

            let snapshot = self.with_retry(|s| s.snapshot())?;
            let order = snapshot
                .order(id)
                .ok_or(LedgerError::UnknownOrder(id))?
                .clone();

            let mut ops: Vec<Op> = Vec::new();
            let mut stale = false;
            for item in &order.items {
                // Item withdrawals deleted directly beforehand just leave the
                // item as a historical line.
                if let Some(withdrawal) = snapshot.withdrawal(item.withdrawal_id) {
                    if !keys.contains(&withdrawal.key) {
                        stale = true;
                        break;
                    }
                    ops.extend(
                        snapshot
                            .allocations_for_withdrawal(withdrawal.id)
                            .map(|allocation| Op::DeleteAllocation(allocation.id)),
                    );
                    ops.push(Op::DeleteWithdrawal(withdrawal.id));
                }
            }
            if stale {
                continue;
            }
            ops.push(Op::DeleteOrder(id));
            self.with_retry(|s| s.commit(ops.clone()))?;
            debug!(order = %order.order_number, "deleted order");
            return Ok(());
        }
    }

    // === Read path ===

    /// Logical on-hand balance for a key; aggregate, independent of which
    /// lots were allocated.
    pub fn net_quantity(&self, key: &ProductKey) -> Result<Decimal, LedgerError> {
        let snapshot = self.with_retry(|s| s.snapshot())?;
        Ok(availability::net_quantity(&snapshot, key))
    }

    /// Every lot of a key with its derived remaining capacity, oldest first.
    /// Exhausted lots are included so audit views see the full trail.
    pub fn lot_history(&self, key: &ProductKey) -> Result<Vec<LotCapacity>, LedgerError> {
        let snapshot = self.with_retry(|s| s.snapshot())?;
        Ok(allocator::lot_capacities(&snapshot, key, None))
    }

    /// Which lots funded a withdrawal, oldest first.
    pub fn allocation_detail(&self, id: WithdrawalId) -> Result<Vec<LotShare>, LedgerError> {
        let snapshot = self.with_retry(|s| s.snapshot())?;
        snapshot
            .withdrawal(id)
            .ok_or(LedgerError::UnknownWithdrawal(id))?;

        let mut shares = Vec::new();
        for allocation in snapshot.allocations_for_withdrawal(id) {
            // a live allocation pins its deposit row (delete_deposit refuses)
            let Some(deposit) = snapshot.deposit(allocation.deposit_id) else {
                return Err(LedgerError::Storage(StoreError::NotFound {
                    table: Table::Deposits,
                    id: allocation.deposit_id.0,
                }));
            };
            shares.push(LotShare {
                deposit_id: allocation.deposit_id,
                deposit_date: deposit.deposit_date,
                quantity: allocation.quantity,
            });
        }
        shares.sort_by(|a, b| {
            a.deposit_date
                .cmp(&b.deposit_date)
                .then(a.deposit_id.cmp(&b.deposit_id))
        });
        Ok(shares)
    }

    /// Distinct product keys seen on any deposit or withdrawal.
    pub fn suggest_products(&self) -> Result<Vec<ProductKey>, LedgerError> {
        let snapshot = self.with_retry(|s| s.snapshot())?;
        Ok(catalog::suggest_products(&snapshot))
    }

    /// Full key for a stock code, if one has been seen.
    pub fn resolve_stock_code(&self, stock_code: &str) -> Result<Option<ProductKey>, LedgerError> {
        let snapshot = self.with_retry(|s| s.snapshot())?;
        Ok(catalog::resolve_stock_code(&snapshot, stock_code))
    }

    /// Distinct shop names seen on orders and withdrawals.
    pub fn shop_names(&self) -> Result<Vec<String>, LedgerError> {
        let snapshot = self.with_retry(|s| s.snapshot())?;
        Ok(catalog::shop_names(&snapshot))
    }

    /// Withdrawal total for a key within `[from, to)`.
    pub fn monthly_consumption(
        &self,
        key: &ProductKey,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Decimal, LedgerError> {
        let snapshot = self.with_retry(|s| s.snapshot())?;
        Ok(availability::monthly_consumption(&snapshot, key, from, to))
    }

    /// Inventory overview rows with low-stock flags, relative to `reference`.
    pub fn stock_levels(&self, reference: NaiveDate) -> Result<Vec<StockLevel>, LedgerError> {
        let snapshot = self.with_retry(|s| s.snapshot())?;
        Ok(availability::stock_levels(&snapshot, reference))
    }

    /// Movement history for a key, newest first, with running balances.
    pub fn movements(
        &self,
        key: &ProductKey,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Movement>, LedgerError> {
        let snapshot = self.with_retry(|s| s.snapshot())?;
        Ok(availability::movements(&snapshot, key, from, to))
    }

    /// Zero-filled per-day totals for the window ending at `until`.
    pub fn daily_movements(
        &self,
        key: &ProductKey,
        until: NaiveDate,
        days: u32,
    ) -> Result<Vec<DailyMovement>, LedgerError> {
        let snapshot = self.with_retry(|s| s.snapshot())?;
        Ok(availability::daily_movements(&snapshot, key, until, days))
    }

    /// All orders, newest first, optionally filtered by shop.
    pub fn orders(&self, shop_name: Option<&str>) -> Result<Vec<Order>, LedgerError> {
        let snapshot = self.with_retry(|s| s.snapshot())?;
        let mut orders: Vec<Order> = snapshot
            .orders
            .into_iter()
            .filter(|order| shop_name.is_none_or(|shop| order.shop_name == shop))
            .collect();
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    /// Looks an order up by its number.
    pub fn find_order(&self, order_number: &str) -> Result<Option<Order>, LedgerError> {
        let snapshot = self.with_retry(|s| s.snapshot())?;
        Ok(snapshot
            .orders
            .into_iter()
            .find(|order| order.order_number == order_number))
    }
}
