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

//! Durable ledger tables behind a typed command interface.
//!
//! [`Store`] replaces ad-hoc query strings with explicit commands: callers
//! reserve ids, build a batch of [`Op`]s and commit it atomically, and read
//! through a consistent [`Snapshot`]. The trait is the storage seam: the
//! engine receives a store as an injected dependency instead of holding a
//! process-wide connection, and tests inject failing stores through the same
//! seam.

use crate::base::{AllocationId, DepositId, OrderId, WithdrawalId};
use crate::order::Order;
use crate::record::{Allocation, Deposit, Withdrawal};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Ledger tables and id sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Deposits,
    Withdrawals,
    Allocations,
    Orders,
    /// Human-facing order number sequence, distinct from order ids.
    OrderNumbers,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::Deposits => "deposits",
            Table::Withdrawals => "withdrawals",
            Table::Allocations => "allocations",
            Table::Orders => "orders",
            Table::OrderNumbers => "order_numbers",
        };
        write!(f, "{name}")
    }
}

/// Storage-layer failures, mapped to [`crate::LedgerError`] by the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend could not be reached
    #[error("storage backend unavailable")]
    Unavailable,

    /// A command referenced a row that does not exist
    #[error("no {table} row with id {id}")]
    NotFound { table: Table, id: u64 },
}

/// A single write command. Batches of these commit atomically.
#[derive(Debug, Clone)]
pub enum Op {
    PutDeposit(Deposit),
    PutWithdrawal(Withdrawal),
    PutAllocation(Allocation),
    PutOrder(Order),
    DeleteDeposit(DepositId),
    DeleteWithdrawal(WithdrawalId),
    DeleteAllocation(AllocationId),
    DeleteOrder(OrderId),
}

/// Consistent read view of every table, rows in id order.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub deposits: Vec<Deposit>,
    pub withdrawals: Vec<Withdrawal>,
    pub allocations: Vec<Allocation>,
    pub orders: Vec<Order>,
}

impl Snapshot {
    pub fn deposit(&self, id: DepositId) -> Option<&Deposit> {
        self.deposits.iter().find(|deposit| deposit.id == id)
    }

    pub fn withdrawal(&self, id: WithdrawalId) -> Option<&Withdrawal> {
        self.withdrawals.iter().find(|withdrawal| withdrawal.id == id)
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == id)
    }

    pub fn allocations_for_withdrawal(
        &self,
        id: WithdrawalId,
    ) -> impl Iterator<Item = &Allocation> {
        self.allocations
            .iter()
            .filter(move |allocation| allocation.withdrawal_id == id)
    }

    pub fn allocations_for_deposit(&self, id: DepositId) -> impl Iterator<Item = &Allocation> {
        self.allocations
            .iter()
            .filter(move |allocation| allocation.deposit_id == id)
    }
}

/// Typed storage seam for the ledger.
pub trait Store: Send + Sync {
    /// Reserves the next id in a sequence.
    ///
    /// Ids burned by failed commits are never reused, matching how database
    /// sequences behave.
    fn next_id(&self, table: Table) -> Result<u64, StoreError>;

    /// Applies a batch of commands: either every op is applied or none are.
    fn commit(&self, ops: Vec<Op>) -> Result<(), StoreError>;

    /// Returns a consistent copy of all tables.
    fn snapshot(&self) -> Result<Snapshot, StoreError>;
}

#[derive(Debug, Default)]
struct TablesData {
    deposits: BTreeMap<u64, Deposit>,
    withdrawals: BTreeMap<u64, Withdrawal>,
    allocations: BTreeMap<u64, Allocation>,
    orders: BTreeMap<u64, Order>,
}

/// In-process [`Store`] keeping every table under one lock.
#[derive(Debug)]
pub struct MemoryStore {
    tables: Mutex<TablesData>,
    deposit_seq: AtomicU64,
    withdrawal_seq: AtomicU64,
    allocation_seq: AtomicU64,
    order_seq: AtomicU64,
    order_number_seq: AtomicU64,
}

impl MemoryStore {
    const FIRST_ORDER_NUMBER: u64 = 1001;

    pub fn new() -> Self {
        Self {
            tables: Mutex::new(TablesData::default()),
            deposit_seq: AtomicU64::new(1),
            withdrawal_seq: AtomicU64::new(1),
            allocation_seq: AtomicU64::new(1),
            order_seq: AtomicU64::new(1),
            order_number_seq: AtomicU64::new(Self::FIRST_ORDER_NUMBER),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn next_id(&self, table: Table) -> Result<u64, StoreError> {
        let seq = match table {
            Table::Deposits => &self.deposit_seq,
            Table::Withdrawals => &self.withdrawal_seq,
            Table::Allocations => &self.allocation_seq,
            Table::Orders => &self.order_seq,
            Table::OrderNumbers => &self.order_number_seq,
        };
        Ok(seq.fetch_add(1, Ordering::Relaxed))
    }

    fn commit(&self, ops: Vec<Op>) -> Result<(), StoreError> {
        let mut tables = self.tables.lock();

        // Validate every delete before touching anything, so a bad batch
        // leaves the tables exactly as they were.
        for op in &ops {
            let missing = match op {
                Op::DeleteDeposit(id) if !tables.deposits.contains_key(&id.0) => {
                    Some((Table::Deposits, id.0))
                }
                Op::DeleteWithdrawal(id) if !tables.withdrawals.contains_key(&id.0) => {
                    Some((Table::Withdrawals, id.0))
                }
                Op::DeleteAllocation(id) if !tables.allocations.contains_key(&id.0) => {
                    Some((Table::Allocations, id.0))
                }
                Op::DeleteOrder(id) if !tables.orders.contains_key(&id.0) => {
                    Some((Table::Orders, id.0))
                }
                _ => None,
            };
            if let Some((table, id)) = missing {
                return Err(StoreError::NotFound { table, id });
            }
        }

        for op in ops {
            match op {
                Op::PutDeposit(deposit) => {
                    tables.deposits.insert(deposit.id.0, deposit);
                }
                Op::PutWithdrawal(withdrawal) => {
                    tables.withdrawals.insert(withdrawal.id.0, withdrawal);
                }
                Op::PutAllocation(allocation) => {
                    tables.allocations.insert(allocation.id.0, allocation);
                }
                Op::PutOrder(order) => {
                    tables.orders.insert(order.id.0, order);
                }
                Op::DeleteDeposit(id) => {
                    tables.deposits.remove(&id.0);
                }
                Op::DeleteWithdrawal(id) => {
                    tables.withdrawals.remove(&id.0);
                }
                Op::DeleteAllocation(id) => {
                    tables.allocations.remove(&id.0);
                }
                Op::DeleteOrder(id) => {
                    tables.orders.remove(&id.0);
                }
            }
        }

        Ok(())
    }

    fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let tables = self.tables.lock();
        Ok(Snapshot {
            deposits: tables.deposits.values().cloned().collect(),
            withdrawals: tables.withdrawals.values().cloned().collect(),
            allocations: tables.allocations.values().cloned().collect(),
            orders: tables.orders.values().cloned().collect(),
        })
    }
}
