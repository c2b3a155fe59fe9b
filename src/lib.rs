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

//! # Stocklot
//!
//! This library provides an inventory ledger with first-in-first-out lot
//! allocation. Stock enters as deposit lots and leaves as withdrawals; every
//! withdrawal is funded by the oldest lots with capacity left, and that
//! decision is recorded durably so it can be displayed, audited, reversed,
//! and re-applied when the withdrawal is edited or deleted.
//!
//! ## Core Components
//!
//! - [`Engine`]: Single entry point for ledger writes and reads
//! - [`ProductKey`]: Identity triple (stock code, product name, unit)
//! - [`Store`]: Typed storage seam (in-memory by default via [`MemoryStore`])
//! - [`allocator`]: The FIFO planning algorithm itself
//! - [`availability`]: Balances, consumption windows, low-stock flags
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use stocklot::{Engine, ProductKey};
//!
//! let engine = Engine::new();
//! let key = ProductKey::new("STK-1", "Widget", "pcs");
//! let date = NaiveDate::from_ymd_opt(2024, 1, 1)
//!     .unwrap()
//!     .and_hms_opt(9, 0, 0)
//!     .unwrap();
//!
//! engine.record_deposit(key.clone(), dec!(5.00), date, None).unwrap();
//! let receipt = engine
//!     .record_withdrawal(key.clone(), dec!(3.00), "Main Street", date, None)
//!     .unwrap();
//!
//! assert!(receipt.shortfall.is_zero());
//! assert_eq!(engine.net_quantity(&key).unwrap(), dec!(2.00));
//! ```
//!
//! ## Thread Safety
//!
//! Writes for one product key are serialized behind a per-key lock so two
//! withdrawals can never over-commit the same lot; writes on different keys
//! proceed in parallel. Display reads come from store snapshots and tolerate
//! brief staleness.

pub mod allocator;
pub mod availability;
pub mod base;
pub mod catalog;
mod engine;
pub mod error;
pub mod order;
mod record;
pub mod store;

pub use allocator::{AllocationPlan, LotCapacity, LotShare};
pub use availability::{DailyMovement, Movement, MovementKind, StockLevel};
pub use base::{AllocationId, DepositId, OrderId, ProductKey, WithdrawalId};
pub use engine::{
    DepositEdit, Engine, OrderLine, OrderReceipt, WithdrawalEdit, WithdrawalReceipt,
};
pub use error::LedgerError;
pub use order::{Order, OrderItem};
pub use record::{
    Allocation, Deposit, QUANTITY_PRECISION, Withdrawal, normalize_quantity, parse_timestamp,
};
pub use store::{MemoryStore, Op, Snapshot, Store, StoreError, Table};
