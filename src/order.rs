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

//! Orders and their items.
//!
//! Orders trigger withdrawals but carry no allocation logic of their own:
//! each item produces exactly one withdrawal, and the allocator treats those
//! withdrawals like any manually entered one.

use crate::base::{OrderId, ProductKey, WithdrawalId};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of an order. The withdrawal it spawned carries the ledger effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub key: ProductKey,
    pub quantity: Decimal,
    pub withdrawal_id: WithdrawalId,
}

/// A shop order grouping one or more item withdrawals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Caller-supplied or generated; unique across all orders.
    pub order_number: String,
    pub shop_name: String,
    pub order_date: NaiveDateTime,
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_quantity(&self) -> Decimal {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Formats a generated order number from the store's sequence.
pub(crate) fn format_order_number(seq: u64) -> String {
    format!("ORD{seq:04}")
}
