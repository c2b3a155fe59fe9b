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

//! Ledger record types.
//!
//! Deposits and withdrawals are append-only; once an allocation references
//! them they may only change through the engine's reversal path. A deposit's
//! `quantity` is the amount originally received and is never decremented:
//! remaining lot capacity is always derived from the live allocation rows.

use crate::base::{AllocationId, DepositId, ProductKey, WithdrawalId};
use crate::error::LedgerError;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fixed-point precision for every quantity field.
pub const QUANTITY_PRECISION: u32 = 2;

/// Validates and normalizes a quantity before it enters the ledger.
///
/// Non-positive quantities are rejected; valid ones are rounded to
/// [`QUANTITY_PRECISION`] decimal places (banker's rounding).
pub fn normalize_quantity(quantity: Decimal) -> Result<Decimal, LedgerError> {
    if quantity <= Decimal::ZERO {
        return Err(LedgerError::InvalidQuantity);
    }
    Ok(quantity.round_dp(QUANTITY_PRECISION))
}

/// Parses the `YYYY-MM-DD HH:MM:SS` timestamps used by import files.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, LedgerError> {
    NaiveDateTime::parse_from_str(input.trim(), "%Y-%m-%d %H:%M:%S")
        .map_err(|_| LedgerError::InvalidDate)
}

/// Stock entering inventory: one lot with its own receipt date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: DepositId,
    pub key: ProductKey,
    /// Original received amount, immutable under allocation.
    pub quantity: Decimal,
    pub deposit_date: NaiveDateTime,
    pub notes: Option<String>,
}

/// Stock leaving inventory, to be satisfied by one or more lots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: WithdrawalId,
    pub key: ProductKey,
    pub quantity: Decimal,
    pub shop_name: String,
    pub withdrawal_date: NaiveDateTime,
    pub notes: Option<String>,
}

/// How much of a withdrawal one lot satisfied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: AllocationId,
    pub deposit_id: DepositId,
    pub withdrawal_id: WithdrawalId,
    pub quantity: Decimal,
    pub allocation_date: NaiveDateTime,
}
