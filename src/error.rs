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

//! Error types for ledger operations.
//!
//! An under-allocated withdrawal (shortfall) is deliberately *not* an error:
//! it is a field on the receipt that callers must surface to the operator.

use crate::base::{DepositId, OrderId, WithdrawalId};
use crate::store::StoreError;
use thiserror::Error;

/// Ledger operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Quantity is zero or negative
    #[error("invalid quantity (must be positive)")]
    InvalidQuantity,

    /// Timestamp string could not be parsed
    #[error("invalid date (expected YYYY-MM-DD HH:MM:SS)")]
    InvalidDate,

    /// Referenced deposit does not exist
    #[error("deposit {0} not found")]
    UnknownDeposit(DepositId),

    /// Referenced withdrawal does not exist
    #[error("withdrawal {0} not found")]
    UnknownWithdrawal(WithdrawalId),

    /// Referenced order does not exist
    #[error("order {0} not found")]
    UnknownOrder(OrderId),

    /// Deleting or shrinking a lot that live allocations still reference;
    /// the blocking withdrawals must be resolved first
    #[error("deposit {deposit} has live allocations from {} withdrawal(s)", .withdrawals.len())]
    DepositInUse {
        deposit: DepositId,
        withdrawals: Vec<WithdrawalId>,
    },

    /// Explicit order number collides with an existing order
    #[error("order number {0:?} is already in use")]
    DuplicateOrderNumber(String),

    /// Order was placed with no items
    #[error("order has no items")]
    EmptyOrder,

    /// Storage could not confirm the write, even after a retry
    #[error("storage unavailable")]
    Unavailable,

    /// Storage rejected a command against the committed tables
    #[error("storage rejected command: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable => LedgerError::Unavailable,
            other => LedgerError::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            LedgerError::InvalidQuantity.to_string(),
            "invalid quantity (must be positive)"
        );
        assert_eq!(
            LedgerError::InvalidDate.to_string(),
            "invalid date (expected YYYY-MM-DD HH:MM:SS)"
        );
        assert_eq!(
            LedgerError::UnknownDeposit(DepositId(7)).to_string(),
            "deposit 7 not found"
        );
        assert_eq!(
            LedgerError::UnknownWithdrawal(WithdrawalId(3)).to_string(),
            "withdrawal 3 not found"
        );
        assert_eq!(
            LedgerError::DepositInUse {
                deposit: DepositId(1),
                withdrawals: vec![WithdrawalId(2), WithdrawalId(5)],
            }
            .to_string(),
            "deposit 1 has live allocations from 2 withdrawal(s)"
        );
        assert_eq!(
            LedgerError::DuplicateOrderNumber("ORD1001".into()).to_string(),
            "order number \"ORD1001\" is already in use"
        );
        assert_eq!(LedgerError::Unavailable.to_string(), "storage unavailable");
    }

    #[test]
    fn unavailable_store_error_maps_to_unavailable() {
        assert_eq!(
            LedgerError::from(StoreError::Unavailable),
            LedgerError::Unavailable
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let error = LedgerError::InvalidQuantity;
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
