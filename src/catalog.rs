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

//! Product identity suggestions drawn from the ledger itself.
//!
//! There is no separate product master: every key ever seen on a deposit or
//! withdrawal is a suggestion. Partial-key resolution is a convenience for
//! entry forms; allocation always operates on a fully specified key.

use crate::base::ProductKey;
use crate::store::Snapshot;
use std::collections::BTreeSet;

/// Distinct product keys across deposits and withdrawals, sorted by product
/// name (then stock code, then unit).
pub fn suggest_products(snapshot: &Snapshot) -> Vec<ProductKey> {
    let distinct: BTreeSet<&ProductKey> = snapshot
        .deposits
        .iter()
        .map(|deposit| &deposit.key)
        .chain(snapshot.withdrawals.iter().map(|withdrawal| &withdrawal.key))
        .collect();
    let mut keys: Vec<ProductKey> = distinct.into_iter().cloned().collect();
    keys.sort_by(|a, b| {
        a.product_name
            .cmp(&b.product_name)
            .then_with(|| a.stock_code.cmp(&b.stock_code))
            .then_with(|| a.unit.cmp(&b.unit))
    });
    keys
}

/// Full key for a stock code, if the ledger has seen one. First match in
/// suggestion order.
pub fn resolve_stock_code(snapshot: &Snapshot, stock_code: &str) -> Option<ProductKey> {
    suggest_products(snapshot)
        .into_iter()
        .find(|key| key.stock_code == stock_code)
}

/// Full key for a product name, if the ledger has seen one.
pub fn resolve_product_name(snapshot: &Snapshot, product_name: &str) -> Option<ProductKey> {
    suggest_products(snapshot)
        .into_iter()
        .find(|key| key.product_name == product_name)
}

/// Distinct unit labels, sorted.
pub fn known_units(snapshot: &Snapshot) -> Vec<String> {
    let units: BTreeSet<&str> = snapshot
        .deposits
        .iter()
        .map(|deposit| deposit.key.unit.as_str())
        .chain(
            snapshot
                .withdrawals
                .iter()
                .map(|withdrawal| withdrawal.key.unit.as_str()),
        )
        .collect();
    units.into_iter().map(str::to_owned).collect()
}

/// Distinct shop names across orders and withdrawals, sorted.
pub fn shop_names(snapshot: &Snapshot) -> Vec<String> {
    let shops: BTreeSet<&str> = snapshot
        .withdrawals
        .iter()
        .map(|withdrawal| withdrawal.shop_name.as_str())
        .chain(snapshot.orders.iter().map(|order| order.shop_name.as_str()))
        .collect();
    shops.into_iter().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{DepositId, WithdrawalId};
    use crate::record::{Deposit, Withdrawal};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn ts() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn deposit(id: u64, key: ProductKey) -> Deposit {
        Deposit {
            id: DepositId(id),
            key,
            quantity: dec!(1.00),
            deposit_date: ts(),
            notes: None,
        }
    }

    fn withdrawal(id: u64, key: ProductKey, shop: &str) -> Withdrawal {
        Withdrawal {
            id: WithdrawalId(id),
            key,
            quantity: dec!(1.00),
            shop_name: shop.into(),
            withdrawal_date: ts(),
            notes: None,
        }
    }

    #[test]
    fn suggestions_union_both_tables_sorted_by_name() {
        let snapshot = Snapshot {
            deposits: vec![deposit(1, ProductKey::new("STK-2", "Zinc Plate", "kg"))],
            withdrawals: vec![withdrawal(
                1,
                ProductKey::new("STK-1", "Anchor Bolt", "pcs"),
                "Main Street",
            )],
            ..Snapshot::default()
        };
        let keys = suggest_products(&snapshot);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].product_name, "Anchor Bolt");
        assert_eq!(keys[1].product_name, "Zinc Plate");
    }

    #[test]
    fn duplicate_keys_collapse() {
        let key = ProductKey::new("STK-1", "Widget", "pcs");
        let snapshot = Snapshot {
            deposits: vec![deposit(1, key.clone()), deposit(2, key.clone())],
            withdrawals: vec![withdrawal(1, key.clone(), "Main Street")],
            ..Snapshot::default()
        };
        assert_eq!(suggest_products(&snapshot), vec![key]);
    }

    #[test]
    fn stock_code_resolves_to_full_key() {
        let key = ProductKey::new("STK-1", "Widget", "pcs");
        let snapshot = Snapshot {
            deposits: vec![deposit(1, key.clone())],
            ..Snapshot::default()
        };
        assert_eq!(resolve_stock_code(&snapshot, "STK-1"), Some(key));
        assert_eq!(resolve_stock_code(&snapshot, "STK-9"), None);
    }

    #[test]
    fn shop_names_union_orders_and_withdrawals() {
        let snapshot = Snapshot {
            withdrawals: vec![
                withdrawal(1, ProductKey::new("STK-1", "Widget", "pcs"), "Harbor"),
                withdrawal(2, ProductKey::new("STK-1", "Widget", "pcs"), "Main Street"),
            ],
            ..Snapshot::default()
        };
        assert_eq!(shop_names(&snapshot), vec!["Harbor", "Main Street"]);
    }

    #[test]
    fn known_units_are_distinct_and_sorted() {
        let snapshot = Snapshot {
            deposits: vec![
                deposit(1, ProductKey::new("STK-1", "Widget", "pcs")),
                deposit(2, ProductKey::new("STK-2", "Rope", "m")),
            ],
            withdrawals: vec![withdrawal(
                1,
                ProductKey::new("STK-1", "Widget", "pcs"),
                "Main Street",
            )],
            ..Snapshot::default()
        };
        assert_eq!(known_units(&snapshot), vec!["m", "pcs"]);
    }
}
