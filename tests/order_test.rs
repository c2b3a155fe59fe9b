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

//! Order placement and deletion tests.
//!
//! Orders are withdrawal factories: every line must behave exactly like a
//! manually recorded withdrawal, and deleting the order must reverse them.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal_macros::dec;
use stocklot::{Engine, LedgerError, OrderLine, ProductKey};

fn key(code: &str) -> ProductKey {
    ProductKey::new(code, format!("Product {code}"), "pcs")
}

fn ts(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

fn line(k: &ProductKey, quantity: rust_decimal::Decimal) -> OrderLine {
    OrderLine {
        key: k.clone(),
        quantity,
    }
}

#[test]
fn order_lines_allocate_like_manual_withdrawals() {
    let engine = Engine::new();
    let k1 = key("STK-1");
    let k2 = key("STK-2");
    let d1 = engine
        .record_deposit(k1.clone(), dec!(5.00), ts(2024, 1, 1), None)
        .unwrap();
    engine
        .record_deposit(k2.clone(), dec!(10.00), ts(2024, 1, 1), None)
        .unwrap();

    let receipt = engine
        .place_order(
            "Main Street",
            vec![line(&k1, dec!(3.00)), line(&k2, dec!(4.00))],
            ts(2024, 1, 10),
            None,
            None,
        )
        .unwrap();

    assert_eq!(receipt.items.len(), 2);
    assert_eq!(receipt.items[0].shares[0].deposit_id, d1);
    assert_eq!(receipt.items[0].shares[0].quantity, dec!(3.00));
    assert!(receipt.items.iter().all(|item| item.shortfall.is_zero()));

    // the item withdrawals are ordinary ledger records
    assert_eq!(engine.net_quantity(&k1).unwrap(), dec!(2.00));
    assert_eq!(engine.net_quantity(&k2).unwrap(), dec!(6.00));
    let detail = engine
        .allocation_detail(receipt.items[0].withdrawal_id)
        .unwrap();
    assert_eq!(detail.len(), 1);
}

#[test]
fn generated_order_numbers_follow_the_sequence() {
    let engine = Engine::new();
    let k = key("STK-1");
    engine
        .record_deposit(k.clone(), dec!(10.00), ts(2024, 1, 1), None)
        .unwrap();

    let first = engine
        .place_order("Main Street", vec![line(&k, dec!(1.00))], ts(2024, 1, 2), None, None)
        .unwrap();
    let second = engine
        .place_order("Main Street", vec![line(&k, dec!(1.00))], ts(2024, 1, 3), None, None)
        .unwrap();

    assert_eq!(first.order_number, "ORD1001");
    assert_eq!(second.order_number, "ORD1002");
}

#[test]
fn explicit_order_number_is_respected_and_must_be_unique() {
    let engine = Engine::new();
    let k = key("STK-1");
    engine
        .record_deposit(k.clone(), dec!(10.00), ts(2024, 1, 1), None)
        .unwrap();

    let receipt = engine
        .place_order(
            "Main Street",
            vec![line(&k, dec!(1.00))],
            ts(2024, 1, 2),
            None,
            Some("INV-77".into()),
        )
        .unwrap();
    assert_eq!(receipt.order_number, "INV-77");

    let duplicate = engine.place_order(
        "Harbor",
        vec![line(&k, dec!(1.00))],
        ts(2024, 1, 3),
        None,
        Some("INV-77".into()),
    );
    assert_eq!(
        duplicate.err(),
        Some(LedgerError::DuplicateOrderNumber("INV-77".into()))
    );
}

#[test]
fn empty_order_is_rejected() {
    let engine = Engine::new();
    assert_eq!(
        engine
            .place_order("Main Street", Vec::new(), ts(2024, 1, 2), None, None)
            .err(),
        Some(LedgerError::EmptyOrder)
    );
}

#[test]
fn later_lines_see_capacity_claimed_by_earlier_ones() {
    let engine = Engine::new();
    let k = key("STK-1");
    engine
        .record_deposit(k.clone(), dec!(5.00), ts(2024, 1, 1), None)
        .unwrap();
    engine
        .record_deposit(k.clone(), dec!(5.00), ts(2024, 1, 5), None)
        .unwrap();

    let receipt = engine
        .place_order(
            "Main Street",
            vec![line(&k, dec!(4.00)), line(&k, dec!(4.00))],
            ts(2024, 1, 10),
            None,
            None,
        )
        .unwrap();

    // first line drains the oldest lot; the second finishes it and moves on
    assert_eq!(receipt.items[0].shares.len(), 1);
    assert_eq!(receipt.items[1].shares.len(), 2);
    assert_eq!(receipt.items[1].shares[0].quantity, dec!(1.00));
    assert_eq!(receipt.items[1].shares[1].quantity, dec!(3.00));
}

#[test]
fn order_shortfall_is_reported_per_line() {
    let engine = Engine::new();
    let k = key("STK-1");
    engine
        .record_deposit(k.clone(), dec!(3.00), ts(2024, 1, 1), None)
        .unwrap();

    let receipt = engine
        .place_order(
            "Main Street",
            vec![line(&k, dec!(2.00)), line(&k, dec!(4.00))],
            ts(2024, 1, 10),
            None,
            None,
        )
        .unwrap();

    assert!(receipt.items[0].shortfall.is_zero());
    assert_eq!(receipt.items[1].shortfall, dec!(3.00));
}

#[test]
fn delete_order_reverses_its_withdrawals() {
    let engine = Engine::new();
    let k = key("STK-1");
    engine
        .record_deposit(k.clone(), dec!(10.00), ts(2024, 1, 1), None)
        .unwrap();

    let receipt = engine
        .place_order("Main Street", vec![line(&k, dec!(7.00))], ts(2024, 1, 2), None, None)
        .unwrap();
    assert_eq!(engine.lot_history(&k).unwrap()[0].remaining, dec!(3.00));

    engine.delete_order(receipt.order_id).unwrap();

    assert_eq!(engine.lot_history(&k).unwrap()[0].remaining, dec!(10.00));
    assert_eq!(engine.net_quantity(&k).unwrap(), dec!(10.00));
    assert!(engine.find_order("ORD1001").unwrap().is_none());
}

#[test]
fn orders_list_newest_first_and_filter_by_shop() {
    let engine = Engine::new();
    let k = key("STK-1");
    engine
        .record_deposit(k.clone(), dec!(10.00), ts(2024, 1, 1), None)
        .unwrap();

    engine
        .place_order("Main Street", vec![line(&k, dec!(1.00))], ts(2024, 1, 2), None, None)
        .unwrap();
    engine
        .place_order("Harbor", vec![line(&k, dec!(1.00))], ts(2024, 1, 5), None, None)
        .unwrap();

    let all = engine.orders(None).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].shop_name, "Harbor");

    let filtered = engine.orders(Some("Main Street")).unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].order_number, "ORD1001");
}

#[test]
fn find_order_returns_items_with_their_withdrawals() {
    let engine = Engine::new();
    let k = key("STK-1");
    engine
        .record_deposit(k.clone(), dec!(10.00), ts(2024, 1, 1), None)
        .unwrap();

    let receipt = engine
        .place_order(
            "Main Street",
            vec![line(&k, dec!(2.00))],
            ts(2024, 1, 2),
            Some("rush".into()),
            None,
        )
        .unwrap();

    let order = engine.find_order(&receipt.order_number).unwrap().unwrap();
    assert_eq!(order.item_count(), 1);
    assert_eq!(order.total_quantity(), dec!(2.00));
    assert_eq!(order.items[0].withdrawal_id, receipt.items[0].withdrawal_id);
    assert_eq!(order.notes.as_deref(), Some("rush"));
}

#[test]
fn deleting_an_item_withdrawal_leaves_the_order_as_history() {
    let engine = Engine::new();
    let k = key("STK-1");
    engine
        .record_deposit(k.clone(), dec!(10.00), ts(2024, 1, 1), None)
        .unwrap();

    let receipt = engine
        .place_order("Main Street", vec![line(&k, dec!(4.00))], ts(2024, 1, 2), None, None)
        .unwrap();

    engine
        .delete_withdrawal(receipt.items[0].withdrawal_id)
        .unwrap();

    // the order survives as a historical record, and deleting it still works
    let order = engine.find_order(&receipt.order_number).unwrap().unwrap();
    assert_eq!(order.item_count(), 1);
    engine.delete_order(receipt.order_id).unwrap();
    assert!(engine.find_order(&receipt.order_number).unwrap().is_none());
}
