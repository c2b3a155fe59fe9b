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

use chrono::{Local, NaiveDateTime};
use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use stocklot::{Engine, ProductKey, parse_timestamp};

/// Inventory Ledger - Process stock movement CSV files
///
/// Reads deposits and withdrawals from a CSV file, routes every withdrawal
/// through the FIFO allocator, and outputs the resulting stock levels to
/// stdout. Shortfalls are reported on stderr.
#[derive(Parser, Debug)]
#[command(name = "stocklot")]
#[command(about = "An inventory engine that imports stock movement CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with stock movements
    ///
    /// Expected format: type,stock_code,product_name,unit,quantity,shop,date,notes
    /// Example: cargo run -- movements.csv > stock.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args = Args::parse();

    // Open input file
    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    // Import movements from CSV
    let engine = match import_movements(BufReader::new(file)) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error importing movements: {}", e);
            process::exit(1);
        }
    };

    // Write stock levels to stdout
    if let Err(e) = write_stock_levels(&engine, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the import format.
///
/// Fields: `type, stock_code, product_name, unit, quantity, shop, date, notes`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "type")]
    movement_type: String,
    stock_code: String,
    product_name: String,
    unit: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    quantity: Option<Decimal>,
    #[serde(default)]
    shop: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

/// A validated stock movement ready for the engine.
#[derive(Debug)]
enum Movement {
    Deposit {
        key: ProductKey,
        quantity: Decimal,
        date: NaiveDateTime,
        notes: Option<String>,
    },
    Withdrawal {
        key: ProductKey,
        quantity: Decimal,
        shop: String,
        date: NaiveDateTime,
        notes: Option<String>,
    },
}

impl CsvRecord {
    /// Converts the CSV record to a movement.
    ///
    /// Returns `None` for unknown movement types, missing quantities, or
    /// unparseable dates. An empty date column means "now".
    fn into_movement(self) -> Option<Movement> {
        let CsvRecord {
            movement_type,
            stock_code,
            product_name,
            unit,
            quantity,
            shop,
            date,
            notes,
        } = self;

        let key = ProductKey::new(stock_code, product_name, unit);
        let quantity = quantity?;
        let date = match date.as_deref().filter(|value| !value.is_empty()) {
            Some(value) => parse_timestamp(value).ok()?,
            None => Local::now().naive_local(),
        };
        let notes = notes.filter(|value| !value.is_empty());

        match movement_type.to_lowercase().as_str() {
            "deposit" => Some(Movement::Deposit {
                key,
                quantity,
                date,
                notes,
            }),
            "withdrawal" => Some(Movement::Withdrawal {
                key,
                quantity,
                shop: shop.unwrap_or_default(),
                date,
                notes,
            }),
            _ => None,
        }
    }
}

/// Imports stock movements from a CSV reader.
///
/// Streaming parse, so arbitrarily large files never load fully into memory.
/// Malformed rows and invalid movements are skipped. Every withdrawal goes
/// through `record_withdrawal`, which allocates it against the oldest lots;
/// bulk import never bypasses the allocator.
///
/// # CSV Format
///
/// Expected columns: `type, stock_code, product_name, unit, quantity, shop, date, notes`
/// - `type`: Movement type (deposit, withdrawal)
/// - `quantity`: Decimal amount, 2 fractional digits
/// - `shop`: Destination shop (withdrawals only)
/// - `date`: `YYYY-MM-DD HH:MM:SS`, empty for "now"
///
/// # Example
///
/// ```csv
/// type,stock_code,product_name,unit,quantity,shop,date,notes
/// deposit,STK-1,Widget,pcs,10.00,,2024-01-01 09:00:00,
/// withdrawal,STK-1,Widget,pcs,7.00,Main Street,2024-01-10 09:00:00,
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
pub fn import_movements<R: Read>(reader: R) -> Result<Engine, csv::Error> {
    let engine = Engine::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " deposit "
        .flexible(true) // Allow missing trailing fields
        .has_headers(true) // Skip first row as header
        .from_reader(reader);

    for result in rdr.deserialize::<CsvRecord>() {
        match result {
            Ok(record) => {
                let Some(movement) = record.into_movement() else {
                    #[cfg(debug_assertions)]
                    eprintln!("Skipping invalid movement record");
                    continue;
                };

                let outcome = match movement {
                    Movement::Deposit {
                        key,
                        quantity,
                        date,
                        notes,
                    } => engine
                        .record_deposit(key, quantity, date, notes)
                        .map(|_| Decimal::ZERO),
                    Movement::Withdrawal {
                        key,
                        quantity,
                        shop,
                        date,
                        notes,
                    } => engine
                        .record_withdrawal(key, quantity, &shop, date, notes)
                        .map(|receipt| receipt.shortfall),
                };

                match outcome {
                    Ok(shortfall) if !shortfall.is_zero() => {
                        // Understocked lines still import; the operator is told.
                        eprintln!("Warning: understocked by {} units", shortfall);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        #[cfg(debug_assertions)]
                        eprintln!("Skipping movement: {}", e);
                    }
                }
            }
            Err(e) => {
                // Skip malformed rows
                #[cfg(debug_assertions)]
                eprintln!("Skipping malformed row: {}", e);
                continue;
            }
        }
    }

    Ok(engine)
}

/// One stock level row of the output CSV.
#[derive(Debug, Serialize)]
struct StockLevelRow<'a> {
    stock_code: &'a str,
    product_name: &'a str,
    unit: &'a str,
    on_hand: Decimal,
    last_month_consumption: Decimal,
    reorder_needed: bool,
}

/// Writes current stock levels to a CSV writer.
///
/// # CSV Format
///
/// Columns: `stock_code, product_name, unit, on_hand, last_month_consumption, reorder_needed`
pub fn write_stock_levels<W: Write>(
    engine: &Engine,
    writer: W,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = Writer::from_writer(writer);

    for level in engine.stock_levels(Local::now().date_naive())? {
        wtr.serialize(StockLevelRow {
            stock_code: &level.key.stock_code,
            product_name: &level.key.product_name,
            unit: &level.key.unit,
            on_hand: level.on_hand,
            last_month_consumption: level.previous_month_consumption,
            reorder_needed: level.reorder_needed,
        })?;
    }

    // Flush to ensure all data is written
    wtr.flush()?;
    Ok(())
}
