// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use d1_store_domain::StockItem;
use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::diesel_schema::{stock_items, uniform_requests};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = stock_items)]
struct StockRow {
    item_id: i64,
    ean: String,
    name: String,
    qty: i64,
}

impl From<StockRow> for StockItem {
    fn from(row: StockRow) -> Self {
        Self {
            id: row.item_id,
            ean: row.ean,
            name: row.name,
            qty: row.qty,
        }
    }
}

/// Lists all stock items ordered by name then EAN.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_stock(conn: &mut SqliteConnection) -> Result<Vec<StockItem>, PersistenceError> {
    let rows: Vec<StockRow> = stock_items::table
        .order((stock_items::name_key.asc(), stock_items::ean.asc()))
        .select(StockRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(StockItem::from).collect())
}

/// Retrieves a stock item by its exact `(ean, name)` key.
///
/// # Errors
///
/// Returns an error if the query fails. Returns `Ok(None)` if no item matches.
pub fn find_stock_item(
    conn: &mut SqliteConnection,
    ean: &str,
    name: &str,
) -> Result<Option<StockItem>, PersistenceError> {
    Ok(stock_items::table
        .filter(stock_items::ean.eq(ean))
        .filter(stock_items::name.eq(name))
        .select(StockRow::as_select())
        .first(conn)
        .optional()?
        .map(StockItem::from))
}

/// Retrieves a stock item by id.
///
/// # Errors
///
/// Returns an error if the query fails. Returns `Ok(None)` if no item matches.
pub fn get_stock_item(
    conn: &mut SqliteConnection,
    item_id: i64,
) -> Result<Option<StockItem>, PersistenceError> {
    Ok(stock_items::table
        .filter(stock_items::item_id.eq(item_id))
        .select(StockRow::as_select())
        .first(conn)
        .optional()?
        .map(StockItem::from))
}

/// Returns whether any uniform request references the item.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn is_stock_item_referenced(
    conn: &mut SqliteConnection,
    item_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = uniform_requests::table
        .filter(uniform_requests::item_id.eq(item_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}
