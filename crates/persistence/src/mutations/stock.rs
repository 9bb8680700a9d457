// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use d1_store_domain::normalize_key;
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::{info, warn};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::stock_items;
use crate::error::PersistenceError;
use crate::queries::stock::{find_stock_item, is_stock_item_referenced};

/// Creates a stock item.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the `(ean, name)` pair
/// exists, or a database error if `qty` is negative.
pub fn create_stock_item(
    conn: &mut SqliteConnection,
    ean: &str,
    name: &str,
    qty: i64,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(stock_items::table)
        .values((
            stock_items::ean.eq(ean),
            stock_items::name.eq(name.trim()),
            stock_items::name_key.eq(normalize_key(name)),
            stock_items::qty.eq(qty),
        ))
        .execute(conn)?;

    let item_id: i64 = conn.get_last_insert_rowid()?;
    info!(item_id, ean, qty, "Created stock item");
    Ok(item_id)
}

/// Deletes a stock item no request references.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if no item has this key, or
/// `PersistenceError::StockItemReferenced` if requests reference it.
pub fn delete_stock_item(
    conn: &mut SqliteConnection,
    ean: &str,
    name: &str,
) -> Result<(), PersistenceError> {
    conn.immediate_transaction(|conn| {
        let item = find_stock_item(conn, ean, name)?.ok_or_else(|| {
            PersistenceError::NotFound(format!("Stock item {ean} '{name}' not found"))
        })?;

        if is_stock_item_referenced(conn, item.id)? {
            warn!(item_id = item.id, ean, "Refusing to delete referenced stock item");
            return Err(PersistenceError::StockItemReferenced {
                ean: ean.to_string(),
                name: name.to_string(),
            });
        }

        diesel::delete(stock_items::table.filter(stock_items::item_id.eq(item.id)))
            .execute(conn)
            .map_err(|e| match PersistenceError::from(e) {
                PersistenceError::ForeignKeyViolation(_) => PersistenceError::StockItemReferenced {
                    ean: ean.to_string(),
                    name: name.to_string(),
                },
                other => other,
            })?;

        info!(item_id = item.id, ean, "Deleted stock item");
        Ok(())
    })
}
