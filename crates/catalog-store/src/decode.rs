//! Row to JSON decoding for untyped listings.

use serde_json::{Map, Number, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::error::{Result, StoreError};

/// A decoded row, keyed by column name in select order.
pub type JsonRow = Map<String, Value>;

/// Decodes a row by the storage class of each value.
///
/// Integers and reals become numbers, text becomes strings, blobs become
/// byte arrays and NULL stays null.
///
/// # Errors
///
/// Returns [`StoreError::Decode`] naming the column that failed.
pub fn row_to_json(row: &SqliteRow) -> Result<JsonRow> {
    let mut object = Map::new();
    for (index, column) in row.columns().iter().enumerate() {
        let name = column.name();
        let decode_err = |source: sqlx::Error| StoreError::Decode {
            column: name.to_string(),
            source,
        };

        let raw = row.try_get_raw(index).map_err(decode_err)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => Value::from(row.try_get::<i64, _>(index).map_err(decode_err)?),
                "REAL" => {
                    let float = row.try_get::<f64, _>(index).map_err(decode_err)?;
                    Number::from_f64(float).map_or(Value::Null, Value::Number)
                }
                "BLOB" => Value::from(row.try_get::<Vec<u8>, _>(index).map_err(decode_err)?),
                _ => Value::from(row.try_get::<String, _>(index).map_err(decode_err)?),
            }
        };
        object.insert(name.to_string(), value);
    }
    Ok(object)
}
