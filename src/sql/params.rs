//! Convert row values (serde_json::Value) to typed values sqlx can bind, and back.

use crate::error::StoreError;
use crate::record::{Column, ColumnType, RecordShape};
use crate::store::Row;
use serde_json::Value;

/// A column value ready to bind. `Null` keeps the column type so the driver sends a typed NULL.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Null(ColumnType),
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
    Json(Value),
}

impl BindValue {
    pub fn from_json(column: &Column, v: Option<&Value>) -> Result<Self, StoreError> {
        let v = match v {
            None | Some(Value::Null) if column.nullable => return Ok(BindValue::Null(column.kind)),
            None if column.kind == ColumnType::Json => return Ok(BindValue::Json(Value::Null)),
            Some(Value::Null) if column.kind == ColumnType::Json => {
                return Ok(BindValue::Json(Value::Null))
            }
            None | Some(Value::Null) => {
                return Err(StoreError::column(column.name, "missing value for NOT NULL column"))
            }
            Some(v) => v,
        };
        Ok(match column.kind {
            ColumnType::Integer => BindValue::I64(
                v.as_i64()
                    .ok_or_else(|| StoreError::column(column.name, format!("expected integer, got {}", v)))?,
            ),
            ColumnType::Real => BindValue::F64(
                v.as_f64()
                    .ok_or_else(|| StoreError::column(column.name, format!("expected number, got {}", v)))?,
            ),
            ColumnType::Text => BindValue::String(
                v.as_str()
                    .ok_or_else(|| StoreError::column(column.name, format!("expected string, got {}", v)))?
                    .to_string(),
            ),
            ColumnType::Boolean => BindValue::Bool(
                v.as_bool()
                    .ok_or_else(|| StoreError::column(column.name, format!("expected boolean, got {}", v)))?,
            ),
            ColumnType::Json => BindValue::Json(v.clone()),
        })
    }
}

/// Bind values for every shape column, in shape order. Keys not in the shape (such as `ID`) are ignored.
pub fn row_params(shape: &RecordShape, row: &Row) -> Result<Vec<BindValue>, StoreError> {
    shape
        .columns
        .iter()
        .map(|c| BindValue::from_json(c, row.get(c.name)))
        .collect()
}

/// Store ids are i64; anything larger cannot exist.
pub fn id_param(id: u64) -> Result<i64, StoreError> {
    i64::try_from(id).map_err(|_| StoreError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SHAPE: RecordShape = RecordShape::new(
        "t",
        &[
            Column::new("Name", ColumnType::Text),
            Column::nullable("Age", ColumnType::Integer),
            Column::new("Score", ColumnType::Real),
            Column::new("Active", ColumnType::Boolean),
            Column::new("Extra", ColumnType::Json),
        ],
    );

    fn row(v: Value) -> Row {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn binds_in_shape_order_and_skips_id() {
        let r = row(json!({"ID": 9, "Extra": {"k": 1}, "Active": true, "Score": 2, "Age": 30, "Name": "n"}));
        assert_eq!(
            row_params(&SHAPE, &r).unwrap(),
            vec![
                BindValue::String("n".into()),
                BindValue::I64(30),
                BindValue::F64(2.0),
                BindValue::Bool(true),
                BindValue::Json(json!({"k": 1})),
            ]
        );
    }

    #[test]
    fn nullable_column_binds_typed_null() {
        let r = row(json!({"Name": "n", "Age": null, "Score": 1.5, "Active": false, "Extra": null}));
        let params = row_params(&SHAPE, &r).unwrap();
        assert_eq!(params[1], BindValue::Null(ColumnType::Integer));
        assert_eq!(params[4], BindValue::Json(Value::Null));
    }

    #[test]
    fn not_null_column_rejects_missing_value() {
        let r = row(json!({"Age": 1, "Score": 1.0, "Active": true}));
        assert!(matches!(row_params(&SHAPE, &r), Err(StoreError::Column { .. })));
    }

    #[test]
    fn type_mismatch_is_a_column_error() {
        let r = row(json!({"Name": 5, "Score": 1.0, "Active": true}));
        let err = row_params(&SHAPE, &r).unwrap_err();
        assert!(err.to_string().contains("Name"));
    }

    #[test]
    fn oversized_id_is_not_found() {
        assert!(matches!(id_param(u64::MAX), Err(StoreError::NotFound)));
        assert_eq!(id_param(7).unwrap(), 7);
    }
}
