//! Record types and the shape descriptor the store migrates and queries against.

use crate::error::StoreError;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashSet;

/// Name of the store-assigned identifier column, and of the matching record field.
pub const ID_COLUMN: &str = "ID";

const IDENT_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";
const MAX_IDENT_LEN: usize = 63;

/// Column storage class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Boolean,
    /// Arbitrary JSON value (JSONB on PostgreSQL, TEXT on SQLite).
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
    pub nullable: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnType) -> Self {
        Column {
            name,
            kind,
            nullable: false,
        }
    }

    pub const fn nullable(name: &'static str, kind: ColumnType) -> Self {
        Column {
            name,
            kind,
            nullable: true,
        }
    }
}

/// Table name plus columns. The `ID` column is implicit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordShape {
    pub table: &'static str,
    pub columns: &'static [Column],
}

impl RecordShape {
    pub const fn new(table: &'static str, columns: &'static [Column]) -> Self {
        RecordShape { table, columns }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Checks identifiers before they are interpolated into DDL and queries.
    pub fn validate(&self) -> Result<(), StoreError> {
        let re = Regex::new(IDENT_PATTERN).map_err(|e| StoreError::Shape(e.to_string()))?;
        let valid = |name: &str| name.len() <= MAX_IDENT_LEN && re.is_match(name);

        if !valid(self.table) {
            return Err(StoreError::Shape(format!("invalid table name '{}'", self.table)));
        }
        if self.columns.is_empty() {
            return Err(StoreError::Shape(format!("table '{}' has no columns", self.table)));
        }
        let mut seen = HashSet::new();
        for c in self.columns {
            if !valid(c.name) {
                return Err(StoreError::Shape(format!("invalid column name '{}'", c.name)));
            }
            if c.name.eq_ignore_ascii_case(ID_COLUMN) {
                return Err(StoreError::Shape(format!(
                    "column '{}' is reserved for the identifier",
                    c.name
                )));
            }
            if !seen.insert(c.name.to_ascii_lowercase()) {
                return Err(StoreError::Shape(format!("duplicate column '{}'", c.name)));
            }
        }
        Ok(())
    }
}

/// A record type the engine can manage.
///
/// The serialized form must be a JSON object keyed by column name. Declare an `ID` field
/// (`#[serde(rename = "ID")] id: u64`) to receive the store-assigned identifier on reads;
/// it is ignored on writes. `Default` provides the blank record that Create decodes onto.
///
/// ```rust,ignore
/// #[derive(Default, Serialize, Deserialize)]
/// struct Note {
///     #[serde(rename = "ID")]
///     id: u64,
///     #[serde(rename = "Title")]
///     title: String,
/// }
///
/// impl Record for Note {
///     const SHAPE: RecordShape =
///         RecordShape::new("notes", &[Column::new("Title", ColumnType::Text)]);
/// }
/// ```
pub trait Record: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    const SHAPE: RecordShape;
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: RecordShape = RecordShape::new(
        "test_types",
        &[
            Column::new("String", ColumnType::Text),
            Column::new("Int", ColumnType::Integer),
        ],
    );

    #[test]
    fn accepts_plain_identifiers() {
        assert!(GOOD.validate().is_ok());
        assert_eq!(GOOD.column("Int").map(|c| c.kind), Some(ColumnType::Integer));
        assert!(GOOD.column("Missing").is_none());
    }

    #[test]
    fn rejects_quoted_or_odd_table_names() {
        let shape = RecordShape::new("bad\"table", GOOD.columns);
        assert!(matches!(shape.validate(), Err(StoreError::Shape(_))));
        let shape = RecordShape::new("1table", GOOD.columns);
        assert!(shape.validate().is_err());
    }

    const RESERVED: RecordShape =
        RecordShape::new("t", &[Column::new("id", ColumnType::Integer)]);

    const DUP: RecordShape = RecordShape::new(
        "t",
        &[Column::new("Name", ColumnType::Text), Column::new("name", ColumnType::Text)],
    );

    #[test]
    fn rejects_reserved_and_duplicate_columns() {
        assert!(RESERVED.validate().is_err());
        assert!(DUP.validate().is_err());
    }

    #[test]
    fn rejects_empty_shape() {
        assert!(RecordShape::new("t", &[]).validate().is_err());
    }
}
