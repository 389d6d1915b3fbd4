//! Builds DDL and parameterized INSERT, SELECT, UPDATE, DELETE from a record shape.

use crate::record::{Column, ColumnType, RecordShape, ID_COLUMN};

/// SQL flavour a statement is rendered for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Positional placeholder for the `n`th (1-based) parameter.
    pub fn placeholder(self, n: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", n),
            Dialect::Sqlite => format!("?{}", n),
        }
    }

    fn id_column_def(self) -> String {
        match self {
            Dialect::Postgres => format!("{} BIGSERIAL PRIMARY KEY", quoted(ID_COLUMN)),
            Dialect::Sqlite => format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", quoted(ID_COLUMN)),
        }
    }

    fn type_name(self, kind: ColumnType) -> &'static str {
        match (self, kind) {
            (Dialect::Postgres, ColumnType::Integer) => "BIGINT",
            (Dialect::Postgres, ColumnType::Real) => "DOUBLE PRECISION",
            (Dialect::Postgres, ColumnType::Json) => "JSONB",
            (Dialect::Sqlite, ColumnType::Integer) => "INTEGER",
            (Dialect::Sqlite, ColumnType::Real) => "REAL",
            (Dialect::Sqlite, ColumnType::Json) => "TEXT",
            (_, ColumnType::Text) => "TEXT",
            (_, ColumnType::Boolean) => "BOOLEAN",
        }
    }
}

/// Quote identifier (safe: shapes are validated before use).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Zero value used as the column default so NOT NULL columns can be added to populated tables.
fn zero_default(kind: ColumnType) -> &'static str {
    match kind {
        ColumnType::Integer => "0",
        ColumnType::Real => "0.0",
        ColumnType::Text => "''",
        ColumnType::Boolean => "FALSE",
        ColumnType::Json => "'null'",
    }
}

fn column_def(dialect: Dialect, c: &Column) -> String {
    let mut def = format!("{} {}", quoted(c.name), dialect.type_name(c.kind));
    if !c.nullable {
        def.push_str(" NOT NULL DEFAULT ");
        def.push_str(zero_default(c.kind));
    }
    def
}

/// Column list for SELECT: ID first, then the shape's columns in order.
fn select_column_list(shape: &RecordShape) -> String {
    std::iter::once(ID_COLUMN)
        .chain(shape.columns.iter().map(|c| c.name))
        .map(quoted)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn create_table(dialect: Dialect, shape: &RecordShape) -> String {
    let mut defs = vec![dialect.id_column_def()];
    defs.extend(shape.columns.iter().map(|c| column_def(dialect, c)));
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quoted(shape.table),
        defs.join(",\n  ")
    )
}

/// ALTER TABLE ADD COLUMN. PostgreSQL skips existing columns itself; SQLite callers must
/// check `existing_columns` first.
pub fn add_column(dialect: Dialect, shape: &RecordShape, c: &Column) -> String {
    let guard = match dialect {
        Dialect::Postgres => "IF NOT EXISTS ",
        Dialect::Sqlite => "",
    };
    format!(
        "ALTER TABLE {} ADD COLUMN {}{}",
        quoted(shape.table),
        guard,
        column_def(dialect, c)
    )
}

/// Names of the columns currently on the table (SQLite only). Param: table name.
pub fn existing_columns() -> &'static str {
    "SELECT name FROM pragma_table_info(?1)"
}

/// INSERT of every shape column, in shape order, returning the assigned ID.
pub fn insert(dialect: Dialect, shape: &RecordShape) -> String {
    let cols: Vec<String> = shape.columns.iter().map(|c| quoted(c.name)).collect();
    let placeholders: Vec<String> = (1..=shape.columns.len())
        .map(|n| dialect.placeholder(n))
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(shape.table),
        cols.join(", "),
        placeholders.join(", "),
        quoted(ID_COLUMN)
    )
}

/// SELECT by ID. Caller adds id as sole param.
pub fn select_by_id(dialect: Dialect, shape: &RecordShape) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = {}",
        select_column_list(shape),
        quoted(shape.table),
        quoted(ID_COLUMN),
        dialect.placeholder(1)
    )
}

pub fn count(shape: &RecordShape) -> String {
    format!("SELECT COUNT(*) FROM {}", quoted(shape.table))
}

/// SELECT page ordered by ID with optional LIMIT/OFFSET.
pub fn select_page(
    dialect: Dialect,
    shape: &RecordShape,
    offset: Option<u64>,
    limit: Option<u64>,
) -> String {
    let limit_clause = match (dialect, limit, offset) {
        (_, Some(n), _) => format!(" LIMIT {}", n),
        // SQLite only accepts OFFSET after a LIMIT.
        (Dialect::Sqlite, None, Some(_)) => " LIMIT -1".to_string(),
        _ => String::new(),
    };
    let offset_clause = offset.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();
    format!(
        "SELECT {} FROM {} ORDER BY {}{}{}",
        select_column_list(shape),
        quoted(shape.table),
        quoted(ID_COLUMN),
        limit_clause,
        offset_clause
    )
}

/// UPDATE every shape column by ID. Column values are params 1..=n, the ID is param n+1.
pub fn update_by_id(dialect: Dialect, shape: &RecordShape) -> String {
    let sets: Vec<String> = shape
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = {}", quoted(c.name), dialect.placeholder(i + 1)))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = {}",
        quoted(shape.table),
        sets.join(", "),
        quoted(ID_COLUMN),
        dialect.placeholder(shape.columns.len() + 1)
    )
}

pub fn delete_by_id(dialect: Dialect, shape: &RecordShape) -> String {
    format!(
        "DELETE FROM {} WHERE {} = {}",
        quoted(shape.table),
        quoted(ID_COLUMN),
        dialect.placeholder(1)
    )
}
