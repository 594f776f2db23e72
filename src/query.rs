// Query result types and tiberius row conversion

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tiberius::numeric::Numeric;
use tiberius::{Column, ColumnType, Row};

/// A single cell in a result set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(String),
    Binary(Vec<u8>),
}

impl CellValue {
    /// Read the cell at `idx` from a tiberius row, guided by the column type.
    pub fn from_row(row: &Row, idx: usize, col_type: &ColumnType) -> Self {
        match col_type {
            ColumnType::Null => CellValue::Null,

            ColumnType::Int1 => opt(row.try_get::<u8, _>(idx).ok().flatten().map(|v| CellValue::Int(v as i64))),
            ColumnType::Int2 => opt(row.try_get::<i16, _>(idx).ok().flatten().map(|v| CellValue::Int(v as i64))),
            ColumnType::Int4 => opt(row.try_get::<i32, _>(idx).ok().flatten().map(|v| CellValue::Int(v as i64))),
            ColumnType::Int8 => opt(row.try_get::<i64, _>(idx).ok().flatten().map(CellValue::Int)),
            // Intn carries whatever width the server chose
            ColumnType::Intn => opt(row
                .try_get::<i64, _>(idx)
                .ok()
                .flatten()
                .map(CellValue::Int)
                .or_else(|| row.try_get::<i32, _>(idx).ok().flatten().map(|v| CellValue::Int(v as i64)))),

            ColumnType::Float4 => opt(row.try_get::<f32, _>(idx).ok().flatten().map(|v| CellValue::Float(v as f64))),
            ColumnType::Float8 => opt(row.try_get::<f64, _>(idx).ok().flatten().map(CellValue::Float)),
            ColumnType::Floatn => opt(row
                .try_get::<f64, _>(idx)
                .ok()
                .flatten()
                .map(CellValue::Float)
                .or_else(|| row.try_get::<f32, _>(idx).ok().flatten().map(|v| CellValue::Float(v as f64)))),

            ColumnType::Decimaln | ColumnType::Numericn => opt(row
                .try_get::<Numeric, _>(idx)
                .ok()
                .flatten()
                .map(|n| CellValue::Float(f64::from(n)))),

            ColumnType::Money | ColumnType::Money4 => opt(row.try_get::<f64, _>(idx).ok().flatten().map(CellValue::Float)),

            ColumnType::Bit | ColumnType::Bitn => opt(row.try_get::<bool, _>(idx).ok().flatten().map(CellValue::Bool)),

            ColumnType::BigVarChar
            | ColumnType::BigChar
            | ColumnType::NVarchar
            | ColumnType::NChar
            | ColumnType::Text
            | ColumnType::NText => opt(row
                .try_get::<&str, _>(idx)
                .ok()
                .flatten()
                .map(|s| CellValue::String(s.to_string()))),

            ColumnType::Datetime | ColumnType::Datetime2 | ColumnType::Datetimen | ColumnType::Datetime4 => opt(row
                .try_get::<NaiveDateTime, _>(idx)
                .ok()
                .flatten()
                .map(|dt| CellValue::DateTime(dt.to_string()))),
            ColumnType::DatetimeOffsetn => opt(row
                .try_get::<DateTime<Utc>, _>(idx)
                .ok()
                .flatten()
                .map(|dt| CellValue::DateTime(dt.to_rfc3339()))),
            ColumnType::Daten => opt(row
                .try_get::<NaiveDate, _>(idx)
                .ok()
                .flatten()
                .map(|d| CellValue::DateTime(d.to_string()))),
            ColumnType::Timen => opt(row
                .try_get::<NaiveTime, _>(idx)
                .ok()
                .flatten()
                .map(|t| CellValue::DateTime(t.to_string()))),

            ColumnType::BigVarBin | ColumnType::BigBinary | ColumnType::Image => opt(row
                .try_get::<&[u8], _>(idx)
                .ok()
                .flatten()
                .map(|b| CellValue::Binary(b.to_vec()))),

            ColumnType::Guid => opt(row
                .try_get::<tiberius::Uuid, _>(idx)
                .ok()
                .flatten()
                .map(|u| CellValue::String(u.to_string()))),

            ColumnType::Xml => opt(row
                .try_get::<&tiberius::xml::XmlData, _>(idx)
                .ok()
                .flatten()
                .map(|xml| CellValue::String(xml.to_owned().into_string()))),

            // Anything else: last attempt as text
            _ => opt(row
                .try_get::<&str, _>(idx)
                .ok()
                .flatten()
                .map(|s| CellValue::String(s.to_string()))),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

fn opt(value: Option<CellValue>) -> CellValue {
    value.unwrap_or(CellValue::Null)
}

/// Column metadata for a result set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

impl From<&Column> for ColumnInfo {
    fn from(col: &Column) -> Self {
        Self {
            name: col.name().to_string(),
            data_type: format_sql_data_type(&col.column_type()),
            nullable: true, // Tiberius doesn't easily expose nullability
        }
    }
}

/// Convert a tiberius ColumnType to the SQL data type name.
pub(crate) fn format_sql_data_type(col_type: &ColumnType) -> String {
    match col_type {
        ColumnType::Int1 => "tinyint".to_string(),
        ColumnType::Int2 => "smallint".to_string(),
        ColumnType::Int4 | ColumnType::Intn => "int".to_string(),
        ColumnType::Int8 => "bigint".to_string(),

        ColumnType::Float4 => "real".to_string(),
        ColumnType::Float8 | ColumnType::Floatn => "float".to_string(),
        ColumnType::Decimaln => "decimal".to_string(),
        ColumnType::Numericn => "numeric".to_string(),
        ColumnType::Money => "money".to_string(),
        ColumnType::Money4 => "smallmoney".to_string(),

        ColumnType::Bit | ColumnType::Bitn => "bit".to_string(),

        ColumnType::BigVarChar => "varchar(max)".to_string(),
        ColumnType::BigChar => "char(max)".to_string(),
        ColumnType::NVarchar => "nvarchar".to_string(),
        ColumnType::NChar => "nchar".to_string(),
        ColumnType::Text => "text".to_string(),
        ColumnType::NText => "ntext".to_string(),

        ColumnType::BigVarBin => "varbinary(max)".to_string(),
        ColumnType::BigBinary => "binary(max)".to_string(),
        ColumnType::Image => "image".to_string(),

        ColumnType::Datetime | ColumnType::Datetimen => "datetime".to_string(),
        ColumnType::Datetime2 => "datetime2".to_string(),
        ColumnType::Datetime4 => "smalldatetime".to_string(),
        ColumnType::Daten => "date".to_string(),
        ColumnType::Timen => "time".to_string(),
        ColumnType::DatetimeOffsetn => "datetimeoffset".to_string(),

        ColumnType::Guid => "uniqueidentifier".to_string(),
        ColumnType::Xml => "xml".to_string(),
        ColumnType::Null => "null".to_string(),

        _ => format!("{:?}", col_type).to_lowercase(),
    }
}

/// A fully materialized result set: named columns and all rows in memory.
///
/// There is no size limiting or streaming; the entire first result set of the
/// query is loaded at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Vec<CellValue>>,
    pub row_count: usize,
    pub execution_time_ms: u64,
}

impl QueryResult {
    pub fn new(columns: Vec<ColumnInfo>, rows: Vec<Vec<CellValue>>, execution_time_ms: u64) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            row_count,
            execution_time_ms,
        }
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Cell at (row, column name), if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.columns.iter().position(|c| c.name == column)?;
        self.rows.get(row)?.get(idx)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Outcome of the mutating execution path.
///
/// Deliberately opaque: it carries rows-affected counts only and cannot be
/// inspected as row data. Use [`crate::DatabaseManager::query_table`] for reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecSummary {
    rows_affected: Vec<u64>,
    execution_time_ms: u64,
}

impl ExecSummary {
    pub(crate) fn new(rows_affected: Vec<u64>, execution_time_ms: u64) -> Self {
        Self {
            rows_affected,
            execution_time_ms,
        }
    }

    /// Rows affected, one count per statement the server reported on.
    pub fn rows_affected(&self) -> &[u64] {
        &self.rows_affected
    }

    /// Total rows affected across all statements.
    pub fn total(&self) -> u64 {
        self.rows_affected.iter().sum()
    }

    pub fn execution_time_ms(&self) -> u64 {
        self.execution_time_ms
    }
}
