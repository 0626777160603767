//! Request and row types exchanged with a query store

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use taskfilter_core::TaskNumber;
use time::Date;

/// Type tag of the projected value column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Free text
    Text,
    /// `true` / `false`
    Boolean,
    /// Whole number
    Integer,
    /// Floating point number
    Double,
    /// Calendar date
    Date,
}

impl ColumnType {
    /// Canonical tag written to storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Integer => "int",
            Self::Double => "double",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown column type tag
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown column type: {0}")]
pub struct UnknownColumnType(pub String);

impl FromStr for ColumnType {
    type Err = UnknownColumnType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "text" => Ok(Self::Text),
            "boolean" => Ok(Self::Boolean),
            "int" | "integer" => Ok(Self::Integer),
            "double" => Ok(Self::Double),
            "date" => Ok(Self::Date),
            other => Err(UnknownColumnType(other.to_owned())),
        }
    }
}

/// Value of the projected column for one matching row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValue {
    /// SQL-style null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Double(f64),
    /// Date value
    Date(Date),
    /// Text value
    Text(String),
}

/// Projection plus filter expression handed to the store
///
/// The store returns one row per task satisfying `where_expression`, keyed by
/// `id_column` with the value of `value_column` coerced to `result_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleSelect {
    /// Internal unique id column
    pub id_column: String,
    /// Column projected as the row value
    pub value_column: String,
    /// Opaque filter expression
    pub where_expression: Option<String>,
    /// Expected type of the value column
    pub result_type: ColumnType,
}

impl SimpleSelect {
    /// Select used by custom task filters: task numbers keyed by the task uid
    #[must_use]
    pub fn task_numbers(where_expression: Option<&str>) -> Self {
        Self {
            id_column: "uid".to_owned(),
            value_column: "num".to_owned(),
            where_expression: where_expression.map(str::to_owned),
            result_type: ColumnType::Integer,
        }
    }
}

/// One row streamed back by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRow {
    /// Number of the matching task
    pub task_number: TaskNumber,
    /// Projected value
    #[serde(default = "null_value")]
    pub value: ColumnValue,
}

const fn null_value() -> ColumnValue {
    ColumnValue::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_type_accepts_both_integer_tags() {
        assert_eq!("int".parse::<ColumnType>(), Ok(ColumnType::Integer));
        assert_eq!("integer".parse::<ColumnType>(), Ok(ColumnType::Integer));
        assert_eq!(
            "money".parse::<ColumnType>(),
            Err(UnknownColumnType("money".into()))
        );
        assert_eq!(ColumnType::Integer.to_string(), "int");
    }

    #[test]
    fn task_number_select_projects_num_by_uid() {
        let select = SimpleSelect::task_numbers(Some("priority > 3"));
        assert_eq!(select.id_column, "uid");
        assert_eq!(select.value_column, "num");
        assert_eq!(select.where_expression.as_deref(), Some("priority > 3"));
        assert_eq!(select.result_type, ColumnType::Integer);
    }

    #[test]
    fn rows_parse_with_and_without_value() {
        let row: QueryRow = serde_json::from_str(r#"{"task_number": 5, "value": 5}"#)
            .unwrap_or_else(|err| panic!("row: {err}"));
        assert_eq!(row.task_number, TaskNumber(5));
        assert_eq!(row.value, ColumnValue::Integer(5));

        let bare: QueryRow = serde_json::from_str(r#"{"task_number": 9}"#)
            .unwrap_or_else(|err| panic!("bare row: {err}"));
        assert_eq!(bare.value, ColumnValue::Null);
    }
}
