use chrono::NaiveDate;
use serde_json::Value;
use sqlx::{
    MySql, MySqlPool,
    mysql::MySqlArguments,
    query::{QueryAs, QueryScalar},
};

use crate::error::{AppError, FieldError};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

/// What a whitelisted column accepts in a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Non-empty string
    Text,
    /// String, may be empty
    OptionalText,
    Id,
    NullableId,
    UInt,
    Bool,
    Date,
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

fn convert(kind: ColumnKind, field: &str, value: &Value) -> Result<SqlValue, FieldError> {
    let invalid = |msg: &str| FieldError::new(field, msg);
    match (kind, value) {
        (ColumnKind::Text, Value::String(s)) if s.trim().is_empty() => {
            Err(FieldError::required(field))
        }
        (ColumnKind::Text | ColumnKind::OptionalText, Value::String(s)) => {
            Ok(SqlValue::String(s.trim().to_string()))
        }
        (ColumnKind::Id | ColumnKind::NullableId | ColumnKind::UInt, Value::Number(n)) => n
            .as_u64()
            .map(SqlValue::U64)
            .ok_or_else(|| invalid("Must be a non-negative integer")),
        (ColumnKind::NullableId, Value::Null) => Ok(SqlValue::Null),
        (ColumnKind::Bool, Value::Bool(b)) => Ok(SqlValue::Bool(*b)),
        (ColumnKind::Date, Value::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(SqlValue::Date)
            .map_err(|_| invalid("Must be a YYYY-MM-DD date")),
        _ => Err(invalid("Unsupported value for this field")),
    }
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
///
/// Only keys listed in `allowed` are accepted; every rejected key is
/// reported as a field error.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed: &[(&str, ColumnKind)],
    id_value: u64,
) -> Result<SqlUpdate, AppError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| AppError::field("body", "Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(AppError::field("body", "No fields provided for update"));
    }

    let mut columns = Vec::with_capacity(obj.len());
    let mut values = Vec::with_capacity(obj.len() + 1);
    let mut errors = Vec::new();

    for (key, value) in obj {
        let Some((column, kind)) = allowed.iter().find(|(name, _)| name == key) else {
            errors.push(FieldError::new(key.as_str(), "Unknown or read-only field"));
            continue;
        };
        match convert(*kind, key, value) {
            Ok(v) => {
                columns.push(format!("{column} = ?"));
                values.push(v);
            }
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation { errors });
    }

    let sql = format!("UPDATE {} SET {} WHERE id = ?", table, columns.join(", "));
    values.push(SqlValue::U64(id_value));

    Ok(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<u64>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

/// `true` if `table` has a row with this id. `table` must be a trusted literal.
pub async fn row_exists(pool: &MySqlPool, table: &str, id: u64) -> Result<bool, sqlx::Error> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?)");
    let exists = sqlx::query_scalar::<_, i64>(&sql)
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(exists != 0)
}

// Helper enum for typed SQLx binding
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    U64(u64),
    Str(String),
    Bool(bool),
    Date(NaiveDate),
}

/// Accumulates `AND`-ed conditions with their bind values.
#[derive(Debug, Default)]
pub struct WhereClause {
    conditions: Vec<String>,
    args: Vec<FilterValue>,
}

impl WhereClause {
    pub fn and(&mut self, condition: &str, value: FilterValue) -> &mut Self {
        self.conditions.push(condition.to_string());
        self.args.push(value);
        self
    }

    /// `LIKE %term%` across `columns`, OR-ed together. Blank terms are ignored.
    pub fn search(&mut self, columns: &[&str], term: &str) -> &mut Self {
        let term = term.trim();
        if term.is_empty() || columns.is_empty() {
            return self;
        }
        let like = format!("%{term}%");
        let condition = columns
            .iter()
            .map(|c| format!("{c} LIKE ?"))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.conditions.push(format!("({condition})"));
        self.args
            .extend(columns.iter().map(|_| FilterValue::Str(like.clone())));
        self
    }

    pub fn sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn args(&self) -> &[FilterValue] {
        &self.args
    }

    pub fn bind_scalar<'q, O>(
        &'q self,
        mut query: QueryScalar<'q, MySql, O, MySqlArguments>,
    ) -> QueryScalar<'q, MySql, O, MySqlArguments> {
        for arg in &self.args {
            query = match arg {
                FilterValue::U64(v) => query.bind(*v),
                FilterValue::Str(s) => query.bind(s.as_str()),
                FilterValue::Bool(b) => query.bind(*b),
                FilterValue::Date(d) => query.bind(*d),
            };
        }
        query
    }

    pub fn bind_as<'q, O>(
        &'q self,
        mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    ) -> QueryAs<'q, MySql, O, MySqlArguments> {
        for arg in &self.args {
            query = match arg {
                FilterValue::U64(v) => query.bind(*v),
                FilterValue::Str(s) => query.bind(s.as_str()),
                FilterValue::Bool(b) => query.bind(*b),
                FilterValue::Date(d) => query.bind(*d),
            };
        }
        query
    }
}

/// Resolves optional paging parameters to `(page, per_page, offset)` with
/// page >= 1 and per_page in 1..=100.
pub fn paginate(page: Option<u32>, per_page: Option<u32>) -> (u32, u32, u64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(20).clamp(1, 100);
    let offset = u64::from(page - 1) * u64::from(per_page);
    (page, per_page, offset)
}
