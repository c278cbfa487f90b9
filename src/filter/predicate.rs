use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde_json::Value;
use std::str::FromStr;

use crate::database::schema::{ColumnType, TableRef};

/// A column qualified by the table (or alias) it is read from. Both parts are
/// static identifiers taken from schema descriptors, never from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef {
    pub qualifier: &'static str,
    pub name: &'static str,
}

impl ColumnRef {
    pub const fn new(qualifier: &'static str, name: &'static str) -> Self {
        Self { qualifier, name }
    }
}

/// A typed value bound as a query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    BigInt(i64),
    Decimal(BigDecimal),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
}

impl SqlValue {
    /// Coerce a JSON value to the column's type. `None` when the value cannot
    /// represent that type; null never coerces.
    pub fn coerce(column_type: ColumnType, value: &Value) -> Option<SqlValue> {
        match column_type {
            ColumnType::Text => match value {
                Value::String(s) => Some(SqlValue::Text(s.clone())),
                Value::Number(n) => Some(SqlValue::Text(n.to_string())),
                _ => None,
            },
            ColumnType::BigInt => match value {
                Value::Number(n) => n.as_i64().map(SqlValue::BigInt),
                Value::String(s) => s.trim().parse().ok().map(SqlValue::BigInt),
                _ => None,
            },
            ColumnType::Numeric => match value {
                Value::Number(n) => BigDecimal::from_str(&n.to_string()).ok().map(SqlValue::Decimal),
                Value::String(s) => BigDecimal::from_str(s.trim()).ok().map(SqlValue::Decimal),
                _ => None,
            },
            ColumnType::Boolean => match value {
                Value::Bool(b) => Some(SqlValue::Bool(*b)),
                Value::Number(n) => match n.as_i64() {
                    Some(0) => Some(SqlValue::Bool(false)),
                    Some(1) => Some(SqlValue::Bool(true)),
                    _ => None,
                },
                Value::String(s) => match s.trim() {
                    "true" | "1" => Some(SqlValue::Bool(true)),
                    "false" | "0" => Some(SqlValue::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
            ColumnType::Timestamp => value.as_str().and_then(parse_timestamp).map(SqlValue::Timestamp),
            ColumnType::Date => value.as_str().and_then(parse_date).map(SqlValue::Date),
        }
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and a bare
/// date, which means midnight UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(s).map(|ts| ts.date_naive()))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(ColumnRef),
    Value(SqlValue),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    pub fn to_sql(&self) -> &'static str {
        match self {
            Comparison::Eq => " = ",
            Comparison::Ne => " <> ",
            Comparison::Gt => " > ",
            Comparison::Gte => " >= ",
            Comparison::Lt => " < ",
            Comparison::Lte => " <= ",
        }
    }
}

/// Left side of a LIKE
#[derive(Debug, Clone, PartialEq)]
pub enum LikeTarget {
    Column(ColumnRef),
    /// Lower-cased columns concatenated, nulls replaced by a single space
    LowerConcat(Vec<ColumnRef>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: TableRef,
    pub on: Predicate,
}

/// `SELECT 1 FROM <from> [JOIN <join> ON ...] WHERE <filter>`
#[derive(Debug, Clone, PartialEq)]
pub struct Subquery {
    pub from: TableRef,
    pub join: Option<Join>,
    pub filter: Predicate,
}

/// Boolean expression over columns and bound values. Rendering to SQL lives in
/// `filter_where`; nothing here touches a query string.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    True,
    False,
    Compare { left: ColumnRef, op: Comparison, right: Operand },
    Between { column: ColumnRef, low: SqlValue, high: SqlValue, negated: bool },
    InList { column: ColumnRef, values: Vec<SqlValue>, negated: bool },
    IsNull { column: ColumnRef, negated: bool },
    Like { target: LikeTarget, pattern: String, negated: bool },
    Exists { subquery: Box<Subquery>, negated: bool },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(column: ColumnRef, value: SqlValue) -> Self {
        Predicate::Compare { left: column, op: Comparison::Eq, right: Operand::Value(value) }
    }

    pub fn columns_eq(left: ColumnRef, right: ColumnRef) -> Self {
        Predicate::Compare { left, op: Comparison::Eq, right: Operand::Column(right) }
    }

    pub fn exists(subquery: Subquery) -> Self {
        Predicate::Exists { subquery: Box::new(subquery), negated: false }
    }

    pub fn not_exists(subquery: Subquery) -> Self {
        Predicate::Exists { subquery: Box::new(subquery), negated: true }
    }

    /// Conjunction with `True` parts dropped. A `False` part collapses the whole.
    pub fn and(parts: Vec<Predicate>) -> Self {
        let mut kept = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                Predicate::True => {}
                Predicate::False => return Predicate::False,
                Predicate::And(inner) => kept.extend(inner),
                other => kept.push(other),
            }
        }
        match kept.len() {
            0 => Predicate::True,
            1 => kept.remove(0),
            _ => Predicate::And(kept),
        }
    }

    /// Disjunction with `False` parts dropped. A `True` part collapses the whole.
    pub fn or(parts: Vec<Predicate>) -> Self {
        let mut kept = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                Predicate::False => {}
                Predicate::True => return Predicate::True,
                Predicate::Or(inner) => kept.extend(inner),
                other => kept.push(other),
            }
        }
        match kept.len() {
            0 => Predicate::False,
            1 => kept.remove(0),
            _ => Predicate::Or(kept),
        }
    }
}
