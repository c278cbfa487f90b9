use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Operators accepted in `filter_op`. The token set is closed: anything else
/// rejects the whole request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
    NotBetween,
    In,
    NotIn,
    Like,
    NotLike,
    StartsWith,
    EndsWith,
    Substring,
    Is,
    Not,
}

/// Shape of the value an operator consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Nullary,
    Scalar,
    Pair,
    List,
}

impl FilterOp {
    pub const ALL: [FilterOp; 17] = [
        FilterOp::Eq,
        FilterOp::Ne,
        FilterOp::Gt,
        FilterOp::Gte,
        FilterOp::Lt,
        FilterOp::Lte,
        FilterOp::Between,
        FilterOp::NotBetween,
        FilterOp::In,
        FilterOp::NotIn,
        FilterOp::Like,
        FilterOp::NotLike,
        FilterOp::StartsWith,
        FilterOp::EndsWith,
        FilterOp::Substring,
        FilterOp::Is,
        FilterOp::Not,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Ne => "ne",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::Between => "between",
            FilterOp::NotBetween => "notBetween",
            FilterOp::In => "in",
            FilterOp::NotIn => "notIn",
            FilterOp::Like => "like",
            FilterOp::NotLike => "notLike",
            FilterOp::StartsWith => "startsWith",
            FilterOp::EndsWith => "endsWith",
            FilterOp::Substring => "substring",
            FilterOp::Is => "is",
            FilterOp::Not => "not",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.token() == token)
    }

    /// Comma separated list of every accepted token, used in error messages
    pub fn allowed_tokens() -> String {
        Self::ALL.iter().map(|op| op.token()).collect::<Vec<_>>().join(", ")
    }

    pub fn arity(&self) -> Arity {
        match self {
            FilterOp::Is | FilterOp::Not => Arity::Nullary,
            FilterOp::Between | FilterOp::NotBetween => Arity::Pair,
            FilterOp::In | FilterOp::NotIn => Arity::List,
            _ => Arity::Scalar,
        }
    }

    /// Operators that lower to a LIKE pattern
    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            FilterOp::Like | FilterOp::NotLike | FilterOp::StartsWith | FilterOp::EndsWith | FilterOp::Substring
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: &'static str,
    pub direction: SortDirection,
}

/// Pagination and ordering values found in the filter map. They are not
/// predicates, so the compiler hands them through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlValues {
    pub offset: Option<Value>,
    pub limit: Option<Value>,
    pub sorting: Option<Value>,
}

/// Raw `filters` / `filter_op` maps as received from the caller
#[derive(Debug, Clone, Default)]
pub struct FilterParams {
    pub filter: Option<Map<String, Value>>,
    pub filter_op: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip() {
        for op in FilterOp::ALL {
            assert_eq!(FilterOp::from_token(op.token()), Some(op));
        }
        assert_eq!(FilterOp::from_token("frobnicate"), None);
        assert_eq!(FilterOp::from_token("EQ"), None);
    }

    #[test]
    fn serde_names_match_tokens() {
        for op in FilterOp::ALL {
            let json = serde_json::to_value(op).unwrap();
            assert_eq!(json, Value::String(op.token().to_string()));
        }
    }

    #[test]
    fn sort_direction_is_case_insensitive() {
        assert_eq!(SortDirection::parse("DESC"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("asc"), Some(SortDirection::Asc));
        assert_eq!(SortDirection::parse("up"), None);
    }
}
