use thiserror::Error;

use super::types::FilterOp;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid {param} format. Must be valid JSON.")]
    InvalidJson {
        param: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid {0} format. Must be a JSON object.")]
    NotAnObject(&'static str),

    #[error("{token} is not allowed, you may try with {}", FilterOp::allowed_tokens())]
    UnsupportedOperator { field: String, token: String },

    #[error("Operator for '{0}' must be a string")]
    OperatorNotString(String),

    #[error("Invalid operator data: {0}")]
    InvalidOperatorData(String),

    #[error("Invalid value for '{field}': expected {expected}")]
    InvalidValue { field: String, expected: &'static str },

    #[error("Sorting on '{0}' is not allowed")]
    InvalidSortColumn(String),

    #[error("Invalid sort direction '{0}', expected asc or desc")]
    InvalidSortDirection(String),

    #[error("Invalid sorting: {0}")]
    InvalidSorting(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Invalid offset: {0}")]
    InvalidOffset(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_operator_names_token_and_allowed_set() {
        let err = FilterError::UnsupportedOperator { field: "x".into(), token: "frobnicate".into() };
        let message = err.to_string();
        assert!(message.starts_with("frobnicate is not allowed"));
        assert!(message.contains("eq, ne, gt"));
        assert!(message.contains("substring"));
    }
}
