use serde_json::{Map, Value};

use super::error::FilterError;
use super::predicate::{ColumnRef, Comparison, LikeTarget, Operand, Predicate, SqlValue};
use super::types::{Arity, ControlValues, FilterOp, FilterParams};
use crate::database::schema::{Attribute, ColumnType, EntitySchema};

pub const OFFSET_KEY: &str = "offset";
pub const LIMIT_KEY: &str = "limit";
pub const SORTING_KEY: &str = "sorting";
pub const SEARCH_KEY: &str = "search_attr";

/// Output of one compilation: field predicates, the optional free-text
/// search predicate and the untouched pagination/ordering values.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    pub clauses: Vec<Predicate>,
    pub search: Option<Predicate>,
    pub controls: ControlValues,
}

impl CompiledFilter {
    pub fn empty() -> Self {
        Self { clauses: vec![], search: None, controls: ControlValues::default() }
    }

    /// Every clause and the search predicate, conjoined
    pub fn predicate(&self) -> Predicate {
        let mut parts = self.clauses.clone();
        parts.extend(self.search.clone());
        Predicate::and(parts)
    }
}

impl FilterParams {
    /// Parse the `filters` and `filter_op` query parameters. Both must be JSON
    /// objects when present.
    pub fn from_query(filters: Option<&str>, filter_op: Option<&str>) -> Result<Self, FilterError> {
        Ok(Self {
            filter: Self::parse_object("filters", filters)?,
            filter_op: Self::parse_object("filter_op", filter_op)?,
        })
    }

    fn parse_object(param: &'static str, raw: Option<&str>) -> Result<Option<Map<String, Value>>, FilterError> {
        let raw = match raw.map(str::trim) {
            None | Some("") => return Ok(None),
            Some(raw) => raw,
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            Ok(Value::Null) => Ok(None),
            Ok(_) => Err(FilterError::NotAnObject(param)),
            Err(source) => Err(FilterError::InvalidJson { param, source }),
        }
    }
}

/// Turns a caller's filter and operator maps into predicates over one entity.
pub struct FilterCompiler {
    schema: &'static EntitySchema,
}

impl FilterCompiler {
    pub fn new(schema: &'static EntitySchema) -> Self {
        Self { schema }
    }

    pub fn compile(&self, params: &FilterParams) -> Result<CompiledFilter, FilterError> {
        let empty = Map::new();
        let ops = params.filter_op.as_ref().unwrap_or(&empty);
        Self::validate_operators(ops)?;

        let filter = match &params.filter {
            Some(filter) => filter,
            None => return Ok(CompiledFilter::empty()),
        };

        let mut compiled = CompiledFilter::empty();
        for (key, value) in filter {
            match key.as_str() {
                OFFSET_KEY => compiled.controls.offset = Some(value.clone()),
                LIMIT_KEY => compiled.controls.limit = Some(value.clone()),
                SORTING_KEY => compiled.controls.sorting = Some(value.clone()),
                SEARCH_KEY => compiled.search = self.search(value, op_for(ops, key))?,
                _ => {
                    let Some(attribute) = self.schema.attribute(key) else {
                        tracing::debug!("Dropping filter on unknown field '{}'", key);
                        continue;
                    };
                    let clause = match op_for(ops, key) {
                        Some(op) => self.clause(attribute, op, value)?,
                        None => self.implicit_clause(attribute, value)?,
                    };
                    compiled.clauses.push(clause);
                }
            }
        }

        if crate::config::CONFIG.filter.debug_logging {
            tracing::debug!(
                "Compiled {} filter clauses for {} (search: {})",
                compiled.clauses.len(),
                self.schema.table,
                compiled.search.is_some()
            );
        }

        Ok(compiled)
    }

    /// Every operator token is checked before any clause is built, so one bad
    /// token rejects the whole request.
    fn validate_operators(map: &Map<String, Value>) -> Result<(), FilterError> {
        for (field, token) in map {
            let token = token.as_str().ok_or_else(|| FilterError::OperatorNotString(field.clone()))?;
            if FilterOp::from_token(token).is_none() {
                return Err(FilterError::UnsupportedOperator { field: field.clone(), token: token.to_string() });
            }
        }
        Ok(())
    }

    fn column(&self, attribute: &'static Attribute) -> ColumnRef {
        ColumnRef::new(self.schema.table, attribute.name)
    }

    /// No operator given: arrays mean membership, null means IS NULL, anything
    /// else is equality.
    fn implicit_clause(&self, attribute: &'static Attribute, value: &Value) -> Result<Predicate, FilterError> {
        match value {
            Value::Array(_) => self.clause(attribute, FilterOp::In, value),
            _ => self.clause(attribute, FilterOp::Eq, value),
        }
    }

    fn clause(&self, attribute: &'static Attribute, op: FilterOp, value: &Value) -> Result<Predicate, FilterError> {
        let column = self.column(attribute);
        match op.arity() {
            Arity::Nullary => Ok(Predicate::IsNull { column, negated: op == FilterOp::Not }),
            Arity::Pair => {
                let pair = value.as_array().filter(|a| a.len() == 2).ok_or_else(|| {
                    FilterError::InvalidOperatorData(format!("{} on '{}' requires exactly 2 values", op.token(), attribute.name))
                })?;
                Ok(Predicate::Between {
                    column,
                    low: coerce(attribute, &pair[0])?,
                    high: coerce(attribute, &pair[1])?,
                    negated: op == FilterOp::NotBetween,
                })
            }
            Arity::List => {
                let items = value.as_array().ok_or_else(|| {
                    FilterError::InvalidOperatorData(format!("{} on '{}' requires an array", op.token(), attribute.name))
                })?;
                let values = items.iter().map(|v| coerce(attribute, v)).collect::<Result<Vec<_>, _>>()?;
                Ok(Predicate::InList { column, values, negated: op == FilterOp::NotIn })
            }
            Arity::Scalar if op.is_pattern() => {
                if attribute.column_type != ColumnType::Text {
                    return Err(FilterError::InvalidOperatorData(format!(
                        "{} is only supported on text fields, '{}' is not one",
                        op.token(),
                        attribute.name
                    )));
                }
                let text = pattern_text(attribute.name, value)?;
                Ok(pattern(LikeTarget::Column(column), op, &text, escape_like))
            }
            Arity::Scalar => {
                let comparison = match op {
                    FilterOp::Eq => Comparison::Eq,
                    FilterOp::Ne => Comparison::Ne,
                    FilterOp::Gt => Comparison::Gt,
                    FilterOp::Gte => Comparison::Gte,
                    FilterOp::Lt => Comparison::Lt,
                    _ => Comparison::Lte,
                };
                if value.is_null() {
                    return match comparison {
                        Comparison::Eq => Ok(Predicate::IsNull { column, negated: false }),
                        Comparison::Ne => Ok(Predicate::IsNull { column, negated: true }),
                        _ => Err(FilterError::InvalidOperatorData(format!(
                            "{} on '{}' cannot compare against null",
                            op.token(),
                            attribute.name
                        ))),
                    };
                }
                Ok(Predicate::Compare { left: column, op: comparison, right: Operand::Value(coerce(attribute, value)?) })
            }
        }
    }

    /// Case-insensitive match of one pattern against the concatenation of the
    /// entity's search fields. Ignored unless an operator was supplied.
    fn search(&self, value: &Value, op: Option<FilterOp>) -> Result<Option<Predicate>, FilterError> {
        let Some(op) = op else {
            return Ok(None);
        };
        if !op.is_pattern() {
            return Err(FilterError::InvalidOperatorData(format!(
                "{} cannot be used with {}, use like, notLike, substring, startsWith or endsWith",
                op.token(),
                SEARCH_KEY
            )));
        }
        if self.schema.search_fields.is_empty() {
            return Ok(None);
        }
        let text = escape_search(&pattern_text(SEARCH_KEY, value)?.to_lowercase());
        let columns = self
            .schema
            .search_fields
            .iter()
            .map(|name| ColumnRef::new(self.schema.table, name))
            .collect();
        Ok(Some(pattern(LikeTarget::LowerConcat(columns), op, &text, str::to_string)))
    }
}

fn op_for(ops: &Map<String, Value>, key: &str) -> Option<FilterOp> {
    ops.get(key).and_then(Value::as_str).and_then(FilterOp::from_token)
}

fn coerce(attribute: &Attribute, value: &Value) -> Result<SqlValue, FilterError> {
    SqlValue::coerce(attribute.column_type, value).ok_or_else(|| FilterError::InvalidValue {
        field: attribute.name.to_string(),
        expected: expected_name(attribute.column_type),
    })
}

fn expected_name(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Text => "a string",
        ColumnType::BigInt => "an integer",
        ColumnType::Numeric => "a number",
        ColumnType::Boolean => "a boolean",
        ColumnType::Timestamp => "a timestamp",
        ColumnType::Date => "a date",
    }
}

fn pattern_text(field: &str, value: &Value) -> Result<String, FilterError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(FilterError::InvalidValue { field: field.to_string(), expected: "a string" }),
    }
}

/// `like`/`notLike` take the text verbatim; the other pattern operators
/// escape it and add their own wildcards. Search text arrives pre-escaped.
fn pattern(target: LikeTarget, op: FilterOp, text: &str, escape: fn(&str) -> String) -> Predicate {
    let pattern = match op {
        FilterOp::StartsWith => format!("{}%", escape(text)),
        FilterOp::EndsWith => format!("%{}", escape(text)),
        FilterOp::Substring => format!("%{}%", escape(text)),
        _ => text.to_string(),
    };
    Predicate::Like { target, pattern, negated: op == FilterOp::NotLike }
}

/// Escape every LIKE metacharacter
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Search text keeps `%` as a wildcard; only `_` and the escape character are literal.
pub fn escape_search(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\\' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::ACCOUNTS;
    use serde_json::json;

    fn params(filter: Value, filter_op: Value) -> FilterParams {
        FilterParams {
            filter: filter.as_object().cloned(),
            filter_op: filter_op.as_object().cloned(),
        }
    }

    fn compile(filter: Value, filter_op: Value) -> Result<CompiledFilter, FilterError> {
        FilterCompiler::new(&ACCOUNTS).compile(&params(filter, filter_op))
    }

    const NAME: ColumnRef = ColumnRef::new("accounts", "name");

    #[test]
    fn equality_with_explicit_operator() {
        let compiled = compile(json!({"account_type": "Customer"}), json!({"account_type": "eq"})).unwrap();
        assert_eq!(
            compiled.clauses,
            vec![Predicate::eq(ColumnRef::new("accounts", "account_type"), SqlValue::Text("Customer".into()))]
        );
        assert!(compiled.search.is_none());
    }

    #[test]
    fn unsupported_operator_rejects_whole_request() {
        let err = compile(
            json!({"name": "Acme", "city": "Pune"}),
            json!({"name": "eq", "city": "frobnicate"}),
        )
        .unwrap_err();
        match err {
            FilterError::UnsupportedOperator { field, token } => {
                assert_eq!(field, "city");
                assert_eq!(token, "frobnicate");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn operator_without_filter_value_is_ignored() {
        let compiled = compile(json!({"name": "Acme"}), json!({"name": "eq", "city": "like"})).unwrap();
        assert_eq!(compiled.clauses.len(), 1);
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let compiled = compile(json!({"no_such_column": 1, "name": "Acme"}), json!({})).unwrap();
        assert_eq!(compiled.clauses, vec![Predicate::eq(NAME, SqlValue::Text("Acme".into()))]);
    }

    #[test]
    fn control_keys_pass_through() {
        let sorting = json!([{"colId": "name", "sort": "asc"}]);
        let compiled = compile(json!({"offset": 20, "limit": 10, "sorting": sorting}), json!({})).unwrap();
        assert!(compiled.clauses.is_empty());
        assert_eq!(compiled.controls.offset, Some(json!(20)));
        assert_eq!(compiled.controls.limit, Some(json!(10)));
        assert_eq!(compiled.controls.sorting, Some(sorting));
    }

    #[test]
    fn implicit_array_means_membership() {
        let compiled = compile(json!({"city": ["Pune", "Goa"]}), json!({})).unwrap();
        assert_eq!(
            compiled.clauses,
            vec![Predicate::InList {
                column: ColumnRef::new("accounts", "city"),
                values: vec![SqlValue::Text("Pune".into()), SqlValue::Text("Goa".into())],
                negated: false,
            }]
        );
    }

    #[test]
    fn eq_null_becomes_is_null() {
        let compiled = compile(json!({"industry": null, "email": null}), json!({"email": "ne"})).unwrap();
        assert!(compiled.clauses.contains(&Predicate::IsNull { column: ColumnRef::new("accounts", "industry"), negated: false }));
        assert!(compiled.clauses.contains(&Predicate::IsNull { column: ColumnRef::new("accounts", "email"), negated: true }));
    }

    #[test]
    fn nullary_operators_ignore_the_value() {
        let compiled = compile(json!({"website": "anything"}), json!({"website": "not"})).unwrap();
        assert_eq!(
            compiled.clauses,
            vec![Predicate::IsNull { column: ColumnRef::new("accounts", "website"), negated: true }]
        );
    }

    #[test]
    fn between_requires_a_pair() {
        let err = compile(json!({"created_at": ["2025-11-17"]}), json!({"created_at": "between"})).unwrap_err();
        assert!(matches!(err, FilterError::InvalidOperatorData(_)));

        let compiled = compile(
            json!({"created_at": ["2025-11-17 00:00:00", "2025-11-18"]}),
            json!({"created_at": "between"}),
        )
        .unwrap();
        match &compiled.clauses[0] {
            Predicate::Between { low, high, negated, .. } => {
                assert!(!negated);
                assert!(matches!(low, SqlValue::Timestamp(_)));
                assert!(matches!(high, SqlValue::Timestamp(_)));
            }
            other => panic!("expected Between, got {:?}", other),
        }
    }

    #[test]
    fn values_are_typed_by_column() {
        let compiled = compile(json!({"created_by": "7"}), json!({"created_by": "gt"})).unwrap();
        assert_eq!(
            compiled.clauses,
            vec![Predicate::Compare {
                left: ColumnRef::new("accounts", "created_by"),
                op: Comparison::Gt,
                right: Operand::Value(SqlValue::BigInt(7)),
            }]
        );

        let err = compile(json!({"created_by": "seven"}), json!({})).unwrap_err();
        assert!(matches!(err, FilterError::InvalidValue { .. }));
    }

    #[test]
    fn pattern_operators_escape_metacharacters() {
        let compiled = compile(json!({"name": "50%_off"}), json!({"name": "substring"})).unwrap();
        assert_eq!(
            compiled.clauses,
            vec![Predicate::Like {
                target: LikeTarget::Column(NAME),
                pattern: "%50\\%\\_off%".into(),
                negated: false,
            }]
        );

        let compiled = compile(json!({"name": "Ac%"}), json!({"name": "like"})).unwrap();
        assert_eq!(
            compiled.clauses,
            vec![Predicate::Like { target: LikeTarget::Column(NAME), pattern: "Ac%".into(), negated: false }]
        );
    }

    #[test]
    fn pattern_operators_require_text_columns() {
        let err = compile(json!({"created_by": "1"}), json!({"created_by": "startsWith"})).unwrap_err();
        assert!(matches!(err, FilterError::InvalidOperatorData(_)));
    }

    #[test]
    fn search_needs_an_operator() {
        let compiled = compile(json!({"search_attr": "acme"}), json!({})).unwrap();
        assert!(compiled.search.is_none());
        assert!(compiled.clauses.is_empty());
    }

    #[test]
    fn search_lowercases_and_escapes_underscore() {
        let compiled = compile(json!({"search_attr": "ACME_co"}), json!({"search_attr": "substring"})).unwrap();
        match compiled.search {
            Some(Predicate::Like { target: LikeTarget::LowerConcat(columns), pattern, negated }) => {
                assert_eq!(pattern, "%acme\\_co%");
                assert!(!negated);
                assert_eq!(columns.len(), ACCOUNTS.search_fields.len());
                assert_eq!(columns[0], NAME);
            }
            other => panic!("expected search predicate, got {:?}", other),
        }
    }

    #[test]
    fn search_like_keeps_percent_but_escapes_underscore() {
        let compiled = compile(json!({"search_attr": "%ACME_co%"}), json!({"search_attr": "like"})).unwrap();
        match compiled.search {
            Some(Predicate::Like { pattern, negated, .. }) => {
                assert_eq!(pattern, "%acme\\_co%");
                assert!(!negated);
            }
            other => panic!("expected search predicate, got {:?}", other),
        }

        let compiled = compile(json!({"search_attr": "a\\b_"}), json!({"search_attr": "notLike"})).unwrap();
        match compiled.search {
            Some(Predicate::Like { pattern, negated, .. }) => {
                assert_eq!(pattern, "a\\\\b\\_");
                assert!(negated);
            }
            other => panic!("expected search predicate, got {:?}", other),
        }
    }

    #[test]
    fn search_rejects_non_text_operators() {
        let err = compile(json!({"search_attr": "acme"}), json!({"search_attr": "between"})).unwrap_err();
        assert!(matches!(err, FilterError::InvalidOperatorData(_)));
    }

    #[test]
    fn query_params_must_be_json_objects() {
        let err = FilterParams::from_query(Some("{not json"), None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid filters format. Must be valid JSON.");

        let err = FilterParams::from_query(None, Some("[1,2]")).unwrap_err();
        assert!(matches!(err, FilterError::NotAnObject("filter_op")));

        let parsed = FilterParams::from_query(Some(""), None).unwrap();
        assert!(parsed.filter.is_none());
    }

    #[test]
    fn empty_input_compiles_to_true() {
        let compiled = FilterCompiler::new(&ACCOUNTS).compile(&FilterParams::default()).unwrap();
        assert_eq!(compiled.predicate(), Predicate::True);
    }
}
