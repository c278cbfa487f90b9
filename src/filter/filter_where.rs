use sqlx::{Postgres, QueryBuilder};

use super::predicate::{ColumnRef, LikeTarget, Operand, Predicate, SqlValue, Subquery};
use crate::database::schema::TableRef;

/// Renders predicates into a `QueryBuilder`. Identifiers are quoted,
/// values always go through `push_bind`.
pub struct FilterWhere;

impl FilterWhere {
    pub fn push(qb: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate) {
        match predicate {
            Predicate::True => {
                qb.push("TRUE");
            }
            Predicate::False => {
                qb.push("FALSE");
            }
            Predicate::Compare { left, op, right } => {
                Self::push_column(qb, left);
                qb.push(op.to_sql());
                match right {
                    Operand::Column(column) => Self::push_column(qb, column),
                    Operand::Value(value) => Self::push_value(qb, value),
                }
            }
            Predicate::Between { column, low, high, negated } => {
                Self::push_column(qb, column);
                qb.push(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                Self::push_value(qb, low);
                qb.push(" AND ");
                Self::push_value(qb, high);
            }
            Predicate::InList { column, values, negated } => {
                // Empty membership can never match; empty exclusion always does
                if values.is_empty() {
                    qb.push(if *negated { "TRUE" } else { "1=0" });
                    return;
                }
                Self::push_column(qb, column);
                qb.push(if *negated { " NOT IN (" } else { " IN (" });
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        qb.push(", ");
                    }
                    Self::push_value(qb, value);
                }
                qb.push(")");
            }
            Predicate::IsNull { column, negated } => {
                Self::push_column(qb, column);
                qb.push(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Predicate::Like { target, pattern, negated } => {
                match target {
                    LikeTarget::Column(column) => Self::push_column(qb, column),
                    LikeTarget::LowerConcat(columns) => {
                        qb.push("CONCAT(");
                        for (i, column) in columns.iter().enumerate() {
                            if i > 0 {
                                qb.push(", ");
                            }
                            qb.push("COALESCE(LOWER(");
                            Self::push_column(qb, column);
                            qb.push("), ' ')");
                        }
                        qb.push(")");
                    }
                }
                qb.push(if *negated { " NOT LIKE " } else { " LIKE " });
                qb.push_bind(pattern.clone());
            }
            Predicate::Exists { subquery, negated } => {
                qb.push(if *negated { "NOT EXISTS (" } else { "EXISTS (" });
                Self::push_subquery(qb, subquery);
                qb.push(")");
            }
            Predicate::And(parts) => Self::push_joined(qb, parts, " AND "),
            Predicate::Or(parts) => Self::push_joined(qb, parts, " OR "),
        }
    }

    fn push_joined(qb: &mut QueryBuilder<'static, Postgres>, parts: &[Predicate], joiner: &str) {
        qb.push("(");
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                qb.push(joiner);
            }
            Self::push(qb, part);
        }
        qb.push(")");
    }

    fn push_subquery(qb: &mut QueryBuilder<'static, Postgres>, subquery: &Subquery) {
        qb.push("SELECT 1 FROM ");
        Self::push_table(qb, &subquery.from);
        if let Some(join) = &subquery.join {
            qb.push(" INNER JOIN ");
            Self::push_table(qb, &join.table);
            qb.push(" ON ");
            Self::push(qb, &join.on);
        }
        qb.push(" WHERE ");
        Self::push(qb, &subquery.filter);
    }

    fn push_table(qb: &mut QueryBuilder<'static, Postgres>, table: &TableRef) {
        qb.push(quote(table.table));
        qb.push(" ");
        qb.push(quote(table.alias));
    }

    pub fn push_column(qb: &mut QueryBuilder<'static, Postgres>, column: &ColumnRef) {
        qb.push(quote(column.qualifier));
        qb.push(".");
        qb.push(quote(column.name));
    }

    fn push_value(qb: &mut QueryBuilder<'static, Postgres>, value: &SqlValue) {
        match value {
            SqlValue::Text(v) => qb.push_bind(v.clone()),
            SqlValue::BigInt(v) => qb.push_bind(*v),
            SqlValue::Decimal(v) => qb.push_bind(v.clone()),
            SqlValue::Bool(v) => qb.push_bind(*v),
            SqlValue::Timestamp(v) => qb.push_bind(*v),
            SqlValue::Date(v) => qb.push_bind(*v),
        };
    }
}

/// Double-quote an identifier. Inputs are static descriptor names, but quotes
/// are still doubled so the output is always a single identifier.
pub fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::predicate::{Comparison, Join};

    const NAME: ColumnRef = ColumnRef::new("accounts", "name");
    const CITY: ColumnRef = ColumnRef::new("accounts", "city");

    fn render(predicate: &Predicate) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("");
        FilterWhere::push(&mut qb, predicate);
        qb.sql().to_string()
    }

    #[test]
    fn comparison_binds_value() {
        let sql = render(&Predicate::eq(NAME, SqlValue::Text("Acme".into())));
        assert_eq!(sql, r#""accounts"."name" = $1"#);
    }

    #[test]
    fn conjunction_numbers_parameters_in_order() {
        let sql = render(&Predicate::and(vec![
            Predicate::eq(NAME, SqlValue::Text("Acme".into())),
            Predicate::Between {
                column: CITY,
                low: SqlValue::Text("A".into()),
                high: SqlValue::Text("M".into()),
                negated: true,
            },
        ]));
        assert_eq!(sql, r#"("accounts"."name" = $1 AND "accounts"."city" NOT BETWEEN $2 AND $3)"#);
    }

    #[test]
    fn empty_lists_render_constants() {
        let empty_in = Predicate::InList { column: NAME, values: vec![], negated: false };
        let empty_not_in = Predicate::InList { column: NAME, values: vec![], negated: true };
        assert_eq!(render(&empty_in), "1=0");
        assert_eq!(render(&empty_not_in), "TRUE");
    }

    #[test]
    fn membership_lists_every_value() {
        let sql = render(&Predicate::InList {
            column: CITY,
            values: vec![SqlValue::Text("Pune".into()), SqlValue::Text("Goa".into())],
            negated: false,
        });
        assert_eq!(sql, r#""accounts"."city" IN ($1, $2)"#);
    }

    #[test]
    fn search_concatenates_lowered_columns() {
        let sql = render(&Predicate::Like {
            target: LikeTarget::LowerConcat(vec![NAME, CITY]),
            pattern: "%acme%".into(),
            negated: false,
        });
        assert_eq!(
            sql,
            r#"CONCAT(COALESCE(LOWER("accounts"."name"), ' '), COALESCE(LOWER("accounts"."city"), ' ')) LIKE $1"#
        );
    }

    #[test]
    fn exists_renders_join_and_filter() {
        let c = TableRef { table: "customers", alias: "c" };
        let a = TableRef { table: "crm_assignments", alias: "a" };
        let predicate = Predicate::not_exists(Subquery {
            from: c,
            join: Some(Join {
                table: a,
                on: Predicate::columns_eq(ColumnRef::new("a", "phone_number"), ColumnRef::new("c", "phone_number")),
            }),
            filter: Predicate::Compare {
                left: ColumnRef::new("c", "account_id"),
                op: Comparison::Eq,
                right: Operand::Column(ColumnRef::new("accounts", "id")),
            },
        });
        assert_eq!(
            render(&predicate),
            r#"NOT EXISTS (SELECT 1 FROM "customers" "c" INNER JOIN "crm_assignments" "a" ON "a"."phone_number" = "c"."phone_number" WHERE "c"."account_id" = "accounts"."id")"#
        );
    }

    #[test]
    fn quoting_doubles_embedded_quotes() {
        assert_eq!(quote("na\"me"), "\"na\"\"me\"");
    }
}
