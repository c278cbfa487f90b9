//! Static descriptors for the CRM tables. Every identifier that reaches SQL
//! text is taken from here; caller input only ever selects among them.

use crate::filter::types::SortDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    BigInt,
    Numeric,
    Boolean,
    Timestamp,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub name: &'static str,
    pub column_type: ColumnType,
}

const fn attr(name: &'static str, column_type: ColumnType) -> Attribute {
    Attribute { name, column_type }
}

/// A table as it appears in a FROM clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRef {
    pub table: &'static str,
    pub alias: &'static str,
}

/// Extra projection and many-to-one joins used by the listing query
#[derive(Debug, Clone, Copy)]
pub struct ListingView {
    pub select: &'static str,
    pub joins: &'static str,
}

#[derive(Debug)]
pub struct EntitySchema {
    pub table: &'static str,
    pub attributes: &'static [Attribute],
    pub sortable: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub org_column: &'static str,
    /// Rows with this boolean set are never listed
    pub deleted_flag: Option<&'static str>,
    pub default_sort: (&'static str, SortDirection),
    pub listing: ListingView,
}

impl EntitySchema {
    pub fn attribute(&self, name: &str) -> Option<&'static Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn sortable_column(&self, name: &str) -> Option<&'static str> {
        self.sortable.iter().copied().find(|c| *c == name)
    }
}

/// One-to-many link from a parent entity to child rows
#[derive(Debug)]
pub struct Relation {
    pub child: TableRef,
    pub foreign_key: &'static str,
    pub parent_key: &'static str,
    /// Boolean column marking soft-deleted children
    pub deleted_flag: Option<&'static str>,
}

/// Assignment rows keyed by a child attribute, scoped per organisation
#[derive(Debug)]
pub struct AssignmentLink {
    pub table: TableRef,
    pub link_column: &'static str,
    pub child_column: &'static str,
    pub org_column: &'static str,
    pub assignee_column: &'static str,
}

use ColumnType::*;

pub static ACCOUNTS: EntitySchema = EntitySchema {
    table: "accounts",
    attributes: &[
        attr("id", BigInt),
        attr("name", Text),
        attr("industry", Text),
        attr("website", Text),
        attr("phone_number", Text),
        attr("email", Text),
        attr("address", Text),
        attr("city", Text),
        attr("state", Text),
        attr("country", Text),
        attr("postal_code", Text),
        attr("source", Text),
        attr("account_type", Text),
        attr("org_id", BigInt),
        attr("created_by", BigInt),
        attr("created_at", Timestamp),
        attr("updated_at", Timestamp),
    ],
    sortable: &[
        "id",
        "name",
        "industry",
        "email",
        "phone_number",
        "city",
        "state",
        "country",
        "account_type",
        "source",
        "created_at",
        "updated_at",
    ],
    search_fields: &[
        "name",
        "email",
        "phone_number",
        "address",
        "city",
        "state",
        "country",
        "industry",
        "account_type",
    ],
    org_column: "org_id",
    deleted_flag: None,
    default_sort: ("created_at", SortDirection::Desc),
    listing: ListingView {
        select: r#""accounts".*, "o"."name" AS organisation_name, "u"."first_name" AS creator_first_name, "u"."last_name" AS creator_last_name, (SELECT COUNT(*) FROM "customers" "cc" WHERE "cc"."account_id" = "accounts"."id" AND "cc"."is_deleted" = FALSE) AS customer_count, (SELECT COUNT(*) FROM "invoices" "ii" WHERE "ii"."account_id" = "accounts"."id") AS invoice_count"#,
        joins: r#" LEFT JOIN "organisations" "o" ON "o"."id" = "accounts"."org_id" LEFT JOIN "users" "u" ON "u"."id" = "accounts"."created_by""#,
    },
};

pub static CUSTOMERS: EntitySchema = EntitySchema {
    table: "customers",
    attributes: &[
        attr("id", BigInt),
        attr("account_id", BigInt),
        attr("name", Text),
        attr("phone_number", Text),
        attr("email", Text),
        attr("address1", Text),
        attr("address2", Text),
        attr("address3", Text),
        attr("category", Text),
        attr("is_deleted", Boolean),
        attr("org_id", BigInt),
        attr("created_by", BigInt),
        attr("created_at", Timestamp),
        attr("updated_at", Timestamp),
    ],
    sortable: &["id", "name", "email", "phone_number", "category", "created_at", "updated_at"],
    search_fields: &["name", "email", "phone_number"],
    org_column: "org_id",
    deleted_flag: Some("is_deleted"),
    default_sort: ("created_at", SortDirection::Desc),
    listing: ListingView {
        select: r#""customers".*, "acc"."name" AS account_name"#,
        joins: r#" LEFT JOIN "accounts" "acc" ON "acc"."id" = "customers"."account_id""#,
    },
};

pub static INVOICES: EntitySchema = EntitySchema {
    table: "invoices",
    attributes: &[
        attr("id", BigInt),
        attr("account_id", BigInt),
        attr("invoice_type", Text),
        attr("ref_no", Text),
        attr("inv_date", Date),
        attr("inv_title", Text),
        attr("to_name", Text),
        attr("to_address", Text),
        attr("tax_rate", Numeric),
        attr("org_id", BigInt),
        attr("created_at", Timestamp),
        attr("updated_at", Timestamp),
    ],
    sortable: &["id", "ref_no", "inv_date", "inv_title", "to_name", "invoice_type", "created_at", "updated_at"],
    search_fields: &["ref_no", "inv_title", "to_name"],
    org_column: "org_id",
    deleted_flag: None,
    default_sort: ("created_at", SortDirection::Desc),
    listing: ListingView {
        select: r#""invoices".*, "acc"."name" AS account_name, (SELECT COUNT(*) FROM "invoice_items" "it" WHERE "it"."invoice_id" = "invoices"."id") AS item_count"#,
        joins: r#" LEFT JOIN "accounts" "acc" ON "acc"."id" = "invoices"."account_id""#,
    },
};

/// accounts -> live customers
pub static ACCOUNT_CUSTOMERS: Relation = Relation {
    child: TableRef { table: "customers", alias: "c" },
    foreign_key: "account_id",
    parent_key: "id",
    deleted_flag: Some("is_deleted"),
};

/// customers -> crm_assignments, matched on phone number within an organisation
pub static CUSTOMER_ASSIGNMENTS: AssignmentLink = AssignmentLink {
    table: TableRef { table: "crm_assignments", alias: "a" },
    link_column: "phone_number",
    child_column: "phone_number",
    org_column: "org_id",
    assignee_column: "assigned_to",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sortable_and_search_columns_are_attributes() {
        for schema in [&ACCOUNTS, &CUSTOMERS, &INVOICES] {
            for column in schema.sortable.iter().chain(schema.search_fields) {
                assert!(
                    schema.attribute(column).is_some(),
                    "{}.{} is not a declared attribute",
                    schema.table,
                    column
                );
            }
            assert!(schema.attribute(schema.org_column).is_some());
            assert!(schema.sortable_column(schema.default_sort.0).is_some());
            assert!(schema.sortable_column("id").is_some());
        }
    }

    #[test]
    fn search_fields_are_text() {
        for schema in [&ACCOUNTS, &CUSTOMERS, &INVOICES] {
            for column in schema.search_fields {
                assert_eq!(schema.attribute(column).map(|a| a.column_type), Some(ColumnType::Text));
            }
        }
    }
}
