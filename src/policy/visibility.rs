use crate::auth::UserType;
use crate::database::schema::{AssignmentLink, EntitySchema, Relation, ACCOUNTS, ACCOUNT_CUSTOMERS, CUSTOMER_ASSIGNMENTS};
use crate::filter::predicate::{ColumnRef, Join, Subquery};
use crate::filter::{Predicate, SqlValue};
use crate::middleware::AuthUser;

/// Role-dependent row restriction for a parent entity whose children may be
/// assigned to users.
///
/// Non-admin callers see a parent row when any of the following holds:
/// - it has no live children
/// - one of its children is assigned to the caller
/// - it has live children and none of them is assigned to anyone
///
/// Admins are unrestricted. A caller missing a user or organisation id sees
/// nothing.
pub struct VisibilityPolicy {
    parent: &'static EntitySchema,
    children: &'static Relation,
    assignments: &'static AssignmentLink,
}

impl VisibilityPolicy {
    pub fn new(parent: &'static EntitySchema, children: &'static Relation, assignments: &'static AssignmentLink) -> Self {
        Self { parent, children, assignments }
    }

    pub fn accounts() -> Self {
        Self::new(&ACCOUNTS, &ACCOUNT_CUSTOMERS, &CUSTOMER_ASSIGNMENTS)
    }

    /// `None` means no restriction
    pub fn restrict(&self, caller: &AuthUser) -> Option<Predicate> {
        self.restrict_for(&caller.user_type, caller.user_id, caller.org_id)
    }

    pub fn restrict_for(&self, user_type: &UserType, user_id: Option<i64>, org_id: Option<i64>) -> Option<Predicate> {
        if user_type.is_admin() {
            return None;
        }

        let (Some(user_id), Some(org_id)) = (user_id, org_id) else {
            tracing::warn!("Visibility requested without user or organisation, denying all rows");
            return Some(Predicate::False);
        };

        Some(Predicate::or(vec![
            Predicate::not_exists(self.live_children()),
            Predicate::exists(self.assigned_children(org_id, Some(user_id))),
            Predicate::and(vec![
                Predicate::exists(self.live_children()),
                Predicate::not_exists(self.assigned_children(org_id, None)),
            ]),
        ]))
    }

    fn child_column(&self, name: &'static str) -> ColumnRef {
        ColumnRef::new(self.children.child.alias, name)
    }

    fn assignment_column(&self, name: &'static str) -> ColumnRef {
        ColumnRef::new(self.assignments.table.alias, name)
    }

    /// Children belonging to the current parent row, soft-deleted ones excluded
    fn belongs_to_parent(&self) -> Predicate {
        let mut parts = vec![Predicate::columns_eq(
            self.child_column(self.children.foreign_key),
            ColumnRef::new(self.parent.table, self.children.parent_key),
        )];
        if let Some(flag) = self.children.deleted_flag {
            parts.push(Predicate::eq(self.child_column(flag), SqlValue::Bool(false)));
        }
        Predicate::and(parts)
    }

    fn live_children(&self) -> Subquery {
        Subquery { from: self.children.child, join: None, filter: self.belongs_to_parent() }
    }

    /// Live children with an assignment in the organisation; narrowed to one
    /// assignee when given.
    fn assigned_children(&self, org_id: i64, assignee: Option<i64>) -> Subquery {
        let on = Predicate::and(vec![
            Predicate::columns_eq(
                self.assignment_column(self.assignments.link_column),
                self.child_column(self.assignments.child_column),
            ),
            Predicate::eq(self.assignment_column(self.assignments.org_column), SqlValue::BigInt(org_id)),
        ]);

        let mut filter = vec![self.belongs_to_parent()];
        if let Some(user_id) = assignee {
            filter.push(Predicate::eq(
                self.assignment_column(self.assignments.assignee_column),
                SqlValue::BigInt(user_id),
            ));
        }

        Subquery {
            from: self.children.child,
            join: Some(Join { table: self.assignments.table, on }),
            filter: Predicate::and(filter),
        }
    }
}
