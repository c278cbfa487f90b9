mod common;

use anyhow::Result;
use axum::http::StatusCode;

// Database-backed; skipped unless DATABASE_URL is set.

struct Fixture {
    org: i64,
    orphan: i64,
    assigned_to_u1: i64,
    unassigned: i64,
    assigned_to_u3: i64,
}

const U1: i64 = 101;
const U2: i64 = 102;
const U3: i64 = 103;

async fn fixture(pool: &sqlx::PgPool) -> Result<Fixture> {
    let org = common::random_org_id();
    let phone = |n: u8| format!("+91 {}{:04}", org % 100_000, n);

    // A: no customers at all
    let orphan = common::insert_account(pool, org, "A orphan", None, common::minutes_ago(4)).await?;

    // B: one customer, assigned to U1
    let assigned_to_u1 = common::insert_account(pool, org, "B assigned", None, common::minutes_ago(3)).await?;
    common::insert_customer(pool, org, assigned_to_u1, &phone(1), false).await?;
    common::assign(pool, org, &phone(1), U1).await?;

    // C: customers nobody is assigned to
    let unassigned = common::insert_account(pool, org, "C pool", None, common::minutes_ago(2)).await?;
    common::insert_customer(pool, org, unassigned, &phone(2), false).await?;
    common::insert_customer(pool, org, unassigned, &phone(3), false).await?;

    // D: assigned only to U3
    let assigned_to_u3 = common::insert_account(pool, org, "D other", None, common::minutes_ago(1)).await?;
    common::insert_customer(pool, org, assigned_to_u3, &phone(4), false).await?;
    common::assign(pool, org, &phone(4), U3).await?;

    Ok(Fixture { org, orphan, assigned_to_u1, unassigned, assigned_to_u3 })
}

async fn visible(app: &axum::Router, org: i64, user_id: i64, user_type: &str) -> Result<Vec<i64>> {
    let token = common::token(Some(user_id), Some(org), user_type);
    let (status, body) = common::get(app, "/api/accounts/list", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["total"].as_i64(), Some(common::ids(&body).len() as i64), "{}", body);
    Ok(common::ids(&body))
}

#[tokio::test]
async fn assignee_sees_orphans_pool_and_own_accounts() -> Result<()> {
    let Some(pool) = common::db_pool().await else { return Ok(()) };
    let f = fixture(&pool).await?;
    let app = crm_api_rust::app(pool);

    let ids = visible(&app, f.org, U1, "sales").await?;

    assert_eq!(ids, vec![f.unassigned, f.assigned_to_u1, f.orphan]);
    Ok(())
}

#[tokio::test]
async fn other_member_does_not_see_accounts_assigned_elsewhere() -> Result<()> {
    let Some(pool) = common::db_pool().await else { return Ok(()) };
    let f = fixture(&pool).await?;
    let app = crm_api_rust::app(pool);

    let ids = visible(&app, f.org, U2, "sales").await?;

    assert_eq!(ids, vec![f.unassigned, f.orphan]);
    assert!(!ids.contains(&f.assigned_to_u1));
    assert!(!ids.contains(&f.assigned_to_u3));
    Ok(())
}

#[tokio::test]
async fn second_assignee_also_sees_a_shared_account() -> Result<()> {
    let Some(pool) = common::db_pool().await else { return Ok(()) };
    let f = fixture(&pool).await?;
    let phone = format!("+91 {}{:04}", f.org % 100_000, 9);
    common::insert_customer(&pool, f.org, f.assigned_to_u1, &phone, false).await?;
    common::assign(&pool, f.org, &phone, U2).await?;
    let app = crm_api_rust::app(pool);

    assert!(visible(&app, f.org, U1, "sales").await?.contains(&f.assigned_to_u1));
    assert!(visible(&app, f.org, U2, "sales").await?.contains(&f.assigned_to_u1));
    Ok(())
}

#[tokio::test]
async fn admins_see_everything_in_their_organisation() -> Result<()> {
    let Some(pool) = common::db_pool().await else { return Ok(()) };
    let f = fixture(&pool).await?;
    let app = crm_api_rust::app(pool);

    let ids = visible(&app, f.org, 1, "admin").await?;

    assert_eq!(ids, vec![f.assigned_to_u3, f.unassigned, f.assigned_to_u1, f.orphan]);
    Ok(())
}

#[tokio::test]
async fn deleted_customers_do_not_count() -> Result<()> {
    let Some(pool) = common::db_pool().await else { return Ok(()) };
    let org = common::random_org_id();
    let account = common::insert_account(&pool, org, "Ghosts", None, common::minutes_ago(1)).await?;
    let phone = format!("+44 {}", org);
    common::insert_customer(&pool, org, account, &phone, true).await?;
    common::assign(&pool, org, &phone, U3).await?;
    let app = crm_api_rust::app(pool);

    // Only a soft-deleted customer, so the account counts as orphaned
    let ids = visible(&app, org, U1, "sales").await?;

    assert_eq!(ids, vec![account]);
    Ok(())
}
