//! Store tests against a live PostgreSQL.
//!
//! **Requirements:**
//! - PostgreSQL running at DATABASE_URL (migrations are applied on connect)
//! - Without DATABASE_URL every test returns early.
//!
//! Tests insert their own users and logs, assert only on the rows they
//! created, and clean up afterwards.

use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use worklog_api::store::postgres::PgStore;
use worklog_api::store::WorklogStore;
use worklog_api::worklog::query::{TimeWindow, WorklogFilter};

async fn connect() -> Option<PgStore> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping postgres tests");
            return None;
        }
    };
    let store = PgStore::connect(&url).await.expect("connect to DATABASE_URL");
    store.migrate().await.expect("apply migrations");
    Some(store)
}

fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn tag() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

async fn insert_user(store: &PgStore, username: &str) -> Uuid {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO system_users (user_id, username, password) VALUES ($1, $2, 'x')")
        .bind(id)
        .bind(username)
        .execute(store.pool())
        .await
        .unwrap();
    id
}

async fn insert_log(store: &PgStore, user_id: Option<Uuid>, start: &str, end: &str) -> Uuid {
    let id = Uuid::now_v7();
    sqlx::query(
        r#"INSERT INTO work_logs (log_id, user_id, details, start_time, end_time, work_time)
           VALUES ($1, $2, 'test entry', $3, $4, 1)"#,
    )
    .bind(id)
    .bind(user_id)
    .bind(dt(start))
    .bind(dt(end))
    .execute(store.pool())
    .await
    .unwrap();
    id
}

async fn cleanup(store: &PgStore, logs: &[Uuid], users: &[Uuid]) {
    sqlx::query("DELETE FROM work_logs WHERE log_id = ANY($1)")
        .bind(logs)
        .execute(store.pool())
        .await
        .unwrap();
    sqlx::query("DELETE FROM system_users WHERE user_id = ANY($1)")
        .bind(users)
        .execute(store.pool())
        .await
        .unwrap();
}

fn work_filter(start: &str, end: &str, username: Option<&str>) -> WorklogFilter {
    WorklogFilter {
        work_window: Some(TimeWindow {
            start: dt(start),
            end: dt(end),
        }),
        created_window: None,
        username: username.map(String::from),
    }
}

#[tokio::test]
async fn test_username_filter_is_case_insensitive_substring() {
    let Some(store) = connect().await else { return };
    let t = tag();

    let alice = insert_user(&store, &format!("Alice{}", t)).await;
    let bob = insert_user(&store, &format!("Bob{}", t)).await;
    let alice_log = insert_log(&store, Some(alice), "2191-03-01 09:00:00", "2191-03-01 10:00:00").await;
    let bob_log = insert_log(&store, Some(bob), "2191-03-01 11:00:00", "2191-03-01 12:00:00").await;

    let rows = store
        .query_worklogs(&work_filter("2191-03-01 00:00:00", "2191-03-01 23:59:59", Some("ali")))
        .await
        .unwrap();
    let ids: Vec<Uuid> = rows.iter().map(|r| r.log_id).collect();

    assert!(ids.contains(&alice_log));
    assert!(!ids.contains(&bob_log));
    let row = rows.iter().find(|r| r.log_id == alice_log).unwrap();
    assert_eq!(row.username.as_deref(), Some(format!("Alice{}", t).as_str()));
    assert_eq!(row.user_id, Some(alice));

    cleanup(&store, &[alice_log, bob_log], &[alice, bob]).await;
}

#[tokio::test]
async fn test_deleted_user_leaves_log_with_null_username() {
    let Some(store) = connect().await else { return };

    let user = insert_user(&store, &format!("Gone{}", tag())).await;
    let log = insert_log(&store, Some(user), "2192-05-10 09:00:00", "2192-05-10 10:00:00").await;
    sqlx::query("DELETE FROM system_users WHERE user_id = $1")
        .bind(user)
        .execute(store.pool())
        .await
        .unwrap();

    let rows = store
        .query_worklogs(&work_filter("2192-05-10 00:00:00", "2192-05-10 23:59:59", None))
        .await
        .unwrap();
    let row = rows.iter().find(|r| r.log_id == log).expect("orphaned log is returned");
    assert_eq!(row.user_id, None);
    assert_eq!(row.username, None);

    cleanup(&store, &[log], &[]).await;
}

#[tokio::test]
async fn test_work_window_bounds_and_ordering() {
    let Some(store) = connect().await else { return };

    let inside_late = insert_log(&store, None, "2193-07-01 10:00:00", "2193-07-01 12:00:00").await;
    let inside_early = insert_log(&store, None, "2193-07-01 08:00:00", "2193-07-01 09:00:00").await;
    let starts_before = insert_log(&store, None, "2193-07-01 07:59:59", "2193-07-01 09:00:00").await;
    let ends_after = insert_log(&store, None, "2193-07-01 11:00:00", "2193-07-01 12:00:01").await;

    let rows = store
        .query_worklogs(&work_filter("2193-07-01 08:00:00", "2193-07-01 12:00:00", None))
        .await
        .unwrap();
    let ids: Vec<Uuid> = rows.iter().map(|r| r.log_id).collect();

    assert!(ids.contains(&inside_late));
    assert!(ids.contains(&inside_early));
    assert!(!ids.contains(&starts_before));
    assert!(!ids.contains(&ends_after));

    let late_pos = ids.iter().position(|id| *id == inside_late).unwrap();
    let early_pos = ids.iter().position(|id| *id == inside_early).unwrap();
    assert!(late_pos < early_pos, "results are ordered by start_time descending");

    cleanup(&store, &[inside_late, inside_early, starts_before, ends_after], &[]).await;
}

#[tokio::test]
async fn test_created_window_compares_utc_insert_time() {
    let Some(store) = connect().await else { return };

    let log = insert_log(&store, None, "2194-01-01 09:00:00", "2194-01-01 10:00:00").await;
    let now_utc = Utc::now().naive_utc();

    let around_now = WorklogFilter {
        work_window: None,
        created_window: Some(TimeWindow {
            start: now_utc - chrono::Duration::minutes(5),
            end: now_utc + chrono::Duration::minutes(5),
        }),
        username: None,
    };
    let rows = store.query_worklogs(&around_now).await.unwrap();
    let row = rows.iter().find(|r| r.log_id == log).expect("fresh log inside window");
    assert!(row.created_at.is_some());

    let last_year = WorklogFilter {
        created_window: Some(TimeWindow {
            start: now_utc - chrono::Duration::days(400),
            end: now_utc - chrono::Duration::days(365),
        }),
        ..around_now
    };
    let rows = store.query_worklogs(&last_year).await.unwrap();
    assert!(rows.iter().all(|r| r.log_id != log));

    cleanup(&store, &[log], &[]).await;
}

#[tokio::test]
async fn test_ping() {
    let Some(store) = connect().await else { return };
    store.ping().await.unwrap();
}
