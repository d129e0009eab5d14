//! PostgreSQL repository tests.
//!
//! Run with `DATABASE_URL` pointing at a scratch server and `--ignored`;
//! `sqlx::test` creates a fresh database per test and applies ./migrations.

mod helpers;

use chrono::Duration;
use helpers::*;
use sqlx::{PgPool, Row};
use tipster_backend::error::RepositoryError;
use tipster_backend::models::*;
use tipster_backend::scoring::Scoreline;

// ============================================================================
// Migration Tests
// ============================================================================

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_migrations_ran(pool: PgPool) {
    let tables = vec![
        "users",
        "user_profiles",
        "auth_tokens",
        "groups",
        "members",
        "events",
        "bets",
        "comments",
    ];

    for table in tables {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = $1)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        let exists: bool = row.get(0);
        assert!(exists, "Table {} should exist", table);
    }
}

// ============================================================================
// User Repository Tests
// ============================================================================

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_user_token_lookup(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let user = db.create_user("alice").await;

    let found = db
        .repos
        .users
        .find_by_token_digest(&tipster_backend::auth::token_digest("alice"))
        .await
        .unwrap()
        .expect("token should resolve");
    assert_eq!(found.id, user.id);

    let profile = db.repos.users.find_profile(user.id).await.unwrap().unwrap();
    assert!(profile.image.is_none());
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_replace_token_revokes_old_digest(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let user = db.create_user("alice").await;
    let old = tipster_backend::auth::token_digest("alice");

    db.repos.users.replace_token(user.id, "fresh-digest").await.unwrap();

    assert!(db.repos.users.find_by_token_digest(&old).await.unwrap().is_none());
    let found = db.repos.users.find_by_token_digest("fresh-digest").await.unwrap().unwrap();
    assert_eq!(found.id, user.id);
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_duplicate_username(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    db.create_user("alice").await;

    let again = User::new("alice".to_string());
    let result = db
        .repos
        .users
        .create(&again, &UserProfile::empty(again.id), "other-digest")
        .await;
    assert!(matches!(result, Err(RepositoryError::Duplicate(_))));
}

// ============================================================================
// Group and Member Repository Tests
// ============================================================================

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_group_creation_adds_admin(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let admin = db.create_user("admin").await;
    let group = db.create_group(&admin, "Five-a-side").await;

    let member = db.repos.members.find(group.id, admin.id).await.unwrap().unwrap();
    assert!(member.admin);

    let dup = Group::new("Five-a-side".to_string(), "Dublin".to_string(), String::new());
    let result = db
        .repos
        .groups
        .create(&dup, &Member::new(dup.id, admin.id, true))
        .await;
    assert!(matches!(result, Err(RepositoryError::Duplicate(_))));
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_member_unique_and_rejoin(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let admin = db.create_user("admin").await;
    let fan = db.create_user("fan").await;
    let group = db.create_group(&admin, "Five-a-side").await;

    db.repos.members.add(&Member::new(group.id, fan.id, false)).await.unwrap();
    let dup = db.repos.members.add(&Member::new(group.id, fan.id, false)).await;
    assert!(matches!(dup, Err(RepositoryError::Duplicate(_))));

    assert!(db.repos.members.remove(group.id, fan.id).await.unwrap());
    assert!(!db.repos.members.remove(group.id, fan.id).await.unwrap());
    db.repos.members.add(&Member::new(group.id, fan.id, false)).await.unwrap();

    assert_eq!(db.repos.members.find_by_group(group.id).await.unwrap().len(), 2);
}

// ============================================================================
// Bet and Event Repository Tests
// ============================================================================

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_bet_upsert(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let admin = db.create_user("admin").await;
    let group = db.create_group(&admin, "Five-a-side").await;
    let event = db.create_event(group.id, Duration::hours(1)).await;

    let (first, created) = db
        .repos
        .bets
        .upsert(admin.id, event.id, Scoreline::new(1, 0))
        .await
        .unwrap();
    assert!(created);

    let (second, created) = db
        .repos
        .bets
        .upsert(admin.id, event.id, Scoreline::new(2, 2))
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(first.id, second.id);
    assert_eq!(second.prediction(), Scoreline::new(2, 2));
    assert_eq!(db.repos.bets.count_by_event(event.id).await.unwrap(), 1);

    let stored = db.repos.bets.find_by_event(event.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, first.id);
    assert!(stored[0].points.is_none());
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_finalize_scores_every_bet(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let admin = db.create_user("admin").await;
    let a = db.create_user("a").await;
    let b = db.create_user("b").await;
    let group = db.create_group(&admin, "Five-a-side").await;
    let event = db.create_event(group.id, -Duration::hours(1)).await;

    db.repos.bets.upsert(admin.id, event.id, Scoreline::new(2, 1)).await.unwrap();
    db.repos.bets.upsert(a.id, event.id, Scoreline::new(3, 0)).await.unwrap();
    db.repos.bets.upsert(b.id, event.id, Scoreline::new(1, 2)).await.unwrap();

    let (scored_event, bets) = db
        .repos
        .events
        .finalize(event.id, Scoreline::new(2, 1))
        .await
        .unwrap();
    assert_eq!(scored_event.result(), Some(Scoreline::new(2, 1)));

    let points = |user_id: uuid::Uuid| {
        bets.iter()
            .find(|bet| bet.user_id == user_id)
            .and_then(|bet| bet.points)
    };
    assert_eq!(points(admin.id), Some(3));
    assert_eq!(points(a.id), Some(1));
    assert_eq!(points(b.id), Some(0));

    // a corrected result overwrites
    let (_, bets) = db
        .repos
        .events
        .finalize(event.id, Scoreline::new(1, 2))
        .await
        .unwrap();
    let b_points = bets.iter().find(|bet| bet.user_id == b.id).unwrap().points;
    assert_eq!(b_points, Some(3));
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_group_delete_cascades(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let admin = db.create_user("admin").await;
    let group = db.create_group(&admin, "Five-a-side").await;
    let event = db.create_event(group.id, Duration::hours(1)).await;
    db.repos.bets.upsert(admin.id, event.id, Scoreline::new(0, 0)).await.unwrap();

    assert!(db.repos.groups.delete(group.id).await.unwrap());

    assert!(db.repos.events.find_by_id(event.id).await.unwrap().is_none());
    assert_eq!(db.repos.bets.count_by_event(event.id).await.unwrap(), 0);
    assert!(db.repos.members.find(group.id, admin.id).await.unwrap().is_none());
}
