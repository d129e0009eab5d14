mod helpers;

use chrono::Duration;
use helpers::*;
use std::sync::Arc;
use tipster_backend::error::AppError;
use tipster_backend::services::EventUpdate;

#[tokio::test]
async fn test_full_round_scores_and_standings() {
    let app = TestApp::new();
    let admin = app.user("admin").await;
    let exact = app.user("exact").await;
    let outcome = app.user("outcome").await;
    let wrong = app.user("wrong").await;
    let draw = app.user("draw").await;
    let idle = app.user("idle").await;

    let group = app
        .group_with_members(&admin, &[&exact, &outcome, &wrong, &draw, &idle])
        .await;
    let event = app.event_at(&admin, group.id, Duration::hours(1)).await;

    assert!(app.bet(&exact, event.id, 2, 1).await);
    assert!(app.bet(&outcome, event.id, 3, 0).await);
    assert!(app.bet(&wrong, event.id, 1, 2).await);
    assert!(app.bet(&draw, event.id, 1, 1).await);

    app.kick_off(&admin, event.id).await;
    let detail = app
        .state
        .events
        .set_result(&admin, event.id, Some(2), Some(1))
        .await
        .unwrap();

    // all bets are visible once the event has started
    assert_eq!(detail.bets.len(), 4);
    assert_eq!(detail.num_bets, 4);

    assert_eq!(app.points_of(group.id, exact.id).await, 3);
    assert_eq!(app.points_of(group.id, outcome.id).await, 1);
    assert_eq!(app.points_of(group.id, wrong.id).await, 0);
    assert_eq!(app.points_of(group.id, draw.id).await, 0);
    assert_eq!(app.points_of(group.id, idle.id).await, 0);
    assert_eq!(app.points_of(group.id, admin.id).await, 0);

    let standings = app.state.groups.group_detail(group.id, None).await.unwrap().members;
    assert_eq!(standings[0].user.username, "exact");
    assert_eq!(standings.len(), 6);
}

#[tokio::test]
async fn test_rescoring_is_idempotent_and_corrections_replace_points() {
    let app = TestApp::new();
    let admin = app.user("admin").await;
    let fan = app.user("fan").await;
    let group = app.group_with_members(&admin, &[&fan]).await;
    let event = app.event_at(&admin, group.id, Duration::hours(1)).await;

    app.bet(&fan, event.id, 2, 1).await;
    app.kick_off(&admin, event.id).await;

    for _ in 0..2 {
        app.state
            .events
            .set_result(&admin, event.id, Some(2), Some(1))
            .await
            .unwrap();
        assert_eq!(app.points_of(group.id, fan.id).await, 3);
    }

    app.state
        .events
        .set_result(&admin, event.id, Some(3), Some(0))
        .await
        .unwrap();
    assert_eq!(app.points_of(group.id, fan.id).await, 1);
}

#[tokio::test]
async fn test_totals_sum_across_events() {
    let app = TestApp::new();
    let admin = app.user("admin").await;
    let fan = app.user("fan").await;
    let group = app.group_with_members(&admin, &[&fan]).await;

    let first = app.event_at(&admin, group.id, Duration::hours(1)).await;
    let second = app.event_at(&admin, group.id, Duration::hours(2)).await;
    let third = app.event_at(&admin, group.id, Duration::hours(3)).await;

    app.bet(&fan, first.id, 1, 0).await;
    app.bet(&fan, second.id, 0, 0).await;
    app.bet(&fan, third.id, 4, 4).await;

    app.kick_off(&admin, first.id).await;
    app.kick_off(&admin, second.id).await;
    app.state.events.set_result(&admin, first.id, Some(1), Some(0)).await.unwrap();
    app.state.events.set_result(&admin, second.id, Some(2), Some(2)).await.unwrap();

    // third is unscored and counts as zero
    assert_eq!(app.points_of(group.id, fan.id).await, 4);
}

#[tokio::test]
async fn test_second_bet_updates_existing() {
    let app = TestApp::new();
    let admin = app.user("admin").await;
    let fan = app.user("fan").await;
    let group = app.group_with_members(&admin, &[&fan]).await;
    let event = app.event_at(&admin, group.id, Duration::hours(1)).await;

    let first = app
        .state
        .betting
        .place_bet(&fan, event.id, Some(1), Some(0))
        .await
        .unwrap();
    let second = app
        .state
        .betting
        .place_bet(&fan, event.id, Some(0), Some(3))
        .await
        .unwrap();

    assert!(first.new);
    assert_eq!(first.message, "Bet Created");
    assert!(!second.new);
    assert_eq!(second.message, "Bet Updated");
    assert_eq!(first.result.id, second.result.id);
    assert_eq!((second.result.score1, second.result.score2), (0, 3));

    let detail = app.state.events.event_detail(&fan, event.id).await.unwrap();
    assert_eq!(detail.num_bets, 1);
}

#[tokio::test]
async fn test_bet_rejections() {
    let app = TestApp::new();
    let admin = app.user("admin").await;
    let fan = app.user("fan").await;
    let outsider = app.user("outsider").await;
    let group = app.group_with_members(&admin, &[&fan]).await;

    let open = app.event_at(&admin, group.id, Duration::hours(1)).await;
    let started = app.event_at(&admin, group.id, -Duration::minutes(1)).await;

    assert!(matches!(
        app.state.betting.place_bet(&outsider, open.id, Some(1), Some(0)).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        app.state.betting.place_bet(&outsider, started.id, Some(1), Some(0)).await,
        Err(AppError::Timing(_))
    ));
    assert!(matches!(
        app.state.betting.place_bet(&fan, started.id, Some(1), Some(0)).await,
        Err(AppError::Timing(_))
    ));
    assert!(matches!(
        app.state.betting.place_bet(&fan, open.id, None, Some(0)).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        app.state.betting.place_bet(&fan, uuid::Uuid::new_v4(), Some(1), Some(0)).await,
        Err(AppError::NotFound(_))
    ));

    // nothing was stored by the rejected attempts
    let detail = app.state.events.event_detail(&admin, started.id).await.unwrap();
    assert_eq!(detail.num_bets, 0);
}

#[tokio::test]
async fn test_rejoin_after_leaving() {
    let app = TestApp::new();
    let admin = app.user("admin").await;
    let fan = app.user("fan").await;
    let group = app.group_with_members(&admin, &[&fan]).await;

    assert!(matches!(
        app.state.groups.join(&fan, group.id, fan.id).await,
        Err(AppError::Conflict(_))
    ));

    app.state.groups.leave(&fan, group.id, fan.id).await.unwrap();
    app.state.groups.join(&fan, group.id, fan.id).await.unwrap();

    let detail = app.state.groups.group_detail(group.id, Some(fan.id)).await.unwrap();
    assert_eq!(detail.members.len(), 2);
    assert!(detail.is_member);
    assert!(!detail.is_admin);
}

#[tokio::test]
async fn test_event_update_rules() {
    let app = TestApp::new();
    let admin = app.user("admin").await;
    let fan = app.user("fan").await;
    let group = app.group_with_members(&admin, &[&fan]).await;
    let event = app.event_at(&admin, group.id, Duration::hours(1)).await;

    let rename = || EventUpdate {
        team1: Some("City".into()),
        ..EventUpdate::default()
    };

    assert!(matches!(
        app.state.events.update_event(&fan, event.id, rename()).await,
        Err(AppError::Forbidden(_))
    ));
    let renamed = app.state.events.update_event(&admin, event.id, rename()).await.unwrap();
    assert_eq!(renamed.team1, "City");

    app.kick_off(&admin, event.id).await;
    app.state.events.set_result(&admin, event.id, Some(0), Some(1)).await.unwrap();
    assert!(matches!(
        app.state.events.update_event(&admin, event.id, rename()).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_deleting_event_removes_its_points() {
    let app = TestApp::new();
    let admin = app.user("admin").await;
    let fan = app.user("fan").await;
    let group = app.group_with_members(&admin, &[&fan]).await;
    let event = app.event_at(&admin, group.id, Duration::hours(1)).await;

    app.bet(&fan, event.id, 1, 1).await;
    app.kick_off(&admin, event.id).await;
    app.state.events.set_result(&admin, event.id, Some(1), Some(1)).await.unwrap();
    assert_eq!(app.points_of(group.id, fan.id).await, 3);

    app.state.events.delete_event(&admin, event.id).await.unwrap();
    assert_eq!(app.points_of(group.id, fan.id).await, 0);
    assert!(matches!(
        app.state.events.event_detail(&admin, event.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_concurrent_bets_leave_one_row() {
    let app = Arc::new(TestApp::new());
    let admin = app.user("admin").await;
    let fan = app.user("fan").await;
    let group = app.group_with_members(&admin, &[&fan]).await;
    let event = app.event_at(&admin, group.id, Duration::hours(1)).await;

    let event_id = event.id;
    let mut handles = Vec::new();
    for i in 0..16 {
        let app = app.clone();
        let fan = fan.clone();
        handles.push(tokio::spawn(async move {
            app.state
                .betting
                .place_bet(&fan, event_id, Some(i % 4), Some(1))
                .await
                .unwrap()
                .new
        }));
    }

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap() {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    let detail = app.state.events.event_detail(&fan, event.id).await.unwrap();
    assert_eq!(detail.num_bets, 1);
}
