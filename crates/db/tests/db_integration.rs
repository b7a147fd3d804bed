//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `travelboard_test`)
//!   `TEST_DB_PASSWORD` (default: `travelboard_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde_json::json;
use travelboard_common::AppError;
use travelboard_db::entities::{
    BoardActivity, BoardComment, BoardMember, BoardPin, CommentReaction, TimelineDay,
    TimelinePin, board::BoardVisibility, board_activity, board_activity::ActivityType,
    board_comment, board_member, board_member::BoardRole, board_pin, comment_reaction,
    timeline_day, timeline_pin,
};
use travelboard_db::repositories::{
    ActivityRepository, BoardMemberRepository, BoardPinRepository, BoardRepository,
    CommentReactionRepository, CommentRepository, FollowRepository, PinLikeRepository,
    TimelineRepository, ToggleKey,
};
use travelboard_db::test_utils::{
    TestDatabase, TestDbConfig, insert_board, insert_pin, insert_user,
};

async fn seeded() -> TestDatabase {
    let db = TestDatabase::create_unique().await.expect("create test db");
    let conn = db.connection();
    insert_user(conn, "owner").await.unwrap();
    insert_user(conn, "friend").await.unwrap();
    insert_pin(conn, "pin_a", "owner", "Senso-ji").await.unwrap();
    insert_pin(conn, "pin_b", "owner", "Tsukiji Outer Market").await.unwrap();
    insert_pin(conn, "pin_c", "friend", "Shibuya Crossing").await.unwrap();
    insert_board(conn, "board1", "owner", BoardVisibility::Private)
        .await
        .unwrap();
    db
}

fn reorder_entry() -> board_activity::ActiveModel {
    ActivityRepository::entry(
        ulid::Ulid::new().to_string(),
        "board1",
        "owner",
        ActivityType::SettingsUpdated,
        json!({"action": "pins_reordered"}),
    )
}

async fn insert_day(timeline: &TimelineRepository, id: &str, day_number: i32) {
    timeline
        .create_day(timeline_day::ActiveModel {
            id: Set(id.to_string()),
            board_id: Set("board1".to_string()),
            day_number: Set(day_number),
            title: Set(None),
            notes: Set(None),
            date: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        })
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_toggle_round_trip() {
    let db = seeded().await;
    let likes = PinLikeRepository::new(Arc::new(db.conn.clone()));
    let key = ToggleKey::new("friend", "pin_a");

    assert!(likes.toggle("l1".to_string(), &key).await.unwrap());
    assert!(!likes.toggle("l2".to_string(), &key).await.unwrap());
    assert!(likes.toggle("l3".to_string(), &key).await.unwrap());
    assert_eq!(likes.count_for_target("pin_a").await.unwrap(), 1);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_concurrent_toggle_never_duplicates() {
    let db = seeded().await;
    let conn = Arc::new(db.conn.clone());
    let key = ToggleKey::new("friend", "owner");

    let a = FollowRepository::new(conn.clone());
    let b = FollowRepository::new(conn.clone());
    let (ra, rb) = tokio::join!(a.toggle("f1".to_string(), &key), b.toggle("f2".to_string(), &key));
    ra.unwrap();
    rb.unwrap();

    assert!(a.count_for_target("owner").await.unwrap() <= 1);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_append_and_partial_reorder() {
    let db = seeded().await;
    let conn = Arc::new(db.conn.clone());
    let board_pins = BoardPinRepository::new(conn.clone());

    let a = board_pins
        .append("rel_a".to_string(), "board1", "pin_a", "owner", None, None)
        .await
        .unwrap();
    let b = board_pins
        .append("rel_b".to_string(), "board1", "pin_b", "owner", None, None)
        .await
        .unwrap();
    let c = board_pins
        .append("rel_c".to_string(), "board1", "pin_c", "friend", None, None)
        .await
        .unwrap();
    assert_eq!((a.display_order, b.display_order, c.display_order), (0, 1, 2));

    board_pins
        .reorder(
            "board1",
            &["rel_c".to_string(), "rel_a".to_string(), "unknown".to_string()],
            reorder_entry(),
        )
        .await
        .unwrap();

    let order = |id: &'static str| {
        let conn = conn.clone();
        async move {
            BoardPin::find_by_id(id)
                .one(conn.as_ref())
                .await
                .unwrap()
                .unwrap()
                .display_order
        }
    };
    assert_eq!(order("rel_c").await, 0);
    assert_eq!(order("rel_a").await, 1);
    assert_eq!(order("rel_b").await, 1);

    let logged = BoardActivity::find()
        .filter(board_activity::Column::BoardId.eq("board1"))
        .count(conn.as_ref())
        .await
        .unwrap();
    assert_eq!(logged, 1);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_board_delete_cascades() {
    let db = seeded().await;
    let conn = Arc::new(db.conn.clone());
    let board_pins = BoardPinRepository::new(conn.clone());
    let timeline = TimelineRepository::new(conn.clone());
    let activity = ActivityRepository::new(conn.clone());
    let boards = BoardRepository::new(conn.clone());

    for (rel, pin) in [("rel_a", "pin_a"), ("rel_b", "pin_b"), ("rel_c", "pin_c")] {
        board_pins
            .append(rel.to_string(), "board1", pin, "owner", None, None)
            .await
            .unwrap();
    }

    insert_day(&timeline, "day1", 1).await;
    insert_day(&timeline, "day2", 2).await;
    timeline.assign("tp1".to_string(), "day1", "pin_a").await.unwrap();
    timeline.assign("tp2".to_string(), "day1", "pin_b").await.unwrap();
    timeline.assign("tp3".to_string(), "day2", "pin_c").await.unwrap();

    BoardMemberRepository::new(conn.clone())
        .create(board_member::ActiveModel {
            id: Set("m1".to_string()),
            board_id: Set("board1".to_string()),
            user_id: Set("friend".to_string()),
            role: Set(BoardRole::CanAddPins),
            invited_by: Set(Some("owner".to_string())),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        })
        .await
        .unwrap();

    CommentRepository::new(conn.clone())
        .create(board_comment::ActiveModel {
            id: Set("c1".to_string()),
            board_id: Set("board1".to_string()),
            user_id: Set("friend".to_string()),
            content: Set("Book the ryokan early".to_string()),
            is_pinned: Set(false),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();
    assert!(
        CommentReactionRepository::new(conn.clone())
            .toggle("r1".to_string(), &ToggleKey::with_variant("owner", "c1", "👍"))
            .await
            .unwrap()
    );

    for _ in 0..5 {
        activity.record(reorder_entry()).await.unwrap();
    }

    boards.delete_cascade("board1").await.unwrap();

    let pins_left = BoardPin::find()
        .filter(board_pin::Column::BoardId.eq("board1"))
        .count(conn.as_ref())
        .await
        .unwrap();
    let days_left = TimelineDay::find()
        .filter(timeline_day::Column::BoardId.eq("board1"))
        .count(conn.as_ref())
        .await
        .unwrap();
    let scheduled_left = TimelinePin::find()
        .filter(timeline_pin::Column::DayId.is_in(["day1", "day2"]))
        .count(conn.as_ref())
        .await
        .unwrap();
    let members_left = BoardMember::find()
        .filter(board_member::Column::BoardId.eq("board1"))
        .count(conn.as_ref())
        .await
        .unwrap();
    let comments_left = BoardComment::find()
        .filter(board_comment::Column::BoardId.eq("board1"))
        .count(conn.as_ref())
        .await
        .unwrap();
    let reactions_left = CommentReaction::find()
        .filter(comment_reaction::Column::CommentId.eq("c1"))
        .count(conn.as_ref())
        .await
        .unwrap();
    let activity_left = BoardActivity::find()
        .filter(board_activity::Column::BoardId.eq("board1"))
        .count(conn.as_ref())
        .await
        .unwrap();

    assert_eq!((pins_left, days_left, scheduled_left), (0, 0, 0));
    assert_eq!((members_left, comments_left, reactions_left), (0, 0, 0));
    assert_eq!(activity_left, 0);
    assert!(boards.find_by_id("board1").await.unwrap().is_none());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_removing_board_pin_unschedules_it() {
    let db = seeded().await;
    let conn = Arc::new(db.conn.clone());
    let board_pins = BoardPinRepository::new(conn.clone());
    let timeline = TimelineRepository::new(conn.clone());

    board_pins
        .append("rel_a".to_string(), "board1", "pin_a", "owner", None, None)
        .await
        .unwrap();
    board_pins
        .append("rel_b".to_string(), "board1", "pin_b", "owner", None, None)
        .await
        .unwrap();
    insert_day(&timeline, "day1", 1).await;
    insert_day(&timeline, "day2", 2).await;
    timeline.assign("tp1".to_string(), "day1", "pin_a").await.unwrap();
    timeline.assign("tp2".to_string(), "day2", "pin_a").await.unwrap();
    timeline.assign("tp3".to_string(), "day1", "pin_b").await.unwrap();

    assert!(board_pins.remove("board1", "pin_a").await.unwrap());

    let scheduled: Vec<String> = timeline
        .find_pins_by_days(&["day1".to_string(), "day2".to_string()])
        .await
        .unwrap()
        .into_iter()
        .map(|(assignment, _)| assignment.pin_id)
        .collect();
    assert_eq!(scheduled, vec!["pin_b".to_string()]);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_assignment_is_rejected() {
    let db = seeded().await;
    let conn = Arc::new(db.conn.clone());
    let board_pins = BoardPinRepository::new(conn.clone());
    let timeline = TimelineRepository::new(conn.clone());

    board_pins
        .append("rel_a".to_string(), "board1", "pin_a", "owner", None, None)
        .await
        .unwrap();
    let again = board_pins
        .append("rel_a2".to_string(), "board1", "pin_a", "owner", None, None)
        .await;
    assert!(matches!(again, Err(AppError::Validation(_))));

    insert_day(&timeline, "day1", 1).await;
    let (first, second) = tokio::join!(
        timeline.assign("tp1".to_string(), "day1", "pin_a"),
        timeline.assign("tp2".to_string(), "day1", "pin_a"),
    );
    assert_eq!(
        [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
        1
    );

    let rows = TimelinePin::find()
        .filter(timeline_pin::Column::DayId.eq("day1"))
        .count(conn.as_ref())
        .await
        .unwrap();
    assert_eq!(rows, 1);

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
}
