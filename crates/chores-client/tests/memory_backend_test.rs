use std::sync::Arc;

use chores_client::{ApiError, ChoresApi, MemoryBackend};
use chores_common::pin::Pin;
use chores_common::Frequency;
use chores_proto::{ChildUpdate, HistoryQuery};
use chrono::NaiveDateTime;

fn backend_at(now: &'static str) -> MemoryBackend {
    MemoryBackend::with_clock(Arc::new(move || {
        NaiveDateTime::parse_from_str(now, "%Y-%m-%d %H:%M:%S").unwrap()
    }))
}

#[tokio::test]
async fn test_created_chore_is_listed_with_requested_frequency() {
    let backend = backend_at("2024-03-06 09:00:00");
    let child = backend.create_child("Ada").await.unwrap();

    let created = backend.create_chore(child.id, "Water plants", Frequency::Weekly).await.unwrap();
    let chores = backend.get_chores(child.id).await.unwrap();

    assert_eq!(chores.len(), 1);
    assert_eq!(chores[0].id, created.id);
    assert_eq!(chores[0].title, "Water plants");
    assert_eq!(chores[0].frequency, Frequency::Weekly);
    assert!(!chores[0].completed);
}

#[tokio::test]
async fn test_pin_set_then_verify() {
    let backend = MemoryBackend::new();
    assert!(!backend.pin_exists().await.unwrap().exists);

    let no_pin = backend.verify_pin(&Pin::new("1234")).await.unwrap();
    assert!(!no_pin.ok);
    assert_eq!(no_pin.data.error.as_deref(), Some("No PIN set"));

    assert!(backend.set_pin(&Pin::new("1234"), None).await.unwrap().ok);
    assert!(backend.pin_exists().await.unwrap().exists);
    assert!(backend.verify_pin(&Pin::new("1234")).await.unwrap().is_valid());
    assert!(!backend.verify_pin(&Pin::new("4321")).await.unwrap().is_valid());
}

#[tokio::test]
async fn test_pin_change_rules() {
    let backend = MemoryBackend::new();
    let short = backend.set_pin(&Pin::new("12"), None).await.unwrap();
    assert_eq!(short.error_message(), Some("PIN must be at least 4 digits"));

    backend.set_pin(&Pin::new("1234"), None).await.unwrap();

    let missing = backend.set_pin(&Pin::new("5678"), None).await.unwrap();
    assert_eq!(missing.error_message(), Some("Current PIN required"));

    let wrong = backend.set_pin(&Pin::new("5678"), Some(&Pin::new("0000"))).await.unwrap();
    assert_eq!(wrong.error_message(), Some("Invalid current PIN"));

    let changed = backend.set_pin(&Pin::new("5678"), Some(&Pin::new("1234"))).await.unwrap();
    assert!(changed.ok);
    assert!(backend.verify_pin(&Pin::new("5678")).await.unwrap().is_valid());
}

#[tokio::test]
async fn test_complete_and_uncomplete_for_today() {
    let backend = backend_at("2024-03-06 07:30:00");
    let child = backend.create_child("Sam").await.unwrap();
    let chore = backend.create_chore(child.id, "Feed cat", Frequency::Daily).await.unwrap();

    let completion = backend.complete_chore(chore.id).await.unwrap();
    assert!(completion.success);
    assert_eq!(completion.completed_at.as_deref(), Some("2024-03-06 07:30:00"));

    let listed = backend.get_chores(child.id).await.unwrap();
    assert!(listed[0].completed);

    assert!(backend.uncomplete_chore(chore.id).await.unwrap().success);
    let listed = backend.get_chores(child.id).await.unwrap();
    assert!(!listed[0].completed);
}

#[tokio::test]
async fn test_history_groups_by_day_and_child() {
    let backend = backend_at("2024-03-06 19:00:00");
    let sam = backend.create_child("Sam").await.unwrap();
    let ada = backend.create_child("Ada").await.unwrap();
    let bed = backend.create_chore(sam.id, "Make bed", Frequency::Daily).await.unwrap();
    let cat = backend.create_chore(ada.id, "Feed cat", Frequency::Daily).await.unwrap();
    backend.complete_chore(bed.id).await.unwrap();
    backend.complete_chore(cat.id).await.unwrap();

    let history = backend.get_history(&HistoryQuery::default()).await.unwrap().history;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].date, "2024-03-06");
    let names: Vec<_> = history[0].children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Ada", "Sam"]);

    let only_sam = backend.get_history(&HistoryQuery::days(7).for_child(sam.id)).await.unwrap();
    assert_eq!(only_sam.history[0].children.len(), 1);

    let child_history = backend.get_child_history(ada.id, None).await.unwrap();
    assert_eq!(child_history.history[0].chores[0].title, "Feed cat");
}

#[tokio::test]
async fn test_validation_and_missing_entities() {
    let backend = MemoryBackend::new();

    let err = backend.create_child("   ").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 400, .. }));

    assert!(backend.get_child(42).await.unwrap_err().is_not_found());
    assert!(backend.update_child(42, &ChildUpdate::rename("X")).await.unwrap_err().is_not_found());
    assert!(backend.complete_chore(42).await.unwrap_err().is_not_found());
    assert!(backend.create_chore(42, "Dishes", Frequency::Daily).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_delete_child_removes_their_chores() {
    let backend = MemoryBackend::new();
    let child = backend.create_child("Ada").await.unwrap();
    backend.create_chore(child.id, "Dishes", Frequency::Daily).await.unwrap();

    assert!(backend.delete_child(child.id).await.unwrap().success);
    assert!(backend.get_children().await.unwrap().is_empty());
    assert!(backend.get_chores(child.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_requests_are_recorded() {
    let backend = MemoryBackend::new().with_demo_data();
    backend.get_children().await.unwrap();
    backend.get_chores(1).await.unwrap();
    backend.get_children().await.unwrap();

    assert_eq!(
        backend.requests().await,
        ["GET /api/children", "GET /api/children/1/chores", "GET /api/children"]
    );
    assert_eq!(backend.count_requests("GET /api/children").await, 2);

    backend.clear_requests().await;
    assert!(backend.requests().await.is_empty());
}
