use chores_client::{ApiError, ChoresApi, HttpClient};
use chores_common::pin::Pin;
use chores_common::Frequency;
use chores_proto::{ChoreUpdate, HistoryQuery};
use mockito::{Matcher, Server};
use serde_json::json;

fn client(server: &Server) -> HttpClient {
    HttpClient::new(&server.url()).unwrap()
}

#[tokio::test]
async fn test_pin_exists() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/auth/pin-exists")
        .with_header("content-type", "application/json")
        .with_body(r#"{"exists": true}"#)
        .create_async()
        .await;

    let result = client(&server).pin_exists().await.unwrap();
    assert!(result.exists);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_verify_pin_rejection_is_not_an_error() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/auth/verify-pin")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"pin": "9999"})))
        .with_status(401)
        .with_body(r#"{"valid": false}"#)
        .create_async()
        .await;

    let response = client(&server).verify_pin(&Pin::new("9999")).await.unwrap();
    assert!(!response.ok);
    assert!(!response.is_valid());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_set_pin_sends_current_pin_only_when_present() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("POST", "/api/auth/set-pin")
        .match_body(Matcher::Json(json!({"pin": "1234"})))
        .with_body(r#"{"success": true}"#)
        .create_async()
        .await;

    let api = client(&server);
    let response = api.set_pin(&Pin::new("1234"), Some(&Pin::new(""))).await.unwrap();
    assert!(response.ok);
    assert!(response.data.success);
    first.assert_async().await;

    let change = server
        .mock("POST", "/api/auth/set-pin")
        .match_body(Matcher::Json(json!({"pin": "5678", "current_pin": "1111"})))
        .with_status(401)
        .with_body(r#"{"error": "Invalid current PIN"}"#)
        .create_async()
        .await;

    let response = api.set_pin(&Pin::new("5678"), Some(&Pin::new("1111"))).await.unwrap();
    assert_eq!(response.error_message(), Some("Invalid current PIN"));
    change.assert_async().await;
}

#[tokio::test]
async fn test_get_chores_fills_in_default_frequency() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/children/2/chores")
        .with_body(
            r#"[
                {"id": 10, "title": "Make bed", "frequency": null, "completed": false, "completed_at": null},
                {"id": 11, "title": "Water plants", "frequency": "weekly", "completed": true, "completed_at": "2024-03-05 17:00:00"}
            ]"#,
        )
        .create_async()
        .await;

    let chores = client(&server).get_chores(2).await.unwrap();
    assert_eq!(chores.len(), 2);
    assert_eq!(chores[0].frequency, Frequency::Daily);
    assert!(chores[1].completed);
}

#[tokio::test]
async fn test_create_chore_posts_title_and_frequency() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/children/2/chores")
        .match_body(Matcher::Json(json!({"title": "Feed cat", "frequency": "oneoff"})))
        .with_status(201)
        .with_body(r#"{"id": 40, "child_id": 2, "title": "Feed cat", "frequency": "oneoff"}"#)
        .create_async()
        .await;

    let chore = client(&server).create_chore(2, "Feed cat", Frequency::Oneoff).await.unwrap();
    assert_eq!(chore.id, 40);
    assert_eq!(chore.child_id, Some(2));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_update_chore_sends_only_title() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/api/chores/40")
        .match_body(Matcher::Json(json!({"title": "Feed the cat"})))
        .with_body(r#"{"id": 40, "title": "Feed the cat", "frequency": "daily"}"#)
        .create_async()
        .await;

    let chore = client(&server).update_chore(40, &ChoreUpdate::retitle("Feed the cat")).await.unwrap();
    assert_eq!(chore.title, "Feed the cat");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_history_passes_days_and_child_filter() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/history")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("days".into(), "14".into()),
            Matcher::UrlEncoded("child_id".into(), "3".into()),
        ]))
        .with_body(r#"{"history": []}"#)
        .create_async()
        .await;

    let response = client(&server).get_history(&HistoryQuery::days(14).for_child(3)).await.unwrap();
    assert!(response.history.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_child_history_omits_days_when_unset() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/history/child/3")
        .match_query(Matcher::Missing)
        .with_body(r#"{"history": [{"date": "2024-03-06", "chores": []}]}"#)
        .create_async()
        .await;

    let response = client(&server).get_child_history(3, None).await.unwrap();
    assert_eq!(response.history[0].date, "2024-03-06");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_status_carries_server_message() {
    let mut server = Server::new_async().await;
    server
        .mock("DELETE", "/api/chores/99")
        .with_status(404)
        .with_body(r#"{"error": "Chore not found"}"#)
        .create_async()
        .await;

    let err = client(&server).delete_chore(99).await.unwrap_err();
    assert!(err.is_not_found());
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Chore not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_status_without_json_body() {
    let mut server = Server::new_async().await;
    server.mock("GET", "/api/children").with_status(500).with_body("boom").create_async().await;

    let err = client(&server).get_children().await.unwrap_err();
    assert_eq!(err.to_string(), "Server returned 500: Internal Server Error");
}

#[tokio::test]
async fn test_malformed_success_body_is_a_decode_error() {
    let mut server = Server::new_async().await;
    server.mock("GET", "/api/children").with_body("<html>").create_async().await;

    let err = client(&server).get_children().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    let api = HttpClient::new("http://127.0.0.1:1").unwrap();
    let err = api.get_children().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[test]
fn test_rejects_bad_base_url() {
    assert!(matches!(HttpClient::new("not a url"), Err(ApiError::InvalidBaseUrl { .. })));
    assert!(matches!(HttpClient::new("ftp://example.com"), Err(ApiError::InvalidBaseUrl { .. })));

    let api = HttpClient::new("http://localhost:8080/").unwrap();
    assert_eq!(api.base_url(), "http://localhost:8080");
}
