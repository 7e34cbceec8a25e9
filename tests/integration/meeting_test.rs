//! Integration tests for meeting responses and reschedules.

use http::StatusCode;
use uuid::Uuid;

use dealroom_core::traits::calendar::{RemoteAttendee, RemoteEvent};
use dealroom_entity::meeting::ResponseStatus;

use crate::helpers::TestApp;

#[tokio::test]
async fn participant_updates_own_response_locally() {
    let app = TestApp::new().await;
    let organizer = Uuid::new_v4();
    let user = Uuid::new_v4();

    let meeting = app.seed_meeting(organizer, serde_json::json!([]));
    app.seed_participant(meeting.id, user, "guest@example.com", ResponseStatus::Pending);

    let token = app.access_token(user, "Guest", Some("guest@example.com"));
    let response = app
        .request(
            "PUT",
            &format!("/api/meetings/{}/response", meeting.id),
            Some(serde_json::json!({ "status": "accepted" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["calendar_connected"], false);

    let stored = app.meetings.participant(meeting.id, user);
    assert_eq!(stored.response_status, ResponseStatus::Accepted);
    assert!(stored.responded_at.is_some());
}

#[tokio::test]
async fn response_update_pushes_to_linked_provider_events() {
    let app = TestApp::new().await;
    let organizer = Uuid::new_v4();
    let user = Uuid::new_v4();

    app.seed_connection(user, None);
    let meeting = app.seed_meeting(organizer, serde_json::json!(["ev-push"]));
    app.seed_participant(meeting.id, user, "guest@example.com", ResponseStatus::Pending);

    app.provider.set_events(vec![RemoteEvent {
        id: "ev-push".into(),
        attendees: vec![
            RemoteAttendee {
                email: "organizer@example.com".into(),
                response_status: "accepted".into(),
            },
            RemoteAttendee {
                email: "guest@example.com".into(),
                response_status: "needsAction".into(),
            },
        ],
    }]);

    let token = app.access_token(user, "Guest", Some("guest@example.com"));
    let response = app
        .request(
            "PUT",
            &format!("/api/meetings/{}/response", meeting.id),
            Some(serde_json::json!({ "status": "declined" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["synced_events"], 1);

    let patches = app.provider.patch_calls.lock().unwrap();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].0, "ev-push");
    let guest = patches[0]
        .1
        .iter()
        .find(|a| a.email == "guest@example.com")
        .unwrap();
    assert_eq!(guest.response_status, "declined");
    // Other attendees ride along untouched.
    let organizer_attendee = patches[0]
        .1
        .iter()
        .find(|a| a.email == "organizer@example.com")
        .unwrap();
    assert_eq!(organizer_attendee.response_status, "accepted");
}

#[tokio::test]
async fn non_participant_cannot_respond() {
    let app = TestApp::new().await;
    let meeting = app.seed_meeting(Uuid::new_v4(), serde_json::json!([]));

    let token = app.access_token(Uuid::new_v4(), "Stranger", None);
    let response = app
        .request(
            "PUT",
            &format!("/api/meetings/{}/response", meeting.id),
            Some(serde_json::json!({ "status": "accepted" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_status_is_rejected() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let meeting = app.seed_meeting(Uuid::new_v4(), serde_json::json!([]));
    app.seed_participant(meeting.id, user, "u@example.com", ResponseStatus::Pending);

    let token = app.access_token(user, "User", None);
    let response = app
        .request(
            "PUT",
            &format!("/api/meetings/{}/response", meeting.id),
            Some(serde_json::json!({ "status": "maybe" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reschedule_resets_non_organizer_responses() {
    let app = TestApp::new().await;
    let organizer = Uuid::new_v4();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let meeting = app.seed_meeting(organizer, serde_json::json!([]));
    app.seed_participant(
        meeting.id,
        organizer,
        "organizer@example.com",
        ResponseStatus::Accepted,
    );
    app.seed_participant(meeting.id, alice, "alice@example.com", ResponseStatus::Accepted);
    app.seed_participant(meeting.id, bob, "bob@example.com", ResponseStatus::Tentative);

    let new_start = chrono::Utc::now() + chrono::Duration::days(3);
    let new_end = new_start + chrono::Duration::hours(1);

    let token = app.access_token(organizer, "Organizer", None);
    let response = app
        .request(
            "PUT",
            &format!("/api/meetings/{}/reschedule", meeting.id),
            Some(serde_json::json!({
                "start_time": new_start,
                "end_time": new_end,
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["participants_reset"], 2);

    // Every non-organizer resets to pending regardless of prior state;
    // the organizer's own response is untouched.
    assert_eq!(
        app.meetings.participant(meeting.id, alice).response_status,
        ResponseStatus::Pending
    );
    assert_eq!(
        app.meetings.participant(meeting.id, bob).response_status,
        ResponseStatus::Pending
    );
    assert_eq!(
        app.meetings
            .participant(meeting.id, organizer)
            .response_status,
        ResponseStatus::Accepted
    );

    let stored = app.meetings.meeting(meeting.id);
    assert_eq!(stored.start_time, new_start);
    assert_eq!(stored.end_time, new_end);
}

#[tokio::test]
async fn only_the_organizer_can_reschedule() {
    let app = TestApp::new().await;
    let organizer = Uuid::new_v4();
    let user = Uuid::new_v4();

    let meeting = app.seed_meeting(organizer, serde_json::json!([]));
    app.seed_participant(meeting.id, user, "u@example.com", ResponseStatus::Accepted);

    let new_start = chrono::Utc::now() + chrono::Duration::days(2);
    let token = app.access_token(user, "User", None);
    let response = app
        .request(
            "PUT",
            &format!("/api/meetings/{}/reschedule", meeting.id),
            Some(serde_json::json!({
                "start_time": new_start,
                "end_time": new_start + chrono::Duration::hours(1),
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn reschedule_rejects_inverted_window() {
    let app = TestApp::new().await;
    let organizer = Uuid::new_v4();
    let meeting = app.seed_meeting(organizer, serde_json::json!([]));

    let start = chrono::Utc::now() + chrono::Duration::days(2);
    let token = app.access_token(organizer, "Organizer", None);
    let response = app
        .request(
            "PUT",
            &format!("/api/meetings/{}/reschedule", meeting.id),
            Some(serde_json::json!({
                "start_time": start,
                "end_time": start - chrono::Duration::hours(1),
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
