//! Event lifecycle, invitations, attendance and tasks over HTTP.

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::TestApp;
use diesel::prelude::*;
use serde_json::{json, Value};
use serial_test::serial;

use eventplanner::repositories::events::count_organizers;
use eventplanner::schema::event_participants;

// ============================================================================
// Creation and listing
// ============================================================================

#[tokio::test]
#[serial]
async fn created_event_is_listed_for_organizer_only() {
    let app = TestApp::spawn().await;
    let organizer = app.signup("Olga").await;
    let other = app.signup("Uma").await;
    let start = Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap();

    let event_id = app.create_event(&organizer, "Launch party", start).await;

    let mine: Vec<Value> = app
        .get_as("/events/organized", organizer.id)
        .await
        .json()
        .await
        .unwrap();
    assert!(mine.iter().any(|e| e["id"] == event_id));

    let theirs: Vec<Value> = app
        .get_as("/events/organized", other.id)
        .await
        .json()
        .await
        .unwrap();
    assert!(theirs.iter().all(|e| e["id"] != event_id));
}

#[tokio::test]
#[serial]
async fn creation_inserts_exactly_one_organizer_row() {
    let app = TestApp::spawn().await;
    let organizer = app.signup("Olga").await;
    let start = Utc.with_ymd_and_hms(2030, 2, 1, 9, 0, 0).unwrap();

    let event_id = app.create_event(&organizer, "Board meeting", start).await;

    let mut conn = app.conn();
    assert_eq!(count_organizers(&mut conn, event_id).unwrap(), 1);

    let organizer_ids: Vec<i32> = event_participants::table
        .filter(event_participants::event_id.eq(event_id))
        .select(event_participants::user_id)
        .load(&mut conn)
        .unwrap();
    assert_eq!(organizer_ids, vec![organizer.id]);
}

#[tokio::test]
#[serial]
async fn create_event_returns_camel_case_body() {
    let app = TestApp::spawn().await;
    let organizer = app.signup("Olga").await;

    let response = app
        .post_as(
            "/events",
            organizer.id,
            json!({ "title": "Picnic", "startTime": "2030-06-01T12:00:00Z" }),
        )
        .await;

    assert_status!(response, 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "Picnic");
    assert_eq!(body["organizerId"], organizer.id);
    assert_eq!(body["description"], "");
    assert_eq!(body["location"], "");
    assert!(body["startTime"].as_str().unwrap().starts_with("2030-06-01T12:00:00"));
}

#[tokio::test]
#[serial]
async fn duplicate_start_time_is_a_conflict() {
    let app = TestApp::spawn().await;
    let first = app.signup("Olga").await;
    let second = app.signup("Omar").await;

    app.create_event(&first, "First", Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap())
        .await;

    let response = app
        .post_as(
            "/events",
            second.id,
            json!({ "title": "Second", "startTime": "2030-01-01T10:00:00Z" }),
        )
        .await;

    assert_status!(response, 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "EVENT_TIME_TAKEN");
}

#[tokio::test]
#[serial]
async fn create_event_rejects_bad_input() {
    let app = TestApp::spawn().await;
    let organizer = app.signup("Olga").await;

    let bad_time = app
        .post_as(
            "/events",
            organizer.id,
            json!({ "title": "Picnic", "startTime": "next friday" }),
        )
        .await;
    assert_status!(bad_time, 400);

    let blank_title = app
        .post_as(
            "/events",
            organizer.id,
            json!({ "title": "   ", "startTime": "2030-06-01T12:00:00Z" }),
        )
        .await;
    assert_status!(blank_title, 400);

    let no_identity = app
        .post_public(
            "/events",
            json!({ "title": "Picnic", "startTime": "2030-06-01T12:00:00Z" }),
        )
        .await;
    assert_status!(no_identity, 401);
}

// ============================================================================
// Invitations and attendance
// ============================================================================

#[tokio::test]
#[serial]
async fn invite_accept_and_forbidden_delete_scenario() {
    let app = TestApp::spawn().await;
    let organizer = app.signup("Olga").await;
    let invitee = app.signup("Uma").await;
    let event_id = app
        .create_event(&organizer, "Dinner", Utc.with_ymd_and_hms(2030, 3, 1, 19, 0, 0).unwrap())
        .await;

    let invite = app.invite(&organizer, event_id, &invitee, "attendee").await;
    assert_status!(invite, 200);

    let invited: Vec<Value> = app
        .get_as("/events/invited", invitee.id)
        .await
        .json()
        .await
        .unwrap();
    assert!(invited.iter().any(|e| e["id"] == event_id));

    let accept = app
        .put_as(&format!("/events/{}/accept", event_id), invitee.id, json!({}))
        .await;
    assert_status!(accept, 200);

    let attendees: Vec<Value> = app
        .get_as(&format!("/events/{}/attendees", event_id), organizer.id)
        .await
        .json()
        .await
        .unwrap();
    let row = attendees
        .iter()
        .find(|p| p["userId"] == invitee.id)
        .expect("invitee listed");
    assert_eq!(row["attendance"], "going");
    assert_eq!(row["role"], "attendee");

    let delete = app
        .delete_as(&format!("/events/{}", event_id), invitee.id)
        .await;
    assert_status!(delete, 403);
}

#[tokio::test]
#[serial]
async fn invite_guards_and_validation() {
    let app = TestApp::spawn().await;
    let organizer = app.signup("Olga").await;
    let invitee = app.signup("Uma").await;
    let outsider = app.signup("Vic").await;
    let event_id = app
        .create_event(&organizer, "Dinner", Utc.with_ymd_and_hms(2030, 3, 2, 19, 0, 0).unwrap())
        .await;

    let not_organizer = app.invite(&outsider, event_id, &invitee, "attendee").await;
    assert_status!(not_organizer, 403);

    let self_invite = app.invite(&organizer, event_id, &organizer, "attendee").await;
    assert_status!(self_invite, 400);

    let bad_role = app.invite(&organizer, event_id, &invitee, "owner").await;
    assert_status!(bad_role, 400);

    let wrong_case = app.invite(&organizer, event_id, &invitee, "Attendee").await;
    assert_status!(wrong_case, 400);

    let unknown_user = app
        .post_as(
            &format!("/events/{}/invite", event_id),
            organizer.id,
            json!({ "userId": invitee.id + 1000, "role": "attendee" }),
        )
        .await;
    assert_status!(unknown_user, 404);
}

#[tokio::test]
#[serial]
async fn reinvite_overwrites_role() {
    let app = TestApp::spawn().await;
    let organizer = app.signup("Olga").await;
    let invitee = app.signup("Uma").await;
    let event_id = app
        .create_event(&organizer, "Retro", Utc.with_ymd_and_hms(2030, 3, 3, 9, 0, 0).unwrap())
        .await;

    assert_status!(app.invite(&organizer, event_id, &invitee, "attendee").await, 200);
    assert_status!(app.invite(&organizer, event_id, &invitee, "collaborator").await, 200);

    let attendees: Vec<Value> = app
        .get_as(&format!("/events/{}/attendees", event_id), organizer.id)
        .await
        .json()
        .await
        .unwrap();
    let rows: Vec<&Value> = attendees
        .iter()
        .filter(|p| p["userId"] == invitee.id)
        .collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["role"], "collaborator");
}

#[tokio::test]
#[serial]
async fn setting_attendance_twice_is_idempotent() {
    let app = TestApp::spawn().await;
    let organizer = app.signup("Olga").await;
    let guest = app.signup("Uma").await;
    let event_id = app
        .create_event(&organizer, "Concert", Utc.with_ymd_and_hms(2030, 4, 1, 20, 0, 0).unwrap())
        .await;

    for _ in 0..2 {
        let response = app
            .put_as(
                &format!("/events/{}/attendance", event_id),
                guest.id,
                json!({ "status": "maybe" }),
            )
            .await;
        assert_status!(response, 200);
    }

    let mut conn = app.conn();
    let rows: Vec<(i32, Option<eventplanner::domain::AttendanceStatus>)> =
        event_participants::table
            .filter(event_participants::event_id.eq(event_id))
            .filter(event_participants::user_id.eq(guest.id))
            .select((event_participants::user_id, event_participants::attendance))
            .load(&mut conn)
            .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].1, Some(eventplanner::domain::AttendanceStatus::Maybe));
}

#[tokio::test]
#[serial]
async fn attendance_for_another_user_is_forbidden() {
    let app = TestApp::spawn().await;
    let organizer = app.signup("Olga").await;
    let guest = app.signup("Uma").await;
    let event_id = app
        .create_event(&organizer, "Concert", Utc.with_ymd_and_hms(2030, 4, 2, 20, 0, 0).unwrap())
        .await;

    let response = app
        .put_as(
            &format!("/events/{}/attendance", event_id),
            organizer.id,
            json!({ "userId": guest.id, "status": "going" }),
        )
        .await;
    assert_status!(response, 403);

    let bad_status = app
        .put_as(
            &format!("/events/{}/attendance", event_id),
            guest.id,
            json!({ "status": "sometimes" }),
        )
        .await;
    assert_status!(bad_status, 400);
}

#[tokio::test]
#[serial]
async fn attendees_are_visible_to_organizers_only() {
    let app = TestApp::spawn().await;
    let organizer = app.signup("Olga").await;
    let bea = app.signup("Bea").await;
    let abe = app.signup("Abe").await;
    let event_id = app
        .create_event(&organizer, "Reading", Utc.with_ymd_and_hms(2030, 5, 1, 18, 0, 0).unwrap())
        .await;
    app.invite(&organizer, event_id, &bea, "attendee").await;
    app.invite(&organizer, event_id, &abe, "attendee").await;

    let forbidden = app
        .get_as(&format!("/events/{}/attendees", event_id), bea.id)
        .await;
    assert_status!(forbidden, 403);

    let attendees: Vec<Value> = app
        .get_as(&format!("/events/{}/attendees", event_id), organizer.id)
        .await
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = attendees
        .iter()
        .map(|p| p["userName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Abe", "Bea", "Olga"]);
}

// ============================================================================
// Deletion
// ============================================================================

#[tokio::test]
#[serial]
async fn organizer_can_delete_event() {
    let app = TestApp::spawn().await;
    let organizer = app.signup("Olga").await;
    let event_id = app
        .create_event(&organizer, "Temp", Utc.with_ymd_and_hms(2030, 7, 1, 8, 0, 0).unwrap())
        .await;

    let response = app
        .delete_as(&format!("/events/{}", event_id), organizer.id)
        .await;
    assert_status!(response, 200);

    let mine: Vec<Value> = app
        .get_as("/events/organized", organizer.id)
        .await
        .json()
        .await
        .unwrap();
    assert!(mine.is_empty());

    let again = app
        .delete_as(&format!("/events/{}", event_id), organizer.id)
        .await;
    assert_status!(again, 403);
}

#[tokio::test]
#[serial]
async fn malformed_event_id_is_rejected() {
    let app = TestApp::spawn().await;
    let organizer = app.signup("Olga").await;

    let response = app.delete_as("/events/not-a-number", organizer.id).await;
    assert_status!(response, 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_EVENT_ID");
}

#[tokio::test]
#[serial]
async fn event_without_start_time_is_invalid_json() {
    let app = TestApp::spawn().await;
    let organizer = app.signup("Olga").await;

    let response = app
        .post_as("/events", organizer.id, json!({"title": "Picnic"}))
        .await;
    assert_status!(response, 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_JSON");

    let listed = app.get_as("/events/organized", organizer.id).await;
    let events: Value = listed.json().await.unwrap();
    assert!(events.as_array().unwrap().is_empty());
}

// ============================================================================
// Tasks
// ============================================================================

#[tokio::test]
#[serial]
async fn organizer_creates_task() {
    let app = TestApp::spawn().await;
    let organizer = app.signup("Olga").await;
    let event_id = app
        .create_event(&organizer, "Wedding", Utc.with_ymd_and_hms(2030, 8, 1, 15, 0, 0).unwrap())
        .await;
    let due = Utc::now() + Duration::days(3);

    let response = app
        .post_as(
            &format!("/events/{}/tasks", event_id),
            organizer.id,
            json!({
                "title": "Book the venue",
                "description": "Call three places",
                "dueDate": due.to_rfc3339(),
                "assigneeId": organizer.id
            }),
        )
        .await;

    assert_status!(response, 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["eventId"], event_id);
    assert_eq!(body["title"], "Book the venue");
    assert_eq!(body["assigneeId"], organizer.id);
}

#[tokio::test]
#[serial]
async fn task_creation_guards() {
    let app = TestApp::spawn().await;
    let organizer = app.signup("Olga").await;
    let outsider = app.signup("Vic").await;
    let event_id = app
        .create_event(&organizer, "Wedding", Utc.with_ymd_and_hms(2030, 8, 2, 15, 0, 0).unwrap())
        .await;

    let forbidden = app.create_task(&outsider, event_id, "Sneaky", None).await;
    assert_status!(forbidden, 403);

    let missing_title = app
        .post_as(
            &format!("/events/{}/tasks", event_id),
            organizer.id,
            json!({ "description": "no title" }),
        )
        .await;
    assert_status!(missing_title, 400);

    let unknown_assignee = app
        .post_as(
            &format!("/events/{}/tasks", event_id),
            organizer.id,
            json!({ "title": "Flowers", "assigneeId": outsider.id + 1000 }),
        )
        .await;
    assert_status!(unknown_assignee, 404);
}
