//! End-to-end tests against the full router with an in-memory database.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use koinonia_api::router::router;
use koinonia_api::{AppState, AppStateInner};
use koinonia_db::Database;

struct TestApp {
    router: Router,
    // Held so the uploads dir outlives the test
    _uploads: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let uploads = tempfile::tempdir().unwrap();
    let state: AppState = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        jwt_secret: "test-secret".into(),
        uploads_dir: uploads.path().to_path_buf(),
    });
    TestApp {
        router: router(state),
        _uploads: uploads,
    }
}

async fn send(app: &TestApp, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn send_json(method: &str, path: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn public_json(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Registers a fresh account and returns its bearer token.
async fn register(app: &TestApp, email: &str, first: &str) -> String {
    let (status, body) = send(
        app,
        public_json(
            "/auth/register",
            json!({
                "email": email,
                "password": "hunter2hunter2",
                "first_name": first,
                "last_name": "Tester",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

async fn create_circle(app: &TestApp, token: &str, name: &str, privacy: &str) -> String {
    let (status, body) = send(
        app,
        send_json(
            "POST",
            "/circles",
            token,
            json!({ "name": name, "privacy": privacy }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create circle failed: {}", body);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Request::builder().uri("/circles").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "auth");

    let (status, _) = send(&app, get("/circles", "not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_profile() {
    let app = test_app();
    register(&app, "grace@example.com", "Grace").await;

    // Duplicate email is refused
    let (status, body) = send(
        &app,
        public_json(
            "/auth/register",
            json!({
                "email": "grace@example.com",
                "password": "hunter2hunter2",
                "first_name": "Grace",
                "last_name": "Tester",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    // Wrong password
    let (status, _) = send(
        &app,
        public_json(
            "/auth/login",
            json!({ "email": "grace@example.com", "password": "wrong-password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Correct login returns a usable token
    let (status, body) = send(
        &app,
        public_json(
            "/auth/login",
            json!({ "email": "grace@example.com", "password": "hunter2hunter2" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let login_token = body["token"].as_str().unwrap();

    let (status, body) = send(&app, get("/auth/me", login_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "grace@example.com");
    assert_eq!(body["first_name"], "Grace");
}

#[tokio::test]
async fn short_passwords_are_rejected() {
    let app = test_app();
    let (status, body) = send(
        &app,
        public_json(
            "/auth/register",
            json!({
                "email": "short@example.com",
                "password": "short",
                "first_name": "S",
                "last_name": "T",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
}

#[tokio::test]
async fn circle_membership_lifecycle() {
    let app = test_app();
    let owner = register(&app, "owner@example.com", "Olive").await;
    let member = register(&app, "member@example.com", "Mark").await;

    let circle_id = create_circle(&app, &owner, "Tuesday Group", "public").await;

    // Creator is auto-enrolled
    let (status, body) = send(&app, get("/circles?scope=my", &owner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["member_count"], 1);
    assert_eq!(body[0]["is_owner"], true);

    // Joining twice still counts once
    for _ in 0..2 {
        let (status, _) = send(
            &app,
            send_json("POST", &format!("/circles/{}/members", circle_id), &member, json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
    let (_, body) = send(&app, get("/circles?scope=all", &member)).await;
    assert_eq!(body[0]["member_count"], 2);
    assert_eq!(body[0]["is_member"], true);
    assert_eq!(body[0]["is_owner"], false);

    // Only the owner can rename or delete
    let rename = json!({ "name": "Renamed", "privacy": "public" });
    let (status, _) = send(
        &app,
        send_json("PUT", &format!("/circles/{}", circle_id), &member, rename.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(
        &app,
        send_json("PUT", &format!("/circles/{}", circle_id), &owner, rename),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Leaving drops the count
    let (status, _) = send(
        &app,
        send_json("DELETE", &format!("/circles/{}/members", circle_id), &member, json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, get("/circles?scope=all", &member)).await;
    assert_eq!(body[0]["member_count"], 1);

    // Unknown circle is a 404, not a 403
    let (status, _) = send(
        &app,
        send_json(
            "DELETE",
            &format!("/circles/{}", uuid::Uuid::new_v4()),
            &owner,
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn circle_search_filters_by_name() {
    let app = test_app();
    let owner = register(&app, "search@example.com", "Sam").await;
    create_circle(&app, &owner, "Morning Prayer", "public").await;
    create_circle(&app, &owner, "Youth Group", "public").await;

    let (_, body) = send(&app, get("/circles?scope=all&q=prayer", &owner)).await;
    let circles = body.as_array().unwrap();
    assert_eq!(circles.len(), 1);
    assert_eq!(circles[0]["name"], "Morning Prayer");
}

#[tokio::test]
async fn circle_prayers_stay_inside_the_circle() {
    let app = test_app();
    let author = register(&app, "author@example.com", "Anna").await;
    let insider = register(&app, "insider@example.com", "Ian").await;
    let outsider = register(&app, "outsider@example.com", "Oscar").await;

    let circle_id = create_circle(&app, &author, "Close Friends", "private").await;
    let (status, _) = send(
        &app,
        send_json("POST", &format!("/circles/{}/members", circle_id), &insider, json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Circle-scoped request must name a circle
    let (status, body) = send(
        &app,
        send_json(
            "POST",
            "/prayers",
            &author,
            json!({ "title": "For healing", "content": "...", "is_public": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    // Non-members cannot post into the circle
    let (status, _) = send(
        &app,
        send_json(
            "POST",
            "/prayers",
            &outsider,
            json!({
                "title": "Sneaky",
                "content": "...",
                "is_public": false,
                "circle_id": circle_id,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        send_json(
            "POST",
            "/prayers",
            &author,
            json!({
                "title": "For healing",
                "content": "Please pray",
                "is_public": false,
                "circle_id": circle_id,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Members see it, outsiders never do
    let (_, body) = send(&app, get("/prayers", &insider)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    let (_, body) = send(&app, get("/prayers", &outsider)).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn prayer_status_and_support() {
    let app = test_app();
    let author = register(&app, "pray@example.com", "Paula").await;
    let friend = register(&app, "friend@example.com", "Fred").await;

    let (status, body) = send(
        &app,
        send_json(
            "POST",
            "/prayers",
            &author,
            json!({ "title": "Exams", "content": "This week", "is_public": true, "is_urgent": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let prayer_id = body["id"].as_str().unwrap().to_string();

    let (_, body) = send(&app, get("/prayers?filter=urgent", &friend)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Supporting twice counts once
    for _ in 0..2 {
        let (status, _) = send(
            &app,
            send_json("POST", &format!("/prayers/{}/support", prayer_id), &friend, json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
    let (_, body) = send(&app, get("/prayers", &friend)).await;
    assert_eq!(body[0]["support_count"], 1);
    assert_eq!(body[0]["supported_by_me"], true);
    let (_, body) = send(&app, get("/prayers", &author)).await;
    assert_eq!(body[0]["supported_by_me"], false);

    // Only the author can mark it answered
    let answered = json!({ "status": "answered" });
    let (status, _) = send(
        &app,
        send_json("PATCH", &format!("/prayers/{}/status", prayer_id), &friend, answered.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(
        &app,
        send_json("PATCH", &format!("/prayers/{}/status", prayer_id), &author, answered),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, get("/prayers?filter=active", &friend)).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
    let (_, body) = send(&app, get("/prayers?filter=answered", &friend)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn testimony_media_must_be_owned_uploads() {
    let app = test_app();
    let author = register(&app, "story@example.com", "Stella").await;

    // A path nobody uploaded aborts the whole creation
    let (status, body) = send(
        &app,
        send_json(
            "POST",
            "/testimonies",
            &author,
            json!({
                "title": "Answered",
                "content": "He came through",
                "visibility": "public",
                "media_paths": ["nobody/uploaded-this.jpg"],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "upload");
    let (_, body) = send(&app, get("/testimonies", &author)).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    // Upload two attachments, then reference them
    let mut paths = Vec::new();
    for (bytes, ct) in [(b"jpegdata".as_slice(), "image/jpeg"), (b"mp4data".as_slice(), "video/mp4")] {
        let req = Request::builder()
            .method("POST")
            .uri("/media")
            .header(header::AUTHORIZATION, format!("Bearer {}", author))
            .header(header::CONTENT_TYPE, ct)
            .body(Body::from(bytes.to_vec()))
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::CREATED);
        paths.push(body["path"].as_str().unwrap().to_string());
    }

    let (status, _) = send(
        &app,
        send_json(
            "POST",
            "/testimonies",
            &author,
            json!({
                "title": "Answered",
                "content": "He came through",
                "visibility": "public",
                "media_paths": paths,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, get("/testimonies", &author)).await;
    let media = body[0]["media"].as_array().unwrap();
    assert_eq!(media.len(), 2);
    assert_eq!(media[0]["kind"], "image");
    assert_eq!(media[1]["kind"], "video");
}

#[tokio::test]
async fn circle_testimony_requires_a_circle_and_membership() {
    let app = test_app();
    let author = register(&app, "cs@example.com", "Cara").await;
    let outsider = register(&app, "cso@example.com", "Omar").await;
    let circle_id = create_circle(&app, &author, "Close Group", "private").await;

    // Circle visibility without a circle id never writes a row
    let (status, body) = send(
        &app,
        send_json(
            "POST",
            "/testimonies",
            &author,
            json!({ "title": "X", "content": "Y", "visibility": "circle" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    // Non-members cannot share into the circle
    let (status, _) = send(
        &app,
        send_json(
            "POST",
            "/testimonies",
            &outsider,
            json!({ "title": "X", "content": "Y", "visibility": "circle", "circle_id": circle_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = send(&app, get("/testimonies", &author)).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn reactions_overwrite_and_comments_accumulate() {
    let app = test_app();
    let author = register(&app, "writer@example.com", "Will").await;
    let reader = register(&app, "reader@example.com", "Rita").await;

    let (status, body) = send(
        &app,
        send_json(
            "POST",
            "/testimonies",
            &author,
            json!({ "title": "Grateful", "content": "So much", "visibility": "public" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();

    // Second reaction replaces the first, never stacks
    for reaction in ["amen", "praise"] {
        let (status, _) = send(
            &app,
            send_json(
                "POST",
                &format!("/testimonies/{}/reactions", id),
                &reader,
                json!({ "reaction_type": reaction }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (status, _) = send(
        &app,
        send_json(
            "POST",
            &format!("/testimonies/{}/comments", id),
            &reader,
            json!({ "content": "Amen to this" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, get("/testimonies", &reader)).await;
    let reactions = body[0]["reactions"].as_array().unwrap();
    assert_eq!(reactions.len(), 1);
    assert_eq!(reactions[0]["reaction_type"], "praise");
    assert_eq!(reactions[0]["count"], 1);
    assert_eq!(body[0]["my_reaction"], "praise");
    assert_eq!(body[0]["comments"].as_array().unwrap().len(), 1);
    assert_eq!(body[0]["comments"][0]["content"], "Amen to this");

    // Reacting to a missing testimony is a 404
    let (status, _) = send(
        &app,
        send_json(
            "POST",
            &format!("/testimonies/{}/reactions", uuid::Uuid::new_v4()),
            &reader,
            json!({ "reaction_type": "amen" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn event_rsvp_respects_the_attendee_cap() {
    let app = test_app();
    let organizer = register(&app, "host@example.com", "Hank").await;
    let alice = register(&app, "alice@example.com", "Alice").await;
    let bob = register(&app, "bob@example.com", "Bob").await;

    // A zero cap makes no sense
    let (status, _) = send(
        &app,
        send_json(
            "POST",
            "/events",
            &organizer,
            json!({
                "title": "Potluck",
                "event_date": "2027-06-01T18:00:00Z",
                "max_attendees": 0,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        send_json(
            "POST",
            "/events",
            &organizer,
            json!({
                "title": "Potluck",
                "event_date": "2027-06-01T18:00:00Z",
                "max_attendees": 1,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let event_id = body["id"].as_str().unwrap().to_string();
    let rsvp_path = format!("/events/{}/rsvp", event_id);

    let (status, _) = send(
        &app,
        send_json("PUT", &rsvp_path, &alice, json!({ "status": "attending" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Full event refuses the second attendee
    let (status, body) = send(
        &app,
        send_json("PUT", &rsvp_path, &bob, json!({ "status": "attending" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    // Maybe is always allowed, and changing your own answer never
    // double-counts you against the cap
    let (status, _) = send(
        &app,
        send_json("PUT", &rsvp_path, &bob, json!({ "status": "maybe" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(
        &app,
        send_json("PUT", &rsvp_path, &alice, json!({ "status": "attending" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Alice frees her spot, Bob takes it
    let (status, _) = send(
        &app,
        send_json("PUT", &rsvp_path, &alice, json!({ "status": "not_attending" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(
        &app,
        send_json("PUT", &rsvp_path, &bob, json!({ "status": "attending" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, get("/events?filter=upcoming", &bob)).await;
    assert_eq!(body[0]["attending_count"], 1);
    assert_eq!(body[0]["my_status"], "attending");
}

#[tokio::test]
async fn past_events_leave_the_upcoming_list() {
    let app = test_app();
    let organizer = register(&app, "past@example.com", "Pete").await;

    let (status, _) = send(
        &app,
        send_json(
            "POST",
            "/events",
            &organizer,
            json!({ "title": "Last year", "event_date": "2020-01-01T10:00:00Z" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, get("/events?filter=upcoming", &organizer)).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
    let (_, body) = send(&app, get("/events?filter=past", &organizer)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    let (_, body) = send(&app, get("/events?filter=mine", &organizer)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn reading_progress_requires_joining_first() {
    let app = test_app();
    let creator = register(&app, "plan@example.com", "Pam").await;
    let reader = register(&app, "daily@example.com", "Dan").await;

    let (status, body) = send(
        &app,
        send_json(
            "POST",
            "/reading/plans",
            &creator,
            json!({ "name": "Psalms in 30 days", "duration_days": 30, "is_public": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let plan_id = body["id"].as_str().unwrap().to_string();

    // Progress before joining is refused
    let (status, body) = send(
        &app,
        send_json(
            "POST",
            &format!("/reading/plans/{}/progress", plan_id),
            &reader,
            json!({ "day": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    let (status, _) = send(
        &app,
        send_json(
            "POST",
            &format!("/reading/plans/{}/assignments", plan_id),
            &reader,
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Day must fall inside the plan
    let (status, _) = send(
        &app,
        send_json(
            "POST",
            &format!("/reading/plans/{}/progress", plan_id),
            &reader,
            json!({ "day": 31 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Same day twice still counts once
    for _ in 0..2 {
        let (status, body) = send(
            &app,
            send_json(
                "POST",
                &format!("/reading/plans/{}/progress", plan_id),
                &reader,
                json!({ "day": 1 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["progress_count"], 1);
    }
    let (_, body) = send(
        &app,
        send_json(
            "POST",
            &format!("/reading/plans/{}/progress", plan_id),
            &reader,
            json!({ "day": 2 }),
        ),
    )
    .await;
    assert_eq!(body["progress_count"], 2);

    // My plans carries the personal progress; the public list does not
    let (_, body) = send(&app, get("/reading/plans?scope=my", &reader)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["progress_count"], 2);
    let (_, body) = send(&app, get("/reading/plans?scope=all", &creator)).await;
    assert_eq!(body[0]["assignment_count"], 1);
}

#[tokio::test]
async fn uploaded_media_can_be_fetched_back() {
    let app = test_app();
    let user = register(&app, "photo@example.com", "Phil").await;

    let req = Request::builder()
        .method("POST")
        .uri("/media")
        .header(header::AUTHORIZATION, format!("Bearer {}", user))
        .header(header::CONTENT_TYPE, "image/png")
        .body(Body::from(b"pngbytes".to_vec()))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["kind"], "image");
    assert_eq!(body["size"], 8);
    let media_id = body["id"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/media/{}", media_id), &user))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"pngbytes");

    // Empty uploads are refused
    let req = Request::builder()
        .method("POST")
        .uri("/media")
        .header(header::AUTHORIZATION, format!("Bearer {}", user))
        .header(header::CONTENT_TYPE, "image/png")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get(&format!("/media/{}", uuid::Uuid::new_v4()), &user)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_count_community_activity() {
    let app = test_app();
    let user = register(&app, "stats@example.com", "Stan").await;

    create_circle(&app, &user, "Counted", "public").await;
    let (status, _) = send(
        &app,
        send_json(
            "POST",
            "/prayers",
            &user,
            json!({ "title": "One", "content": "...", "is_public": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &app,
        send_json(
            "POST",
            "/events",
            &user,
            json!({ "title": "One", "event_date": "2027-01-01T10:00:00Z" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, get("/stats", &user)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["circles"], 1);
    assert_eq!(body["prayers"], 1);
    assert_eq!(body["events"], 1);
    assert_eq!(body["testimonies"], 0);
}

#[tokio::test]
async fn unknown_fields_in_requests_are_rejected() {
    let app = test_app();
    let user = register(&app, "strict@example.com", "Strict").await;

    let (status, _) = send(
        &app,
        send_json(
            "POST",
            "/circles",
            &user,
            json!({ "name": "X", "privacy": "public", "role": "admin" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
