use axum::{
    Router, middleware,
    routing::{delete, get, patch, post, put},
};

use crate::middleware::require_auth;
use crate::{AppState, auth, churches, circles, dashboard, events, media, prayers, reading, testimonies};

/// Full API surface. Everything except register/login sits behind the auth
/// gate. CORS and request tracing are layered by the binary, not here, so
/// tests exercise the same router the server runs.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/stats", get(dashboard::stats))
        .route("/circles", get(circles::list_circles))
        .route("/circles", post(circles::create_circle))
        .route("/circles/{circle_id}", put(circles::update_circle))
        .route("/circles/{circle_id}", delete(circles::delete_circle))
        .route("/circles/{circle_id}/members", post(circles::join_circle))
        .route("/circles/{circle_id}/members", delete(circles::leave_circle))
        .route("/churches", get(churches::list_churches))
        .route("/churches", post(churches::create_church))
        .route("/churches/{church_id}", put(churches::update_church))
        .route("/churches/{church_id}", delete(churches::delete_church))
        .route("/prayers", get(prayers::list_prayers))
        .route("/prayers", post(prayers::create_prayer))
        .route("/prayers/{prayer_id}/status", patch(prayers::update_prayer_status))
        .route("/prayers/{prayer_id}", delete(prayers::delete_prayer))
        .route("/prayers/{prayer_id}/support", post(prayers::support_prayer))
        .route("/testimonies", get(testimonies::list_testimonies))
        .route("/testimonies", post(testimonies::create_testimony))
        .route("/testimonies/{testimony_id}", delete(testimonies::delete_testimony))
        .route("/testimonies/{testimony_id}/reactions", post(testimonies::react))
        .route("/testimonies/{testimony_id}/comments", post(testimonies::add_comment))
        .route("/events", get(events::list_events))
        .route("/events", post(events::create_event))
        .route("/events/{event_id}", put(events::update_event))
        .route("/events/{event_id}", delete(events::delete_event))
        .route("/events/{event_id}/rsvp", put(events::rsvp))
        .route("/reading/plans", get(reading::list_plans))
        .route("/reading/plans", post(reading::create_plan))
        .route("/reading/plans/{plan_id}", delete(reading::delete_plan))
        .route("/reading/plans/{plan_id}/assignments", post(reading::join_plan))
        .route("/reading/plans/{plan_id}/progress", post(reading::record_progress))
        .route("/media", post(media::upload))
        .route("/media/{media_id}", get(media::download))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
