//! Admin-surface handlers.
//!
//! Thin wrappers: deserialize the submitted body, hand it to the
//! [`AdminService`], and flatten the outcome into the plain-text responses
//! the admin site expects. Authentication failures always produce the same
//! generic rejection string, whatever actually went wrong.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::application::{AdminOutcome, RoomMutation, SchedulesSubmission};
use crate::domain::LayoutSlot;

use super::dto::{CalendarBody, DefaultWeekBody, LayoutBody, RoomsBody, SchedulesBody};
use super::AppState;

/// The one string every authentication failure collapses into.
const REJECTION: &str = "SERVER: invalid userID";

fn respond(outcome: AdminOutcome) -> Response {
    match outcome {
        AdminOutcome::Confirmed(message) => message.into_response(),
        AdminOutcome::Rejected => REJECTION.into_response(),
        AdminOutcome::Invalid(reason) => reason.into_response(),
        // logged-only failure paths answer with nothing
        AdminOutcome::Dropped => StatusCode::OK.into_response(),
    }
}

/// `POST /schedules`
pub async fn post_schedules(
    State(state): State<AppState>,
    Json(body): Json<SchedulesBody>,
) -> Response {
    let submission = SchedulesSubmission {
        old_name: body.data.old_name,
        new_name: body.data.new_name,
        schedules: body.data.schedules,
    };
    respond(
        state
            .admin
            .submit_schedules(&body.token, &body.room, submission)
            .await,
    )
}

/// `POST /defaultWeek`
pub async fn post_default_week(
    State(state): State<AppState>,
    Json(body): Json<DefaultWeekBody>,
) -> Response {
    respond(
        state
            .admin
            .submit_default_week(&body.token, &body.room, body.data)
            .await,
    )
}

/// `POST /calendar`
pub async fn post_calendar(
    State(state): State<AppState>,
    Json(body): Json<CalendarBody>,
) -> Response {
    respond(
        state
            .admin
            .submit_calendar(&body.token, &body.room, body.data)
            .await,
    )
}

/// `POST /layout`
pub async fn post_layout(
    State(state): State<AppState>,
    Json(body): Json<LayoutBody>,
) -> Response {
    let slot = LayoutSlot {
        site: body.data.site,
        widget_list: body.data.widget_list,
    };
    respond(
        state
            .admin
            .submit_layout(&body.token, &body.room, body.data.layout_index, slot)
            .await,
    )
}

/// `POST /rooms`
pub async fn post_rooms(State(state): State<AppState>, Json(body): Json<RoomsBody>) -> Response {
    respond(
        state
            .admin
            .mutate_rooms(
                &body.token,
                RoomMutation {
                    old: body.data.old,
                    new: body.data.new,
                },
            )
            .await,
    )
}
