//! Read-surface handlers.
//!
//! Reads are unauthenticated and forgiving: an unknown room or a bad index
//! is logged and answered with an empty `200`, never a structured error.
//! That is the contract the display clients and admin site grew up with.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::domain::foundation::RoomName;

use super::dto::{LayoutQuery, LayoutSlotResponse, RoomQuery};
use super::AppState;

fn silent_gap(context: &str, room: &str, detail: impl std::fmt::Display) -> Response {
    tracing::warn!(room = %room, %detail, "{} read dropped", context);
    StatusCode::OK.into_response()
}

/// `GET /schedules?room=`
pub async fn get_schedules(
    State(state): State<AppState>,
    Query(query): Query<RoomQuery>,
) -> Response {
    let room = match RoomName::new(query.room.as_str()) {
        Ok(room) => room,
        Err(e) => return silent_gap("schedules", &query.room, e),
    };
    match state.store.load_schedules(&room).await {
        Ok(schedules) => Json(schedules).into_response(),
        Err(e) => silent_gap("schedules", room.as_str(), e),
    }
}

/// `GET /defaultWeek?room=`
pub async fn get_default_week(
    State(state): State<AppState>,
    Query(query): Query<RoomQuery>,
) -> Response {
    let room = match RoomName::new(query.room.as_str()) {
        Ok(room) => room,
        Err(e) => return silent_gap("defaultWeek", &query.room, e),
    };
    match state.store.load_default_week(&room).await {
        Ok(week) => Json(week).into_response(),
        Err(e) => silent_gap("defaultWeek", room.as_str(), e),
    }
}

/// `GET /calendar?room=`
pub async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<RoomQuery>,
) -> Response {
    let room = match RoomName::new(query.room.as_str()) {
        Ok(room) => room,
        Err(e) => return silent_gap("calendar", &query.room, e),
    };
    match state.store.load_calendar(&room).await {
        Ok(calendar) => Json(calendar).into_response(),
        Err(e) => silent_gap("calendar", room.as_str(), e),
    }
}

/// `GET /layout?room=&index=` - `index` of `-1` or omitted reads the
/// active slot.
pub async fn get_layout(
    State(state): State<AppState>,
    Query(query): Query<LayoutQuery>,
) -> Response {
    let room = match RoomName::new(query.room.as_str()) {
        Ok(room) => room,
        Err(e) => return silent_gap("layout", &query.room, e),
    };
    let layout = match state.store.load_layout(&room).await {
        Ok(layout) => layout,
        Err(e) => return silent_gap("layout", room.as_str(), e),
    };

    let index = match query.index {
        None | Some(-1) => layout.active_index,
        Some(i) if i >= 0 => i as usize,
        Some(i) => return silent_gap("layout", room.as_str(), format!("index {}", i)),
    };
    match layout.slot(index) {
        Some(slot) => Json(LayoutSlotResponse {
            widget_list: slot.widget_list.clone(),
            site: slot.site.clone(),
            layout_index: index,
        })
        .into_response(),
        None => silent_gap("layout", room.as_str(), format!("missing slot {}", index)),
    }
}

/// `GET /rooms` - every known room name.
pub async fn get_rooms(State(state): State<AppState>) -> Response {
    match state.store.list_rooms().await {
        Ok(rooms) => Json(rooms).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "room listing dropped");
            StatusCode::OK.into_response()
        }
    }
}
