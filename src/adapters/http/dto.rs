//! HTTP DTOs for the read and admin surfaces.
//!
//! Field names mirror the documents and the admin site's request bodies, so
//! the wire contract stays put while domain types evolve.

use serde::{Deserialize, Serialize};

use crate::domain::{CalendarOverrides, DefaultWeek, ScheduleSet, SiteConfig, Widget};

// ---- Read queries ---------------------------------------------------------

/// Query naming the room to read.
#[derive(Debug, Deserialize)]
pub struct RoomQuery {
    pub room: String,
}

/// Query for a layout slot. `index` of `-1` (or omitted) means the active
/// slot.
#[derive(Debug, Deserialize)]
pub struct LayoutQuery {
    pub room: String,
    #[serde(default)]
    pub index: Option<i64>,
}

/// Layout slot response: the slot's contents plus the index it came from.
#[derive(Debug, Serialize)]
pub struct LayoutSlotResponse {
    #[serde(rename = "widgetList")]
    pub widget_list: Vec<Widget>,
    pub site: SiteConfig,
    #[serde(rename = "layoutIndex")]
    pub layout_index: usize,
}

// ---- Admin bodies ---------------------------------------------------------

/// Schedule-collection submission.
#[derive(Debug, Deserialize)]
pub struct SchedulesBody {
    pub token: String,
    pub room: String,
    pub data: SchedulesData,
}

/// The submitted collection plus the rename hint.
#[derive(Debug, Deserialize)]
pub struct SchedulesData {
    #[serde(rename = "oldName")]
    pub old_name: Option<String>,
    #[serde(rename = "newName")]
    pub new_name: Option<String>,
    pub schedules: ScheduleSet,
}

/// Weekly-defaults submission.
#[derive(Debug, Deserialize)]
pub struct DefaultWeekBody {
    pub token: String,
    pub room: String,
    pub data: DefaultWeek,
}

/// Calendar-overrides submission.
#[derive(Debug, Deserialize)]
pub struct CalendarBody {
    pub token: String,
    pub room: String,
    pub data: CalendarOverrides,
}

/// Layout-slot submission.
#[derive(Debug, Deserialize)]
pub struct LayoutBody {
    pub token: String,
    pub room: String,
    pub data: LayoutData,
}

/// One slot's new contents plus the index it lands in (which also becomes
/// the active index).
#[derive(Debug, Deserialize)]
pub struct LayoutData {
    #[serde(rename = "layoutIndex")]
    pub layout_index: usize,
    pub site: SiteConfig,
    #[serde(rename = "widgetList")]
    pub widget_list: Vec<Widget>,
}

/// Room-surface submission: create (`old` null), delete (`new` null), or
/// rename (both present).
#[derive(Debug, Deserialize)]
pub struct RoomsBody {
    pub token: String,
    pub data: RoomsData,
}

#[derive(Debug, Deserialize)]
pub struct RoomsData {
    pub old: Option<String>,
    pub new: Option<String>,
}
