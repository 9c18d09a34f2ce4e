//! The composed per-room snapshot pushed over the realtime channel.

use serde::{Deserialize, Serialize};

use super::layout::LayoutSlot;
use super::schedule::Period;
use super::weather::WeatherSnapshot;

/// Everything a display needs to render a room right now.
///
/// `weather` is omitted from the wire until the first successful refresh,
/// matching what clients already tolerate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub schedule: Vec<Period>,
    pub layout: LayoutSlot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherSnapshot>,
}
