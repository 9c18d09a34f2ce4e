//! RoomStore port - raw access to the four persisted per-room records.

use async_trait::async_trait;

use crate::domain::foundation::RoomName;
use crate::domain::{CalendarOverrides, DefaultWeek, Layout, ScheduleSet};

/// Errors that can occur in room store operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomStoreError {
    /// The room (or one of its documents) does not exist
    #[error("Room '{0}' not found")]
    NotFound(RoomName),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(String),

    /// A document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port over the per-room document store.
///
/// Each room owns exactly four documents: the schedule collection, the
/// weekly defaults, the calendar overrides, and the layout. There is no
/// transaction spanning them; callers serialize mutation sequences per room
/// (see the registry's mutation lock) and reconcile is safe to re-run if a
/// crash lands between writes.
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Names of every known room.
    async fn list_rooms(&self) -> Result<Vec<RoomName>, RoomStoreError>;

    /// Create a room with default documents. Existing documents are left
    /// untouched, so this doubles as a startup repair pass.
    async fn create_room(&self, room: &RoomName) -> Result<(), RoomStoreError>;

    /// Remove a room and all four of its documents.
    async fn delete_room(&self, room: &RoomName) -> Result<(), RoomStoreError>;

    /// Rename a room, carrying its documents over.
    async fn rename_room(&self, old: &RoomName, new: &RoomName) -> Result<(), RoomStoreError>;

    /// Whether a room exists.
    async fn room_exists(&self, room: &RoomName) -> Result<bool, RoomStoreError>;

    async fn load_schedules(&self, room: &RoomName) -> Result<ScheduleSet, RoomStoreError>;
    async fn save_schedules(
        &self,
        room: &RoomName,
        schedules: &ScheduleSet,
    ) -> Result<(), RoomStoreError>;

    async fn load_default_week(&self, room: &RoomName) -> Result<DefaultWeek, RoomStoreError>;
    async fn save_default_week(
        &self,
        room: &RoomName,
        week: &DefaultWeek,
    ) -> Result<(), RoomStoreError>;

    async fn load_calendar(&self, room: &RoomName) -> Result<CalendarOverrides, RoomStoreError>;
    async fn save_calendar(
        &self,
        room: &RoomName,
        calendar: &CalendarOverrides,
    ) -> Result<(), RoomStoreError>;

    async fn load_layout(&self, room: &RoomName) -> Result<Layout, RoomStoreError>;
    async fn save_layout(&self, room: &RoomName, layout: &Layout) -> Result<(), RoomStoreError>;
}
