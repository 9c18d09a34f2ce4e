//! Error types for the domain layer.

use thiserror::Error;

/// Errors raised when a submitted record fails validation.
///
/// These are the only failures surfaced to administrative callers with a
/// reason; everything else in the service degrades silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Room name cannot be empty")]
    EmptyRoomName,

    #[error("Room name '{0}' contains characters that are not allowed")]
    InvalidRoomName(String),

    #[error("Room '{0}' already exists")]
    DuplicateRoom(String),

    #[error("Room '{0}' does not exist")]
    UnknownRoom(String),

    #[error("Schedule name cannot be empty")]
    EmptyScheduleName,

    #[error("Schedule '{schedule}': period {row} has an invalid time (expected HH:MM)")]
    InvalidTime { schedule: String, row: usize },

    #[error("Schedule '{schedule}': period {row} ends before it starts")]
    EndBeforeStart { schedule: String, row: usize },

    #[error("Schedule '{schedule}': period {row} starts before the previous period ends")]
    OverlapsPrevious { schedule: String, row: usize },

    #[error("Layout index {0} is out of range (expected 0-2)")]
    LayoutIndexOutOfRange(usize),
}
