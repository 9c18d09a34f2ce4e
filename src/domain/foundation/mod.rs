//! Foundation value objects shared across the domain.

mod date_key;
mod errors;
mod room_name;

pub use date_key::{date_key, weekday_index};
pub use errors::ValidationError;
pub use room_name::RoomName;
