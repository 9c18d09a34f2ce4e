//! Domain layer - value objects and per-room records.
//!
//! Everything here is pure data: no I/O, no clocks, no sockets. The four
//! persisted per-room records (schedules, weekly defaults, calendar
//! overrides, layout) live here together with the value objects they are
//! built from.

pub mod calendar;
pub mod foundation;
pub mod layout;
pub mod schedule;
pub mod snapshot;
pub mod weather;
pub mod week;

pub use calendar::{CalendarOverrides, OverrideEntry};
pub use layout::{Layout, LayoutSlot, SiteConfig, Widget};
pub use schedule::{Period, ScheduleSet};
pub use snapshot::RoomSnapshot;
pub use weather::WeatherSnapshot;
pub use week::DefaultWeek;
