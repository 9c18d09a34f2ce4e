//! Application services - the room-state synchronization engine.
//!
//! Services orchestrate the ports: resolution picks today's schedule,
//! consistency keeps the four records coherent across renames and deletes,
//! the registry owns ambient per-room state (resolved-schedule cache and
//! subscriber sets), the coordinator fans snapshots out, and the triggers
//! drive the daily rollover and the weather refresh.

pub mod admin;
pub mod broadcast;
pub mod consistency;
pub mod registry;
pub mod resolver;
pub mod triggers;

pub use admin::{AdminOutcome, AdminService, RoomMutation, SchedulesSubmission};
pub use broadcast::{BroadcastCoordinator, SharedWeather};
pub use consistency::ConsistencyMaintainer;
pub use registry::{ConnectionId, OutboundFrame, OutboundSender, RoomRegistry};
pub use resolver::ScheduleResolver;
pub use triggers::SchedulerTriggers;
