//! Storage adapters for the per-room document store.

mod fs_room_store;
mod memory;

pub use fs_room_store::FsRoomStore;
pub use memory::MemoryRoomStore;
