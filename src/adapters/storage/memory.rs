//! In-memory room store.
//!
//! Backs unit and integration tests that exercise the synchronization
//! services without touching the filesystem. Behaves like the filesystem
//! adapter: loads and saves against unknown rooms report `NotFound`.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::RoomName;
use crate::domain::{CalendarOverrides, DefaultWeek, Layout, ScheduleSet};
use crate::ports::{RoomStore, RoomStoreError};

#[derive(Debug, Default, Clone)]
struct RoomDocs {
    schedules: ScheduleSet,
    week: DefaultWeek,
    calendar: CalendarOverrides,
    layout: Layout,
}

/// Room store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryRoomStore {
    rooms: RwLock<HashMap<RoomName, RoomDocs>>,
}

impl MemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor seeding empty rooms.
    pub fn with_rooms(names: &[&str]) -> Self {
        let store = Self::new();
        {
            let mut rooms = store.rooms.write().unwrap();
            for name in names {
                rooms.insert(
                    RoomName::new(*name).expect("valid room name"),
                    RoomDocs::default(),
                );
            }
        }
        store
    }

    fn read_doc<T>(
        &self,
        room: &RoomName,
        f: impl FnOnce(&RoomDocs) -> T,
    ) -> Result<T, RoomStoreError> {
        let rooms = self.rooms.read().expect("memory store lock poisoned");
        rooms
            .get(room.as_str())
            .map(f)
            .ok_or_else(|| RoomStoreError::NotFound(room.clone()))
    }

    fn write_doc(
        &self,
        room: &RoomName,
        f: impl FnOnce(&mut RoomDocs),
    ) -> Result<(), RoomStoreError> {
        let mut rooms = self.rooms.write().expect("memory store lock poisoned");
        match rooms.get_mut(room.as_str()) {
            Some(docs) => {
                f(docs);
                Ok(())
            }
            None => Err(RoomStoreError::NotFound(room.clone())),
        }
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn list_rooms(&self) -> Result<Vec<RoomName>, RoomStoreError> {
        let mut names: Vec<RoomName> = self
            .rooms
            .read()
            .expect("memory store lock poisoned")
            .keys()
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }

    async fn create_room(&self, room: &RoomName) -> Result<(), RoomStoreError> {
        self.rooms
            .write()
            .expect("memory store lock poisoned")
            .entry(room.clone())
            .or_default();
        Ok(())
    }

    async fn delete_room(&self, room: &RoomName) -> Result<(), RoomStoreError> {
        self.rooms
            .write()
            .expect("memory store lock poisoned")
            .remove(room.as_str());
        Ok(())
    }

    async fn rename_room(&self, old: &RoomName, new: &RoomName) -> Result<(), RoomStoreError> {
        let mut rooms = self.rooms.write().expect("memory store lock poisoned");
        match rooms.remove(old.as_str()) {
            Some(docs) => {
                rooms.insert(new.clone(), docs);
                Ok(())
            }
            None => Err(RoomStoreError::NotFound(old.clone())),
        }
    }

    async fn room_exists(&self, room: &RoomName) -> Result<bool, RoomStoreError> {
        Ok(self
            .rooms
            .read()
            .expect("memory store lock poisoned")
            .contains_key(room.as_str()))
    }

    async fn load_schedules(&self, room: &RoomName) -> Result<ScheduleSet, RoomStoreError> {
        self.read_doc(room, |docs| docs.schedules.clone())
    }

    async fn save_schedules(
        &self,
        room: &RoomName,
        schedules: &ScheduleSet,
    ) -> Result<(), RoomStoreError> {
        self.write_doc(room, |docs| docs.schedules = schedules.clone())
    }

    async fn load_default_week(&self, room: &RoomName) -> Result<DefaultWeek, RoomStoreError> {
        self.read_doc(room, |docs| docs.week.clone())
    }

    async fn save_default_week(
        &self,
        room: &RoomName,
        week: &DefaultWeek,
    ) -> Result<(), RoomStoreError> {
        self.write_doc(room, |docs| docs.week = week.clone())
    }

    async fn load_calendar(&self, room: &RoomName) -> Result<CalendarOverrides, RoomStoreError> {
        self.read_doc(room, |docs| docs.calendar.clone())
    }

    async fn save_calendar(
        &self,
        room: &RoomName,
        calendar: &CalendarOverrides,
    ) -> Result<(), RoomStoreError> {
        self.write_doc(room, |docs| docs.calendar = calendar.clone())
    }

    async fn load_layout(&self, room: &RoomName) -> Result<Layout, RoomStoreError> {
        self.read_doc(room, |docs| docs.layout.clone())
    }

    async fn save_layout(&self, room: &RoomName, layout: &Layout) -> Result<(), RoomStoreError> {
        self.write_doc(room, |docs| docs.layout = layout.clone())
    }
}
