//! Filesystem room store.
//!
//! Each room is a directory under the data root holding exactly four JSON
//! documents: `schedules.json`, `defaultWeek.json`, `calendar.json` and
//! `layout.json`. The file names are shared with the admin site and the
//! display clients, so they are part of the external contract.
//!
//! Writes are plain read-modify-write with no file locking; callers hold
//! the room's mutation lock around every mutation sequence.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;

use crate::domain::foundation::RoomName;
use crate::domain::{CalendarOverrides, DefaultWeek, Layout, ScheduleSet};
use crate::ports::{RoomStore, RoomStoreError};

const SCHEDULES_FILE: &str = "schedules.json";
const DEFAULT_WEEK_FILE: &str = "defaultWeek.json";
const CALENDAR_FILE: &str = "calendar.json";
const LAYOUT_FILE: &str = "layout.json";

/// Room store backed by per-room directories of JSON documents.
#[derive(Debug, Clone)]
pub struct FsRoomStore {
    base_path: PathBuf,
}

impl FsRoomStore {
    /// Create a store rooted at `base_path`. The directory itself is
    /// created on first use.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn room_dir(&self, room: &RoomName) -> PathBuf {
        self.base_path.join(room.as_str())
    }

    fn document_path(&self, room: &RoomName, file: &str) -> PathBuf {
        self.room_dir(room).join(file)
    }

    async fn load_document<T: DeserializeOwned>(
        &self,
        room: &RoomName,
        file: &str,
    ) -> Result<T, RoomStoreError> {
        let path = self.document_path(room, file);
        if !path.exists() {
            return Err(RoomStoreError::NotFound(room.clone()));
        }
        let raw = fs::read_to_string(&path)
            .await
            .map_err(|e| RoomStoreError::Io(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| RoomStoreError::Serialization(e.to_string()))
    }

    async fn save_document<T: Serialize>(
        &self,
        room: &RoomName,
        file: &str,
        document: &T,
    ) -> Result<(), RoomStoreError> {
        let dir = self.room_dir(room);
        if !dir.exists() {
            return Err(RoomStoreError::NotFound(room.clone()));
        }
        let raw = serde_json::to_string(document)
            .map_err(|e| RoomStoreError::Serialization(e.to_string()))?;
        fs::write(self.document_path(room, file), raw)
            .await
            .map_err(|e| RoomStoreError::Io(e.to_string()))
    }

    /// Write default documents for any that are missing.
    ///
    /// Used both when creating a room and as a startup repair pass over
    /// existing room directories, so a half-provisioned room heals itself.
    async fn ensure_documents(&self, room: &RoomName) -> Result<(), RoomStoreError> {
        let dir = self.room_dir(room);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| RoomStoreError::Io(e.to_string()))?;

        if !self.document_path(room, SCHEDULES_FILE).exists() {
            self.save_document(room, SCHEDULES_FILE, &ScheduleSet::new())
                .await?;
        }
        if !self.document_path(room, DEFAULT_WEEK_FILE).exists() {
            self.save_document(room, DEFAULT_WEEK_FILE, &DefaultWeek::new())
                .await?;
        }
        if !self.document_path(room, CALENDAR_FILE).exists() {
            self.save_document(room, CALENDAR_FILE, &CalendarOverrides::new())
                .await?;
        }
        if !self.document_path(room, LAYOUT_FILE).exists() {
            self.save_document(room, LAYOUT_FILE, &Layout::default())
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RoomStore for FsRoomStore {
    async fn list_rooms(&self) -> Result<Vec<RoomName>, RoomStoreError> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }
        let mut entries = fs::read_dir(&self.base_path)
            .await
            .map_err(|e| RoomStoreError::Io(e.to_string()))?;

        let mut rooms = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RoomStoreError::Io(e.to_string()))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map_err(|e| RoomStoreError::Io(e.to_string()))?
                .is_dir();
            if !is_dir {
                continue;
            }
            match entry.file_name().to_str().map(RoomName::new) {
                Some(Ok(room)) => rooms.push(room),
                _ => {
                    tracing::warn!(
                        entry = %entry.file_name().to_string_lossy(),
                        "skipping data directory entry that is not a valid room name"
                    );
                }
            }
        }
        rooms.sort();
        Ok(rooms)
    }

    async fn create_room(&self, room: &RoomName) -> Result<(), RoomStoreError> {
        self.ensure_documents(room).await
    }

    async fn delete_room(&self, room: &RoomName) -> Result<(), RoomStoreError> {
        let dir = self.room_dir(room);
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| RoomStoreError::Io(e.to_string()))?;
        }
        Ok(())
    }

    async fn rename_room(&self, old: &RoomName, new: &RoomName) -> Result<(), RoomStoreError> {
        let old_dir = self.room_dir(old);
        if !old_dir.exists() {
            return Err(RoomStoreError::NotFound(old.clone()));
        }
        fs::rename(old_dir, self.room_dir(new))
            .await
            .map_err(|e| RoomStoreError::Io(e.to_string()))
    }

    async fn room_exists(&self, room: &RoomName) -> Result<bool, RoomStoreError> {
        Ok(self.room_dir(room).exists())
    }

    async fn load_schedules(&self, room: &RoomName) -> Result<ScheduleSet, RoomStoreError> {
        self.load_document(room, SCHEDULES_FILE).await
    }

    async fn save_schedules(
        &self,
        room: &RoomName,
        schedules: &ScheduleSet,
    ) -> Result<(), RoomStoreError> {
        self.save_document(room, SCHEDULES_FILE, schedules).await
    }

    async fn load_default_week(&self, room: &RoomName) -> Result<DefaultWeek, RoomStoreError> {
        self.load_document(room, DEFAULT_WEEK_FILE).await
    }

    async fn save_default_week(
        &self,
        room: &RoomName,
        week: &DefaultWeek,
    ) -> Result<(), RoomStoreError> {
        self.save_document(room, DEFAULT_WEEK_FILE, week).await
    }

    async fn load_calendar(&self, room: &RoomName) -> Result<CalendarOverrides, RoomStoreError> {
        self.load_document(room, CALENDAR_FILE).await
    }

    async fn save_calendar(
        &self,
        room: &RoomName,
        calendar: &CalendarOverrides,
    ) -> Result<(), RoomStoreError> {
        self.save_document(room, CALENDAR_FILE, calendar).await
    }

    async fn load_layout(&self, room: &RoomName) -> Result<Layout, RoomStoreError> {
        self.load_document(room, LAYOUT_FILE).await
    }

    async fn save_layout(&self, room: &RoomName, layout: &Layout) -> Result<(), RoomStoreError> {
        self.save_document(room, LAYOUT_FILE, layout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OverrideEntry, Period};
    use tempfile::TempDir;

    fn room(name: &str) -> RoomName {
        RoomName::new(name).unwrap()
    }

    #[tokio::test]
    async fn create_room_writes_all_four_default_documents() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsRoomStore::new(temp_dir.path());
        let r = room("Room 1");

        store.create_room(&r).await.unwrap();

        assert!(store.load_schedules(&r).await.unwrap().is_empty());
        let week = store.load_default_week(&r).await.unwrap();
        assert!(week.slots().iter().all(Option::is_none));
        assert!(store.load_calendar(&r).await.unwrap().is_empty());
        let layout = store.load_layout(&r).await.unwrap();
        assert_eq!(layout.active_index, 0);
        assert_eq!(layout.slots[0].site.background_color, "#000000");
    }

    #[tokio::test]
    async fn create_room_leaves_existing_documents_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsRoomStore::new(temp_dir.path());
        let r = room("Room 1");
        store.create_room(&r).await.unwrap();

        let mut schedules = ScheduleSet::new();
        schedules.insert(
            "Normal",
            vec![Period {
                name: "P1".to_string(),
                start: "08:00".to_string(),
                end: "09:00".to_string(),
            }],
        );
        store.save_schedules(&r, &schedules).await.unwrap();

        // the repair pass must not clobber the populated document
        store.create_room(&r).await.unwrap();
        assert!(store.load_schedules(&r).await.unwrap().contains("Normal"));
    }

    #[tokio::test]
    async fn documents_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsRoomStore::new(temp_dir.path());
        let r = room("Room 1");
        store.create_room(&r).await.unwrap();

        let mut week = DefaultWeek::new();
        week.set(3, Some("Normal".to_string()));
        store.save_default_week(&r, &week).await.unwrap();
        assert_eq!(store.load_default_week(&r).await.unwrap(), week);

        let mut calendar = CalendarOverrides::new();
        calendar.insert(
            205,
            OverrideEntry {
                schedule: Some("Half".to_string()),
                repeating: false,
            },
        );
        store.save_calendar(&r, &calendar).await.unwrap();
        assert_eq!(store.load_calendar(&r).await.unwrap(), calendar);
    }

    #[tokio::test]
    async fn unknown_room_reports_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsRoomStore::new(temp_dir.path());
        let result = store.load_layout(&room("nowhere")).await;
        assert!(matches!(result, Err(RoomStoreError::NotFound(_))));

        let result = store
            .save_default_week(&room("nowhere"), &DefaultWeek::new())
            .await;
        assert!(matches!(result, Err(RoomStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_rooms_only_sees_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsRoomStore::new(temp_dir.path());
        store.create_room(&room("B Room")).await.unwrap();
        store.create_room(&room("A Room")).await.unwrap();
        // a stray file in the data root is not a room
        std::fs::write(temp_dir.path().join("notes.txt"), "x").unwrap();

        let rooms = store.list_rooms().await.unwrap();
        assert_eq!(rooms, vec![room("A Room"), room("B Room")]);
    }

    #[tokio::test]
    async fn delete_room_removes_the_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsRoomStore::new(temp_dir.path());
        let r = room("Room 1");
        store.create_room(&r).await.unwrap();

        store.delete_room(&r).await.unwrap();
        assert!(!store.room_exists(&r).await.unwrap());
        // deleting again is harmless
        store.delete_room(&r).await.unwrap();
    }

    #[tokio::test]
    async fn rename_room_moves_documents() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsRoomStore::new(temp_dir.path());
        let old = room("Old");
        store.create_room(&old).await.unwrap();
        let mut schedules = ScheduleSet::new();
        schedules.insert("Normal", vec![]);
        store.save_schedules(&old, &schedules).await.unwrap();

        store.rename_room(&old, &room("New")).await.unwrap();

        assert!(!store.room_exists(&old).await.unwrap());
        assert!(store
            .load_schedules(&room("New"))
            .await
            .unwrap()
            .contains("Normal"));
    }

    #[tokio::test]
    async fn corrupt_document_reports_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsRoomStore::new(temp_dir.path());
        let r = room("Room 1");
        store.create_room(&r).await.unwrap();
        std::fs::write(temp_dir.path().join("Room 1").join("calendar.json"), "{not json").unwrap();

        let result = store.load_calendar(&r).await;
        assert!(matches!(result, Err(RoomStoreError::Serialization(_))));
    }
}
