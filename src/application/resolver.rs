//! Schedule resolution - picking "today's" schedule for a room.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::foundation::{date_key, weekday_index, RoomName};
use crate::domain::Period;
use crate::ports::{RoomStore, RoomStoreError};

/// Resolves the active schedule for a room on a given date.
///
/// A calendar override for the date wins over the weekly default; an
/// override whose schedule is null resolves to an empty day without falling
/// through to the weekly default. A name that no longer exists in the
/// schedule collection also resolves empty - missing is not an error.
pub struct ScheduleResolver {
    store: Arc<dyn RoomStore>,
}

impl ScheduleResolver {
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// Resolve the room's schedule for `today`.
    ///
    /// Never fails: store failures are logged and resolve to an empty
    /// schedule. Every call also purges yesterday's spent one-time override
    /// if there is one; the purge is idempotent and safe to repeat.
    pub async fn resolve(&self, room: &RoomName, today: NaiveDate) -> Vec<Period> {
        let periods = match self.resolve_inner(room, today).await {
            Ok(periods) => periods,
            Err(e) => {
                tracing::warn!(room = %room, error = %e, "schedule resolution failed");
                Vec::new()
            }
        };

        self.purge_spent_override(room, today).await;

        periods
    }

    async fn resolve_inner(
        &self,
        room: &RoomName,
        today: NaiveDate,
    ) -> Result<Vec<Period>, RoomStoreError> {
        let calendar = self.store.load_calendar(room).await?;
        let schedules = self.store.load_schedules(room).await?;

        let schedule_name = match calendar.get(date_key(today)) {
            Some(entry) => entry.schedule.clone(),
            None => {
                let week = self.store.load_default_week(room).await?;
                week.slot(weekday_index(today)).map(str::to_string)
            }
        };

        Ok(schedule_name
            .and_then(|name| schedules.get(&name))
            .map(<[Period]>::to_vec)
            .unwrap_or_default())
    }

    /// Delete yesterday's override if it was a one-time entry whose date
    /// has now passed.
    async fn purge_spent_override(&self, room: &RoomName, today: NaiveDate) {
        let Some(yesterday) = today.pred_opt() else {
            return;
        };
        let key = date_key(yesterday);

        let mut calendar = match self.store.load_calendar(room).await {
            Ok(calendar) => calendar,
            Err(e) => {
                tracing::warn!(room = %room, error = %e, "override purge skipped");
                return;
            }
        };

        let spent = calendar
            .get(key)
            .map(|entry| !entry.repeating)
            .unwrap_or(false);
        if !spent {
            return;
        }

        calendar.remove(key);
        if let Err(e) = self.store.save_calendar(room, &calendar).await {
            tracing::warn!(room = %room, error = %e, "failed to persist override purge");
        } else {
            tracing::debug!(room = %room, key, "purged spent one-time override");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryRoomStore;
    use crate::domain::{OverrideEntry, ScheduleSet};
    fn room(name: &str) -> RoomName {
        RoomName::new(name).unwrap()
    }

    fn period(name: &str, start: &str, end: &str) -> Period {
        Period {
            name: name.to_string(),
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    /// A Tuesday, so the weekly-default slot under test is index 2.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    async fn store_with_normal_schedule() -> (Arc<MemoryRoomStore>, RoomName) {
        let store = Arc::new(MemoryRoomStore::with_rooms(&["R"]));
        let r = room("R");
        let mut schedules = ScheduleSet::new();
        schedules.insert("Normal", vec![period("P1", "08:00", "09:00")]);
        store.save_schedules(&r, &schedules).await.unwrap();
        (store, r)
    }

    #[tokio::test]
    async fn weekly_default_resolves() {
        let (store, r) = store_with_normal_schedule().await;
        let mut week = store.load_default_week(&r).await.unwrap();
        week.set(weekday_index(today()), Some("Normal".to_string()));
        store.save_default_week(&r, &week).await.unwrap();

        let resolver = ScheduleResolver::new(store);
        let resolved = resolver.resolve(&r, today()).await;
        assert_eq!(resolved, vec![period("P1", "08:00", "09:00")]);
    }

    #[tokio::test]
    async fn override_wins_over_weekly_default() {
        let (store, r) = store_with_normal_schedule().await;
        let mut schedules = store.load_schedules(&r).await.unwrap();
        schedules.insert("Half", vec![period("H1", "08:00", "08:30")]);
        store.save_schedules(&r, &schedules).await.unwrap();

        let mut week = store.load_default_week(&r).await.unwrap();
        week.set(weekday_index(today()), Some("Normal".to_string()));
        store.save_default_week(&r, &week).await.unwrap();

        let mut calendar = store.load_calendar(&r).await.unwrap();
        calendar.insert(
            date_key(today()),
            OverrideEntry {
                schedule: Some("Half".to_string()),
                repeating: false,
            },
        );
        store.save_calendar(&r, &calendar).await.unwrap();

        let resolver = ScheduleResolver::new(store);
        let resolved = resolver.resolve(&r, today()).await;
        assert_eq!(resolved, vec![period("H1", "08:00", "08:30")]);
    }

    #[tokio::test]
    async fn null_override_resolves_empty_without_falling_through() {
        let (store, r) = store_with_normal_schedule().await;
        let mut week = store.load_default_week(&r).await.unwrap();
        week.set(weekday_index(today()), Some("Normal".to_string()));
        store.save_default_week(&r, &week).await.unwrap();

        let mut calendar = store.load_calendar(&r).await.unwrap();
        calendar.insert(
            date_key(today()),
            OverrideEntry {
                schedule: None,
                repeating: false,
            },
        );
        store.save_calendar(&r, &calendar).await.unwrap();

        let resolver = ScheduleResolver::new(store);
        assert!(resolver.resolve(&r, today()).await.is_empty());
    }

    #[tokio::test]
    async fn missing_schedule_name_resolves_empty() {
        let (store, r) = store_with_normal_schedule().await;
        let mut calendar = store.load_calendar(&r).await.unwrap();
        calendar.insert(
            date_key(today()),
            OverrideEntry {
                schedule: Some("Half".to_string()),
                repeating: false,
            },
        );
        store.save_calendar(&r, &calendar).await.unwrap();

        let resolver = ScheduleResolver::new(store);
        // "Half" is not in the schedule collection; this is not an error
        assert!(resolver.resolve(&r, today()).await.is_empty());
    }

    #[tokio::test]
    async fn null_default_slot_resolves_empty() {
        let (store, r) = store_with_normal_schedule().await;
        let resolver = ScheduleResolver::new(store);
        assert!(resolver.resolve(&r, today()).await.is_empty());
    }

    #[tokio::test]
    async fn spent_one_time_override_is_purged() {
        let (store, r) = store_with_normal_schedule().await;
        let yesterday = today().pred_opt().unwrap();
        let mut calendar = store.load_calendar(&r).await.unwrap();
        calendar.insert(
            date_key(yesterday),
            OverrideEntry {
                schedule: Some("Normal".to_string()),
                repeating: false,
            },
        );
        store.save_calendar(&r, &calendar).await.unwrap();

        let resolver = ScheduleResolver::new(Arc::clone(&store) as Arc<dyn RoomStore>);
        resolver.resolve(&r, today()).await;

        let calendar = store.load_calendar(&r).await.unwrap();
        assert!(calendar.get(date_key(yesterday)).is_none());

        // running again is harmless
        resolver.resolve(&r, today()).await;
        assert!(store.load_calendar(&r).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn repeating_override_survives_the_purge() {
        let (store, r) = store_with_normal_schedule().await;
        let yesterday = today().pred_opt().unwrap();
        let mut calendar = store.load_calendar(&r).await.unwrap();
        calendar.insert(
            date_key(yesterday),
            OverrideEntry {
                schedule: Some("Normal".to_string()),
                repeating: true,
            },
        );
        store.save_calendar(&r, &calendar).await.unwrap();

        let resolver = ScheduleResolver::new(Arc::clone(&store) as Arc<dyn RoomStore>);
        resolver.resolve(&r, today()).await;

        assert!(store
            .load_calendar(&r)
            .await
            .unwrap()
            .get(date_key(yesterday))
            .is_some());
    }

    #[tokio::test]
    async fn unknown_room_resolves_empty() {
        let store = Arc::new(MemoryRoomStore::new());
        let resolver = ScheduleResolver::new(store);
        assert!(resolver.resolve(&room("nowhere"), today()).await.is_empty());
    }
}
