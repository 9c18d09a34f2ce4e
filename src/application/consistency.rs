//! Consistency propagation across the per-room records.
//!
//! After the schedule collection changes, the weekly defaults and the
//! calendar overrides may point at names that were renamed away or deleted.
//! Both passes read against the POST-mutation collection only, so running
//! them again (for instance after a crash between document writes) always
//! converges to the same state.

use std::sync::Arc;

use crate::domain::foundation::RoomName;
use crate::domain::{CalendarOverrides, DefaultWeek, ScheduleSet};
use crate::ports::{RoomStore, RoomStoreError};

/// Propagates a schedule rename or delete into the dependent records.
pub struct ConsistencyMaintainer {
    store: Arc<dyn RoomStore>,
}

impl ConsistencyMaintainer {
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// Reconcile the weekly defaults and calendar overrides with
    /// `final_schedules`, applying the `old_name` -> `new_name` rename hint
    /// (`new_name = None` means the schedule was deleted).
    ///
    /// Idempotent: re-running with the same final collection is a no-op.
    pub async fn reconcile(
        &self,
        room: &RoomName,
        old_name: Option<&str>,
        new_name: Option<&str>,
        final_schedules: &ScheduleSet,
    ) -> Result<(), RoomStoreError> {
        let mut week = self.store.load_default_week(room).await?;
        reconcile_week(&mut week, old_name, new_name, final_schedules);
        self.store.save_default_week(room, &week).await?;

        let mut calendar = self.store.load_calendar(room).await?;
        reconcile_calendar(&mut calendar, old_name, new_name, final_schedules);
        self.store.save_calendar(room, &calendar).await?;

        Ok(())
    }
}

/// Apply the rename hint to every assigned weekday slot, then null any slot
/// whose name is absent from the final collection.
pub fn reconcile_week(
    week: &mut DefaultWeek,
    old_name: Option<&str>,
    new_name: Option<&str>,
    final_schedules: &ScheduleSet,
) {
    for slot in week.slots_mut() {
        if slot.is_none() {
            continue;
        }
        if old_name.is_some() && slot.as_deref() == old_name {
            *slot = new_name.map(str::to_string);
        }
        if let Some(name) = slot.as_deref() {
            if !final_schedules.contains(name) {
                *slot = None;
            }
        }
    }
}

/// Apply the rename hint to every override, then REMOVE any whole entry
/// whose schedule is absent from the final collection. Overrides whose
/// schedule is null (a deliberate empty day) are untouched.
pub fn reconcile_calendar(
    calendar: &mut CalendarOverrides,
    old_name: Option<&str>,
    new_name: Option<&str>,
    final_schedules: &ScheduleSet,
) {
    calendar.retain(|_, entry| {
        let Some(name) = entry.schedule.as_deref() else {
            return true;
        };
        let renamed = if old_name == Some(name) {
            new_name.map(str::to_string)
        } else {
            Some(name.to_string())
        };
        match renamed {
            Some(name) if final_schedules.contains(&name) => {
                entry.schedule = Some(name);
                true
            }
            _ => false,
        }
    });
}
