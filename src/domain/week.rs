//! Weekly default schedule assignments.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// One nullable schedule name per weekday, Sunday = 0 .. Saturday = 6.
///
/// The persisted document is a JSON object keyed `"0"` through `"6"`, which
/// is what the display clients and the admin site both read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultWeek {
    slots: [Option<String>; 7],
}

impl DefaultWeek {
    pub fn new() -> Self {
        Self::default()
    }

    /// The schedule name assigned to a weekday, if any.
    ///
    /// Out-of-range indices read as unassigned.
    pub fn slot(&self, weekday: usize) -> Option<&str> {
        self.slots.get(weekday).and_then(|s| s.as_deref())
    }

    pub fn set(&mut self, weekday: usize, name: Option<String>) {
        if let Some(slot) = self.slots.get_mut(weekday) {
            *slot = name;
        }
    }

    pub fn slots(&self) -> &[Option<String>; 7] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [Option<String>; 7] {
        &mut self.slots
    }
}

impl Serialize for DefaultWeek {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(7))?;
        for (i, slot) in self.slots.iter().enumerate() {
            map.serialize_entry(&i.to_string(), slot)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DefaultWeek {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: BTreeMap<String, Option<String>> = BTreeMap::deserialize(deserializer)?;
        let mut slots: [Option<String>; 7] = Default::default();
        for (key, value) in raw {
            let index: usize = key
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid weekday key '{}'", key)))?;
            if index > 6 {
                return Err(D::Error::custom(format!("weekday key {} out of range", index)));
            }
            slots[index] = value;
        }
        Ok(Self { slots })
    }
}
