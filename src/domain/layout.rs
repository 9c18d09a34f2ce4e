//! Display layout records.
//!
//! Every room owns exactly three layout slots; `layoutIndex` selects the one
//! currently shown. Widget configuration is opaque to the server (the admin
//! site owns its schema), so it is carried as raw JSON.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Per-slot site configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(rename = "backgroundColor")]
    pub background_color: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            background_color: "#000000".to_string(),
        }
    }
}

/// A positioned widget on the display grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    #[serde(rename = "type")]
    pub kind: String,
    pub row: u32,
    pub col: u32,
    pub width: u32,
    pub height: u32,
    /// Widget-specific configuration, passed through untouched.
    pub config: serde_json::Value,
}

/// One of the three switchable layout slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSlot {
    pub site: SiteConfig,
    #[serde(rename = "widgetList")]
    pub widget_list: Vec<Widget>,
}

/// A room's persisted layout document: three fixed slots plus the index of
/// the slot currently shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(rename = "layoutIndex")]
    pub active_index: usize,
    #[serde(rename = "layouts")]
    pub slots: [LayoutSlot; 3],
}

impl Layout {
    /// Number of slots in every layout document.
    pub const SLOT_COUNT: usize = 3;

    /// The slot currently shown. A hand-edited out-of-range index falls
    /// back to the first slot.
    pub fn active_slot(&self) -> &LayoutSlot {
        self.slots.get(self.active_index).unwrap_or(&self.slots[0])
    }

    /// Borrow a slot by explicit index.
    pub fn slot(&self, index: usize) -> Option<&LayoutSlot> {
        self.slots.get(index)
    }

    /// Replace one slot and make it the active one, which is what a layout
    /// submission from the admin site does.
    pub fn apply_slot(&mut self, index: usize, slot: LayoutSlot) {
        if index < Self::SLOT_COUNT {
            self.slots[index] = slot;
            self.active_index = index;
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            active_index: 0,
            slots: Default::default(),
        }
    }
}

/// The fixed payload slot pushed to a connection that named an unknown room:
/// a single textbox telling the display operator how to recover.
pub static INVALID_ROOM_SLOT: Lazy<LayoutSlot> = Lazy::new(|| {
    serde_json::from_value(json!({
        "site": {"backgroundColor": "#ffaaaa"},
        "widgetList": [{
            "type": "textbox",
            "row": 1,
            "col": 1,
            "width": 14,
            "height": 7,
            "config": {
                "backgroundColor": "#ffffff",
                "textColor": "#000000",
                "text": "\nInvalid Room Name.\nPlease press \"ESC\" on the keyboard\nto enter a room name.\n\n(The room name should coorespond with a\nroom name on the \"Room Select Page\"\nof the administrative site)\n"
            }
        }]
    }))
    .expect("invalid-room slot literal is well-formed")
});
