use floppy_core::Settings;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InteractionPreferences {
    pub snap_tolerance: f64,
    pub drag_sensitivity: f64,
    pub realign_on_toggle: bool,

    /// Screen-space radius of the arcball, in pixels.
    pub arcball_radius: f32,
}
impl Default for InteractionPreferences {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            snap_tolerance: settings.snap_tolerance,
            drag_sensitivity: settings.drag_sensitivity,
            realign_on_toggle: settings.realign_on_toggle,
            arcball_radius: 300.0,
        }
    }
}

impl InteractionPreferences {
    pub fn to_settings(&self) -> Settings {
        Settings {
            snap_tolerance: self.snap_tolerance,
            drag_sensitivity: self.drag_sensitivity,
            realign_on_toggle: self.realign_on_toggle,
        }
    }
}
