//! User preferences for the floppy cube.
//!
//! Preferences are layered: the built-in defaults come first, followed by an
//! optional user file that may override any subset of keys.

#![allow(missing_docs)] // fields are self-explanatory

#[macro_use]
extern crate lazy_static;

use std::path::Path;

use eyre::{Result, WrapErr};
use floppy_core::Settings;
use serde::{Deserialize, Serialize};

mod interaction;
pub mod persist;

pub use interaction::*;

const PREFS_FILE_FORMAT: config::FileFormat = config::FileFormat::Yaml;
const DEFAULT_PREFS_STR: &str = include_str!("default.yaml");

lazy_static! {
    pub static ref DEFAULT_PREFS: Preferences =
        serde_norway::from_str(DEFAULT_PREFS_STR).expect("error loading default preferences");
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Preferences {
    pub interaction: InteractionPreferences,
}

impl Preferences {
    /// Loads preferences from the file at `path`, layered over the defaults.
    /// If loading fails, then the default preferences are returned.
    pub fn load(path: Option<&Path>) -> Self {
        lazy_static::initialize(&DEFAULT_PREFS);

        Self::try_load(path).unwrap_or_else(|e| {
            log::warn!("Error loading preferences: {e:#}");
            DEFAULT_PREFS.clone()
        })
    }

    /// Loads preferences from the file at `path`, layered over the defaults.
    /// A missing file is not an error.
    pub fn try_load(path: Option<&Path>) -> Result<Self> {
        let mut config = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_PREFS_STR, PREFS_FILE_FORMAT));
        if let Some(path) = path {
            log::debug!("Loading preferences from {}", path.display());
            config = config.add_source(persist::user_config_source(path));
        }

        config
            .build()
            .wrap_err("error reading preferences")?
            .try_deserialize()
            .wrap_err("error deserializing preferences")
    }

    /// Writes preferences to the file at `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        persist::save(path, self)
    }

    /// Returns the interaction settings for the puzzle.
    pub fn to_settings(&self) -> Settings {
        self.interaction.to_settings()
    }
}
