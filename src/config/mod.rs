//! Configuration
//!
//! Two layers: the asset pack (`config.json` next to the frame files) that
//! describes states and events, and the runtime settings (`settings.toml`)
//! for timing and collaborators.

mod assets;
mod settings;

pub use assets::{EventAction, EventConfig, PetConfig, StateConfig, CONFIG_FILE_NAME};
pub use settings::{load_settings, QuerySettings, Settings, SpeechSettings};
