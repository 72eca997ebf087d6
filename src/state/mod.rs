// Explorer state: persisted settings, status and events

pub mod config;
pub mod debounce;
pub mod events;
pub mod settings;
pub mod status;

pub use config::ConfigManager;
pub use debounce::FilterDebouncer;
pub use events::ExplorerEvent;
pub use settings::ExplorerSettings;
pub use status::{StatusLevel, StatusMessage};
