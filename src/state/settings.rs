//! Explorer settings with persistence.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::tree::GroupingMode;

/// Explorer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerSettings {
    #[serde(default)]
    pub grouping_mode: GroupingMode,
    /// Inactivity before typed filter text is applied
    #[serde(default = "default_filter_debounce_ms")]
    pub filter_debounce_ms: u64,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            grouping_mode: GroupingMode::default(),
            filter_debounce_ms: default_filter_debounce_ms(),
        }
    }
}

impl ExplorerSettings {
    pub fn filter_debounce(&self) -> Duration {
        Duration::from_millis(self.filter_debounce_ms)
    }
}

fn default_filter_debounce_ms() -> u64 {
    400
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ExplorerSettings::default();
        assert_eq!(settings.grouping_mode, GroupingMode::ByNamespace);
        assert_eq!(settings.filter_debounce(), Duration::from_millis(400));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: ExplorerSettings =
            serde_json::from_str(r#"{ "grouping_mode": "Flat" }"#).expect("valid settings");
        assert_eq!(settings.grouping_mode, GroupingMode::Flat);
        assert_eq!(settings.filter_debounce_ms, 400);
    }
}
