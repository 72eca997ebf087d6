//! Integration tests for persisted explorer settings.

mod common;

use std::fs;
use std::time::{Duration, Instant};

use common::fixtures::orion_provider;
use common::{REFRESH_TIMEOUT, TestExplorer};
use schemascope::explorer::{ExplorerController, TabLog};
use schemascope::state::{ConfigManager, ExplorerSettings};
use schemascope::tree::GroupingMode;
use schemascope::widget::TextTreeWidget;

#[test]
fn test_partial_settings_file_uses_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("settings.json"), r#"{ "grouping_mode": "Flat" }"#)
        .expect("write settings");

    let config = ConfigManager::with_config_dir(dir.path()).expect("config");
    let settings = config.load_settings().expect("load settings");
    assert_eq!(settings.grouping_mode, GroupingMode::Flat);
    assert_eq!(settings.filter_debounce(), Duration::from_millis(400));
}

#[test]
fn test_config_dir_is_created() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("a").join("b");

    let config = ConfigManager::with_config_dir(&nested).expect("config");
    assert!(nested.is_dir());
    assert_eq!(config.config_dir(), nested.as_path());
    assert_eq!(config.load_settings().expect("load settings"), ExplorerSettings::default());
}

#[test]
fn test_saved_settings_drive_a_new_explorer() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ConfigManager::with_config_dir(dir.path()).expect("config");
    config
        .save_settings(&ExplorerSettings {
            grouping_mode: GroupingMode::ByHierarchy,
            filter_debounce_ms: 50,
        })
        .expect("save settings");

    let settings = config.load_settings().expect("load settings");
    let mut explorer: TestExplorer =
        ExplorerController::new(TextTreeWidget::new(), TabLog::new(), &settings)
            .expect("explorer");
    assert_eq!(explorer.grouping_mode(), GroupingMode::ByHierarchy);

    explorer.add_server(orion_provider()).expect("add server");
    assert!(explorer.wait_for_refresh(REFRESH_TIMEOUT));
    assert!(explorer.widget().find("System.Entity (1 derived entity)").is_some());

    let start = Instant::now();
    explorer.search_text_changed("Nodes", start);
    assert!(explorer.tick(start + Duration::from_millis(60)));
    assert_eq!(explorer.filter().map(|filter| filter.as_str()), Some("Nodes"));
}
