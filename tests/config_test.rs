// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 默认值与 config_kv 覆写
// ==========================================

mod test_helpers;

use data_preset_importer::config::{config_keys, ConfigManager, ImportConfigReader};
use data_preset_importer::repository::FileArea;
use std::path::PathBuf;
use test_helpers::create_test_db;

#[test]
fn test_defaults_without_config_rows() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    assert!(config.get_temp_dir().unwrap().ends_with("data-preset-importer"));
    assert_eq!(config.get_site_presets_dir().unwrap(), PathBuf::from("presets"));
    assert_eq!(config.get_preset_file_area().unwrap(), FileArea::default());
}

#[test]
fn test_overrides_are_read_back() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    config.set_global_config_value(config_keys::TEMP_DIR, "/var/tmp/presets").unwrap();
    config.set_global_config_value(config_keys::FILE_AREA_NAME, "shared").unwrap();
    // 覆写同一键
    config.set_global_config_value(config_keys::TEMP_DIR, "/srv/tmp").unwrap();

    assert_eq!(config.get_temp_dir().unwrap(), PathBuf::from("/srv/tmp"));
    let area = config.get_preset_file_area().unwrap();
    assert_eq!(area.filearea, "shared");
    assert_eq!(area.component, "mod_data");
}

#[test]
fn test_malformed_numeric_area_is_an_error() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    config.set_global_config_value(config_keys::FILE_AREA_CONTEXT, "abc").unwrap();
    assert!(config.get_preset_file_area().is_err());
}
