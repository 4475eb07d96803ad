// ==========================================
// 内容存储预设导入集成测试
// ==========================================
// 测试目标: 预设只存在于内容存储时，按目录名定位并导入
// ==========================================

mod test_helpers;

use data_preset_importer::config::{config_keys, ConfigManager};
use data_preset_importer::repository::{DataRepository, FileArea};
use data_preset_importer::{logging, ImportRequest, PresetImporter, RecordingNotifier};
use std::sync::Arc;
use tempfile::TempDir;
use test_helpers::{preset_xml, TestEnv};

fn seed_store_preset(env: &TestEnv, area: &FileArea, filepath: &str) {
    let xml = preset_xml(
        &[("intro", "<p>Stored</p>"), ("defaultsort", "Rating")],
        &[("Rating", "number"), ("Photo", "picture")],
    );
    env.store.store_file(area, filepath, "preset.xml", xml.as_bytes()).unwrap();
    env.store
        .store_file(area, filepath, "singletemplate.html", b"<div>[[Photo]]</div>")
        .unwrap();
}

#[test]
fn test_import_from_content_store() {
    logging::init_test();
    let env = TestEnv::new();
    let area = FileArea::default();
    seed_store_preset(&env, &area, "/Gallery/");
    let data_id = env.seed_module("Photos");

    let root = TempDir::new().unwrap();
    let config = ConfigManager::from_connection(env.conn.clone()).unwrap();
    config
        .set_global_config_value(config_keys::SITE_PRESETS_DIR, root.path().to_str().unwrap())
        .unwrap();

    // 站点预设目录中没有 Gallery，回退到内容存储
    let importer = PresetImporter::create_from_request(
        data_id,
        ImportRequest::existing("Gallery"),
        env.repo.clone(),
        env.store.clone(),
        &config,
        Arc::new(RecordingNotifier::new()),
    )
    .unwrap();
    assert_eq!(importer.get_directory(), "Gallery");

    let outcome = importer.import(true).unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.created_fields, 2);

    let module = env.module(data_id);
    assert_eq!(module.intro, "<p>Stored</p>");
    assert_eq!(module.singletemplate.as_deref(), Some("<div>[[Photo]]</div>"));
    assert_eq!(module.listtemplate, None);
    let rating = env.repo.find_field_id_by_name(data_id, "Rating").unwrap();
    assert_eq!(Some(module.defaultsort), rating);

    let fields = env.repo.get_existing_fields(data_id).unwrap();
    let photo = fields.values().find(|f| f.name == "Photo").unwrap();
    assert_eq!(photo.param("param3"), Some("0"));
}

#[test]
fn test_custom_file_area_is_honoured() {
    logging::init_test();
    let env = TestEnv::new();
    let area = FileArea::new(7, "mod_data", "site_presets", 3);
    seed_store_preset(&env, &area, "/Gallery/");
    // 默认区中的同名预设不应被选中
    env.store
        .store_file(&FileArea::default(), "/Gallery/", "preset.xml", b"<broken")
        .unwrap();
    let data_id = env.seed_module("Photos");

    let config = ConfigManager::from_connection(env.conn.clone()).unwrap();
    config.set_global_config_value(config_keys::FILE_AREA_CONTEXT, "7").unwrap();
    config.set_global_config_value(config_keys::FILE_AREA_ITEM, "3").unwrap();

    let importer = PresetImporter::create_from_request(
        data_id,
        ImportRequest::existing("/no/such/dir/Gallery"),
        env.repo.clone(),
        env.store.clone(),
        &config,
        Arc::new(RecordingNotifier::new()),
    )
    .unwrap();

    let outcome = importer.import(false).unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.created_fields, 2);
}
