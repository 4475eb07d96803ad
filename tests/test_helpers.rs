// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库初始化、活动/字段/条目种子数据、预设目录生成
// ==========================================
#![allow(dead_code)]

use data_preset_importer::config::ImportConfigReader;
use data_preset_importer::db::{init_schema, open_sqlite_connection};
use data_preset_importer::repository::FileArea;
use data_preset_importer::{
    DataField, DataModule, DataRepository, FieldDescriptor, SqliteContentStore,
    SqliteDataRepository,
};
use rusqlite::{params, Connection};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::{NamedTempFile, TempDir};

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 测试环境：共享连接上的持久层与内容存储
pub struct TestEnv {
    pub _temp_file: NamedTempFile,
    pub db_path: String,
    pub conn: Arc<Mutex<Connection>>,
    pub repo: Arc<SqliteDataRepository>,
    pub store: Arc<SqliteContentStore>,
}

impl TestEnv {
    pub fn new() -> Self {
        let (temp_file, db_path) = create_test_db().expect("Failed to create test db");
        let conn = Arc::new(Mutex::new(
            open_sqlite_connection(&db_path).expect("Failed to open db"),
        ));
        Self {
            _temp_file: temp_file,
            db_path,
            repo: Arc::new(SqliteDataRepository::from_connection(conn.clone())),
            store: Arc::new(SqliteContentStore::from_connection(conn.clone())),
            conn,
        }
    }

    /// 新建活动实例
    pub fn seed_module(&self, name: &str) -> i64 {
        let mut module = DataModule::new(0, 1, name);
        module.maxentries = 10;
        module.listtemplate = Some("<old-list/>".to_string());
        self.repo.insert_module(&module).expect("Failed to insert module")
    }

    /// 新建字段
    pub fn seed_field(&self, data_id: i64, name: &str, field_type: &str) -> i64 {
        let descriptor = FieldDescriptor::new(0, data_id, name, field_type);
        self.repo
            .insert_field(&DataField::from_descriptor(&descriptor))
            .expect("Failed to insert field")
    }

    /// 新建一条条目并写入某字段的内容
    pub fn seed_entry(&self, data_id: i64, field_id: i64, content: &str) -> i64 {
        let conn = self.conn.lock().unwrap();
        conn.execute("INSERT INTO data_records (dataid) VALUES (?1)", params![data_id])
            .unwrap();
        let record_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO data_content (fieldid, recordid, content) VALUES (?1, ?2, ?3)",
            params![field_id, record_id, content],
        )
        .unwrap();
        record_id
    }

    /// 某字段的条目内容数
    pub fn content_count(&self, field_id: i64) -> i64 {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT COUNT(*) FROM data_content WHERE fieldid = ?1",
            params![field_id],
            |row| row.get(0),
        )
        .unwrap()
    }

    pub fn module(&self, data_id: i64) -> DataModule {
        self.repo.get_module(data_id).unwrap()
    }
}

/// 生成 preset.xml
///
/// # 参数
/// - settings: (键, 值)
/// - fields: (名称, 类型)
pub fn preset_xml(settings: &[(&str, &str)], fields: &[(&str, &str)]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<preset>\n  <settings>\n");
    for (key, value) in settings {
        xml.push_str(&format!("    <{key}><![CDATA[{value}]]></{key}>\n"));
    }
    xml.push_str("  </settings>\n");
    for (name, field_type) in fields {
        xml.push_str(&format!(
            "  <field>\n    <name>{name}</name>\n    <type>{field_type}</type>\n    <required>0</required>\n  </field>\n"
        ));
    }
    xml.push_str("</preset>\n");
    xml
}

/// 在 root 下写出预设目录
pub fn write_preset_dir(root: &Path, name: &str, xml: &str, templates: &[(&str, &str)]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("preset.xml"), xml).unwrap();
    for (file, content) in templates {
        fs::write(dir.join(file), content).unwrap();
    }
    dir
}

/// 固定目录的导入配置
pub struct MockConfig {
    pub temp_dir: PathBuf,
    pub site_presets_dir: PathBuf,
    pub area: FileArea,
}

impl MockConfig {
    pub fn new(root: &TempDir) -> Self {
        Self {
            temp_dir: root.path().join("temp"),
            site_presets_dir: root.path().join("presets"),
            area: FileArea::default(),
        }
    }

    /// 上传预设的落地目录 `<temp_dir>/forms`
    pub fn forms_dir(&self) -> PathBuf {
        self.temp_dir.join("forms")
    }
}

impl ImportConfigReader for MockConfig {
    fn get_temp_dir(&self) -> Result<PathBuf, Box<dyn Error>> {
        Ok(self.temp_dir.clone())
    }

    fn get_site_presets_dir(&self) -> Result<PathBuf, Box<dyn Error>> {
        Ok(self.site_presets_dir.clone())
    }

    fn get_preset_file_area(&self) -> Result<FileArea, Box<dyn Error>> {
        Ok(self.area.clone())
    }
}
