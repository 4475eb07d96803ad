// ==========================================
// 数据库活动预设导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use crate::repository::FileArea;
use rusqlite::{params, Connection};
use std::error::Error;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    pub const TEMP_DIR: &str = "preset.temp_dir";
    pub const SITE_PRESETS_DIR: &str = "preset.site_presets_dir";
    pub const FILE_AREA_CONTEXT: &str = "preset.file_area.contextid";
    pub const FILE_AREA_COMPONENT: &str = "preset.file_area.component";
    pub const FILE_AREA_NAME: &str = "preset.file_area.filearea";
    pub const FILE_AREA_ITEM: &str = "preset.file_area.itemid";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 的配置值（Upsert）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }
}

impl ImportConfigReader for ConfigManager {
    fn get_temp_dir(&self) -> Result<PathBuf, Box<dyn Error>> {
        match self.get_config_value(config_keys::TEMP_DIR)? {
            Some(value) => Ok(PathBuf::from(value)),
            None => Ok(dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(crate::APP_NAME)),
        }
    }

    fn get_site_presets_dir(&self) -> Result<PathBuf, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::SITE_PRESETS_DIR, "presets")?;
        Ok(PathBuf::from(value))
    }

    fn get_preset_file_area(&self) -> Result<FileArea, Box<dyn Error>> {
        let default = FileArea::default();

        let contextid = self
            .get_config_or_default(config_keys::FILE_AREA_CONTEXT, &default.contextid.to_string())?
            .parse::<i64>()
            .map_err(|e| format!("配置 {} 格式错误: {}", config_keys::FILE_AREA_CONTEXT, e))?;
        let itemid = self
            .get_config_or_default(config_keys::FILE_AREA_ITEM, &default.itemid.to_string())?
            .parse::<i64>()
            .map_err(|e| format!("配置 {} 格式错误: {}", config_keys::FILE_AREA_ITEM, e))?;
        let component = self.get_config_or_default(config_keys::FILE_AREA_COMPONENT, &default.component)?;
        let filearea = self.get_config_or_default(config_keys::FILE_AREA_NAME, &default.filearea)?;

        Ok(FileArea::new(contextid, &component, &filearea, itemid))
    }
}
