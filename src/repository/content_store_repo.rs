// ==========================================
// 数据库活动预设导入 - 内容存储仓储
// ==========================================
// 职责: 按 (context, component, area, item, filepath, filename) 寻址的文件存储
// 约定: 目录以 filename = "." 的条目表示，filepath 以 "/" 开头和结尾
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

/// 目录条目的文件名
pub const DIRECTORY_FILENAME: &str = ".";

// ==========================================
// FileArea - 文件区键
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArea {
    pub contextid: i64,
    pub component: String,
    pub filearea: String,
    pub itemid: i64,
}

impl FileArea {
    pub fn new(contextid: i64, component: &str, filearea: &str, itemid: i64) -> Self {
        Self {
            contextid,
            component: component.to_string(),
            filearea: filearea.to_string(),
            itemid,
        }
    }
}

impl Default for FileArea {
    /// 站点级预设区
    fn default() -> Self {
        Self::new(1, "mod_data", "site_presets", 0)
    }
}

// ==========================================
// StoredFile - 文件条目（不含内容）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: i64,
    pub filepath: String,
    pub filename: String,
}

impl StoredFile {
    pub fn is_directory(&self) -> bool {
        self.filename == DIRECTORY_FILENAME
    }
}

// ==========================================
// ContentStore Trait
// ==========================================
// 实现者: SqliteContentStore
pub trait ContentStore: Send + Sync {
    /// 列出文件区全部条目（含目录条目）
    fn get_area_files(&self, area: &FileArea) -> RepositoryResult<Vec<StoredFile>>;

    fn file_exists(&self, area: &FileArea, filepath: &str, filename: &str) -> RepositoryResult<bool>;

    /// 读取文件内容（不存在返回 None）
    fn get_file_content(
        &self,
        area: &FileArea,
        filepath: &str,
        filename: &str,
    ) -> RepositoryResult<Option<Vec<u8>>>;
}

// ==========================================
// SqliteContentStore
// ==========================================
pub struct SqliteContentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteContentStore {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入文件（同键覆盖），并补齐所在目录的目录条目
    pub fn store_file(
        &self,
        area: &FileArea,
        filepath: &str,
        filename: &str,
        content: &[u8],
    ) -> RepositoryResult<()> {
        self.create_directory(area, filepath)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO files (contextid, component, filearea, itemid, filepath, filename, content)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(contextid, component, filearea, itemid, filepath, filename)
            DO UPDATE SET content = excluded.content
            "#,
            params![
                area.contextid,
                area.component,
                area.filearea,
                area.itemid,
                filepath,
                filename,
                content
            ],
        )?;
        Ok(())
    }

    /// 创建目录条目（幂等）
    pub fn create_directory(&self, area: &FileArea, filepath: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR IGNORE INTO files (contextid, component, filearea, itemid, filepath, filename)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                area.contextid,
                area.component,
                area.filearea,
                area.itemid,
                filepath,
                DIRECTORY_FILENAME
            ],
        )?;
        Ok(())
    }
}

impl ContentStore for SqliteContentStore {
    fn get_area_files(&self, area: &FileArea) -> RepositoryResult<Vec<StoredFile>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, filepath, filename FROM files
            WHERE contextid = ?1 AND component = ?2 AND filearea = ?3 AND itemid = ?4
            ORDER BY filepath, filename
            "#,
        )?;
        let rows = stmt.query_map(
            params![area.contextid, area.component, area.filearea, area.itemid],
            |row| {
                Ok(StoredFile {
                    id: row.get(0)?,
                    filepath: row.get(1)?,
                    filename: row.get(2)?,
                })
            },
        )?;

        let mut files = Vec::new();
        for row in rows {
            files.push(row?);
        }
        Ok(files)
    }

    fn file_exists(&self, area: &FileArea, filepath: &str, filename: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let exists = conn
            .query_row(
                r#"
                SELECT 1 FROM files
                WHERE contextid = ?1 AND component = ?2 AND filearea = ?3 AND itemid = ?4
                  AND filepath = ?5 AND filename = ?6
                "#,
                params![
                    area.contextid,
                    area.component,
                    area.filearea,
                    area.itemid,
                    filepath,
                    filename
                ],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }

    fn get_file_content(
        &self,
        area: &FileArea,
        filepath: &str,
        filename: &str,
    ) -> RepositoryResult<Option<Vec<u8>>> {
        let conn = self.get_conn()?;
        let content: Option<Option<Vec<u8>>> = conn
            .query_row(
                r#"
                SELECT content FROM files
                WHERE contextid = ?1 AND component = ?2 AND filearea = ?3 AND itemid = ?4
                  AND filepath = ?5 AND filename = ?6
                "#,
                params![
                    area.contextid,
                    area.component,
                    area.filearea,
                    area.itemid,
                    filepath,
                    filename
                ],
                |row| row.get(0),
            )
            .optional()?;
        Ok(content.flatten())
    }
}
