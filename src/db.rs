// ==========================================
// 数据库活动预设导入 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键/busy_timeout）
// - 提供幂等建表，供命令行入口与测试共用
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化 schema（幂等）
///
/// 表:
/// - config_kv: 导入配置
/// - data / data_fields / data_records / data_content: 活动实例、字段、条目、条目内容
/// - files: 内容存储（站点预设区）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            course INTEGER NOT NULL DEFAULT 0,
            name TEXT NOT NULL DEFAULT '',
            intro TEXT NOT NULL DEFAULT '',
            comments INTEGER NOT NULL DEFAULT 0,
            requiredentries INTEGER NOT NULL DEFAULT 0,
            requiredentriestoview INTEGER NOT NULL DEFAULT 0,
            maxentries INTEGER NOT NULL DEFAULT 0,
            rssarticles INTEGER NOT NULL DEFAULT 0,
            approval INTEGER NOT NULL DEFAULT 0,
            defaultsort INTEGER NOT NULL DEFAULT 0,
            defaultsortdir INTEGER NOT NULL DEFAULT 0,
            singletemplate TEXT,
            listtemplate TEXT,
            listtemplateheader TEXT,
            listtemplatefooter TEXT,
            addtemplate TEXT,
            rsstemplate TEXT,
            rsstitletemplate TEXT,
            csstemplate TEXT,
            jstemplate TEXT,
            asearchtemplate TEXT,
            timemodified INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS data_fields (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dataid INTEGER NOT NULL REFERENCES data(id) ON DELETE CASCADE,
            type TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            required INTEGER NOT NULL DEFAULT 0,
            param1 TEXT, param2 TEXT, param3 TEXT, param4 TEXT, param5 TEXT,
            param6 TEXT, param7 TEXT, param8 TEXT, param9 TEXT, param10 TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_data_fields_dataid ON data_fields(dataid);

        CREATE TABLE IF NOT EXISTS data_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dataid INTEGER NOT NULL REFERENCES data(id) ON DELETE CASCADE,
            userid INTEGER NOT NULL DEFAULT 0,
            timecreated INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS data_content (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            fieldid INTEGER NOT NULL,
            recordid INTEGER NOT NULL REFERENCES data_records(id) ON DELETE CASCADE,
            content TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_data_content_fieldid ON data_content(fieldid);

        CREATE TABLE IF NOT EXISTS files (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            contextid INTEGER NOT NULL,
            component TEXT NOT NULL,
            filearea TEXT NOT NULL,
            itemid INTEGER NOT NULL DEFAULT 0,
            filepath TEXT NOT NULL,
            filename TEXT NOT NULL,
            content BLOB,
            UNIQUE(contextid, component, filearea, itemid, filepath, filename)
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
