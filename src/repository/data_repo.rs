// ==========================================
// 数据库活动预设导入 - 活动数据仓储
// ==========================================
// 职责: data / data_fields / data_content / data_records 的数据访问
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::{DataField, DataModule, FIELD_PARAM_KEYS};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// DataRepository Trait
// ==========================================
// 用途: 导入管道消费的持久化层接口
// 实现者: SqliteDataRepository
pub trait DataRepository: Send + Sync {
    /// 读取活动实例（不存在时返回 NotFound）
    fn get_module(&self, data_id: i64) -> RepositoryResult<DataModule>;

    /// 覆写活动实例全部列
    fn update_module(&self, module: &DataModule) -> RepositoryResult<()>;

    /// 读取活动的已有字段（按 id 升序）
    fn get_existing_fields(&self, data_id: i64) -> RepositoryResult<BTreeMap<i64, DataField>>;

    /// 插入字段，返回新 id
    fn insert_field(&self, field: &DataField) -> RepositoryResult<i64>;

    /// 按 id 覆写字段
    fn update_field(&self, field: &DataField) -> RepositoryResult<()>;

    fn delete_field(&self, field_id: i64) -> RepositoryResult<()>;

    /// 删除字段下全部条目内容，返回删除行数
    fn delete_content_by_field(&self, field_id: i64) -> RepositoryResult<usize>;

    fn find_field_id_by_name(&self, data_id: i64, name: &str) -> RepositoryResult<Option<i64>>;

    /// 活动已有条目数
    fn count_entries(&self, data_id: i64) -> RepositoryResult<i64>;
}

// ==========================================
// SqliteDataRepository
// ==========================================
pub struct SqliteDataRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDataRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建活动实例，返回 id（供命令行与测试准备数据）
    pub fn insert_module(&self, module: &DataModule) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO data (course, name, intro) VALUES (?1, ?2, ?3)",
            params![module.course, module.name, module.intro],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        let mut stored = module.clone();
        stored.id = id;
        self.update_module(&stored)?;
        Ok(id)
    }

    fn map_module(row: &Row<'_>) -> rusqlite::Result<DataModule> {
        Ok(DataModule {
            id: row.get("id")?,
            course: row.get("course")?,
            name: row.get("name")?,
            intro: row.get("intro")?,
            comments: row.get("comments")?,
            requiredentries: row.get("requiredentries")?,
            requiredentriestoview: row.get("requiredentriestoview")?,
            maxentries: row.get("maxentries")?,
            rssarticles: row.get("rssarticles")?,
            approval: row.get("approval")?,
            defaultsort: row.get("defaultsort")?,
            defaultsortdir: row.get("defaultsortdir")?,
            singletemplate: row.get("singletemplate")?,
            listtemplate: row.get("listtemplate")?,
            listtemplateheader: row.get("listtemplateheader")?,
            listtemplatefooter: row.get("listtemplatefooter")?,
            addtemplate: row.get("addtemplate")?,
            rsstemplate: row.get("rsstemplate")?,
            rsstitletemplate: row.get("rsstitletemplate")?,
            csstemplate: row.get("csstemplate")?,
            jstemplate: row.get("jstemplate")?,
            asearchtemplate: row.get("asearchtemplate")?,
            timemodified: row.get("timemodified")?,
        })
    }

    fn map_field(row: &Row<'_>) -> rusqlite::Result<DataField> {
        let mut params = BTreeMap::new();
        for key in FIELD_PARAM_KEYS {
            if let Some(value) = row.get::<_, Option<String>>(key)? {
                params.insert(key.to_string(), value);
            }
        }
        Ok(DataField {
            id: row.get("id")?,
            dataid: row.get("dataid")?,
            field_type: row.get("type")?,
            name: row.get("name")?,
            description: row.get("description")?,
            required: row.get::<_, i64>("required")? != 0,
            params,
        })
    }

    /// param1..param10 列值（未设置为 NULL）
    fn param_columns(field: &DataField) -> Vec<Option<String>> {
        FIELD_PARAM_KEYS
            .iter()
            .map(|key| field.param(key).map(str::to_string))
            .collect()
    }
}

impl DataRepository for SqliteDataRepository {
    fn get_module(&self, data_id: i64) -> RepositoryResult<DataModule> {
        let conn = self.get_conn()?;
        conn.query_row("SELECT * FROM data WHERE id = ?1", params![data_id], Self::map_module)
            .optional()?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "data".to_string(),
                id: data_id.to_string(),
            })
    }

    fn update_module(&self, module: &DataModule) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE data SET
                course = ?1, name = ?2, intro = ?3, comments = ?4,
                requiredentries = ?5, requiredentriestoview = ?6, maxentries = ?7,
                rssarticles = ?8, approval = ?9, defaultsort = ?10, defaultsortdir = ?11,
                singletemplate = ?12, listtemplate = ?13, listtemplateheader = ?14,
                listtemplatefooter = ?15, addtemplate = ?16, rsstemplate = ?17,
                rsstitletemplate = ?18, csstemplate = ?19, jstemplate = ?20,
                asearchtemplate = ?21, timemodified = ?22
            WHERE id = ?23
            "#,
            params![
                module.course,
                module.name,
                module.intro,
                module.comments,
                module.requiredentries,
                module.requiredentriestoview,
                module.maxentries,
                module.rssarticles,
                module.approval,
                module.defaultsort,
                module.defaultsortdir,
                module.singletemplate,
                module.listtemplate,
                module.listtemplateheader,
                module.listtemplatefooter,
                module.addtemplate,
                module.rsstemplate,
                module.rsstitletemplate,
                module.csstemplate,
                module.jstemplate,
                module.asearchtemplate,
                module.timemodified,
                module.id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "data".to_string(),
                id: module.id.to_string(),
            });
        }
        Ok(())
    }

    fn get_existing_fields(&self, data_id: i64) -> RepositoryResult<BTreeMap<i64, DataField>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT * FROM data_fields WHERE dataid = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![data_id], Self::map_field)?;

        let mut fields = BTreeMap::new();
        for row in rows {
            let field = row?;
            fields.insert(field.id, field);
        }
        Ok(fields)
    }

    fn insert_field(&self, field: &DataField) -> RepositoryResult<i64> {
        let p = Self::param_columns(field);
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO data_fields (
                dataid, type, name, description, required,
                param1, param2, param3, param4, param5,
                param6, param7, param8, param9, param10
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                field.dataid,
                field.field_type,
                field.name,
                field.description,
                field.required as i64,
                p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7], p[8], p[9],
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update_field(&self, field: &DataField) -> RepositoryResult<()> {
        let p = Self::param_columns(field);
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE data_fields SET
                dataid = ?1, type = ?2, name = ?3, description = ?4, required = ?5,
                param1 = ?6, param2 = ?7, param3 = ?8, param4 = ?9, param5 = ?10,
                param6 = ?11, param7 = ?12, param8 = ?13, param9 = ?14, param10 = ?15
            WHERE id = ?16
            "#,
            params![
                field.dataid,
                field.field_type,
                field.name,
                field.description,
                field.required as i64,
                p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7], p[8], p[9],
                field.id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "data_fields".to_string(),
                id: field.id.to_string(),
            });
        }
        Ok(())
    }

    fn delete_field(&self, field_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM data_fields WHERE id = ?1", params![field_id])?;
        Ok(())
    }

    fn delete_content_by_field(&self, field_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let deleted = conn.execute("DELETE FROM data_content WHERE fieldid = ?1", params![field_id])?;
        Ok(deleted)
    }

    fn find_field_id_by_name(&self, data_id: i64, name: &str) -> RepositoryResult<Option<i64>> {
        let conn = self.get_conn()?;
        let id = conn
            .query_row(
                "SELECT id FROM data_fields WHERE dataid = ?1 AND name = ?2 ORDER BY id LIMIT 1",
                params![data_id, name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn count_entries(&self, data_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM data_records WHERE dataid = ?1",
            params![data_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};

    fn setup() -> SqliteDataRepository {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        SqliteDataRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn text_field(dataid: i64, name: &str) -> DataField {
        DataField {
            id: 0,
            dataid,
            field_type: "text".to_string(),
            name: name.to_string(),
            description: String::new(),
            required: false,
            params: BTreeMap::from([("param1".to_string(), "0".to_string())]),
        }
    }

    #[test]
    fn test_module_roundtrip() {
        let repo = setup();
        let mut module = DataModule::new(0, 4, "Recipes");
        module.listtemplate = Some("<p>[[Title]]</p>".to_string());
        let id = repo.insert_module(&module).unwrap();

        let stored = repo.get_module(id).unwrap();
        assert_eq!(stored.name, "Recipes");
        assert_eq!(stored.course, 4);
        assert_eq!(stored.listtemplate.as_deref(), Some("<p>[[Title]]</p>"));
    }

    #[test]
    fn test_get_missing_module_is_not_found() {
        let repo = setup();
        assert!(matches!(
            repo.get_module(42),
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_field_crud() {
        let repo = setup();
        let data_id = repo.insert_module(&DataModule::new(0, 1, "Books")).unwrap();

        let id = repo.insert_field(&text_field(data_id, "Title")).unwrap();
        assert_eq!(repo.find_field_id_by_name(data_id, "Title").unwrap(), Some(id));
        assert_eq!(repo.find_field_id_by_name(data_id, "Author").unwrap(), None);

        let mut fields = repo.get_existing_fields(data_id).unwrap();
        let mut field = fields.remove(&id).unwrap();
        assert_eq!(field.param("param1"), Some("0"));

        field.name = "Heading".to_string();
        field.required = true;
        repo.update_field(&field).unwrap();
        let reloaded = repo.get_existing_fields(data_id).unwrap();
        assert_eq!(reloaded[&id].name, "Heading");
        assert!(reloaded[&id].required);

        repo.delete_field(id).unwrap();
        assert!(repo.get_existing_fields(data_id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_content_and_count_entries() {
        let repo = setup();
        let data_id = repo.insert_module(&DataModule::new(0, 1, "Books")).unwrap();
        let field_id = repo.insert_field(&text_field(data_id, "Title")).unwrap();

        {
            let conn = repo.get_conn().unwrap();
            conn.execute("INSERT INTO data_records (dataid) VALUES (?1)", params![data_id])
                .unwrap();
            let record_id = conn.last_insert_rowid();
            conn.execute(
                "INSERT INTO data_content (fieldid, recordid, content) VALUES (?1, ?2, 'x')",
                params![field_id, record_id],
            )
            .unwrap();
        }

        assert_eq!(repo.count_entries(data_id).unwrap(), 1);
        assert_eq!(repo.delete_content_by_field(field_id).unwrap(), 1);
        assert_eq!(repo.delete_content_by_field(field_id).unwrap(), 0);
    }
}
