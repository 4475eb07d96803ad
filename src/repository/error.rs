// ==========================================
// 数据库活动预设导入 - 仓储层错误类型
// ==========================================
// 来源: rusqlite 错误 / 连接锁中毒 / 目标行不存在
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 按 id 读取或更新时目标行不存在（data / data_fields）
    #[error("{entity} 中不存在 id={id} 的记录")]
    NotFound { entity: String, id: String },

    /// 共享连接的互斥锁已中毒
    #[error("数据库连接锁获取失败: {0}")]
    LockError(String),

    #[error("SQL 执行失败: {0}")]
    DatabaseQueryError(String),

    /// 如 files 表 (区, 路径, 文件名) 重复
    #[error("唯一约束冲突: {0}")]
    UniqueConstraintViolation(String),

    /// 如字段指向不存在的活动
    #[error("外键约束冲突: {0}")]
    ForeignKeyViolation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(failure, msg) => {
                let msg = msg.unwrap_or_else(|| failure.to_string());
                match failure.extended_code {
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        RepositoryError::UniqueConstraintViolation(msg)
                    }
                    rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                        RepositoryError::ForeignKeyViolation(msg)
                    }
                    _ => RepositoryError::DatabaseQueryError(msg),
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "query".to_string(),
                id: "-".to_string(),
            },
            other => RepositoryError::DatabaseQueryError(other.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
