// ==========================================
// 数据库活动预设导入 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod content_store_repo;
pub mod data_repo;
pub mod error;

// 重导出核心仓储
pub use content_store_repo::{ContentStore, FileArea, SqliteContentStore, StoredFile};
pub use data_repo::{DataRepository, SqliteDataRepository};
pub use error::{RepositoryError, RepositoryResult};
