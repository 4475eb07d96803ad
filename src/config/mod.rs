// ==========================================
// 数据库活动预设导入 - 配置层
// ==========================================
// 职责: 导入配置管理（临时上传目录、站点预设目录、内容存储预设区）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::ImportConfigReader;
