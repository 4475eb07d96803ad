// ==========================================
// 数据库活动预设导入 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 预设导入管道（解析 → 映射校验 → 字段对账 → 设置覆写 → 落库）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 预设导入管道
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{DataField, DataModule, FieldDescriptor, FieldMapping, ParsedPreset, PresetSettings};

// 导入管道
pub use importer::{
    FieldTypeRegistry, ImportError, ImportNotification, ImportNotifier, ImportOutcome,
    ImportRequest, ImportResult, PresetImporter, PresetImporterKind, RecordingNotifier,
    TracingNotifier,
};

// 配置
pub use config::{ConfigManager, ImportConfigReader};

// 仓储
pub use repository::{
    ContentStore, DataRepository, RepositoryError, RepositoryResult, SqliteContentStore,
    SqliteDataRepository,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "data-preset-importer";
