// ==========================================
// 数据库活动预设导入 - 领域模型层
// ==========================================
// 职责: 定义预设、字段、活动实例等领域实体
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod field;
pub mod module;
pub mod preset;

// 重导出核心类型
pub use field::{DataField, FIELD_PARAM_KEYS, SIMILAR_FIELD_MARKER};
pub use module::DataModule;
pub use preset::{
    FieldDescriptor, FieldMapping, ParsedPreset, PresetSettings, ALLOWED_SETTINGS, NEW_FIELD,
    TEMPLATE_FILES, TEMPLATE_OVERWRITE_KEYS,
};
