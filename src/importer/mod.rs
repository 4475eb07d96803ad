// ==========================================
// 数据库活动预设导入 - 导入层
// ==========================================
// 职责: 将预设包（preset.xml + 模板文件）应用到活动实例
// 来源: 常规目录 / 内容存储
// ==========================================

// 模块声明
pub mod error;
pub mod field_reconciler;
pub mod field_types;
pub mod notifier;
pub mod preset_importer;
pub mod preset_parser;
pub mod preset_source;
pub mod settings_merger;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_reconciler::{validate_mapping, FieldReconciler, ReconcileReport};
pub use field_types::{FieldType, FieldTypeRegistry, StandardFieldType};
pub use notifier::{ImportNotification, ImportNotifier, RecordingNotifier, TracingNotifier};
pub use preset_importer::{ImportOutcome, ImportRequest, PresetImporter, PresetImporterKind};
pub use preset_parser::{parse_preset, parse_preset_document};
pub use preset_source::{
    is_directory_a_preset, resolve_preset_source, ContentStoreSource, DirectorySource,
    PresetSource, PRESET_XML,
};
pub use settings_merger::SettingsMerger;
