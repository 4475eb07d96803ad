// ==========================================
// 数据库活动预设导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 缺失字段类型不是错误，收集在 ImportOutcome::missing_types 中
// ==========================================

use crate::i18n::{t, t_with_args};
use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 来源错误 =====
    #[error("预设不存在: {0}")]
    PresetNotFound(String),

    #[error("无法导入: {0}")]
    CannotImport(String),

    #[error("文件读取失败: {0}")]
    FileRead(String),

    // ===== 解析错误 =====
    #[error("预设解析失败: {0}")]
    Parse(String),

    // ===== 映射错误 =====
    #[error("字段映射不是单射: 已有字段 {existing_field_id} 被多个导入字段选中")]
    NotInjectiveMapping { existing_field_id: i64 },

    // ===== 目标错误 =====
    #[error("活动实例不存在: {0}")]
    ModuleNotFound(i64),

    #[error("配置读取失败: {0}")]
    Config(String),

    // ===== 持久化错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileRead(err.to_string())
    }
}

// 实现 From<roxmltree::Error>
impl From<roxmltree::Error> for ImportError {
    fn from(err: roxmltree::Error) -> Self {
        ImportError::Parse(err.to_string())
    }
}

impl ImportError {
    /// 面向最终用户的本地化提示；其余错误沿用 Display
    pub fn user_message(&self) -> String {
        match self {
            ImportError::PresetNotFound(name) => {
                t_with_args("import.invalid_preset", &[("name", name.as_str())])
            }
            ImportError::CannotImport(path) => {
                t_with_args("import.cannot_import", &[("path", path.as_str())])
            }
            ImportError::NotInjectiveMapping { .. } => t("import.not_injective"),
            other => other.to_string(),
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
