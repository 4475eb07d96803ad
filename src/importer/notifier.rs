// ==========================================
// 数据库活动预设导入 - 导入通知
// ==========================================
// 职责: 将导入过程中的提示（删除字段/缺失类型/导入成功）交给调用方呈现
// 实现: TracingNotifier（写日志）/ RecordingNotifier（收集，供调用方批量展示）
// ==========================================

use crate::i18n::t_with_args;
use std::sync::Mutex;
use tracing::{info, warn};

// ==========================================
// ImportNotification - 通知类型
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportNotification {
    /// 未被映射的已有字段已删除
    FieldDeleted { name: String },
    /// 字段类型未注册，字段被跳过
    MissingFieldTypes { names: Vec<String> },
    /// 导入完成；活动尚无条目时提示添加条目
    Success { data_id: i64, suggest_add_entries: bool },
}

impl ImportNotification {
    /// 本地化消息文本
    pub fn message(&self) -> String {
        match self {
            ImportNotification::FieldDeleted { name } => {
                t_with_args("import.deleting_field", &[("name", name.as_str())])
            }
            ImportNotification::MissingFieldTypes { names } => {
                t_with_args("import.missing_field_types", &[("names", names.join(", ").as_str())])
            }
            ImportNotification::Success {
                data_id,
                suggest_add_entries: true,
            } => t_with_args("import.add_entries", &[("id", data_id.to_string().as_str())]),
            ImportNotification::Success { .. } => t_with_args("import.success", &[]),
        }
    }
}

// ==========================================
// ImportNotifier Trait
// ==========================================
pub trait ImportNotifier: Send + Sync {
    fn notify(&self, notification: ImportNotification);
}

/// 以日志形式输出通知
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl ImportNotifier for TracingNotifier {
    fn notify(&self, notification: ImportNotification) {
        let message = notification.message();
        match notification {
            ImportNotification::MissingFieldTypes { .. } => warn!(%message, "导入通知"),
            _ => info!(%message, "导入通知"),
        }
    }
}

/// 收集通知，导入结束后由调用方统一展示
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<ImportNotification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已收集的通知（按发生顺序）
    pub fn notifications(&self) -> Vec<ImportNotification> {
        match self.notifications.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ImportNotifier for RecordingNotifier {
    fn notify(&self, notification: ImportNotification) {
        match self.notifications.lock() {
            Ok(mut guard) => guard.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{set_locale, tests::LOCALE_TEST_LOCK};

    #[test]
    fn test_messages() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");

        let deleted = ImportNotification::FieldDeleted {
            name: "Author".to_string(),
        };
        assert_eq!(deleted.message(), "Deleting field Author");

        let missing = ImportNotification::MissingFieldTypes {
            names: vec!["Title".to_string(), "Cover".to_string()],
        };
        assert!(missing.message().ends_with("Title, Cover"));

        let success = ImportNotification::Success {
            data_id: 4,
            suggest_add_entries: false,
        };
        assert_eq!(success.message(), "Preset applied successfully");

        let add_entries = ImportNotification::Success {
            data_id: 4,
            suggest_add_entries: true,
        };
        assert!(add_entries.message().contains("(id 4)"));
    }

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify(ImportNotification::FieldDeleted {
            name: "A".to_string(),
        });
        notifier.notify(ImportNotification::FieldDeleted {
            name: "B".to_string(),
        });

        let names: Vec<String> = notifier
            .notifications()
            .into_iter()
            .map(|n| match n {
                ImportNotification::FieldDeleted { name } => name,
                other => panic!("unexpected notification: {:?}", other),
            })
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
