// ==========================================
// 数据库活动预设导入 - 字段对账
// ==========================================
// 流程:
// 1. 校验: 映射必须是单射（先于任何写入）
// 2. 应用: 已映射字段原地更新；其余按类型新建，类型未注册则跳过并记录
// 3. 清理: 未被映射的已有字段连同其条目内容一并删除（不可恢复）
// ==========================================

use crate::domain::{DataField, FieldDescriptor, FieldMapping};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_types::FieldTypeRegistry;
use crate::importer::notifier::{ImportNotification, ImportNotifier};
use crate::repository::DataRepository;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// 对账结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// 类型未注册而跳过的字段名（按导入顺序）
    pub missing_types: Vec<String>,
    pub created: Vec<i64>,
    pub updated: Vec<i64>,
    pub deleted: Vec<i64>,
}

/// 校验映射单射性
///
/// # 返回
/// - Ok(preserved): 被映射选中的已有字段 id 集合
/// - Err(NotInjectiveMapping): 某个已有字段被多个导入字段选中
pub fn validate_mapping(
    imported: &[FieldDescriptor],
    mapping: &FieldMapping,
) -> ImportResult<BTreeSet<i64>> {
    let mut preserved = BTreeSet::new();
    for descriptor in imported {
        let Some(existing_id) = mapping.target(descriptor.temporary_id) else {
            continue;
        };
        if !preserved.insert(existing_id) {
            return Err(ImportError::NotInjectiveMapping {
                existing_field_id: existing_id,
            });
        }
    }
    Ok(preserved)
}

// ==========================================
// FieldReconciler
// ==========================================
pub struct FieldReconciler<'a> {
    repo: &'a dyn DataRepository,
    registry: &'a FieldTypeRegistry,
    notifier: &'a dyn ImportNotifier,
}

impl<'a> FieldReconciler<'a> {
    pub fn new(
        repo: &'a dyn DataRepository,
        registry: &'a FieldTypeRegistry,
        notifier: &'a dyn ImportNotifier,
    ) -> Self {
        Self {
            repo,
            registry,
            notifier,
        }
    }

    /// 按映射对账导入字段与已有字段
    ///
    /// # 参数
    /// - imported: 待导入字段（按预设顺序）
    /// - mapping: temporary_id → 已有字段 id
    /// - existing: 活动的已有字段
    pub fn reconcile(
        &self,
        imported: &[FieldDescriptor],
        mapping: &FieldMapping,
        existing: &BTreeMap<i64, DataField>,
    ) -> ImportResult<ReconcileReport> {
        let preserved = validate_mapping(imported, mapping)?;
        let mut report = ReconcileReport::default();

        for descriptor in imported {
            let mapped = mapping
                .target(descriptor.temporary_id)
                .and_then(|existing_id| existing.get(&existing_id));

            match mapped {
                Some(current) => {
                    let mut field = current.clone();
                    field.apply_descriptor(descriptor);
                    match self.registry.resolve(&field.field_type) {
                        Some(handler) => handler.update_field(&field, self.repo)?,
                        None => self.repo.update_field(&field)?,
                    }
                    debug!(field_id = field.id, name = %field.name, "已映射字段已更新");
                    report.updated.push(field.id);
                }
                None => {
                    let Some(handler) = self.registry.resolve(&descriptor.field_type) else {
                        warn!(
                            name = %descriptor.name,
                            field_type = %descriptor.field_type,
                            "字段类型未注册，跳过"
                        );
                        report.missing_types.push(descriptor.name.clone());
                        continue;
                    };
                    let field = handler.insert_field(DataField::from_descriptor(descriptor), self.repo)?;
                    debug!(field_id = field.id, name = %field.name, "新字段已创建");
                    report.created.push(field.id);
                }
            }
        }

        if !report.missing_types.is_empty() {
            self.notifier.notify(ImportNotification::MissingFieldTypes {
                names: report.missing_types.clone(),
            });
        }

        for (field_id, field) in existing {
            if preserved.contains(field_id) {
                continue;
            }
            self.repo.delete_content_by_field(*field_id)?;
            self.repo.delete_field(*field_id)?;
            info!(field_id = *field_id, name = %field.name, "未映射字段已删除");
            self.notifier.notify(ImportNotification::FieldDeleted {
                name: field.name.clone(),
            });
            report.deleted.push(*field_id);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};
    use crate::domain::DataModule;
    use crate::importer::notifier::RecordingNotifier;
    use crate::repository::SqliteDataRepository;
    use rusqlite::Connection;
    use std::sync::{Arc, Mutex};

    fn setup() -> (SqliteDataRepository, i64) {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        let repo = SqliteDataRepository::from_connection(Arc::new(Mutex::new(conn)));
        let data_id = repo.insert_module(&DataModule::new(0, 1, "Books")).unwrap();
        (repo, data_id)
    }

    fn seed_field(repo: &SqliteDataRepository, data_id: i64, name: &str, field_type: &str) -> i64 {
        let descriptor = FieldDescriptor::new(0, data_id, name, field_type);
        repo.insert_field(&DataField::from_descriptor(&descriptor)).unwrap()
    }

    #[test]
    fn test_validate_mapping_rejects_shared_target() {
        let imported = vec![
            FieldDescriptor::new(0, 1, "A", "text"),
            FieldDescriptor::new(1, 1, "B", "text"),
        ];
        let mapping = FieldMapping::new().with(0, 5).with(1, 5);

        let result = validate_mapping(&imported, &mapping);
        assert!(matches!(
            result,
            Err(ImportError::NotInjectiveMapping {
                existing_field_id: 5
            })
        ));
    }

    #[test]
    fn test_validate_mapping_ignores_unused_entries() {
        let imported = vec![FieldDescriptor::new(0, 1, "A", "text")];
        // temporary_id 3 不对应任何导入字段
        let mapping = FieldMapping::new().with(0, 5).with(3, 5);

        let preserved = validate_mapping(&imported, &mapping).unwrap();
        assert_eq!(preserved, BTreeSet::from([5]));
    }

    #[test]
    fn test_reconcile_update_create_delete() {
        let (repo, data_id) = setup();
        let keep_id = seed_field(&repo, data_id, "Old title", "text");
        let drop_id = seed_field(&repo, data_id, "Obsolete", "number");
        let existing = repo.get_existing_fields(data_id).unwrap();

        let imported = vec![
            FieldDescriptor::new(0, data_id, "Title", "text").with_param("required", "1"),
            FieldDescriptor::new(1, data_id, "Notes", "textarea"),
            FieldDescriptor::new(2, data_id, "Cover", "hologram"),
        ];
        let mapping = FieldMapping::new().with(0, keep_id);

        let registry = FieldTypeRegistry::default();
        let notifier = RecordingNotifier::new();
        let report = FieldReconciler::new(&repo, &registry, &notifier)
            .reconcile(&imported, &mapping, &existing)
            .unwrap();

        assert_eq!(report.updated, vec![keep_id]);
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.deleted, vec![drop_id]);
        assert_eq!(report.missing_types, vec!["Cover".to_string()]);

        let fields = repo.get_existing_fields(data_id).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[&keep_id].name, "Title");
        assert!(fields[&keep_id].required);
        let notes = &fields[&report.created[0]];
        assert_eq!(notes.field_type, "textarea");
        assert_eq!(notes.param("param3"), Some("35"));

        assert_eq!(
            notifier.notifications(),
            vec![
                ImportNotification::MissingFieldTypes {
                    names: vec!["Cover".to_string()]
                },
                ImportNotification::FieldDeleted {
                    name: "Obsolete".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_mapping_to_vanished_field_creates_new() {
        let (repo, data_id) = setup();
        let imported = vec![FieldDescriptor::new(0, data_id, "Title", "text")];
        let mapping = FieldMapping::new().with(0, 404);

        let registry = FieldTypeRegistry::default();
        let notifier = RecordingNotifier::new();
        let report = FieldReconciler::new(&repo, &registry, &notifier)
            .reconcile(&imported, &mapping, &BTreeMap::new())
            .unwrap();

        assert!(report.updated.is_empty());
        assert_eq!(report.created.len(), 1);
    }

    #[test]
    fn test_not_injective_leaves_fields_untouched() {
        let (repo, data_id) = setup();
        let a = seed_field(&repo, data_id, "A", "text");
        let b = seed_field(&repo, data_id, "B", "text");
        let existing = repo.get_existing_fields(data_id).unwrap();

        let imported = vec![
            FieldDescriptor::new(0, data_id, "X", "text"),
            FieldDescriptor::new(1, data_id, "Y", "text"),
        ];
        let mapping = FieldMapping::new().with(0, a).with(1, a);

        let registry = FieldTypeRegistry::default();
        let notifier = RecordingNotifier::new();
        let result =
            FieldReconciler::new(&repo, &registry, &notifier).reconcile(&imported, &mapping, &existing);

        assert!(matches!(result, Err(ImportError::NotInjectiveMapping { .. })));
        assert_eq!(repo.get_existing_fields(data_id).unwrap(), existing);
        assert!(existing.contains_key(&b));
        assert!(notifier.notifications().is_empty());
    }
}
