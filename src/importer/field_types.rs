// ==========================================
// 数据库活动预设导入 - 字段类型注册表
// ==========================================
// 职责: 字段类型标签 → 类型处理器
// 约束: 类型集合封闭且预先注册，未注册的标签解析为"不存在"
// ==========================================

use crate::domain::DataField;
use crate::repository::{DataRepository, RepositoryResult};
use std::collections::BTreeMap;
use std::sync::Arc;

// ==========================================
// FieldType Trait
// ==========================================
// 实现者: StandardFieldType，或调用方注册的自定义类型
pub trait FieldType: Send + Sync {
    /// 类型标签（纯字母）
    fn type_name(&self) -> &str;

    /// 填充类型相关默认值（仅补齐缺失项）
    fn apply_defaults(&self, field: &mut DataField);

    /// 新建字段：补齐默认值后落库，返回带 id 的字段
    fn insert_field(
        &self,
        mut field: DataField,
        repo: &dyn DataRepository,
    ) -> RepositoryResult<DataField> {
        self.apply_defaults(&mut field);
        field.id = repo.insert_field(&field)?;
        Ok(field)
    }

    /// 更新已有字段
    fn update_field(&self, field: &DataField, repo: &dyn DataRepository) -> RepositoryResult<()> {
        repo.update_field(field)
    }
}

// ==========================================
// StandardFieldType - 内置字段类型
// ==========================================
pub struct StandardFieldType {
    name: &'static str,
    defaults: &'static [(&'static str, &'static str)],
}

impl StandardFieldType {
    pub const fn new(name: &'static str, defaults: &'static [(&'static str, &'static str)]) -> Self {
        Self { name, defaults }
    }
}

impl FieldType for StandardFieldType {
    fn type_name(&self) -> &str {
        self.name
    }

    fn apply_defaults(&self, field: &mut DataField) {
        for (key, value) in self.defaults {
            field
                .params
                .entry((*key).to_string())
                .or_insert_with(|| (*value).to_string());
        }
    }
}

/// 内置字段类型及其参数默认值
const STANDARD_TYPES: [StandardFieldType; 12] = [
    StandardFieldType::new("checkbox", &[]),
    StandardFieldType::new("date", &[]),
    StandardFieldType::new("file", &[("param3", "0")]),
    StandardFieldType::new("latlong", &[("param2", "-1")]),
    StandardFieldType::new("menu", &[]),
    StandardFieldType::new("multimenu", &[]),
    StandardFieldType::new("number", &[]),
    StandardFieldType::new("picture", &[("param3", "0")]),
    StandardFieldType::new("radiobutton", &[]),
    StandardFieldType::new("text", &[("param1", "0")]),
    StandardFieldType::new("textarea", &[("param2", "60"), ("param3", "35")]),
    StandardFieldType::new("url", &[("param1", "0")]),
];

// ==========================================
// FieldTypeRegistry
// ==========================================
#[derive(Clone)]
pub struct FieldTypeRegistry {
    types: BTreeMap<String, Arc<dyn FieldType>>,
}

impl FieldTypeRegistry {
    /// 空注册表
    pub fn empty() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    /// 含全部内置类型的注册表
    pub fn with_standard_types() -> Self {
        let mut registry = Self::empty();
        for field_type in STANDARD_TYPES {
            registry.register(Arc::new(field_type));
        }
        registry
    }

    /// 注册（同名覆盖）
    pub fn register(&mut self, field_type: Arc<dyn FieldType>) {
        self.types.insert(field_type.type_name().to_string(), field_type);
    }

    pub fn resolve(&self, type_name: &str) -> Option<Arc<dyn FieldType>> {
        self.types.get(type_name).cloned()
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        Self::with_standard_types()
    }
}
