// ==========================================
// 数据库活动预设导入 - 字段领域模型
// ==========================================
// 对齐: data_fields 表
// 用途: 已持久化（或即将持久化）的字段定义
// ==========================================

use crate::domain::preset::FieldDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// data_fields 表上的类型参数列
pub const FIELD_PARAM_KEYS: [&str; 10] = [
    "param1", "param2", "param3", "param4", "param5", "param6", "param7", "param8", "param9",
    "param10",
];

/// 映射界面遗留的相似字段标记,更新字段时丢弃
pub const SIMILAR_FIELD_MARKER: &str = "similarfield";

// ==========================================
// DataField - 字段定义
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    pub id: i64, // 未落库时为 0
    pub dataid: i64,
    pub field_type: String,
    pub name: String,
    pub description: String,
    pub required: bool,
    pub params: BTreeMap<String, String>,
}

impl DataField {
    /// 由导入描述构造新字段（id 待落库后回填）
    pub fn from_descriptor(descriptor: &FieldDescriptor) -> Self {
        let mut field = Self {
            id: 0,
            dataid: descriptor.dataid,
            field_type: descriptor.field_type.clone(),
            name: descriptor.name.clone(),
            description: descriptor.description.clone().unwrap_or_default(),
            required: false,
            params: BTreeMap::new(),
        };
        for (key, value) in &descriptor.params {
            if key != "id" {
                field.set_attribute(key, value);
            }
        }
        field
    }

    /// 将导入描述的全部属性（id 除外）覆盖到当前字段
    pub fn apply_descriptor(&mut self, descriptor: &FieldDescriptor) {
        self.dataid = descriptor.dataid;
        self.name = descriptor.name.clone();
        self.field_type = descriptor.field_type.clone();
        if let Some(description) = &descriptor.description {
            self.description = description.clone();
        }
        for (key, value) in &descriptor.params {
            if key != "id" {
                self.set_attribute(key, value);
            }
        }
        self.params.remove(SIMILAR_FIELD_MARKER);
    }

    /// 按属性名写入（未知属性保存在 params 中）
    pub fn set_attribute(&mut self, key: &str, value: &str) {
        match key {
            "name" => self.name = value.to_string(),
            "type" => self.field_type = value.to_string(),
            "description" => self.description = value.to_string(),
            "required" => self.required = parse_flag(value),
            "dataid" => {
                if let Ok(dataid) = value.trim().parse() {
                    self.dataid = dataid;
                }
            }
            _ => {
                self.params.insert(key.to_string(), value.to_string());
            }
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
