// ==========================================
// 数据库活动预设导入 - 预设领域模型
// ==========================================
// 职责: 预设设置、待导入字段描述、字段映射
// 生命周期: 每次导入时新解析,导入结束即丢弃
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// 允许从 settings 块导入的设置项（其余键静默丢弃）
pub const ALLOWED_SETTINGS: [&str; 9] = [
    "intro",
    "comments",
    "requiredentries",
    "requiredentriestoview",
    "maxentries",
    "rssarticles",
    "approval",
    "defaultsortdir",
    "defaultsort",
];

/// 模板名 → 预设包内文件名
pub const TEMPLATE_FILES: [(&str, &str); 10] = [
    ("singletemplate", "singletemplate.html"),
    ("listtemplate", "listtemplate.html"),
    ("listtemplateheader", "listtemplateheader.html"),
    ("listtemplatefooter", "listtemplatefooter.html"),
    ("addtemplate", "addtemplate.html"),
    ("rsstemplate", "rsstemplate.html"),
    ("rsstitletemplate", "rsstitletemplate.html"),
    ("csstemplate", "csstemplate.css"),
    ("jstemplate", "jstemplate.js"),
    ("asearchtemplate", "asearchtemplate.html"),
];

/// 不覆写全部设置时，仅覆写的键（模板 + 排序）
pub const TEMPLATE_OVERWRITE_KEYS: [&str; 12] = [
    "singletemplate",
    "listtemplate",
    "listtemplateheader",
    "listtemplatefooter",
    "addtemplate",
    "rsstemplate",
    "rsstitletemplate",
    "csstemplate",
    "jstemplate",
    "asearchtemplate",
    "defaultsortdir",
    "defaultsort",
];

/// 字段映射中表示"新建字段"的取值
pub const NEW_FIELD: i64 = -1;

// ==========================================
// PresetSettings - 预设设置
// ==========================================
// 值为 None 表示键存在但内容缺失（如模板文件不在预设包内）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetSettings {
    values: BTreeMap<String, Option<String>>,
}

impl PresetSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.values.insert(key.into(), value);
    }

    /// 读取非空值（键不存在或值缺失都返回 None）
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_deref())
    }

    /// 读取原始条目: 外层 None = 键不存在, 内层 None = 值缺失
    pub fn entry(&self, key: &str) -> Option<Option<&str>> {
        self.values.get(key).map(|v| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PresetSettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut settings = Self::new();
        for (k, v) in iter {
            settings.insert(k, Some(v.into()));
        }
        settings
    }
}

// ==========================================
// FieldDescriptor - 待导入字段描述
// ==========================================
// 由解析器产生,尚未持久化
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub temporary_id: usize, // 字段块在 preset.xml 中的位置（0 起）
    pub dataid: i64,         // 目标活动实例 ID
    pub name: String,
    pub field_type: String, // 已清洗为纯字母
    pub description: Option<String>,
    pub params: BTreeMap<String, String>, // 其余类型相关参数（required/param1..param10 等）
}

impl FieldDescriptor {
    pub fn new(temporary_id: usize, dataid: i64, name: &str, field_type: &str) -> Self {
        Self {
            temporary_id,
            dataid,
            name: name.to_string(),
            field_type: field_type.to_string(),
            description: None,
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }
}

// ==========================================
// ParsedPreset - 解析结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPreset {
    pub settings: PresetSettings,
    pub fields: Vec<FieldDescriptor>,
}

// ==========================================
// FieldMapping - 字段映射
// ==========================================
// 导入字段 temporary_id → 已有字段 id 的部分函数,由用户选择
// 单射性在导入时校验,不在构造时校验
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    targets: BTreeMap<usize, i64>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// 将导入字段映射到已有字段（NEW_FIELD 表示新建,等同于不映射）
    pub fn with(mut self, temporary_id: usize, existing_field_id: i64) -> Self {
        self.set(temporary_id, existing_field_id);
        self
    }

    pub fn set(&mut self, temporary_id: usize, existing_field_id: i64) {
        if existing_field_id == NEW_FIELD {
            self.targets.remove(&temporary_id);
        } else {
            self.targets.insert(temporary_id, existing_field_id);
        }
    }

    /// 已选择的已有字段 id（None 表示新建）
    pub fn target(&self, temporary_id: usize) -> Option<i64> {
        self.targets.get(&temporary_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// 从请求参数构造映射
    ///
    /// # 参数格式
    /// - `field_<temporary_id>` = `<已有字段 id>`，`-1` 表示新建
    /// - 其它参数忽略；无法解析的取值记告警后视为新建
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut mapping = Self::new();
        for (key, value) in params {
            let Some(tmp) = key.as_ref().strip_prefix("field_") else {
                continue;
            };
            let Ok(temporary_id) = tmp.parse::<usize>() else {
                continue;
            };
            match value.as_ref().trim().parse::<i64>() {
                Ok(existing_id) => mapping.set(temporary_id, existing_id),
                Err(_) => {
                    warn!(param = %key.as_ref(), value = %value.as_ref(), "字段映射取值无效,按新建处理");
                }
            }
        }
        mapping
    }
}
