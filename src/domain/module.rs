// ==========================================
// 数据库活动预设导入 - 活动实例领域模型
// ==========================================
// 对齐: data 表
// 用途: 目标活动实例的当前配置,由宿主持久化层拥有
// ==========================================

use serde::{Deserialize, Serialize};
use tracing::warn;

// ==========================================
// DataModule - 数据库活动实例
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataModule {
    // ===== 标识 =====
    pub id: i64,
    pub course: i64,
    pub name: String,

    // ===== 可导入设置 =====
    pub intro: String,
    pub comments: i64,
    pub requiredentries: i64,
    pub requiredentriestoview: i64,
    pub maxentries: i64,
    pub rssarticles: i64,
    pub approval: i64,
    pub defaultsort: i64,
    pub defaultsortdir: i64,

    // ===== 模板 =====
    pub singletemplate: Option<String>,
    pub listtemplate: Option<String>,
    pub listtemplateheader: Option<String>,
    pub listtemplatefooter: Option<String>,
    pub addtemplate: Option<String>,
    pub rsstemplate: Option<String>,
    pub rsstitletemplate: Option<String>,
    pub csstemplate: Option<String>,
    pub jstemplate: Option<String>,
    pub asearchtemplate: Option<String>,

    // ===== 审计 =====
    pub timemodified: i64,
}

impl DataModule {
    pub fn new(id: i64, course: i64, name: &str) -> Self {
        Self {
            id,
            course,
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// 全部属性名（与 data 表列名一致）
    pub fn attribute_names() -> &'static [&'static str] {
        &[
            "id",
            "course",
            "name",
            "intro",
            "comments",
            "requiredentries",
            "requiredentriestoview",
            "maxentries",
            "rssarticles",
            "approval",
            "defaultsort",
            "defaultsortdir",
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
            "timemodified",
        ]
    }

    /// 按属性名覆写
    ///
    /// # 返回
    /// - true: 属性存在并已写入
    /// - false: 无此属性（调用方忽略）
    ///
    /// # 说明
    /// - 数值属性收到非数值文本时写入 0
    /// - 模板属性收到 None 时清空
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) -> bool {
        let template = value.map(str::to_string);
        match name {
            "id" => self.id = parse_int(name, value),
            "course" => self.course = parse_int(name, value),
            "name" => self.name = value.unwrap_or_default().to_string(),
            "intro" => self.intro = value.unwrap_or_default().to_string(),
            "comments" => self.comments = parse_int(name, value),
            "requiredentries" => self.requiredentries = parse_int(name, value),
            "requiredentriestoview" => self.requiredentriestoview = parse_int(name, value),
            "maxentries" => self.maxentries = parse_int(name, value),
            "rssarticles" => self.rssarticles = parse_int(name, value),
            "approval" => self.approval = parse_int(name, value),
            "defaultsort" => self.defaultsort = parse_int(name, value),
            "defaultsortdir" => self.defaultsortdir = parse_int(name, value),
            "singletemplate" => self.singletemplate = template,
            "listtemplate" => self.listtemplate = template,
            "listtemplateheader" => self.listtemplateheader = template,
            "listtemplatefooter" => self.listtemplatefooter = template,
            "addtemplate" => self.addtemplate = template,
            "rsstemplate" => self.rsstemplate = template,
            "rsstitletemplate" => self.rsstitletemplate = template,
            "csstemplate" => self.csstemplate = template,
            "jstemplate" => self.jstemplate = template,
            "asearchtemplate" => self.asearchtemplate = template,
            "timemodified" => self.timemodified = parse_int(name, value),
            _ => return false,
        }
        true
    }
}

fn parse_int(name: &str, value: Option<&str>) -> i64 {
    let Some(raw) = value else {
        return 0;
    };
    match raw.trim().parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            warn!(attribute = name, value = raw, "数值属性取值无效,按 0 处理");
            0
        }
    }
}
