// ==========================================
// 数据库活动预设导入 - 设置覆写
// ==========================================
// 规则:
// - defaultsort: 字段名 → 字段 id；数值（历史错误值）或缺失 → 0
// - overwrite_all = true: 覆写导入设置中的全部键
// - overwrite_all = false: 只覆写模板与排序键
// ==========================================

use crate::domain::{DataModule, PresetSettings, TEMPLATE_OVERWRITE_KEYS};
use crate::importer::error::ImportResult;
use crate::repository::DataRepository;
use tracing::debug;

pub const DEFAULT_SORT_KEY: &str = "defaultsort";

/// PHP is_numeric 近似：去首尾空白后可解析为有限数
fn is_numeric(value: &str) -> bool {
    value.trim().parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

// ==========================================
// SettingsMerger
// ==========================================
pub struct SettingsMerger<'a> {
    repo: &'a dyn DataRepository,
}

impl<'a> SettingsMerger<'a> {
    pub fn new(repo: &'a dyn DataRepository) -> Self {
        Self { repo }
    }

    /// 解析 defaultsort 为字段 id
    ///
    /// # 返回
    /// - 非数值字段名: 目标活动中同名字段的 id，找不到为 0
    /// - 数值 / 空 / 缺失: 0
    pub fn resolve_default_sort(&self, settings: &PresetSettings, data_id: i64) -> ImportResult<i64> {
        let resolved = match settings.get(DEFAULT_SORT_KEY) {
            Some(value) if value.is_empty() || value == "0" => 0,
            Some(value) if is_numeric(value) => {
                debug!(defaultsort = value, "defaultsort 为历史数值，重置为 0");
                0
            }
            Some(name) => self.repo.find_field_id_by_name(data_id, name)?.unwrap_or(0),
            None => 0,
        };
        Ok(resolved)
    }

    /// 本次导入覆写的键集合
    pub fn overwrite_keys(settings: &PresetSettings, overwrite_all: bool) -> Vec<String> {
        if overwrite_all {
            settings.keys().map(str::to_string).collect()
        } else {
            TEMPLATE_OVERWRITE_KEYS.iter().map(|k| k.to_string()).collect()
        }
    }

    /// 解析 defaultsort 后将设置覆写到活动实例
    ///
    /// # 返回
    /// - 被覆写的属性名
    pub fn merge(
        &self,
        module: &mut DataModule,
        settings: &mut PresetSettings,
        overwrite_all: bool,
    ) -> ImportResult<Vec<&'static str>> {
        let default_sort = self.resolve_default_sort(settings, module.id)?;
        settings.insert(DEFAULT_SORT_KEY, Some(default_sort.to_string()));

        let keys = Self::overwrite_keys(settings, overwrite_all);
        let mut applied = Vec::new();
        for &name in DataModule::attribute_names() {
            if !keys.iter().any(|k| k == name) {
                continue;
            }
            // 键不在导入设置中时按缺失处理（数值归零、模板清空）
            let value = settings.entry(name).flatten();
            if module.set_attribute(name, value) {
                applied.push(name);
            }
        }

        debug!(overwrite_all, applied = applied.len(), "活动设置已覆写");
        Ok(applied)
    }
}
