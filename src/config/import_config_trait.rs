// ==========================================
// 数据库活动预设导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::repository::FileArea;
use std::error::Error;
use std::path::PathBuf;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait ImportConfigReader: Send + Sync {
    /// 获取临时上传根目录
    ///
    /// # 说明
    /// - 上传的预设解压在 `<temp_dir>/forms/<directory>` 下
    ///
    /// # 默认值
    /// - `<系统缓存目录>/data-preset-importer`
    fn get_temp_dir(&self) -> Result<PathBuf, Box<dyn Error>>;

    /// 获取站点预设目录（相对 fullname 以此为根）
    ///
    /// # 默认值
    /// - `./presets`
    fn get_site_presets_dir(&self) -> Result<PathBuf, Box<dyn Error>>;

    /// 获取内容存储中的预设文件区
    ///
    /// # 默认值
    /// - context 1 / mod_data / site_presets / item 0
    fn get_preset_file_area(&self) -> Result<FileArea, Box<dyn Error>>;
}
