// ==========================================
// 数据库活动预设导入 - 预设来源读取
// ==========================================
// 职责: 按文件名读取预设包中的文件
// 实现: 常规目录 / 内容存储，两者可互换，构造时选定一次
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::repository::{ContentStore, FileArea};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// 预设包的主描述文件
pub const PRESET_XML: &str = "preset.xml";

// ==========================================
// PresetSource Trait
// ==========================================
pub trait PresetSource: Send + Sync {
    /// 预设名（所在目录的最后一级）
    fn directory(&self) -> &str;

    /// 读取预设包内文件
    ///
    /// # 返回
    /// - Ok(Some(bytes)): 文件内容
    /// - Ok(None): 文件不存在
    fn read_file(&self, filename: &str) -> ImportResult<Option<Vec<u8>>>;
}

/// 目录存在且包含 preset.xml 时视为已落地的预设
pub fn is_directory_a_preset(path: &Path) -> bool {
    path.is_dir() && path.join(PRESET_XML).is_file()
}

/// 选择预设来源
///
/// # 规则
/// 1. `location` 是已落地的预设目录 → 目录来源
/// 2. 否则在内容存储预设区中查找目录名等于 `location` 最后一级的预设
/// 3. 都找不到 → PresetNotFound
pub fn resolve_preset_source(
    location: &Path,
    store: Arc<dyn ContentStore>,
    area: &FileArea,
) -> ImportResult<Box<dyn PresetSource>> {
    if is_directory_a_preset(location) {
        debug!(path = %location.display(), "使用目录预设来源");
        return Ok(Box::new(DirectorySource::new(location)));
    }

    let preset_to_find = location
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| location.to_string_lossy().into_owned());

    let found = store
        .get_area_files(area)?
        .into_iter()
        .filter(|file| file.is_directory() && file.filepath != "/")
        .filter(|file| file.filepath.trim_matches('/') == preset_to_find)
        .last();

    match found {
        Some(dir) => {
            info!(preset = %preset_to_find, filepath = %dir.filepath, "使用内容存储预设来源");
            Ok(Box::new(ContentStoreSource::new(store, area.clone(), &dir.filepath)))
        }
        None => Err(ImportError::PresetNotFound(location.display().to_string())),
    }
}

// ==========================================
// DirectorySource - 常规目录
// ==========================================
pub struct DirectorySource {
    path: PathBuf,
    name: String,
}

impl DirectorySource {
    pub fn new(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            name,
        }
    }
}

impl PresetSource for DirectorySource {
    fn directory(&self) -> &str {
        &self.name
    }

    fn read_file(&self, filename: &str) -> ImportResult<Option<Vec<u8>>> {
        let file_path = self.path.join(filename);
        if !file_path.is_file() {
            return Ok(None);
        }
        Ok(Some(fs::read(&file_path)?))
    }
}

// ==========================================
// ContentStoreSource - 内容存储
// ==========================================
pub struct ContentStoreSource {
    store: Arc<dyn ContentStore>,
    area: FileArea,
    filepath: String,
    name: String,
}

impl ContentStoreSource {
    pub fn new(store: Arc<dyn ContentStore>, area: FileArea, filepath: &str) -> Self {
        Self {
            store,
            area,
            filepath: filepath.to_string(),
            name: filepath.trim_matches('/').to_string(),
        }
    }
}

impl PresetSource for ContentStoreSource {
    fn directory(&self) -> &str {
        &self.name
    }

    fn read_file(&self, filename: &str) -> ImportResult<Option<Vec<u8>>> {
        if !self.store.file_exists(&self.area, &self.filepath, filename)? {
            return Ok(None);
        }
        Ok(self.store.get_file_content(&self.area, &self.filepath, filename)?)
    }
}
