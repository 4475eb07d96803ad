// ==========================================
// 数据库活动预设导入 - 导入编排器
// ==========================================
// 流程: 读取活动 → 解析预设 → 字段对账 → 设置覆写 → 落库 → 清理
// 入口: create_from_request（按请求选择上传目录 / 已有预设）
// 约束: 致命错误在任何写入前中止；同一活动的并发导入不做保护
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::FieldMapping;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_reconciler::FieldReconciler;
use crate::importer::field_types::FieldTypeRegistry;
use crate::importer::notifier::{ImportNotification, ImportNotifier};
use crate::importer::preset_parser::parse_preset;
use crate::importer::preset_source::{resolve_preset_source, PresetSource};
use crate::importer::settings_merger::SettingsMerger;
use crate::repository::{ContentStore, DataRepository};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 上传预设在临时目录下的子目录
pub const UPLOAD_FORMS_DIR: &str = "forms";

// ==========================================
// ImportOutcome - 导入结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    /// 导入完成且清理成功
    pub success: bool,
    /// 类型未注册而跳过的字段名
    pub missing_types: Vec<String>,
    pub created_fields: usize,
    pub updated_fields: usize,
    pub deleted_fields: usize,
}

// ==========================================
// ImportRequest - 导入请求
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRequest {
    /// 已有预设的完整路径（优先）
    pub fullname: Option<String>,
    /// 上传预设在 `<temp_dir>/forms/` 下的目录名
    pub directory: Option<String>,
    pub field_mapping: FieldMapping,
}

impl ImportRequest {
    pub fn existing(fullname: &str) -> Self {
        Self {
            fullname: Some(fullname.to_string()),
            ..Self::default()
        }
    }

    pub fn upload(directory: &str) -> Self {
        Self {
            directory: Some(directory.to_string()),
            ..Self::default()
        }
    }

    pub fn with_mapping(mut self, field_mapping: FieldMapping) -> Self {
        self.field_mapping = field_mapping;
        self
    }

    /// 从请求参数构造（fullname / directory / field_<n>）
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let pairs: Vec<(String, String)> = params
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();

        let lookup = |name: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            fullname: lookup("fullname"),
            directory: lookup("directory"),
            field_mapping: FieldMapping::from_params(pairs.iter().map(|(k, v)| (k, v))),
        }
    }
}

// ==========================================
// PresetImporterKind - 导入器类别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetImporterKind {
    /// 临时上传目录，导入后删除
    Upload,
    /// 站点已有预设，导入后保留
    Existing,
}

// ==========================================
// PresetImporter - 导入编排器
// ==========================================
pub struct PresetImporter {
    data_id: i64,
    kind: PresetImporterKind,
    location: PathBuf,
    source: Box<dyn PresetSource>,
    repo: Arc<dyn DataRepository>,
    notifier: Arc<dyn ImportNotifier>,
    registry: FieldTypeRegistry,
    mapping: FieldMapping,
}

impl PresetImporter {
    /// 创建导入器（来源已选定）
    ///
    /// # 参数
    /// - data_id: 目标活动实例 ID
    /// - kind: 导入器类别（决定 cleanup 行为）
    /// - location: 预设位置
    /// - source: 预设来源
    /// - repo: 持久层
    /// - notifier: 通知接收方
    pub fn new(
        data_id: i64,
        kind: PresetImporterKind,
        location: PathBuf,
        source: Box<dyn PresetSource>,
        repo: Arc<dyn DataRepository>,
        notifier: Arc<dyn ImportNotifier>,
    ) -> Self {
        Self {
            data_id,
            kind,
            location,
            source,
            repo,
            notifier,
            registry: FieldTypeRegistry::default(),
            mapping: FieldMapping::new(),
        }
    }

    pub fn with_registry(mut self, registry: FieldTypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_mapping(mut self, mapping: FieldMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// 按请求创建导入器
    ///
    /// # 规则
    /// - fullname 非空: 已有预设；相对路径以站点预设目录为根
    /// - 否则: `<temp_dir>/forms/<directory>`，不存在或不是目录 → CannotImport
    /// - 来源在此一次选定，找不到 → PresetNotFound
    pub fn create_from_request(
        data_id: i64,
        request: ImportRequest,
        repo: Arc<dyn DataRepository>,
        store: Arc<dyn ContentStore>,
        config: &dyn ImportConfigReader,
        notifier: Arc<dyn ImportNotifier>,
    ) -> ImportResult<Self> {
        let (kind, location) = match request.fullname.as_deref().filter(|f| !f.is_empty()) {
            Some(fullname) => {
                let path = Path::new(fullname);
                let location = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    config
                        .get_site_presets_dir()
                        .map_err(|e| ImportError::Config(e.to_string()))?
                        .join(path)
                };
                (PresetImporterKind::Existing, location)
            }
            None => {
                let directory = request
                    .directory
                    .as_deref()
                    .filter(|d| is_plain_directory_name(d))
                    .ok_or_else(|| {
                        ImportError::CannotImport(request.directory.clone().unwrap_or_default())
                    })?;
                let location = config
                    .get_temp_dir()
                    .map_err(|e| ImportError::Config(e.to_string()))?
                    .join(UPLOAD_FORMS_DIR)
                    .join(directory);
                if !location.is_dir() {
                    return Err(ImportError::CannotImport(location.display().to_string()));
                }
                (PresetImporterKind::Upload, location)
            }
        };

        let area = config
            .get_preset_file_area()
            .map_err(|e| ImportError::Config(e.to_string()))?;
        let source = resolve_preset_source(&location, store, &area)?;

        info!(data_id, kind = ?kind, location = %location.display(), "导入器已创建");
        Ok(Self::new(data_id, kind, location, source, repo, notifier).with_mapping(request.field_mapping))
    }

    pub fn kind(&self) -> PresetImporterKind {
        self.kind
    }

    /// 预设所在目录名
    pub fn get_directory(&self) -> String {
        self.location
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.directory().to_string())
    }

    /// 目标活动已有字段时需要先让用户给出映射
    pub fn needs_mapping(&self) -> ImportResult<bool> {
        Ok(!self.repo.get_existing_fields(self.data_id)?.is_empty())
    }

    /// 重新提交同一预设所用的参数对
    pub fn preset_selector(&self) -> (&'static str, String) {
        ("directory", self.get_directory())
    }

    /// 执行导入
    ///
    /// # 参数
    /// - overwrite_all: true 覆写全部导入设置，false 只覆写模板与排序
    ///
    /// # 返回
    /// - Ok(outcome): 缺失类型的字段名在 outcome.missing_types 中
    /// - Err: 致命错误，活动保持导入前状态
    #[instrument(skip(self), fields(data_id = self.data_id, import_id = tracing::field::Empty))]
    pub fn import(&self, overwrite_all: bool) -> ImportResult<ImportOutcome> {
        let import_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("import_id", import_id.as_str());
        info!(preset = self.source.directory(), "开始导入预设");

        let mut module = self.repo.get_module(self.data_id).map_err(|e| {
            if e.is_not_found() {
                ImportError::ModuleNotFound(self.data_id)
            } else {
                e.into()
            }
        })?;

        let mut parsed = parse_preset(self.source.as_ref(), self.data_id)?;
        let existing = self.repo.get_existing_fields(self.data_id)?;

        let report = FieldReconciler::new(self.repo.as_ref(), &self.registry, self.notifier.as_ref())
            .reconcile(&parsed.fields, &self.mapping, &existing)?;

        SettingsMerger::new(self.repo.as_ref()).merge(&mut module, &mut parsed.settings, overwrite_all)?;
        module.timemodified = Utc::now().timestamp();
        self.repo.update_module(&module)?;

        let success = self.cleanup();
        info!(
            created = report.created.len(),
            updated = report.updated.len(),
            deleted = report.deleted.len(),
            missing = report.missing_types.len(),
            success,
            "预设导入完成"
        );

        Ok(ImportOutcome {
            success,
            missing_types: report.missing_types,
            created_fields: report.created.len(),
            updated_fields: report.updated.len(),
            deleted_fields: report.deleted.len(),
        })
    }

    /// 导入并通知结果；活动尚无条目时提示添加条目
    pub fn finish_import_process(&self, overwrite_all: bool) -> ImportResult<ImportOutcome> {
        let outcome = self.import(overwrite_all)?;
        let entries = self.repo.count_entries(self.data_id)?;
        self.notifier.notify(ImportNotification::Success {
            data_id: self.data_id,
            suggest_add_entries: entries == 0,
        });
        Ok(outcome)
    }

    /// 导入后清理；上传目录被删除，已有预设保留
    pub fn cleanup(&self) -> bool {
        match self.kind {
            PresetImporterKind::Existing => true,
            PresetImporterKind::Upload => match fs::remove_dir_all(&self.location) {
                Ok(()) => true,
                Err(e) => {
                    warn!(location = %self.location.display(), error = %e, "上传目录清理失败");
                    false
                }
            },
        }
    }
}

/// 上传目录名不得包含路径分隔或上级引用
fn is_plain_directory_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
