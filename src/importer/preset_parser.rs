// ==========================================
// 数据库活动预设导入 - 预设解析器
// ==========================================
// 输入: preset.xml（<preset> 根下一个 <settings> 块 + 零个或多个 <field> 块）
// 输出: 设置表 + 待导入字段描述列表 + 模板文件内容
// ==========================================

use crate::domain::{FieldDescriptor, ParsedPreset, PresetSettings, ALLOWED_SETTINGS, TEMPLATE_FILES};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::preset_source::{PresetSource, PRESET_XML};
use roxmltree::{Document, Node, ParsingOptions};
use std::borrow::Cow;
use tracing::{debug, info, warn};

/// 解析预设包：preset.xml + 模板文件
///
/// # 参数
/// - source: 预设来源
/// - data_id: 目标活动实例 ID（写入每个字段描述）
///
/// # 返回
/// - Err(Parse): preset.xml 缺失或格式错误
pub fn parse_preset(source: &dyn PresetSource, data_id: i64) -> ImportResult<ParsedPreset> {
    let xml = source.read_file(PRESET_XML)?.ok_or_else(|| {
        ImportError::Parse(format!("预设 {} 缺少 {}", source.directory(), PRESET_XML))
    })?;

    let mut parsed = parse_preset_document(&xml, data_id)?;

    // 模板文件缺失时记为 None，覆写时清空模板
    for (template_name, template_file) in TEMPLATE_FILES {
        let content = source
            .read_file(template_file)?
            .map(|bytes| decode_template(template_file, &bytes));
        debug!(template = template_name, present = content.is_some(), "读取模板文件");
        parsed.settings.insert(template_name, content);
    }

    info!(
        preset = source.directory(),
        settings = parsed.settings.len(),
        fields = parsed.fields.len(),
        "预设解析完成"
    );
    Ok(parsed)
}

/// 解析 preset.xml 文本
pub fn parse_preset_document(xml: &[u8], data_id: i64) -> ImportResult<ParsedPreset> {
    let text = std::str::from_utf8(xml)
        .map_err(|e| ImportError::Parse(format!("preset.xml 不是有效的 UTF-8: {}", e)))?;
    // 允许 <!DOCTYPE preset> 声明
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options)?;

    let root = doc.root_element();
    if root.tag_name().name() != "preset" {
        return Err(ImportError::Parse(format!(
            "根元素应为 <preset>，实际为 <{}>",
            root.tag_name().name()
        )));
    }

    let settings_node = child_elements(root)
        .find(|n| n.tag_name().name() == "settings")
        .ok_or_else(|| ImportError::Parse("缺少 <settings> 块".to_string()))?;

    Ok(ParsedPreset {
        settings: parse_settings(settings_node),
        fields: child_elements(root)
            .filter(|n| n.tag_name().name() == "field")
            .enumerate()
            .map(|(temporary_id, node)| parse_field(node, temporary_id, data_id))
            .collect(),
    })
}

/// 模板按 UTF-8 读取；非法字节替换为 U+FFFD 并告警
fn decode_template(template_file: &str, bytes: &[u8]) -> String {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            warn!(template = template_file, "模板文件含非法 UTF-8 字节，已替换");
            text
        }
    }
}

/// 字段类型只保留字母
pub fn sanitize_field_type(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphabetic).collect()
}

fn parse_settings(node: Node<'_, '_>) -> PresetSettings {
    let mut settings = PresetSettings::new();
    for child in child_elements(node) {
        let key = child.tag_name().name();
        if !ALLOWED_SETTINGS.contains(&key) {
            debug!(setting = key, "忽略不支持的设置项");
            continue;
        }
        // 重复出现的键以第一次为准
        if !settings.contains_key(key) {
            settings.insert(key, Some(element_text(child)));
        }
    }
    settings
}

fn parse_field(node: Node<'_, '_>, temporary_id: usize, data_id: i64) -> FieldDescriptor {
    let mut descriptor = FieldDescriptor::new(temporary_id, data_id, "", "");
    let mut seen_name = false;
    let mut seen_type = false;

    for child in child_elements(node) {
        let key = child.tag_name().name();
        let value = element_text(child);
        match key {
            "name" if !seen_name => {
                descriptor.name = value;
                seen_name = true;
            }
            "type" if !seen_type => {
                descriptor.field_type = sanitize_field_type(&value);
                seen_type = true;
            }
            "description" if descriptor.description.is_none() => {
                descriptor.description = Some(value);
            }
            "name" | "type" | "description" | "dataid" => {}
            _ => {
                descriptor.params.entry(key.to_string()).or_insert(value);
            }
        }
    }
    descriptor
}

fn child_elements<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

/// 元素的直接文本（含 CDATA）
fn element_text(node: Node<'_, '_>) -> String {
    node.children()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect()
}
