// ==========================================
// 数据库活动预设导入 - 日志初始化
// ==========================================
// RUST_LOG: 过滤器（默认 info），如 RUST_LOG=data_preset_importer::importer=debug
// PRESET_LOG_JSON: 非空时输出 JSON 行（便于采集 import_id 等结构化字段）
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// JSON 输出开关的环境变量
pub const LOG_JSON_ENV: &str = "PRESET_LOG_JSON";

/// 初始化命令行入口的日志
///
/// ```no_run
/// data_preset_importer::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_line_number(true);

    if json_enabled() {
        builder.json().with_current_span(true).init();
    } else {
        builder.init();
    }
}

/// 测试用：debug 级别，写入测试输出，重复调用无副作用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("data_preset_importer=debug"))
        .with_test_writer()
        .try_init();
}

fn json_enabled() -> bool {
    std::env::var(LOG_JSON_ENV)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}
