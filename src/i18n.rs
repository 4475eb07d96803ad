// ==========================================
// 数据库活动预设导入 - 本地化消息
// ==========================================
// 消息文件: locales/en.yml（回退）、locales/zh-CN.yml
// 占位符: %{name}
// 注意: rust_i18n::i18n! 宏在 lib.rs 中初始化
// ==========================================

/// 已提供消息文件的语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "zh-CN"];

pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 切换语言
///
/// # 说明
/// - 接受 "zh" / "zh_CN" / "zh-cn" 等写法，归一为 "zh-CN"
/// - 不支持的语言保持当前设置，返回 false
pub fn set_locale(locale: &str) -> bool {
    let normalized = match locale.trim().to_ascii_lowercase().replace('_', "-").as_str() {
        "en" | "en-us" | "en-gb" => "en",
        "zh" | "zh-cn" | "zh-hans" => "zh-CN",
        _ => return false,
    };
    rust_i18n::set_locale(normalized);
    true
}

/// 按当前语言取消息
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 取消息并替换占位符
///
/// # 示例
/// ```no_run
/// use data_preset_importer::i18n::t_with_args;
/// let msg = t_with_args("import.deleting_field", &[("name", "Title")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(t(key), |message, (name, value)| {
        message.replace(&format!("%{{{}}}", name), value)
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    // locale 为进程级全局状态，依赖它的测试经此锁串行
    pub(crate) static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_locale_normalization() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        assert!(set_locale("zh_CN"));
        assert_eq!(current_locale(), "zh-CN");

        assert!(!set_locale("fr"));
        assert_eq!(current_locale(), "zh-CN");

        assert!(set_locale("EN"));
        assert_eq!(current_locale(), "en");
    }

    #[test]
    fn test_success_message_in_both_locales() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(t("import.success"), "Preset applied successfully");

        set_locale("zh-CN");
        assert_eq!(t("import.success"), "预设导入成功");

        set_locale("en");
    }

    #[test]
    fn test_placeholders_are_replaced() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        for locale in SUPPORTED_LOCALES {
            set_locale(locale);
            let msg = t_with_args("import.missing_field_types", &[("names", "Title, Cover")]);
            assert!(msg.ends_with("Title, Cover"), "{}: {}", locale, msg);
            assert!(!msg.contains("%{"));
        }
        set_locale("en");
    }
}
