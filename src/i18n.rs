// ==========================================
// 模切机生产记录系统 - 提示文本本地化
// ==========================================
// 目录: locales/zh-CN.yml（默认）、locales/en.yml
// 初始化: lib.rs 中的 rust_i18n::i18n! 宏
// ==========================================

/// 支持的语言（首项为默认语言）
pub const SUPPORTED_LOCALES: [&str; 2] = ["zh-CN", "en"];

/// 当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 切换语言
///
/// 接受常见写法（"zh" / "zh_CN" / "en-US" 等），归一到支持的语言代码；
/// 不支持的语言返回 false，当前语言保持不变
pub fn set_locale(locale: &str) -> bool {
    match resolve_locale(locale) {
        Some(code) => {
            rust_i18n::set_locale(code);
            true
        }
        None => false,
    }
}

fn resolve_locale(locale: &str) -> Option<&'static str> {
    let normalized = locale.trim().replace('_', "-").to_ascii_lowercase();
    let language = normalized.split('-').next().unwrap_or_default();
    match language {
        "zh" => Some(SUPPORTED_LOCALES[0]),
        "en" => Some(SUPPORTED_LOCALES[1]),
        _ => None,
    }
}

/// 按键取当前语言的提示文本
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 按键取提示文本并替换 `%{name}` 占位符
///
/// ```no_run
/// use diecut_tracker::i18n::t_with_args;
/// let msg = t_with_args("import.file_read_failed", &[("path", "/tmp/records.json")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(t(key), |text, (name, value)| {
        text.replace(&format!("%{{{}}}", name), value)
    })
}
