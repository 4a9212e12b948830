//! # 行分类
//!
//! 手写的脚本行识别函数，无正则依赖。
//!
//! 一行脚本只可能是以下几种形态之一：
//!
//! ```text
//! <name: args>   带参数的指令
//! <name>         无参数的指令
//! <line>         空白对话文本
//! # ...          注释
//! 其他           对话文本
//! ```

use std::borrow::Cow;

/// 分类后的脚本行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLine<'a> {
    /// 空行
    Blank,
    /// 注释行（以 `#` 开头）
    Comment,
    /// 指令
    Command {
        /// 指令名
        name: &'a str,
        /// 冒号后的参数（已去除首尾空白）
        args: Option<&'a str>,
    },
    /// 对话文本
    Text(&'a str),
}

/// `<line>` 表示一行空白对话
pub const EMPTY_TEXT_TAG: &str = "<line>";

/// 对行进行分类
pub fn classify(line: &str) -> ScriptLine<'_> {
    if line.is_empty() {
        return ScriptLine::Blank;
    }
    if line.starts_with('#') {
        return ScriptLine::Comment;
    }
    if line == EMPTY_TEXT_TAG {
        return ScriptLine::Text("");
    }
    match parse_tag(line) {
        Some((name, args)) => ScriptLine::Command { name, args },
        None => ScriptLine::Text(line),
    }
}

/// 解析 `<name: args>` / `<name>` 形式的指令
///
/// 指令名必须匹配 `[a-z][_a-zA-Z0-9]*`，否则整行视为文本。
pub fn parse_tag(line: &str) -> Option<(&str, Option<&str>)> {
    let inner = line.strip_prefix('<')?.strip_suffix('>')?;

    let (name, args) = match inner.find(':') {
        Some(colon) => (&inner[..colon], Some(inner[colon + 1..].trim())),
        None => (inner, None),
    };

    is_command_name(name).then_some((name, args))
}

/// 指令名是否合法
pub fn is_command_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// 规范化原始行
///
/// 只有看起来像指令的行才会去除首尾空白，对话文本保持原样。
pub fn normalize(raw: &str) -> Cow<'_, str> {
    let trimmed = raw.trim();
    if trimmed.starts_with('<') && trimmed.ends_with('>') {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Borrowed(raw.trim_end_matches(['\r', '\n']))
    }
}

/// 跳过模式下仍需查看的条件控制行
///
/// `case` 也在其中，用于维护嵌套深度。
pub fn is_condition_control(line: &str) -> bool {
    matches!(
        parse_tag(line),
        Some(("case" | "or_case" | "case_else" | "case_end", _))
    )
}

/// 按行拆分脚本文本
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_command_with_args() {
        assert_eq!(
            classify("<character_show: rave_normal>"),
            ScriptLine::Command {
                name: "character_show",
                args: Some("rave_normal"),
            }
        );
    }

    #[test]
    fn test_classify_command_without_args() {
        assert_eq!(
            classify("<halt>"),
            ScriptLine::Command {
                name: "halt",
                args: None,
            }
        );
    }

    #[test]
    fn test_classify_text_comment_blank() {
        assert_eq!(classify(""), ScriptLine::Blank);
        assert_eq!(classify("# note"), ScriptLine::Comment);
        assert_eq!(classify("Hello there."), ScriptLine::Text("Hello there."));
        assert_eq!(classify("<line>"), ScriptLine::Text(""));
    }

    #[test]
    fn test_invalid_name_is_text() {
        // 大写开头、含空格、HTML 片段都不是指令
        assert_eq!(classify("<Halt>"), ScriptLine::Text("<Halt>"));
        assert_eq!(classify("<b>hi</b>"), ScriptLine::Text("<b>hi</b>"));
        assert_eq!(classify("<two words>"), ScriptLine::Text("<two words>"));
        assert_eq!(classify("<>"), ScriptLine::Text("<>"));
    }

    #[test]
    fn test_args_trimmed_and_empty() {
        assert_eq!(parse_tag("<rest:   20  >"), Some(("rest", Some("20"))));
        assert_eq!(parse_tag("<call:>"), Some(("call", Some(""))));
    }

    #[test]
    fn test_normalize_only_trims_tags() {
        assert_eq!(normalize("   <halt>  "), "<halt>");
        assert_eq!(normalize("  indented text"), "  indented text");
    }

    #[test]
    fn test_condition_control_lines() {
        assert!(is_condition_control("<case_end>"));
        assert!(is_condition_control("<or_case: c1, ($x), is, 1>"));
        assert!(is_condition_control("<case_else>"));
        assert!(is_condition_control("<case: 1, is, 1>"));
        assert!(!is_condition_control("<halt>"));
        assert!(!is_condition_control("case_end"));
    }
}
