//! # 诊断模块
//!
//! 提供故事的静态检查和诊断 API，不运行脚本，不依赖 IO。
//!
//! ## 设计原则
//!
//! - 纯函数 API，可在无 IO 环境下运行
//! - 诊断分级：Error（必须修复）、Warn（建议修复）、Info（信息提示）
//! - 复用运行时的行分类与参数记录，不重复解析逻辑
//!
//! 包含变量占位符 `($name)` 的参数在运行前无法确定，跳过目标检查。

use crate::runtime::dispatch::CommandKind;
use crate::script::args::decode;
use crate::script::line::{ScriptLine, classify, normalize, split_lines};
use crate::script::records::{
    After, AfterStop, AfterWithArgs, CallWithArgs, DialogDefine, NameArg, Scene, SceneWithFade,
};
use crate::script::tokens::{PARAMETER_SIGIL, VARIABLE_SIGIL, contains_token};
use crate::story::Story;

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    /// 信息提示
    Info,
    /// 警告（建议修复）
    Warn,
    /// 错误（必须修复）
    Error,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 诊断级别
    pub level: DiagnosticLevel,
    /// 脚本 ID（如 `scene:Prologue/Intro`）
    pub script_id: String,
    /// 行号（如果可定位，从 1 开始）
    pub line: Option<usize>,
    /// 诊断消息
    pub message: String,
    /// 诊断详情（可选，如原始行内容）
    pub detail: Option<String>,
}

impl Diagnostic {
    fn new(level: DiagnosticLevel, script_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            script_id: script_id.into(),
            line: None,
            message: message.into(),
            detail: None,
        }
    }

    /// 创建错误诊断
    pub fn error(script_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, script_id, message)
    }

    /// 创建警告诊断
    pub fn warn(script_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warn, script_id, message)
    }

    /// 创建信息诊断
    pub fn info(script_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, script_id, message)
    }

    /// 设置行号
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// 设置详情
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level, self.script_id)?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n  | {}", detail)?;
        }
        Ok(())
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default)]
pub struct DiagnosticResult {
    /// 诊断条目列表
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    /// 创建空结果
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加诊断
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 合并另一个结果
    pub fn merge(&mut self, other: DiagnosticResult) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// 获取错误数量
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
            .count()
    }

    /// 获取警告数量
    pub fn warn_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warn)
            .count()
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 按级别过滤
    pub fn filter_by_level(&self, min_level: DiagnosticLevel) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level >= min_level)
            .collect()
    }
}

/// 脚本种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// 章节脚本（每个场景之前执行）
    Chapter,
    /// 场景脚本
    Scene,
    /// 可复用脚本（后台阅读器执行，可以使用 `(@key)` 参数）
    Reusable,
}

//=============================================================================
// 故事分析 API
//=============================================================================

/// 分析整个故事
///
/// 执行以下检查：
/// - 起始场景不存在
/// - 每个章节、场景、可复用脚本的 [`analyze_script`] 检查
pub fn analyze_story(story: &Story) -> DiagnosticResult {
    let mut result = DiagnosticResult::new();

    match &story.startup {
        Some(startup) => {
            if let Err(e) = story.check_scene(&startup.chapter, &startup.scene) {
                result.push(Diagnostic::error("story", format!("起始场景无效: {e}")));
            }
        }
        None => result.push(Diagnostic::info(
            "story",
            "故事没有起始场景，需要在引擎配置中指定",
        )),
    }

    for (chapter_name, chapter) in &story.chapters {
        result.merge(analyze_script(
            &format!("chapter:{chapter_name}"),
            &chapter.script,
            ScriptKind::Chapter,
            story,
        ));
        for (scene_name, script) in &chapter.scenes {
            result.merge(analyze_script(
                &format!("scene:{chapter_name}/{scene_name}"),
                script,
                ScriptKind::Scene,
                story,
            ));
        }
    }

    for (name, script) in &story.reusables {
        result.merge(analyze_script(
            &format!("reusable:{name}"),
            script,
            ScriptKind::Reusable,
            story,
        ));
    }

    result
}

/// 分析单个脚本
///
/// 执行以下检查：
/// - 未知指令
/// - `case` / `case_end` 不配对，块外的 `or_case` / `case_else`
/// - `call` / `after` / `*_after_*_stop` / 对话框钩子引用了不存在的可复用脚本
/// - `scene` / `scene_with_fade` 的目标场景不存在
/// - 章节或场景脚本中出现 `(@key)` 参数
pub fn analyze_script(
    script_id: &str,
    text: &str,
    kind: ScriptKind,
    story: &Story,
) -> DiagnosticResult {
    let mut result = DiagnosticResult::new();
    // 未闭合的 case 所在行
    let mut open_cases: Vec<usize> = Vec::new();

    for (index, raw) in split_lines(text).enumerate() {
        let line_number = index + 1;
        let line = normalize(raw);

        if kind != ScriptKind::Reusable && contains_token(&line, PARAMETER_SIGIL) {
            result.push(
                Diagnostic::warn(script_id, "只有可复用脚本可以使用 (@参数)")
                    .with_line(line_number)
                    .with_detail(line.as_ref()),
            );
        }

        let ScriptLine::Command { name, args } = classify(&line) else {
            continue;
        };
        let Some(command) = CommandKind::lookup(name) else {
            result.push(
                Diagnostic::warn(script_id, format!("未知指令: {name}"))
                    .with_line(line_number)
                    .with_detail(line.as_ref()),
            );
            continue;
        };

        match command {
            CommandKind::Case => open_cases.push(line_number),
            CommandKind::CaseEnd => {
                if open_cases.pop().is_none() {
                    result.push(
                        Diagnostic::warn(script_id, "case_end 没有对应的 case")
                            .with_line(line_number),
                    );
                }
            }
            CommandKind::OrCase | CommandKind::CaseElse if open_cases.is_empty() => {
                result.push(
                    Diagnostic::warn(script_id, format!("{name} 不在 case 块内"))
                        .with_line(line_number),
                );
            }
            _ => {}
        }

        // 含占位符的参数在运行前无法确定
        if args.is_some_and(|a| {
            contains_token(a, VARIABLE_SIGIL) || contains_token(a, PARAMETER_SIGIL)
        }) {
            continue;
        }

        for target in reusable_targets(command, args) {
            if story.reusable(&target).is_none() {
                result.push(
                    Diagnostic::error(script_id, format!("可复用脚本不存在: {target}"))
                        .with_line(line_number)
                        .with_detail(line.as_ref()),
                );
            }
        }

        if let Some((chapter, scene)) = scene_target(command, args)
            && let Err(e) = story.check_scene(&chapter, &scene)
        {
            result.push(
                Diagnostic::error(script_id, e.to_string())
                    .with_line(line_number)
                    .with_detail(line.as_ref()),
            );
        }
    }

    for line_number in open_cases {
        result.push(Diagnostic::warn(script_id, "case 块没有 case_end").with_line(line_number));
    }

    result
}

/// 指令引用的可复用脚本名
fn reusable_targets(command: CommandKind, args: Option<&str>) -> Vec<String> {
    match command {
        CommandKind::Call => match decode::<CallWithArgs>(args) {
            Ok(call) => vec![call.name],
            Err(_) => decode::<NameArg>(args).map(|n| n.name).into_iter().collect(),
        },
        CommandKind::After => match decode::<AfterWithArgs>(args) {
            Ok(after) => vec![after.name],
            Err(_) => decode::<After>(args).map(|a| a.name).into_iter().collect(),
        },
        CommandKind::Sprite(_, op) if op.is_after_stop() => decode::<AfterStop>(args)
            .map(|a| a.script)
            .into_iter()
            .collect(),
        CommandKind::TextDialogDefine => match decode::<DialogDefine>(args) {
            Ok(define) => [
                define.reusable_on_intro_starting,
                define.reusable_on_intro_finished,
                define.reusable_on_outro_starting,
                define.reusable_on_outro_finished,
                define.reusable_on_halt,
                define.reusable_on_unhalt,
            ]
            .into_iter()
            .collect(),
            Err(_) => Vec::new(),
        },
        _ => Vec::new(),
    }
    .into_iter()
    .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case("none"))
    .collect()
}

/// 场景切换指令的目标
fn scene_target(command: CommandKind, args: Option<&str>) -> Option<(String, String)> {
    match command {
        CommandKind::Scene => decode::<Scene>(args).ok().map(|s| (s.chapter, s.scene)),
        CommandKind::SceneWithFade => decode::<SceneWithFade>(args)
            .ok()
            .map(|s| (s.chapter, s.scene)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story() -> Story {
        Story::new()
            .with_startup("c1", "s1")
            .with_chapter("c1", "")
            .with_scene("c1", "s1", "")
            .with_reusable("sparkle", "<character_show: (@name)>")
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error("scene:c1/s1", "可复用脚本不存在: missing")
            .with_line(10)
            .with_detail("<call: missing>");

        let display = format!("{}", diag);
        assert!(display.contains("[ERROR]"));
        assert!(display.contains("scene:c1/s1:10"));
        assert!(display.contains("<call: missing>"));
    }

    #[test]
    fn test_valid_story_is_clean() {
        let story = story().with_scene(
            "c1",
            "s2",
            "<call: sparkle, name=rave>\n<after: 10, sparkle>\n<case: 1, is, 1>\nhi\n<case_end>\n<scene: c1, s1>",
        );
        let result = analyze_story(&story);
        assert!(result.is_empty(), "{:?}", result.diagnostics);
    }

    #[test]
    fn test_unknown_targets_are_errors() {
        let text = "<call: missing>\n<scene: c1, nowhere>\n<character_after_fading_stop: rave, gone>\n<scene_with_fade: #000, 1, 1, 1, c9, s1>";
        let result = analyze_script("scene:c1/s1", text, ScriptKind::Scene, &story());

        assert_eq!(result.error_count(), 4);
        let lines: Vec<_> = result.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn test_unbalanced_case_blocks() {
        let text = "<case_end>\n<or_case: x, 1, is, 1>\n<case: 1, is, 2>\n<case_else>";
        let result = analyze_script("scene:c1/s1", text, ScriptKind::Scene, &story());

        assert!(!result.has_errors());
        assert_eq!(result.warn_count(), 3);
        // 未闭合的 case 定位到第 3 行
        assert_eq!(result.diagnostics[2].line, Some(3));
    }

    #[test]
    fn test_unknown_command_and_parameters() {
        let text = "<character_dance: rave>\n<variable_set: n, (@value)>\n<call: ($target)>";
        let result = analyze_script("scene:c1/s1", text, ScriptKind::Scene, &story());
        assert_eq!(result.warn_count(), 2);
        assert!(!result.has_errors());

        // 可复用脚本可以使用参数
        let result = analyze_script("reusable:x", "<call: (@next)>", ScriptKind::Reusable, &story());
        assert!(result.is_empty());
    }

    #[test]
    fn test_startup_scene_checked() {
        let story = story().with_startup("c1", "missing");
        let result = analyze_story(&story);
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.diagnostics[0].script_id, "story");
    }

    #[test]
    fn test_diagnostic_result_filter() {
        let mut result = DiagnosticResult::new();
        result.push(Diagnostic::error("test", "错误1"));
        result.push(Diagnostic::warn("test", "警告1"));
        result.push(Diagnostic::info("test", "信息1"));

        assert_eq!(result.filter_by_level(DiagnosticLevel::Error).len(), 1);
        assert_eq!(result.filter_by_level(DiagnosticLevel::Warn).len(), 2);
        assert_eq!(result.filter_by_level(DiagnosticLevel::Info).len(), 3);
    }
}
