//! # Dialog 模块
//!
//! 对话框与字体状态。对话框在场景切换之间保持不变。

use std::collections::BTreeSet;

use crate::command::DialogStyle;

/// 对话框正在播放的动画
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogPhase {
    Intro,
    Outro,
}

/// 对话框在各个时刻启动的可复用脚本
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogHooks {
    pub intro_starting: Option<String>,
    pub intro_finished: Option<String>,
    pub outro_starting: Option<String>,
    pub outro_finished: Option<String>,
    pub on_halt: Option<String>,
    pub on_unhalt: Option<String>,
}

impl DialogHooks {
    /// 空字符串或 `none` 表示不启动脚本
    pub fn hook(value: &str) -> Option<String> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(value.to_string())
        }
    }
}

/// 对话框状态
#[derive(Debug, Clone, Default)]
pub struct DialogState {
    /// `text_dialog_define` 定义的外观，None 表示尚未定义
    pub style: Option<DialogStyle>,
    pub hooks: DialogHooks,
    pub visible: bool,
    pub animating: Option<DialogPhase>,
    /// Host 回报的文字动画状态
    pub text_animating: bool,
    /// 下一次解除 halt 时保留文字
    pub no_clear: bool,
    pub text_sound: Option<String>,
    pub loaded_fonts: BTreeSet<String>,
    pub active_font: Option<String>,
}

impl DialogState {
    pub fn is_defined(&self) -> bool {
        self.style.is_some()
    }
}
