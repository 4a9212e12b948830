//! # State 模块
//!
//! 定义主阅读器的等待模型和脚本变量。
//!
//! ## 设计原则
//!
//! - 所有状态必须**显式建模**
//! - 变量保存在会话里，不使用全局状态

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::script::tokens::{VARIABLE_SIGIL, replace_tokens};

/// 主阅读器的等待原因
///
/// 每次 `tick` 之后返回给 Host，用于决定需要采集哪种输入。
/// 多个条件同时成立时按以下顺序报告：
///
/// ```text
/// DialogAnimation  -> 对话框动画进行中，等待 DialogAnimationFinished
/// Halt             -> 等待点击
/// HaltAuto         -> 按帧倒计时，点击无效
/// Rest             -> 按帧倒计时
/// WaitForAnimation -> 等待精灵 / 遮罩动画结束
/// Manual           -> Host 主动暂停
/// Finished         -> 主脚本已读完
/// None             -> 继续执行
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WaitingReason {
    /// 不等待
    #[default]
    None,

    /// 对话框进场 / 退场动画进行中
    DialogAnimation,

    /// 等待点击
    Halt,

    /// 自动继续的暂停
    HaltAuto { remaining_frames: u32 },

    /// 休止
    Rest { remaining_frames: u32 },

    /// 等待动画
    WaitForAnimation,

    /// Host 主动暂停
    Manual,

    /// 主脚本执行完毕
    Finished,
}

impl WaitingReason {
    /// 是否处于等待状态
    pub fn is_waiting(&self) -> bool {
        !matches!(self, Self::None | Self::Finished)
    }

    /// 是否等待点击
    pub fn accepts_click(&self) -> bool {
        matches!(self, Self::Halt)
    }
}

/// 变量名中不允许出现的字符
const INVALID_NAME_CHARS: &[char] = &['\\', '/', ',', '(', ')', '$', ':', '<', '>', ' '];

/// 脚本变量
///
/// 通过 `<variable_set: name, value>` 写入，通过 `($name)` 读取。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variables {
    values: HashMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// 变量名是否合法
    pub fn is_valid_name(name: &str) -> bool {
        !name.trim().is_empty() && !name.contains(INVALID_NAME_CHARS)
    }

    /// 设置变量，名称不合法时返回 false
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        if !Self::is_valid_name(name) {
            return false;
        }
        self.values.insert(name.to_string(), value.into());
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 替换行中的 `($name)` 占位符
    ///
    /// 变量值本身可能含有占位符，因此最多重复 `max_passes` 轮，
    /// 某一轮没有发生替换时提前结束。未知变量保持原样。
    pub fn find_and_replace(&self, line: &str, max_passes: usize) -> String {
        let mut current = line.to_string();
        for _ in 0..max_passes {
            let Ok((next, replaced)) = replace_tokens(&current, VARIABLE_SIGIL, |name| {
                Ok::<_, std::convert::Infallible>(self.get(name).map(str::to_string))
            });
            current = next;
            if !replaced {
                break;
            }
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waiting_reason() {
        assert!(!WaitingReason::None.is_waiting());
        assert!(!WaitingReason::Finished.is_waiting());
        assert!(WaitingReason::Halt.is_waiting());
        assert!(WaitingReason::Halt.accepts_click());
        assert!(!WaitingReason::HaltAuto { remaining_frames: 3 }.accepts_click());
        assert_eq!(WaitingReason::default(), WaitingReason::None);
    }

    #[test]
    fn test_variable_names() {
        let mut vars = Variables::new();
        assert!(vars.set("player_name", "Theo"));
        assert!(!vars.set("", "x"));
        assert!(!vars.set("two words", "x"));
        assert!(!vars.set("a:b", "x"));
        assert!(!vars.set("($x)", "x"));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn test_find_and_replace() {
        let mut vars = Variables::new();
        vars.set("name", "Theo");
        assert_eq!(
            vars.find_and_replace("Hello ($name) and ($nobody)", 4),
            "Hello Theo and ($nobody)"
        );
    }

    #[test]
    fn test_nested_replacement_is_bounded() {
        let mut vars = Variables::new();
        vars.set("a", "($b)");
        vars.set("b", "($c)");
        vars.set("c", "done");
        assert_eq!(vars.find_and_replace("($a)", 4), "done");
        assert_eq!(vars.find_and_replace("($a)", 1), "($b)");

        // 自引用不会无限展开
        vars.set("loop", "($loop)");
        assert_eq!(vars.find_and_replace("($loop)", 4), "($loop)");
    }
}
