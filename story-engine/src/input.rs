//! # Input 模块
//!
//! 定义 Host 向 Runtime 传递的输入事件。
//!
//! ## 设计说明
//!
//! - Runtime 不直接处理鼠标/键盘事件，只处理语义化的输入
//! - 动画由 Host 播放，播放结束时通过输入回报
//! - 帧的流逝由 `tick` 调用本身表示

use serde::{Deserialize, Serialize};

use crate::stage::{ContentType, SpriteAnimation};

/// Host 向 Runtime 传递的输入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeInput {
    /// 用户点击：文字动画中则加速，否则解除 `halt`
    Click,

    /// 对话框进场 / 退场动画结束
    DialogAnimationFinished,

    /// 对话文字开始逐字出现
    TextAnimationStarted,

    /// 对话文字全部出现
    TextAnimationFinished,

    /// 精灵的某种动画停止（到达目标或停止条件）
    ///
    /// 如果精灵设置了对应的 `*_after_*_stop` 脚本，会启动该脚本。
    SpriteAnimationStopped {
        content_type: ContentType,
        name: String,
        animation: SpriteAnimation,
    },

    /// 屏幕遮罩已完全遮住画面，可以切换场景
    ScreenCovered,

    /// 屏幕遮罩动画结束
    CoverFinished,

    /// Host 主动暂停主阅读器（如打开菜单）
    Pause,

    /// 解除主动暂停
    Resume,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_serialization() {
        let json = serde_json::to_string(&RuntimeInput::ScreenCovered).unwrap();
        assert_eq!(json, "\"ScreenCovered\"");
        let back: RuntimeInput = serde_json::from_str("\"Click\"").unwrap();
        assert_eq!(back, RuntimeInput::Click);
    }
}
