//! # Command 模块
//!
//! 定义 Runtime 向 Host 发出的指令。
//!
//! ## 设计原则
//!
//! - **声明式**：Command 描述"做什么"，不描述"怎么做"
//! - **引擎无关**：不包含任何渲染或音频库的类型
//! - 精灵状态不走 Command，Host 直接读取 [`Stage`](crate::stage::Stage)

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ArgError;

/// 音频通道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioChannel {
    /// 音效
    Fx,
    /// 语音
    Voice,
    /// 音乐（循环播放）
    Music,
    /// 对话逐字音效
    Text,
}

/// 对话框进场动画
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogIntro {
    NoAnimation,
    LeftToRight,
    RightToLeft,
    FadeIn,
    ScaleUpHeightThenWidth,
    ScaleUpWidthThenHeight,
    ScaleUpWidthAndHeight,
}

impl FromStr for DialogIntro {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let intro = match s.trim().to_lowercase().as_str() {
            "no animation" => Self::NoAnimation,
            "left to right" => Self::LeftToRight,
            "right to left" => Self::RightToLeft,
            "fade in" => Self::FadeIn,
            "scale up height then width" => Self::ScaleUpHeightThenWidth,
            "scale up width then height" => Self::ScaleUpWidthThenHeight,
            "scale up width and height" => Self::ScaleUpWidthAndHeight,
            _ => return Err(ArgError::invalid(s, "未知的对话框进场动画")),
        };
        Ok(intro)
    }
}

/// 对话框退场动画
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogOutro {
    NoAnimation,
    GoRight,
    GoLeft,
    GoUp,
    GoDown,
    FadeOut,
    ScaleDownHeightThenWidth,
    ScaleDownWidthThenHeight,
    ScaleDownWidthAndHeight,
}

impl FromStr for DialogOutro {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let outro = match s.trim().to_lowercase().as_str() {
            "no animation" => Self::NoAnimation,
            "go right" => Self::GoRight,
            "go left" => Self::GoLeft,
            "go up" => Self::GoUp,
            "go down" => Self::GoDown,
            "fade out" => Self::FadeOut,
            "scale down height then width" => Self::ScaleDownHeightThenWidth,
            "scale down width then height" => Self::ScaleDownWidthThenHeight,
            "scale down width and height" => Self::ScaleDownWidthAndHeight,
            _ => return Err(ArgError::invalid(s, "未知的对话框退场动画")),
        };
        Ok(outro)
    }
}

/// 对话框锚点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogAnchor {
    MidLeft,
    BottomLeft,
    TopLeft,
    MidBottom,
    BottomRight,
    MidRight,
    TopRight,
    MidTop,
    Center,
}

impl FromStr for DialogAnchor {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let anchor = match s.trim().to_lowercase().as_str() {
            "mid left" => Self::MidLeft,
            "bottom left" => Self::BottomLeft,
            "top left" => Self::TopLeft,
            "mid bottom" => Self::MidBottom,
            "bottom right" => Self::BottomRight,
            "mid right" => Self::MidRight,
            "top right" => Self::TopRight,
            "mid top" => Self::MidTop,
            "center" => Self::Center,
            _ => return Err(ArgError::invalid(s, "未知的对话框锚点")),
        };
        Ok(anchor)
    }
}

/// 文字出现方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextIntro {
    Sudden,
    FadeIn,
    GradualLetter,
    GradualLetterFadeIn,
}

impl FromStr for TextIntro {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let intro = match s.trim().to_lowercase().as_str() {
            "sudden" => Self::Sudden,
            "fade in" => Self::FadeIn,
            "gradual letter" => Self::GradualLetter,
            "gradual letter fade in" => Self::GradualLetterFadeIn,
            _ => return Err(ArgError::invalid(s, "未知的文字出现方式")),
        };
        Ok(intro)
    }
}

/// 对话框外观
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogStyle {
    pub width: i32,
    pub height: i32,
    pub animation_speed: f32,
    pub intro: DialogIntro,
    pub outro: DialogOutro,
    pub anchor: DialogAnchor,
    pub bg_color_hex: String,
    pub padding_x: i32,
    pub padding_y: i32,
    pub opacity: i32,
    pub rounded_corners: bool,
    pub border_color_hex: String,
    pub border_opacity: i32,
    pub border_width: i32,
}

/// Runtime 向 Host 发出的指令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// 显示一行对话文本（空字符串表示空白行）
    DialogText { text: String },

    /// 定义 / 更新对话框外观
    DefineDialog { style: DialogStyle },

    /// 显示对话框，`animated` 为 true 时 Host 播放进场动画并回报完成
    ShowDialog { animated: bool },

    /// 隐藏对话框
    HideDialog { animated: bool },

    /// 开始播放当前对话文字的出现动画
    StartTextAnimation,

    /// 立即显示完当前文字
    SpeedUpText,

    /// 清除对话文字
    ClearText,

    /// 下一行文字接在当前文字后面
    ContinueText { adjust_y: Option<i32> },

    /// 加载字体精灵表
    LoadFont { name: String },

    /// 切换当前字体
    SetFont { name: String },

    /// 文字起始位置
    FontPosition { x: Option<i32>, y: Option<i32> },

    /// 文字淡入速度（1-10）
    FontTextFadeSpeed { speed: i32 },

    /// 逐字出现的间隔帧数（0-600）
    FontTextDelay { frames: i32 },

    /// 某个标点之后的额外停顿（0-150）
    FontTextDelayPunc { previous_letter: String, frames: i32 },

    /// 文字出现方式
    FontIntroAnimation { animation: TextIntro },

    /// 播放音频
    PlayAudio {
        channel: AudioChannel,
        name: String,
        looped: bool,
    },

    /// 停止某个通道，`None` 表示全部
    StopAudio { channel: Option<AudioChannel> },

    /// 音量（0.0-1.0）
    SetVolume { channel: AudioChannel, volume: f32 },

    /// 逐字音效，`None` 表示清除
    DialogTextSound { name: Option<String> },

    /// 屏幕遮罩：淡入到颜色，停留，再淡出
    ///
    /// Host 在完全遮住时回报 `ScreenCovered`，结束时回报 `CoverFinished`。
    CoverScreen {
        hex_color: String,
        fade_in_speed: u32,
        fade_out_speed: u32,
        hold_frames: u32,
    },

    /// 故事结束
    Exit,
}

impl Command {
    /// 对话文本（用于测试和日志）
    pub fn dialog_text(&self) -> Option<&str> {
        match self {
            Command::DialogText { text } => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialog_keywords() {
        assert_eq!("Fade In".parse::<DialogIntro>().unwrap(), DialogIntro::FadeIn);
        assert_eq!(
            "scale down width and height".parse::<DialogOutro>().unwrap(),
            DialogOutro::ScaleDownWidthAndHeight
        );
        assert_eq!("mid bottom".parse::<DialogAnchor>().unwrap(), DialogAnchor::MidBottom);
        assert!("fade in".parse::<DialogOutro>().is_err());
        assert_eq!(
            "gradual letter fade in".parse::<TextIntro>().unwrap(),
            TextIntro::GradualLetterFadeIn
        );
    }

    #[test]
    fn test_command_serialization() {
        let cmd = Command::PlayAudio {
            channel: AudioChannel::Music,
            name: "theme".to_string(),
            looped: true,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"music\""));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn test_dialog_text_accessor() {
        let cmd = Command::DialogText {
            text: "hi".to_string(),
        };
        assert_eq!(cmd.dialog_text(), Some("hi"));
        assert_eq!(Command::Exit.dialog_text(), None);
    }
}
