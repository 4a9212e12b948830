//! # 精灵
//!
//! 精灵的可见性、位置和动画属性。引擎只记录"要做什么"，
//! 每帧的实际插值由 Host 渲染层完成，并回写 `current` 值与动画标志。

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ArgError;

/// 速度百分比（1-100）的合法范围
pub const SPEED_PERCENT_RANGE: std::ops::RangeInclusive<u32> = 1..=100;

/// 淡入淡出方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadeDirection {
    FadeIn,
    FadeOut,
}

impl FromStr for FadeDirection {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fade in" => Ok(Self::FadeIn),
            "fade out" => Ok(Self::FadeOut),
            _ => Err(ArgError::invalid(s, "应为 fade in 或 fade out")),
        }
    }
}

/// 缩放方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleDirection {
    ScaleUp,
    ScaleDown,
}

impl FromStr for ScaleDirection {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scale up" => Ok(Self::ScaleUp),
            "scale down" => Ok(Self::ScaleDown),
            _ => Err(ArgError::invalid(s, "应为 scale up 或 scale down")),
        }
    }
}

/// 旋转方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotateDirection {
    Clockwise,
    Counterclockwise,
}

impl FromStr for RotateDirection {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clockwise" => Ok(Self::Clockwise),
            "counterclockwise" => Ok(Self::Counterclockwise),
            _ => Err(ArgError::invalid(s, "应为 clockwise 或 counterclockwise")),
        }
    }
}

/// 可以单独停止的精灵动画
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpriteAnimation {
    Fade,
    Move,
    Scale,
    Rotate,
}

/// 带方向的速度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speed<D> {
    /// 1-100
    pub percent: u32,
    pub direction: D,
}

impl<D> Speed<D> {
    /// 校验百分比范围
    pub fn new(percent: u32, direction: D) -> Result<Self, ArgError> {
        if !SPEED_PERCENT_RANGE.contains(&percent) {
            return Err(ArgError::invalid(percent.to_string(), "速度应在 1-100 之间"));
        }
        Ok(Self { percent, direction })
    }
}

/// 淡入淡出属性
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FadeProps {
    /// 当前不透明度（0-255）
    pub current: Option<f32>,
    /// 目标不透明度
    pub until: Option<f32>,
    pub speed: Option<Speed<FadeDirection>>,
    pub delay_frames: u32,
    pub is_fading: bool,
    /// 到达目标后运行的可复用脚本
    pub stop_script: Option<String>,
}

impl FadeProps {
    /// 是否仍在淡入淡出
    ///
    /// 设置了目标值时，当前值不等于目标值就算进行中（与方向无关）。
    pub fn in_progress(&self) -> bool {
        if !self.is_fading {
            return false;
        }
        match (self.current, self.until) {
            (Some(current), Some(until)) => current != until,
            _ => true,
        }
    }
}

/// 移动的方向速度（每帧像素）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementSpeed {
    pub x: i32,
    pub y: i32,
}

/// 移动停止条件检查的边
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RectSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl FromStr for RectSide {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            _ => Err(ArgError::invalid(s, "应为 left、right、top 或 bottom")),
        }
    }
}

/// 移动属性
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementProps {
    pub speed: Option<MovementSpeed>,
    /// x / y 方向各自跳过的帧数
    pub delay: (u32, u32),
    /// 停止条件：某条边到达指定像素
    pub stops: Vec<(RectSide, i32)>,
    pub is_moving: bool,
    pub stop_script: Option<String>,
}

impl MovementProps {
    /// 添加停止条件，同一条边只保留最新的一个
    pub fn add_stop(&mut self, side: RectSide, position: i32) {
        self.stops.retain(|(s, _)| *s != side);
        self.stops.push((side, position));
    }
}

/// 缩放属性
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleProps {
    pub current: Option<f32>,
    pub until: Option<f32>,
    pub by: Option<Speed<ScaleDirection>>,
    pub delay_frames: u32,
    pub is_scaling: bool,
    pub stop_script: Option<String>,
}

/// 旋转属性
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RotateProps {
    pub current: Option<f32>,
    /// None 表示一直旋转
    pub until: Option<f32>,
    pub speed: Option<Speed<RotateDirection>>,
    pub delay_frames: u32,
    pub is_rotating: bool,
    pub stop_script: Option<String>,
}

/// 舞台上的一个精灵
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// 资源名（如 `rave_normal`）
    pub name: String,
    /// 通用别名（如 `rave`），脚本通过别名操作可见精灵
    pub general_alias: String,
    pub width: i32,
    pub height: i32,
    /// 左上角坐标
    pub x: i32,
    pub y: i32,
    pub visible: bool,
    pub flipped_horizontally: bool,
    pub flipped_vertically: bool,
    pub fade: FadeProps,
    pub movement: MovementProps,
    pub scale: ScaleProps,
    pub rotation: RotateProps,
}

impl Sprite {
    pub fn new(name: impl Into<String>, general_alias: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            name: name.into(),
            general_alias: general_alias.into(),
            width,
            height,
            x: 0,
            y: 0,
            visible: false,
            flipped_horizontally: false,
            flipped_vertically: false,
            fade: FadeProps::default(),
            movement: MovementProps::default(),
            scale: ScaleProps::default(),
            rotation: RotateProps::default(),
        }
    }

    pub fn start_show(&mut self) {
        self.visible = true;
    }

    pub fn start_hide(&mut self) {
        self.visible = false;
    }

    /// 翻转（每次调用切换一次）
    pub fn flip(&mut self, horizontal: bool, vertical: bool) {
        if horizontal {
            self.flipped_horizontally = !self.flipped_horizontally;
        }
        if vertical {
            self.flipped_vertically = !self.flipped_vertically;
        }
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn set_center(&mut self, center_x: i32, center_y: i32) {
        self.x = center_x - self.width / 2;
        self.y = center_y - self.height / 2;
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// 某种动画停止后要运行的可复用脚本
    pub fn stop_script(&self, animation: SpriteAnimation) -> Option<&str> {
        match animation {
            SpriteAnimation::Fade => self.fade.stop_script.as_deref(),
            SpriteAnimation::Move => self.movement.stop_script.as_deref(),
            SpriteAnimation::Scale => self.scale.stop_script.as_deref(),
            SpriteAnimation::Rotate => self.rotation.stop_script.as_deref(),
        }
    }

    /// 是否有任意动画进行中
    pub fn is_animating(&self) -> bool {
        self.fade.in_progress()
            || self.movement.is_moving
            || self.scale.is_scaling
            || self.rotation.is_rotating
    }

    /// 所有动画都在进行中
    pub fn is_fully_animating(&self) -> bool {
        self.fade.in_progress()
            && self.movement.is_moving
            && self.scale.is_scaling
            && self.rotation.is_rotating
    }
}
