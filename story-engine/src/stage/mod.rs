//! # Stage 模块
//!
//! 舞台上的精灵注册表，按内容类型分组。
//!
//! Host 渲染层读取舞台状态进行绘制，并在动画推进时回写动画属性。
//! 脚本通过 `(内容类型, 通用别名)` 定位当前可见的精灵。

pub mod sprite;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::ArgError;

pub use sprite::{
    FadeDirection, FadeProps, MovementProps, MovementSpeed, RectSide, RotateDirection,
    RotateProps, ScaleDirection, ScaleProps, Speed, Sprite, SpriteAnimation,
};

/// 精灵内容类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Background,
    Character,
    Object,
    DialogSprite,
}

impl ContentType {
    /// 指令名前缀（`character_show` 中的 `character`）
    pub fn command_prefix(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Character => "character",
            Self::Object => "object",
            Self::DialogSprite => "dialog_sprite",
        }
    }
}

impl FromStr for ContentType {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "background" => Ok(Self::Background),
            "character" => Ok(Self::Character),
            "object" => Ok(Self::Object),
            "dialog sprite" => Ok(Self::DialogSprite),
            _ => Err(ArgError::invalid(s, "未知的精灵类型")),
        }
    }
}

/// 水平位置关键字
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionX {
    StartOfDisplay,
    EndOfDisplay,
    BeforeStartOfDisplay,
    AfterEndOfDisplay,
    Absolute(i32),
}

impl FromStr for PositionX {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start of display" => Ok(Self::StartOfDisplay),
            "end of display" => Ok(Self::EndOfDisplay),
            "before start of display" => Ok(Self::BeforeStartOfDisplay),
            "after end of display" => Ok(Self::AfterEndOfDisplay),
            other => other
                .parse()
                .map(Self::Absolute)
                .map_err(|_| ArgError::invalid(s, "未知的水平位置")),
        }
    }
}

/// 垂直位置关键字
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionY {
    TopOfDisplay,
    BottomOfDisplay,
    AboveTopOfDisplay,
    BelowBottomOfDisplay,
    Absolute(i32),
}

impl FromStr for PositionY {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "top of display" => Ok(Self::TopOfDisplay),
            "bottom of display" => Ok(Self::BottomOfDisplay),
            "above top of display" => Ok(Self::AboveTopOfDisplay),
            "below bottom of display" => Ok(Self::BelowBottomOfDisplay),
            other => other
                .parse()
                .map(Self::Absolute)
                .map_err(|_| ArgError::invalid(s, "未知的垂直位置")),
        }
    }
}

/// 一组同类型的精灵，以资源名为键
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpriteGroup {
    sprites: BTreeMap<String, Sprite>,
}

impl SpriteGroup {
    pub fn insert(&mut self, sprite: Sprite) {
        self.sprites.insert(sprite.name.clone(), sprite);
    }

    pub fn get(&self, name: &str) -> Option<&Sprite> {
        self.sprites.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Sprite> {
        self.sprites.get_mut(name)
    }

    /// 按别名查找可见精灵
    pub fn visible_by_alias(&self, alias: &str) -> Option<&Sprite> {
        self.sprites
            .values()
            .find(|s| s.visible && s.general_alias == alias)
    }

    pub fn visible_by_alias_mut(&mut self, alias: &str) -> Option<&mut Sprite> {
        self.sprites
            .values_mut()
            .find(|s| s.visible && s.general_alias == alias)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.values()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.values().filter(|s| s.visible)
    }

    pub fn hide_all(&mut self) {
        for sprite in self.sprites.values_mut() {
            sprite.start_hide();
        }
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
    }
}

/// 舞台
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// 显示区域尺寸
    pub display_width: i32,
    pub display_height: i32,
    background: SpriteGroup,
    character: SpriteGroup,
    object: SpriteGroup,
    dialog: SpriteGroup,
    /// 屏幕遮罩（`scene_with_fade`）动画是否进行中
    pub cover_animating: bool,
}

impl Stage {
    pub fn new(display_width: i32, display_height: i32) -> Self {
        Self {
            display_width,
            display_height,
            background: SpriteGroup::default(),
            character: SpriteGroup::default(),
            object: SpriteGroup::default(),
            dialog: SpriteGroup::default(),
            cover_animating: false,
        }
    }

    pub fn group(&self, content_type: ContentType) -> &SpriteGroup {
        match content_type {
            ContentType::Background => &self.background,
            ContentType::Character => &self.character,
            ContentType::Object => &self.object,
            ContentType::DialogSprite => &self.dialog,
        }
    }

    pub fn group_mut(&mut self, content_type: ContentType) -> &mut SpriteGroup {
        match content_type {
            ContentType::Background => &mut self.background,
            ContentType::Character => &mut self.character,
            ContentType::Object => &mut self.object,
            ContentType::DialogSprite => &mut self.dialog,
        }
    }

    pub fn visible_sprite(&self, content_type: ContentType, alias: &str) -> Option<&Sprite> {
        self.group(content_type).visible_by_alias(alias)
    }

    pub fn visible_sprite_mut(
        &mut self,
        content_type: ContentType,
        alias: &str,
    ) -> Option<&mut Sprite> {
        self.group_mut(content_type).visible_by_alias_mut(alias)
    }

    /// 清空所有精灵（切换场景时），遮罩状态保留
    pub fn clear_sprites(&mut self) {
        self.background.clear();
        self.character.clear();
        self.object.clear();
        self.dialog.clear();
    }

    /// 将水平位置关键字换算为精灵左边缘坐标
    pub fn resolve_x(&self, position: PositionX, sprite_width: i32) -> i32 {
        match position {
            PositionX::StartOfDisplay => 0,
            PositionX::EndOfDisplay => self.display_width - sprite_width,
            PositionX::BeforeStartOfDisplay => -sprite_width,
            PositionX::AfterEndOfDisplay => self.display_width,
            PositionX::Absolute(x) => x,
        }
    }

    /// 将垂直位置关键字换算为精灵上边缘坐标
    pub fn resolve_y(&self, position: PositionY, sprite_height: i32) -> i32 {
        match position {
            PositionY::TopOfDisplay => 0,
            PositionY::BottomOfDisplay => self.display_height - sprite_height,
            PositionY::AboveTopOfDisplay => -sprite_height,
            PositionY::BelowBottomOfDisplay => self.display_height,
            PositionY::Absolute(y) => y,
        }
    }

    /// 移动停止条件：关键字换算为 (检查边, 像素)
    pub fn stop_condition_x(&self, position: PositionX, sprite_width: i32) -> Option<(RectSide, i32)> {
        let stop = match position {
            PositionX::BeforeStartOfDisplay => (RectSide::Left, -sprite_width),
            PositionX::StartOfDisplay => (RectSide::Left, 0),
            PositionX::EndOfDisplay => (RectSide::Right, self.display_width),
            PositionX::AfterEndOfDisplay => (RectSide::Left, self.display_width),
            PositionX::Absolute(_) => return None,
        };
        Some(stop)
    }

    pub fn stop_condition_y(&self, position: PositionY, sprite_height: i32) -> Option<(RectSide, i32)> {
        let stop = match position {
            PositionY::AboveTopOfDisplay => (RectSide::Top, -sprite_height),
            PositionY::TopOfDisplay => (RectSide::Top, 0),
            PositionY::BottomOfDisplay => (RectSide::Bottom, self.display_height),
            PositionY::BelowBottomOfDisplay => (RectSide::Top, self.display_height),
            PositionY::Absolute(_) => return None,
        };
        Some(stop)
    }
}
