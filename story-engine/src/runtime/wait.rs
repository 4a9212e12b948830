//! # Wait 模块
//!
//! `<wait_for_animation>` 的等待规则。规则只影响主阅读器。

use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::ArgError;
use crate::stage::{ContentType, Stage};

/// 等待屏幕遮罩动画时使用的关键字
pub const FADE_SCREEN_KEYWORD: &str = "fade screen";

/// 要等待的动画类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    Fade,
    Move,
    Rotate,
    Scale,
    /// 四种动画都在进行
    All,
    /// 任意一种动画在进行
    Any,
}

impl FromStr for AnimationKind {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fade" => Ok(Self::Fade),
            "move" => Ok(Self::Move),
            "rotate" => Ok(Self::Rotate),
            "scale" => Ok(Self::Scale),
            "all" => Ok(Self::All),
            "any" => Ok(Self::Any),
            _ => Err(ArgError::invalid(s, "未知的动画类型")),
        }
    }
}

/// 一条等待规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitRule {
    /// 屏幕遮罩动画
    Cover,
    /// 某个可见精灵的动画
    Sprite {
        group: ContentType,
        alias: String,
        animation: AnimationKind,
    },
}

impl WaitRule {
    /// 规则是否仍然成立
    fn is_live(&self, stage: &Stage) -> bool {
        match self {
            WaitRule::Cover => stage.cover_animating,
            WaitRule::Sprite {
                group,
                alias,
                animation,
            } => {
                let Some(sprite) = stage.visible_sprite(*group, alias) else {
                    return false;
                };
                match animation {
                    AnimationKind::Fade => sprite.fade.in_progress(),
                    AnimationKind::Move => sprite.movement.is_moving,
                    AnimationKind::Rotate => sprite.rotation.is_rotating,
                    AnimationKind::Scale => sprite.scale.is_scaling,
                    AnimationKind::All => sprite.is_fully_animating(),
                    AnimationKind::Any => sprite.is_animating(),
                }
            }
        }
    }
}

/// 等待规则集合
#[derive(Debug, Clone, Default)]
pub struct WaitForAnimation {
    rules: Vec<WaitRule>,
}

impl WaitForAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[WaitRule] {
        &self.rules
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// 等待屏幕遮罩，重复添加无效
    pub fn wait_for_cover(&mut self) {
        if self.rules.contains(&WaitRule::Cover) {
            debug!("已在等待屏幕遮罩");
            return;
        }
        self.rules.push(WaitRule::Cover);
    }

    /// 等待精灵动画
    ///
    /// 类型、别名、动画任一无效时忽略。返回是否添加成功。
    pub fn wait_for_sprite(&mut self, sprite_type: &str, alias: &str, animation: &str) -> bool {
        if alias.is_empty() {
            return false;
        }
        let group = match sprite_type.parse::<ContentType>() {
            Ok(ContentType::Background) | Err(_) => {
                warn!(sprite_type, "wait_for_animation 不支持该精灵类型");
                return false;
            }
            Ok(group) => group,
        };
        let animation = match animation.parse::<AnimationKind>() {
            Ok(animation) => animation,
            Err(e) => {
                warn!(error = %e, "wait_for_animation 动画类型无效");
                return false;
            }
        };

        self.rules.push(WaitRule::Sprite {
            group,
            alias: alias.to_string(),
            animation,
        });
        true
    }

    /// 检查是否需要等待
    ///
    /// 先计算所有规则，再移除已经失效的规则。任一规则成立时返回 true。
    pub fn check_wait(&mut self, stage: &Stage) -> bool {
        let live: Vec<bool> = self.rules.iter().map(|rule| rule.is_live(stage)).collect();
        let any_live = live.iter().any(|l| *l);

        let mut flags = live.into_iter();
        self.rules.retain(|_| flags.next().unwrap_or(false));

        any_live
    }
}
