//! # 精灵指令
//!
//! `load_*`、`background_show`、以及所有 `<前缀>_<操作>` 指令。
//!
//! 精灵通过 `(内容类型, 通用别名)` 在可见精灵中定位，找不到时指令无效。

use tracing::{debug, warn};

use crate::runtime::dialog::DialogHooks;
use crate::runtime::dispatch::SpriteOp;
use crate::runtime::handlers::{decoded, decoded_either};
use crate::runtime::session::Session;
use crate::script::records::{
    AfterStop, AliasArg, AliasFrames, AliasKeyword, AliasSpeed, AliasValue, CenterXWith,
    LoadSprite, Move, MoveDelay, NameArg, SetCenter, SetPosition, StopMovementSide,
    StopMovementWhere,
};
use crate::stage::{
    ContentType, FadeDirection, MovementSpeed, PositionX, PositionY, RectSide, RotateDirection,
    ScaleDirection, Speed, Sprite, Stage,
};

/// 不透明度范围
const ALPHA_MAX: f32 = 255.0;

/// `load_*`
///
/// 已加载的精灵只更新别名。
pub(crate) fn load(session: &mut Session, group: ContentType, command: &str, args: Option<&str>) {
    let (name, alias) = if group == ContentType::Background {
        match decoded_either::<LoadSprite, NameArg>(command, args) {
            Some(Ok(LoadSprite { name, alias })) => (name, alias),
            Some(Err(NameArg { name })) => (name.clone(), name),
            None => return,
        }
    } else {
        let Some(LoadSprite { name, alias }) = decoded(command, args) else {
            return;
        };
        (name, alias)
    };

    let Some(asset) = session.story.sprite_asset(group, &name) else {
        warn!(command, name = %name, "精灵资源不存在");
        return;
    };

    let sprites = session.stage.group_mut(group);
    if let Some(existing) = sprites.get_mut(&name) {
        existing.general_alias = alias;
        return;
    }
    debug!(command, name = %name, alias = %alias, "加载精灵");
    sprites.insert(Sprite::new(name, alias, asset.width, asset.height));
}

/// 查找可见精灵
fn target<'a>(
    stage: &'a mut Stage,
    group: ContentType,
    command: &str,
    alias: &str,
) -> Option<&'a mut Sprite> {
    let sprite = stage.visible_sprite_mut(group, alias);
    if sprite.is_none() {
        debug!(command, alias, "没有该别名的可见精灵");
    }
    sprite
}

/// 只需要别名的操作
fn with_alias(
    session: &mut Session,
    group: ContentType,
    command: &str,
    args: Option<&str>,
    action: impl FnOnce(&mut Sprite),
) {
    let Some(AliasArg { alias }) = decoded(command, args) else {
        return;
    };
    if let Some(sprite) = target(&mut session.stage, group, command, &alias) {
        action(sprite);
    }
}

/// `*_after_*_stop` 的脚本名
fn stop_script(
    session: &mut Session,
    group: ContentType,
    command: &str,
    args: Option<&str>,
    slot: impl FnOnce(&mut Sprite) -> &mut Option<String>,
) {
    let Some(AfterStop { alias, script }) = decoded(command, args) else {
        return;
    };
    if let Some(sprite) = target(&mut session.stage, group, command, &alias) {
        *slot(sprite) = DialogHooks::hook(&script);
    }
}

/// 延迟帧数
fn delay(
    session: &mut Session,
    group: ContentType,
    command: &str,
    args: Option<&str>,
    slot: impl FnOnce(&mut Sprite) -> &mut u32,
) {
    let Some(AliasFrames { alias, frames }) = decoded(command, args) else {
        return;
    };
    if let Some(sprite) = target(&mut session.stage, group, command, &alias) {
        *slot(sprite) = frames;
    }
}

/// 带一个数值的操作
fn value(
    session: &mut Session,
    group: ContentType,
    command: &str,
    args: Option<&str>,
    action: impl FnOnce(&mut Sprite, f32),
) {
    let Some(AliasValue { alias, value }) = decoded(command, args) else {
        return;
    };
    if let Some(sprite) = target(&mut session.stage, group, command, &alias) {
        action(sprite, value);
    }
}

/// 速度百分比与方向
fn speed<D: std::str::FromStr<Err = crate::error::ArgError>>(
    command: &str,
    args: Option<&str>,
) -> Option<(String, Speed<D>)> {
    let AliasSpeed {
        alias,
        percent,
        direction,
    } = decoded(command, args)?;
    let speed = direction
        .parse::<D>()
        .and_then(|direction| Speed::new(percent, direction));
    match speed {
        Ok(speed) => Some((alias, speed)),
        Err(e) => {
            warn!(command, error = %e, "速度参数无效，忽略");
            None
        }
    }
}

/// 执行带前缀的精灵指令
pub(crate) fn run(
    session: &mut Session,
    group: ContentType,
    op: SpriteOp,
    command: &str,
    args: Option<&str>,
) {
    match op {
        SpriteOp::Show => show(session, group, command, args),
        SpriteOp::Hide => with_alias(session, group, command, args, Sprite::start_hide),
        SpriteOp::HideAll => session.stage.group_mut(group).hide_all(),
        SpriteOp::FlipBoth => with_alias(session, group, command, args, |s| s.flip(true, true)),
        SpriteOp::FlipHorizontal => {
            with_alias(session, group, command, args, |s| s.flip(true, false))
        }
        SpriteOp::FlipVertical => {
            with_alias(session, group, command, args, |s| s.flip(false, true))
        }
        SpriteOp::SetPositionX | SpriteOp::SetPositionY => {
            set_position(session, group, op == SpriteOp::SetPositionX, command, args)
        }
        SpriteOp::SetCenter => {
            let Some(SetCenter { alias, x, y }) = decoded(command, args) else {
                return;
            };
            if let Some(sprite) = target(&mut session.stage, group, command, &alias) {
                sprite.set_center(x, y);
            }
        }
        SpriteOp::CenterXWith => center_x_with(session, group, command, args),
        SpriteOp::StopMovementCondition => stop_movement_condition(session, group, command, args),
        SpriteOp::AfterMovementStop => {
            stop_script(session, group, command, args, |s| &mut s.movement.stop_script)
        }
        SpriteOp::Move => start_move(session, group, command, args),
        SpriteOp::StartMoving => {
            with_alias(session, group, command, args, |s| s.movement.is_moving = true)
        }
        SpriteOp::StopMoving => with_alias(session, group, command, args, |s| {
            s.movement.is_moving = false;
            s.movement.stop_script = None;
        }),
        SpriteOp::MoveDelay => {
            let Some(MoveDelay { alias, x, y }) = decoded(command, args) else {
                return;
            };
            if let Some(sprite) = target(&mut session.stage, group, command, &alias) {
                sprite.movement.delay = (x, y);
            }
        }

        SpriteOp::FadeUntil => value(session, group, command, args, |s, v| {
            s.fade.until = Some(v.clamp(0.0, ALPHA_MAX));
        }),
        SpriteOp::FadeCurrentValue => value(session, group, command, args, |s, v| {
            s.fade.current = Some(v.clamp(0.0, ALPHA_MAX));
        }),
        SpriteOp::FadeSpeed => {
            let Some((alias, speed)) = speed::<FadeDirection>(command, args) else {
                return;
            };
            if let Some(sprite) = target(&mut session.stage, group, command, &alias) {
                if sprite.fade.current.is_none() {
                    sprite.fade.current = Some(match speed.direction {
                        FadeDirection::FadeOut => ALPHA_MAX,
                        FadeDirection::FadeIn => 0.0,
                    });
                }
                sprite.fade.speed = Some(speed);
            }
        }
        SpriteOp::AfterFadingStop => {
            stop_script(session, group, command, args, |s| &mut s.fade.stop_script)
        }
        SpriteOp::FadeDelay => delay(session, group, command, args, |s| &mut s.fade.delay_frames),
        SpriteOp::StartFading => {
            with_alias(session, group, command, args, |s| s.fade.is_fading = true)
        }
        SpriteOp::StopFading => {
            with_alias(session, group, command, args, |s| s.fade.is_fading = false)
        }

        SpriteOp::ScaleBy => {
            let Some((alias, speed)) = speed::<ScaleDirection>(command, args) else {
                return;
            };
            if let Some(sprite) = target(&mut session.stage, group, command, &alias) {
                sprite.scale.by = Some(speed);
            }
        }
        SpriteOp::ScaleUntil => value(session, group, command, args, |s, v| {
            s.scale.until = Some(v.max(0.0));
        }),
        SpriteOp::ScaleCurrentValue => value(session, group, command, args, |s, v| {
            s.scale.current = Some(v.max(0.0));
        }),
        SpriteOp::AfterScalingStop => {
            stop_script(session, group, command, args, |s| &mut s.scale.stop_script)
        }
        SpriteOp::ScaleDelay => {
            delay(session, group, command, args, |s| &mut s.scale.delay_frames)
        }
        SpriteOp::StartScaling => {
            with_alias(session, group, command, args, |s| s.scale.is_scaling = true)
        }
        SpriteOp::StopScaling => {
            with_alias(session, group, command, args, |s| s.scale.is_scaling = false)
        }

        SpriteOp::RotateCurrentValue => value(session, group, command, args, |s, v| {
            s.rotation.current = Some(v);
        }),
        SpriteOp::RotateUntil => rotate_until(session, group, command, args),
        SpriteOp::RotateSpeed => {
            let Some((alias, speed)) = speed::<RotateDirection>(command, args) else {
                return;
            };
            if let Some(sprite) = target(&mut session.stage, group, command, &alias) {
                sprite.rotation.speed = Some(speed);
            }
        }
        SpriteOp::AfterRotatingStop => {
            stop_script(session, group, command, args, |s| &mut s.rotation.stop_script)
        }
        SpriteOp::RotateDelay => {
            delay(session, group, command, args, |s| &mut s.rotation.delay_frames)
        }
        SpriteOp::StartRotating => {
            with_alias(session, group, command, args, |s| s.rotation.is_rotating = true)
        }
        SpriteOp::StopRotating => {
            with_alias(session, group, command, args, |s| s.rotation.is_rotating = false)
        }
    }
}

/// `*_show`：按资源名显示
///
/// 背景会隐藏其他所有背景；其他类型如果已有同别名的可见精灵，
/// 新精灵继承它的状态（中心位置、翻转、动画属性），旧精灵隐藏。
fn show(session: &mut Session, group: ContentType, command: &str, args: Option<&str>) {
    let Some(NameArg { name }) = decoded(command, args) else {
        return;
    };
    let sprites = session.stage.group_mut(group);
    let Some(sprite) = sprites.get(&name) else {
        warn!(command, name = %name, "精灵尚未加载");
        return;
    };
    if sprite.visible {
        return;
    }
    let (alias, width, height) = (sprite.general_alias.clone(), sprite.width, sprite.height);

    if group == ContentType::Background {
        sprites.hide_all();
    } else if let Some(previous) = sprites.visible_by_alias(&alias).cloned() {
        let (center_x, center_y) = previous.center();
        let mut replacement = previous.clone();
        replacement.name = name;
        replacement.width = width;
        replacement.height = height;
        replacement.set_center(center_x, center_y);
        sprites.insert(replacement);
        if let Some(old) = sprites.get_mut(&previous.name) {
            old.start_hide();
        }
        return;
    }

    if let Some(sprite) = sprites.get_mut(&name) {
        sprite.start_show();
    }
}

fn set_position(
    session: &mut Session,
    group: ContentType,
    horizontal: bool,
    command: &str,
    args: Option<&str>,
) {
    let Some(SetPosition { alias, position }) = decoded(command, args) else {
        return;
    };
    let stage = &mut session.stage;
    let Some(sprite) = stage.visible_sprite(group, &alias) else {
        debug!(command, alias = %alias, "没有该别名的可见精灵");
        return;
    };

    let resolved = if horizontal {
        position
            .parse::<PositionX>()
            .map(|p| stage.resolve_x(p, sprite.width))
    } else {
        position
            .parse::<PositionY>()
            .map(|p| stage.resolve_y(p, sprite.height))
    };
    let coordinate = match resolved {
        Ok(coordinate) => coordinate,
        Err(e) => {
            warn!(command, error = %e, "位置参数无效，忽略");
            return;
        }
    };

    if let Some(sprite) = stage.visible_sprite_mut(group, &alias) {
        if horizontal {
            sprite.x = coordinate;
        } else {
            sprite.y = coordinate;
        }
    }
}

/// `*_center_x_with`：与另一个可见精灵水平居中对齐
fn center_x_with(session: &mut Session, group: ContentType, command: &str, args: Option<&str>) {
    let Some(CenterXWith {
        alias,
        other_type,
        other_alias,
    }) = decoded(command, args)
    else {
        return;
    };
    let other_group = match other_type.parse::<ContentType>() {
        Ok(other_group) => other_group,
        Err(e) => {
            warn!(command, error = %e, "精灵类型无效，忽略");
            return;
        }
    };
    let Some(other) = session.stage.visible_sprite(other_group, &other_alias) else {
        debug!(command, other_alias = %other_alias, "没有对齐目标");
        return;
    };
    let (center_x, _) = other.center();

    if let Some(sprite) = target(&mut session.stage, group, command, &alias) {
        sprite.x = center_x - sprite.width / 2;
    }
}

/// `*_stop_movement_condition`
///
/// 三个参数时指定检查边与像素；两个参数时使用位置关键字，检查边由关键字决定。
fn stop_movement_condition(
    session: &mut Session,
    group: ContentType,
    command: &str,
    args: Option<&str>,
) {
    let stage = &mut session.stage;
    let (alias, stop) = match decoded_either::<StopMovementSide, StopMovementWhere>(command, args) {
        Some(Ok(StopMovementSide {
            alias,
            side,
            position,
        })) => {
            let stop = side.parse::<RectSide>().and_then(|side| {
                position
                    .parse::<i32>()
                    .map(|position| (side, position))
                    .map_err(|_| crate::error::ArgError::invalid(&position, "应为像素值"))
            });
            match stop {
                Ok(stop) => (alias, stop),
                Err(e) => {
                    warn!(command, error = %e, "停止条件无效，忽略");
                    return;
                }
            }
        }
        Some(Err(StopMovementWhere { alias, position })) => {
            let Some(sprite) = stage.visible_sprite(group, &alias) else {
                debug!(command, alias = %alias, "没有该别名的可见精灵");
                return;
            };
            let stop = match (position.parse::<PositionX>(), position.parse::<PositionY>()) {
                (Ok(x), _) => stage.stop_condition_x(x, sprite.width),
                (_, Ok(y)) => stage.stop_condition_y(y, sprite.height),
                _ => None,
            };
            let Some(stop) = stop else {
                warn!(command, position = %position, "停止位置需要关键字，或同时指定检查边");
                return;
            };
            (alias, stop)
        }
        None => return,
    };

    if let Some(sprite) = target(stage, group, command, &alias) {
        sprite.movement.add_stop(stop.0, stop.1);
    }
}

/// `*_move`：设置每帧移动的像素与方向
fn start_move(session: &mut Session, group: ContentType, command: &str, args: Option<&str>) {
    let Some(Move {
        alias,
        x,
        x_direction,
        y,
        y_direction,
    }) = decoded(command, args)
    else {
        return;
    };

    let x_sign = match x_direction.to_lowercase().as_str() {
        "left" => -1,
        "right" => 1,
        _ => {
            warn!(command, x_direction = %x_direction, "水平方向应为 left 或 right");
            return;
        }
    };
    let y_sign = match y_direction.to_lowercase().as_str() {
        "up" => -1,
        "down" => 1,
        _ => {
            warn!(command, y_direction = %y_direction, "垂直方向应为 up 或 down");
            return;
        }
    };

    if let Some(sprite) = target(&mut session.stage, group, command, &alias) {
        sprite.movement.speed = Some(MovementSpeed {
            x: x.abs() * x_sign,
            y: y.abs() * y_sign,
        });
    }
}

/// `*_rotate_until`：角度或 `forever`
fn rotate_until(session: &mut Session, group: ContentType, command: &str, args: Option<&str>) {
    let Some(AliasKeyword { alias, value }) = decoded(command, args) else {
        return;
    };
    let until = if value.eq_ignore_ascii_case("forever") {
        None
    } else {
        match value.parse::<f32>() {
            Ok(degrees) => Some(degrees),
            Err(_) => {
                warn!(command, value = %value, "旋转目标应为角度或 forever");
                return;
            }
        }
    };
    if let Some(sprite) = target(&mut session.stage, group, command, &alias) {
        sprite.rotation.until = until;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::story::Story;

    fn session() -> Session {
        let story = Story::new()
            .with_sprite(ContentType::Character, "rave_normal", 100, 200)
            .with_sprite(ContentType::Character, "rave_happy", 120, 220)
            .with_sprite(ContentType::Background, "park", 640, 480)
            .with_sprite(ContentType::Background, "school", 640, 480);
        Session::new(story, EngineConfig::default())
    }

    fn exec(session: &mut Session, command: &str, args: &str) {
        let kind = crate::runtime::dispatch::CommandKind::lookup(command).unwrap();
        match kind {
            crate::runtime::dispatch::CommandKind::LoadSprite(group) => {
                load(session, group, command, Some(args))
            }
            crate::runtime::dispatch::CommandKind::Sprite(group, op) => {
                run(session, group, op, command, Some(args))
            }
            crate::runtime::dispatch::CommandKind::BackgroundShow => {
                run(session, ContentType::Background, SpriteOp::Show, command, Some(args))
            }
            other => panic!("不是精灵指令: {other:?}"),
        }
    }

    fn rave(session: &Session) -> &Sprite {
        session
            .stage
            .visible_sprite(ContentType::Character, "rave")
            .unwrap()
    }

    #[test]
    fn test_show_swaps_sprite_with_same_alias() {
        let mut session = session();
        exec(&mut session, "load_character", "rave_normal, rave");
        exec(&mut session, "load_character", "rave_happy, rave");
        exec(&mut session, "character_show", "rave_normal");
        exec(&mut session, "character_set_center", "rave, 300, 240");
        exec(&mut session, "character_flip_horizontal", "rave");
        exec(&mut session, "character_fade_until", "rave, 128");

        exec(&mut session, "character_show", "rave_happy");
        let sprite = rave(&session);
        assert_eq!(sprite.name, "rave_happy");
        assert_eq!(sprite.center(), (300, 240));
        assert!(sprite.flipped_horizontally);
        assert_eq!(sprite.fade.until, Some(128.0));

        // 旧精灵已隐藏
        let group = session.stage.group(ContentType::Character);
        assert!(!group.get("rave_normal").unwrap().visible);
        assert_eq!(group.visible().count(), 1);
    }

    #[test]
    fn test_background_show_hides_others() {
        let mut session = session();
        exec(&mut session, "load_background", "park");
        exec(&mut session, "load_background", "school");
        exec(&mut session, "background_show", "park");
        exec(&mut session, "background_show", "school");

        let group = session.stage.group(ContentType::Background);
        let visible: Vec<_> = group.visible().map(|s| s.name.as_str()).collect();
        assert_eq!(visible, vec!["school"]);
    }

    #[test]
    fn test_position_and_movement() {
        let mut session = session();
        exec(&mut session, "load_character", "rave_normal, rave");
        exec(&mut session, "character_show", "rave_normal");
        exec(&mut session, "character_set_position_x", "rave, end of display");
        exec(&mut session, "character_set_position_y", "rave, 30");
        assert_eq!((rave(&session).x, rave(&session).y), (540, 30));

        exec(&mut session, "character_move", "rave, 3, left, 1, down");
        exec(&mut session, "character_stop_movement_condition", "rave, before start of display");
        exec(&mut session, "character_stop_movement_condition", "rave, top, 10");
        exec(&mut session, "character_after_movement_stop", "rave, arrived");
        exec(&mut session, "character_start_moving", "rave");

        let movement = &rave(&session).movement;
        assert_eq!(movement.speed, Some(MovementSpeed { x: -3, y: 1 }));
        assert_eq!(
            movement.stops,
            vec![(RectSide::Left, -100), (RectSide::Top, 10)]
        );
        assert_eq!(movement.stop_script.as_deref(), Some("arrived"));
        assert!(movement.is_moving);

        exec(&mut session, "character_stop_moving", "rave");
        assert!(!rave(&session).movement.is_moving);
        assert_eq!(rave(&session).movement.stop_script, None);
    }

    #[test]
    fn test_fade_speed_initializes_current() {
        let mut session = session();
        exec(&mut session, "load_character", "rave_normal, rave");
        exec(&mut session, "character_show", "rave_normal");
        exec(&mut session, "character_fade_speed", "rave, 5, fade out");
        assert_eq!(rave(&session).fade.current, Some(255.0));

        // 超出范围的速度被忽略
        exec(&mut session, "character_fade_speed", "rave, 0, fade in");
        assert_eq!(
            rave(&session).fade.speed.map(|s| s.direction),
            Some(FadeDirection::FadeOut)
        );

        exec(&mut session, "character_fade_current_value", "rave, 300");
        assert_eq!(rave(&session).fade.current, Some(255.0));
    }

    #[test]
    fn test_rotate_until_forever() {
        let mut session = session();
        exec(&mut session, "load_character", "rave_normal, rave");
        exec(&mut session, "character_show", "rave_normal");
        exec(&mut session, "character_rotate_until", "rave, 90");
        assert_eq!(rave(&session).rotation.until, Some(90.0));
        exec(&mut session, "character_rotate_until", "rave, forever");
        assert_eq!(rave(&session).rotation.until, None);
    }

    #[test]
    fn test_missing_sprite_is_noop() {
        let mut session = session();
        exec(&mut session, "load_character", "ghost, rave");
        assert!(session.stage.group(ContentType::Character).is_empty());
        exec(&mut session, "character_flip_both", "rave");
        exec(&mut session, "character_show", "rave_normal");
        assert!(session.stage.group(ContentType::Character).is_empty());
    }
}
