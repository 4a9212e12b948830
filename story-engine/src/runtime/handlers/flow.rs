//! # 流程指令
//!
//! 暂停、可复用脚本、计时器、场景切换、条件块与变量。

use tracing::{debug, info, warn};

use crate::command::Command;
use crate::error::RuntimeError;
use crate::runtime::condition::{evaluate_text, random_condition_name};
use crate::runtime::dispatch::Flow;
use crate::runtime::handlers::{decoded, decoded_either};
use crate::runtime::reader::Reader;
use crate::runtime::reusable::ReusableArgs;
use crate::runtime::session::Session;
use crate::runtime::wait::FADE_SCREEN_KEYWORD;
use crate::script::records::{
    After, AfterWithArgs, CallWithArgs, Case, Frames, NameArg, NamedCase, OrCase, Scene,
    SceneWithFade, VariableSet, WaitForScreen, WaitForSprite,
};
use crate::story::SceneRef;

/// `halt_auto: 帧数`
pub(crate) fn halt_auto(
    session: &mut Session,
    command: &str,
    args: Option<&str>,
) -> Result<(), RuntimeError> {
    let Some(Frames { frames }) = decoded(command, args) else {
        return Ok(());
    };
    if frames == 0 {
        warn!(command, "帧数必须大于 0");
        return Ok(());
    }
    session.halt(Some(frames))
}

/// `rest: 帧数`，正在休息时延长
pub(crate) fn rest(session: &mut Session, command: &str, args: Option<&str>) {
    let Some(Frames { frames }) = decoded(command, args) else {
        return;
    };
    if frames == 0 {
        warn!(command, "帧数必须大于 0");
        return;
    }
    session.pause.rest.setup(frames);
}

/// `wait_for_animation: fade screen` 或 `wait_for_animation: 类型, 别名, 动画`
pub(crate) fn wait_for_animation(session: &mut Session, command: &str, args: Option<&str>) {
    match decoded_either::<WaitForSprite, WaitForScreen>(command, args) {
        Some(Ok(WaitForSprite {
            sprite_type,
            alias,
            animation,
        })) => {
            session.wait.wait_for_sprite(&sprite_type, &alias, &animation);
        }
        Some(Err(WaitForScreen { target })) => {
            if target.eq_ignore_ascii_case(FADE_SCREEN_KEYWORD) {
                session.wait.wait_for_cover();
            } else {
                warn!(command, target = %target, "未知的等待目标");
            }
        }
        None => {}
    }
}

/// 解析可复用脚本参数，失败时记录警告
fn reusable_args(command: &str, raw: &str) -> Option<ReusableArgs> {
    match ReusableArgs::parse(raw) {
        Ok(arguments) => Some(arguments),
        Err(e) => {
            warn!(command, error = %e, "可复用脚本参数无效，忽略");
            None
        }
    }
}

/// `call: 名称[, key=value, ...]`
pub(crate) fn call(
    session: &mut Session,
    command: &str,
    args: Option<&str>,
) -> Result<(), RuntimeError> {
    let (name, arguments) = match decoded_either::<CallWithArgs, NameArg>(command, args) {
        Some(Ok(CallWithArgs { name, arguments })) => {
            let Some(arguments) = reusable_args(command, arguments.as_str()) else {
                return Ok(());
            };
            (name, Some(arguments))
        }
        Some(Err(NameArg { name })) => (name, None),
        None => return Ok(()),
    };
    session.spawn_background(&name, arguments)
}

/// `after: 帧数, 名称[, key=value, ...]`
pub(crate) fn after(session: &mut Session, command: &str, args: Option<&str>) {
    let (frames, name, arguments) = match decoded_either::<AfterWithArgs, After>(command, args) {
        Some(Ok(AfterWithArgs {
            frames,
            name,
            arguments,
        })) => {
            let Some(arguments) = reusable_args(command, arguments.as_str()) else {
                return;
            };
            (frames, name, Some(arguments))
        }
        Some(Err(After { frames, name })) => (frames, name, None),
        None => return,
    };
    if session.story.reusable(&name).is_none() {
        warn!(command, name = %name, "可复用脚本不存在");
        return;
    }
    session.after.add_timer(&name, frames, arguments);
}

/// `after_cancel: 名称`
pub(crate) fn after_cancel(session: &mut Session, command: &str, args: Option<&str>) {
    if let Some(NameArg { name }) = decoded(command, args) {
        session.after.remove_timer(&name);
    }
}

/// `scene: 章节, 场景`
///
/// 场景不存在是脚本错误。切换在本帧内由调度器完成。
pub(crate) fn scene(
    session: &mut Session,
    command: &str,
    args: Option<&str>,
) -> Result<Flow, RuntimeError> {
    let Some(Scene { chapter, scene }) = decoded(command, args) else {
        return Ok(Flow::Continue);
    };
    session.story.check_scene(&chapter, &scene)?;
    session.pending_scene = Some(SceneRef::new(chapter, scene));
    Ok(Flow::Finish)
}

/// `scene_with_fade`：先遮住屏幕，Host 回报遮住后再切换场景
pub(crate) fn scene_with_fade(
    session: &mut Session,
    command: &str,
    args: Option<&str>,
) -> Result<Flow, RuntimeError> {
    let Some(SceneWithFade {
        hex_color,
        fade_in_speed,
        fade_out_speed,
        hold_frames,
        chapter,
        scene,
    }) = decoded(command, args)
    else {
        return Ok(Flow::Continue);
    };
    session.story.check_scene(&chapter, &scene)?;

    info!(chapter = %chapter, scene = %scene, "遮住屏幕后切换场景");
    session.emit(Command::CoverScreen {
        hex_color,
        fade_in_speed,
        fade_out_speed,
        hold_frames,
    });
    session.stage.cover_animating = true;
    session.covered_scene = Some(SceneRef::new(chapter, scene));
    Ok(Flow::Finish)
}

/// `exit`：结束当前阅读器，主阅读器还会结束故事
pub(crate) fn exit(reader: &Reader, session: &mut Session) -> Flow {
    if reader.is_main() {
        session.emit(Command::Exit);
    }
    Flow::Finish
}

/// `case: 值1, 运算符, 值2[, 条件名]`
pub(crate) fn case(reader: &mut Reader, command: &str, args: Option<&str>) {
    if reader.conditions.is_skipping() {
        reader.conditions.enter_inert();
        return;
    }
    let (value1, operator, value2, name) = match decoded_either::<NamedCase, Case>(command, args) {
        Some(Ok(NamedCase {
            value1,
            operator,
            value2,
            name,
        })) => (value1, operator, value2, name),
        Some(Err(Case {
            value1,
            operator,
            value2,
        })) => (value1, operator, value2, random_condition_name()),
        None => {
            // 无法解析的条件视为不成立，块内内容全部跳过
            (String::new(), String::new(), String::new(), random_condition_name())
        }
    };
    let passed = !operator.is_empty() && evaluate_text(&value1, &operator, &value2);
    debug!(condition = %name, passed, "case");
    reader.conditions.open(passed, name);
}

/// `or_case: 条件名, 值1, 运算符, 值2`
pub(crate) fn or_case(reader: &mut Reader, command: &str, args: Option<&str>) {
    if !reader.conditions.is_skipping() {
        return;
    }
    let Some(OrCase {
        name,
        value1,
        operator,
        value2,
    }) = decoded(command, args)
    else {
        return;
    };
    reader
        .conditions
        .or_case(&name, || evaluate_text(&value1, &operator, &value2));
}

/// `variable_set: 名称, 值`
pub(crate) fn variable_set(session: &mut Session, command: &str, args: Option<&str>) {
    let Some(VariableSet { name, value }) = decoded(command, args) else {
        return;
    };
    if !session.variables.set(&name, value.as_str()) {
        warn!(command, name = %name, "变量名无效（不能为空或包含 \\/,()$:<> 和空格）");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::story::Story;

    fn session() -> Session {
        let story = Story::new()
            .with_chapter("c1", "")
            .with_scene("c1", "s1", "")
            .with_reusable("sparkle", "");
        Session::new(story, EngineConfig::default())
    }

    #[test]
    fn test_scene_targets() {
        let mut session = session();
        assert_eq!(
            scene(&mut session, "scene", Some("c1, s1")).unwrap(),
            Flow::Finish
        );
        assert_eq!(session.pending_scene, Some(SceneRef::new("c1", "s1")));

        let err = scene(&mut session, "scene", Some("c1, missing")).unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownScene { .. }));
        let err = scene_with_fade(&mut session, "scene_with_fade", Some("#000, 5, 5, 10, c9, s1"))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownChapter { .. }));
    }

    #[test]
    fn test_scene_with_fade_covers_first() {
        let mut session = session();
        let flow =
            scene_with_fade(&mut session, "scene_with_fade", Some("#000000, 5, 4, 10, c1, s1"))
                .unwrap();
        assert_eq!(flow, Flow::Finish);
        assert!(session.stage.cover_animating);
        assert_eq!(session.pending_scene, None);
        assert_eq!(session.covered_scene, Some(SceneRef::new("c1", "s1")));
        assert_eq!(
            session.take_commands(),
            vec![Command::CoverScreen {
                hex_color: "#000000".to_string(),
                fade_in_speed: 5,
                fade_out_speed: 4,
                hold_frames: 10
            }]
        );
    }

    #[test]
    fn test_after_with_arguments() {
        let mut session = session();
        after(&mut session, "after", Some("30, sparkle, colour=red, size=2"));
        after(&mut session, "after", Some("10, missing"));
        after(&mut session, "after", Some("10, sparkle, broken"));
        assert_eq!(session.after.names().collect::<Vec<_>>(), vec!["sparkle"]);

        after_cancel(&mut session, "after_cancel", Some("sparkle"));
        assert!(session.after.is_empty());
    }

    #[test]
    fn test_rest_requires_frames() {
        let mut session = session();
        rest(&mut session, "rest", Some("0"));
        assert!(!session.pause.rest.pause_required());
        rest(&mut session, "rest", Some("3"));
        assert!(session.pause.rest.pause_required());
    }

    #[test]
    fn test_case_blocks() {
        let mut reader = Reader::main(SceneRef::new("c1", "s1"));
        case(&mut reader, "case", Some("5, more than, 3"));
        assert!(!reader.conditions.is_skipping());
        case(&mut reader, "case", Some("5, less than, 3, low"));
        assert_eq!(reader.conditions.skipping_name(), Some("low"));

        // 跳过区域内的嵌套 case 整块跳过
        case(&mut reader, "case", Some("1, is, 1"));
        assert_eq!(reader.conditions.depth(), 3);
        reader.conditions.close();

        or_case(&mut reader, "or_case", Some("other, 1, is, 1"));
        assert!(reader.conditions.is_skipping());
        or_case(&mut reader, "or_case", Some("low, a, is, a"));
        assert!(!reader.conditions.is_skipping());
    }

    #[test]
    fn test_variable_set_validates_name() {
        let mut session = session();
        variable_set(&mut session, "variable_set", Some("name, Rave, the brave"));
        variable_set(&mut session, "variable_set", Some("bad name, x"));
        assert_eq!(session.variables.get("name"), Some("Rave, the brave"));
        assert_eq!(session.variables.len(), 1);
    }
}
