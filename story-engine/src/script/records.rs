//! # 参数记录
//!
//! 各指令的参数记录定义。字段顺序即脚本中参数的顺序。

use crate::script::args::{FreeText, arg_record};

arg_record! {
    /// `load_*`：精灵名与通用别名
    pub struct LoadSprite {
        name: String,
        alias: String,
    }

    /// 只有一个名称的指令（`*_show`、`play_*`、`font` 等）
    pub struct NameArg {
        name: String,
    }

    /// 只有一个别名的精灵指令
    pub struct AliasArg {
        alias: String,
    }

    /// `*_set_position_x` / `*_set_position_y`
    pub struct SetPosition {
        alias: String,
        position: String,
    }

    /// `*_set_center`
    pub struct SetCenter {
        alias: String,
        x: i32,
        y: i32,
    }

    /// `*_center_x_with`
    pub struct CenterXWith {
        alias: String,
        other_type: String,
        other_alias: String,
    }

    /// `*_stop_movement_condition`（指定检查边）
    pub struct StopMovementSide {
        alias: String,
        side: String,
        position: String,
    }

    /// `*_stop_movement_condition`（默认检查边）
    pub struct StopMovementWhere {
        alias: String,
        position: String,
    }

    /// `*_after_*_stop`：动画停止后运行的可复用脚本
    pub struct AfterStop {
        alias: String,
        script: String,
    }

    /// `*_move`
    pub struct Move {
        alias: String,
        x: i32,
        x_direction: String,
        y: i32,
        y_direction: String,
    }

    /// `*_move_delay`
    pub struct MoveDelay {
        alias: String,
        x: u32,
        y: u32,
    }

    /// `*_fade_delay` / `*_scale_delay` / `*_rotate_delay`
    pub struct AliasFrames {
        alias: String,
        frames: u32,
    }

    /// `*_fade_until`、`*_scale_current_value` 等带一个数值的指令
    pub struct AliasValue {
        alias: String,
        value: f32,
    }

    /// `*_rotate_until`：角度或 `forever`
    pub struct AliasKeyword {
        alias: String,
        value: String,
    }

    /// `*_fade_speed` / `*_scale_by` / `*_rotate_speed`
    pub struct AliasSpeed {
        alias: String,
        percent: u32,
        direction: String,
    }

    /// `volume_*`
    pub struct Volume {
        value: i32,
    }

    /// `font_x` / `font_y` / `font_text_fade_speed` / `font_text_delay`
    pub struct IntArg {
        value: i32,
    }

    /// `font_text_delay_punc`
    pub struct TextDelayPunc {
        previous_letter: String,
        frames: i32,
    }

    /// `continue`
    pub struct Continue {
        adjust_y: i32,
    }

    /// `halt_auto` / `rest`
    pub struct Frames {
        frames: u32,
    }

    /// `wait_for_animation: fade screen`
    pub struct WaitForScreen {
        target: String,
    }

    /// `wait_for_animation: 类型, 别名, 动画`
    pub struct WaitForSprite {
        sprite_type: String,
        alias: String,
        animation: String,
    }

    /// `call: 名称, 参数列表`
    pub struct CallWithArgs {
        name: String,
        arguments: FreeText,
    }

    /// `after: 帧数, 名称`
    pub struct After {
        frames: u32,
        name: String,
    }

    /// `after: 帧数, 名称, 参数列表`
    pub struct AfterWithArgs {
        frames: u32,
        name: String,
        arguments: FreeText,
    }

    /// `scene`
    pub struct Scene {
        chapter: String,
        scene: String,
    }

    /// `scene_with_fade`
    pub struct SceneWithFade {
        hex_color: String,
        fade_in_speed: u32,
        fade_out_speed: u32,
        hold_frames: u32,
        chapter: String,
        scene: String,
    }

    /// `case`（自动生成条件名）
    pub struct Case {
        value1: String,
        operator: String,
        value2: String,
    }

    /// `case`（指定条件名）
    pub struct NamedCase {
        value1: String,
        operator: String,
        value2: String,
        name: String,
    }

    /// `or_case`
    pub struct OrCase {
        name: String,
        value1: String,
        operator: String,
        value2: String,
    }

    /// `variable_set`
    pub struct VariableSet {
        name: String,
        value: FreeText,
    }

    /// `text_dialog_define`
    pub struct DialogDefine {
        width: i32,
        height: i32,
        animation_speed: f32,
        intro_animation: String,
        outro_animation: String,
        anchor: String,
        bg_color_hex: String,
        padding_x: i32,
        padding_y: i32,
        opacity: i32,
        rounded_corners: String,
        reusable_on_intro_starting: String,
        reusable_on_intro_finished: String,
        reusable_on_outro_starting: String,
        reusable_on_outro_finished: String,
        reusable_on_halt: String,
        reusable_on_unhalt: String,
        border_color_hex: String,
        border_opacity: i32,
        border_width: i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::args::{FromArgs, decode};

    #[test]
    fn test_dialog_define_arity() {
        assert_eq!(DialogDefine::ARITY, 20);

        let raw = "500, 200, 8.5, fade in, fade out, mid bottom, #202020, 20, 20, 200, yes, \
                   intro_start, none, , , halt_fx, , #ffffff, 255, 2";
        let define: DialogDefine = decode(Some(raw)).unwrap();
        assert_eq!(define.width, 500);
        assert_eq!(define.animation_speed, 8.5);
        assert_eq!(define.anchor, "mid bottom");
        assert_eq!(define.reusable_on_intro_starting, "intro_start");
        assert_eq!(define.reusable_on_outro_starting, "");
        assert_eq!(define.border_width, 2);
    }

    #[test]
    fn test_scene_with_fade_order() {
        let fade: SceneWithFade = decode(Some("#000000, 20, 15, 30, Chapter2, Intro")).unwrap();
        assert_eq!(fade.hex_color, "#000000");
        assert_eq!(fade.hold_frames, 30);
        assert_eq!(fade.chapter, "Chapter2");
        assert_eq!(fade.scene, "Intro");
    }

    #[test]
    fn test_negative_frames_rejected() {
        assert!(decode::<Frames>(Some("-5")).is_err());
        assert_eq!(decode::<Frames>(Some("5")).unwrap().frames, 5);
    }
}
