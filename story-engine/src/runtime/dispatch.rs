//! # Dispatch 模块
//!
//! 指令名到处理函数的分发表。
//!
//! 精灵指令由 `<前缀>_<操作>` 组成（前缀为 `character`、`object`、`dialog_sprite`），
//! 其余指令按全名查表。未知指令记录警告后忽略。

use tracing::warn;

use crate::command::AudioChannel;
use crate::error::RuntimeError;
use crate::runtime::handlers::{audio, dialog, flow, sprite};
use crate::runtime::reader::Reader;
use crate::runtime::session::Session;
use crate::stage::ContentType;

/// 指令执行后阅读器的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// 继续读取下一行
    Continue,
    /// 清空队列，结束阅读器（`exit`、`scene`、`scene_with_fade`）
    Finish,
}

/// 带前缀的精灵操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteOp {
    Show,
    Hide,
    HideAll,
    FlipBoth,
    FlipHorizontal,
    FlipVertical,
    SetPositionX,
    SetPositionY,
    SetCenter,
    CenterXWith,
    StopMovementCondition,
    AfterMovementStop,
    Move,
    StartMoving,
    StopMoving,
    MoveDelay,
    FadeUntil,
    FadeCurrentValue,
    FadeSpeed,
    AfterFadingStop,
    FadeDelay,
    StartFading,
    StopFading,
    ScaleBy,
    ScaleUntil,
    ScaleCurrentValue,
    AfterScalingStop,
    ScaleDelay,
    StartScaling,
    StopScaling,
    RotateCurrentValue,
    RotateUntil,
    RotateSpeed,
    AfterRotatingStop,
    RotateDelay,
    StartRotating,
    StopRotating,
}

impl SpriteOp {
    /// 所有操作，顺序与指令文档一致
    pub const ALL: [SpriteOp; 37] = [
        Self::Show,
        Self::Hide,
        Self::HideAll,
        Self::FlipBoth,
        Self::FlipHorizontal,
        Self::FlipVertical,
        Self::SetPositionX,
        Self::SetPositionY,
        Self::SetCenter,
        Self::CenterXWith,
        Self::StopMovementCondition,
        Self::AfterMovementStop,
        Self::Move,
        Self::StartMoving,
        Self::StopMoving,
        Self::MoveDelay,
        Self::FadeUntil,
        Self::FadeCurrentValue,
        Self::FadeSpeed,
        Self::AfterFadingStop,
        Self::FadeDelay,
        Self::StartFading,
        Self::StopFading,
        Self::ScaleBy,
        Self::ScaleUntil,
        Self::ScaleCurrentValue,
        Self::AfterScalingStop,
        Self::ScaleDelay,
        Self::StartScaling,
        Self::StopScaling,
        Self::RotateCurrentValue,
        Self::RotateUntil,
        Self::RotateSpeed,
        Self::AfterRotatingStop,
        Self::RotateDelay,
        Self::StartRotating,
        Self::StopRotating,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Hide => "hide",
            Self::HideAll => "hide_all",
            Self::FlipBoth => "flip_both",
            Self::FlipHorizontal => "flip_horizontal",
            Self::FlipVertical => "flip_vertical",
            Self::SetPositionX => "set_position_x",
            Self::SetPositionY => "set_position_y",
            Self::SetCenter => "set_center",
            Self::CenterXWith => "center_x_with",
            Self::StopMovementCondition => "stop_movement_condition",
            Self::AfterMovementStop => "after_movement_stop",
            Self::Move => "move",
            Self::StartMoving => "start_moving",
            Self::StopMoving => "stop_moving",
            Self::MoveDelay => "move_delay",
            Self::FadeUntil => "fade_until",
            Self::FadeCurrentValue => "fade_current_value",
            Self::FadeSpeed => "fade_speed",
            Self::AfterFadingStop => "after_fading_stop",
            Self::FadeDelay => "fade_delay",
            Self::StartFading => "start_fading",
            Self::StopFading => "stop_fading",
            Self::ScaleBy => "scale_by",
            Self::ScaleUntil => "scale_until",
            Self::ScaleCurrentValue => "scale_current_value",
            Self::AfterScalingStop => "after_scaling_stop",
            Self::ScaleDelay => "scale_delay",
            Self::StartScaling => "start_scaling",
            Self::StopScaling => "stop_scaling",
            Self::RotateCurrentValue => "rotate_current_value",
            Self::RotateUntil => "rotate_until",
            Self::RotateSpeed => "rotate_speed",
            Self::AfterRotatingStop => "after_rotating_stop",
            Self::RotateDelay => "rotate_delay",
            Self::StartRotating => "start_rotating",
            Self::StopRotating => "stop_rotating",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.suffix() == suffix)
    }

    /// `*_after_*_stop` 系列（参数中带可复用脚本名）
    pub fn is_after_stop(self) -> bool {
        matches!(
            self,
            Self::AfterMovementStop
                | Self::AfterFadingStop
                | Self::AfterScalingStop
                | Self::AfterRotatingStop
        )
    }
}

/// 带前缀精灵指令支持的内容类型（背景只有 `background_show` / `background_hide`）
const PREFIXED_GROUPS: [ContentType; 3] = [
    ContentType::DialogSprite,
    ContentType::Character,
    ContentType::Object,
];

/// 指令种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    // 精灵
    LoadSprite(ContentType),
    Sprite(ContentType, SpriteOp),
    BackgroundShow,
    BackgroundHide,

    // 音频
    Play(AudioChannel),
    Stop(Option<AudioChannel>),
    Volume(AudioChannel),
    DialogTextSound,
    DialogTextSoundClear,

    // 对话框与字体
    TextDialogDefine,
    TextDialogShow,
    TextDialogClose,
    Continue,
    NoClear,
    LoadFontSprite,
    Font,
    FontX,
    FontY,
    FontTextFadeSpeed,
    FontTextDelay,
    FontTextDelayPunc,
    FontIntroAnimation,

    // 流程
    Halt,
    HaltAuto,
    Rest,
    WaitForAnimation,
    Call,
    After,
    AfterCancel,
    AfterCancelAll,
    Scene,
    SceneWithFade,
    Exit,
    Case,
    OrCase,
    CaseElse,
    CaseEnd,
    VariableSet,
}

impl CommandKind {
    /// 按指令名查找
    pub fn lookup(name: &str) -> Option<Self> {
        if let Some(kind) = Self::exact(name) {
            return Some(kind);
        }
        // `dialog_sprite` 必须先于其他前缀匹配
        PREFIXED_GROUPS.into_iter().find_map(|group| {
            let suffix = name
                .strip_prefix(group.command_prefix())?
                .strip_prefix('_')?;
            SpriteOp::from_suffix(suffix).map(|op| Self::Sprite(group, op))
        })
    }

    fn exact(name: &str) -> Option<Self> {
        use CommandKind::*;

        let kind = match name {
            "load_character" => LoadSprite(ContentType::Character),
            "load_object" => LoadSprite(ContentType::Object),
            "load_dialog_sprite" => LoadSprite(ContentType::DialogSprite),
            "load_background" => LoadSprite(ContentType::Background),
            "background_show" => BackgroundShow,
            "background_hide" => BackgroundHide,

            "play_sound" => Play(AudioChannel::Fx),
            "play_voice" => Play(AudioChannel::Voice),
            "play_music" => Play(AudioChannel::Music),
            "stop_fx" => Stop(Some(AudioChannel::Fx)),
            "stop_voice" => Stop(Some(AudioChannel::Voice)),
            "stop_music" => Stop(Some(AudioChannel::Music)),
            "stop_all_audio" => Stop(None),
            "volume_fx" => Volume(AudioChannel::Fx),
            "volume_voice" => Volume(AudioChannel::Voice),
            "volume_music" => Volume(AudioChannel::Music),
            "volume_text" => Volume(AudioChannel::Text),
            "dialog_text_sound" => DialogTextSound,
            "dialog_text_sound_clear" => DialogTextSoundClear,

            "text_dialog_define" => TextDialogDefine,
            "text_dialog_show" => TextDialogShow,
            "text_dialog_close" => TextDialogClose,
            "continue" => Continue,
            "no_clear" => NoClear,
            "load_font_sprite" => LoadFontSprite,
            "font" => Font,
            "font_x" => FontX,
            "font_y" => FontY,
            "font_text_fade_speed" => FontTextFadeSpeed,
            "font_text_delay" => FontTextDelay,
            "font_text_delay_punc" => FontTextDelayPunc,
            "font_intro_animation" => FontIntroAnimation,

            "halt" => Halt,
            "halt_auto" => HaltAuto,
            "rest" => Rest,
            "wait_for_animation" => WaitForAnimation,
            "call" => Call,
            "after" => After,
            "after_cancel" => AfterCancel,
            "after_cancel_all" => AfterCancelAll,
            "scene" => Scene,
            "scene_with_fade" => SceneWithFade,
            "exit" => Exit,
            "case" => Case,
            "or_case" => OrCase,
            "case_else" => CaseElse,
            "case_end" => CaseEnd,
            "variable_set" => VariableSet,
            _ => return None,
        };
        Some(kind)
    }
}

/// 执行一条指令
pub(crate) fn run(
    reader: &mut Reader,
    session: &mut Session,
    name: &str,
    args: Option<&str>,
) -> Result<Flow, RuntimeError> {
    let Some(kind) = CommandKind::lookup(name) else {
        warn!(command = name, "未知指令，忽略");
        return Ok(Flow::Continue);
    };

    use CommandKind as K;
    match kind {
        K::LoadSprite(group) => sprite::load(session, group, name, args),
        K::Sprite(group, op) => sprite::run(session, group, op, name, args),
        K::BackgroundShow => sprite::run(session, ContentType::Background, SpriteOp::Show, name, args),
        K::BackgroundHide => sprite::run(session, ContentType::Background, SpriteOp::Hide, name, args),

        K::Play(channel) => audio::play(session, channel, name, args),
        K::Stop(channel) => audio::stop(session, channel),
        K::Volume(channel) => audio::volume(session, channel, name, args),
        K::DialogTextSound => audio::dialog_text_sound(session, name, args)?,
        K::DialogTextSoundClear => audio::dialog_text_sound_clear(session),

        K::TextDialogDefine => dialog::define(session, name, args),
        K::TextDialogShow => session.show_dialog()?,
        K::TextDialogClose => session.close_dialog()?,
        K::Continue => dialog::continue_text(session, name, args),
        K::NoClear => session.dialog.no_clear = true,
        K::LoadFontSprite => dialog::load_font(session, name, args),
        K::Font => dialog::set_font(session, name, args),
        K::FontX | K::FontY => dialog::font_position(session, kind == K::FontX, name, args),
        K::FontTextFadeSpeed => dialog::text_fade_speed(session, name, args),
        K::FontTextDelay => dialog::text_delay(session, name, args),
        K::FontTextDelayPunc => dialog::text_delay_punc(session, name, args),
        K::FontIntroAnimation => dialog::intro_animation(session, name, args),

        K::Halt => session.halt(None)?,
        K::HaltAuto => flow::halt_auto(session, name, args)?,
        K::Rest => flow::rest(session, name, args),
        K::WaitForAnimation => flow::wait_for_animation(session, name, args),
        K::Call => flow::call(session, name, args)?,
        K::After => flow::after(session, name, args),
        K::AfterCancel => flow::after_cancel(session, name, args),
        K::AfterCancelAll => session.after.remove_all_timers(),
        K::Scene => return flow::scene(session, name, args),
        K::SceneWithFade => return flow::scene_with_fade(session, name, args),
        K::Exit => return Ok(flow::exit(reader, session)),
        K::Case => flow::case(reader, name, args),
        K::OrCase => flow::or_case(reader, name, args),
        K::CaseElse => reader.conditions.case_else(),
        K::CaseEnd => reader.conditions.close(),
        K::VariableSet => flow::variable_set(session, name, args),
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_prefixed_sprite_commands() {
        assert_eq!(
            CommandKind::lookup("dialog_sprite_fade_speed"),
            Some(CommandKind::Sprite(ContentType::DialogSprite, SpriteOp::FadeSpeed))
        );
        assert_eq!(
            CommandKind::lookup("character_after_movement_stop"),
            Some(CommandKind::Sprite(ContentType::Character, SpriteOp::AfterMovementStop))
        );
        assert_eq!(
            CommandKind::lookup("object_hide_all"),
            Some(CommandKind::Sprite(ContentType::Object, SpriteOp::HideAll))
        );
        // 背景没有带前缀的动画指令
        assert_eq!(CommandKind::lookup("background_fade_speed"), None);
    }

    #[test]
    fn test_lookup_exact_commands() {
        assert_eq!(
            CommandKind::lookup("load_dialog_sprite"),
            Some(CommandKind::LoadSprite(ContentType::DialogSprite))
        );
        assert_eq!(CommandKind::lookup("stop_all_audio"), Some(CommandKind::Stop(None)));
        assert_eq!(CommandKind::lookup("case_end"), Some(CommandKind::CaseEnd));
        assert_eq!(CommandKind::lookup("character_dance"), None);
        assert_eq!(CommandKind::lookup("Halt"), None);
    }

    #[test]
    fn test_command_table_size() {
        let exact = [
            "load_character", "load_object", "load_dialog_sprite", "load_background",
            "background_show", "background_hide", "play_sound", "play_voice", "play_music",
            "stop_fx", "stop_voice", "stop_music", "stop_all_audio", "volume_fx",
            "volume_voice", "volume_music", "volume_text", "dialog_text_sound",
            "dialog_text_sound_clear", "text_dialog_define", "text_dialog_show",
            "text_dialog_close", "continue", "no_clear", "load_font_sprite", "font", "font_x",
            "font_y", "font_text_fade_speed", "font_text_delay", "font_text_delay_punc",
            "font_intro_animation", "halt", "halt_auto", "rest", "wait_for_animation", "call",
            "after", "after_cancel", "after_cancel_all", "scene", "scene_with_fade", "exit",
            "case", "or_case", "case_else", "case_end", "variable_set",
        ];
        assert!(exact.iter().all(|name| CommandKind::lookup(name).is_some()));

        let prefixed = PREFIXED_GROUPS
            .iter()
            .flat_map(|group| {
                SpriteOp::ALL
                    .iter()
                    .map(move |op| format!("{}_{}", group.command_prefix(), op.suffix()))
            })
            .filter(|name| CommandKind::lookup(name).is_some())
            .count();
        assert_eq!(exact.len() + prefixed, 159);
    }
}
