//! # 对话框与字体指令

use tracing::{debug, warn};

use crate::command::{
    Command, DialogAnchor, DialogIntro, DialogOutro, DialogStyle, TextIntro,
};
use crate::error::ArgError;
use crate::runtime::dialog::DialogHooks;
use crate::runtime::handlers::{clamp_logged, decoded};
use crate::runtime::session::Session;
use crate::script::records::{Continue, DialogDefine, IntArg, NameArg, TextDelayPunc};

/// 解析 `text_dialog_define` 的关键字参数
fn dialog_style(define: &DialogDefine) -> Result<DialogStyle, ArgError> {
    let rounded_corners = match define.rounded_corners.to_lowercase().as_str() {
        "yes" => true,
        "no" => false,
        _ => return Err(ArgError::invalid(&define.rounded_corners, "圆角应为 yes 或 no")),
    };

    Ok(DialogStyle {
        width: define.width,
        height: define.height,
        animation_speed: define.animation_speed,
        intro: define.intro_animation.parse::<DialogIntro>()?,
        outro: define.outro_animation.parse::<DialogOutro>()?,
        anchor: define.anchor.parse::<DialogAnchor>()?,
        bg_color_hex: define.bg_color_hex.clone(),
        padding_x: define.padding_x,
        padding_y: define.padding_y,
        opacity: define.opacity,
        rounded_corners,
        border_color_hex: define.border_color_hex.clone(),
        border_opacity: define.border_opacity,
        border_width: define.border_width,
    })
}

/// `text_dialog_define`
///
/// 对话框可见时忽略。没有动画的进场/退场不会运行对应的 starting 脚本。
pub(crate) fn define(session: &mut Session, command: &str, args: Option<&str>) {
    if session.dialog.visible {
        warn!(command, "对话框可见时不能重新定义，忽略");
        return;
    }
    let Some(define) = decoded::<DialogDefine>(command, args) else {
        return;
    };
    let style = match dialog_style(&define) {
        Ok(style) => style,
        Err(e) => {
            warn!(command, error = %e, "对话框定义无效，忽略");
            return;
        }
    };

    let mut hooks = DialogHooks {
        intro_starting: DialogHooks::hook(&define.reusable_on_intro_starting),
        intro_finished: DialogHooks::hook(&define.reusable_on_intro_finished),
        outro_starting: DialogHooks::hook(&define.reusable_on_outro_starting),
        outro_finished: DialogHooks::hook(&define.reusable_on_outro_finished),
        on_halt: DialogHooks::hook(&define.reusable_on_halt),
        on_unhalt: DialogHooks::hook(&define.reusable_on_unhalt),
    };
    if style.intro == DialogIntro::NoAnimation {
        hooks.intro_starting = None;
    }
    if style.outro == DialogOutro::NoAnimation {
        hooks.outro_starting = None;
    }

    session.dialog.hooks = hooks;
    session.dialog.style = Some(style.clone());
    session.emit(Command::DefineDialog { style });
}

/// `continue[: adjust_y]`
pub(crate) fn continue_text(session: &mut Session, command: &str, args: Option<&str>) {
    let adjust_y = match args {
        None => None,
        Some(_) => match decoded::<Continue>(command, args) {
            Some(Continue { adjust_y }) => Some(adjust_y),
            None => return,
        },
    };
    session.emit(Command::ContinueText { adjust_y });
}

/// `load_font_sprite`
pub(crate) fn load_font(session: &mut Session, command: &str, args: Option<&str>) {
    let Some(NameArg { name }) = decoded(command, args) else {
        return;
    };
    if !session.story.has_font(&name) {
        warn!(command, name = %name, "字体不存在");
        return;
    }
    if session.dialog.loaded_fonts.insert(name.clone()) {
        session.emit(Command::LoadFont { name });
    } else {
        debug!(command, name = %name, "字体已加载");
    }
}

/// `font`：切换到已加载的字体
pub(crate) fn set_font(session: &mut Session, command: &str, args: Option<&str>) {
    let Some(NameArg { name }) = decoded(command, args) else {
        return;
    };
    if !session.dialog.loaded_fonts.contains(&name) {
        warn!(command, name = %name, "字体尚未加载");
        return;
    }
    session.dialog.active_font = Some(name.clone());
    session.emit(Command::SetFont { name });
}

/// `font_x` / `font_y`
pub(crate) fn font_position(
    session: &mut Session,
    horizontal: bool,
    command: &str,
    args: Option<&str>,
) {
    let Some(IntArg { value }) = decoded(command, args) else {
        return;
    };
    let (x, y) = if horizontal {
        (Some(value), None)
    } else {
        (None, Some(value))
    };
    session.emit(Command::FontPosition { x, y });
}

/// `font_text_fade_speed`：1-10
pub(crate) fn text_fade_speed(session: &mut Session, command: &str, args: Option<&str>) {
    let Some(IntArg { value }) = decoded(command, args) else {
        return;
    };
    session.emit(Command::FontTextFadeSpeed {
        speed: clamp_logged(command, value, 1, 10),
    });
}

/// `font_text_delay`：0-600
pub(crate) fn text_delay(session: &mut Session, command: &str, args: Option<&str>) {
    let Some(IntArg { value }) = decoded(command, args) else {
        return;
    };
    session.emit(Command::FontTextDelay {
        frames: clamp_logged(command, value, 0, 600),
    });
}

/// `font_text_delay_punc`：0-150
pub(crate) fn text_delay_punc(session: &mut Session, command: &str, args: Option<&str>) {
    let Some(TextDelayPunc {
        previous_letter,
        frames,
    }) = decoded(command, args)
    else {
        return;
    };
    if previous_letter.is_empty() {
        warn!(command, "需要指定标点");
        return;
    }
    session.emit(Command::FontTextDelayPunc {
        previous_letter,
        frames: clamp_logged(command, frames, 0, 150),
    });
}

/// `font_intro_animation`
pub(crate) fn intro_animation(session: &mut Session, command: &str, args: Option<&str>) {
    let Some(NameArg { name }) = decoded(command, args) else {
        return;
    };
    match name.parse::<TextIntro>() {
        Ok(animation) => session.emit(Command::FontIntroAnimation { animation }),
        Err(e) => warn!(command, error = %e, "文字出现方式无效，忽略"),
    }
}
