//! # 音频指令

use tracing::warn;

use crate::command::{AudioChannel, Command};
use crate::error::RuntimeError;
use crate::runtime::handlers::decoded;
use crate::runtime::session::Session;
use crate::script::records::{NameArg, Volume};

/// `play_sound` / `play_voice` / `play_music`，音乐循环播放
pub(crate) fn play(session: &mut Session, channel: AudioChannel, command: &str, args: Option<&str>) {
    let Some(NameArg { name }) = decoded(command, args) else {
        return;
    };
    session.emit(Command::PlayAudio {
        channel,
        name,
        looped: channel == AudioChannel::Music,
    });
}

pub(crate) fn stop(session: &mut Session, channel: Option<AudioChannel>) {
    session.emit(Command::StopAudio { channel });
}

/// `volume_*`：0-100
pub(crate) fn volume(
    session: &mut Session,
    channel: AudioChannel,
    command: &str,
    args: Option<&str>,
) {
    let Some(Volume { value }) = decoded(command, args) else {
        return;
    };
    if !(0..=100).contains(&value) {
        warn!(command, value, "音量应在 0-100 之间");
        return;
    }
    session.emit(Command::SetVolume {
        channel,
        volume: value as f32 / 100.0,
    });
}

/// `dialog_text_sound`：需要先定义对话框
pub(crate) fn dialog_text_sound(
    session: &mut Session,
    command: &str,
    args: Option<&str>,
) -> Result<(), RuntimeError> {
    if !session.dialog.is_defined() {
        return Err(RuntimeError::DialogRectangleUndefined {
            command: command.to_string(),
        });
    }
    let Some(NameArg { name }) = decoded(command, args) else {
        return Ok(());
    };
    session.dialog.text_sound = Some(name.clone());
    session.emit(Command::DialogTextSound { name: Some(name) });
    Ok(())
}

pub(crate) fn dialog_text_sound_clear(session: &mut Session) {
    session.dialog.text_sound = None;
    session.emit(Command::DialogTextSound { name: None });
}
