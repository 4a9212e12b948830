//! # Session 模块
//!
//! 一次运行的全部共享状态。主阅读器和所有后台阅读器都通过会话修改状态，
//! 没有任何全局变量。

use tracing::{debug, info, warn};

use crate::command::{Command, DialogIntro, DialogOutro};
use crate::config::EngineConfig;
use crate::error::RuntimeError;
use crate::history::{History, HistoryEvent};
use crate::runtime::after::AfterManager;
use crate::runtime::dialog::{DialogPhase, DialogState};
use crate::runtime::pause::{HaltTick, PauseState};
use crate::runtime::reader::{BackgroundReaders, Reader};
use crate::runtime::reusable::ReusableArgs;
use crate::runtime::wait::WaitForAnimation;
use crate::stage::{ContentType, Stage};
use crate::state::{Variables, WaitingReason};
use crate::story::{SceneRef, Story};

/// 运行会话
#[derive(Debug)]
pub struct Session {
    pub(crate) config: EngineConfig,
    pub(crate) story: Story,
    pub(crate) stage: Stage,
    pub(crate) variables: Variables,
    pub(crate) after: AfterManager,
    pub(crate) pause: PauseState,
    pub(crate) wait: WaitForAnimation,
    pub(crate) dialog: DialogState,
    pub(crate) background: BackgroundReaders,
    pub(crate) history: History,
    /// 本帧内要切换到的场景
    pub(crate) pending_scene: Option<SceneRef>,
    /// 屏幕遮住后要切换到的场景
    pub(crate) covered_scene: Option<SceneRef>,
    commands: Vec<Command>,
}

impl Session {
    pub(crate) fn new(story: Story, config: EngineConfig) -> Self {
        Self {
            stage: Stage::new(config.display_width, config.display_height),
            history: History::new().with_max_events(config.history_limit),
            config,
            story,
            variables: Variables::new(),
            after: AfterManager::new(),
            pause: PauseState::default(),
            wait: WaitForAnimation::new(),
            dialog: DialogState::default(),
            background: BackgroundReaders::default(),
            pending_scene: None,
            covered_scene: None,
            commands: Vec::new(),
        }
    }

    pub(crate) fn emit(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub(crate) fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// 主阅读器当前的暂停原因
    ///
    /// 等待规则在这里被计算，失效的规则随之移除。
    pub(crate) fn pause_reason(&mut self) -> Option<WaitingReason> {
        if self.dialog.animating.is_some() {
            return Some(WaitingReason::DialogAnimation);
        }
        if self.pause.halt.is_halted() {
            return Some(if self.pause.halt.is_auto() {
                WaitingReason::HaltAuto {
                    remaining_frames: self.pause.halt.remaining(),
                }
            } else {
                WaitingReason::Halt
            });
        }
        if self.pause.rest.pause_required() {
            return Some(WaitingReason::Rest {
                remaining_frames: self.pause.rest.remaining(),
            });
        }
        if self.wait.check_wait(&self.stage) {
            return Some(WaitingReason::WaitForAnimation);
        }
        if self.pause.manual {
            return Some(WaitingReason::Manual);
        }
        None
    }

    pub(crate) fn main_should_pause(&mut self) -> bool {
        self.pause_reason().is_some()
    }

    pub(crate) fn waiting_reason(&mut self, main_finished: bool) -> WaitingReason {
        match self.pause_reason() {
            Some(reason) => reason,
            None if main_finished => WaitingReason::Finished,
            None => WaitingReason::None,
        }
    }

    /// 暂停期间每帧推进 halt_auto 与 rest 计数
    pub(crate) fn elapse_pause_counters(&mut self) -> Result<(), RuntimeError> {
        if self.pause.halt.tick(self.dialog.text_animating) == HaltTick::Expired {
            self.unhalt()?;
        }
        self.pause.rest.tick();
        Ok(())
    }

    /// 显示一行对话文本
    pub(crate) fn show_dialog_text(&mut self, text: &str) {
        self.history.push(HistoryEvent::dialogue(text.to_string()));
        self.emit(Command::DialogText {
            text: text.to_string(),
        });
    }

    /// 启动后台阅读器
    ///
    /// 同名阅读器已存在或脚本不存在时无操作。新阅读器会立即执行一次。
    pub(crate) fn spawn_background(
        &mut self,
        name: &str,
        arguments: Option<ReusableArgs>,
    ) -> Result<(), RuntimeError> {
        if name.is_empty() {
            return Ok(());
        }
        if self.background.contains(name) {
            debug!(name, "可复用脚本已在运行，忽略");
            return Ok(());
        }
        let Some(text) = self.story.reusable(name) else {
            warn!(name, "可复用脚本不存在");
            return Ok(());
        };

        debug!(name, "启动可复用脚本");
        let mut reader = Reader::background(name, text, arguments);
        self.history
            .push(HistoryEvent::reusable_started(name.to_string()));

        let index = self.background.reserve(name);
        let result = reader.step(self);
        self.background.checkin(index, reader);
        result
    }

    fn spawn_hook(&mut self, hook: Option<String>) -> Result<(), RuntimeError> {
        match hook {
            Some(name) => self.spawn_background(&name, None),
            None => Ok(()),
        }
    }

    /// `<halt>` / `<halt_auto>`
    ///
    /// 已经暂停或对话框尚未定义时无操作。
    pub(crate) fn halt(&mut self, auto_frames: Option<u32>) -> Result<(), RuntimeError> {
        if !self.dialog.is_defined() {
            warn!("对话框尚未定义，halt 被忽略");
            return Ok(());
        }
        if !self.pause.halt.halt(auto_frames) {
            return Ok(());
        }
        if self.dialog.visible {
            self.emit(Command::StartTextAnimation);
        }
        self.spawn_hook(self.dialog.hooks.on_halt.clone())
    }

    /// 解除 halt
    pub(crate) fn unhalt(&mut self) -> Result<(), RuntimeError> {
        self.pause.halt.unhalt();
        self.dialog.text_animating = false;
        if self.dialog.no_clear {
            self.dialog.no_clear = false;
        } else {
            self.emit(Command::ClearText);
        }
        self.spawn_hook(self.dialog.hooks.on_unhalt.clone())
    }

    /// 点击：文字动画中则加速，否则解除需要点击的 halt
    pub(crate) fn click(&mut self) -> Result<(), RuntimeError> {
        if self.dialog.text_animating {
            self.emit(Command::SpeedUpText);
            return Ok(());
        }
        if self.pause.halt.is_halted() && !self.pause.halt.is_auto() {
            self.unhalt()?;
        }
        Ok(())
    }

    /// `<text_dialog_show>`
    pub(crate) fn show_dialog(&mut self) -> Result<(), RuntimeError> {
        let Some(style) = &self.dialog.style else {
            warn!("对话框尚未定义，无法显示");
            return Ok(());
        };
        if self.dialog.visible || self.dialog.animating.is_some() {
            return Ok(());
        }

        let animated = style.intro != DialogIntro::NoAnimation;
        self.dialog.visible = true;
        self.emit(Command::ShowDialog { animated });
        if animated {
            self.dialog.animating = Some(DialogPhase::Intro);
            self.spawn_hook(self.dialog.hooks.intro_starting.clone())
        } else {
            self.spawn_hook(self.dialog.hooks.intro_finished.clone())
        }
    }

    /// `<text_dialog_close>`
    pub(crate) fn close_dialog(&mut self) -> Result<(), RuntimeError> {
        let Some(style) = &self.dialog.style else {
            return Ok(());
        };
        if !self.dialog.visible || self.dialog.animating.is_some() {
            return Ok(());
        }

        let animated = style.outro != DialogOutro::NoAnimation;
        self.emit(Command::HideDialog { animated });
        if animated {
            self.dialog.animating = Some(DialogPhase::Outro);
            self.spawn_hook(self.dialog.hooks.outro_starting.clone())
        } else {
            self.finish_outro()
        }
    }

    fn finish_outro(&mut self) -> Result<(), RuntimeError> {
        self.dialog.visible = false;
        self.stage.group_mut(ContentType::DialogSprite).hide_all();
        self.spawn_hook(self.dialog.hooks.outro_finished.clone())
    }

    /// Host 回报对话框动画结束
    pub(crate) fn dialog_animation_finished(&mut self) -> Result<(), RuntimeError> {
        match self.dialog.animating.take() {
            Some(DialogPhase::Intro) => self.spawn_hook(self.dialog.hooks.intro_finished.clone()),
            Some(DialogPhase::Outro) => self.finish_outro(),
            None => {
                debug!("没有进行中的对话框动画");
                Ok(())
            }
        }
    }

    /// 切换场景前清空与场景相关的状态
    pub(crate) fn reset_for_scene(&mut self, scene: &SceneRef) {
        info!(scene = %scene, "切换场景");
        self.background.clear();
        self.after.remove_all_timers();
        let manual = self.pause.manual;
        self.pause.reset();
        self.pause.manual = manual;
        self.wait.clear();
        self.stage.clear_sprites();
        self.covered_scene = None;
        self.history.push(HistoryEvent::scene_change(
            scene.chapter.clone(),
            scene.scene.clone(),
        ));
    }
}
