//! # Engine 模块
//!
//! 故事运行时的帧驱动入口。
//!
//! ## 执行模型
//!
//! ```text
//! tick(input) -> (Vec<Command>, WaitingReason)
//! ```
//!
//! 每次 tick 代表一帧，顺序固定：
//!
//! 1. 处理 Host 输入
//! 2. 应用待切换的场景
//! 3. 推进计时器，为每个到期的计时器启动后台阅读器
//! 4. 执行主阅读器（执行中请求的场景切换立即生效，新的主阅读器再执行一次）
//! 5. 按启动顺序执行本帧开始时已存在的后台阅读器
//! 6. 清理已结束的后台阅读器
//! 7. 返回本帧产生的 Command 与主阅读器的等待状态

use crate::command::Command;
use crate::config::EngineConfig;
use crate::error::RuntimeError;
use crate::history::History;
use crate::input::RuntimeInput;
use crate::runtime::reader::Reader;
use crate::runtime::session::Session;
use crate::stage::{SpriteAnimation, Stage};
use crate::state::{Variables, WaitingReason};
use crate::story::{SceneRef, Story};

/// 故事运行时
///
/// # 使用示例
///
/// ```ignore
/// let story = Story::from_json(&text)?;
/// let mut runtime = StoryRuntime::new(story)?;
///
/// let mut input = None;
/// loop {
///     let (commands, waiting) = runtime.tick(input.take())?;
///
///     // Host 执行 commands，推进精灵动画...
///
///     if waiting == WaitingReason::Finished {
///         break;
///     }
/// }
/// ```
#[derive(Debug)]
pub struct StoryRuntime {
    /// 主阅读器
    main: Reader,
    /// 共享状态
    session: Session,
}

impl StoryRuntime {
    /// 使用默认配置创建
    pub fn new(story: Story) -> Result<Self, RuntimeError> {
        Self::with_config(story, EngineConfig::default())
    }

    /// 创建运行时
    ///
    /// 起始场景优先取配置中的覆盖值，其次是故事自身的起始场景。
    pub fn with_config(story: Story, config: EngineConfig) -> Result<Self, RuntimeError> {
        let startup = config
            .startup
            .clone()
            .or_else(|| story.startup.clone())
            .ok_or(RuntimeError::NoStartupScene)?;
        story.check_scene(&startup.chapter, &startup.scene)?;

        let mut session = Session::new(story, config);
        session.reset_for_scene(&startup);
        Ok(Self {
            main: Reader::main(startup),
            session,
        })
    }

    /// 推进一帧
    ///
    /// # 参数
    ///
    /// - `input`: Host 传入的输入（可选）
    ///
    /// # 返回
    ///
    /// - `Vec<Command>`: 本帧产生的所有指令
    /// - `WaitingReason`: 主阅读器的等待状态
    pub fn tick(
        &mut self,
        input: Option<RuntimeInput>,
    ) -> Result<(Vec<Command>, WaitingReason), RuntimeError> {
        // 1. 输入
        if let Some(input) = input {
            self.handle_input(input)?;
        }

        // 2. 上一帧请求的场景切换
        self.apply_pending_scene()?;

        // 3. 计时器
        for fired in self.session.after.tick() {
            self.session.spawn_background(&fired.name, fired.arguments)?;
        }

        // 4. 主阅读器
        self.apply_pending_scene()?;
        self.main.step(&mut self.session)?;
        if self.apply_pending_scene()? {
            self.main.step(&mut self.session)?;
        }

        // 5. 后台阅读器
        self.step_background()?;

        // 6. 清理
        self.session.background.purge();

        let waiting = self.session.waiting_reason(self.story_finished());
        Ok((self.session.take_commands(), waiting))
    }

    /// 主阅读器结束且没有等待中的场景切换
    fn story_finished(&self) -> bool {
        self.main.is_finished()
            && self.session.pending_scene.is_none()
            && self.session.covered_scene.is_none()
    }

    fn step_background(&mut self) -> Result<(), RuntimeError> {
        let count = self.session.background.len();
        for index in 0..count {
            if self.session.pending_scene.is_some() {
                break;
            }
            let Some(mut reader) = self.session.background.checkout(index) else {
                continue;
            };
            let result = reader.step(&mut self.session);
            self.session.background.checkin(index, reader);
            result?;
        }

        if self.apply_pending_scene()? {
            self.main.step(&mut self.session)?;
        }
        Ok(())
    }

    /// 应用待切换的场景，返回是否发生了切换
    fn apply_pending_scene(&mut self) -> Result<bool, RuntimeError> {
        match self.session.pending_scene.take() {
            Some(scene) => {
                self.switch_scene(scene)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// 切换场景：清空场景相关状态，替换主阅读器
    fn switch_scene(&mut self, scene: SceneRef) -> Result<(), RuntimeError> {
        self.session.story.check_scene(&scene.chapter, &scene.scene)?;
        self.session.reset_for_scene(&scene);
        self.main = Reader::main(scene);
        Ok(())
    }

    /// 处理输入
    fn handle_input(&mut self, input: RuntimeInput) -> Result<(), RuntimeError> {
        match input {
            RuntimeInput::Click => self.session.click()?,
            RuntimeInput::DialogAnimationFinished => self.session.dialog_animation_finished()?,
            RuntimeInput::TextAnimationStarted => self.session.dialog.text_animating = true,
            RuntimeInput::TextAnimationFinished => self.session.dialog.text_animating = false,
            RuntimeInput::SpriteAnimationStopped {
                content_type,
                name,
                animation,
            } => {
                let Some(sprite) = self.session.stage.group_mut(content_type).get_mut(&name)
                else {
                    return Ok(());
                };
                match animation {
                    SpriteAnimation::Fade => sprite.fade.is_fading = false,
                    SpriteAnimation::Move => sprite.movement.is_moving = false,
                    SpriteAnimation::Scale => sprite.scale.is_scaling = false,
                    SpriteAnimation::Rotate => sprite.rotation.is_rotating = false,
                }
                if let Some(script) = sprite.stop_script(animation).map(str::to_string) {
                    self.session.spawn_background(&script, None)?;
                }
            }
            RuntimeInput::ScreenCovered => {
                if let Some(scene) = self.session.covered_scene.take() {
                    self.session.pending_scene = Some(scene);
                }
            }
            RuntimeInput::CoverFinished => self.session.stage.cover_animating = false,
            RuntimeInput::Pause => self.session.pause.manual = true,
            RuntimeInput::Resume => self.session.pause.manual = false,
        }
        Ok(())
    }

    /// 舞台（Host 渲染时读取）
    pub fn stage(&self) -> &Stage {
        &self.session.stage
    }

    /// 舞台（Host 推进动画时回写）
    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.session.stage
    }

    pub fn variables(&self) -> &Variables {
        &self.session.variables
    }

    pub fn variables_mut(&mut self) -> &mut Variables {
        &mut self.session.variables
    }

    /// 获取历史记录
    pub fn history(&self) -> &History {
        &self.session.history
    }

    pub fn config(&self) -> &EngineConfig {
        &self.session.config
    }

    /// 故事是否已经结束
    pub fn is_finished(&self) -> bool {
        self.story_finished()
    }

    /// 主阅读器当前所在的场景
    pub fn current_scene(&self) -> Option<&SceneRef> {
        self.main.scene()
    }

    /// 正在运行的后台阅读器（按启动顺序）
    pub fn background_reader_names(&self) -> Vec<&str> {
        self.session.background.names().collect()
    }

    /// 等待中的计时器（按注册顺序）
    pub fn after_timer_names(&self) -> Vec<&str> {
        self.session.after.names().collect()
    }

    /// 对话框是否可见
    pub fn is_dialog_visible(&self) -> bool {
        self.session.dialog.visible
    }
}
