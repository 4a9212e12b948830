//! # Story Engine
//!
//! 标签脚本视觉小说引擎的核心运行时库。
//!
//! ## 架构概述
//!
//! `story-engine` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 它通过 **命令驱动模式** 与宿主层（Host）通信：
//!
//! ```text
//! Host                          Runtime
//!   │                              │
//!   │──── RuntimeInput ──────────►│
//!   │                              │ tick()
//!   │◄─── (Vec<Command>, WaitingReason) ──│
//!   │                              │
//! ```
//!
//! 精灵的逐帧动画由 Host 推进，运行时只维护舞台上的目标状态，
//! Host 通过 [`StoryRuntime::stage_mut`] 回写动画进度，
//! 并在动画结束时发送 [`RuntimeInput::SpriteAnimationStopped`]。
//!
//! ## 核心类型
//!
//! - [`Story`]：章节、场景、可复用脚本与资源清单
//! - [`StoryRuntime`]：主阅读器与后台阅读器的调度器
//! - [`Command`]：Runtime 向 Host 发出的指令
//! - [`RuntimeInput`]：Host 向 Runtime 传递的输入
//! - [`WaitingReason`]：主阅读器的等待状态
//!
//! ## 使用示例
//!
//! ```ignore
//! use story_engine::{RuntimeInput, Story, StoryRuntime, WaitingReason};
//!
//! let story = Story::from_json(&text)?;
//! let mut runtime = StoryRuntime::new(story)?;
//!
//! let mut input = None;
//! loop {
//!     let (commands, waiting) = runtime.tick(input.take())?;
//!
//!     for cmd in commands {
//!         host.execute(cmd);
//!     }
//!
//!     input = match waiting {
//!         WaitingReason::Finished => break,
//!         WaitingReason::Halt => wait_for_click(),
//!         _ => host.poll_input(),
//!     };
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`story`]：故事数据
//! - [`script`]：行分类、参数解码、占位符
//! - [`runtime`]：执行引擎
//! - [`stage`]：舞台与精灵状态
//! - [`command`] / [`input`] / [`state`]：Host 通信
//! - [`diagnostic`]：静态检查
//! - [`config`] / [`error`] / [`history`]

pub mod command;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod history;
pub mod input;
pub mod runtime;
pub mod script;
pub mod stage;
pub mod state;
pub mod story;

// 重导出核心类型
pub use command::{
    AudioChannel, Command, DialogAnchor, DialogIntro, DialogOutro, DialogStyle, TextIntro,
};
pub use config::EngineConfig;
pub use diagnostic::{
    Diagnostic, DiagnosticLevel, DiagnosticResult, ScriptKind, analyze_script, analyze_story,
};
pub use error::{ArgError, RuntimeError, VnError, VnResult};
pub use history::{History, HistoryEvent};
pub use input::RuntimeInput;
pub use runtime::{CommandKind, SpriteOp, StoryRuntime};
pub use stage::{ContentType, Sprite, SpriteAnimation, Stage};
pub use state::{Variables, WaitingReason};
pub use story::{Chapter, SceneRef, SpriteAsset, Story};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        // 验证所有公共类型都可以正常使用
        let story = Story::new()
            .with_startup("c1", "s1")
            .with_chapter("c1", "")
            .with_scene("c1", "s1", "Hello");

        assert!(!analyze_story(&story).has_errors());

        let mut runtime = StoryRuntime::new(story).unwrap();
        let (commands, waiting) = runtime.tick(Some(RuntimeInput::Click)).unwrap();
        assert_eq!(commands.iter().filter_map(Command::dialog_text).count(), 1);
        assert_eq!(waiting, WaitingReason::Finished);
        assert_eq!(CommandKind::lookup("halt"), Some(CommandKind::Halt));
    }
}
