//! # Runtime 模块
//!
//! 标签脚本执行引擎核心，负责阅读器调度和状态管理。
//!
//! ## 模块结构
//!
//! - [`engine`]：帧驱动入口 [`StoryRuntime`]
//! - [`condition`]：`case` 条件求值与条件块栈
//! - [`after`]：延迟启动可复用脚本的计时器
//! - [`wait`]：`wait_for_animation` 等待规则
//! - [`pause`]：halt / halt_auto / rest 暂停状态
//! - [`dialog`]：对话框状态与钩子脚本
//! - [`reusable`]：可复用脚本的 `(@key)` 参数
//! - `reader`：主阅读器与后台阅读器
//! - `dispatch` / `handlers`：指令表与各指令的处理

pub mod after;
pub mod condition;
pub mod dialog;
pub(crate) mod dispatch;
pub mod engine;
pub(crate) mod handlers;
pub mod pause;
pub(crate) mod reader;
pub mod reusable;
pub(crate) mod session;
pub mod wait;

pub use after::{AfterManager, AfterTimer, FiredTimer};
pub use condition::{ConditionOperator, evaluate, evaluate_text};
pub use dispatch::{CommandKind, SpriteOp};
pub use engine::StoryRuntime;
pub use reusable::ReusableArgs;
pub use wait::{AnimationKind, WaitForAnimation, WaitRule};
