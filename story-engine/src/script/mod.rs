//! # Script 模块
//!
//! 标签脚本的文本层：行分类、参数解码和占位符替换。
//!
//! ## 模块结构
//!
//! - [`line`]：行分类（指令 / 文本 / 注释）
//! - [`args`]：定长参数解码
//! - [`records`]：各指令的参数记录
//! - [`tokens`]：`($var)` / `(@param)` 占位符扫描

pub mod args;
pub mod line;
pub mod records;
pub mod tokens;

pub use args::{ArgField, FreeText, FromArgs, decode};
pub use line::{ScriptLine, classify};
