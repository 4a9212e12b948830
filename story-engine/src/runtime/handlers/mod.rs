//! # Handlers 模块
//!
//! 各类指令的处理函数。
//!
//! 参数解码失败只记录警告，指令被忽略；只有脚本作者错误（场景不存在、
//! 对话框未定义等）才以 [`RuntimeError`](crate::error::RuntimeError) 返回。

pub(crate) mod audio;
pub(crate) mod dialog;
pub(crate) mod flow;
pub(crate) mod sprite;

use tracing::warn;

use crate::script::args::{FromArgs, decode};

/// 解码参数，失败时记录警告
pub(crate) fn decoded<T: FromArgs>(command: &str, args: Option<&str>) -> Option<T> {
    match decode(args) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(command, args = args.unwrap_or_default(), error = %e, "指令参数无效，忽略");
            None
        }
    }
}

/// 按顺序尝试两种参数格式，都失败时按第二种格式记录警告
pub(crate) fn decoded_either<A: FromArgs, B: FromArgs>(
    command: &str,
    args: Option<&str>,
) -> Option<Result<A, B>> {
    if let Ok(first) = decode::<A>(args) {
        return Some(Ok(first));
    }
    decoded::<B>(command, args).map(Err)
}

/// 把超出范围的数值夹到范围内，并记录调试信息
pub(crate) fn clamp_logged(command: &str, value: i32, min: i32, max: i32) -> i32 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        tracing::debug!(command, value, clamped, "参数超出范围，已修正");
    }
    clamped
}
