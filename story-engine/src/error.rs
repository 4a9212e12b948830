//! # Error 模块
//!
//! 定义 story-engine 中使用的错误类型。
//!
//! - [`ArgError`]：指令参数解码失败。在分发层被捕获并记录，指令被忽略。
//! - [`RuntimeError`]：脚本作者错误，会中断当前 tick 并返回给 Host。

use thiserror::Error;

/// 参数解码错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgError {
    /// 指令需要参数，但没有提供
    #[error("缺少参数")]
    Missing,

    /// 参数段数与记录字段数不一致
    #[error("参数数量不匹配：期望 {expected} 个，实际 {actual} 个")]
    Arity { expected: usize, actual: usize },

    /// 数值字段无法转换
    #[error("第 {index} 个参数 '{value}' 不是有效的{expected}")]
    NotNumeric {
        index: usize,
        value: String,
        expected: &'static str,
    },

    /// 取值不在允许范围 / 关键字集合内
    #[error("参数 '{value}' 无效：{message}")]
    InvalidValue { value: String, message: String },
}

impl ArgError {
    /// 创建取值无效错误
    pub fn invalid(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            value: value.into(),
            message: message.into(),
        }
    }
}

/// 运行时错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// 可复用脚本引用了未绑定的参数
    #[error("可复用脚本 '{script}' 引用了未绑定的参数 '(@{parameter})'")]
    UnboundParameter { script: String, parameter: String },

    /// 章节不存在
    #[error("章节 '{chapter}' 不存在")]
    UnknownChapter { chapter: String },

    /// 场景不存在
    #[error("章节 '{chapter}' 中不存在场景 '{scene}'")]
    UnknownScene { chapter: String, scene: String },

    /// 对话框尚未定义
    #[error("指令 '{command}' 需要先用 <text_dialog_define> 定义对话框")]
    DialogRectangleUndefined { command: String },

    /// 没有可用的起始场景
    #[error("故事没有配置起始场景")]
    NoStartupScene,
}

/// story-engine 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VnError {
    /// 参数错误
    #[error("参数错误: {0}")]
    Arg(#[from] ArgError),

    /// 运行时错误
    #[error("运行时错误: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Result 类型别名
pub type VnResult<T> = Result<T, VnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RuntimeError::UnboundParameter {
            script: "blink".to_string(),
            parameter: "who".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "可复用脚本 'blink' 引用了未绑定的参数 '(@who)'"
        );

        let err = ArgError::Arity {
            expected: 2,
            actual: 3,
        };
        assert!(err.to_string().contains("期望 2 个"));
    }

    #[test]
    fn test_vn_error_from() {
        let err: VnError = RuntimeError::NoStartupScene.into();
        assert!(matches!(err, VnError::Runtime(RuntimeError::NoStartupScene)));

        let err: VnError = ArgError::Missing.into();
        assert!(matches!(err, VnError::Arg(ArgError::Missing)));
    }
}
