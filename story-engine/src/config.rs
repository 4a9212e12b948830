//! # Config 模块
//!
//! 引擎配置。所有字段都有默认值，配置文件中可以只写需要覆盖的项。

use serde::{Deserialize, Serialize};

use crate::story::SceneRef;

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 显示区域宽度（位置关键字按此换算）
    #[serde(default = "default_display_width")]
    pub display_width: i32,

    /// 显示区域高度
    #[serde(default = "default_display_height")]
    pub display_height: i32,

    /// 历史记录最大条数
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// `($name)` 嵌套替换的最大轮数
    #[serde(default = "default_variable_passes")]
    pub variable_passes: usize,

    /// 覆盖故事数据中的起始场景
    #[serde(default)]
    pub startup: Option<SceneRef>,
}

fn default_display_width() -> i32 {
    640
}

fn default_display_height() -> i32 {
    480
}

fn default_history_limit() -> usize {
    1000
}

fn default_variable_passes() -> usize {
    4
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            display_width: default_display_width(),
            display_height: default_display_height(),
            history_limit: default_history_limit(),
            variable_passes: default_variable_passes(),
            startup: None,
        }
    }
}

impl EngineConfig {
    /// 从 JSON 文本加载
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = EngineConfig::from_json(r#"{ "display_width": 1280 }"#).unwrap();
        assert_eq!(config.display_width, 1280);
        assert_eq!(config.display_height, 480);
        assert_eq!(config.variable_passes, 4);
        assert_eq!(config.startup, None);
    }

    #[test]
    fn test_empty_config_equals_default() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }
}
