//! # History 模块
//!
//! 历史记录数据模型，用于支持对话回看。
//!
//! ## 设计原则
//!
//! - 记录关键事件（对话、场景切换、可复用脚本启动）
//! - 不记录临时状态（如精灵动画）

use serde::{Deserialize, Serialize};

/// 历史事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// 对话事件
    Dialogue {
        /// 对话内容
        content: String,
        /// 时间戳（Unix 秒）
        timestamp: u64,
    },

    /// 场景切换
    SceneChange {
        chapter: String,
        scene: String,
        timestamp: u64,
    },

    /// 可复用脚本启动
    ReusableStarted {
        name: String,
        timestamp: u64,
    },
}

impl HistoryEvent {
    /// 获取事件时间戳
    pub fn timestamp(&self) -> u64 {
        match self {
            HistoryEvent::Dialogue { timestamp, .. } => *timestamp,
            HistoryEvent::SceneChange { timestamp, .. } => *timestamp,
            HistoryEvent::ReusableStarted { timestamp, .. } => *timestamp,
        }
    }

    /// 创建对话事件
    pub fn dialogue(content: String) -> Self {
        HistoryEvent::Dialogue {
            content,
            timestamp: current_timestamp(),
        }
    }

    /// 创建场景切换事件
    pub fn scene_change(chapter: String, scene: String) -> Self {
        HistoryEvent::SceneChange {
            chapter,
            scene,
            timestamp: current_timestamp(),
        }
    }

    /// 创建可复用脚本启动事件
    pub fn reusable_started(name: String) -> Self {
        HistoryEvent::ReusableStarted {
            name,
            timestamp: current_timestamp(),
        }
    }
}

/// 历史记录容器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    /// 事件列表（按时间顺序）
    events: Vec<HistoryEvent>,
    /// 最大记录数（防止内存无限增长）
    max_events: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// 创建新的历史记录
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            max_events: 1000,
        }
    }

    /// 设置最大记录数
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// 添加事件
    pub fn push(&mut self, event: HistoryEvent) {
        self.events.push(event);

        // 超出容量时丢弃最早的事件
        if self.events.len() > self.max_events {
            let overflow = self.events.len() - self.max_events;
            self.events.drain(..overflow);
        }
    }

    /// 获取所有事件
    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    /// 获取对话事件数量
    pub fn dialogue_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HistoryEvent::Dialogue { .. }))
            .count()
    }

    /// 获取最近的 N 条对话内容（按时间顺序）
    pub fn recent_dialogues(&self, count: usize) -> Vec<&str> {
        let mut recent: Vec<&str> = self
            .events
            .iter()
            .rev()
            .filter_map(|e| match e {
                HistoryEvent::Dialogue { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .take(count)
            .collect();
        recent.reverse();
        recent
    }

    /// 清空历史
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// 获取事件总数
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// 获取当前时间戳（Unix 秒）
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
