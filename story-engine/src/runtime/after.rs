//! # After 模块
//!
//! `<after: 帧数, 可复用脚本>` 的延迟计时器。
//!
//! 计时器只属于会话（主阅读器），后台阅读器通过会话注册。

use tracing::debug;

use crate::runtime::reusable::ReusableArgs;

/// 单个延迟计时器
#[derive(Debug, Clone, PartialEq)]
pub struct AfterTimer {
    /// 要跳过的帧数
    pub frames_to_skip: u32,
    /// 已经过的帧数
    pub frames_elapsed: u32,
    /// 启动可复用脚本时使用的参数
    pub arguments: Option<ReusableArgs>,
}

impl AfterTimer {
    fn is_ready(&self) -> bool {
        self.frames_elapsed >= self.frames_to_skip
    }
}

/// 触发的计时器
#[derive(Debug, Clone, PartialEq)]
pub struct FiredTimer {
    pub name: String,
    pub arguments: Option<ReusableArgs>,
}

/// 延迟计时器管理
///
/// 以可复用脚本名为键，按注册顺序保存。
#[derive(Debug, Clone, Default)]
pub struct AfterManager {
    timers: Vec<(String, AfterTimer)>,
}

impl AfterManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.timers.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// 计时器名称（按注册顺序）
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.timers.iter().map(|(name, _)| name.as_str())
    }

    /// 注册计时器
    ///
    /// 同名计时器已存在，或名称和帧数都为空时忽略。返回是否注册成功。
    pub fn add_timer(
        &mut self,
        name: &str,
        frames_to_skip: u32,
        arguments: Option<ReusableArgs>,
    ) -> bool {
        if name.is_empty() && frames_to_skip == 0 {
            return false;
        }
        if self.contains(name) {
            debug!(name, "计时器已存在，忽略");
            return false;
        }

        self.timers.push((
            name.to_string(),
            AfterTimer {
                frames_to_skip,
                frames_elapsed: 0,
                arguments,
            },
        ));
        true
    }

    /// 取消计时器，不存在时无操作
    pub fn remove_timer(&mut self, name: &str) {
        self.timers.retain(|(n, _)| n != name);
    }

    pub fn remove_all_timers(&mut self) {
        self.timers.clear();
    }

    /// 推进一帧
    ///
    /// 先推进所有计时器并收集到期的名称，再统一移除，返回到期的计时器（按注册顺序）。
    pub fn tick(&mut self) -> Vec<FiredTimer> {
        let mut ready = Vec::new();
        for (name, timer) in &mut self.timers {
            timer.frames_elapsed += 1;
            if timer.is_ready() {
                ready.push(name.clone());
            }
        }

        let mut fired = Vec::with_capacity(ready.len());
        for name in ready {
            if let Some(pos) = self.timers.iter().position(|(n, _)| *n == name) {
                let (name, timer) = self.timers.remove(pos);
                fired.push(FiredTimer {
                    name,
                    arguments: timer.arguments,
                });
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_fires_once_after_frames() {
        let mut after = AfterManager::new();
        assert!(after.add_timer("blink", 10, None));
        // 重复注册无效
        assert!(!after.add_timer("blink", 3, None));

        for _ in 0..9 {
            assert!(after.tick().is_empty());
        }
        let fired = after.tick();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].name, "blink");
        assert!(after.is_empty());
        assert!(after.tick().is_empty());
    }

    #[test]
    fn test_empty_timer_ignored() {
        let mut after = AfterManager::new();
        assert!(!after.add_timer("", 0, None));
        assert!(after.is_empty());
    }

    #[test]
    fn test_zero_frames_fires_next_tick() {
        let mut after = AfterManager::new();
        after.add_timer("now", 0, None);
        assert_eq!(after.tick().len(), 1);
    }

    #[test]
    fn test_fire_order_and_cancel() {
        let mut after = AfterManager::new();
        after.add_timer("b", 2, None);
        after.add_timer("a", 2, None);
        after.add_timer("c", 2, None);
        after.remove_timer("c");
        after.remove_timer("missing");

        after.tick();
        let fired: Vec<_> = after.tick().into_iter().map(|t| t.name).collect();
        assert_eq!(fired, vec!["b", "a"]);
    }

    #[test]
    fn test_remove_all() {
        let mut after = AfterManager::new();
        after.add_timer("a", 5, None);
        after.add_timer("b", 5, None);
        after.remove_all_timers();
        assert_eq!(after.names().count(), 0);
    }

    #[test]
    fn test_arguments_travel_with_timer() {
        let mut after = AfterManager::new();
        let args = ReusableArgs::parse("who=rave").unwrap();
        after.add_timer("wave", 1, Some(args.clone()));
        let fired = after.tick();
        assert_eq!(fired[0].arguments, Some(args));
    }
}
