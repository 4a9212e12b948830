//! # Pause 模块
//!
//! 主阅读器的暂停计数：`halt` / `halt_auto` / `rest` 以及 Host 主动暂停。

/// `<rest: 帧数>` 计数器
///
/// 休止期间再次 `rest` 会延长目标帧数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestHandler {
    counter: u32,
    reach: u32,
}

impl RestHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_counting(&self) -> bool {
        self.reach > 0 && self.counter > 0 && self.counter <= self.reach
    }

    /// 开始（或延长）休止
    pub fn setup(&mut self, frames: u32) {
        if self.is_counting() {
            self.reach += frames;
        } else {
            self.reach = frames;
            self.counter = 0;
        }
    }

    pub fn pause_required(&self) -> bool {
        self.reach > 0
    }

    /// 剩余帧数
    pub fn remaining(&self) -> u32 {
        self.reach.saturating_sub(self.counter)
    }

    /// 推进一帧，返回是否仍在休止
    pub fn tick(&mut self) -> bool {
        if self.reach == 0 {
            return false;
        }
        if self.counter >= self.reach {
            self.reset();
            return false;
        }
        self.counter += 1;
        true
    }

    pub fn reset(&mut self) {
        self.counter = 0;
        self.reach = 0;
    }
}

/// halt 结束时需要执行的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltTick {
    /// 仍在暂停
    Holding,
    /// 自动暂停计满，需要解除
    Expired,
}

/// `<halt>` / `<halt_auto>` 状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HaltState {
    halted: bool,
    /// 0 表示需要点击解除
    auto_frames: u32,
    counter: u32,
}

impl HaltState {
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn is_auto(&self) -> bool {
        self.halted && self.auto_frames > 0
    }

    pub fn remaining(&self) -> u32 {
        self.auto_frames.saturating_sub(self.counter)
    }

    /// 进入暂停，已经暂停时返回 false
    pub fn halt(&mut self, auto_frames: Option<u32>) -> bool {
        if self.halted {
            return false;
        }
        self.halted = true;
        self.auto_frames = auto_frames.unwrap_or(0);
        self.counter = 0;
        true
    }

    pub fn unhalt(&mut self) {
        *self = Self::default();
    }

    /// 推进自动暂停计数
    ///
    /// 文字动画进行中时不计数。
    pub fn tick(&mut self, text_animating: bool) -> HaltTick {
        if self.auto_frames == 0 {
            return HaltTick::Holding;
        }
        if self.counter >= self.auto_frames {
            return HaltTick::Expired;
        }
        if !text_animating {
            self.counter += 1;
        }
        HaltTick::Holding
    }
}

/// 主阅读器的全部暂停状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseState {
    pub halt: HaltState,
    pub rest: RestHandler,
    /// Host 主动暂停
    pub manual: bool,
}

impl PauseState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_counts_frames() {
        let mut rest = RestHandler::new();
        rest.setup(3);
        assert!(rest.pause_required());
        assert!(rest.tick());
        assert!(rest.tick());
        assert!(rest.tick());
        assert!(!rest.tick());
        assert!(!rest.pause_required());
    }

    #[test]
    fn test_rest_extends_while_counting() {
        let mut rest = RestHandler::new();
        rest.setup(2);
        rest.tick();
        rest.setup(3);
        assert_eq!(rest.remaining(), 4);

        // 未开始计数时重新设置
        let mut fresh = RestHandler::new();
        fresh.setup(2);
        fresh.setup(5);
        assert_eq!(fresh.remaining(), 5);
    }

    #[test]
    fn test_halt_auto_expires() {
        let mut halt = HaltState::default();
        assert!(halt.halt(Some(2)));
        assert!(!halt.halt(None));
        assert!(halt.is_auto());

        assert_eq!(halt.tick(false), HaltTick::Holding);
        // 文字动画期间不计数
        assert_eq!(halt.tick(true), HaltTick::Holding);
        assert_eq!(halt.remaining(), 1);
        assert_eq!(halt.tick(false), HaltTick::Holding);
        assert_eq!(halt.tick(false), HaltTick::Expired);

        halt.unhalt();
        assert!(!halt.is_halted());
    }

    #[test]
    fn test_plain_halt_never_expires() {
        let mut halt = HaltState::default();
        halt.halt(None);
        for _ in 0..100 {
            assert_eq!(halt.tick(false), HaltTick::Holding);
        }
        assert!(halt.is_halted());
        assert!(!halt.is_auto());
    }
}
