//! # Reader 模块
//!
//! 脚本阅读器：一个按行消费的脚本队列。
//!
//! - 主阅读器读取 `章节脚本 + 场景脚本`，受各种暂停状态约束
//! - 后台阅读器读取可复用脚本，没有暂停状态，每次执行到队列耗尽为止

use std::collections::VecDeque;

use crate::error::RuntimeError;
use crate::runtime::condition::ConditionStack;
use crate::runtime::dispatch::{self, Flow};
use crate::runtime::reusable::{ReusableArgs, substitute_parameters};
use crate::runtime::session::Session;
use crate::script::line::{
    ScriptLine, classify, is_condition_control, normalize, split_lines,
};
use crate::story::SceneRef;

/// 阅读器角色
#[derive(Debug, Clone, PartialEq)]
pub enum ReaderRole {
    Main {
        scene: SceneRef,
    },
    Background {
        name: String,
        arguments: Option<ReusableArgs>,
    },
}

/// 脚本阅读器
#[derive(Debug)]
pub(crate) struct Reader {
    role: ReaderRole,
    lines: VecDeque<String>,
    loaded: bool,
    finished: bool,
    pub(crate) conditions: ConditionStack,
}

impl Reader {
    /// 主阅读器，首次执行时才加载脚本
    pub(crate) fn main(scene: SceneRef) -> Self {
        Self {
            role: ReaderRole::Main { scene },
            lines: VecDeque::new(),
            loaded: false,
            finished: false,
            conditions: ConditionStack::new(),
        }
    }

    pub(crate) fn background(name: &str, text: &str, arguments: Option<ReusableArgs>) -> Self {
        Self {
            role: ReaderRole::Background {
                name: name.to_string(),
                arguments,
            },
            lines: split_lines(text).map(str::to_string).collect(),
            loaded: true,
            finished: false,
            conditions: ConditionStack::new(),
        }
    }

    pub(crate) fn is_main(&self) -> bool {
        matches!(self.role, ReaderRole::Main { .. })
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    /// 后台阅读器的脚本名
    pub(crate) fn name(&self) -> Option<&str> {
        match &self.role {
            ReaderRole::Main { .. } => None,
            ReaderRole::Background { name, .. } => Some(name),
        }
    }

    pub(crate) fn scene(&self) -> Option<&SceneRef> {
        match &self.role {
            ReaderRole::Main { scene } => Some(scene),
            ReaderRole::Background { .. } => None,
        }
    }

    fn load(&mut self, session: &Session) -> Result<(), RuntimeError> {
        if let ReaderRole::Main { scene } = &self.role {
            let script = session.story.scene_script(scene)?;
            self.lines = split_lines(&script).map(str::to_string).collect();
        }
        self.loaded = true;
        Ok(())
    }

    /// 执行一次
    ///
    /// 主阅读器遇到暂停条件立即返回；后台阅读器一直执行到队列耗尽或 `exit` / `scene`。
    pub(crate) fn step(&mut self, session: &mut Session) -> Result<(), RuntimeError> {
        if self.finished {
            return Ok(());
        }
        if !self.loaded {
            self.load(session)?;
        }

        if self.is_main() && session.main_should_pause() {
            session.elapse_pause_counters()?;
            if session.main_should_pause() {
                return Ok(());
            }
        }

        while let Some(raw) = self.lines.pop_front() {
            let line = normalize(&raw);
            if self.conditions.is_skipping() && !is_condition_control(&line) {
                continue;
            }

            let mut line = session
                .variables
                .find_and_replace(&line, session.config.variable_passes);
            if let ReaderRole::Background { name, arguments } = &self.role {
                line = substitute_parameters(&line, arguments.as_ref(), name)?;
            }

            match classify(&line) {
                ScriptLine::Blank | ScriptLine::Comment => continue,
                ScriptLine::Text(text) => {
                    if !self.is_main() {
                        continue;
                    }
                    session.show_dialog_text(text);
                }
                ScriptLine::Command { name, args } => {
                    if dispatch::run(self, session, name, args)? == Flow::Finish {
                        self.lines.clear();
                        self.finished = true;
                        return Ok(());
                    }
                }
            }

            // 暂停期间不标记结束，计数要在之后的帧里继续推进
            if self.is_main() && session.main_should_pause() {
                return Ok(());
            }
        }

        self.finished = true;
        Ok(())
    }
}

/// 后台阅读器槽位
///
/// 阅读器执行期间会被取出（`reader` 为 None），以便它通过会话启动新的阅读器。
#[derive(Debug)]
struct BackgroundSlot {
    name: String,
    reader: Option<Reader>,
}

/// 后台阅读器集合，按启动顺序保存
#[derive(Debug, Default)]
pub(crate) struct BackgroundReaders {
    slots: Vec<BackgroundSlot>,
    deletion_queue: Vec<String>,
}

impl BackgroundReaders {
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.slots.iter().any(|slot| slot.name == name)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.name.as_str())
    }

    /// 预留槽位，返回索引
    pub(crate) fn reserve(&mut self, name: &str) -> usize {
        self.slots.push(BackgroundSlot {
            name: name.to_string(),
            reader: None,
        });
        self.slots.len() - 1
    }

    /// 取出阅读器执行
    pub(crate) fn checkout(&mut self, index: usize) -> Option<Reader> {
        self.slots.get_mut(index)?.reader.take()
    }

    /// 放回阅读器；已结束的阅读器进入删除队列
    pub(crate) fn checkin(&mut self, index: usize, reader: Reader) {
        let Some(name) = reader.name().map(str::to_string) else {
            return;
        };
        if reader.is_finished() && !self.deletion_queue.contains(&name) {
            self.deletion_queue.push(name.clone());
        }
        if let Some(slot) = self.slots.get_mut(index)
            && slot.name == name
            && slot.reader.is_none()
        {
            slot.reader = Some(reader);
        }
    }

    /// 移除删除队列中的阅读器
    pub(crate) fn purge(&mut self) {
        if self.deletion_queue.is_empty() {
            return;
        }
        let queue = std::mem::take(&mut self.deletion_queue);
        self.slots.retain(|slot| !queue.contains(&slot.name));
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.deletion_queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_slots_lifecycle() {
        let mut readers = BackgroundReaders::default();
        let index = readers.reserve("blink");
        assert!(readers.contains("blink"));

        let reader = Reader::background("blink", "", None);
        readers.checkin(index, reader);

        let mut reader = readers.checkout(index).unwrap();
        assert!(readers.checkout(index).is_none());
        reader.finished = true;
        readers.checkin(index, reader);

        // 结束的阅读器在清理前仍然占用名称
        assert!(readers.contains("blink"));
        readers.purge();
        assert!(!readers.contains("blink"));
        assert_eq!(readers.len(), 0);
    }

    #[test]
    fn test_reader_roles() {
        let main = Reader::main(SceneRef::new("c", "s"));
        assert!(main.is_main());
        assert_eq!(main.name(), None);
        assert_eq!(main.scene(), Some(&SceneRef::new("c", "s")));

        let bg = Reader::background("wave", "<rest: 1>\n", None);
        assert!(!bg.is_main());
        assert_eq!(bg.name(), Some("wave"));
        assert_eq!(bg.lines.len(), 1);
    }
}
