//! # Story 模块
//!
//! 故事数据：章节脚本、场景脚本、可复用脚本和精灵资源清单。
//!
//! 可以从 JSON 反序列化：
//!
//! ```json
//! {
//!   "startup": { "chapter": "Prologue", "scene": "Intro" },
//!   "chapters": {
//!     "Prologue": { "script": "<font: default>", "scenes": { "Intro": "Hello" } }
//!   },
//!   "reusables": { "blink": "<character_hide: rave>" },
//!   "sprites": { "character": { "rave_normal": { "width": 100, "height": 200 } } },
//!   "fonts": ["default"]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::RuntimeError;
use crate::stage::ContentType;

/// 场景定位
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneRef {
    pub chapter: String,
    pub scene: String,
}

impl SceneRef {
    pub fn new(chapter: impl Into<String>, scene: impl Into<String>) -> Self {
        Self {
            chapter: chapter.into(),
            scene: scene.into(),
        }
    }
}

impl std::fmt::Display for SceneRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.chapter, self.scene)
    }
}

/// 章节：章节脚本在每个场景开始前执行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub scenes: BTreeMap<String, String>,
}

/// 精灵资源尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteAsset {
    pub width: i32,
    pub height: i32,
}

/// 故事数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// 起始场景
    #[serde(default)]
    pub startup: Option<SceneRef>,
    #[serde(default)]
    pub chapters: BTreeMap<String, Chapter>,
    /// 可复用脚本
    #[serde(default)]
    pub reusables: BTreeMap<String, String>,
    /// 按内容类型分组的精灵资源
    #[serde(default)]
    pub sprites: BTreeMap<ContentType, BTreeMap<String, SpriteAsset>>,
    /// 可用字体
    #[serde(default)]
    pub fonts: BTreeSet<String>,
}

impl Story {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 文本加载
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_startup(mut self, chapter: &str, scene: &str) -> Self {
        self.startup = Some(SceneRef::new(chapter, scene));
        self
    }

    pub fn with_chapter(mut self, name: &str, script: &str) -> Self {
        self.chapters.entry(name.to_string()).or_default().script = script.to_string();
        self
    }

    pub fn with_scene(mut self, chapter: &str, scene: &str, script: &str) -> Self {
        self.chapters
            .entry(chapter.to_string())
            .or_default()
            .scenes
            .insert(scene.to_string(), script.to_string());
        self
    }

    pub fn with_reusable(mut self, name: &str, script: &str) -> Self {
        self.reusables.insert(name.to_string(), script.to_string());
        self
    }

    pub fn with_sprite(mut self, content_type: ContentType, name: &str, width: i32, height: i32) -> Self {
        self.sprites
            .entry(content_type)
            .or_default()
            .insert(name.to_string(), SpriteAsset { width, height });
        self
    }

    pub fn with_font(mut self, name: &str) -> Self {
        self.fonts.insert(name.to_string());
        self
    }

    /// 检查场景是否存在
    pub fn check_scene(&self, chapter: &str, scene: &str) -> Result<(), RuntimeError> {
        let Some(found) = self.chapters.get(chapter) else {
            return Err(RuntimeError::UnknownChapter {
                chapter: chapter.to_string(),
            });
        };
        if !found.scenes.contains_key(scene) {
            return Err(RuntimeError::UnknownScene {
                chapter: chapter.to_string(),
                scene: scene.to_string(),
            });
        }
        Ok(())
    }

    /// 章节脚本 + 换行 + 场景脚本
    pub fn scene_script(&self, scene: &SceneRef) -> Result<String, RuntimeError> {
        self.check_scene(&scene.chapter, &scene.scene)?;
        let chapter = &self.chapters[&scene.chapter];
        Ok(format!("{}\n{}", chapter.script, chapter.scenes[&scene.scene]))
    }

    pub fn reusable(&self, name: &str) -> Option<&str> {
        self.reusables.get(name).map(String::as_str)
    }

    pub fn sprite_asset(&self, content_type: ContentType, name: &str) -> Option<SpriteAsset> {
        self.sprites.get(&content_type)?.get(name).copied()
    }

    pub fn has_font(&self, name: &str) -> bool {
        self.fonts.contains(name)
    }
}
