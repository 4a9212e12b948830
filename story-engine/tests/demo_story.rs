//! 用仓库自带的示例故事做端到端测试。

use std::collections::VecDeque;

use story_engine::{
    AudioChannel, Command, RuntimeInput, SceneRef, Story, StoryRuntime, WaitingReason,
    analyze_story,
};

const PROLOGUE: &str = include_str!("../../demos/prologue.json");

#[test]
fn test_demo_story_passes_diagnostics() {
    let story = Story::from_json(PROLOGUE).unwrap();
    let result = analyze_story(&story);
    assert!(result.is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn test_demo_story_plays_to_exit() {
    let story = Story::from_json(PROLOGUE).unwrap();
    let mut runtime = StoryRuntime::new(story).unwrap();

    let mut inputs = VecDeque::new();
    let mut texts = Vec::new();
    let mut sounds = Vec::new();
    let mut exited = false;

    // 模拟一个动画瞬间完成、总是立即点击的 Host
    for _ in 0..50 {
        let (commands, waiting) = runtime.tick(inputs.pop_front()).unwrap();
        for command in &commands {
            match command {
                Command::DialogText { text } => texts.push(text.clone()),
                Command::PlayAudio {
                    channel: AudioChannel::Fx,
                    name,
                    ..
                } => sounds.push(name.clone()),
                Command::ShowDialog { animated: true } => {
                    inputs.push_back(RuntimeInput::DialogAnimationFinished)
                }
                Command::CoverScreen { .. } => inputs.push_back(RuntimeInput::ScreenCovered),
                Command::Exit => exited = true,
                _ => {}
            }
        }
        if exited {
            break;
        }
        if waiting == WaitingReason::Halt && inputs.is_empty() {
            inputs.push_back(RuntimeInput::Click);
        }
    }

    assert!(exited);
    assert_eq!(
        texts,
        vec!["The park is calm today.", "Rave waves back.", "Night falls."]
    );
    assert_eq!(sounds, vec!["wave_left"]);
    assert_eq!(
        runtime.current_scene(),
        Some(&SceneRef::new("Prologue", "Night"))
    );
    assert_eq!(runtime.variables().get("mood"), Some("calm"));
}
