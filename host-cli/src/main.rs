//! # Host CLI
//!
//! 命令行宿主：在终端里驱动 story-engine，把每帧产生的 Command 以 JSON 行输出。
//!
//! 没有渲染器，动画一律瞬间完成：对话框动画、屏幕遮罩和精灵动画都在下一帧回报结束。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p host-cli -- run story.json
//! cargo run -p host-cli -- run story.json --config engine.json --frames 600 --auto-click
//! cargo run -p host-cli -- check story.json
//! ```

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use story_engine::{
    Command, ContentType, DiagnosticLevel, EngineConfig, RuntimeInput, SpriteAnimation, Story,
    StoryRuntime, WaitingReason, analyze_story,
};
use tracing::{Level, debug, info, warn};

#[derive(Parser)]
#[command(name = "story")]
#[command(about = "标签脚本视觉小说引擎的命令行宿主")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行故事，逐帧输出指令
    Run {
        /// 故事 JSON 文件
        story: PathBuf,

        /// 引擎配置 JSON 文件
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// 最多运行的帧数（默认：3600）
        #[arg(short, long, default_value = "3600")]
        frames: u64,

        /// 等待点击时自动点击
        #[arg(long)]
        auto_click: bool,
    },

    /// 静态检查故事
    Check {
        /// 故事 JSON 文件
        story: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    match real_main(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("错误: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn real_main(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Run {
            story,
            config,
            frames,
            auto_click,
        } => {
            let story = load_story(&story)?;
            let config = match config {
                Some(path) => {
                    let text = fs::read_to_string(&path)
                        .with_context(|| format!("无法读取配置: {}", path.display()))?;
                    EngineConfig::from_json(&text)
                        .with_context(|| format!("配置格式错误: {}", path.display()))?
                }
                None => EngineConfig::default(),
            };
            run(story, config, frames, auto_click)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { story } => {
            let story = load_story(&story)?;
            Ok(check(&story))
        }
    }
}

fn load_story(path: &Path) -> Result<Story> {
    let text =
        fs::read_to_string(path).with_context(|| format!("无法读取故事: {}", path.display()))?;
    Story::from_json(&text).with_context(|| format!("故事格式错误: {}", path.display()))
}

/// 逐帧运行，直到故事结束或达到帧数上限
fn run(story: Story, config: EngineConfig, frames: u64, auto_click: bool) -> Result<()> {
    let mut runtime = StoryRuntime::with_config(story, config)?;
    let mut inputs: VecDeque<RuntimeInput> = VecDeque::new();

    for frame in 0..frames {
        let (commands, waiting) = runtime.tick(inputs.pop_front())?;

        for command in &commands {
            println!("{}", serde_json::to_string(command)?);
            acknowledge(command, &mut inputs);
        }
        inputs.extend(settle_animations(&mut runtime));

        match waiting {
            WaitingReason::Finished if inputs.is_empty() => {
                info!(frame, "故事结束");
                return Ok(());
            }
            WaitingReason::Halt if auto_click && inputs.is_empty() => {
                inputs.push_back(RuntimeInput::Click);
            }
            _ => {}
        }
        if commands.contains(&Command::Exit) {
            info!(frame, "脚本退出");
            return Ok(());
        }
    }

    warn!(frames, "达到帧数上限，停止运行");
    Ok(())
}

/// 没有渲染器，需要 Host 回报的动画立即结束
fn acknowledge(command: &Command, inputs: &mut VecDeque<RuntimeInput>) {
    match command {
        Command::ShowDialog { animated: true } | Command::HideDialog { animated: true } => {
            inputs.push_back(RuntimeInput::DialogAnimationFinished);
        }
        Command::CoverScreen { .. } => {
            inputs.push_back(RuntimeInput::ScreenCovered);
            inputs.push_back(RuntimeInput::CoverFinished);
        }
        _ => {}
    }
}

/// 将进行中的精灵动画直接推进到终点
fn settle_animations(runtime: &mut StoryRuntime) -> Vec<RuntimeInput> {
    let mut stopped = Vec::new();

    for content_type in [
        ContentType::Background,
        ContentType::Character,
        ContentType::Object,
        ContentType::DialogSprite,
    ] {
        let group = runtime.stage_mut().group_mut(content_type);
        let names: Vec<String> = group
            .visible()
            .filter(|sprite| sprite.is_animating())
            .map(|sprite| sprite.name.clone())
            .collect();

        for name in names {
            let Some(sprite) = group.get_mut(&name) else {
                continue;
            };
            let mut finished = Vec::new();
            if sprite.fade.is_fading {
                if let Some(until) = sprite.fade.until {
                    sprite.fade.current = Some(until);
                }
                finished.push(SpriteAnimation::Fade);
            }
            if sprite.movement.is_moving {
                finished.push(SpriteAnimation::Move);
            }
            if sprite.scale.is_scaling {
                finished.push(SpriteAnimation::Scale);
            }
            if sprite.rotation.is_rotating {
                finished.push(SpriteAnimation::Rotate);
            }

            debug!(sprite = %name, ?finished, "动画瞬间完成");
            stopped.extend(finished.into_iter().map(|animation| {
                RuntimeInput::SpriteAnimationStopped {
                    content_type,
                    name: name.clone(),
                    animation,
                }
            }));
        }
    }
    stopped
}

/// 输出诊断，有错误时返回失败
fn check(story: &Story) -> ExitCode {
    let result = analyze_story(story);
    for diagnostic in result.filter_by_level(DiagnosticLevel::Info) {
        println!("{diagnostic}");
    }
    println!(
        "{} 个错误，{} 个警告",
        result.error_count(),
        result.warn_count()
    );

    if result.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
