//! # Tween Demo
//!
//! 按操作脚本驱动一个示例控制器（卡片弹出动画），逐帧模拟并输出状态。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p tween-demo
//! cargo run -p tween-demo -- --actions ready,play,complete
//! cargo run -p tween-demo -- --actions play --destroy-at 10 -v
//! cargo run -p tween-demo -- --config tween.json --time-scale 0.5
//! cargo run -p tween-demo -- init-config tween.json
//! ```

use std::cell::Cell;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::{Parser, Subcommand};
use tokio::task::LocalSet;
use tracing::{Level, debug, info, warn};
use tween_runtime::{
    ActionPanel, Animatable, ControllerAction, ControllerPhase, EasingFunction, HostMode, ObjectId,
    Owner, Tween, TweenConfig, TweenController, TweenEngine, TweenFactory, TweenResult,
};

#[derive(Parser)]
#[command(name = "tween-demo")]
#[command(about = "Tween 控制器演示工具")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// 配置文件（默认使用内置配置）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 操作脚本，逗号分隔（ready / play / complete）
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_values_t = [ControllerAction::Ready, ControllerAction::Play]
    )]
    actions: Vec<ControllerAction>,

    /// 在第 N 帧销毁宿主对象
    #[arg(long)]
    destroy_at: Option<u32>,

    /// 覆盖配置中的时间缩放
    #[arg(long)]
    time_scale: Option<f32>,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 写出默认配置文件
    InitConfig {
        /// 输出路径
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("tween-demo error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    if let Some(Commands::InitConfig { path }) = &cli.command {
        TweenConfig::default().save(path)?;
        info!(path = ?path, "默认配置已写出");
        return Ok(());
    }

    let mut config = cli
        .config
        .as_ref()
        .map(TweenConfig::load)
        .unwrap_or_default();
    if let Some(time_scale) = cli.time_scale {
        config.time_scale = time_scale;
    }
    config.validate()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let local = LocalSet::new();
    let report = local.block_on(&runtime, run_script(&config, &cli.actions, cli.destroy_at))?;

    info!(
        frames = report.frames,
        phase = ?report.phase,
        card = %report.card,
        "演示结束"
    );
    Ok(())
}

/// 示例卡片
#[derive(Debug, Default)]
struct Card {
    alpha: Cell<f32>,
    offset_y: Cell<f32>,
    scale: Cell<f32>,
}

impl Animatable for Card {
    fn get_property(&self, property_id: &str) -> Option<f32> {
        match property_id {
            "alpha" => Some(self.alpha.get()),
            "offset_y" => Some(self.offset_y.get()),
            "scale" => Some(self.scale.get()),
            _ => None,
        }
    }

    fn set_property(&self, property_id: &str, value: f32) -> bool {
        match property_id {
            "alpha" => self.alpha.set(value),
            "offset_y" => self.offset_y.set(value),
            "scale" => self.scale.set(value),
            _ => return false,
        }
        true
    }

    fn property_list(&self) -> &'static [&'static str] {
        &["alpha", "offset_y", "scale"]
    }
}

/// 卡片状态快照
#[derive(Debug, Clone, Copy, PartialEq)]
struct CardSnapshot {
    alpha: f32,
    offset_y: f32,
    scale: f32,
}

impl Card {
    fn snapshot(&self) -> CardSnapshot {
        CardSnapshot {
            alpha: self.alpha.get(),
            offset_y: self.offset_y.get(),
            scale: self.scale.get(),
        }
    }
}

impl fmt::Display for CardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "alpha={:.2} offset_y={:.1} scale={:.2}",
            self.alpha, self.offset_y, self.scale
        )
    }
}

/// 卡片弹出：淡入、放大回弹、上滑
struct PopIn {
    card: ObjectId,
    duration: f32,
}

impl TweenFactory for PopIn {
    fn play_core(&self, engine: &TweenEngine) -> TweenResult<Tween> {
        engine
            .tween()
            .property::<Card>(self.card, "alpha", 0.0, 1.0, self.duration * 0.6)?
            .property::<Card>(self.card, "scale", 0.8, 1.0, self.duration)?
            .easing(EasingFunction::EaseOutBack)
            .property::<Card>(self.card, "offset_y", 24.0, 0.0, self.duration * 0.8)?
            .delay(self.duration * 0.2)
            .easing(EasingFunction::EaseOutQuad)
            .start()
    }
}

/// 演示结果
struct DemoReport {
    frames: u32,
    phase: ControllerPhase,
    card: CardSnapshot,
}

/// 依次执行操作脚本
///
/// `play` 之后逐帧推进引擎，直到控制器回到 Idle 或达到帧数上限。
async fn run_script(
    config: &TweenConfig,
    actions: &[ControllerAction],
    destroy_at: Option<u32>,
) -> anyhow::Result<DemoReport> {
    let engine = TweenEngine::with_config(config);
    let card = Rc::new(Card::default());
    let card_id = engine.register(card.clone());
    let owner = Owner::new("card");

    let controller = TweenController::new(
        PopIn {
            card: card_id,
            duration: config.demo.tween_duration,
        },
        engine.clone(),
        owner.token(),
    );
    let mut panel = ActionPanel::new(HostMode::Running);
    panel.register("pop_in", Rc::new(controller.clone()));

    let step = config.demo.frame_step();
    let mut frame = 0u32;

    for &action in actions {
        panel.invoke("pop_in", action)?;
        info!(action = %action, phase = ?controller.phase(), card = %card.snapshot(), "执行操作");

        if action != ControllerAction::Play {
            continue;
        }

        let mut played = 0u32;
        loop {
            // 让后台播放任务先运行
            tokio::task::yield_now().await;

            if destroy_at == Some(frame) {
                owner.destroy();
            }
            for event in engine.update(step) {
                debug!(frame, event = ?event, "Tween 事件");
            }
            debug!(frame, card = %card.snapshot(), "帧");
            frame += 1;
            played += 1;

            tokio::task::yield_now().await;
            if controller.phase() == ControllerPhase::Idle {
                break;
            }
            if played >= config.demo.max_frames {
                warn!(max_frames = config.demo.max_frames, "达到帧数上限，停止推进");
                break;
            }
        }
    }

    Ok(DemoReport {
        frames: frame,
        phase: controller.phase(),
        card: card.snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_config() -> TweenConfig {
        let mut config = TweenConfig::default();
        config.demo.frame_rate = 10;
        config.demo.tween_duration = 0.5;
        config
    }

    async fn run(actions: &[ControllerAction], destroy_at: Option<u32>) -> DemoReport {
        let config = demo_config();
        LocalSet::new()
            .run_until(run_script(&config, actions, destroy_at))
            .await
            .unwrap()
    }

    #[test]
    fn test_parse_actions() {
        let cli = Cli::try_parse_from(["tween-demo", "--actions", "ready,play,complete"]).unwrap();
        assert_eq!(
            cli.actions,
            vec![
                ControllerAction::Ready,
                ControllerAction::Play,
                ControllerAction::Complete
            ]
        );

        assert!(Cli::try_parse_from(["tween-demo", "--actions", "rewind"]).is_err());
    }

    #[tokio::test]
    async fn test_ready_play_reaches_end_state() {
        let report = run(&[ControllerAction::Ready, ControllerAction::Play], None).await;

        assert_eq!(report.phase, ControllerPhase::Idle);
        assert!(report.frames >= 5);
        assert_eq!(report.card.alpha, 1.0);
        assert_eq!(report.card.offset_y, 0.0);
        assert_eq!(report.card.scale, 1.0);
    }

    #[tokio::test]
    async fn test_ready_only_holds_start_state() {
        let report = run(&[ControllerAction::Ready], None).await;

        assert_eq!(report.phase, ControllerPhase::Prepared);
        assert_eq!(report.frames, 0);
        assert_eq!(report.card.alpha, 0.0);
        assert_eq!(report.card.offset_y, 24.0);
        assert_eq!(report.card.scale, 0.8);
    }

    #[tokio::test]
    async fn test_destroy_stops_playback() {
        let report = run(&[ControllerAction::Play], Some(1)).await;

        assert_eq!(report.phase, ControllerPhase::Idle);
        assert!(report.frames <= 3);
        assert!(report.card.alpha < 1.0);
    }
}
