//! # cover-host
//!
//! 无头运行一次转场，输出事件时间线。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p cover-host
//! cargo run -p cover-host -- --config cover.json --target stage
//! cargo run -p cover-host -- --target 1 --fps 30 --json
//! RUST_LOG=cover_runtime=debug cargo run -p cover-host
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use cover_host::{AppConfig, DEFAULT_CONFIG_PATH, HeadlessRunner};
use cover_runtime::SceneTarget;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cover-host")]
#[command(about = "无头转场宿主 - 按配置驱动一次场景切换并输出事件时间线")]
#[command(version)]
struct Cli {
    /// 配置文件（指定时严格加载，默认尝试 cover.json）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 切换目标：场景名或序号
    #[arg(short, long)]
    target: Option<SceneTarget>,

    /// 覆盖配置中的帧率
    #[arg(long)]
    fps: Option<u32>,

    /// 覆盖配置中的时间缩放
    #[arg(long)]
    time_scale: Option<f32>,

    /// 以 JSON 输出时间线
    #[arg(long)]
    json: bool,

    /// 日志级别（RUST_LOG 优先）
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(e) = real_main(cli) {
        eprintln!("❌ 运行失败: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn real_main(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("无法加载配置文件 {}", path.display()))?,
        None => AppConfig::load(DEFAULT_CONFIG_PATH),
    };

    // 命令行参数覆盖配置文件
    if let Some(fps) = cli.fps {
        config.simulation.fps = fps;
    }
    if let Some(scale) = cli.time_scale {
        config.simulation.time_scale = scale;
    }

    let mut runner = HeadlessRunner::new(config).context("配置无效")?;
    let report = runner.run(cli.target).context("转场运行失败")?;

    info!(
        frames = report.frames,
        active_scene = ?report.active_scene,
        "转场完成"
    );

    if cli.json {
        println!("{}", report.timeline.to_json()?);
    } else {
        print!("{}", report.timeline);
    }
    Ok(())
}
