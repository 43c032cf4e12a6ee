// apps/sg_cli/src/commands/run.rs

//! 运行模拟命令
//!
//! 用内置场景驱动一个模拟实例若干帧，周期性打印场统计。
//! 命令行以批处理方式消费交互接口：每帧启动 tick 后立即
//! 汇合，等价于一个永不掉帧的宿主。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use sg_physics::{CircularDamBreak, DamBreak1d, LakeAtRest, ScenarioProvider};
use sg_sim::{Simulation, SimulationConfig};

/// 运行模拟参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径（JSON）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 内置场景: dambreak, circular, lake
    #[arg(short, long, default_value = "circular")]
    pub scenario: String,

    /// 模拟帧数
    #[arg(short = 'n', long, default_value = "600")]
    pub frames: u32,

    /// 每帧真实时长 [秒]
    #[arg(long, default_value = "0.016667")]
    pub frame_dt: f64,

    /// 统计打印间隔（帧数）
    #[arg(long, default_value = "60")]
    pub report_every: u32,

    /// 工作线程数（0 = 硬件并行度, 覆盖配置文件）
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== SurgeLab 模拟启动 ===");

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("加载配置 {} 失败", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(threads) = args.threads {
        config.num_threads = threads;
    }
    // 批处理模式不需要帧预算保护
    config.tick_budget_secs = 0.0;

    let provider: Arc<dyn ScenarioProvider> = match args.scenario.as_str() {
        "dambreak" => Arc::new(DamBreak1d::standard()),
        "circular" => Arc::new(CircularDamBreak::standard()),
        "lake" => Arc::new(LakeAtRest::standard()),
        other => bail!("未知场景: {other} (可选: dambreak, circular, lake)"),
    };

    let mut sim = Simulation::new(config).context("创建模拟实例失败")?;
    sim.init(provider).context("初始化场景失败")?;

    let snap = sim.snapshot().context("初始化后未发布快照")?;
    info!(
        "场景: {}, 网格: {}×{}, 帧数: {}",
        args.scenario, snap.width, snap.height, args.frames
    );

    let start = Instant::now();
    for frame in 1..=args.frames {
        sim.tick(args.frame_dt).context("tick 失败")?;
        sim.wait_for_tick();

        if frame % args.report_every.max(1) == 0 {
            report(&sim, frame);
        }
    }
    let elapsed = start.elapsed();

    let status = sim.status();
    info!("=== 模拟完成 ===");
    info!(
        "模拟时间: {:.3} s, 墙钟: {:.3} s, 比率: {:.2}x",
        status.sim_time,
        elapsed.as_secs_f64(),
        status.sim_time / elapsed.as_secs_f64().max(1e-9)
    );
    Ok(())
}

fn report(sim: &Simulation, frame: u32) {
    let Some(snap) = sim.snapshot() else { return };
    let status = sim.status();

    let h_max = snap.h.iter().cloned().fold(0.0_f64, f64::max);
    let h_min = snap
        .h
        .iter()
        .cloned()
        .filter(|&h| h > 0.0)
        .fold(f64::MAX, f64::min);
    let q_max = snap
        .hu
        .iter()
        .chain(snap.hv.iter())
        .fold(0.0_f64, |m, q| m.max(q.abs()));
    let substeps = status.last_outcome.map_or(0, |o| o.substeps);

    info!(
        "帧 {frame}: t={:.3} s, h=[{:.4}, {:.4}] m, |q|_max={:.4} m²/s, 子步={substeps}",
        status.sim_time, h_min, h_max, q_max
    );
}
