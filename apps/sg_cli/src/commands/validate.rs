// apps/sg_cli/src/commands/validate.rs

//! 验证配置命令

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use sg_sim::SimulationConfig;

/// 验证配置参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径（JSON）
    pub config: PathBuf,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    let config = SimulationConfig::from_json_file(&args.config)
        .with_context(|| format!("配置 {} 无效", args.config.display()))?;

    info!("配置有效: {}", args.config.display());
    info!(
        "  CFL={}, 重力={} m/s², 时间缩放={}x, 线程={}",
        config.cfl, config.gravity, config.simulated_time_per_real_second, config.num_threads
    );
    Ok(())
}
