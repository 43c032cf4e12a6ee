// apps/sg_cli/src/commands/info.rs

//! 显示信息命令

use anyhow::Result;
use clap::Args;

use sg_sim::SimulationConfig;

/// 信息参数
#[derive(Args)]
pub struct InfoArgs {
    /// 输出默认配置（JSON，可重定向为配置文件模板）
    #[arg(long)]
    pub default_config: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    if args.default_config {
        let config = SimulationConfig::default();
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("SurgeLab v{}", env!("CARGO_PKG_VERSION"));
    println!("浅水方程交互模拟引擎");
    println!();
    println!("硬件并行度: {}", available_parallelism());
    println!("内置场景:   dambreak, circular, lake");
    println!("默认配置:   sg_cli info --default-config");
    Ok(())
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}
