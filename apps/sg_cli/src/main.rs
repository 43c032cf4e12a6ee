// apps/sg_cli/src/main.rs

//! SurgeLab 命令行界面
//!
//! 提供浅水模拟的命令行入口：运行内置场景、查看环境信息、
//! 验证配置文件。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 5: Application**，只消费 `sg_sim` 的
//! 编排接口与 `sg_physics` 的内置场景，不直接触碰引擎内部。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// SurgeLab 浅水模拟命令行工具
#[derive(Parser)]
#[command(name = "sg_cli")]
#[command(author = "SurgeLab Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "SurgeLab interactive shallow water simulation", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行模拟
    Run(commands::run::RunArgs),
    /// 显示信息
    Info(commands::info::InfoArgs),
    /// 验证配置
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 执行命令
    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
