// apps/vf_cli/src/main.rs

//! ViscoFlow 命令行界面
//!
//! 粘性通量与壁面边界子系统的驱动程序。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 5: Application**：
//! - 只通过 `FlowSolver` 与物理层交互
//! - 配置以 JSON 文件给出，由 `vf_config` 解析与校验

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// ViscoFlow 粘性流动求解器命令行工具
#[derive(Parser)]
#[command(name = "vf_cli")]
#[command(author = "ViscoFlow Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "ViscoFlow viscous flux and wall boundary solver", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行平板算例
    Run(commands::run::RunArgs),
    /// 显示信息
    Info(commands::info::InfoArgs),
    /// 验证配置
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // try_init 同时桥接物理层的 log 记录
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
