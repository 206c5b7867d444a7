// apps/vf_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示版本、默认配置、容差与系数汇总规则。

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;
use vf_config::FlowConfig;
use vf_foundation::Tolerance;
use vf_physics::forces::{AggregationRule, CoefficientKind};

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 显示指定配置文件的摘要
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 显示默认配置
    #[arg(long)]
    pub defaults: bool,

    /// 显示系数种类与汇总规则
    #[arg(long)]
    pub coefficients: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== ViscoFlow 信息 ===");
    print_system_info();

    if let Some(path) = &args.config {
        let config = FlowConfig::from_file(path)
            .with_context(|| format!("读取配置失败: {}", path.display()))?;
        println!();
        print_config("配置摘要", &config);
    }

    if args.defaults || (args.config.is_none() && !args.coefficients) {
        println!();
        print_config("默认配置", &FlowConfig::default());
        println!();
        print_tolerance();
    }

    if args.coefficients {
        println!();
        print_coefficients();
    }

    Ok(())
}

fn print_system_info() {
    println!("=== 系统信息 ===");
    println!("ViscoFlow CLI 版本: {}", env!("CARGO_PKG_VERSION"));
    println!("目标平台: {}", std::env::consts::ARCH);
    println!("操作系统: {}", std::env::consts::OS);
    println!("rayon 线程数: {}", rayon::current_num_threads());
}

fn print_config(title: &str, config: &FlowConfig) {
    println!("=== {} ===", title);
    println!("维数: {}", config.dimension);
    println!(
        "来流: ρ={} kg/m³, U={} m/s, μ={:e} Pa·s, T={} K, α={}°",
        config.freestream.density,
        config.freestream.velocity,
        config.freestream.viscosity_inf,
        config.freestream.temperature,
        config.freestream.angle_of_attack
    );
    println!("动压: {} Pa", config.freestream.dynamic_pressure());
    println!(
        "物性: cp={} J/(kg·K), Pr={}, Pr_t={}",
        config.fluid.specific_heat, config.fluid.prandtl_lam, config.fluid.prandtl_turb
    );
    println!(
        "时间推进: CFL={}, Δt_max={:e}, 当地时间步={}, K_v={}, 隐式={}",
        config.time.cfl,
        config.time.max_delta_time,
        config.time.local_time_stepping,
        config.time.viscous_coefficient,
        config.time.implicit
    );
    println!(
        "数值: 面梯度={:?}, 并行={}",
        config.numerics.face_averaging, config.numerics.parallel
    );

    if !config.markers.is_empty() {
        println!("\n边界标记:");
        for m in &config.markers {
            println!(
                "  {:<16} {:<14} 监控={} 载荷={}",
                m.name,
                m.kind.name(),
                m.monitoring,
                m.fluid_load
            );
        }
    }
    for s in &config.monitoring_surfaces {
        println!("监控面 {}: {:?}", s.name, s.markers);
    }
}

fn print_tolerance() {
    println!("=== 容差设置 ===");
    let tol = Tolerance::default();
    println!("  min_volume: {:e}", tol.min_volume);
    println!("  min_drag: {:e}", tol.min_drag);
    println!("  min_distance: {:e}", tol.min_distance);
    println!("  safe_div: {:e}", tol.safe_div);
    println!("  divergence_limit: {:e}", tol.divergence_limit);
}

fn print_coefficients() {
    println!("=== 系数种类 ===");
    for kind in CoefficientKind::ALL {
        let rule = match kind.rule() {
            AggregationRule::Sum => "求和",
            AggregationRule::Max => "最大值",
            AggregationRule::Derived => "导出",
        };
        println!("  {:<8} {}", kind.name(), rule);
    }
}
