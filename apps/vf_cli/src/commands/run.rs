// apps/vf_cli/src/commands/run.rs

//! 运行平板算例
//!
//! 在拉伸的矩形对偶网格上组装粘性残差、施加壁面约束，用显式伪时间
//! 推进扩散项，最后积分壁面力并输出系数报告。
//!
//! # 架构说明
//!
//! 线性求解与对流格式不在本仓库内，这里的推进只含粘性扩散、没有对流，
//! 不会形成边界层：速度从壁面向均匀来流纯扩散，报告中的摩擦系数
//! 沿流向并不下降，不能与 Blasius 解对比。该命令只用于演示残差组装、
//! 壁面约束与力积分的完整调用链；由边界层速度场算出摩擦系数的验证见
//! `vf_physics` 的 `tests/flat_plate.rs`。

use anyhow::{bail, Context, Result};
use clap::Args;
use glam::DVec3;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use vf_config::{FlowConfig, MarkerConfig, MarkerKind, MonitoringSurface};
use vf_physics::engine::FlowSolver;
use vf_physics::forces::{CoefficientKind, CoefficientTable, ForceReport};
use vf_physics::mesh::{DualGeometry, DualMesh};

/// 平板网格四条边的标记名（下、右、上、左）
pub const PLATE_MARKERS: [&str; 4] = ["wall", "outlet", "farfield", "inlet"];

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径（缺省为内置平板算例）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 流向点数
    #[arg(long, default_value = "41")]
    pub nx: usize,

    /// 法向点数
    #[arg(long, default_value = "25")]
    pub ny: usize,

    /// 平板起点 x 坐标 [m]
    #[arg(long, default_value = "0.05")]
    pub x_start: f64,

    /// 平板长度 [m]
    #[arg(long, default_value = "1.0")]
    pub length: f64,

    /// 计算域高度 [m]
    #[arg(long, default_value = "0.2")]
    pub height: f64,

    /// 法向网格增长率
    #[arg(long, default_value = "1.2")]
    pub growth: f64,

    /// 伪时间迭代步数
    #[arg(short = 'n', long, default_value = "200")]
    pub iterations: usize,

    /// 残差输出间隔
    #[arg(long, default_value = "20")]
    pub print_interval: usize,

    /// 系数报告 JSON 输出路径
    #[arg(short, long)]
    pub report: Option<PathBuf>,
}

/// 内置平板算例：空气 10 m/s 掠过 300 K 等温平板
pub fn flat_plate_config() -> FlowConfig {
    let mut config = FlowConfig::default();
    config.freestream.density = 1.2;
    config.freestream.velocity = 10.0;
    config.freestream.viscosity_inf = 1.8e-5;
    config.freestream.temperature = 288.15;
    config.time.cfl = 0.5;
    config.markers = vec![
        MarkerConfig::isothermal_wall(PLATE_MARKERS[0], 300.0),
        MarkerConfig::new(PLATE_MARKERS[1], MarkerKind::Outlet),
        MarkerConfig::new(PLATE_MARKERS[2], MarkerKind::Farfield),
        MarkerConfig::new(PLATE_MARKERS[3], MarkerKind::Inlet),
    ];
    config.monitoring_surfaces = vec![MonitoringSurface::new("plate", [PLATE_MARKERS[0]])];
    config
}

/// 流向均匀、法向按几何级数加密的平板网格
pub fn plate_mesh(args: &RunArgs) -> Result<DualMesh> {
    if args.nx < 2 || args.ny < 2 {
        bail!("网格每个方向至少需要 2 个点: nx={}, ny={}", args.nx, args.ny);
    }
    if !(args.growth > 0.0 && args.length > 0.0 && args.height > 0.0) {
        bail!("长度、高度与增长率必须为正数");
    }

    let dx = args.length / (args.nx - 1) as f64;
    let xs: Vec<f64> = (0..args.nx).map(|i| args.x_start + dx * i as f64).collect();

    let cells = (args.ny - 1) as i32;
    let first = if (args.growth - 1.0).abs() < 1e-12 {
        args.height / cells as f64
    } else {
        args.height * (args.growth - 1.0) / (args.growth.powi(cells) - 1.0)
    };
    let mut ys = Vec::with_capacity(args.ny);
    let mut y = 0.0;
    let mut h = first;
    ys.push(y);
    for _ in 0..cells {
        y += h;
        h *= args.growth;
        ys.push(y);
    }

    DualMesh::rectilinear(&xs, &ys, PLATE_MARKERS).context("构建平板网格失败")
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== ViscoFlow 平板算例 ===");

    let config = match &args.config {
        Some(path) => FlowConfig::from_file(path)
            .with_context(|| format!("读取配置失败: {}", path.display()))?,
        None => flat_plate_config(),
    };
    if args.iterations == 0 {
        bail!("迭代步数必须大于 0");
    }

    let mesh = plate_mesh(&args)?;
    info!(
        "网格: {} 点, {} 面, 第一层高度 {:.3e} m",
        mesh.n_points(),
        mesh.faces().len(),
        mesh.coord(args.nx).y
    );

    let mut solver = FlowSolver::builder(Arc::new(mesh), config)
        .build()
        .context("构建求解器失败")?;
    info!(
        "求解器: 对流={}, 梯度={}, 粘性格式={}",
        solver.convective_name(),
        solver.gradient_name(),
        solver.viscous().scheme().name()
    );

    let fixed = freestream_points(&solver);
    let interval = args.print_interval.max(1);
    let start = Instant::now();
    let mut report = None;

    for iter in 1..=args.iterations {
        let output = iter == args.iterations;
        let stats = solver.run_iteration(output).context("迭代失败")?;

        if !stats.primitives.is_clean() {
            warn!("第 {} 步: {} 个非物理点", iter, stats.primitives.non_physical);
        }
        if iter == 1 || iter % interval == 0 || output {
            let log_rms = stats.norms.log_rms();
            let layout = solver.layout();
            info!(
                "iter {:5}: log10(rms) u={:.3} v={:.3} T={:.3}  dt=[{:.2e}, {:.2e}]",
                iter,
                log_rms[layout.velocity(0)],
                log_rms[layout.velocity(1)],
                log_rms[layout.temperature()],
                stats.time_step.min_dt,
                stats.time_step.max_dt
            );
        }

        if output {
            report = stats.forces;
        } else {
            relax(&mut solver, &fixed);
        }
    }

    let report = match report {
        Some(r) => r,
        None => bail!("最后一步没有生成系数报告"),
    };

    print_report(&solver, &report);
    if let Some(path) = &args.report {
        write_report(path, &solver, &report)?;
        info!("系数报告已写入 {}", path.display());
    }

    info!("=== 完成: {} 步, 用时 {:.2} s ===", args.iterations, start.elapsed().as_secs_f64());
    Ok(())
}

/// 入口与远场点保持来流
fn freestream_points(solver: &FlowSolver) -> Vec<bool> {
    let geometry = solver.geometry();
    let mut fixed = vec![false; geometry.n_points()];
    for m in 0..geometry.n_markers() {
        let held = matches!(
            solver.config().marker(geometry.marker_name(m)).map(|c| c.kind),
            Some(MarkerKind::Inlet) | Some(MarkerKind::Farfield)
        );
        if held {
            for vertex in geometry.marker_vertices(m) {
                fixed[vertex.point] = true;
            }
        }
    }
    fixed
}

/// 显式伪时间推进扩散项：Δu = -Δt R / (ρV)，ΔT = -Δt R / (ρ c_p V)
///
/// 只有粘性残差，没有对流项。壁面行的残差已被清零，推进后仍满足约束。
fn relax(solver: &mut FlowSolver, fixed: &[bool]) {
    let layout = solver.layout();
    let cp = solver.config().fluid.specific_heat;
    let n = solver.geometry().n_points_domain();

    let updates: Vec<(DVec3, f64)> = (0..n)
        .map(|p| {
            if fixed[p] {
                return (DVec3::ZERO, 0.0);
            }
            let rho = solver.primitives().point(p).density;
            let scale = solver.time_steps()[p] / (rho * solver.geometry().volume(p));
            let residual = solver.residual();
            let mut du = DVec3::ZERO;
            for d in 0..layout.n_dim() {
                du[d] = -scale * residual.get(p, layout.velocity(d));
            }
            (du, -scale / cp * residual.get(p, layout.temperature()))
        })
        .collect();

    let working = solver.working_mut();
    for (p, (du, dt)) in updates.into_iter().enumerate() {
        working.velocity[p] += du;
        working.temperature[p] += dt;
    }
}

const REPORTED: [CoefficientKind; 7] = [
    CoefficientKind::CD,
    CoefficientKind::CL,
    CoefficientKind::CFx,
    CoefficientKind::CFy,
    CoefficientKind::CMz,
    CoefficientKind::HF,
    CoefficientKind::MaxHF,
];

fn print_row(label: &str, values: impl Fn(CoefficientKind) -> f64) {
    print!("{:<12}", label);
    for kind in REPORTED {
        print!(" {:>12.5e}", values(kind));
    }
    println!();
}

fn print_table(title: &str, solver: &FlowSolver, table: &CoefficientTable) {
    println!("\n--- {} ---", title);
    print!("{:<12}", "标记");
    for kind in REPORTED {
        print!(" {:>12}", kind.name());
    }
    println!();
    for m in 0..table.n_markers() {
        print_row(solver.geometry().marker_name(m), |k| table.marker(k, m));
    }
    for (s, surface) in table.surfaces().iter().enumerate() {
        print_row(&format!("[{}]", surface.name), |k| table.surface(k, s));
    }
    print_row("AllBound", |k| table.all_bound(k));
}

fn print_report(solver: &FlowSolver, report: &ForceReport) {
    println!("\n=== 系数报告 ===");
    print_table("压力", solver, &report.inviscid);
    print_table("粘性", solver, &report.viscous);
    print_table("合计", solver, &report.total);

    let geometry = solver.geometry();
    let Some(wall) = geometry.marker_index(PLATE_MARKERS[0]) else {
        return;
    };
    let vertices = geometry.marker_vertices(wall);
    let step = (vertices.len() / 10).max(1);
    println!("\n--- 壁面分布 ---");
    println!("{:>10} {:>12} {:>10} {:>12}", "x", "Cf", "y+", "q [W/m²]");
    let diag = solver.wall_diagnostics();
    for v in (0..vertices.len()).step_by(step) {
        println!(
            "{:>10.4} {:>12.5e} {:>10.3} {:>12.5e}",
            geometry.coord(vertices[v].point).x,
            diag.skin_friction(wall, v).x,
            diag.y_plus(wall, v),
            diag.heat_flux(wall, v)
        );
    }
}

fn table_json(solver: &FlowSolver, table: &CoefficientTable) -> Value {
    let values = |get: &dyn Fn(CoefficientKind) -> f64| -> Value {
        let map: Map<String, Value> = CoefficientKind::ALL
            .iter()
            .map(|&k| (k.name().to_string(), json!(get(k))))
            .collect();
        Value::Object(map)
    };

    let markers: Map<String, Value> = (0..table.n_markers())
        .map(|m| (solver.geometry().marker_name(m).to_string(), values(&|k| table.marker(k, m))))
        .collect();
    let surfaces: Map<String, Value> = table
        .surfaces()
        .iter()
        .enumerate()
        .map(|(s, g)| (g.name.clone(), values(&|k| table.surface(k, s))))
        .collect();

    json!({
        "all_bound": values(&|k| table.all_bound(k)),
        "markers": markers,
        "surfaces": surfaces,
    })
}

fn report_json(solver: &FlowSolver, report: &ForceReport) -> Value {
    json!({
        "inviscid": table_json(solver, &report.inviscid),
        "viscous": table_json(solver, &report.viscous),
        "total": table_json(solver, &report.total),
    })
}

fn write_report(path: &Path, solver: &FlowSolver, report: &ForceReport) -> Result<()> {
    let content = serde_json::to_string_pretty(&report_json(solver, report))?;
    std::fs::write(path, content).with_context(|| format!("无法写入 {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            config: None,
            nx: 6,
            ny: 5,
            x_start: 0.1,
            length: 0.5,
            height: 0.1,
            growth: 1.5,
            iterations: 3,
            print_interval: 1,
            report: None,
        }
    }

    #[test]
    fn test_plate_mesh_stretching() {
        let mesh = plate_mesh(&args()).unwrap();
        assert_eq!(mesh.n_points(), 30);
        let y1 = mesh.coord(6).y;
        let y2 = mesh.coord(12).y;
        assert!(((y2 - y1) / y1 - 1.5).abs() < 1e-12);
        assert!((mesh.coord(29).y - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_mesh_args() {
        let mut a = args();
        a.ny = 1;
        assert!(plate_mesh(&a).is_err());
    }

    #[test]
    fn test_report_written() {
        let mut solver = FlowSolver::builder(Arc::new(plate_mesh(&args()).unwrap()), flat_plate_config())
            .build()
            .unwrap();
        let stats = solver.run_iteration(true).unwrap();
        let report = stats.forces.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report(&path, &solver, &report).unwrap();

        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value["viscous"]["markers"]["wall"]["CD"].is_number());
        assert!(value["total"]["surfaces"]["plate"]["HF"].is_number());
    }

    #[test]
    fn test_relax_keeps_wall_constraints() {
        let mut solver = FlowSolver::builder(Arc::new(plate_mesh(&args()).unwrap()), flat_plate_config())
            .build()
            .unwrap();
        let fixed = freestream_points(&solver);
        for _ in 0..3 {
            solver.run_iteration(false).unwrap();
            relax(&mut solver, &fixed);
        }
        // 壁面中点无滑移且为壁温
        assert_eq!(solver.working().velocity[2], DVec3::ZERO);
        assert_eq!(solver.working().temperature[2], 300.0);
        // 入口点保持来流
        assert_eq!(solver.working().velocity[6], DVec3::new(10.0, 0.0, 0.0));
    }
}
