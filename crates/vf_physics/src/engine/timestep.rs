// crates/vf_physics/src/engine/timestep.rs

//! 局部伪时间步
//!
//! 每个控制体同时受对流与粘性稳定性限制：
//!
//! ```text
//! Λ_inv  = Σ_faces |½(u_i + u_j)·n| + Σ_boundary |u_i·n|
//! Λ_visc = Σ_faces (4/3 μ + μ_t) |A|² / ρ      (面平均值)
//!
//! Δt_i = min( CFL V / Λ_inv ,  K_v CFL V² / Λ_visc ,  Δt_max )
//! ```
//!
//! 体积低于 `min_volume` 的控制体视为网格缺陷，直接报错而不是截断。
//! 全局步长为所有本分区点的最小值，再经 [`Communicator`] 取全局最小。

use rayon::prelude::*;
use vf_config::FlowConfig;
use vf_foundation::{Tolerance, VfError, VfResult};

use crate::comm::Communicator;
use crate::mesh::DualGeometry;
use crate::state::PrimitiveState;

/// 一次时间步计算的统计
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStepSummary {
    /// 本分区最小局部步长
    pub min_dt: f64,
    /// 本分区最大局部步长
    pub max_dt: f64,
    /// 全局步长（所有分区最小值）
    pub global_dt: f64,
}

/// 时间步估计器
#[derive(Debug, Clone)]
pub struct TimeStepEstimator {
    cfl: f64,
    max_delta_time: f64,
    local_time_stepping: bool,
    viscous_coefficient: f64,
    tolerance: Tolerance,
    parallel: bool,
    // 谱半径缓冲，按点数复用
    lambda_inv: Vec<f64>,
    lambda_visc: Vec<f64>,
}

impl TimeStepEstimator {
    /// 由配置创建
    pub fn new(config: &FlowConfig, tolerance: Tolerance) -> Self {
        Self {
            cfl: config.time.cfl,
            max_delta_time: config.time.max_delta_time,
            local_time_stepping: config.time.local_time_stepping,
            viscous_coefficient: config.time.viscous_coefficient,
            tolerance,
            parallel: config.numerics.parallel,
            lambda_inv: Vec::new(),
            lambda_visc: Vec::new(),
        }
    }

    /// CFL 数
    pub fn cfl(&self) -> f64 {
        self.cfl
    }

    /// 修改 CFL 数（外部驱动的自适应 CFL）
    pub fn set_cfl(&mut self, cfl: f64) {
        self.cfl = cfl;
    }

    /// 是否使用局部时间步
    pub fn local_time_stepping(&self) -> bool {
        self.local_time_stepping
    }

    fn spectral_radii(&mut self, geometry: &dyn DualGeometry, primitives: &PrimitiveState) {
        let n = geometry.n_points();
        self.lambda_inv.clear();
        self.lambda_inv.resize(n, 0.0);
        self.lambda_visc.clear();
        self.lambda_visc.resize(n, 0.0);

        for face in geometry.faces() {
            let (l, r) = (primitives.point(face.left), primitives.point(face.right));
            let area2 = face.normal.length_squared();

            let lam_inv = (0.5 * (l.velocity + r.velocity)).dot(face.normal).abs();
            let mu_lam = 0.5 * (l.mu_lam + r.mu_lam);
            let mu_turb = 0.5 * (l.mu_turb + r.mu_turb);
            let rho = 0.5 * (l.density + r.density);
            let lam_visc = (4.0 / 3.0 * mu_lam + mu_turb) * area2 / rho;

            self.lambda_inv[face.left] += lam_inv;
            self.lambda_inv[face.right] += lam_inv;
            self.lambda_visc[face.left] += lam_visc;
            self.lambda_visc[face.right] += lam_visc;
        }

        for m in 0..geometry.n_markers() {
            for vertex in geometry.marker_vertices(m) {
                let p = primitives.point(vertex.point);
                self.lambda_inv[vertex.point] += p.velocity.dot(vertex.normal).abs();
                self.lambda_visc[vertex.point] +=
                    (4.0 / 3.0 * p.mu_lam + p.mu_turb) * vertex.normal.length_squared() / p.density;
            }
        }
    }

    /// 计算局部时间步并写入 `dt`，返回统计
    ///
    /// 非局部时间步模式下，所有点写入全局步长。halo 点总是写入全局步长。
    pub fn compute(
        &mut self,
        geometry: &dyn DualGeometry,
        primitives: &PrimitiveState,
        comm: &dyn Communicator,
        dt: &mut [f64],
    ) -> VfResult<TimeStepSummary> {
        let n = geometry.n_points();
        VfError::check_size("primitives", n, primitives.len())?;
        VfError::check_size("time_step", n, dt.len())?;

        self.spectral_radii(geometry, primitives);

        let n_domain = geometry.n_points_domain();
        let (cfl, k_visc, dt_max, min_volume) = (
            self.cfl,
            self.viscous_coefficient,
            self.max_delta_time,
            self.tolerance.min_volume,
        );
        let (lam_inv, lam_visc) = (&self.lambda_inv, &self.lambda_visc);

        let local_step = |(p, slot): (usize, &mut f64)| -> VfResult<()> {
            let volume = geometry.volume(p);
            if volume.is_nan() || volume < min_volume {
                return Err(VfError::degenerate_geometry(p, volume));
            }
            let mut step = dt_max;
            if lam_inv[p] > 0.0 {
                step = step.min(cfl * volume / lam_inv[p]);
            }
            if lam_visc[p] > 0.0 {
                step = step.min(k_visc * cfl * volume * volume / lam_visc[p]);
            }
            if !step.is_finite() || step <= 0.0 {
                return Err(VfError::non_finite("time_step", p));
            }
            *slot = step;
            Ok(())
        };

        let owned = &mut dt[..n_domain];
        if self.parallel {
            owned.par_iter_mut().enumerate().try_for_each(local_step)?;
        } else {
            owned.iter_mut().enumerate().try_for_each(local_step)?;
        }

        let (min_dt, max_dt) = owned
            .iter()
            .fold((f64::INFINITY, 0.0f64), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let global_dt = comm.min(min_dt.min(dt_max));

        if self.local_time_stepping {
            dt[n_domain..].fill(global_dt);
        } else {
            dt.fill(global_dt);
        }

        log::trace!("时间步: min={:.3e} max={:.3e} global={:.3e}", min_dt, max_dt, global_dt);
        Ok(TimeStepSummary {
            min_dt,
            max_dt,
            global_dt,
        })
    }
}
