// crates/vf_physics/src/forces/integrator.rs

//! 壁面力与系数积分
//!
//! 只在输出迭代调用。每次调用先清零再从头积分，不做增量更新。
//!
//! # 约定
//!
//! 边界顶点法向 `n` 指向流体域外（即指向物体内部），作用在物体上的力：
//!
//! ```text
//! 压力:   F_p = (p − p_ref) n
//! 粘性:   F_v = −τ n          τ 取分子粘度，不含湍动能项
//! 力矩:   M   = (x − x_ref) × F
//! ```
//!
//! 系数以 `q∞ A_ref` 归一化，力矩再除以 `L_ref`。热通量 HF、MaxHF 保持
//! 有量纲。
//!
//! # 并行
//!
//! 标记间并行积分，跨分区求和经 [`Communicator`]，标记汇总按标记顺序
//! 串行完成。单分区下两次调用结果逐位相同。

use glam::DVec3;
use rayon::prelude::*;
use vf_config::FlowConfig;
use vf_foundation::{safe_div, Tolerance, VfError, VfResult};

use super::coefficients::{CoefficientKind, CoefficientTable, CoefficientValues, SurfaceGroup};
use super::diagnostics::{MarkerDiagnostics, WallDiagnostics};
use crate::boundary::{BoundaryError, WallKind};
use crate::comm::Communicator;
use crate::gradient::GradientProvider;
use crate::mesh::DualGeometry;
use crate::state::PrimitiveState;
use crate::viscous::{strain_rate_magnitude, stress_tensor, vorticity, wall_shear};

// ============================================================
// 参考系
// ============================================================

/// 系数归一化与风轴参考量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceFrame {
    /// 空间维数
    pub n_dim: usize,
    /// 力矩参考点
    pub origin: DVec3,
    /// 参考面积
    pub area: f64,
    /// 参考长度
    pub length: f64,
    /// 动压 q∞
    pub dynamic_pressure: f64,
    /// 压力积分参考压力
    pub pressure: f64,
    /// 攻角 [rad]
    pub alpha: f64,
    /// 侧滑角 [rad]
    pub beta: f64,
}

impl ReferenceFrame {
    /// 由配置创建
    pub fn from_config(config: &FlowConfig) -> Self {
        Self {
            n_dim: config.dimension,
            origin: DVec3::from_array(config.reference.origin),
            area: config.reference.area,
            length: config.reference.length,
            dynamic_pressure: config.freestream.dynamic_pressure(),
            pressure: config.reference_pressure(),
            alpha: config.freestream.angle_of_attack.to_radians(),
            beta: config.freestream.sideslip.to_radians(),
        }
    }

    /// 力系数因子 1/(q∞ A_ref)
    #[inline]
    pub fn force_factor(&self) -> f64 {
        safe_div(1.0, self.dynamic_pressure * self.area, f64::MIN_POSITIVE)
    }

    /// 体轴力系数转风轴，返回 (CD, CL, CSF)
    pub fn wind_axes(&self, cf: DVec3) -> (f64, f64, f64) {
        let (sa, ca) = self.alpha.sin_cos();
        if self.n_dim == 2 {
            (cf.x * ca + cf.y * sa, -cf.x * sa + cf.y * ca, 0.0)
        } else {
            let (sb, cb) = self.beta.sin_cos();
            (
                cf.x * ca * cb + cf.y * sb + cf.z * sa * cb,
                -cf.x * sa + cf.z * ca,
                -cf.x * sb * ca + cf.y * cb - cf.z * sb * sa,
            )
        }
    }
}

// ============================================================
// 标记载荷
// ============================================================

/// 单个标记的有量纲载荷
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarkerLoads {
    /// 合力
    pub force: DVec3,
    /// 对参考点的合力矩
    pub moment: DVec3,
    /// 压心一阶矩
    pub center_of_pressure: DVec3,
    /// 热载荷 Σ q A
    pub heat: f64,
    /// 最大 |q|
    pub max_heat_flux: f64,
}

/// 求和归约的分量数
const SUM_FIELDS: usize = 10;

impl MarkerLoads {
    /// 累加一个顶点上的力，`lever` 为相对参考点的位置
    pub fn add_force(&mut self, n_dim: usize, lever: DVec3, force: DVec3) {
        self.force += force;
        self.moment += lever.cross(force);
        self.center_of_pressure += if n_dim == 2 {
            DVec3::new(force.y * lever.x, force.x * lever.y, 0.0)
        } else {
            DVec3::new(force.z * lever.x, force.z * lever.y, force.x * lever.z)
        };
    }

    fn write_sums(&self, out: &mut [f64]) {
        out[0..3].copy_from_slice(&self.force.to_array());
        out[3..6].copy_from_slice(&self.moment.to_array());
        out[6..9].copy_from_slice(&self.center_of_pressure.to_array());
        out[9] = self.heat;
    }

    fn read_sums(&mut self, src: &[f64]) {
        self.force = DVec3::new(src[0], src[1], src[2]);
        self.moment = DVec3::new(src[3], src[4], src[5]);
        self.center_of_pressure = DVec3::new(src[6], src[7], src[8]);
        self.heat = src[9];
    }

    /// 转换为系数（CEff/CMerit 留给系数表汇总时计算）
    pub fn to_coefficients(&self, frame: &ReferenceFrame) -> CoefficientValues {
        use CoefficientKind::*;

        let factor = frame.force_factor();
        let cf = self.force * factor;
        let cm = self.moment * safe_div(factor, frame.length, f64::MIN_POSITIVE);
        let cop = self.center_of_pressure * factor;
        let (cd, cl, csf) = frame.wind_axes(cf);

        let mut v = CoefficientValues::zeros();
        v[CD] = cd;
        v[CL] = cl;
        v[CSF] = csf;
        v[CFx] = cf.x;
        v[CFy] = cf.y;
        v[CFz] = cf.z;
        v[CMx] = cm.x;
        v[CMy] = cm.y;
        v[CMz] = cm.z;
        v[CoPx] = cop.x;
        v[CoPy] = cop.y;
        v[CoPz] = cop.z;
        v[CT] = -cf.x;
        v[CQ] = -cm.z;
        v[HF] = self.heat;
        v[MaxHF] = self.max_heat_flux;
        v
    }
}

/// 积分过程中扫描到的壁面应变率与涡量极值
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WallExtrema {
    /// 最大应变率模
    pub strain_mag_max: f64,
    /// 最大涡量模
    pub omega_max: f64,
}

impl WallExtrema {
    fn merge(self, other: Self) -> Self {
        Self {
            strain_mag_max: self.strain_mag_max.max(other.strain_mag_max),
            omega_max: self.omega_max.max(other.omega_max),
        }
    }
}

/// 一次积分的结果：无粘、粘性与合计
#[derive(Debug, Clone, PartialEq)]
pub struct ForceReport {
    /// 压力贡献
    pub inviscid: CoefficientTable,
    /// 粘性贡献
    pub viscous: CoefficientTable,
    /// 合计
    pub total: CoefficientTable,
}

// ============================================================
// 积分器
// ============================================================

#[derive(Debug, Clone)]
struct MarkerSetup {
    name: String,
    physical: bool,
    monitored: bool,
    wall: Option<WallKind>,
}

/// 壁面力积分器
#[derive(Debug, Clone)]
pub struct ForceIntegrator {
    frame: ReferenceFrame,
    markers: Vec<MarkerSetup>,
    specific_heat: f64,
    prandtl_lam: f64,
    tolerance: Tolerance,
    parallel: bool,
    inviscid: CoefficientTable,
    viscous: CoefficientTable,
    diagnostics: WallDiagnostics,
}

impl ForceIntegrator {
    /// 创建积分器
    ///
    /// 网格中未出现在配置里的标记视为分区交界（非物理、不监控）。
    pub fn new(
        geometry: &dyn DualGeometry,
        config: &FlowConfig,
        tolerance: Tolerance,
    ) -> Result<Self, BoundaryError> {
        for marker in &config.markers {
            if geometry.marker_index(&marker.name).is_none() {
                return Err(BoundaryError::MarkerNotFound(marker.name.clone()));
            }
        }

        let markers: Vec<MarkerSetup> = (0..geometry.n_markers())
            .map(|m| {
                let name = geometry.marker_name(m).to_string();
                match config.marker(&name) {
                    Some(cfg) => MarkerSetup {
                        physical: cfg.kind.is_physical(),
                        monitored: cfg.monitoring && cfg.kind.is_physical(),
                        wall: WallKind::from_marker_kind(&cfg.kind),
                        name,
                    },
                    None => MarkerSetup {
                        name,
                        physical: false,
                        monitored: false,
                        wall: None,
                    },
                }
            })
            .collect();

        let mut surfaces = Vec::with_capacity(config.monitoring_surfaces.len());
        for surface in &config.monitoring_surfaces {
            let indices = surface
                .markers
                .iter()
                .map(|name| {
                    geometry
                        .marker_index(name)
                        .ok_or_else(|| BoundaryError::MarkerNotFound(name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            surfaces.push(SurfaceGroup {
                name: surface.name.clone(),
                markers: indices,
            });
        }

        let physical: Vec<bool> = markers.iter().map(|m| m.physical).collect();
        let table = CoefficientTable::new(physical, surfaces).with_threshold(tolerance.min_drag);

        Ok(Self {
            frame: ReferenceFrame::from_config(config),
            markers,
            specific_heat: config.fluid.specific_heat,
            prandtl_lam: config.fluid.prandtl_lam,
            tolerance,
            parallel: config.numerics.parallel,
            inviscid: table.clone(),
            viscous: table,
            diagnostics: WallDiagnostics::new(geometry),
        })
    }

    /// 参考系
    pub fn frame(&self) -> &ReferenceFrame {
        &self.frame
    }

    /// 粘性系数表
    pub fn viscous(&self) -> &CoefficientTable {
        &self.viscous
    }

    /// 压力系数表
    pub fn inviscid(&self) -> &CoefficientTable {
        &self.inviscid
    }

    /// 逐顶点诊断量
    pub fn diagnostics(&self) -> &WallDiagnostics {
        &self.diagnostics
    }

    /// 标记名称
    pub fn marker_name(&self, marker: usize) -> &str {
        &self.markers[marker].name
    }

    /// 当前三张系数表
    pub fn report(&self) -> ForceReport {
        ForceReport {
            inviscid: self.inviscid.clone(),
            viscous: self.viscous.clone(),
            total: self.inviscid.combined(&self.viscous),
        }
    }

    fn check_sizes(geometry: &dyn DualGeometry, primitives: &PrimitiveState) -> VfResult<()> {
        VfError::check_size("primitives", geometry.n_points(), primitives.len())
    }

    /// 粘性力积分（壁面摩擦、热通量、y+）
    ///
    /// 前提：原始变量与梯度已由同一次预处理刷新。
    pub fn friction_forces(
        &mut self,
        geometry: &dyn DualGeometry,
        primitives: &PrimitiveState,
        gradients: &dyn GradientProvider,
        comm: &dyn Communicator,
    ) -> VfResult<WallExtrema> {
        Self::check_sizes(geometry, primitives)?;
        self.viscous.reset();

        let frame = self.frame;
        let markers = &self.markers;
        let tol = self.tolerance.safe_div;
        let (cp, prandtl) = (self.specific_heat, self.prandtl_lam);
        let inv_q = safe_div(1.0, frame.dynamic_pressure, f64::MIN_POSITIVE);

        let compute = |(m, diag): (usize, &mut MarkerDiagnostics)| -> VfResult<(MarkerLoads, WallExtrema)> {
            diag.clear();
            let mut loads = MarkerLoads::default();
            let mut extrema = WallExtrema::default();
            if markers[m].wall.is_none() {
                return Ok((loads, extrema));
            }

            for (v, vertex) in geometry.marker_vertices(m).iter().enumerate() {
                let p = vertex.point;
                if !geometry.is_owned(p) {
                    continue;
                }
                let prim = primitives.point(p);
                let grad = gradients.velocity_gradient(p);
                let unit = vertex.unit_normal();
                let area = vertex.area();
                let x = geometry.coord(p);

                let tau = stress_tensor(&grad, prim.mu_lam, prim.density, 0.0);
                // 摩擦按指向流体的法向取向，顺流为正
                let tau_w = wall_shear(&tau, -unit);
                let force = -(tau * vertex.normal);
                if !force.is_finite() {
                    return Err(VfError::non_finite("wall_shear", p));
                }

                let u_tau = safe_div(tau_w.length(), prim.density, tol).sqrt();
                let wall_dist = (geometry.coord(vertex.normal_neighbor) - x).dot(unit).abs();
                let q = cp * prim.mu_lam / prandtl * gradients.temperature_gradient(p).dot(unit);

                diag.skin_friction[v] = tau_w * inv_q;
                diag.y_plus[v] = safe_div(wall_dist * prim.density * u_tau, prim.mu_lam, tol);
                diag.heat_flux[v] = q;

                if markers[m].monitored {
                    loads.add_force(frame.n_dim, x - frame.origin, force);
                    loads.heat += q * area;
                    loads.max_heat_flux = loads.max_heat_flux.max(q.abs());
                }

                extrema = extrema.merge(WallExtrema {
                    strain_mag_max: strain_rate_magnitude(&grad),
                    omega_max: vorticity(&grad).length(),
                });
            }
            Ok((loads, extrema))
        };

        let diags = self.diagnostics.markers_mut();
        let results: Vec<(MarkerLoads, WallExtrema)> = if self.parallel {
            diags.par_iter_mut().enumerate().map(compute).collect::<VfResult<_>>()?
        } else {
            diags.iter_mut().enumerate().map(compute).collect::<VfResult<_>>()?
        };

        let mut loads: Vec<MarkerLoads> = results.iter().map(|(l, _)| *l).collect();
        let local = results
            .iter()
            .fold(WallExtrema::default(), |acc, (_, e)| acc.merge(*e));
        Self::reduce_loads(&mut loads, comm);
        let mut ext = [local.strain_mag_max, local.omega_max];
        comm.all_reduce_max(&mut ext);

        Self::store(&mut self.viscous, &self.markers, &loads, &frame);
        log::debug!(
            "粘性系数: CD={:.6e} CL={:.6e} HF={:.6e}",
            self.viscous.all_bound(CoefficientKind::CD),
            self.viscous.all_bound(CoefficientKind::CL),
            self.viscous.all_bound(CoefficientKind::HF)
        );

        Ok(WallExtrema {
            strain_mag_max: ext[0],
            omega_max: ext[1],
        })
    }

    /// 压力（无粘）力积分
    pub fn pressure_forces(
        &mut self,
        geometry: &dyn DualGeometry,
        primitives: &PrimitiveState,
        comm: &dyn Communicator,
    ) -> VfResult<()> {
        Self::check_sizes(geometry, primitives)?;
        self.inviscid.reset();

        let frame = self.frame;
        let markers = &self.markers;
        let compute = |m: usize| -> VfResult<MarkerLoads> {
            let mut loads = MarkerLoads::default();
            if !markers[m].monitored {
                return Ok(loads);
            }
            for vertex in geometry.marker_vertices(m) {
                let p = vertex.point;
                if !geometry.is_owned(p) {
                    continue;
                }
                let force = (primitives.pressure(p) - frame.pressure) * vertex.normal;
                if !force.is_finite() {
                    return Err(VfError::non_finite("pressure_force", p));
                }
                loads.add_force(frame.n_dim, geometry.coord(p) - frame.origin, force);
            }
            Ok(loads)
        };

        let n = geometry.n_markers();
        let mut loads: Vec<MarkerLoads> = if self.parallel {
            (0..n).into_par_iter().map(compute).collect::<VfResult<_>>()?
        } else {
            (0..n).map(compute).collect::<VfResult<_>>()?
        };
        Self::reduce_loads(&mut loads, comm);
        Self::store(&mut self.inviscid, &self.markers, &loads, &frame);
        log::debug!(
            "压力系数: CD={:.6e} CL={:.6e}",
            self.inviscid.all_bound(CoefficientKind::CD),
            self.inviscid.all_bound(CoefficientKind::CL)
        );
        Ok(())
    }

    fn reduce_loads(loads: &mut [MarkerLoads], comm: &dyn Communicator) {
        let mut sums = vec![0.0; loads.len() * SUM_FIELDS];
        for (l, chunk) in loads.iter().zip(sums.chunks_exact_mut(SUM_FIELDS)) {
            l.write_sums(chunk);
        }
        let mut maxima: Vec<f64> = loads.iter().map(|l| l.max_heat_flux).collect();
        comm.all_reduce_sum(&mut sums);
        comm.all_reduce_max(&mut maxima);
        for ((l, chunk), max) in loads.iter_mut().zip(sums.chunks_exact(SUM_FIELDS)).zip(maxima) {
            l.read_sums(chunk);
            l.max_heat_flux = max;
        }
    }

    fn store(
        table: &mut CoefficientTable,
        markers: &[MarkerSetup],
        loads: &[MarkerLoads],
        frame: &ReferenceFrame,
    ) {
        for (m, (setup, l)) in markers.iter().zip(loads).enumerate() {
            if setup.monitored {
                table.set_marker_values(m, l.to_coefficients(frame));
            }
        }
        table.aggregate();
    }
}
