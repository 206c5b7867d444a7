// crates/vf_physics/src/primitive.rs

//! 原始变量计算器
//!
//! 由工作变量（p, u, T）与外部湍流输出导出每点的密度、分子粘度、
//! 涡粘度与湍动能。
//!
//! 非物理点（密度/温度非正或出现非有限值）不是错误：计数返回，
//! 该点保留上一次的原始变量。同样输入重复调用结果相同。

use glam::DVec3;
use rayon::prelude::*;
use vf_config::{FlowConfig, FluidModel, ViscosityModel};
use vf_foundation::{VfError, VfResult};

use crate::state::{PrimitivePoint, PrimitiveState, WorkingState};
use crate::turbulence::EddyViscosityField;

/// 一次计算的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrimitiveReport {
    /// 参与计算的点数
    pub n_points: usize,
    /// 非物理点数
    pub non_physical: usize,
}

impl PrimitiveReport {
    /// 是否全部为物理状态
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.non_physical == 0
    }
}

/// 原始变量计算器
#[derive(Debug, Clone)]
pub struct PrimitiveEvaluator {
    density_model: FluidModel,
    viscosity_model: ViscosityModel,
    density_inf: f64,
    viscosity_inf: f64,
    tke_inf: f64,
}

impl PrimitiveEvaluator {
    /// 由配置构造
    pub fn new(config: &FlowConfig) -> Self {
        Self {
            density_model: config.fluid.density_model,
            viscosity_model: config.fluid.viscosity_model,
            density_inf: config.freestream.density,
            viscosity_inf: config.freestream.viscosity_inf,
            tke_inf: config.freestream.tke_inf,
        }
    }

    /// 密度
    #[inline]
    pub fn density(&self, temperature: f64) -> f64 {
        match self.density_model {
            FluidModel::ConstantDensity => self.density_inf,
            FluidModel::IncompressibleIdealGas {
                gas_constant,
                operating_pressure,
            } => operating_pressure / (gas_constant * temperature),
        }
    }

    /// 分子粘度
    #[inline]
    pub fn laminar_viscosity(&self, temperature: f64) -> f64 {
        match self.viscosity_model {
            ViscosityModel::Constant => self.viscosity_inf,
            ViscosityModel::Sutherland { mu_ref, t_ref, s } => {
                mu_ref * (temperature / t_ref).powf(1.5) * (t_ref + s) / (temperature + s)
            }
        }
    }

    /// 单点求值，非物理时返回 `None`
    fn evaluate_point(
        &self,
        pressure: f64,
        velocity: DVec3,
        temperature: f64,
        mu_turb: f64,
        tke: f64,
    ) -> Option<PrimitivePoint> {
        if !pressure.is_finite() || !velocity.is_finite() || !temperature.is_finite() {
            return None;
        }
        if temperature <= 0.0 {
            return None;
        }
        let density = self.density(temperature);
        let mu_lam = self.laminar_viscosity(temperature);
        if !density.is_finite() || density <= 0.0 || !mu_lam.is_finite() || mu_lam < 0.0 {
            return None;
        }
        if !mu_turb.is_finite() || mu_turb < 0.0 || !tke.is_finite() {
            return None;
        }
        Some(PrimitivePoint {
            pressure,
            velocity,
            temperature,
            density,
            mu_lam,
            mu_turb,
            tke: tke.max(0.0),
        })
    }

    /// 刷新全部点的原始变量
    ///
    /// `eddy` 为 `None` 时按层流处理（μ_t = 0, k = k∞）。
    pub fn evaluate(
        &self,
        working: &WorkingState,
        eddy: Option<&EddyViscosityField>,
        primitives: &mut PrimitiveState,
    ) -> VfResult<PrimitiveReport> {
        let n = primitives.len();
        working.check_len(n)?;
        if let Some(e) = eddy {
            VfError::check_size("mu_turb", n, e.mu_turb.len())?;
            VfError::check_size("tke", n, e.tke.len())?;
        }

        let non_physical: usize = primitives
            .points_mut()
            .par_iter_mut()
            .enumerate()
            .map(|(i, slot)| {
                let (mu_t, k) = match eddy {
                    Some(e) => (e.mu_turb[i], e.tke[i]),
                    None => (0.0, self.tke_inf),
                };
                match self.evaluate_point(
                    working.pressure[i],
                    working.velocity[i],
                    working.temperature[i],
                    mu_t,
                    k,
                ) {
                    Some(p) => {
                        *slot = p;
                        0
                    }
                    None => 1,
                }
            })
            .sum();

        if non_physical > 0 {
            log::warn!("原始变量计算: {} / {} 个点为非物理状态，保留旧值", non_physical, n);
        }

        Ok(PrimitiveReport {
            n_points: n,
            non_physical,
        })
    }
}
