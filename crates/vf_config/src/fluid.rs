// crates/vf_config/src/fluid.rs

//! 流体物性配置
//!
//! 不可压缩求解器的密度与粘度模型。密度模型决定原始变量计算器如何由
//! 压力/温度得到密度；粘度模型决定分子粘度随温度的变化。

use serde::{Deserialize, Serialize};

/// 密度模型
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FluidModel {
    /// 常密度（取来流密度）
    #[default]
    ConstantDensity,
    /// 不可压理想气体：ρ = p_op / (R·T)
    IncompressibleIdealGas {
        /// 气体常数 [J/(kg·K)]
        #[serde(default = "default_gas_constant")]
        gas_constant: f64,
        /// 工作压力 [Pa]
        #[serde(default = "default_operating_pressure")]
        operating_pressure: f64,
    },
}

fn default_gas_constant() -> f64 { 287.058 }
fn default_operating_pressure() -> f64 { 101_325.0 }

/// 分子粘度模型
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViscosityModel {
    /// 常粘度（取 `freestream.viscosity_inf`）
    #[default]
    Constant,
    /// Sutherland 定律 μ = μ_ref (T/T_ref)^{3/2} (T_ref + S)/(T + S)
    Sutherland {
        /// 参考粘度 [Pa·s]
        #[serde(default = "default_mu_ref")]
        mu_ref: f64,
        /// 参考温度 [K]
        #[serde(default = "default_t_ref")]
        t_ref: f64,
        /// Sutherland 常数 [K]
        #[serde(default = "default_sutherland_s")]
        s: f64,
    },
}

fn default_mu_ref() -> f64 { 1.716e-5 }
fn default_t_ref() -> f64 { 273.15 }
fn default_sutherland_s() -> f64 { 110.4 }

/// 流体物性
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluidConfig {
    /// 密度模型
    #[serde(default)]
    pub density_model: FluidModel,

    /// 粘度模型
    #[serde(default)]
    pub viscosity_model: ViscosityModel,

    /// 定压比热 [J/(kg·K)]
    #[serde(default = "default_specific_heat")]
    pub specific_heat: f64,

    /// 层流 Prandtl 数
    #[serde(default = "default_prandtl_lam")]
    pub prandtl_lam: f64,

    /// 湍流 Prandtl 数
    #[serde(default = "default_prandtl_turb")]
    pub prandtl_turb: f64,
}

fn default_specific_heat() -> f64 { 1004.703 }
fn default_prandtl_lam() -> f64 { 0.72 }
fn default_prandtl_turb() -> f64 { 0.9 }

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            density_model: FluidModel::default(),
            viscosity_model: ViscosityModel::default(),
            specific_heat: default_specific_heat(),
            prandtl_lam: default_prandtl_lam(),
            prandtl_turb: default_prandtl_turb(),
        }
    }
}

impl FluidConfig {
    /// 有效导热系数 k = cp (μ/Pr_lam + μ_t/Pr_turb)
    #[inline]
    pub fn thermal_conductivity(&self, mu_lam: f64, mu_turb: f64) -> f64 {
        self.specific_heat * (mu_lam / self.prandtl_lam + mu_turb / self.prandtl_turb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thermal_conductivity_laminar() {
        let fluid = FluidConfig::default();
        let k = fluid.thermal_conductivity(1.8e-5, 0.0);
        assert!((k - 1004.703 * 1.8e-5 / 0.72).abs() < 1e-12);
    }

    #[test]
    fn test_sutherland_defaults_fill_in() {
        let model: ViscosityModel = serde_json::from_str(r#"{"type":"sutherland"}"#).unwrap();
        match model {
            ViscosityModel::Sutherland { mu_ref, t_ref, s } => {
                assert_eq!(mu_ref, 1.716e-5);
                assert_eq!(t_ref, 273.15);
                assert_eq!(s, 110.4);
            }
            ViscosityModel::Constant => panic!("expected sutherland"),
        }
    }
}
