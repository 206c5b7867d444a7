// crates/vf_physics/src/viscous/mod.rs

//! 粘性离散
//!
//! # 子模块
//!
//! - [`stress`]: 应力张量、应变率与涡量
//! - [`averaging`]: 面梯度平均策略（可替换）
//! - [`flux`]: 面通量格式（可替换）
//! - [`assembler`]: 残差与 Jacobian 组装
//!
//! 组装器只依赖 [`ViscousFluxScheme`] 接口，替换离散格式不影响其控制流。

pub mod assembler;
pub mod averaging;
pub mod flux;
pub mod stress;

pub use assembler::ViscousAssembler;
pub use averaging::{averaging_from_config, ArithmeticAverage, EdgeCorrectedAverage, FaceAveraging};
pub use flux::{AveragedGradientFlux, FaceInput, FaceSide, ViscousFlux, ViscousFluxScheme};
pub use stress::{divergence, strain_rate_magnitude, stress_tensor, vorticity, wall_shear};
