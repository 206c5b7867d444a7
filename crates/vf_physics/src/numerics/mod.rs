// crates/vf_physics/src/numerics/mod.rs

//! 离散系统
//!
//! - [`csr`]: 分块 CSR 系统矩阵（隐式 Jacobian）
//! - [`residual`]: 残差场与并行累加器

pub mod csr;
pub mod residual;

pub use csr::{CsrBuilder, CsrPattern, SystemMatrix};
pub use residual::{AtomicResidualAccumulator, ResidualBlock, ResidualField};
