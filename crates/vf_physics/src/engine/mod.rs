// crates/vf_physics/src/engine/mod.rs

//! 求解器引擎
//!
//! - [`solver`]: 组合式求解器与阶段状态机
//! - [`timestep`]: 局部伪时间步
//! - [`norms`]: 残差范数与发散检测

pub mod norms;
pub mod solver;
pub mod timestep;

pub use norms::ResidualNorms;
pub use solver::{
    ConvectiveSolver, FlowSolver, FlowSolverBuilder, IterationStats, NoConvection,
    SharedGeometry, SolverPhase, ViscousExtension,
};
pub use timestep::{TimeStepEstimator, TimeStepSummary};
