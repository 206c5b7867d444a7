// crates/vf_physics/src/lib.rs

//! ViscoFlow Physics Layer (Layer 3)
//!
//! 压力基不可压缩 Navier-Stokes 求解器的粘性与壁面子系统，包括：
//! - 对偶网格几何接口 (mesh)
//! - 求解状态与原始变量计算 (state, primitive)
//! - 梯度提供者 (gradient)
//! - 离散系统：残差场与 CSR Jacobian (numerics)
//! - 粘性通量与残差组装 (viscous)
//! - 壁面边界施加 (boundary)
//! - 壁面力、系数与诊断量 (forces)
//! - 时间步、残差范数与组合式求解器 (engine)
//! - 湍流耦合 (turbulence)
//! - 分区归约接口 (comm)
//!
//! # 控制流
//!
//! ```text
//! PrimitiveEvaluator → TimeStepEstimator → (对流残差) → ViscousAssembler
//!     → WallEnforcer → (外部线性求解与更新) → ForceIntegrator（仅输出迭代）
//! ```
//!
//! 网格生成、线性求解、对流格式与湍流模型闭合均为外部协作者，
//! 仅通过 trait 接入。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod comm;
pub mod engine;
pub mod forces;
pub mod gradient;
pub mod mesh;
pub mod numerics;
pub mod primitive;
pub mod state;
pub mod turbulence;
pub mod viscous;

/// 层级标识
pub const LAYER: u8 = 3;

// 重导出常用类型
pub use boundary::{BoundaryError, SharedVertex, WallEnforcer, WallKind, WallMarker, WallReport};
pub use comm::{Communicator, SerialCommunicator};
pub use engine::{
    ConvectiveSolver, FlowSolver, FlowSolverBuilder, IterationStats, NoConvection,
    ResidualNorms, SharedGeometry, SolverPhase, TimeStepEstimator, TimeStepSummary,
    ViscousExtension,
};
pub use forces::{
    CoefficientKind, CoefficientTable, CoefficientValues, ForceIntegrator, ForceReport,
    ReferenceFrame, VertexTractions, WallDiagnostics, WallExtrema,
};
pub use gradient::{GradientField, GradientMethod, GradientProvider, GreenGauss, Prescribed};
pub use mesh::{BoundaryVertex, DualGeometry, DualMesh, InternalFace, MarkerVertices};
pub use numerics::{ResidualField, SystemMatrix};
pub use primitive::{PrimitiveEvaluator, PrimitiveReport};
pub use state::{PrimitivePoint, PrimitiveState, VariableLayout, WorkingState, MAX_VARS};
pub use turbulence::{EddyViscosityField, TurbulenceCoupling};
pub use viscous::{
    AveragedGradientFlux, FaceAveraging, ViscousAssembler, ViscousFlux, ViscousFluxScheme,
};
