// crates/vf_physics/src/forces/mod.rs

//! 壁面力、系数与逐顶点诊断
//!
//! - [`coefficients`]: 系数种类与三级系数表
//! - [`diagnostics`]: 摩擦系数、y+、壁面热通量
//! - [`integrator`]: 压力与粘性力积分
//! - [`tractions`]: 流固耦合面力

pub mod coefficients;
pub mod diagnostics;
pub mod integrator;
pub mod tractions;

pub use coefficients::{
    efficiency, figure_of_merit, AggregationRule, CoefficientKind, CoefficientTable,
    CoefficientValues, SurfaceGroup,
};
pub use diagnostics::{MarkerDiagnostics, WallDiagnostics};
pub use integrator::{ForceIntegrator, ForceReport, MarkerLoads, ReferenceFrame, WallExtrema};
pub use tractions::VertexTractions;
