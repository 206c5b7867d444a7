// crates/vf_config/src/lib.rs

//! ViscoFlow Config Layer (Layer 2)
//!
//! 配置层，提供已验证的求解器参数记录。物理层只读取本层类型，
//! 解析与校验在此完成。
//!
//! # 模块概览
//!
//! - [`flow_config`]: FlowConfig 顶层配置（来流、参考量、时间推进、数值格式）
//! - [`fluid`]: 密度/粘度模型与 Prandtl 数
//! - [`markers`]: 边界标记类型与监控面
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: vf_cli        ─> loads FlowConfig
//! Layer 3: vf_physics    ─> consumes FlowConfig (read only)
//! Layer 2: vf_config     ─> FlowConfig, MarkerKind (本层)
//! Layer 1: vf_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod flow_config;
pub mod fluid;
pub mod markers;

/// 层级标识
pub const LAYER: u8 = 2;

// 重导出核心类型
pub use error::ConfigError;
pub use flow_config::{
    FaceAveragingKind, FlowConfig, FreestreamConfig, NumericsConfig, ReferenceConfig, TimeConfig,
};
pub use fluid::{FluidConfig, FluidModel, ViscosityModel};
pub use markers::{MarkerConfig, MarkerKind, MonitoringSurface};
