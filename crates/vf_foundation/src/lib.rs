// crates/vf_foundation/src/lib.rs

//! ViscoFlow Foundation Layer
//!
//! 零泛型基础层，提供整个项目共享的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `VfError` 与 `ensure!` 宏
//! - [`tolerance`]: 数值容差配置与安全除法
//!
//! # 设计原则
//!
//! 1. **最小依赖**: 仅依赖 serde 和 thiserror
//! 2. **错误可分类**: 几何缺陷、发散、配置错误各有独立变体
//! 3. **参数注入**: 容差通过结构体传递，不使用全局静态量
//!
//! # 示例
//!
//! ```
//! use vf_foundation::{VfError, VfResult, Tolerance};
//!
//! fn check_volume(volume: f64, tol: &Tolerance) -> VfResult<f64> {
//!     if volume < tol.min_volume {
//!         return Err(VfError::degenerate_geometry(0, volume));
//!     }
//!     Ok(volume)
//! }
//!
//! assert!(check_volume(1.0, &Tolerance::default()).is_ok());
//! assert!(check_volume(0.0, &Tolerance::default()).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod tolerance;

// 重导出常用类型
pub use error::{VfError, VfResult};
pub use tolerance::{safe_div, Tolerance, EPS};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{VfError, VfResult};
    pub use crate::tolerance::{safe_div, Tolerance};
    pub use crate::ensure;
}
