// crates/vf_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `VfError` 枚举和 `VfResult` 类型别名，用于整个项目的错误处理。
//!
//! # 错误分类
//!
//! | 类别 | 处理方式 |
//! |------|----------|
//! | 非物理状态（负密度/温度） | 不是错误，由原始变量计算器计数返回 |
//! | 退化几何（控制体体积≈0） | `DegenerateGeometry`，中止当前计算 |
//! | 残差发散（NaN / 过大） | `Diverged`，由外层驱动决定后续 |
//! | 配置缺陷 | `Config` / `InvalidConfig` |
//!
//! # 示例
//!
//! ```
//! use vf_foundation::error::{VfError, VfResult};
//!
//! fn read_config() -> VfResult<()> {
//!     Err(VfError::config("配置文件格式错误"))
//! }
//! ```

use thiserror::Error;

/// 统一结果类型
pub type VfResult<T> = Result<T, VfError>;

/// ViscoFlow 错误类型
#[derive(Error, Debug)]
pub enum VfError {
    // ========================================================================
    // 数据与索引错误
    // ========================================================================
    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别描述
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界（长度）
        len: usize,
    },

    // ========================================================================
    // 几何与数值错误
    // ========================================================================
    /// 无效网格拓扑
    #[error("无效的网格拓扑: {message}")]
    InvalidMesh {
        /// 具体错误信息
        message: String,
    },

    /// 退化几何：控制体体积过小
    #[error("退化几何: 点 {point} 的控制体体积 {volume:e} 低于阈值")]
    DegenerateGeometry {
        /// 点索引
        point: usize,
        /// 控制体体积
        volume: f64,
    },

    /// 非有限数值
    #[error("非有限数值: {what} (点 {point})")]
    NonFinite {
        /// 出现非有限值的量
        what: &'static str,
        /// 点索引
        point: usize,
    },

    /// 求解发散
    #[error("求解发散: 变量 {variable} 残差 = {value:e}")]
    Diverged {
        /// 变量编号
        variable: usize,
        /// 残差值
        value: f64,
    },

    // ========================================================================
    // 配置错误
    // ========================================================================
    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    /// 资源未找到
    #[error("资源未找到: {resource}")]
    NotFound {
        /// 资源名称
        resource: String,
    },

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl VfError {
    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 索引越界
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }

    /// 无效网格
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// 退化几何
    pub fn degenerate_geometry(point: usize, volume: f64) -> Self {
        Self::DegenerateGeometry { point, volume }
    }

    /// 非有限数值
    pub fn non_finite(what: &'static str, point: usize) -> Self {
        Self::NonFinite { what, point }
    }

    /// 求解发散
    pub fn diverged(variable: usize, value: f64) -> Self {
        Self::Diverged { variable, value }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 配置值无效
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 资源未找到
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl VfError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> VfResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }

    /// 检查索引是否在范围内
    #[inline]
    pub fn check_index(index_type: &'static str, index: usize, len: usize) -> VfResult<()> {
        if index >= len {
            Err(Self::index_out_of_bounds(index_type, index, len))
        } else {
            Ok(())
        }
    }
}

// ========================================================================
// 宏
// ========================================================================

/// 条件不满足时提前返回错误
///
/// ```
/// use vf_foundation::{ensure, VfError, VfResult};
///
/// fn positive(v: f64) -> VfResult<f64> {
///     ensure!(v > 0.0, VfError::invalid_config("v", v.to_string(), "必须为正"));
///     Ok(v)
/// }
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}
