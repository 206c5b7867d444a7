// crates/vf_foundation/src/tolerance.rs

//! 数值容差配置
//!
//! 所有阈值通过参数注入，不存在全局可变容差。

use serde::{Deserialize, Serialize};

/// 通用小量（与原始求解器的 EPS 一致）
pub const EPS: f64 = 1e-16;

/// 数值容差配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// 最小控制体体积，低于此值视为退化几何
    pub min_volume: f64,
    /// CD/CQ 零值判据，低于此值时升阻比与品质因数记为 0
    pub min_drag: f64,
    /// 面距离最小值
    pub min_distance: f64,
    /// 安全除法阈值
    pub safe_div: f64,
    /// 残差发散上限
    pub divergence_limit: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            min_volume: 1e-14,
            min_drag: EPS,
            min_distance: 1e-14,
            safe_div: 1e-14,
            divergence_limit: 1e20,
        }
    }
}

impl Tolerance {
    /// 严格配置（用于验证测试）
    pub fn strict() -> Self {
        Self {
            min_volume: 1e-20,
            min_drag: EPS,
            min_distance: 1e-20,
            safe_div: 1e-20,
            divergence_limit: 1e20,
        }
    }
}

/// 安全除法：分母绝对值低于阈值时返回 0
///
/// ```
/// use vf_foundation::safe_div;
///
/// assert_eq!(safe_div(1.0, 0.0, 1e-16), 0.0);
/// assert_eq!(safe_div(1.0, 2.0, 1e-16), 0.5);
/// ```
#[inline]
pub fn safe_div(num: f64, den: f64, threshold: f64) -> f64 {
    if den.abs() < threshold {
        0.0
    } else {
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tolerance() {
        let tol = Tolerance::default();
        assert!(tol.min_volume > 0.0);
        assert_eq!(tol.min_drag, EPS);
    }

    #[test]
    fn test_safe_div_guard() {
        assert_eq!(safe_div(3.0, 1e-20, 1e-16), 0.0);
        assert_eq!(safe_div(-3.0, 0.0, 1e-16), 0.0);
        assert!((safe_div(3.0, 1.5, 1e-16) - 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_serde_roundtrip() {
        let tol = Tolerance::strict();
        let json = serde_json::to_string(&tol).unwrap();
        let parsed: Tolerance = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tol);
    }
}
