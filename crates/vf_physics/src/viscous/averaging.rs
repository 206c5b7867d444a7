// crates/vf_physics/src/viscous/averaging.rs

//! 面梯度平均格式
//!
//! 内部面上的梯度由两侧点梯度平均得到。边修正格式在算术平均上
//! 替换沿边方向的分量，使其等于两点差分：
//!
//! ```text
//! ∇φ_f = ḡ + [ (φ_R − φ_L)/d − ḡ·ê ] ê,   ḡ = ½(∇φ_L + ∇φ_R)
//! ```

use glam::{DMat3, DVec3};
use vf_config::FaceAveragingKind;

use crate::gradient::GradientField;

/// 面梯度平均策略
pub trait FaceAveraging: Send + Sync {
    /// 格式名称
    fn name(&self) -> &'static str;

    /// 标量场的面梯度
    ///
    /// `edge` 为 `x_R − x_L`。
    fn face_gradient(&self, grad_l: DVec3, grad_r: DVec3, phi_l: f64, phi_r: f64, edge: DVec3) -> DVec3;

    /// 速度梯度（逐分量）
    fn face_velocity_gradient(
        &self,
        grad_l: &DMat3,
        grad_r: &DMat3,
        vel_l: DVec3,
        vel_r: DVec3,
        edge: DVec3,
    ) -> DMat3 {
        let row = |i: usize| self.face_gradient(grad_l.row(i), grad_r.row(i), vel_l[i], vel_r[i], edge);
        GradientField::from_rows(row(0), row(1), row(2))
    }
}

/// 算术平均
#[derive(Debug, Clone, Copy, Default)]
pub struct ArithmeticAverage;

impl FaceAveraging for ArithmeticAverage {
    fn name(&self) -> &'static str {
        "arithmetic"
    }

    #[inline]
    fn face_gradient(&self, grad_l: DVec3, grad_r: DVec3, _phi_l: f64, _phi_r: f64, _edge: DVec3) -> DVec3 {
        0.5 * (grad_l + grad_r)
    }
}

/// 带边方向修正的平均
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeCorrectedAverage;

impl FaceAveraging for EdgeCorrectedAverage {
    fn name(&self) -> &'static str {
        "edge_corrected"
    }

    #[inline]
    fn face_gradient(&self, grad_l: DVec3, grad_r: DVec3, phi_l: f64, phi_r: f64, edge: DVec3) -> DVec3 {
        let avg = 0.5 * (grad_l + grad_r);
        let d = edge.length();
        if d <= 0.0 {
            return avg;
        }
        let e = edge / d;
        avg + ((phi_r - phi_l) / d - avg.dot(e)) * e
    }
}

impl FaceAveraging for Box<dyn FaceAveraging> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    #[inline]
    fn face_gradient(&self, grad_l: DVec3, grad_r: DVec3, phi_l: f64, phi_r: f64, edge: DVec3) -> DVec3 {
        (**self).face_gradient(grad_l, grad_r, phi_l, phi_r, edge)
    }
}

/// 按配置创建平均格式
pub fn averaging_from_config(kind: FaceAveragingKind) -> Box<dyn FaceAveraging> {
    match kind {
        FaceAveragingKind::Arithmetic => Box::new(ArithmeticAverage),
        FaceAveragingKind::EdgeCorrected => Box::new(EdgeCorrectedAverage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_average() {
        let g = ArithmeticAverage.face_gradient(DVec3::X, DVec3::Y, 0.0, 0.0, DVec3::X);
        assert_eq!(g, DVec3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn test_edge_correction_replaces_directional_derivative() {
        // 点梯度为零，但两点值差 2，距离 0.5 → 沿边导数为 4
        let g = EdgeCorrectedAverage.face_gradient(DVec3::ZERO, DVec3::ZERO, 1.0, 3.0, DVec3::new(0.5, 0.0, 0.0));
        assert!((g - DVec3::new(4.0, 0.0, 0.0)).length() < 1e-14);
    }

    #[test]
    fn test_edge_correction_consistent_for_linear_field() {
        let grad = DVec3::new(2.0, -1.0, 0.0);
        let edge = DVec3::new(0.3, 0.4, 0.0);
        let g = EdgeCorrectedAverage.face_gradient(grad, grad, 0.0, grad.dot(edge), edge);
        assert!((g - grad).length() < 1e-14);
    }

    #[test]
    fn test_velocity_gradient_rows() {
        let gl = GradientField::from_rows(DVec3::new(0.0, 1.0, 0.0), DVec3::ZERO, DVec3::ZERO);
        let g = ArithmeticAverage.face_velocity_gradient(&gl, &DMat3::ZERO, DVec3::ZERO, DVec3::ZERO, DVec3::Y);
        assert_eq!(g.row(0), DVec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_from_config() {
        assert_eq!(averaging_from_config(FaceAveragingKind::Arithmetic).name(), "arithmetic");
        assert_eq!(averaging_from_config(FaceAveragingKind::EdgeCorrected).name(), "edge_corrected");
    }
}
