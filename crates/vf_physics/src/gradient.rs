// crates/vf_physics/src/gradient.rs

//! 梯度提供者
//!
//! 粘性应力需要速度梯度，热传导需要温度梯度。梯度由 [`GradientMethod`]
//! 在每次 `preprocessing` 时刷新到 [`GradientField`]。
//!
//! # 约定
//!
//! 速度梯度矩阵 G 的第 i 行为 ∇u_i，即 `G_ij = ∂u_i/∂x_j`。
//!
//! # 方法
//!
//! - [`GreenGauss`]: 中值对偶上的 Green-Gauss 重构
//!   ```text
//!   ∇φ_i = (1/V_i) [ Σ_faces ½(φ_i + φ_j) n_ij + Σ_boundary φ_i n_b ]
//!   ```
//!   对矩形网格上的线性场精确
//! - [`Prescribed`]: 外部写入的梯度，刷新时不修改

use glam::{DMat3, DVec3};
use vf_foundation::{Tolerance, VfError, VfResult};

use crate::mesh::DualGeometry;
use crate::state::PrimitiveState;

/// 梯度访问接口
pub trait GradientProvider: Sync {
    /// 速度梯度（第 i 行为 ∇u_i）
    fn velocity_gradient(&self, point: usize) -> DMat3;

    /// 温度梯度
    fn temperature_gradient(&self, point: usize) -> DVec3;
}

/// 外积 a ⊗ b，结果 M_ij = a_i b_j
#[inline]
pub(crate) fn outer(a: DVec3, b: DVec3) -> DMat3 {
    DMat3::from_cols(a * b.x, a * b.y, a * b.z)
}

/// 梯度存储
#[derive(Debug, Clone, Default)]
pub struct GradientField {
    velocity: Vec<DMat3>,
    temperature: Vec<DVec3>,
}

impl GradientField {
    /// 全零梯度场
    pub fn new(n_points: usize) -> Self {
        Self {
            velocity: vec![DMat3::ZERO; n_points],
            temperature: vec![DVec3::ZERO; n_points],
        }
    }

    /// 点数
    #[inline]
    pub fn len(&self) -> usize {
        self.velocity.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.velocity.is_empty()
    }

    /// 写入速度梯度
    #[inline]
    pub fn set_velocity_gradient(&mut self, point: usize, grad: DMat3) {
        self.velocity[point] = grad;
    }

    /// 写入温度梯度
    #[inline]
    pub fn set_temperature_gradient(&mut self, point: usize, grad: DVec3) {
        self.temperature[point] = grad;
    }

    /// 由逐行梯度构造速度梯度矩阵
    pub fn from_rows(du: DVec3, dv: DVec3, dw: DVec3) -> DMat3 {
        DMat3::from_cols(du, dv, dw).transpose()
    }
}

impl GradientProvider for GradientField {
    #[inline]
    fn velocity_gradient(&self, point: usize) -> DMat3 {
        self.velocity[point]
    }

    #[inline]
    fn temperature_gradient(&self, point: usize) -> DVec3 {
        self.temperature[point]
    }
}

/// 梯度计算方法
pub trait GradientMethod: Send + Sync {
    /// 方法名称
    fn name(&self) -> &'static str;

    /// 刷新梯度场
    fn compute(
        &self,
        geometry: &dyn DualGeometry,
        primitives: &PrimitiveState,
        field: &mut GradientField,
    ) -> VfResult<()>;
}

/// Green-Gauss 梯度
#[derive(Debug, Clone, Copy, Default)]
pub struct GreenGauss {
    tolerance: Tolerance,
}

impl GreenGauss {
    /// 指定容差
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }
}

impl GradientMethod for GreenGauss {
    fn name(&self) -> &'static str {
        "green_gauss"
    }

    fn compute(
        &self,
        geometry: &dyn DualGeometry,
        primitives: &PrimitiveState,
        field: &mut GradientField,
    ) -> VfResult<()> {
        let n = geometry.n_points();
        VfError::check_size("primitives", n, primitives.len())?;
        VfError::check_size("gradients", n, field.len())?;

        field.velocity.fill(DMat3::ZERO);
        field.temperature.fill(DVec3::ZERO);

        for face in geometry.faces() {
            let (l, r) = (face.left, face.right);
            let v_face = 0.5 * (primitives.velocity(l) + primitives.velocity(r));
            let t_face = 0.5 * (primitives.temperature(l) + primitives.temperature(r));
            let gv = outer(v_face, face.normal);
            let gt = t_face * face.normal;
            field.velocity[l] += gv;
            field.velocity[r] -= gv;
            field.temperature[l] += gt;
            field.temperature[r] -= gt;
        }

        for m in 0..geometry.n_markers() {
            for v in geometry.marker_vertices(m) {
                let p = v.point;
                field.velocity[p] += outer(primitives.velocity(p), v.normal);
                field.temperature[p] += primitives.temperature(p) * v.normal;
            }
        }

        for p in 0..n {
            let vol = geometry.volume(p);
            if vol < self.tolerance.min_volume {
                return Err(VfError::degenerate_geometry(p, vol));
            }
            let inv = 1.0 / vol;
            field.velocity[p] *= inv;
            field.temperature[p] *= inv;
        }

        Ok(())
    }
}

/// 外部给定的梯度（刷新时不修改）
#[derive(Debug, Clone, Copy, Default)]
pub struct Prescribed;

impl GradientMethod for Prescribed {
    fn name(&self) -> &'static str {
        "prescribed"
    }

    fn compute(
        &self,
        geometry: &dyn DualGeometry,
        _primitives: &PrimitiveState,
        field: &mut GradientField,
    ) -> VfResult<()> {
        VfError::check_size("gradients", geometry.n_points(), field.len())
    }
}
