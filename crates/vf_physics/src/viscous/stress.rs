// crates/vf_physics/src/viscous/stress.rs

//! 粘性应力张量与应变率不变量
//!
//! ```text
//! τ = μ_eff (G + Gᵀ) − (⅔ μ_eff ∇·u + ⅔ ρ k) I
//! ```
//!
//! 其中 `G_ij = ∂u_i/∂x_j`。

use glam::{DMat3, DVec3};

/// 速度散度 tr(G)
#[inline]
pub fn divergence(grad: &DMat3) -> f64 {
    grad.x_axis.x + grad.y_axis.y + grad.z_axis.z
}

/// 应力张量
#[inline]
pub fn stress_tensor(grad: &DMat3, mu_eff: f64, density: f64, tke: f64) -> DMat3 {
    let iso = 2.0 / 3.0 * (mu_eff * divergence(grad) + density * tke);
    (*grad + grad.transpose()) * mu_eff - DMat3::from_diagonal(DVec3::splat(iso))
}

/// 应变率模 |S| = sqrt(2 S'_ij S'_ij)，S' 为去迹应变率
pub fn strain_rate_magnitude(grad: &DMat3) -> f64 {
    let s = (*grad + grad.transpose()) * 0.5;
    let trace = divergence(&s) / 3.0;
    let dev = s - DMat3::from_diagonal(DVec3::splat(trace));
    let sum: f64 = [dev.x_axis, dev.y_axis, dev.z_axis]
        .iter()
        .map(|c| c.length_squared())
        .sum();
    (2.0 * sum).sqrt()
}

/// 涡量矢量 ω = ∇ × u
#[inline]
pub fn vorticity(grad: &DMat3) -> DVec3 {
    // G 的列 j 为 ∂u/∂x_j，col(j)[i] = ∂u_i/∂x_j
    let g = |i: usize, j: usize| grad.col(j)[i];
    DVec3::new(g(2, 1) - g(1, 2), g(0, 2) - g(2, 0), g(1, 0) - g(0, 1))
}

/// 壁面切应力：τ·n̂ 去掉法向分量
#[inline]
pub fn wall_shear(tau: &DMat3, unit_normal: DVec3) -> DVec3 {
    let traction = *tau * unit_normal;
    traction - traction.dot(unit_normal) * unit_normal
}
