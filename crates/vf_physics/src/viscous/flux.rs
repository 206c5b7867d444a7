// crates/vf_physics/src/viscous/flux.rs

//! 粘性面通量格式
//!
//! 面通量以 `left` 控制体的流出方向为正：
//!
//! ```text
//! F = −( τ_f · n ,  k_f ∇T_f · n )
//! ```
//!
//! 导热系数 `k = cp (μ/Pr_lam + μ_t/Pr_turb)`。隐式推进时附带薄层近似的
//! Jacobian 系数 `μ_eff |A| / d` 与 `k |A| / d`。

use glam::{DMat3, DVec3};
use vf_config::FluidConfig;

use super::averaging::FaceAveraging;
use super::stress::stress_tensor;
use crate::numerics::ResidualBlock;
use crate::state::{VariableLayout, MAX_VARS};

/// 面一侧的状态
#[derive(Debug, Clone, Copy, Default)]
pub struct FaceSide {
    /// 速度
    pub velocity: DVec3,
    /// 温度
    pub temperature: f64,
    /// 密度
    pub density: f64,
    /// 分子粘度
    pub mu_lam: f64,
    /// 涡粘度
    pub mu_turb: f64,
    /// 湍动能
    pub tke: f64,
    /// 速度梯度
    pub grad_velocity: DMat3,
    /// 温度梯度
    pub grad_temperature: DVec3,
}

/// 面通量输入
#[derive(Debug, Clone, Copy)]
pub struct FaceInput {
    /// 面积加权法向（left → right）
    pub normal: DVec3,
    /// 边向量 x_R − x_L
    pub edge: DVec3,
    /// 左侧状态
    pub left: FaceSide,
    /// 右侧状态
    pub right: FaceSide,
}

/// 面通量结果
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViscousFlux {
    /// 动量通量 −τ·n
    pub momentum: DVec3,
    /// 热通量 −k∇T·n
    pub heat: f64,
    /// 动量 Jacobian 系数 μ_eff|A|/d
    pub jac_momentum: f64,
    /// 能量 Jacobian 系数 k|A|/d
    pub jac_heat: f64,
}

impl ViscousFlux {
    /// 按变量排列展开成残差块（压力分量为 0）
    pub fn to_block(&self, layout: VariableLayout) -> ResidualBlock {
        let mut block = [0.0; MAX_VARS];
        for d in 0..layout.n_dim() {
            block[layout.velocity(d)] = self.momentum[d];
        }
        block[layout.temperature()] = self.heat;
        block
    }
}

/// 粘性通量格式
pub trait ViscousFluxScheme: Send + Sync {
    /// 格式名称
    fn name(&self) -> &'static str;

    /// 计算单个面的通量
    fn flux(&self, input: &FaceInput) -> ViscousFlux;
}

/// 平均梯度通量格式
#[derive(Debug, Clone)]
pub struct AveragedGradientFlux<A: FaceAveraging> {
    averaging: A,
    specific_heat: f64,
    prandtl_lam: f64,
    prandtl_turb: f64,
    min_distance: f64,
}

impl<A: FaceAveraging> AveragedGradientFlux<A> {
    /// 创建格式
    pub fn new(averaging: A, fluid: &FluidConfig, min_distance: f64) -> Self {
        Self {
            averaging,
            specific_heat: fluid.specific_heat,
            prandtl_lam: fluid.prandtl_lam,
            prandtl_turb: fluid.prandtl_turb,
            min_distance,
        }
    }

    /// 导热系数
    #[inline]
    pub fn conductivity(&self, mu_lam: f64, mu_turb: f64) -> f64 {
        self.specific_heat * (mu_lam / self.prandtl_lam + mu_turb / self.prandtl_turb)
    }

    /// 使用的平均格式
    pub fn averaging(&self) -> &A {
        &self.averaging
    }
}

impl<A: FaceAveraging> ViscousFluxScheme for AveragedGradientFlux<A> {
    fn name(&self) -> &'static str {
        self.averaging.name()
    }

    fn flux(&self, input: &FaceInput) -> ViscousFlux {
        let (l, r) = (&input.left, &input.right);

        let mu_lam = 0.5 * (l.mu_lam + r.mu_lam);
        let mu_turb = 0.5 * (l.mu_turb + r.mu_turb);
        let mu_eff = mu_lam + mu_turb;
        let density = 0.5 * (l.density + r.density);
        let tke = 0.5 * (l.tke + r.tke);

        let grad_v = self.averaging.face_velocity_gradient(
            &l.grad_velocity,
            &r.grad_velocity,
            l.velocity,
            r.velocity,
            input.edge,
        );
        let grad_t = self.averaging.face_gradient(
            l.grad_temperature,
            r.grad_temperature,
            l.temperature,
            r.temperature,
            input.edge,
        );

        let tau = stress_tensor(&grad_v, mu_eff, density, tke);
        let k = self.conductivity(mu_lam, mu_turb);

        let area = input.normal.length();
        let dist = input.edge.length().max(self.min_distance);

        ViscousFlux {
            momentum: -(tau * input.normal),
            heat: -k * grad_t.dot(input.normal),
            jac_momentum: mu_eff * area / dist,
            jac_heat: k * area / dist,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::GradientField;
    use crate::viscous::averaging::{ArithmeticAverage, EdgeCorrectedAverage};

    fn side(mu: f64) -> FaceSide {
        FaceSide {
            density: 1.0,
            mu_lam: mu,
            ..Default::default()
        }
    }

    #[test]
    fn test_couette_momentum_flux() {
        // u = γ y，面法向 +y，面积 2
        let gamma = 3.0;
        let g = GradientField::from_rows(DVec3::new(0.0, gamma, 0.0), DVec3::ZERO, DVec3::ZERO);
        let mut l = side(0.1);
        l.grad_velocity = g;
        let mut r = l;
        r.velocity = DVec3::new(gamma * 0.5, 0.0, 0.0);

        let scheme = AveragedGradientFlux::new(EdgeCorrectedAverage, &FluidConfig::default(), 1e-14);
        let flux = scheme.flux(&FaceInput {
            normal: DVec3::new(0.0, 2.0, 0.0),
            edge: DVec3::new(0.0, 0.5, 0.0),
            left: l,
            right: r,
        });

        // −τ_xy n_y = −μγ·2
        assert!((flux.momentum.x + 0.1 * gamma * 2.0).abs() < 1e-14);
        assert!(flux.momentum.y.abs() < 1e-14);
        assert!((flux.jac_momentum - 0.1 * 2.0 / 0.5).abs() < 1e-14);
    }

    #[test]
    fn test_heat_flux_sign_and_conductivity() {
        let fluid = FluidConfig::default();
        let scheme = AveragedGradientFlux::new(ArithmeticAverage, &fluid, 1e-14);
        let mut l = side(1.8e-5);
        l.grad_temperature = DVec3::new(-10.0, 0.0, 0.0);
        let r = FaceSide {
            grad_temperature: l.grad_temperature,
            ..l
        };
        let flux = scheme.flux(&FaceInput {
            normal: DVec3::X,
            edge: DVec3::X,
            left: l,
            right: r,
        });
        let k = fluid.thermal_conductivity(1.8e-5, 0.0);
        // 温度沿 +x 降低 → 热量流出 left
        assert!(flux.heat > 0.0);
        assert!((flux.heat - 10.0 * k).abs() < 1e-14);
        assert!((scheme.conductivity(1.8e-5, 0.0) - k).abs() < 1e-18);
    }

    #[test]
    fn test_block_layout_2d() {
        let flux = ViscousFlux {
            momentum: DVec3::new(1.0, 2.0, 3.0),
            heat: 4.0,
            ..Default::default()
        };
        let block = flux.to_block(VariableLayout::new(2));
        assert_eq!(block, [0.0, 1.0, 2.0, 4.0, 0.0]);
    }
}
