// crates/vf_physics/src/viscous/assembler.rs

//! 粘性残差组装
//!
//! 遍历所有内部面：计算面通量，`residual[left] += F`，`residual[right] -= F`。
//! 同一面对两侧的贡献互为相反数，守恒在浮点意义上严格成立。
//!
//! 隐式推进时写入对称的 Jacobian 块（仅速度与温度对角）：
//!
//! ```text
//! J[L][L] += c   J[L][R] -= c
//! J[R][L] -= c   J[R][R] += c
//! ```
//!
//! 多重网格的每一层各自调用一次，只使用该层自己的面列表。

use rayon::prelude::*;
use vf_foundation::{VfError, VfResult};

use super::flux::{FaceInput, FaceSide, ViscousFlux, ViscousFluxScheme};
use crate::gradient::GradientProvider;
use crate::mesh::{DualGeometry, InternalFace};
use crate::numerics::{AtomicResidualAccumulator, ResidualField, SystemMatrix};
use crate::state::{PrimitiveState, VariableLayout};

/// 粘性残差组装器
pub struct ViscousAssembler {
    layout: VariableLayout,
    parallel: bool,
    atomic: Option<AtomicResidualAccumulator>,
}

impl ViscousAssembler {
    /// 创建组装器
    pub fn new(layout: VariableLayout, parallel: bool) -> Self {
        Self {
            layout,
            parallel,
            atomic: None,
        }
    }

    /// 变量排列
    pub fn layout(&self) -> VariableLayout {
        self.layout
    }

    fn face_side(
        primitives: &PrimitiveState,
        gradients: &dyn GradientProvider,
        point: usize,
    ) -> FaceSide {
        let p = primitives.point(point);
        FaceSide {
            velocity: p.velocity,
            temperature: p.temperature,
            density: p.density,
            mu_lam: p.mu_lam,
            mu_turb: p.mu_turb,
            tke: p.tke,
            grad_velocity: gradients.velocity_gradient(point),
            grad_temperature: gradients.temperature_gradient(point),
        }
    }

    fn face_input(
        geometry: &dyn DualGeometry,
        primitives: &PrimitiveState,
        gradients: &dyn GradientProvider,
        face: &InternalFace,
    ) -> FaceInput {
        FaceInput {
            normal: face.normal,
            edge: geometry.coord(face.right) - geometry.coord(face.left),
            left: Self::face_side(primitives, gradients, face.left),
            right: Self::face_side(primitives, gradients, face.right),
        }
    }

    /// 计算全部面通量（与面列表同序）
    pub fn face_fluxes(
        &self,
        geometry: &dyn DualGeometry,
        primitives: &PrimitiveState,
        gradients: &dyn GradientProvider,
        scheme: &dyn ViscousFluxScheme,
    ) -> Vec<ViscousFlux> {
        let compute = |face: &InternalFace| {
            scheme.flux(&Self::face_input(geometry, primitives, gradients, face))
        };
        if self.parallel {
            geometry.faces().par_iter().map(compute).collect()
        } else {
            geometry.faces().iter().map(compute).collect()
        }
    }

    /// 将粘性贡献加入残差（及 Jacobian）
    pub fn assemble(
        &mut self,
        geometry: &dyn DualGeometry,
        primitives: &PrimitiveState,
        gradients: &dyn GradientProvider,
        scheme: &dyn ViscousFluxScheme,
        residual: &mut ResidualField,
        jacobian: Option<&mut SystemMatrix>,
    ) -> VfResult<()> {
        let n = geometry.n_points();
        VfError::check_size("primitives", n, primitives.len())?;
        VfError::check_size("residual", n, residual.n_points())?;

        let faces = geometry.faces();
        let fluxes = self.face_fluxes(geometry, primitives, gradients, scheme);

        if let Some((face, _)) = faces
            .iter()
            .zip(&fluxes)
            .find(|(_, f)| !f.momentum.is_finite() || !f.heat.is_finite())
        {
            return Err(VfError::non_finite("viscous_flux", face.left));
        }

        let layout = self.layout;
        if self.parallel {
            let n_var = layout.n_var();
            let acc = match self.atomic.take() {
                Some(a) if a.n_points() == n => {
                    a.reset();
                    a
                }
                _ => AtomicResidualAccumulator::new(n, n_var),
            };
            faces.par_iter().zip(fluxes.par_iter()).for_each(|(face, flux)| {
                acc.accumulate_face(face.left, face.right, &flux.to_block(layout));
            });
            acc.add_into(residual);
            self.atomic = Some(acc);
        } else {
            for (face, flux) in faces.iter().zip(&fluxes) {
                residual.accumulate_face(face.left, face.right, &flux.to_block(layout));
            }
        }

        if let Some(jac) = jacobian {
            let vel = layout.velocity_range();
            let t = layout.temperature();
            for (face, flux) in faces.iter().zip(&fluxes) {
                let (l, r) = (face.left, face.right);
                let c = flux.jac_momentum;
                jac.add_block_diagonal(l, l, vel.clone(), c);
                jac.add_block_diagonal(l, r, vel.clone(), -c);
                jac.add_block_diagonal(r, l, vel.clone(), -c);
                jac.add_block_diagonal(r, r, vel.clone(), c);

                let ct = flux.jac_heat;
                jac.add_block_diagonal(l, l, t..t + 1, ct);
                jac.add_block_diagonal(l, r, t..t + 1, -ct);
                jac.add_block_diagonal(r, l, t..t + 1, -ct);
                jac.add_block_diagonal(r, r, t..t + 1, ct);
            }
        }

        log::trace!("粘性残差组装完成: {} 个面", faces.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::{GradientField, GradientMethod, GreenGauss};
    use crate::mesh::DualMesh;
    use crate::state::PrimitivePoint;
    use crate::viscous::averaging::EdgeCorrectedAverage;
    use crate::viscous::flux::AveragedGradientFlux;
    use glam::DVec3;
    use vf_config::FluidConfig;

    fn setup() -> (DualMesh, PrimitiveState, GradientField) {
        let mesh = DualMesh::rectilinear(&[0.0, 0.4, 1.0, 1.2], &[0.0, 0.3, 1.0], ["s", "e", "n", "w"]).unwrap();
        let mut prim = PrimitiveState::new(mesh.n_points());
        for p in 0..mesh.n_points() {
            let x = mesh.coord(p);
            *prim.point_mut(p) = PrimitivePoint {
                velocity: DVec3::new(x.y * x.y, 0.1 * x.x, 0.0),
                temperature: 300.0 + 5.0 * x.x * x.y,
                density: 1.2,
                mu_lam: 1e-3,
                ..Default::default()
            };
        }
        let mut grads = GradientField::new(mesh.n_points());
        GreenGauss::default().compute(&mesh, &prim, &mut grads).unwrap();
        (mesh, prim, grads)
    }

    fn scheme() -> AveragedGradientFlux<EdgeCorrectedAverage> {
        AveragedGradientFlux::new(EdgeCorrectedAverage, &FluidConfig::default(), 1e-14)
    }

    #[test]
    fn test_serial_and_parallel_agree() {
        let (mesh, prim, grads) = setup();
        let layout = VariableLayout::new(2);

        let mut serial = ResidualField::new(mesh.n_points(), 4);
        ViscousAssembler::new(layout, false)
            .assemble(&mesh, &prim, &grads, &scheme(), &mut serial, None)
            .unwrap();

        let mut parallel = ResidualField::new(mesh.n_points(), 4);
        ViscousAssembler::new(layout, true)
            .assemble(&mesh, &prim, &grads, &scheme(), &mut parallel, None)
            .unwrap();

        for (a, b) in serial.as_slice().iter().zip(parallel.as_slice()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_interior_sum_vanishes() {
        let (mesh, prim, grads) = setup();
        let mut res = ResidualField::new(mesh.n_points(), 4);
        ViscousAssembler::new(VariableLayout::new(2), false)
            .assemble(&mesh, &prim, &grads, &scheme(), &mut res, None)
            .unwrap();
        for k in 0..4 {
            let total: f64 = (0..mesh.n_points()).map(|p| res.get(p, k)).sum();
            assert!(total.abs() < 1e-12);
        }
    }

    #[test]
    fn test_jacobian_rows_sum_to_zero() {
        let (mesh, prim, grads) = setup();
        let mut res = ResidualField::new(mesh.n_points(), 4);
        let mut jac = SystemMatrix::from_geometry(&mesh, 4);
        ViscousAssembler::new(VariableLayout::new(2), false)
            .assemble(&mesh, &prim, &grads, &scheme(), &mut res, Some(&mut jac))
            .unwrap();

        let ones = vec![1.0; jac.n_rows()];
        let mut y = vec![0.0; jac.n_rows()];
        jac.mul_vec(&ones, &mut y);
        assert!(y.iter().all(|v| v.abs() < 1e-12));
        assert!(jac.get(jac.row_of(0, 1), jac.row_of(0, 1)) > 0.0);
        assert_eq!(jac.get(jac.row_of(0, 0), jac.row_of(0, 0)), 0.0);
    }

    #[test]
    fn test_non_finite_flux_is_error() {
        let (mesh, mut prim, grads) = setup();
        prim.point_mut(3).mu_lam = f64::NAN;
        let mut res = ResidualField::new(mesh.n_points(), 4);
        let err = ViscousAssembler::new(VariableLayout::new(2), false)
            .assemble(&mesh, &prim, &grads, &scheme(), &mut res, None)
            .unwrap_err();
        assert!(matches!(err, VfError::NonFinite { .. }));
    }
}
