// crates/vf_physics/tests/flux_conservation.rs

//! 粘性通量守恒测试
//! 同一面对两侧控制体的贡献必须逐位互为相反数

use glam::DVec3;
use vf_config::FluidConfig;
use vf_physics::gradient::{GradientField, GradientMethod, GreenGauss};
use vf_physics::mesh::{DualGeometry, DualMesh, InternalFace};
use vf_physics::numerics::ResidualField;
use vf_physics::state::{PrimitivePoint, PrimitiveState, VariableLayout};
use vf_physics::viscous::{AveragedGradientFlux, EdgeCorrectedAverage, ViscousAssembler};

fn two_point_mesh() -> DualMesh {
    DualMesh::new(
        2,
        vec![DVec3::ZERO, DVec3::new(0.7, 0.2, 0.0)],
        vec![0.5, 0.5],
        vec![InternalFace::new(0, 1, DVec3::new(0.9, 0.3, 0.0))],
        Vec::new(),
    )
    .unwrap()
}

fn state() -> PrimitiveState {
    let mut prim = PrimitiveState::new(2);
    *prim.point_mut(0) = PrimitivePoint {
        velocity: DVec3::new(0.3, -0.1, 0.0),
        temperature: 301.0,
        density: 1.2,
        mu_lam: 1.8e-5,
        mu_turb: 3.0e-4,
        tke: 0.01,
        ..Default::default()
    };
    *prim.point_mut(1) = PrimitivePoint {
        velocity: DVec3::new(0.9, 0.2, 0.0),
        temperature: 297.5,
        density: 1.2,
        mu_lam: 1.9e-5,
        mu_turb: 1.0e-4,
        tke: 0.02,
        ..Default::default()
    };
    prim
}

/// 单面：L 与 R 的贡献逐位相反
#[test]
fn test_single_face_exact_negation() {
    let mesh = two_point_mesh();
    let prim = state();
    let mut grads = GradientField::new(2);
    grads.set_velocity_gradient(
        0,
        GradientField::from_rows(DVec3::new(1.0, 2.0, 0.0), DVec3::new(-0.5, 0.1, 0.0), DVec3::ZERO),
    );
    grads.set_velocity_gradient(
        1,
        GradientField::from_rows(DVec3::new(0.2, 3.0, 0.0), DVec3::new(0.4, -0.3, 0.0), DVec3::ZERO),
    );
    grads.set_temperature_gradient(0, DVec3::new(-4.0, 1.0, 0.0));
    grads.set_temperature_gradient(1, DVec3::new(-6.0, 0.5, 0.0));

    let scheme = AveragedGradientFlux::new(EdgeCorrectedAverage, &FluidConfig::default(), 1e-14);
    let mut res = ResidualField::new(2, 4);
    ViscousAssembler::new(VariableLayout::new(2), false)
        .assemble(&mesh, &prim, &grads, &scheme, &mut res, None)
        .unwrap();

    for k in 0..4 {
        assert_eq!(res.get(0, k), -res.get(1, k), "变量 {}", k);
    }
    assert_eq!(res.get(0, 0), 0.0);
    assert!(res.get(0, 1) != 0.0);
    assert!(res.get(0, 3) != 0.0);
}

/// 多面网格：所有内部贡献之和为零（并行累加同样成立）
#[test]
fn test_global_sum_vanishes_parallel() {
    let mesh = DualMesh::rectilinear(&[0.0, 0.2, 0.5, 0.9, 1.0], &[0.0, 0.1, 0.4, 1.0], ["s", "e", "n", "w"]).unwrap();
    let mut prim = PrimitiveState::new(mesh.n_points());
    for p in 0..mesh.n_points() {
        let x = mesh.coord(p);
        *prim.point_mut(p) = PrimitivePoint {
            velocity: DVec3::new((3.0 * x.y).sin(), x.x * x.y, 0.0),
            temperature: 290.0 + 10.0 * x.y * x.y,
            density: 1.0,
            mu_lam: 1e-3 * (1.0 + x.x),
            ..Default::default()
        };
    }
    let mut grads = GradientField::new(mesh.n_points());
    GreenGauss::default().compute(&mesh, &prim, &mut grads).unwrap();

    let scheme = AveragedGradientFlux::new(EdgeCorrectedAverage, &FluidConfig::default(), 1e-14);
    let mut res = ResidualField::new(mesh.n_points(), 4);
    ViscousAssembler::new(VariableLayout::new(2), true)
        .assemble(&mesh, &prim, &grads, &scheme, &mut res, None)
        .unwrap();

    for k in 0..4 {
        let total: f64 = (0..mesh.n_points()).map(|p| res.get(p, k)).sum();
        assert!(total.abs() < 1e-12, "变量 {} 残差和 {}", k, total);
    }
}
