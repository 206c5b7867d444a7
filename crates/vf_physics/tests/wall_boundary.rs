// crates/vf_physics/tests/wall_boundary.rs

//! 壁面边界集成测试
//! 通过完整迭代验证无滑移、等温与热通量壁面的施加结果

use std::sync::Arc;

use glam::DVec3;
use vf_config::{FlowConfig, MarkerConfig};
use vf_physics::engine::FlowSolver;
use vf_physics::mesh::DualMesh;

/// 3x3 方腔：点 (i, j) 索引为 3j + i
fn cavity(left_heat_flux: f64) -> FlowSolver {
    let mesh = DualMesh::rectilinear(&[0.0, 0.5, 1.0], &[0.0, 0.5, 1.0], ["bottom", "right", "top", "left"]).unwrap();
    let mut config = FlowConfig::default();
    config.time.implicit = true;
    config.numerics.parallel = false;
    config.markers = vec![
        MarkerConfig::isothermal_wall("bottom", 320.0),
        MarkerConfig::adiabatic_wall("right"),
        MarkerConfig::adiabatic_wall("top").with_wall_velocity([0.8, 0.0, 0.0]),
        MarkerConfig::heat_flux_wall("left", left_heat_flux),
    ];
    FlowSolver::builder(Arc::new(mesh), config).build().unwrap()
}

/// 无滑移：壁面速度写入状态，速度残差行清零，Jacobian 行删除
#[test]
fn test_no_slip_dirichlet() {
    let mut solver = cavity(0.0);
    let stats = solver.run_iteration(false).unwrap();
    let layout = solver.layout();

    // 3x3 全部边界点都是壁面点
    assert_eq!(stats.walls.no_slip_vertices, 8);
    assert_eq!(solver.working().velocity[7], DVec3::new(0.8, 0.0, 0.0));
    assert_eq!(solver.primitives().velocity(7), DVec3::new(0.8, 0.0, 0.0));
    assert_eq!(solver.working().velocity[3], DVec3::ZERO);
    // 内部点保持来流
    assert_eq!(solver.working().velocity[4], DVec3::X);

    let jac = solver.jacobian().unwrap();
    for p in [0, 1, 2, 3, 5, 6, 7, 8] {
        for d in 0..2 {
            let k = layout.velocity(d);
            assert_eq!(solver.residual().get(p, k), 0.0);
            let row = jac.row_of(p, k);
            assert_eq!(jac.get(row, row), 1.0);
            for &col in jac.pattern().row_indices(row) {
                if col != row {
                    assert_eq!(jac.get(row, col), 0.0);
                }
            }
        }
    }
}

/// 等温：温度写入状态，能量残差行清零、行删除
#[test]
fn test_isothermal_dirichlet() {
    let mut solver = cavity(0.0);
    let stats = solver.run_iteration(false).unwrap();
    let t = solver.layout().temperature();

    // 底边三个点，角点 0 和 2 归底面（索引最小）
    assert_eq!(stats.walls.isothermal_vertices, 3);
    for p in 0..3 {
        assert_eq!(solver.working().temperature[p], 320.0);
        assert_eq!(solver.primitives().temperature(p), 320.0);
        assert_eq!(solver.residual().get(p, t), 0.0);
    }
    let jac = solver.jacobian().unwrap();
    let row = jac.row_of(1, t);
    assert_eq!(jac.get(row, row), 1.0);
    assert_eq!(jac.get(row, jac.row_of(4, t)), 0.0);

    // 共享角点：6 归 top，8 归 right
    let owners: Vec<(usize, usize)> = stats.walls.shared_vertices.iter().map(|s| (s.point, s.owner)).collect();
    assert!(owners.contains(&(0, 0)));
    assert!(owners.contains(&(2, 0)));
    assert!(owners.contains(&(8, 1)));
    assert!(owners.contains(&(6, 2)));
}

/// 热通量：能量残差减去 q·|A|，不删除能量行
#[test]
fn test_heat_flux_neumann() {
    let mut reference = cavity(0.0);
    reference.run_iteration(false).unwrap();
    let mut heated = cavity(100.0);
    heated.run_iteration(false).unwrap();
    let t = heated.layout().temperature();

    // 点 3 为左边中点，对偶边长 0.5
    let diff = heated.residual().get(3, t) - reference.residual().get(3, t);
    assert!((diff + 50.0).abs() < 1e-9, "diff = {}", diff);

    // 其余点不受影响
    for p in [1, 4, 5, 7] {
        assert_eq!(heated.residual().get(p, t), reference.residual().get(p, t));
    }

    let jac = heated.jacobian().unwrap();
    let row = jac.row_of(3, t);
    assert!(jac.get(row, jac.row_of(4, t)) != 0.0);
}
