// crates/vf_physics/tests/coefficients.rs

//! 系数汇总测试
//! 验证全局/监控面汇总一致性、重复积分的幂等性与效率系数保护

use glam::DVec3;
use vf_config::{FlowConfig, MarkerConfig, MarkerKind, MonitoringSurface};
use vf_foundation::Tolerance;
use vf_physics::comm::SerialCommunicator;
use vf_physics::forces::{CoefficientKind, CoefficientTable, CoefficientValues, ForceIntegrator};
use vf_physics::gradient::GradientField;
use vf_physics::mesh::{DualGeometry, DualMesh};
use vf_physics::state::{PrimitivePoint, PrimitiveState};

use CoefficientKind::*;

fn channel_config() -> FlowConfig {
    let mut config = FlowConfig::default();
    config.freestream.density = 1.0;
    config.freestream.velocity = 1.0;
    config.freestream.angle_of_attack = 3.0;
    config.numerics.parallel = false;
    config.markers = vec![
        MarkerConfig::isothermal_wall("lower", 310.0),
        MarkerConfig::new("outlet", MarkerKind::Outlet),
        MarkerConfig::heat_flux_wall("upper", 50.0),
        MarkerConfig::new("inlet", MarkerKind::Inlet),
    ];
    config.monitoring_surfaces = vec![MonitoringSurface::new("lower_only", ["lower"])];
    config
}

fn channel() -> (DualMesh, PrimitiveState, GradientField) {
    let mesh = DualMesh::rectilinear(
        &[0.0, 0.3, 0.7, 1.2, 2.0],
        &[0.0, 0.05, 0.2, 0.5],
        ["lower", "outlet", "upper", "inlet"],
    )
    .unwrap();
    let n = mesh.n_points();
    let mut prim = PrimitiveState::new(n);
    let mut grads = GradientField::new(n);
    for p in 0..n {
        let x = mesh.coord(p);
        *prim.point_mut(p) = PrimitivePoint {
            pressure: 0.2 * (1.0 - x.x) + 0.05 * x.y,
            velocity: DVec3::new(x.y * (1.0 - x.y), 0.0, 0.0),
            temperature: 300.0,
            density: 1.0,
            mu_lam: 2e-3,
            ..Default::default()
        };
        grads.set_velocity_gradient(
            p,
            GradientField::from_rows(
                DVec3::new(0.1 * x.y, 1.0 - 2.0 * x.y + 0.3 * x.x, 0.0),
                DVec3::new(0.0, -0.1 * x.y, 0.0),
                DVec3::ZERO,
            ),
        );
        // 温度随高度下降得更快，上下壁面热通量不相互抵消
        grads.set_temperature_gradient(p, DVec3::new(0.0, -20.0 * (1.0 + x.x) - 40.0 * x.y, 0.0));
    }
    (mesh, prim, grads)
}

fn integrate(integ: &mut ForceIntegrator, mesh: &DualMesh, prim: &PrimitiveState, grads: &GradientField) {
    integ.pressure_forces(mesh, prim, &SerialCommunicator).unwrap();
    integ.friction_forces(mesh, prim, grads, &SerialCommunicator).unwrap();
}

/// 两个标记的粘性阻力 0.0012 与 0.0008，全局为 0.0020
#[test]
fn test_all_bound_sums_two_markers() {
    let mut table = CoefficientTable::new(vec![true, true], Vec::new());
    let mut a = CoefficientValues::zeros();
    a[CD] = 0.0012;
    let mut b = CoefficientValues::zeros();
    b[CD] = 0.0008;
    table.set_marker_values(0, a);
    table.set_marker_values(1, b);
    table.aggregate();
    assert!((table.all_bound(CD) - 0.0020).abs() < 1e-18);
}

/// 积分结果：每种可加系数的全局值等于物理标记之和，监控面等于成员之和
#[test]
fn test_aggregate_consistency_all_kinds() {
    let (mesh, prim, grads) = channel();
    let mut integ = ForceIntegrator::new(&mesh, &channel_config(), Tolerance::default()).unwrap();
    integrate(&mut integ, &mesh, &prim, &grads);

    for table in [integ.viscous(), integ.inviscid(), &integ.report().total] {
        for kind in CoefficientKind::ALL {
            let markers = (0..mesh.n_markers()).map(|m| table.marker(kind, m));
            match kind {
                CEff => {
                    let expected = if table.all_bound(CD).abs() < 1e-16 {
                        0.0
                    } else {
                        table.all_bound(CL) / table.all_bound(CD)
                    };
                    assert_eq!(table.all_bound(CEff), expected);
                }
                CMerit => assert!(table.all_bound(CMerit).is_finite()),
                MaxHF => {
                    let max = markers.fold(0.0f64, f64::max);
                    assert_eq!(table.all_bound(MaxHF), max);
                }
                _ => {
                    let sum: f64 = markers.sum();
                    assert!((table.all_bound(kind) - sum).abs() <= 1e-14 * sum.abs().max(1.0), "{}", kind);
                }
            }
            if kind != CEff && kind != CMerit {
                assert_eq!(table.surface(kind, 0), table.marker(kind, 0), "{}", kind);
            }
        }
    }

    // 两个壁面都有粘性阻力，进出口没有
    assert!(integ.viscous().marker(CD, 0) != 0.0);
    assert!(integ.viscous().marker(CD, 2) != 0.0);
    assert_eq!(integ.viscous().marker(CD, 1), 0.0);

    // 热通量：各壁面非零，全局等于标记之和且不为零
    let lower = integ.viscous().marker(HF, 0);
    let upper = integ.viscous().marker(HF, 2);
    assert!(lower > 0.0);
    assert!(upper < 0.0);
    assert!(integ.viscous().all_bound(HF) != 0.0);
    assert!((integ.viscous().all_bound(HF) - (lower + upper)).abs() <= 1e-14 * lower.abs());
}

/// 两次积分之间状态不变，系数逐位相同
#[test]
fn test_integration_is_idempotent() {
    let (mesh, prim, grads) = channel();
    let mut integ = ForceIntegrator::new(&mesh, &channel_config(), Tolerance::default()).unwrap();

    integrate(&mut integ, &mesh, &prim, &grads);
    let first = integ.report();
    let first_diag = integ.diagnostics().clone();

    integrate(&mut integ, &mesh, &prim, &grads);
    let second = integ.report();

    assert_eq!(first, second);
    assert_eq!(&first_diag, integ.diagnostics());
}

/// 并行积分与串行积分结果一致
#[test]
fn test_parallel_matches_serial() {
    let (mesh, prim, grads) = channel();
    let mut serial = ForceIntegrator::new(&mesh, &channel_config(), Tolerance::default()).unwrap();
    let mut config = channel_config();
    config.numerics.parallel = true;
    let mut parallel = ForceIntegrator::new(&mesh, &config, Tolerance::default()).unwrap();

    integrate(&mut serial, &mesh, &prim, &grads);
    integrate(&mut parallel, &mesh, &prim, &grads);

    // 标记内部求和顺序固定，标记间汇总串行
    assert_eq!(serial.report(), parallel.report());
}

/// 阻力为零时效率系数为 0，不是 inf/NaN
#[test]
fn test_efficiency_guard_on_zero_drag() {
    let (mesh, mut prim, mut grads) = channel();
    for p in 0..mesh.n_points() {
        prim.point_mut(p).pressure = 0.0;
        grads.set_velocity_gradient(p, glam::DMat3::ZERO);
    }
    let mut integ = ForceIntegrator::new(&mesh, &channel_config(), Tolerance::default()).unwrap();
    integrate(&mut integ, &mesh, &prim, &grads);

    let total = integ.report().total;
    assert_eq!(total.all_bound(CD), 0.0);
    assert_eq!(total.all_bound(CEff), 0.0);
    for m in 0..mesh.n_markers() {
        assert_eq!(total.marker(CEff, m), 0.0);
        assert_eq!(total.marker(CMerit, m), 0.0);
    }
}

/// 容差中的阻力判据决定升阻比何时记为 0
#[test]
fn test_efficiency_threshold_from_tolerance() {
    let (mesh, prim, grads) = channel();

    let mut default = ForceIntegrator::new(&mesh, &channel_config(), Tolerance::default()).unwrap();
    integrate(&mut default, &mesh, &prim, &grads);
    let cd = default.report().total.all_bound(CD);
    assert!(cd.abs() > 0.0);
    assert!(default.report().total.all_bound(CEff) != 0.0);

    let coarse = Tolerance {
        min_drag: 10.0 * cd.abs(),
        ..Tolerance::default()
    };
    let mut guarded = ForceIntegrator::new(&mesh, &channel_config(), coarse).unwrap();
    integrate(&mut guarded, &mesh, &prim, &grads);
    let total = guarded.report().total;

    // 力系数本身不受影响
    assert_eq!(total.all_bound(CD), cd);
    assert_eq!(total.all_bound(CEff), 0.0);
    for m in 0..mesh.n_markers() {
        assert_eq!(total.marker(CEff, m), 0.0);
    }
    assert_eq!(guarded.viscous().threshold(), coarse.min_drag);
}
