// crates/vf_physics/src/engine/solver.rs

//! 压力基不可压缩粘性流求解器
//!
//! 求解器由以下部件组合而成：
//!
//! - 对流基础求解器 [`ConvectiveSolver`]（外部提供，无对流时用 [`NoConvection`]）
//! - 原始变量计算 [`PrimitiveEvaluator`]
//! - 时间步估计 [`TimeStepEstimator`]
//! - 粘性扩展 [`ViscousExtension`]：通量格式、组装器、壁面施加器、
//!   力积分器与湍流耦合极值
//!
//! # 迭代流程
//!
//! ```text
//! preprocessing → compute_time_step → assemble_residual → postprocessing
//!                                                        → friction_forces（仅输出迭代）
//! ```
//!
//! `friction_forces` 要求同一场上已完成 `preprocessing`，否则系数是旧的；
//! 该前提只做文档约定，不做检查。

use std::sync::Arc;

use rayon::prelude::*;
use vf_config::FlowConfig;
use vf_foundation::{ensure, Tolerance, VfError, VfResult};

use super::norms::ResidualNorms;
use super::timestep::{TimeStepEstimator, TimeStepSummary};
use crate::boundary::{WallEnforcer, WallReport};
use crate::comm::{Communicator, SerialCommunicator};
use crate::forces::{ForceIntegrator, ForceReport, VertexTractions, WallDiagnostics};
use crate::gradient::{GradientField, GradientMethod, GradientProvider, GreenGauss};
use crate::mesh::DualGeometry;
use crate::numerics::{ResidualField, SystemMatrix};
use crate::primitive::{PrimitiveEvaluator, PrimitiveReport};
use crate::state::{PrimitiveState, VariableLayout, WorkingState};
use crate::turbulence::{EddyViscosityField, TurbulenceCoupling};
use crate::viscous::{
    averaging_from_config, strain_rate_magnitude, vorticity, AveragedGradientFlux,
    ViscousAssembler, ViscousFluxScheme,
};

/// 共享几何句柄
pub type SharedGeometry = Arc<dyn DualGeometry + Send + Sync>;

// ============================================================
// 对流基础求解器
// ============================================================

/// 对流（无粘）残差提供者
pub trait ConvectiveSolver: Send + Sync {
    /// 名称
    fn name(&self) -> &'static str;

    /// 将对流贡献加入残差（及 Jacobian）
    fn convective_residual(
        &self,
        geometry: &dyn DualGeometry,
        primitives: &PrimitiveState,
        residual: &mut ResidualField,
        jacobian: Option<&mut SystemMatrix>,
    ) -> VfResult<()>;
}

/// 无对流（纯扩散算例与测试）
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConvection;

impl ConvectiveSolver for NoConvection {
    fn name(&self) -> &'static str {
        "none"
    }

    fn convective_residual(
        &self,
        _geometry: &dyn DualGeometry,
        _primitives: &PrimitiveState,
        _residual: &mut ResidualField,
        _jacobian: Option<&mut SystemMatrix>,
    ) -> VfResult<()> {
        Ok(())
    }
}

// ============================================================
// 粘性扩展
// ============================================================

/// 粘性扩展：在对流求解器之上叠加粘性项、壁面与力积分
pub struct ViscousExtension {
    scheme: Box<dyn ViscousFluxScheme>,
    assembler: ViscousAssembler,
    walls: WallEnforcer,
    forces: ForceIntegrator,
    tractions: VertexTractions,
    turbulence: TurbulenceCoupling,
}

impl ViscousExtension {
    /// 创建粘性扩展
    pub fn new(
        geometry: &dyn DualGeometry,
        config: &FlowConfig,
        tolerance: Tolerance,
        scheme: Box<dyn ViscousFluxScheme>,
    ) -> VfResult<Self> {
        let layout = VariableLayout::new(geometry.n_dim());
        Ok(Self {
            scheme,
            assembler: ViscousAssembler::new(layout, config.numerics.parallel),
            walls: WallEnforcer::new(geometry, config)?,
            forces: ForceIntegrator::new(geometry, config, tolerance)?,
            tractions: VertexTractions::new(geometry, config)?,
            turbulence: TurbulenceCoupling::new(),
        })
    }

    /// 通量格式
    pub fn scheme(&self) -> &dyn ViscousFluxScheme {
        self.scheme.as_ref()
    }

    /// 壁面施加器
    pub fn walls(&self) -> &WallEnforcer {
        &self.walls
    }

    /// 力积分器
    pub fn forces(&self) -> &ForceIntegrator {
        &self.forces
    }

    /// 逐顶点面力
    pub fn tractions(&self) -> &VertexTractions {
        &self.tractions
    }

    /// 湍流耦合极值
    pub fn turbulence(&self) -> &TurbulenceCoupling {
        &self.turbulence
    }

    /// 湍流耦合极值（可变）
    pub fn turbulence_mut(&mut self) -> &mut TurbulenceCoupling {
        &mut self.turbulence
    }
}

// ============================================================
// 求解器
// ============================================================

/// 求解器阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SolverPhase {
    /// 刚创建
    Created,
    /// 原始变量与梯度已刷新
    Preprocessed,
    /// 残差已组装
    Assembled,
    /// 后处理完成
    Postprocessed,
}

/// 一次迭代的统计
#[derive(Debug, Clone)]
pub struct IterationStats {
    /// 原始变量计算结果
    pub primitives: PrimitiveReport,
    /// 时间步统计
    pub time_step: TimeStepSummary,
    /// 壁面施加统计
    pub walls: WallReport,
    /// 残差范数
    pub norms: ResidualNorms,
    /// 力系数（仅输出迭代）
    pub forces: Option<ForceReport>,
}

/// 粘性流求解器
pub struct FlowSolver {
    geometry: SharedGeometry,
    config: FlowConfig,
    tolerance: Tolerance,
    layout: VariableLayout,

    convective: Box<dyn ConvectiveSolver>,
    primitive_eval: PrimitiveEvaluator,
    time_step: TimeStepEstimator,
    viscous: ViscousExtension,
    gradient_method: Box<dyn GradientMethod>,
    comm: Box<dyn Communicator>,

    working: WorkingState,
    primitives: PrimitiveState,
    gradients: GradientField,
    eddy: Option<EddyViscosityField>,
    residual: ResidualField,
    jacobian: Option<SystemMatrix>,
    dt: Vec<f64>,
    phase: SolverPhase,
}

impl FlowSolver {
    /// 创建构建器
    pub fn builder(geometry: SharedGeometry, config: FlowConfig) -> FlowSolverBuilder {
        FlowSolverBuilder {
            geometry,
            config,
            tolerance: Tolerance::default(),
            convective: None,
            gradient_method: None,
            scheme: None,
            comm: None,
        }
    }

    /// 预处理：刷新原始变量与梯度
    pub fn preprocessing(&mut self) -> VfResult<PrimitiveReport> {
        let report = self
            .primitive_eval
            .evaluate(&self.working, self.eddy.as_ref(), &mut self.primitives)?;
        self.gradient_method
            .compute(self.geometry.as_ref(), &self.primitives, &mut self.gradients)?;
        self.phase = SolverPhase::Preprocessed;
        Ok(report)
    }

    /// 计算局部（或全局）时间步
    pub fn compute_time_step(&mut self) -> VfResult<TimeStepSummary> {
        self.time_step
            .compute(self.geometry.as_ref(), &self.primitives, self.comm.as_ref(), &mut self.dt)
    }

    /// 组装残差：对流 + 粘性 + 壁面约束
    pub fn assemble_residual(&mut self) -> VfResult<WallReport> {
        ensure!(
            self.phase >= SolverPhase::Preprocessed,
            VfError::internal("组装残差前必须先完成预处理")
        );

        let geometry = self.geometry.as_ref();
        self.residual.clear();
        if let Some(jac) = self.jacobian.as_mut() {
            jac.clear_values();
        }

        self.convective
            .convective_residual(geometry, &self.primitives, &mut self.residual, self.jacobian.as_mut())?;

        self.viscous.assembler.assemble(
            geometry,
            &self.primitives,
            &self.gradients,
            self.viscous.scheme.as_ref(),
            &mut self.residual,
            self.jacobian.as_mut(),
        )?;

        let report = self.viscous.walls.enforce(
            geometry,
            &mut self.working,
            &mut self.primitives,
            &mut self.residual,
            self.jacobian.as_mut(),
        )?;

        self.phase = SolverPhase::Assembled;
        Ok(report)
    }

    /// 后处理：扫描应变率与涡量极值并抬高运行最大值
    pub fn postprocessing(&mut self) -> VfResult<()> {
        let n_domain = self.geometry.n_points_domain();
        let gradients = &self.gradients;
        let (strain, omega) = (0..n_domain)
            .into_par_iter()
            .map(|p| {
                let g = gradients.velocity_gradient(p);
                (strain_rate_magnitude(&g), vorticity(&g).length())
            })
            .reduce(|| (0.0, 0.0), |a, b| (a.0.max(b.0), a.1.max(b.1)));

        let mut ext = [strain, omega];
        self.comm.all_reduce_max(&mut ext);
        self.viscous.turbulence.observe(ext[0], ext[1]);
        self.phase = SolverPhase::Postprocessed;
        Ok(())
    }

    /// 壁面力与系数积分（含压力贡献）
    pub fn friction_forces(&mut self) -> VfResult<ForceReport> {
        let geometry = self.geometry.as_ref();
        let forces = &mut self.viscous.forces;
        forces.pressure_forces(geometry, &self.primitives, self.comm.as_ref())?;
        let ext = forces.friction_forces(geometry, &self.primitives, &self.gradients, self.comm.as_ref())?;
        self.viscous.turbulence.observe(ext.strain_mag_max, ext.omega_max);
        Ok(self.viscous.forces.report())
    }

    /// 计算 `fluid_load` 标记的逐顶点面力
    pub fn compute_vertex_tractions(&mut self, factor: f64) -> VfResult<()> {
        self.viscous
            .tractions
            .compute(self.geometry.as_ref(), &self.primitives, &self.gradients, factor)
    }

    /// 残差范数
    pub fn residual_norms(&self) -> VfResult<ResidualNorms> {
        ResidualNorms::compute(self.geometry.as_ref(), &self.residual, self.comm.as_ref(), &self.tolerance)
    }

    /// 完整执行一次迭代（不含线性求解与更新）
    pub fn run_iteration(&mut self, output: bool) -> VfResult<IterationStats> {
        let primitives = self.preprocessing()?;
        let time_step = self.compute_time_step()?;
        let walls = self.assemble_residual()?;
        self.postprocessing()?;
        let norms = self.residual_norms()?;
        let forces = if output {
            Some(self.friction_forces()?)
        } else {
            None
        };
        Ok(IterationStats {
            primitives,
            time_step,
            walls,
            norms,
            forces,
        })
    }

    // ========== 访问器 ==========

    /// 几何
    pub fn geometry(&self) -> &dyn DualGeometry {
        self.geometry.as_ref()
    }

    /// 配置（只读，构造时确定）
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// 变量排列
    pub fn layout(&self) -> VariableLayout {
        self.layout
    }

    /// 当前阶段
    pub fn phase(&self) -> SolverPhase {
        self.phase
    }

    /// 对流求解器名称
    pub fn convective_name(&self) -> &'static str {
        self.convective.name()
    }

    /// 梯度方法名称
    pub fn gradient_name(&self) -> &'static str {
        self.gradient_method.name()
    }

    /// 工作变量
    pub fn working(&self) -> &WorkingState {
        &self.working
    }

    /// 工作变量（可变，由外部线性求解更新）
    pub fn working_mut(&mut self) -> &mut WorkingState {
        &mut self.working
    }

    /// 原始变量
    pub fn primitives(&self) -> &PrimitiveState {
        &self.primitives
    }

    /// 梯度
    pub fn gradients(&self) -> &GradientField {
        &self.gradients
    }

    /// 梯度（可变，配合 `Prescribed` 使用）
    pub fn gradients_mut(&mut self) -> &mut GradientField {
        &mut self.gradients
    }

    /// 设置湍流模型给出的涡粘度与湍动能
    pub fn set_eddy_viscosity(&mut self, eddy: EddyViscosityField) -> VfResult<()> {
        let n = self.geometry.n_points();
        VfError::check_size("mu_turb", n, eddy.mu_turb.len())?;
        VfError::check_size("tke", n, eddy.tke.len())?;
        self.eddy = Some(eddy);
        Ok(())
    }

    /// 残差
    pub fn residual(&self) -> &ResidualField {
        &self.residual
    }

    /// Jacobian（隐式时存在）
    pub fn jacobian(&self) -> Option<&SystemMatrix> {
        self.jacobian.as_ref()
    }

    /// 局部时间步
    pub fn time_steps(&self) -> &[f64] {
        &self.dt
    }

    /// 粘性扩展
    pub fn viscous(&self) -> &ViscousExtension {
        &self.viscous
    }

    /// 湍流耦合极值
    pub fn turbulence(&self) -> &TurbulenceCoupling {
        &self.viscous.turbulence
    }

    /// 湍流耦合极值（可变）
    pub fn turbulence_mut(&mut self) -> &mut TurbulenceCoupling {
        &mut self.viscous.turbulence
    }

    /// 逐顶点壁面诊断量
    pub fn wall_diagnostics(&self) -> &WallDiagnostics {
        self.viscous.forces.diagnostics()
    }
}

// ============================================================
// 构建器
// ============================================================

/// [`FlowSolver`] 构建器
pub struct FlowSolverBuilder {
    geometry: SharedGeometry,
    config: FlowConfig,
    tolerance: Tolerance,
    convective: Option<Box<dyn ConvectiveSolver>>,
    gradient_method: Option<Box<dyn GradientMethod>>,
    scheme: Option<Box<dyn ViscousFluxScheme>>,
    comm: Option<Box<dyn Communicator>>,
}

impl FlowSolverBuilder {
    /// 数值容差
    pub fn tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// 对流基础求解器
    pub fn convective(mut self, solver: Box<dyn ConvectiveSolver>) -> Self {
        self.convective = Some(solver);
        self
    }

    /// 梯度方法
    pub fn gradient_method(mut self, method: Box<dyn GradientMethod>) -> Self {
        self.gradient_method = Some(method);
        self
    }

    /// 粘性通量格式
    pub fn flux_scheme(mut self, scheme: Box<dyn ViscousFluxScheme>) -> Self {
        self.scheme = Some(scheme);
        self
    }

    /// 分区通信器
    pub fn communicator(mut self, comm: Box<dyn Communicator>) -> Self {
        self.comm = Some(comm);
        self
    }

    /// 构建求解器，初场为来流
    pub fn build(self) -> VfResult<FlowSolver> {
        let Self {
            geometry,
            config,
            tolerance,
            convective,
            gradient_method,
            scheme,
            comm,
        } = self;

        config.validate().map_err(|e| VfError::config(e.to_string()))?;
        ensure!(
            config.dimension == geometry.n_dim(),
            VfError::invalid_config(
                "dimension",
                config.dimension.to_string(),
                format!("网格维数为 {}", geometry.n_dim())
            )
        );

        let n = geometry.n_points();
        let layout = VariableLayout::new(geometry.n_dim());
        let scheme = scheme.unwrap_or_else(|| {
            Box::new(AveragedGradientFlux::new(
                averaging_from_config(config.numerics.face_averaging),
                &config.fluid,
                tolerance.min_distance,
            ))
        });
        let viscous = ViscousExtension::new(geometry.as_ref(), &config, tolerance, scheme)?;

        let fs = &config.freestream;
        let working = WorkingState::uniform(
            n,
            fs.pressure,
            glam::DVec3::from_array(fs.velocity_vector(config.dimension)),
            fs.temperature,
        );
        // 原始变量先取来流值：首次迭代中的非物理点保留的是来流而不是零密度
        let primitive_eval = PrimitiveEvaluator::new(&config);
        let mut primitives = PrimitiveState::new(n);
        primitive_eval.evaluate(&working, None, &mut primitives)?;

        let jacobian = config
            .time
            .implicit
            .then(|| SystemMatrix::from_geometry(geometry.as_ref(), layout.n_var()));

        log::debug!(
            "创建粘性求解器: {} 点, {} 面, {} 标记, 隐式={}",
            n,
            geometry.faces().len(),
            geometry.n_markers(),
            config.time.implicit
        );

        Ok(FlowSolver {
            primitive_eval,
            time_step: TimeStepEstimator::new(&config, tolerance),
            convective: convective.unwrap_or_else(|| Box::new(NoConvection)),
            gradient_method: gradient_method.unwrap_or_else(|| Box::new(GreenGauss::new(tolerance))),
            comm: comm.unwrap_or_else(|| Box::new(SerialCommunicator)),
            viscous,
            working,
            primitives,
            gradients: GradientField::new(n),
            eddy: None,
            residual: ResidualField::new(n, layout.n_var()),
            jacobian,
            dt: vec![0.0; n],
            phase: SolverPhase::Created,
            geometry,
            config,
            tolerance,
            layout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::Prescribed;
    use crate::mesh::DualMesh;
    use glam::DVec3;
    use vf_config::{MarkerConfig, MarkerKind};

    fn cavity(implicit: bool) -> FlowSolver {
        let mesh = DualMesh::rectilinear(&[0.0, 0.5, 1.0], &[0.0, 0.5, 1.0], ["bottom", "right", "top", "left"]).unwrap();
        let mut config = FlowConfig::default();
        config.time.implicit = implicit;
        config.markers = vec![
            MarkerConfig::isothermal_wall("bottom", 320.0),
            MarkerConfig::adiabatic_wall("right"),
            MarkerConfig::adiabatic_wall("top").with_wall_velocity([1.0, 0.0, 0.0]),
            MarkerConfig::adiabatic_wall("left"),
        ];
        FlowSolver::builder(Arc::new(mesh), config).build().unwrap()
    }

    #[test]
    fn test_assemble_requires_preprocessing() {
        let mut solver = cavity(false);
        assert_eq!(solver.phase(), SolverPhase::Created);
        assert!(matches!(solver.assemble_residual(), Err(VfError::Internal { .. })));
    }

    #[test]
    fn test_iteration_enforces_walls() {
        let mut solver = cavity(true);
        let stats = solver.run_iteration(true).unwrap();
        assert!(stats.primitives.is_clean());
        assert_eq!(solver.phase(), SolverPhase::Postprocessed);

        // 顶盖（非角点）被驱动，底面等温
        assert_eq!(solver.working().velocity[7], DVec3::X);
        assert_eq!(solver.primitives().velocity(7), DVec3::X);
        assert_eq!(solver.working().temperature[1], 320.0);
        assert_eq!(solver.working().velocity[4], DVec3::new(1.0, 0.0, 0.0));

        // 角点 6 同属 top 与 left，top 索引较小
        assert!(stats.walls.shared_vertices.iter().any(|s| s.point == 6 && s.owner == 2));
        assert!(stats.forces.is_some());
        assert!(solver.jacobian().is_some());
        assert!(solver.time_steps().iter().all(|&dt| dt > 0.0));
    }

    #[test]
    fn test_postprocessing_raises_extrema() {
        let mut solver = FlowSolver::builder(
            Arc::new(DualMesh::rectilinear(&[0.0, 1.0], &[0.0, 1.0], ["a", "b", "c", "d"]).unwrap()),
            FlowConfig::default(),
        )
        .gradient_method(Box::new(Prescribed))
        .build()
        .unwrap();
        for p in 0..4 {
            solver
                .gradients_mut()
                .set_velocity_gradient(p, GradientField::from_rows(DVec3::new(0.0, 2.0, 0.0), DVec3::ZERO, DVec3::ZERO));
        }
        solver.preprocessing().unwrap();
        solver.postprocessing().unwrap();
        assert!((solver.turbulence().omega_max() - 2.0).abs() < 1e-14);

        // 只抬高，不自动清零
        solver.gradients_mut().set_velocity_gradient(0, glam::DMat3::ZERO);
        solver.postprocessing().unwrap();
        assert!((solver.turbulence().omega_max() - 2.0).abs() < 1e-14);
        solver.turbulence_mut().reset();
        assert_eq!(solver.turbulence().omega_max(), 0.0);
    }

    #[test]
    fn test_primitives_seeded_from_freestream() {
        let solver = cavity(false);
        let fs = &solver.config().freestream;
        let p = solver.primitives().point(4);
        assert_eq!(p.density, fs.density);
        assert_eq!(p.mu_lam, fs.viscosity_inf);
        assert_eq!(p.temperature, fs.temperature);
    }

    #[test]
    fn test_non_physical_point_on_first_iteration() {
        let mut solver = cavity(false);
        solver.working_mut().temperature[4] = -10.0;

        // 非物理点计数返回，时间步仍然有限
        let stats = solver.run_iteration(false).unwrap();
        assert_eq!(stats.primitives.non_physical, 1);
        assert_eq!(solver.primitives().point(4).density, solver.config().freestream.density);
        assert!(solver.time_steps().iter().all(|dt| dt.is_finite() && *dt > 0.0));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mesh = DualMesh::rectilinear(&[0.0, 1.0], &[0.0, 1.0], ["a", "b", "c", "d"]).unwrap();
        let mut config = FlowConfig::default();
        config.dimension = 3;
        assert!(FlowSolver::builder(Arc::new(mesh), config).build().is_err());
    }

    #[test]
    fn test_unknown_marker_rejected() {
        let mesh = DualMesh::rectilinear(&[0.0, 1.0], &[0.0, 1.0], ["a", "b", "c", "d"]).unwrap();
        let mut config = FlowConfig::default();
        config.markers = vec![MarkerConfig::new("far", MarkerKind::Farfield)];
        let err = FlowSolver::builder(Arc::new(mesh), config).build().err();
        assert!(matches!(err, Some(VfError::NotFound { .. })));
    }
}
