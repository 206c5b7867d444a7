// crates/vf_physics/src/boundary/wall.rs

//! 壁面边界施加器
//!
//! 壁面约束直接作用在离散系统上，而不是通过通量：
//!
//! | 壁面 | 速度 | 温度 |
//! |------|------|------|
//! | 热通量 | 强制 u = u_wall，速度残差行置零，矩阵行删除 | 能量残差 −= q·\|A\| |
//! | 等温 | 同上 | 强制 T = T_w，能量残差行置零，矩阵行删除 |
//!
//! 删除矩阵行只清零该行并置单位对角，列不动，不影响其他方程的耦合。
//!
//! # 共享顶点
//!
//! 标记按索引升序处理，第一个到达某顶点的壁面标记拥有该顶点的全部约束，
//! 之后的标记整体跳过该顶点，并记录在 [`WallReport::shared_vertices`] 中。
//! halo 顶点由所属分区处理，这里跳过。

use glam::DVec3;
use vf_config::FlowConfig;
use vf_foundation::{VfError, VfResult};

use super::types::{BoundaryError, WallKind, WallMarker};
use crate::mesh::DualGeometry;
use crate::numerics::{ResidualField, SystemMatrix};
use crate::state::{PrimitiveState, VariableLayout, WorkingState};

/// 被多个壁面标记共享的顶点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedVertex {
    /// 网格点
    pub point: usize,
    /// 拥有约束的标记
    pub owner: usize,
    /// 被跳过的标记
    pub skipped: usize,
}

/// 一次施加的统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WallReport {
    /// 施加了无滑移的顶点数
    pub no_slip_vertices: usize,
    /// 施加了温度 Dirichlet 的顶点数
    pub isothermal_vertices: usize,
    /// 施加了热通量 Neumann 的顶点数
    pub heat_flux_vertices: usize,
    /// 共享顶点
    pub shared_vertices: Vec<SharedVertex>,
}

/// 壁面边界施加器
#[derive(Debug, Clone)]
pub struct WallEnforcer {
    walls: Vec<WallMarker>,
    layout: VariableLayout,
}

impl WallEnforcer {
    /// 由网格与配置建立壁面列表（按标记索引升序）
    pub fn new(geometry: &dyn DualGeometry, config: &FlowConfig) -> Result<Self, BoundaryError> {
        let mut walls = Vec::new();
        for marker in &config.markers {
            let index = geometry
                .marker_index(&marker.name)
                .ok_or_else(|| BoundaryError::MarkerNotFound(marker.name.clone()))?;
            if let Some(wall) = WallMarker::from_config(index, marker) {
                walls.push(wall);
            }
        }
        Self::from_walls(geometry, walls, VariableLayout::new(geometry.n_dim()))
    }

    /// 由显式壁面列表创建
    pub fn from_walls(
        geometry: &dyn DualGeometry,
        mut walls: Vec<WallMarker>,
        layout: VariableLayout,
    ) -> Result<Self, BoundaryError> {
        let count = geometry.n_markers();
        if let Some(w) = walls.iter().find(|w| w.marker >= count) {
            return Err(BoundaryError::InvalidMarker {
                index: w.marker,
                count,
            });
        }
        walls.sort_by_key(|w| w.marker);
        if walls.windows(2).any(|w| w[0].marker == w[1].marker) {
            return Err(BoundaryError::Configuration("同一标记被重复定义为壁面".into()));
        }
        Ok(Self { walls, layout })
    }

    /// 壁面列表（处理顺序）
    pub fn walls(&self) -> &[WallMarker] {
        &self.walls
    }

    /// 施加壁面约束
    ///
    /// 修改工作变量与原始变量中的速度（及等温壁温度），残差与矩阵中
    /// 对应的行。
    pub fn enforce(
        &self,
        geometry: &dyn DualGeometry,
        working: &mut WorkingState,
        primitives: &mut PrimitiveState,
        residual: &mut ResidualField,
        mut jacobian: Option<&mut SystemMatrix>,
    ) -> VfResult<WallReport> {
        let n = geometry.n_points();
        working.check_len(n)?;
        VfError::check_size("primitives", n, primitives.len())?;
        VfError::check_size("residual", n, residual.n_points())?;

        let layout = self.layout;
        let t_var = layout.temperature();
        let mut owner: Vec<Option<usize>> = vec![None; n];
        let mut report = WallReport::default();

        for wall in &self.walls {
            for vertex in geometry.marker_vertices(wall.marker) {
                let p = vertex.point;
                if !geometry.is_owned(p) {
                    continue;
                }
                if let Some(first) = owner[p] {
                    if first != wall.marker {
                        report.shared_vertices.push(SharedVertex {
                            point: p,
                            owner: first,
                            skipped: wall.marker,
                        });
                    }
                    continue;
                }
                owner[p] = Some(wall.marker);

                // 无滑移
                let u_wall = self.project(wall.velocity);
                working.velocity[p] = u_wall;
                primitives.point_mut(p).velocity = u_wall;
                for k in layout.velocity_range() {
                    residual.set(p, k, 0.0);
                    if let Some(jac) = jacobian.as_deref_mut() {
                        jac.delete_row(jac.row_of(p, k));
                    }
                }
                report.no_slip_vertices += 1;

                match wall.kind {
                    WallKind::HeatFlux { heat_flux } => {
                        residual.add(p, t_var, -heat_flux * vertex.area());
                        report.heat_flux_vertices += 1;
                    }
                    WallKind::Isothermal { temperature } => {
                        working.temperature[p] = temperature;
                        primitives.point_mut(p).temperature = temperature;
                        residual.set(p, t_var, 0.0);
                        if let Some(jac) = jacobian.as_deref_mut() {
                            jac.delete_row(jac.row_of(p, t_var));
                        }
                        report.isothermal_vertices += 1;
                    }
                }
            }
        }

        if !report.shared_vertices.is_empty() {
            log::debug!(
                "{} 个壁面顶点被多个标记共享，按标记顺序由先处理者约束",
                report.shared_vertices.len()
            );
        }
        Ok(report)
    }

    /// 二维时去掉 z 分量
    #[inline]
    fn project(&self, v: DVec3) -> DVec3 {
        if self.layout.n_dim() == 2 {
            DVec3::new(v.x, v.y, 0.0)
        } else {
            v
        }
    }
}
