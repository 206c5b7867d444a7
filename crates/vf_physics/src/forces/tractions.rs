// crates/vf_physics/src/forces/tractions.rs

//! 流固耦合的逐顶点面力
//!
//! 对 `fluid_load = true` 的标记计算作用在结构上的面力密度：
//!
//! ```text
//! t = [(p − p∞) n̂ − τ n̂] · factor
//! ```
//!
//! `n̂` 为单位外法向，τ 取分子粘度。`factor` 为无量纲化还原因子
//! `ρ_ref V_ref² / (ρ_nd V_nd²)`，有量纲计算时为 1。halo 顶点写 0。

use glam::DVec3;
use vf_config::FlowConfig;
use vf_foundation::{VfError, VfResult};

use crate::boundary::BoundaryError;
use crate::gradient::GradientProvider;
use crate::mesh::DualGeometry;
use crate::state::PrimitiveState;
use crate::viscous::stress_tensor;

/// 逐顶点面力
#[derive(Debug, Clone, Default)]
pub struct VertexTractions {
    loaded: Vec<bool>,
    tractions: Vec<Vec<DVec3>>,
    pressure_inf: f64,
}

impl VertexTractions {
    /// 按配置的 `fluid_load` 标记分配
    pub fn new(geometry: &dyn DualGeometry, config: &FlowConfig) -> Result<Self, BoundaryError> {
        let mut loaded = vec![false; geometry.n_markers()];
        for marker in config.markers.iter().filter(|m| m.fluid_load) {
            let m = geometry
                .marker_index(&marker.name)
                .ok_or_else(|| BoundaryError::MarkerNotFound(marker.name.clone()))?;
            loaded[m] = true;
        }
        let tractions = (0..geometry.n_markers())
            .map(|m| {
                let n = if loaded[m] { geometry.marker_vertices(m).len() } else { 0 };
                vec![DVec3::ZERO; n]
            })
            .collect();
        Ok(Self {
            loaded,
            tractions,
            pressure_inf: config.freestream.pressure,
        })
    }

    /// 标记是否输出面力
    pub fn is_loaded(&self, marker: usize) -> bool {
        self.loaded[marker]
    }

    /// 单个顶点的面力
    pub fn traction(&self, marker: usize, vertex: usize) -> DVec3 {
        self.tractions[marker][vertex]
    }

    /// 单个标记的全部面力（未加载的标记为空）
    pub fn marker(&self, marker: usize) -> &[DVec3] {
        &self.tractions[marker]
    }

    /// 计算全部加载标记的面力
    pub fn compute(
        &mut self,
        geometry: &dyn DualGeometry,
        primitives: &PrimitiveState,
        gradients: &dyn GradientProvider,
        factor: f64,
    ) -> VfResult<()> {
        VfError::check_size("primitives", geometry.n_points(), primitives.len())?;

        for (m, out) in self.tractions.iter_mut().enumerate() {
            if !self.loaded[m] {
                continue;
            }
            for (slot, vertex) in out.iter_mut().zip(geometry.marker_vertices(m)) {
                let p = vertex.point;
                if !geometry.is_owned(p) {
                    *slot = DVec3::ZERO;
                    continue;
                }
                let prim = primitives.point(p);
                let unit = vertex.unit_normal();
                let tau = stress_tensor(&gradients.velocity_gradient(p), prim.mu_lam, prim.density, 0.0);
                *slot = ((prim.pressure - self.pressure_inf) * unit - tau * unit) * factor;
            }
        }
        Ok(())
    }
}
