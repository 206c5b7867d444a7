// crates/vf_physics/src/forces/diagnostics.rs

//! 逐顶点壁面诊断量
//!
//! 每个标记一组数组，长度等于该标记的顶点数，创建时一次分配，
//! 之后每次积分覆盖写入。只有力积分器写入，输出层只读。

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::mesh::DualGeometry;

/// 单个标记的诊断数组
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerDiagnostics {
    /// 摩擦系数矢量 τ_w / q∞
    pub skin_friction: Vec<DVec3>,
    /// y+
    pub y_plus: Vec<f64>,
    /// 进入流体的热通量 [W/m²]
    pub heat_flux: Vec<f64>,
}

impl MarkerDiagnostics {
    /// 按顶点数分配
    pub fn new(n_vertices: usize) -> Self {
        Self {
            skin_friction: vec![DVec3::ZERO; n_vertices],
            y_plus: vec![0.0; n_vertices],
            heat_flux: vec![0.0; n_vertices],
        }
    }

    /// 全部清零（保持长度）
    pub fn clear(&mut self) {
        self.skin_friction.fill(DVec3::ZERO);
        self.y_plus.fill(0.0);
        self.heat_flux.fill(0.0);
    }

    /// 顶点数
    pub fn len(&self) -> usize {
        self.y_plus.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.y_plus.is_empty()
    }
}

/// 全部标记的诊断量
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WallDiagnostics {
    markers: Vec<MarkerDiagnostics>,
}

impl WallDiagnostics {
    /// 按网格标记分配
    pub fn new(geometry: &dyn DualGeometry) -> Self {
        Self {
            markers: (0..geometry.n_markers())
                .map(|m| MarkerDiagnostics::new(geometry.marker_vertices(m).len()))
                .collect(),
        }
    }

    /// 单个标记
    pub fn marker(&self, marker: usize) -> &MarkerDiagnostics {
        &self.markers[marker]
    }

    pub(crate) fn markers_mut(&mut self) -> &mut [MarkerDiagnostics] {
        &mut self.markers
    }

    /// 摩擦系数矢量
    #[inline]
    pub fn skin_friction(&self, marker: usize, vertex: usize) -> DVec3 {
        self.markers[marker].skin_friction[vertex]
    }

    /// 摩擦系数的第 `dim` 个分量
    #[inline]
    pub fn skin_friction_component(&self, marker: usize, vertex: usize, dim: usize) -> f64 {
        self.markers[marker].skin_friction[vertex][dim]
    }

    /// y+
    #[inline]
    pub fn y_plus(&self, marker: usize, vertex: usize) -> f64 {
        self.markers[marker].y_plus[vertex]
    }

    /// 壁面热通量
    #[inline]
    pub fn heat_flux(&self, marker: usize, vertex: usize) -> f64 {
        self.markers[marker].heat_flux[vertex]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::DualMesh;

    #[test]
    fn test_sized_per_marker() {
        let mesh = DualMesh::rectilinear(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0], ["s", "e", "n", "w"]).unwrap();
        let diag = WallDiagnostics::new(&mesh);
        assert_eq!(diag.marker(0).len(), 4);
        assert_eq!(diag.marker(1).len(), 2);
        assert_eq!(diag.skin_friction(0, 3), DVec3::ZERO);
    }

    #[test]
    fn test_clear_keeps_length() {
        let mut d = MarkerDiagnostics::new(3);
        d.y_plus[1] = 2.0;
        d.clear();
        assert_eq!(d.y_plus, vec![0.0; 3]);
    }
}
