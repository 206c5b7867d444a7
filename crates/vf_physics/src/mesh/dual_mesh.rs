// crates/vf_physics/src/mesh/dual_mesh.rs

//! 内存中的中值对偶网格
//!
//! 提供显式构造与二维结构化块构造 [`DualMesh::rectilinear`]。

use glam::DVec3;
use vf_foundation::{ensure, VfError, VfResult};

use super::{BoundaryVertex, DualGeometry, InternalFace};

/// 一个边界标记的顶点集合
#[derive(Debug, Clone)]
pub struct MarkerVertices {
    /// 标记名称
    pub name: String,
    /// 顶点列表
    pub vertices: Vec<BoundaryVertex>,
}

impl MarkerVertices {
    /// 创建标记
    pub fn new(name: impl Into<String>, vertices: Vec<BoundaryVertex>) -> Self {
        Self {
            name: name.into(),
            vertices,
        }
    }
}

/// 中值对偶网格
#[derive(Debug, Clone)]
pub struct DualMesh {
    n_dim: usize,
    n_points_domain: usize,
    coords: Vec<DVec3>,
    volumes: Vec<f64>,
    faces: Vec<InternalFace>,
    markers: Vec<MarkerVertices>,
}

impl DualMesh {
    /// 由显式数据构造并检查拓扑
    pub fn new(
        n_dim: usize,
        coords: Vec<DVec3>,
        volumes: Vec<f64>,
        faces: Vec<InternalFace>,
        markers: Vec<MarkerVertices>,
    ) -> VfResult<Self> {
        ensure!(
            n_dim == 2 || n_dim == 3,
            VfError::invalid_mesh(format!("维数 {} 不受支持", n_dim))
        );
        let n = coords.len();
        VfError::check_size("volumes", n, volumes.len())?;

        for (f, face) in faces.iter().enumerate() {
            VfError::check_index("Point", face.left, n)?;
            VfError::check_index("Point", face.right, n)?;
            ensure!(
                face.left != face.right,
                VfError::invalid_mesh(format!("面 {} 两侧为同一点 {}", f, face.left))
            );
        }
        for marker in &markers {
            for v in &marker.vertices {
                VfError::check_index("Point", v.point, n)?;
                VfError::check_index("Point", v.normal_neighbor, n)?;
            }
        }

        Ok(Self {
            n_dim,
            n_points_domain: n,
            coords,
            volumes,
            faces,
            markers,
        })
    }

    /// 设置本分区拥有的点数，其后的点视为 halo
    pub fn with_domain_points(mut self, n_points_domain: usize) -> VfResult<Self> {
        ensure!(
            n_points_domain <= self.coords.len(),
            VfError::index_out_of_bounds("Point", n_points_domain, self.coords.len() + 1)
        );
        self.n_points_domain = n_points_domain;
        Ok(self)
    }

    /// 二维结构化块的中值对偶网格
    ///
    /// 点 `(i, j)` 的索引为 `j * xs.len() + i`。`names` 依次为下、右、上、左
    /// 四条边的标记名，角点同时属于相邻两条边，各占一半对偶边长。
    pub fn rectilinear(xs: &[f64], ys: &[f64], names: [&str; 4]) -> VfResult<Self> {
        let nx = xs.len();
        let ny = ys.len();
        ensure!(
            nx >= 2 && ny >= 2,
            VfError::invalid_mesh("结构化块每个方向至少需要 2 个点")
        );
        ensure!(
            xs.windows(2).all(|w| w[1] > w[0]) && ys.windows(2).all(|w| w[1] > w[0]),
            VfError::invalid_mesh("坐标必须严格递增")
        );

        let hx = dual_widths(xs);
        let hy = dual_widths(ys);
        let id = |i: usize, j: usize| j * nx + i;

        let mut coords = Vec::with_capacity(nx * ny);
        let mut volumes = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                coords.push(DVec3::new(xs[i], ys[j], 0.0));
                volumes.push(hx[i] * hy[j]);
            }
        }

        let mut faces = Vec::with_capacity((nx - 1) * ny + nx * (ny - 1));
        for j in 0..ny {
            for i in 0..nx - 1 {
                faces.push(InternalFace::new(id(i, j), id(i + 1, j), DVec3::new(hy[j], 0.0, 0.0)));
            }
        }
        for j in 0..ny - 1 {
            for i in 0..nx {
                faces.push(InternalFace::new(id(i, j), id(i, j + 1), DVec3::new(0.0, hx[i], 0.0)));
            }
        }

        let bottom = (0..nx)
            .map(|i| BoundaryVertex {
                point: id(i, 0),
                normal: DVec3::new(0.0, -hx[i], 0.0),
                normal_neighbor: id(i, 1),
            })
            .collect();
        let right = (0..ny)
            .map(|j| BoundaryVertex {
                point: id(nx - 1, j),
                normal: DVec3::new(hy[j], 0.0, 0.0),
                normal_neighbor: id(nx - 2, j),
            })
            .collect();
        let top = (0..nx)
            .map(|i| BoundaryVertex {
                point: id(i, ny - 1),
                normal: DVec3::new(0.0, hx[i], 0.0),
                normal_neighbor: id(i, ny - 2),
            })
            .collect();
        let left = (0..ny)
            .map(|j| BoundaryVertex {
                point: id(0, j),
                normal: DVec3::new(-hy[j], 0.0, 0.0),
                normal_neighbor: id(1, j),
            })
            .collect();

        let markers = vec![
            MarkerVertices::new(names[0], bottom),
            MarkerVertices::new(names[1], right),
            MarkerVertices::new(names[2], top),
            MarkerVertices::new(names[3], left),
        ];

        Self::new(2, coords, volumes, faces, markers)
    }

    /// 可变体积（测试退化几何用）
    pub fn volumes_mut(&mut self) -> &mut [f64] {
        &mut self.volumes
    }
}

/// 一维中值对偶宽度
fn dual_widths(xs: &[f64]) -> Vec<f64> {
    let n = xs.len();
    (0..n)
        .map(|i| {
            let lo = if i == 0 { xs[0] } else { 0.5 * (xs[i - 1] + xs[i]) };
            let hi = if i == n - 1 { xs[n - 1] } else { 0.5 * (xs[i] + xs[i + 1]) };
            hi - lo
        })
        .collect()
}

impl DualGeometry for DualMesh {
    fn n_dim(&self) -> usize {
        self.n_dim
    }

    fn n_points(&self) -> usize {
        self.coords.len()
    }

    fn n_points_domain(&self) -> usize {
        self.n_points_domain
    }

    fn coord(&self, point: usize) -> DVec3 {
        self.coords[point]
    }

    fn volume(&self, point: usize) -> f64 {
        self.volumes[point]
    }

    fn faces(&self) -> &[InternalFace] {
        &self.faces
    }

    fn n_markers(&self) -> usize {
        self.markers.len()
    }

    fn marker_name(&self, marker: usize) -> &str {
        &self.markers[marker].name
    }

    fn marker_vertices(&self, marker: usize) -> &[BoundaryVertex] {
        &self.markers[marker].vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> DualMesh {
        DualMesh::rectilinear(&[0.0, 1.0, 3.0], &[0.0, 0.5, 1.0, 2.0], ["s", "e", "n", "w"]).unwrap()
    }

    #[test]
    fn test_rectilinear_counts() {
        let mesh = block();
        assert_eq!(mesh.n_points(), 12);
        assert_eq!(mesh.faces().len(), 2 * 4 + 3 * 3);
        assert_eq!(mesh.n_markers(), 4);
        assert_eq!(mesh.marker_vertices(0).len(), 3);
        assert_eq!(mesh.marker_vertices(1).len(), 4);
        assert_eq!(mesh.marker_index("n"), Some(2));
    }

    #[test]
    fn test_volumes_sum_to_block_area() {
        let mesh = block();
        let total: f64 = (0..mesh.n_points()).map(|p| mesh.volume(p)).sum();
        assert!((total - 3.0 * 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_control_volumes_are_closed() {
        let mesh = block();
        let mut sum = vec![DVec3::ZERO; mesh.n_points()];
        for f in mesh.faces() {
            sum[f.left] += f.normal;
            sum[f.right] -= f.normal;
        }
        for m in 0..mesh.n_markers() {
            for v in mesh.marker_vertices(m) {
                sum[v.point] += v.normal;
            }
        }
        for s in sum {
            assert!(s.length() < 1e-12);
        }
    }

    #[test]
    fn test_invalid_meshes_rejected() {
        assert!(DualMesh::rectilinear(&[0.0], &[0.0, 1.0], ["a", "b", "c", "d"]).is_err());
        assert!(DualMesh::rectilinear(&[0.0, 0.0], &[0.0, 1.0], ["a", "b", "c", "d"]).is_err());

        let face = InternalFace::new(0, 0, DVec3::X);
        let err = DualMesh::new(2, vec![DVec3::ZERO], vec![1.0], vec![face], vec![]).unwrap_err();
        assert!(matches!(err, VfError::InvalidMesh { .. }));
    }

    #[test]
    fn test_halo_points() {
        let mesh = block().with_domain_points(10).unwrap();
        assert!(mesh.is_owned(9));
        assert!(!mesh.is_owned(10));
        assert!(block().with_domain_points(20).is_err());
    }
}
