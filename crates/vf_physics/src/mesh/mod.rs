// crates/vf_physics/src/mesh/mod.rs

//! 对偶网格几何接口
//!
//! 求解器采用顶点中心的中值对偶有限体积离散：每个网格点拥有一个控制体，
//! 相邻两点之间的"内部面"就是对偶控制面。
//!
//! # 约定
//!
//! - [`InternalFace::normal`] 为面积加权法向，由 `left` 指向 `right`
//! - [`BoundaryVertex::normal`] 为面积加权法向，指向流体域外
//! - 二维网格 z 分量恒为 0
//!
//! 网格生成与分区不在本层范围内，[`DualMesh`] 只是满足接口的内存实现，
//! 用于测试与命令行算例。

mod dual_mesh;

pub use dual_mesh::{DualMesh, MarkerVertices};

use glam::DVec3;

/// 内部对偶面（一条网格边）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InternalFace {
    /// 左侧点
    pub left: usize,
    /// 右侧点
    pub right: usize,
    /// 面积加权法向（left → right）
    pub normal: DVec3,
}

impl InternalFace {
    /// 创建内部面
    pub fn new(left: usize, right: usize, normal: DVec3) -> Self {
        Self { left, right, normal }
    }

    /// 面积 |A|
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal.length()
    }
}

/// 边界顶点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryVertex {
    /// 网格点索引
    pub point: usize,
    /// 面积加权外法向（指向流体域外）
    pub normal: DVec3,
    /// 沿壁面法向最近的内部点（用于 y+）
    pub normal_neighbor: usize,
}

impl BoundaryVertex {
    /// 面积 |A|
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal.length()
    }

    /// 单位外法向，面积为零时返回零向量
    #[inline]
    pub fn unit_normal(&self) -> DVec3 {
        self.normal.normalize_or_zero()
    }
}

/// 对偶网格几何提供者
///
/// 分区并行时，索引 `0..n_points_domain()` 为本分区拥有的点，
/// 其余为 halo 点。
pub trait DualGeometry: Sync {
    /// 空间维数
    fn n_dim(&self) -> usize;

    /// 点总数（含 halo）
    fn n_points(&self) -> usize;

    /// 本分区拥有的点数
    fn n_points_domain(&self) -> usize;

    /// 点是否为本分区拥有
    #[inline]
    fn is_owned(&self, point: usize) -> bool {
        point < self.n_points_domain()
    }

    /// 点坐标
    fn coord(&self, point: usize) -> DVec3;

    /// 控制体体积
    fn volume(&self, point: usize) -> f64;

    /// 内部面列表
    fn faces(&self) -> &[InternalFace];

    /// 边界标记数
    fn n_markers(&self) -> usize;

    /// 标记名称
    fn marker_name(&self, marker: usize) -> &str;

    /// 标记上的边界顶点
    fn marker_vertices(&self, marker: usize) -> &[BoundaryVertex];

    /// 按名称查找标记
    fn marker_index(&self, name: &str) -> Option<usize> {
        (0..self.n_markers()).find(|&m| self.marker_name(m) == name)
    }
}
