// crates/vf_physics/src/state.rs

//! 求解状态
//!
//! - [`VariableLayout`]: 每点变量排列 `[p, u, v, (w), T]`
//! - [`WorkingState`]: 线性系统求解的工作变量
//! - [`PrimitiveState`]: 由工作变量导出的原始物理量
//!
//! 工作变量由外部更新（线性求解 + 更新），原始变量由
//! [`PrimitiveEvaluator`](crate::primitive::PrimitiveEvaluator) 每迭代刷新。

use glam::DVec3;
use serde::{Deserialize, Serialize};
use vf_foundation::{VfError, VfResult};

/// 每点最大变量数（3D: p, u, v, w, T）
pub const MAX_VARS: usize = 5;

/// 变量排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableLayout {
    n_dim: usize,
}

impl VariableLayout {
    /// 压力变量编号
    pub const PRESSURE: usize = 0;

    /// 按维数创建
    pub fn new(n_dim: usize) -> Self {
        debug_assert!(n_dim == 2 || n_dim == 3);
        Self { n_dim }
    }

    /// 空间维数
    #[inline]
    pub fn n_dim(&self) -> usize {
        self.n_dim
    }

    /// 每点变量数 n_dim + 2
    #[inline]
    pub fn n_var(&self) -> usize {
        self.n_dim + 2
    }

    /// 第 d 个速度分量的变量编号
    #[inline]
    pub fn velocity(&self, d: usize) -> usize {
        1 + d
    }

    /// 速度变量编号范围
    #[inline]
    pub fn velocity_range(&self) -> std::ops::Range<usize> {
        1..1 + self.n_dim
    }

    /// 温度变量编号
    #[inline]
    pub fn temperature(&self) -> usize {
        self.n_dim + 1
    }
}

/// 工作变量（求解未知量）
#[derive(Debug, Clone, Default)]
pub struct WorkingState {
    /// 压力（表压）
    pub pressure: Vec<f64>,
    /// 速度
    pub velocity: Vec<DVec3>,
    /// 温度
    pub temperature: Vec<f64>,
}

impl WorkingState {
    /// 均匀初场
    pub fn uniform(n_points: usize, pressure: f64, velocity: DVec3, temperature: f64) -> Self {
        Self {
            pressure: vec![pressure; n_points],
            velocity: vec![velocity; n_points],
            temperature: vec![temperature; n_points],
        }
    }

    /// 点数
    #[inline]
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }

    /// 检查各数组长度一致且等于 `n_points`
    pub fn check_len(&self, n_points: usize) -> VfResult<()> {
        VfError::check_size("pressure", n_points, self.pressure.len())?;
        VfError::check_size("velocity", n_points, self.velocity.len())?;
        VfError::check_size("temperature", n_points, self.temperature.len())
    }
}

/// 单点原始变量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PrimitivePoint {
    /// 压力
    pub pressure: f64,
    /// 速度
    pub velocity: DVec3,
    /// 温度
    pub temperature: f64,
    /// 密度
    pub density: f64,
    /// 分子粘度
    pub mu_lam: f64,
    /// 涡粘度
    pub mu_turb: f64,
    /// 湍动能
    pub tke: f64,
}

impl PrimitivePoint {
    /// 有效粘度 μ + μ_t
    #[inline]
    pub fn mu_eff(&self) -> f64 {
        self.mu_lam + self.mu_turb
    }
}

/// 原始变量场（每点一个 [`PrimitivePoint`]）
#[derive(Debug, Clone, Default)]
pub struct PrimitiveState {
    points: Vec<PrimitivePoint>,
}

impl PrimitiveState {
    /// 全零场
    pub fn new(n_points: usize) -> Self {
        Self {
            points: vec![PrimitivePoint::default(); n_points],
        }
    }

    /// 均匀场
    pub fn uniform(n_points: usize, point: PrimitivePoint) -> Self {
        Self {
            points: vec![point; n_points],
        }
    }

    /// 点数
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 单点
    #[inline]
    pub fn point(&self, i: usize) -> &PrimitivePoint {
        &self.points[i]
    }

    /// 单点（可变）
    #[inline]
    pub fn point_mut(&mut self, i: usize) -> &mut PrimitivePoint {
        &mut self.points[i]
    }

    /// 全部点
    #[inline]
    pub fn points(&self) -> &[PrimitivePoint] {
        &self.points
    }

    /// 全部点（可变）
    #[inline]
    pub fn points_mut(&mut self) -> &mut [PrimitivePoint] {
        &mut self.points
    }

    /// 速度
    #[inline]
    pub fn velocity(&self, i: usize) -> DVec3 {
        self.points[i].velocity
    }

    /// 压力
    #[inline]
    pub fn pressure(&self, i: usize) -> f64 {
        self.points[i].pressure
    }

    /// 温度
    #[inline]
    pub fn temperature(&self, i: usize) -> f64 {
        self.points[i].temperature
    }
}
