// crates/vf_physics/src/forces/coefficients.rs

//! 气动系数表
//!
//! 所有系数由封闭枚举 [`CoefficientKind`] 索引，按标记、全局（AllBound）
//! 与监控面（Surface）三级存储。每种系数有固定的汇总规则：
//!
//! | 规则 | 系数 | 汇总 |
//! |------|------|------|
//! | 求和 | CD … CMz, CoPx … CoPz, CT, CQ, HF | Σ |
//! | 极值 | MaxHF | max |
//! | 导出 | CEff, CMerit | 由汇总后的求和量重新计算 |
//!
//! 全局与监控面汇总按标记顺序串行完成，每次汇总前清零。

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use vf_foundation::EPS;

// ============================================================
// 系数种类
// ============================================================

/// 系数种类
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoefficientKind {
    CD,
    CL,
    CSF,
    CEff,
    CFx,
    CFy,
    CFz,
    CMx,
    CMy,
    CMz,
    CoPx,
    CoPy,
    CoPz,
    CT,
    CQ,
    CMerit,
    HF,
    MaxHF,
}

/// 汇总规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationRule {
    /// 求和
    Sum,
    /// 最大值
    Max,
    /// 由其他系数导出
    Derived,
}

impl CoefficientKind {
    /// 种类数
    pub const COUNT: usize = 18;

    /// 全部种类（与存储顺序一致）
    pub const ALL: [Self; Self::COUNT] = [
        Self::CD,
        Self::CL,
        Self::CSF,
        Self::CEff,
        Self::CFx,
        Self::CFy,
        Self::CFz,
        Self::CMx,
        Self::CMy,
        Self::CMz,
        Self::CoPx,
        Self::CoPy,
        Self::CoPz,
        Self::CT,
        Self::CQ,
        Self::CMerit,
        Self::HF,
        Self::MaxHF,
    ];

    /// 存储下标
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// 汇总规则
    pub fn rule(self) -> AggregationRule {
        match self {
            Self::CEff | Self::CMerit => AggregationRule::Derived,
            Self::MaxHF => AggregationRule::Max,
            _ => AggregationRule::Sum,
        }
    }

    /// 输出名称
    pub fn name(self) -> &'static str {
        match self {
            Self::CD => "CD",
            Self::CL => "CL",
            Self::CSF => "CSF",
            Self::CEff => "CEff",
            Self::CFx => "CFx",
            Self::CFy => "CFy",
            Self::CFz => "CFz",
            Self::CMx => "CMx",
            Self::CMy => "CMy",
            Self::CMz => "CMz",
            Self::CoPx => "CoPx",
            Self::CoPy => "CoPy",
            Self::CoPz => "CoPz",
            Self::CT => "CT",
            Self::CQ => "CQ",
            Self::CMerit => "CMerit",
            Self::HF => "HF",
            Self::MaxHF => "MaxHF",
        }
    }
}

impl std::fmt::Display for CoefficientKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 升阻比 CL/CD，|CD| 低于 `min_drag` 时为 0
#[inline]
pub fn efficiency(cl: f64, cd: f64, min_drag: f64) -> f64 {
    if cd.abs() < min_drag {
        0.0
    } else {
        cl / cd
    }
}

/// 旋翼品质因数 CT·sqrt|CT| / (√2·CQ)，|CQ| 低于 `min_torque` 时为 0
#[inline]
pub fn figure_of_merit(ct: f64, cq: f64, min_torque: f64) -> f64 {
    if cq.abs() < min_torque {
        0.0
    } else {
        ct * ct.abs().sqrt() / (std::f64::consts::SQRT_2 * cq)
    }
}

// ============================================================
// 单组系数值
// ============================================================

/// 一组系数值（每种系数一个）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoefficientValues([f64; CoefficientKind::COUNT]);

impl Default for CoefficientValues {
    fn default() -> Self {
        Self([0.0; CoefficientKind::COUNT])
    }
}

impl CoefficientValues {
    /// 全零
    pub fn zeros() -> Self {
        Self::default()
    }

    /// 读取
    #[inline]
    pub fn get(&self, kind: CoefficientKind) -> f64 {
        self.0[kind.index()]
    }

    /// 写入
    #[inline]
    pub fn set(&mut self, kind: CoefficientKind, value: f64) {
        self.0[kind.index()] = value;
    }

    /// 按种类迭代
    pub fn iter(&self) -> impl Iterator<Item = (CoefficientKind, f64)> + '_ {
        CoefficientKind::ALL.iter().map(move |&k| (k, self.get(k)))
    }

    /// 由 CD/CL/CT/CQ 重新计算导出系数，分母低于 `threshold` 时记为 0
    pub fn update_derived(&mut self, threshold: f64) {
        use CoefficientKind::*;
        self.set(CEff, efficiency(self.get(CL), self.get(CD), threshold));
        self.set(CMerit, figure_of_merit(self.get(CT), self.get(CQ), threshold));
    }

    /// 按汇总规则并入另一组值（导出量不处理）
    pub fn absorb(&mut self, other: &Self) {
        for kind in CoefficientKind::ALL {
            let i = kind.index();
            match kind.rule() {
                AggregationRule::Sum => self.0[i] += other.0[i],
                AggregationRule::Max => self.0[i] = self.0[i].max(other.0[i]),
                AggregationRule::Derived => {}
            }
        }
    }

    /// 逐项相加后重算导出量（无粘 + 粘性合计）
    pub fn combined(&self, other: &Self, threshold: f64) -> Self {
        let mut out = *self;
        for kind in CoefficientKind::ALL {
            if kind.rule() != AggregationRule::Derived {
                out.0[kind.index()] += other.0[kind.index()];
            }
        }
        out.update_derived(threshold);
        out
    }

    /// 是否全部有限
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl Index<CoefficientKind> for CoefficientValues {
    type Output = f64;

    fn index(&self, kind: CoefficientKind) -> &f64 {
        &self.0[kind.index()]
    }
}

impl IndexMut<CoefficientKind> for CoefficientValues {
    fn index_mut(&mut self, kind: CoefficientKind) -> &mut f64 {
        &mut self.0[kind.index()]
    }
}

// ============================================================
// 系数表
// ============================================================

/// 监控面
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGroup {
    /// 名称
    pub name: String,
    /// 包含的网格标记索引
    pub markers: Vec<usize>,
}

/// 系数表：按标记、全局与监控面存储
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientTable {
    markers: Vec<CoefficientValues>,
    physical: Vec<bool>,
    surfaces: Vec<SurfaceGroup>,
    all_bound: CoefficientValues,
    surface_values: Vec<CoefficientValues>,
    threshold: f64,
}

impl CoefficientTable {
    /// 创建系数表
    ///
    /// `physical[m]` 为 false 的标记（分区交界、周期）不参与全局汇总。
    /// 导出系数的零值判据默认为 [`EPS`]。
    pub fn new(physical: Vec<bool>, surfaces: Vec<SurfaceGroup>) -> Self {
        let n_surfaces = surfaces.len();
        Self {
            markers: vec![CoefficientValues::zeros(); physical.len()],
            physical,
            surfaces,
            all_bound: CoefficientValues::zeros(),
            surface_values: vec![CoefficientValues::zeros(); n_surfaces],
            threshold: EPS,
        }
    }

    /// 指定 CD/CQ 零值判据（通常取 `Tolerance::min_drag`）
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// CD/CQ 零值判据
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// 标记数
    pub fn n_markers(&self) -> usize {
        self.markers.len()
    }

    /// 监控面列表
    pub fn surfaces(&self) -> &[SurfaceGroup] {
        &self.surfaces
    }

    /// 按名称查找监控面
    pub fn surface_index(&self, name: &str) -> Option<usize> {
        self.surfaces.iter().position(|s| s.name == name)
    }

    /// 清零所有值
    pub fn reset(&mut self) {
        self.markers.fill(CoefficientValues::zeros());
        self.all_bound = CoefficientValues::zeros();
        self.surface_values.fill(CoefficientValues::zeros());
    }

    /// 单个标记的系数
    #[inline]
    pub fn marker(&self, kind: CoefficientKind, marker: usize) -> f64 {
        self.markers[marker].get(kind)
    }

    /// 单个标记的全部系数
    #[inline]
    pub fn marker_values(&self, marker: usize) -> &CoefficientValues {
        &self.markers[marker]
    }

    /// 写入单个标记的全部系数
    pub fn set_marker_values(&mut self, marker: usize, values: CoefficientValues) {
        self.markers[marker] = values;
    }

    /// 全局系数
    #[inline]
    pub fn all_bound(&self, kind: CoefficientKind) -> f64 {
        self.all_bound.get(kind)
    }

    /// 全局全部系数
    #[inline]
    pub fn all_bound_values(&self) -> &CoefficientValues {
        &self.all_bound
    }

    /// 监控面系数
    #[inline]
    pub fn surface(&self, kind: CoefficientKind, surface: usize) -> f64 {
        self.surface_values[surface].get(kind)
    }

    /// 监控面全部系数
    #[inline]
    pub fn surface_values(&self, surface: usize) -> &CoefficientValues {
        &self.surface_values[surface]
    }

    /// 由标记值重新汇总全局与监控面
    ///
    /// 每个标记的导出系数也按本表的判据重算。
    pub fn aggregate(&mut self) {
        let threshold = self.threshold;
        for values in &mut self.markers {
            values.update_derived(threshold);
        }

        let mut all = CoefficientValues::zeros();
        for (values, _) in self.markers.iter().zip(&self.physical).filter(|(_, &p)| p) {
            all.absorb(values);
        }
        all.update_derived(threshold);
        self.all_bound = all;

        for (group, out) in self.surfaces.iter().zip(self.surface_values.iter_mut()) {
            let mut acc = CoefficientValues::zeros();
            for &m in &group.markers {
                acc.absorb(&self.markers[m]);
            }
            acc.update_derived(threshold);
            *out = acc;
        }
    }

    /// 两张表逐项合计（标记、全局、监控面）
    ///
    /// 两表须由同一网格与配置创建。
    pub fn combined(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (a, b) in out.markers.iter_mut().zip(&other.markers) {
            *a = a.combined(b, out.threshold);
        }
        out.aggregate();
        out
    }
}
