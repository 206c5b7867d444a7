// crates/vf_physics/src/numerics/residual.rs

//! 残差场与累加器
//!
//! - [`ResidualField`] - 行主序 `n_points × n_var` 残差，串行累加
//! - [`AtomicResidualAccumulator`] - 原子操作累加器，供并行面循环使用
//!
//! 约定：面通量 F 以 `left` 的流出方向为正，`residual[left] += F`，
//! `residual[right] -= F`。

use std::sync::atomic::{AtomicU64, Ordering};

use crate::state::MAX_VARS;

/// 单点残差块
pub type ResidualBlock = [f64; MAX_VARS];

/// 残差场
#[derive(Debug, Clone)]
pub struct ResidualField {
    n_var: usize,
    values: Vec<f64>,
}

impl ResidualField {
    /// 全零残差
    pub fn new(n_points: usize, n_var: usize) -> Self {
        debug_assert!(n_var <= MAX_VARS);
        Self {
            n_var,
            values: vec![0.0; n_points * n_var],
        }
    }

    /// 每点变量数
    #[inline]
    pub fn n_var(&self) -> usize {
        self.n_var
    }

    /// 点数
    #[inline]
    pub fn n_points(&self) -> usize {
        self.values.len() / self.n_var
    }

    /// 清零
    pub fn clear(&mut self) {
        self.values.fill(0.0);
    }

    /// 单个分量
    #[inline]
    pub fn get(&self, point: usize, var: usize) -> f64 {
        self.values[point * self.n_var + var]
    }

    /// 设置单个分量
    #[inline]
    pub fn set(&mut self, point: usize, var: usize, value: f64) {
        self.values[point * self.n_var + var] = value;
    }

    /// 累加单个分量
    #[inline]
    pub fn add(&mut self, point: usize, var: usize, value: f64) {
        self.values[point * self.n_var + var] += value;
    }

    /// 单点残差块
    #[inline]
    pub fn block(&self, point: usize) -> &[f64] {
        let start = point * self.n_var;
        &self.values[start..start + self.n_var]
    }

    /// 单点残差块（可变）
    #[inline]
    pub fn block_mut(&mut self, point: usize) -> &mut [f64] {
        let start = point * self.n_var;
        &mut self.values[start..start + self.n_var]
    }

    /// 累加一个块
    #[inline]
    pub fn add_block(&mut self, point: usize, block: &ResidualBlock) {
        let n_var = self.n_var;
        for (r, b) in self.block_mut(point).iter_mut().zip(&block[..n_var]) {
            *r += b;
        }
    }

    /// 减去一个块
    #[inline]
    pub fn subtract_block(&mut self, point: usize, block: &ResidualBlock) {
        let n_var = self.n_var;
        for (r, b) in self.block_mut(point).iter_mut().zip(&block[..n_var]) {
            *r -= b;
        }
    }

    /// 累加面通量（串行）
    #[inline]
    pub fn accumulate_face(&mut self, left: usize, right: usize, flux: &ResidualBlock) {
        self.add_block(left, flux);
        self.subtract_block(right, flux);
    }

    /// 原始数据
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// 原子操作残差累加器
///
/// 两个面同时更新同一控制体时通过 compare-exchange 合并。
pub struct AtomicResidualAccumulator {
    n_var: usize,
    values: Vec<AtomicU64>,
}

impl AtomicResidualAccumulator {
    /// 创建累加器
    pub fn new(n_points: usize, n_var: usize) -> Self {
        Self {
            n_var,
            values: (0..n_points * n_var).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// 点数
    pub fn n_points(&self) -> usize {
        self.values.len() / self.n_var
    }

    /// 重置所有累加值为零
    pub fn reset(&self) {
        for v in &self.values {
            v.store(0, Ordering::Relaxed);
        }
    }

    /// 使用 compare-exchange 循环实现浮点数的原子加法
    #[inline]
    fn atomic_add(atomic: &AtomicU64, val: f64) {
        let mut old = atomic.load(Ordering::Relaxed);
        loop {
            let new_f = f64::from_bits(old) + val;
            match atomic.compare_exchange_weak(
                old,
                new_f.to_bits(),
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(x) => old = x,
            }
        }
    }

    /// 累加面通量（线程安全）
    #[inline]
    pub fn accumulate_face(&self, left: usize, right: usize, flux: &ResidualBlock) {
        for (k, &f) in flux[..self.n_var].iter().enumerate() {
            Self::atomic_add(&self.values[left * self.n_var + k], f);
            Self::atomic_add(&self.values[right * self.n_var + k], -f);
        }
    }

    /// 将累加结果加入残差场
    pub fn add_into(&self, residual: &mut ResidualField) {
        debug_assert_eq!(residual.values.len(), self.values.len());
        for (r, a) in residual.values.iter_mut().zip(&self.values) {
            *r += f64::from_bits(a.load(Ordering::Relaxed));
        }
    }
}
