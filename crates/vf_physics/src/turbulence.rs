// crates/vf_physics/src/turbulence.rs

//! 湍流模型耦合
//!
//! 湍流闭合本身在外部求解，本模块只保存其输出（涡粘度、湍动能）
//! 以及与湍流模型交换的两个极值：最大应变率模与最大涡量模。
//!
//! # 极值重置
//!
//! 极值只在显式调用 [`TurbulenceCoupling::reset`] 时清零；
//! `postprocessing` 与力系数积分只会抬高运行最大值。

/// 外部湍流模型输出
#[derive(Debug, Clone, Default)]
pub struct EddyViscosityField {
    /// 涡粘度 μ_t [Pa·s]
    pub mu_turb: Vec<f64>,
    /// 湍动能 k [m²/s²]
    pub tke: Vec<f64>,
}

impl EddyViscosityField {
    /// 层流场：μ_t = 0，k 取来流值
    pub fn laminar(n_points: usize, tke_inf: f64) -> Self {
        Self {
            mu_turb: vec![0.0; n_points],
            tke: vec![tke_inf; n_points],
        }
    }

    /// 常涡粘度场
    pub fn constant(n_points: usize, mu_turb: f64, tke: f64) -> Self {
        Self {
            mu_turb: vec![mu_turb; n_points],
            tke: vec![tke; n_points],
        }
    }

    /// 点数
    #[inline]
    pub fn len(&self) -> usize {
        self.mu_turb.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mu_turb.is_empty()
    }
}

/// 湍流耦合极值
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TurbulenceCoupling {
    strain_mag_max: f64,
    omega_max: f64,
}

impl TurbulenceCoupling {
    /// 创建（极值为 0）
    pub fn new() -> Self {
        Self::default()
    }

    /// 最大应变率模
    #[inline]
    pub fn strain_mag_max(&self) -> f64 {
        self.strain_mag_max
    }

    /// 设置最大应变率模
    #[inline]
    pub fn set_strain_mag_max(&mut self, value: f64) {
        self.strain_mag_max = value;
    }

    /// 最大涡量模
    #[inline]
    pub fn omega_max(&self) -> f64 {
        self.omega_max
    }

    /// 设置最大涡量模
    #[inline]
    pub fn set_omega_max(&mut self, value: f64) {
        self.omega_max = value;
    }

    /// 用一次扫描的结果抬高运行最大值
    pub fn observe(&mut self, strain_mag: f64, omega: f64) {
        if strain_mag > self.strain_mag_max {
            self.strain_mag_max = strain_mag;
        }
        if omega > self.omega_max {
            self.omega_max = omega;
        }
    }

    /// 清零两个极值
    pub fn reset(&mut self) {
        self.strain_mag_max = 0.0;
        self.omega_max = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_store_latest_value() {
        let mut t = TurbulenceCoupling::new();
        t.set_strain_mag_max(5.0);
        t.set_strain_mag_max(2.0);
        t.set_omega_max(3.0);
        assert_eq!(t.strain_mag_max(), 2.0);
        assert_eq!(t.omega_max(), 3.0);
    }

    #[test]
    fn test_observe_keeps_running_max() {
        let mut t = TurbulenceCoupling::new();
        t.observe(1.0, 4.0);
        t.observe(3.0, 2.0);
        assert_eq!(t.strain_mag_max(), 3.0);
        assert_eq!(t.omega_max(), 4.0);
    }

    #[test]
    fn test_reset_is_explicit() {
        let mut t = TurbulenceCoupling::new();
        t.observe(1.0, 1.0);
        t.observe(0.5, 0.5);
        assert_eq!(t.strain_mag_max(), 1.0);
        t.reset();
        assert_eq!(t.strain_mag_max(), 0.0);
        assert_eq!(t.omega_max(), 0.0);
    }

    #[test]
    fn test_laminar_field_seeds_tke() {
        let f = EddyViscosityField::laminar(3, 0.01);
        assert_eq!(f.len(), 3);
        assert!(f.mu_turb.iter().all(|&m| m == 0.0));
        assert!(f.tke.iter().all(|&k| k == 0.01));
    }
}
