// crates/vf_config/src/flow_config.rs

//! FlowConfig - 粘性不可压缩求解器配置（全 f64）
//!
//! 物理层只读取已验证的 `FlowConfig`，不做任何解析。来流常量在构造
//! 求解器时拷贝进实例，之后不再修改。

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::ConfigError;
use crate::fluid::{FluidConfig, FluidModel, ViscosityModel};
use crate::markers::{MarkerConfig, MarkerKind, MonitoringSurface};

/// 求解器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    /// 空间维数（2 或 3）
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// 来流状态
    #[serde(default)]
    pub freestream: FreestreamConfig,

    /// 力矩/系数参考量
    #[serde(default)]
    pub reference: ReferenceConfig,

    /// 流体物性
    #[serde(default)]
    pub fluid: FluidConfig,

    /// 边界标记，顺序即处理顺序
    #[serde(default)]
    pub markers: Vec<MarkerConfig>,

    /// 监控面
    #[serde(default)]
    pub monitoring_surfaces: Vec<MonitoringSurface>,

    /// 时间推进
    #[serde(default)]
    pub time: TimeConfig,

    /// 数值格式
    #[serde(default)]
    pub numerics: NumericsConfig,
}

fn default_dimension() -> usize { 2 }

/// 来流状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreestreamConfig {
    /// 来流密度 [kg/m³]
    #[serde(default = "default_density")]
    pub density: f64,

    /// 来流速度大小 [m/s]
    #[serde(default = "default_velocity")]
    pub velocity: f64,

    /// 来流分子粘度 [Pa·s]
    #[serde(default = "default_viscosity_inf")]
    pub viscosity_inf: f64,

    /// 来流湍动能 [m²/s²]
    #[serde(default)]
    pub tke_inf: f64,

    /// 来流温度 [K]
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// 来流压力（表压）[Pa]
    #[serde(default)]
    pub pressure: f64,

    /// 攻角 [deg]
    #[serde(default)]
    pub angle_of_attack: f64,

    /// 侧滑角 [deg]
    #[serde(default)]
    pub sideslip: f64,
}

fn default_density() -> f64 { 1.2 }
fn default_velocity() -> f64 { 1.0 }
fn default_viscosity_inf() -> f64 { 1.8e-5 }
fn default_temperature() -> f64 { 288.15 }

impl Default for FreestreamConfig {
    fn default() -> Self {
        Self {
            density: default_density(),
            velocity: default_velocity(),
            viscosity_inf: default_viscosity_inf(),
            tke_inf: 0.0,
            temperature: default_temperature(),
            pressure: 0.0,
            angle_of_attack: 0.0,
            sideslip: 0.0,
        }
    }
}

impl FreestreamConfig {
    /// 动压 q∞ = ½ρU²
    #[inline]
    pub fn dynamic_pressure(&self) -> f64 {
        0.5 * self.density * self.velocity * self.velocity
    }

    /// 来流速度矢量
    ///
    /// 2D: (U cosα, U sinα, 0)；3D: (U cosα cosβ, U sinβ, U sinα cosβ)
    pub fn velocity_vector(&self, dimension: usize) -> [f64; 3] {
        let alpha = self.angle_of_attack.to_radians();
        let beta = self.sideslip.to_radians();
        let u = self.velocity;
        if dimension == 2 {
            [u * alpha.cos(), u * alpha.sin(), 0.0]
        } else {
            [
                u * alpha.cos() * beta.cos(),
                u * beta.sin(),
                u * alpha.sin() * beta.cos(),
            ]
        }
    }
}

/// 系数参考量
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    /// 参考面积 [m²]（2D 为单位展长上的弦长）
    #[serde(default = "default_ref_area")]
    pub area: f64,

    /// 力矩参考长度 [m]
    #[serde(default = "default_ref_length")]
    pub length: f64,

    /// 力矩参考点
    #[serde(default)]
    pub origin: [f64; 3],

    /// 压力积分参考压力 [Pa]，缺省取来流压力
    #[serde(default)]
    pub pressure: Option<f64>,
}

fn default_ref_area() -> f64 { 1.0 }
fn default_ref_length() -> f64 { 1.0 }

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            area: default_ref_area(),
            length: default_ref_length(),
            origin: [0.0; 3],
            pressure: None,
        }
    }
}

/// 时间推进配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// 是否隐式推进（组装 Jacobian）
    #[serde(default)]
    pub implicit: bool,

    /// CFL 数
    #[serde(default = "default_cfl")]
    pub cfl: f64,

    /// 最大允许伪时间步
    #[serde(default = "default_max_delta_time")]
    pub max_delta_time: f64,

    /// 当地时间步（false 时取全局最小）
    #[serde(default = "default_true")]
    pub local_time_stepping: bool,

    /// 粘性稳定性系数 K_v
    #[serde(default = "default_viscous_coefficient")]
    pub viscous_coefficient: f64,
}

fn default_cfl() -> f64 { 1.0 }
fn default_max_delta_time() -> f64 { 1e6 }
fn default_true() -> bool { true }
fn default_viscous_coefficient() -> f64 { 0.25 }

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            implicit: false,
            cfl: default_cfl(),
            max_delta_time: default_max_delta_time(),
            local_time_stepping: true,
            viscous_coefficient: default_viscous_coefficient(),
        }
    }
}

/// 面梯度平均格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FaceAveragingKind {
    /// 两侧梯度算术平均
    Arithmetic,
    /// 算术平均 + 沿边方向导数修正
    #[default]
    EdgeCorrected,
}

/// 数值配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericsConfig {
    /// 面梯度平均格式
    #[serde(default)]
    pub face_averaging: FaceAveragingKind,

    /// 是否并行累加残差
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for NumericsConfig {
    fn default() -> Self {
        Self {
            face_averaging: FaceAveragingKind::default(),
            parallel: true,
        }
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            freestream: FreestreamConfig::default(),
            reference: ReferenceConfig::default(),
            fluid: FluidConfig::default(),
            markers: Vec::new(),
            monitoring_surfaces: Vec::new(),
            time: TimeConfig::default(),
            numerics: NumericsConfig::default(),
        }
    }
}

fn require_positive(key: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::invalid(key, value, "必须为有限正数"));
    }
    Ok(())
}

impl FlowConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;

        let config: FlowConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dimension != 2 && self.dimension != 3 {
            return Err(ConfigError::invalid("dimension", self.dimension, "只支持 2 或 3"));
        }

        // 来流
        require_positive("freestream.density", self.freestream.density)?;
        require_positive("freestream.viscosity_inf", self.freestream.viscosity_inf)?;
        require_positive("freestream.temperature", self.freestream.temperature)?;
        if self.freestream.velocity < 0.0 || !self.freestream.velocity.is_finite() {
            return Err(ConfigError::invalid(
                "freestream.velocity",
                self.freestream.velocity,
                "不能为负",
            ));
        }
        if self.freestream.tke_inf < 0.0 {
            return Err(ConfigError::invalid("freestream.tke_inf", self.freestream.tke_inf, "不能为负"));
        }

        // 参考量
        require_positive("reference.area", self.reference.area)?;
        require_positive("reference.length", self.reference.length)?;

        // 物性
        require_positive("fluid.specific_heat", self.fluid.specific_heat)?;
        require_positive("fluid.prandtl_lam", self.fluid.prandtl_lam)?;
        require_positive("fluid.prandtl_turb", self.fluid.prandtl_turb)?;
        if let FluidModel::IncompressibleIdealGas { gas_constant, operating_pressure } =
            self.fluid.density_model
        {
            require_positive("fluid.density_model.gas_constant", gas_constant)?;
            require_positive("fluid.density_model.operating_pressure", operating_pressure)?;
        }
        if let ViscosityModel::Sutherland { mu_ref, t_ref, s } = self.fluid.viscosity_model {
            require_positive("fluid.viscosity_model.mu_ref", mu_ref)?;
            require_positive("fluid.viscosity_model.t_ref", t_ref)?;
            require_positive("fluid.viscosity_model.s", s)?;
        }

        // 时间推进
        require_positive("time.cfl", self.time.cfl)?;
        require_positive("time.max_delta_time", self.time.max_delta_time)?;
        require_positive("time.viscous_coefficient", self.time.viscous_coefficient)?;

        // 标记
        let mut names = HashSet::new();
        for marker in &self.markers {
            if !names.insert(marker.name.as_str()) {
                return Err(ConfigError::invalid("markers.name", &marker.name, "标记名重复"));
            }
            if let MarkerKind::IsothermalWall { temperature } = marker.kind {
                require_positive(&format!("markers.{}.temperature", marker.name), temperature)?;
            }
            if let MarkerKind::HeatFluxWall { heat_flux } = marker.kind {
                if !heat_flux.is_finite() {
                    return Err(ConfigError::invalid(
                        format!("markers.{}.heat_flux", marker.name),
                        heat_flux,
                        "必须为有限值",
                    ));
                }
            }
            if let Some(v) = marker.wall_velocity {
                if !marker.kind.is_wall() {
                    return Err(ConfigError::invalid(
                        format!("markers.{}.wall_velocity", marker.name),
                        marker.kind,
                        "只有壁面可以设置运动速度",
                    ));
                }
                if v.iter().any(|c| !c.is_finite()) {
                    return Err(ConfigError::invalid(
                        format!("markers.{}.wall_velocity", marker.name),
                        format!("{:?}", v),
                        "必须为有限值",
                    ));
                }
            }
        }

        // 监控面引用的标记必须存在
        for surface in &self.monitoring_surfaces {
            for name in &surface.markers {
                if !names.contains(name.as_str()) {
                    return Err(ConfigError::Missing(format!(
                        "监控面 '{}' 引用了未定义的标记 '{}'",
                        surface.name, name
                    )));
                }
            }
        }

        Ok(())
    }

    /// 按名称查找标记配置
    pub fn marker(&self, name: &str) -> Option<&MarkerConfig> {
        self.markers.iter().find(|m| m.name == name)
    }

    /// 压力积分参考压力
    #[inline]
    pub fn reference_pressure(&self) -> f64 {
        self.reference.pressure.unwrap_or(self.freestream.pressure)
    }

    /// 变量数 n_dim + 2（压力、速度分量、温度）
    #[inline]
    pub fn n_var(&self) -> usize {
        self.dimension + 2
    }
}
