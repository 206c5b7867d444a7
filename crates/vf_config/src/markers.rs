// crates/vf_config/src/markers.rs

//! 边界标记配置
//!
//! 每个标记对应网格中一组具名边界顶点，配置给出其物理类型以及
//! 监控/载荷标志。壁面热边界的数值（热通量或温度）直接携带在
//! [`MarkerKind`] 变体中。

use serde::{Deserialize, Serialize};

/// 边界标记类型
///
/// 只有 `SendReceive` 与 `Periodic` 是非物理标记（分区交界与周期配对），
/// 其余均参与力系数汇总。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarkerKind {
    /// 热通量壁面（绝热壁为 heat_flux = 0）
    HeatFluxWall {
        /// 壁面热通量 [W/m²]，正值表示热量进入流体
        #[serde(default)]
        heat_flux: f64,
    },
    /// 等温壁面
    IsothermalWall {
        /// 壁面温度 [K]
        temperature: f64,
    },
    /// 远场
    Farfield,
    /// 入口
    Inlet,
    /// 出口
    Outlet,
    /// 对称面
    Symmetry,
    /// 分区交界（halo 通信）
    SendReceive,
    /// 周期边界
    Periodic,
}

impl MarkerKind {
    /// 是否为粘性壁面
    #[inline]
    pub fn is_wall(&self) -> bool {
        matches!(self, Self::HeatFluxWall { .. } | Self::IsothermalWall { .. })
    }

    /// 是否为物理边界（参与系数汇总）
    #[inline]
    pub fn is_physical(&self) -> bool {
        !matches!(self, Self::SendReceive | Self::Periodic)
    }

    /// 类型名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::HeatFluxWall { .. } => "heat_flux_wall",
            Self::IsothermalWall { .. } => "isothermal_wall",
            Self::Farfield => "farfield",
            Self::Inlet => "inlet",
            Self::Outlet => "outlet",
            Self::Symmetry => "symmetry",
            Self::SendReceive => "send_receive",
            Self::Periodic => "periodic",
        }
    }
}

impl std::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 单个边界标记的配置
///
/// 反序列化时 `monitoring` 缺省与 [`MarkerConfig::new`] 一致：壁面监控，其余不监控。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MarkerConfigDef")]
pub struct MarkerConfig {
    /// 标记名称，与网格中的标记名一致
    pub name: String,

    /// 物理类型
    pub kind: MarkerKind,

    /// 是否参与监控面输出
    pub monitoring: bool,

    /// 是否输出顶点载荷（流固耦合界面）
    pub fluid_load: bool,

    /// 壁面运动速度 [m/s]，缺省为静止壁面
    pub wall_velocity: Option<[f64; 3]>,
}

/// 配置文件中的标记，可选字段尚未补全
#[derive(Deserialize)]
struct MarkerConfigDef {
    name: String,
    kind: MarkerKind,
    #[serde(default)]
    monitoring: Option<bool>,
    #[serde(default)]
    fluid_load: bool,
    #[serde(default)]
    wall_velocity: Option<[f64; 3]>,
}

impl From<MarkerConfigDef> for MarkerConfig {
    fn from(def: MarkerConfigDef) -> Self {
        Self {
            monitoring: def.monitoring.unwrap_or_else(|| def.kind.is_wall()),
            fluid_load: def.fluid_load,
            wall_velocity: def.wall_velocity,
            name: def.name,
            kind: def.kind,
        }
    }
}

impl MarkerConfig {
    /// 创建热通量壁面
    pub fn heat_flux_wall(name: impl Into<String>, heat_flux: f64) -> Self {
        Self::new(name, MarkerKind::HeatFluxWall { heat_flux })
    }

    /// 创建绝热壁面
    pub fn adiabatic_wall(name: impl Into<String>) -> Self {
        Self::heat_flux_wall(name, 0.0)
    }

    /// 创建等温壁面
    pub fn isothermal_wall(name: impl Into<String>, temperature: f64) -> Self {
        Self::new(name, MarkerKind::IsothermalWall { temperature })
    }

    /// 通用构造
    pub fn new(name: impl Into<String>, kind: MarkerKind) -> Self {
        Self {
            name: name.into(),
            kind,
            monitoring: kind.is_wall(),
            fluid_load: false,
            wall_velocity: None,
        }
    }

    /// 设置监控标志
    pub fn with_monitoring(mut self, monitoring: bool) -> Self {
        self.monitoring = monitoring;
        self
    }

    /// 设置顶点载荷标志
    pub fn with_fluid_load(mut self, fluid_load: bool) -> Self {
        self.fluid_load = fluid_load;
        self
    }

    /// 设置壁面速度
    pub fn with_wall_velocity(mut self, velocity: [f64; 3]) -> Self {
        self.wall_velocity = Some(velocity);
        self
    }
}

/// 监控面：一组标记的具名集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringSurface {
    /// 监控面名称
    pub name: String,
    /// 包含的标记名称
    pub markers: Vec<String>,
}

impl MonitoringSurface {
    /// 创建监控面
    pub fn new(name: impl Into<String>, markers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    /// 是否包含指定标记
    pub fn contains(&self, marker: &str) -> bool {
        self.markers.iter().any(|m| m == marker)
    }
}
