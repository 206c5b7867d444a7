// crates/vf_physics/src/boundary/types.rs

//! 壁面边界类型定义
//!
//! - [`WallKind`]: 壁面热边界（热通量 / 等温），穷尽匹配
//! - [`WallMarker`]: 网格标记与其壁面约束
//! - [`BoundaryError`]: 边界配置错误

use glam::DVec3;
use serde::{Deserialize, Serialize};
use vf_config::{MarkerConfig, MarkerKind};
use vf_foundation::VfError;

// ============================================================
// 壁面类型
// ============================================================

/// 壁面热边界类型
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WallKind {
    /// 热通量壁面（Neumann），绝热壁为 0
    HeatFlux {
        /// 进入流体的热通量 [W/m²]
        heat_flux: f64,
    },
    /// 等温壁面（Dirichlet）
    Isothermal {
        /// 壁面温度 [K]
        temperature: f64,
    },
}

impl WallKind {
    /// 由标记类型转换，非壁面返回 `None`
    pub fn from_marker_kind(kind: &MarkerKind) -> Option<Self> {
        match *kind {
            MarkerKind::HeatFluxWall { heat_flux } => Some(Self::HeatFlux { heat_flux }),
            MarkerKind::IsothermalWall { temperature } => Some(Self::Isothermal { temperature }),
            _ => None,
        }
    }

    /// 是否为绝热壁
    #[inline]
    pub fn is_adiabatic(&self) -> bool {
        matches!(self, Self::HeatFlux { heat_flux } if *heat_flux == 0.0)
    }
}

/// 壁面标记
#[derive(Debug, Clone, PartialEq)]
pub struct WallMarker {
    /// 网格标记索引
    pub marker: usize,
    /// 标记名称
    pub name: String,
    /// 热边界
    pub kind: WallKind,
    /// 壁面速度
    pub velocity: DVec3,
}

impl WallMarker {
    /// 由配置创建，非壁面返回 `None`
    pub fn from_config(marker: usize, config: &MarkerConfig) -> Option<Self> {
        let kind = WallKind::from_marker_kind(&config.kind)?;
        Some(Self {
            marker,
            name: config.name.clone(),
            kind,
            velocity: config.wall_velocity.map_or(DVec3::ZERO, DVec3::from_array),
        })
    }
}

// ============================================================
// 错误类型
// ============================================================

/// 边界错误
#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    /// 配置中的标记不在网格中
    #[error("标记 '{0}' 在网格中不存在")]
    MarkerNotFound(String),

    /// 标记索引越界
    #[error("标记索引 {index} 超出范围 0..{count}")]
    InvalidMarker {
        /// 索引
        index: usize,
        /// 标记总数
        count: usize,
    },

    /// 边界配置错误
    #[error("边界配置错误: {0}")]
    Configuration(String),
}

impl From<BoundaryError> for VfError {
    fn from(err: BoundaryError) -> Self {
        match err {
            BoundaryError::MarkerNotFound(name) => VfError::not_found(format!("marker '{}'", name)),
            BoundaryError::InvalidMarker { index, count } => {
                VfError::index_out_of_bounds("Marker", index, count)
            }
            BoundaryError::Configuration(msg) => VfError::config(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_kind_from_marker() {
        assert_eq!(
            WallKind::from_marker_kind(&MarkerKind::IsothermalWall { temperature: 320.0 }),
            Some(WallKind::Isothermal { temperature: 320.0 })
        );
        assert!(WallKind::from_marker_kind(&MarkerKind::Farfield).is_none());
        assert!(WallKind::HeatFlux { heat_flux: 0.0 }.is_adiabatic());
        assert!(!WallKind::HeatFlux { heat_flux: 5.0 }.is_adiabatic());
    }

    #[test]
    fn test_wall_marker_velocity() {
        let cfg = MarkerConfig::adiabatic_wall("lid").with_wall_velocity([1.0, 0.0, 0.0]);
        let wall = WallMarker::from_config(2, &cfg).unwrap();
        assert_eq!(wall.velocity, DVec3::X);
        assert_eq!(wall.marker, 2);
        assert!(WallMarker::from_config(0, &MarkerConfig::new("far", MarkerKind::Farfield)).is_none());
    }

    #[test]
    fn test_error_conversion() {
        let err: VfError = BoundaryError::MarkerNotFound("wing".into()).into();
        assert!(matches!(err, VfError::NotFound { .. }));
        assert!(err.to_string().contains("wing"));
    }
}
