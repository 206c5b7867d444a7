// crates/vf_physics/src/boundary/mod.rs

//! 边界条件
//!
//! 只处理壁面（无滑移 + 热边界）。远场、进出口、对称面等由对流格式的
//! 边界处理负责，不在本模块。

pub mod types;
pub mod wall;

pub use types::{BoundaryError, WallKind, WallMarker};
pub use wall::{SharedVertex, WallEnforcer, WallReport};
