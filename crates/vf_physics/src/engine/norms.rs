// crates/vf_physics/src/engine/norms.rs

//! 残差范数与发散检测

use glam::DVec3;
use serde::{Deserialize, Serialize};
use vf_foundation::{Tolerance, VfError, VfResult, EPS};

use crate::comm::Communicator;
use crate::mesh::DualGeometry;
use crate::numerics::ResidualField;

/// 每个变量的残差范数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualNorms {
    /// RMS 范数（下限 EPS²）
    pub rms: Vec<f64>,
    /// 全局最大绝对残差
    pub max: Vec<f64>,
    /// 最大残差所在点（仅当最大值位于本分区）
    pub max_point: Vec<Option<usize>>,
    /// 最大残差所在点坐标（仅当最大值位于本分区）
    pub max_coord: Vec<Option<DVec3>>,
}

impl ResidualNorms {
    /// 统计本分区拥有点上的残差并跨分区归约
    ///
    /// RMS 出现 NaN 或超过 `divergence_limit` 时返回 [`VfError::Diverged`]。
    pub fn compute(
        geometry: &dyn DualGeometry,
        residual: &ResidualField,
        comm: &dyn Communicator,
        tolerance: &Tolerance,
    ) -> VfResult<Self> {
        VfError::check_size("residual", geometry.n_points(), residual.n_points())?;
        let n_var = residual.n_var();

        let mut sum_sq = vec![0.0; n_var + 1];
        let mut local_max = vec![0.0f64; n_var];
        let mut local_point = vec![None; n_var];

        for p in (0..geometry.n_points()).filter(|&p| geometry.is_owned(p)) {
            for (k, &r) in residual.block(p).iter().enumerate() {
                sum_sq[k] += r * r;
                if r.abs() > local_max[k] || r.is_nan() {
                    local_max[k] = r.abs();
                    local_point[k] = Some(p);
                }
            }
        }
        sum_sq[n_var] = geometry.n_points_domain() as f64;
        comm.all_reduce_sum(&mut sum_sq);

        let mut max = local_max.clone();
        comm.all_reduce_max(&mut max);

        let n_global = sum_sq[n_var].max(1.0);
        let mut rms = Vec::with_capacity(n_var);
        for (k, &s) in sum_sq[..n_var].iter().enumerate() {
            let value = (s / n_global).sqrt();
            if value.is_nan() || value > tolerance.divergence_limit {
                return Err(VfError::diverged(k, value));
            }
            rms.push(value.max(EPS * EPS));
        }

        let max_point: Vec<Option<usize>> = local_point
            .iter()
            .zip(local_max.iter().zip(&max))
            .map(|(&pt, (&lm, &gm))| pt.filter(|_| lm == gm))
            .collect();
        let max_coord = max_point.iter().map(|p| p.map(|p| geometry.coord(p))).collect();

        log::trace!("残差 RMS: {:?}", rms);
        Ok(Self {
            rms,
            max,
            max_point,
            max_coord,
        })
    }

    /// log10(RMS)
    pub fn log_rms(&self) -> Vec<f64> {
        self.rms.iter().map(|r| r.log10()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::SerialCommunicator;
    use crate::mesh::DualMesh;

    fn mesh() -> DualMesh {
        DualMesh::rectilinear(&[0.0, 1.0], &[0.0, 1.0], ["s", "e", "n", "w"]).unwrap()
    }

    #[test]
    fn test_rms_and_max() {
        let mesh = mesh();
        let mut res = ResidualField::new(4, 4);
        res.set(2, 1, 2.0);
        res.set(3, 1, -4.0);
        let norms = ResidualNorms::compute(&mesh, &res, &SerialCommunicator, &Tolerance::default()).unwrap();
        assert!((norms.rms[1] - (20.0f64 / 4.0).sqrt()).abs() < 1e-14);
        assert_eq!(norms.rms[0], EPS * EPS);
        assert_eq!(norms.max[1], 4.0);
        assert_eq!(norms.max_point[1], Some(3));
        assert_eq!(norms.max_coord[1], Some(DVec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_nan_diverges() {
        let mesh = mesh();
        let mut res = ResidualField::new(4, 4);
        res.set(0, 3, f64::NAN);
        let err = ResidualNorms::compute(&mesh, &res, &SerialCommunicator, &Tolerance::default()).unwrap_err();
        assert!(matches!(err, VfError::Diverged { variable: 3, .. }));
    }

    #[test]
    fn test_large_residual_diverges() {
        let mesh = mesh();
        let mut res = ResidualField::new(4, 4);
        for p in 0..4 {
            res.set(p, 0, 1e21);
        }
        assert!(ResidualNorms::compute(&mesh, &res, &SerialCommunicator, &Tolerance::default()).is_err());
    }

    #[test]
    fn test_halo_excluded() {
        let mesh = mesh().with_domain_points(2).unwrap();
        let mut res = ResidualField::new(4, 4);
        res.set(3, 2, 100.0);
        let norms = ResidualNorms::compute(&mesh, &res, &SerialCommunicator, &Tolerance::default()).unwrap();
        assert_eq!(norms.max[2], 0.0);
        assert_eq!(norms.max_point[2], None);
    }
}
