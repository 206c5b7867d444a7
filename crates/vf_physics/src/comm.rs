// crates/vf_physics/src/comm.rs

//! 分区间归约接口
//!
//! 全局系数、全局时间步与残差范数需要跨分区归约。分区通信由外部
//! 提供，这里只定义接口与单进程实现。
//!
//! 所有方法使用 `&self`，以支持持有通信句柄的实现。

use std::fmt::Debug;

/// 分区通信器
pub trait Communicator: Send + Sync + Debug {
    /// 本分区编号
    fn rank(&self) -> usize;

    /// 分区总数
    fn size(&self) -> usize;

    /// 逐元素求和归约（原地）
    fn all_reduce_sum(&self, values: &mut [f64]);

    /// 逐元素最大值归约（原地）
    fn all_reduce_max(&self, values: &mut [f64]);

    /// 逐元素最小值归约（原地）
    fn all_reduce_min(&self, values: &mut [f64]);

    /// 标量求和
    fn sum(&self, value: f64) -> f64 {
        let mut buf = [value];
        self.all_reduce_sum(&mut buf);
        buf[0]
    }

    /// 标量最大值
    fn max(&self, value: f64) -> f64 {
        let mut buf = [value];
        self.all_reduce_max(&mut buf);
        buf[0]
    }

    /// 标量最小值
    fn min(&self, value: f64) -> f64 {
        let mut buf = [value];
        self.all_reduce_min(&mut buf);
        buf[0]
    }
}

/// 单进程通信器（恒等归约）
///
/// 零大小类型，实例化零开销。
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialCommunicator;

impl Communicator for SerialCommunicator {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_reduce_sum(&self, _values: &mut [f64]) {}

    fn all_reduce_max(&self, _values: &mut [f64]) {}

    fn all_reduce_min(&self, _values: &mut [f64]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_identity() {
        let comm = SerialCommunicator;
        let mut v = [1.0, -2.0, 3.0];
        comm.all_reduce_sum(&mut v);
        comm.all_reduce_max(&mut v);
        comm.all_reduce_min(&mut v);
        assert_eq!(v, [1.0, -2.0, 3.0]);
        assert_eq!(comm.sum(4.0), 4.0);
        assert_eq!(comm.rank(), 0);
        assert_eq!(comm.size(), 1);
    }
}
