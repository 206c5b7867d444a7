// crates/vf_physics/src/numerics/csr.rs

//! 压缩稀疏行（CSR）系统矩阵
//!
//! 隐式推进时粘性通量的线性化写入 [`SystemMatrix`]。矩阵按点分块，
//! 每块 `n_var × n_var`，非零模式由网格邻接关系一次性确定：
//! 每个点与自身及每个面邻居各有一块。
//!
//! # 格式说明
//!
//! - `row_ptr`: 行指针，长度 n_rows + 1
//! - `col_idx`: 每行内升序的列索引（可二分查找）
//! - `values`: 非零元值
//!
//! 标量行号为 `point * n_var + var`。

use std::collections::BTreeMap;

use crate::mesh::DualGeometry;

// =============================================================================
// 稀疏模式
// =============================================================================

/// CSR 稀疏模式
#[derive(Debug, Clone)]
pub struct CsrPattern {
    n_rows: usize,
    n_cols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
}

impl CsrPattern {
    /// 行数
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// 列数
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// 非零元数量
    #[inline]
    pub fn nnz(&self) -> usize {
        self.col_idx.len()
    }

    /// 第 row 行的列索引
    #[inline]
    pub fn row_indices(&self, row: usize) -> &[usize] {
        &self.col_idx[self.row_ptr[row]..self.row_ptr[row + 1]]
    }

    /// 查找 (row, col) 对应的值索引
    pub fn find_index(&self, row: usize, col: usize) -> Option<usize> {
        let start = self.row_ptr[row];
        let end = self.row_ptr[row + 1];
        // 行内列索引有序
        self.col_idx[start..end]
            .binary_search(&col)
            .ok()
            .map(|local| start + local)
    }
}

/// 稀疏模式构建器
#[derive(Debug, Clone)]
pub struct CsrBuilder {
    n_rows: usize,
    n_cols: usize,
    rows: Vec<BTreeMap<usize, f64>>,
}

impl CsrBuilder {
    /// 创建方阵构建器
    pub fn new_square(n: usize) -> Self {
        Self {
            n_rows: n,
            n_cols: n,
            rows: vec![BTreeMap::new(); n],
        }
    }

    /// 累加到 (row, col)
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        *self.rows[row].entry(col).or_insert(0.0) += value;
    }

    /// 非零元总数
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }

    /// 构建（消耗构建器）
    pub fn build(self) -> SystemMatrix {
        self.build_blocked(1)
    }

    fn build_blocked(self, n_var: usize) -> SystemMatrix {
        let nnz = self.nnz();
        let mut row_ptr = Vec::with_capacity(self.n_rows + 1);
        let mut col_idx = Vec::with_capacity(nnz);
        let mut values = Vec::with_capacity(nnz);

        row_ptr.push(0);
        for row_map in self.rows {
            for (col, val) in row_map {
                col_idx.push(col);
                values.push(val);
            }
            row_ptr.push(col_idx.len());
        }

        SystemMatrix {
            pattern: CsrPattern {
                n_rows: self.n_rows,
                n_cols: self.n_cols,
                row_ptr,
                col_idx,
            },
            values,
            n_var,
        }
    }
}

// =============================================================================
// 系统矩阵
// =============================================================================

/// 分块 CSR 系统矩阵
#[derive(Debug, Clone)]
pub struct SystemMatrix {
    pattern: CsrPattern,
    values: Vec<f64>,
    n_var: usize,
}

impl SystemMatrix {
    /// 按网格邻接关系建立 `n_var × n_var` 分块模式（值全零）
    pub fn from_geometry(geometry: &dyn DualGeometry, n_var: usize) -> Self {
        let n_points = geometry.n_points();
        let mut builder = CsrBuilder::new_square(n_points * n_var);

        let mut couple = |a: usize, b: usize| {
            for i in 0..n_var {
                for j in 0..n_var {
                    builder.add(a * n_var + i, b * n_var + j, 0.0);
                }
            }
        };

        for p in 0..n_points {
            couple(p, p);
        }
        for face in geometry.faces() {
            couple(face.left, face.right);
            couple(face.right, face.left);
        }

        builder.build_blocked(n_var)
    }

    /// 每块变量数
    #[inline]
    pub fn n_var(&self) -> usize {
        self.n_var
    }

    /// 标量行数
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.pattern.n_rows()
    }

    /// 非零元数量
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// 稀疏模式
    #[inline]
    pub fn pattern(&self) -> &CsrPattern {
        &self.pattern
    }

    /// 点/变量对应的标量行号
    #[inline]
    pub fn row_of(&self, point: usize, var: usize) -> usize {
        point * self.n_var + var
    }

    /// (row, col) 的值，不存在时为 0
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.pattern
            .find_index(row, col)
            .map_or(0.0, |idx| self.values[idx])
    }

    /// 设置 (row, col)，位置不在模式中时返回 `false`
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> bool {
        if let Some(idx) = self.pattern.find_index(row, col) {
            self.values[idx] = value;
            true
        } else {
            false
        }
    }

    /// 累加到 (row, col)，位置不在模式中时返回 `false`
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) -> bool {
        if let Some(idx) = self.pattern.find_index(row, col) {
            self.values[idx] += value;
            true
        } else {
            false
        }
    }

    /// 在块 (point_i, point_j) 的对角线上，对 `vars` 中每个变量累加 `value`
    pub fn add_block_diagonal(
        &mut self,
        point_i: usize,
        point_j: usize,
        vars: std::ops::Range<usize>,
        value: f64,
    ) {
        for k in vars {
            let row = self.row_of(point_i, k);
            let col = self.row_of(point_j, k);
            self.add(row, col, value);
        }
    }

    /// 清零所有值（保持模式）
    pub fn clear_values(&mut self) {
        self.values.fill(0.0);
    }

    /// 删除一行：整行置零、对角元置 1，其余行的列不动
    pub fn delete_row(&mut self, row: usize) {
        let start = self.pattern.row_ptr[row];
        let end = self.pattern.row_ptr[row + 1];
        self.values[start..end].fill(0.0);
        if let Some(idx) = self.pattern.find_index(row, row) {
            self.values[idx] = 1.0;
        }
    }

    /// 矩阵-向量乘法 y = A * x
    ///
    /// # Panics
    /// - `x.len() != n_cols`
    /// - `y.len() != n_rows`
    pub fn mul_vec(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.pattern.n_cols(), "x 长度必须等于矩阵列数");
        assert_eq!(y.len(), self.n_rows(), "y 长度必须等于矩阵行数");

        for (row, out) in y.iter_mut().enumerate() {
            let start = self.pattern.row_ptr[row];
            let end = self.pattern.row_ptr[row + 1];
            *out = (start..end)
                .map(|idx| self.values[idx] * x[self.pattern.col_idx[idx]])
                .sum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::DualMesh;

    fn two_by_two() -> DualMesh {
        DualMesh::rectilinear(&[0.0, 1.0], &[0.0, 1.0], ["s", "e", "n", "w"]).unwrap()
    }

    #[test]
    fn test_builder_sorted_rows() {
        let mut b = CsrBuilder::new_square(3);
        b.add(0, 2, 1.0);
        b.add(0, 0, 4.0);
        b.add(0, 2, 1.0);
        let m = b.build();
        assert_eq!(m.pattern().row_indices(0), &[0, 2]);
        assert_eq!(m.get(0, 2), 2.0);
        assert_eq!(m.get(1, 1), 0.0);
    }

    #[test]
    fn test_pattern_from_geometry() {
        let mesh = two_by_two();
        let m = SystemMatrix::from_geometry(&mesh, 4);
        // 4 个对角块 + 4 条边 * 2 个非对角块
        assert_eq!(m.nnz(), (4 + 8) * 16);
        assert!(m.pattern().find_index(m.row_of(0, 1), m.row_of(1, 1)).is_some());
        // 对角点 0 与 3 不相邻
        assert!(m.pattern().find_index(m.row_of(0, 1), m.row_of(3, 1)).is_none());
    }

    #[test]
    fn test_delete_row_keeps_columns() {
        let mesh = two_by_two();
        let mut m = SystemMatrix::from_geometry(&mesh, 1);
        m.add(0, 0, 5.0);
        m.add(0, 1, -2.0);
        m.add(1, 0, -2.0);
        m.add(1, 1, 5.0);

        m.delete_row(0);
        assert_eq!(m.get(0, 0), 1.0);
        assert_eq!(m.get(0, 1), 0.0);
        // 其他行的耦合保留
        assert_eq!(m.get(1, 0), -2.0);
        assert_eq!(m.get(1, 1), 5.0);
    }

    #[test]
    fn test_set_outside_pattern() {
        let mesh = two_by_two();
        let mut m = SystemMatrix::from_geometry(&mesh, 1);
        assert!(!m.set(0, 3, 1.0));
        assert!(m.set(0, 1, 1.0));
    }

    #[test]
    fn test_mul_vec() {
        let mut b = CsrBuilder::new_square(2);
        b.add(0, 0, 2.0);
        b.add(0, 1, 1.0);
        b.add(1, 1, 3.0);
        let m = b.build();
        let mut y = vec![0.0; 2];
        m.mul_vec(&[1.0, 2.0], &mut y);
        assert_eq!(y, vec![4.0, 6.0]);
    }
}
