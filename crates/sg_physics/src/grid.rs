// crates/sg_physics/src/grid.rs

//! 结构化网格定义
//!
//! `width × height` 个内部单元，四周各加一圈幽灵单元，
//! 扁平化存储为长度 `(width+2)·(height+2)` 的数组。
//!
//! # 索引约定
//!
//! 逻辑坐标 `(x, y)` 中内部单元取 `0..width`、`0..height`，
//! 幽灵单元取 `-1` 与 `width`/`height`。越界查询被钳制到
//! 最近的边界单元而非越界访问。

use serde::{Deserialize, Serialize};
use sg_foundation::{SgError, SgResult};

/// 结构化网格（内部单元数 + 幽灵圈）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
}

impl Grid {
    /// 创建网格，拒绝零尺寸
    pub fn new(width: usize, height: usize) -> SgResult<Self> {
        if width == 0 || height == 0 {
            return Err(SgError::invalid_grid(width, height));
        }
        Ok(Self { width, height })
    }

    /// 内部单元数（x 方向）
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// 内部单元数（y 方向）
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// 扁平数组中一行的长度（含两个幽灵单元）
    #[inline]
    pub fn stride(&self) -> usize {
        self.width + 2
    }

    /// 总单元数（含幽灵圈），即每个场的扁平数组长度
    #[inline]
    pub fn total_cells(&self) -> usize {
        (self.width + 2) * (self.height + 2)
    }

    /// 逻辑坐标转扁平索引，越界钳制到边界单元
    #[inline]
    pub fn index(&self, x: i64, y: i64) -> usize {
        let xi = (x + 1).clamp(0, self.width as i64 + 1) as usize;
        let yi = (y + 1).clamp(0, self.height as i64 + 1) as usize;
        xi + yi * self.stride()
    }

    /// 是否为一维退化网格（1×N 或 N×1）
    ///
    /// 一维网格允许更大的 CFL 数（0.5 而非 0.45）。
    #[inline]
    pub fn is_one_dimensional(&self) -> bool {
        self.width == 1 || self.height == 1
    }

    /// 内部单元总数
    #[inline]
    pub fn interior_cells(&self) -> usize {
        self.width * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_dimension() {
        assert!(Grid::new(0, 10).is_err());
        assert!(Grid::new(10, 0).is_err());
        assert!(Grid::new(1, 1).is_ok());
    }

    #[test]
    fn test_total_cells_and_stride() {
        let grid = Grid::new(100, 1).unwrap();
        assert_eq!(grid.stride(), 102);
        assert_eq!(grid.total_cells(), 102 * 3);
    }

    #[test]
    fn test_index_interior() {
        let grid = Grid::new(4, 3).unwrap();
        // (0,0) 映射到第二行第二列
        assert_eq!(grid.index(0, 0), 1 + grid.stride());
        assert_eq!(grid.index(3, 2), 4 + 3 * grid.stride());
    }

    #[test]
    fn test_index_ghost() {
        let grid = Grid::new(4, 3).unwrap();
        assert_eq!(grid.index(-1, 0), grid.stride());
        assert_eq!(grid.index(4, 0), 5 + grid.stride());
        assert_eq!(grid.index(0, -1), 1);
    }

    #[test]
    fn test_index_clamps_out_of_range() {
        let grid = Grid::new(4, 3).unwrap();
        // 远超出范围的坐标解析到边界单元而非越界
        assert_eq!(grid.index(-100, 0), grid.index(-1, 0));
        assert_eq!(grid.index(100, 0), grid.index(4, 0));
        assert_eq!(grid.index(0, 100), grid.index(0, 3));
        assert!(grid.index(100, 100) < grid.total_cells());
    }

    #[test]
    fn test_one_dimensional() {
        assert!(Grid::new(100, 1).unwrap().is_one_dimensional());
        assert!(Grid::new(1, 100).unwrap().is_one_dimensional());
        assert!(!Grid::new(2, 2).unwrap().is_one_dimensional());
    }
}
