// crates/sg_physics/src/provider.rs

//! 初始条件提供者
//!
//! [`ScenarioProvider`] 把"模拟什么"与"怎么模拟"解耦：
//! 引擎只在初始化时向提供者索要网格尺寸与四个场的初值，
//! 之后不再回调（封闭边界场景除外）。内置三个解析场景
//! 用于验证与演示；真实数据源（如测深文件加载器）实现
//! 同一 trait 即可接入。

use crate::boundary;
use crate::field::FieldSet;
use crate::grid::Grid;

// ============================================================
// trait
// ============================================================

/// 初始条件提供者
///
/// 填充方法遍历含幽灵圈的全部单元（坐标 `-1..=width` /
/// `-1..=height`），通过 [`Grid::index`] 写入扁平数组。
/// 默认实现：动量为零、开边界、数据即时可用。
pub trait ScenarioProvider: Send + Sync {
    /// 数据是否就绪（异步加载的场景在就绪前返回 `false`，
    /// 引擎会跳过 tick 而不是阻塞）
    fn is_ready(&self) -> bool {
        true
    }

    /// 建议的 x 方向内部单元数
    fn preferred_cells_x(&self) -> usize;

    /// 建议的 y 方向内部单元数
    fn preferred_cells_y(&self) -> usize;

    /// 建议的单元边长 [m]
    fn preferred_cell_size(&self) -> f64;

    /// 填充初始水深
    fn fill_depth(&self, grid: &Grid, h: &mut [f64]);

    /// 填充地形高程
    fn fill_bathymetry(&self, grid: &Grid, b: &mut [f64]);

    /// 填充初始 x 动量（默认静止）
    fn fill_momentum_x(&self, grid: &Grid, hu: &mut [f64]) {
        let _ = grid;
        hu.fill(0.0);
    }

    /// 填充初始 y 动量（默认静止）
    fn fill_momentum_y(&self, grid: &Grid, hv: &mut [f64]) {
        let _ = grid;
        hv.fill(0.0);
    }

    /// 是否需要封闭（固壁）边界
    fn has_closed_border(&self) -> bool {
        false
    }

    /// 施加封闭边界（默认固壁反射）
    fn apply_border(&self, fields: &mut FieldSet) {
        boundary::apply_wall_border(fields);
    }
}

// ============================================================
// 内置场景
// ============================================================

/// 一维溃坝：左右两侧不同水深，平底
///
/// 网格高度为 1，检验 x 扫掠与波速估计的经典算例。
#[derive(Debug, Clone)]
pub struct DamBreak1d {
    /// x 方向单元数
    pub cells: usize,
    /// 坝左侧水深 [m]
    pub h_left: f64,
    /// 坝右侧水深 [m]
    pub h_right: f64,
    /// 单元边长 [m]
    pub cell_size: f64,
}

impl DamBreak1d {
    /// 标准算例：100 个单元，左 10 m、右 8 m，单元 1 m
    pub fn standard() -> Self {
        Self {
            cells: 100,
            h_left: 10.0,
            h_right: 8.0,
            cell_size: 1.0,
        }
    }
}

impl ScenarioProvider for DamBreak1d {
    fn preferred_cells_x(&self) -> usize {
        self.cells
    }

    fn preferred_cells_y(&self) -> usize {
        1
    }

    fn preferred_cell_size(&self) -> f64 {
        self.cell_size
    }

    fn fill_depth(&self, grid: &Grid, h: &mut [f64]) {
        let mid = (self.cells / 2) as i64;
        for y in -1..=grid.height() as i64 {
            for x in -1..=grid.width() as i64 {
                h[grid.index(x, y)] = if x < mid { self.h_left } else { self.h_right };
            }
        }
    }

    fn fill_bathymetry(&self, grid: &Grid, b: &mut [f64]) {
        let _ = grid;
        b.fill(0.0);
    }
}

/// 二维圆形溃坝：中心圆柱水体塌落，平底
#[derive(Debug, Clone)]
pub struct CircularDamBreak {
    /// 每个方向的单元数（正方形域）
    pub cells: usize,
    /// 圆柱内水深 [m]
    pub h_inner: f64,
    /// 圆柱外水深 [m]
    pub h_outer: f64,
    /// 圆柱半径（单元数）
    pub radius: f64,
    /// 单元边长 [m]
    pub cell_size: f64,
}

impl CircularDamBreak {
    /// 标准算例：100×100，内 10 m、外 5 m，半径 15 个单元
    pub fn standard() -> Self {
        Self {
            cells: 100,
            h_inner: 10.0,
            h_outer: 5.0,
            radius: 15.0,
            cell_size: 1.0,
        }
    }
}

impl ScenarioProvider for CircularDamBreak {
    fn preferred_cells_x(&self) -> usize {
        self.cells
    }

    fn preferred_cells_y(&self) -> usize {
        self.cells
    }

    fn preferred_cell_size(&self) -> f64 {
        self.cell_size
    }

    fn fill_depth(&self, grid: &Grid, h: &mut [f64]) {
        let cx = self.cells as f64 / 2.0;
        let cy = self.cells as f64 / 2.0;
        for y in -1..=grid.height() as i64 {
            for x in -1..=grid.width() as i64 {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                let inside = (dx * dx + dy * dy).sqrt() <= self.radius;
                h[grid.index(x, y)] = if inside { self.h_inner } else { self.h_outer };
            }
        }
    }

    fn fill_bathymetry(&self, grid: &Grid, b: &mut [f64]) {
        let _ = grid;
        b.fill(0.0);
    }
}

/// 静水湖：起伏地形上的平坦自由水面
///
/// 良平衡性检验：精确解为恒定 `h + b`、零动量，任何
/// 非零演化都是数值误差。
#[derive(Debug, Clone)]
pub struct LakeAtRest {
    /// 每个方向的单元数
    pub cells: usize,
    /// 自由水面高程 [m]
    pub surface: f64,
    /// 地形起伏幅值 [m]
    pub amplitude: f64,
    /// 单元边长 [m]
    pub cell_size: f64,
}

impl LakeAtRest {
    /// 标准算例：50×50，水面 0 m，起伏地形全域淹没
    pub fn standard() -> Self {
        Self {
            cells: 50,
            surface: 0.0,
            amplitude: 4.0,
            cell_size: 1.0,
        }
    }

    fn bathymetry_at(&self, x: i64, y: i64) -> f64 {
        let n = self.cells as f64;
        let fx = (x as f64 + 0.5) / n * std::f64::consts::TAU;
        let fy = (y as f64 + 0.5) / n * std::f64::consts::TAU;
        -10.0 + self.amplitude * 0.5 * (2.0 + fx.sin() + (2.0 * fy).cos())
    }
}

impl ScenarioProvider for LakeAtRest {
    fn preferred_cells_x(&self) -> usize {
        self.cells
    }

    fn preferred_cells_y(&self) -> usize {
        self.cells
    }

    fn preferred_cell_size(&self) -> f64 {
        self.cell_size
    }

    fn fill_depth(&self, grid: &Grid, h: &mut [f64]) {
        for y in -1..=grid.height() as i64 {
            for x in -1..=grid.width() as i64 {
                let depth = self.surface - self.bathymetry_at(x, y);
                h[grid.index(x, y)] = depth.max(0.0);
            }
        }
    }

    fn fill_bathymetry(&self, grid: &Grid, b: &mut [f64]) {
        for y in -1..=grid.height() as i64 {
            for x in -1..=grid.width() as i64 {
                b[grid.index(x, y)] = self.bathymetry_at(x, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dam_break_split() {
        let p = DamBreak1d::standard();
        let grid = Grid::new(p.preferred_cells_x(), p.preferred_cells_y()).unwrap();
        let mut h = vec![0.0; grid.total_cells()];
        p.fill_depth(&grid, &mut h);
        assert_eq!(h[grid.index(0, 0)], 10.0);
        assert_eq!(h[grid.index(49, 0)], 10.0);
        assert_eq!(h[grid.index(50, 0)], 8.0);
        assert_eq!(h[grid.index(99, 0)], 8.0);
        // 幽灵单元延续最近内部值
        assert_eq!(h[grid.index(-1, 0)], 10.0);
        assert_eq!(h[grid.index(100, 0)], 8.0);
    }

    #[test]
    fn test_circular_dam_break_regions() {
        let p = CircularDamBreak::standard();
        let grid = Grid::new(p.cells, p.cells).unwrap();
        let mut h = vec![0.0; grid.total_cells()];
        p.fill_depth(&grid, &mut h);
        assert_eq!(h[grid.index(50, 50)], 10.0);
        assert_eq!(h[grid.index(0, 0)], 5.0);
    }

    #[test]
    fn test_lake_at_rest_flat_surface() {
        let p = LakeAtRest::standard();
        let grid = Grid::new(p.cells, p.cells).unwrap();
        let mut h = vec![0.0; grid.total_cells()];
        let mut b = vec![0.0; grid.total_cells()];
        p.fill_depth(&grid, &mut h);
        p.fill_bathymetry(&grid, &mut b);
        for y in 0..p.cells as i64 {
            for x in 0..p.cells as i64 {
                let i = grid.index(x, y);
                assert!((h[i] + b[i] - p.surface).abs() < 1e-12);
                assert!(h[i] > 0.0);
            }
        }
    }
}
