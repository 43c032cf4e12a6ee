// crates/sg_physics/src/field.rs

//! 场存储：双缓冲与场集合
//!
//! 本模块提供扫掠所需的存储结构：
//! - [`DoubleBuffer`]: 显式双缓冲，两个自有数组加"当前"标志，
//!   交换只翻转标志，不搬运数据，所有权始终清晰
//! - [`FieldSet`]: 一个网格的四个物理场（h、hu、hv 双缓冲，地形 b 静态）
//! - [`FieldSnapshot`]: 供外部读者（渲染/统计层）使用的一致性快照
//!
//! # 布局设计
//!
//! 采用 SoA (Structure of Arrays) 布局以优化缓存性能，
//! 每个场为一条扁平数组，含幽灵圈，索引服从 [`Grid::index`]。
//!
//! # 双缓冲的必要性
//!
//! 界面更新必须只读取两侧单元扫掠前的状态，因此每次扫掠
//! 需要源/目标两份 `h` 与被更新的动量分量；未被更新的动量
//! 分量与地形在扫掠期间只读。

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::provider::ScenarioProvider;

// ============================================================
// 双缓冲
// ============================================================

/// 显式双缓冲
///
/// 两个等长自有数组加当前索引；`swap` 只翻转索引。
#[derive(Debug, Clone)]
pub struct DoubleBuffer {
    bufs: [Vec<f64>; 2],
    current: usize,
}

impl DoubleBuffer {
    /// 创建零初始化的双缓冲
    pub fn new(len: usize) -> Self {
        Self {
            bufs: [vec![0.0; len], vec![0.0; len]],
            current: 0,
        }
    }

    /// 当前（活动）缓冲
    #[inline]
    pub fn current(&self) -> &[f64] {
        &self.bufs[self.current]
    }

    /// 当前缓冲的可变视图（用于初始填充与边界填充）
    #[inline]
    pub fn current_mut(&mut self) -> &mut [f64] {
        &mut self.bufs[self.current]
    }

    /// 同时借出（当前只读, 后备可写），供扫掠读源写目标
    #[inline]
    pub fn split(&mut self) -> (&[f64], &mut [f64]) {
        let (a, b) = self.bufs.split_at_mut(1);
        if self.current == 0 {
            (&a[0], &mut b[0])
        } else {
            (&b[0], &mut a[0])
        }
    }

    /// 将当前缓冲复制到后备缓冲
    pub fn copy_current_to_back(&mut self) {
        let (src, dst) = self.split();
        dst.copy_from_slice(src);
    }

    /// 交换缓冲：翻转当前索引
    #[inline]
    pub fn swap(&mut self) {
        self.current ^= 1;
    }

    /// 缓冲长度
    #[inline]
    pub fn len(&self) -> usize {
        self.bufs[0].len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bufs[0].is_empty()
    }
}

// ============================================================
// 场集合
// ============================================================

/// 一个模拟实例的四个物理场
///
/// `h`/`hu`/`hv` 双缓冲（扫掠需要源、目标两份），
/// 地形 `b` 在一次运行内静态。
#[derive(Debug, Clone)]
pub struct FieldSet {
    grid: Grid,
    pub(crate) h: DoubleBuffer,
    pub(crate) hu: DoubleBuffer,
    pub(crate) hv: DoubleBuffer,
    pub(crate) b: Vec<f64>,
}

impl FieldSet {
    /// 按网格分配零初始化的场集合
    pub fn new(grid: Grid) -> Self {
        let len = grid.total_cells();
        Self {
            grid,
            h: DoubleBuffer::new(len),
            hu: DoubleBuffer::new(len),
            hv: DoubleBuffer::new(len),
            b: vec![0.0; len],
        }
    }

    /// 网格
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// 水深场（当前缓冲）
    #[inline]
    pub fn h(&self) -> &[f64] {
        self.h.current()
    }

    /// x 方向动量场（当前缓冲）
    #[inline]
    pub fn hu(&self) -> &[f64] {
        self.hu.current()
    }

    /// y 方向动量场（当前缓冲）
    #[inline]
    pub fn hv(&self) -> &[f64] {
        self.hv.current()
    }

    /// 地形场
    #[inline]
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// 从初始条件提供者填充全部场
    ///
    /// 填充顺序：先四个场（含幽灵圈），然后对地形做一次
    /// 零梯度幽灵填充（保证边界界面的静水良平衡），最后
    /// 若提供者要求封闭边界则施加固壁覆盖。
    pub fn populate(&mut self, provider: &dyn ScenarioProvider) {
        let grid = self.grid;
        provider.fill_depth(&grid, self.h.current_mut());
        provider.fill_momentum_x(&grid, self.hu.current_mut());
        provider.fill_momentum_y(&grid, self.hv.current_mut());
        provider.fill_bathymetry(&grid, &mut self.b);

        // 幽灵地形必须与相邻内部单元一致，否则静水在域边界不守恒
        crate::boundary::apply_outflow(&grid, &mut self.b);

        if provider.has_closed_border() {
            provider.apply_border(self);
        }
    }

    /// 生成一致性快照（克隆当前缓冲）
    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            h: self.h.current().to_vec(),
            hu: self.hu.current().to_vec(),
            hv: self.hv.current().to_vec(),
            b: self.b.clone(),
        }
    }
}

// ============================================================
// 快照
// ============================================================

/// 场快照
///
/// 外部读者（网格/纹理生成、统计）持有的稳定副本；
/// 工作线程每个 tick 结束后发布一次。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSnapshot {
    /// 内部单元数（x 方向）
    pub width: usize,
    /// 内部单元数（y 方向）
    pub height: usize,
    /// 水深 [m]
    pub h: Vec<f64>,
    /// x 方向动量 [m²/s]
    pub hu: Vec<f64>,
    /// y 方向动量 [m²/s]
    pub hv: Vec<f64>,
    /// 地形高程 [m]
    pub b: Vec<f64>,
}

impl FieldSnapshot {
    /// 快照内的扁平索引（与 [`Grid::index`] 相同的钳制约定）
    #[inline]
    pub fn index(&self, x: i64, y: i64) -> usize {
        let xi = (x + 1).clamp(0, self.width as i64 + 1) as usize;
        let yi = (y + 1).clamp(0, self.height as i64 + 1) as usize;
        xi + yi * (self.width + 2)
    }

    /// 自由水面高程 `h + b`
    #[inline]
    pub fn surface(&self, x: i64, y: i64) -> f64 {
        let i = self.index(x, y);
        self.h[i] + self.b[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_buffer_swap() {
        let mut buf = DoubleBuffer::new(4);
        buf.current_mut()[0] = 1.0;
        buf.swap();
        assert_eq!(buf.current()[0], 0.0);
        buf.swap();
        assert_eq!(buf.current()[0], 1.0);
    }

    #[test]
    fn test_double_buffer_split() {
        let mut buf = DoubleBuffer::new(3);
        buf.current_mut().copy_from_slice(&[1.0, 2.0, 3.0]);
        {
            let (src, dst) = buf.split();
            assert_eq!(src, &[1.0, 2.0, 3.0]);
            dst[1] = 9.0;
        }
        // 交换后后备缓冲成为活动缓冲
        buf.swap();
        assert_eq!(buf.current()[1], 9.0);
    }

    #[test]
    fn test_copy_current_to_back() {
        let mut buf = DoubleBuffer::new(2);
        buf.current_mut()[0] = 7.0;
        buf.copy_current_to_back();
        buf.swap();
        assert_eq!(buf.current()[0], 7.0);
    }

    #[test]
    fn test_field_set_allocation() {
        let grid = Grid::new(4, 3).unwrap();
        let fields = FieldSet::new(grid);
        assert_eq!(fields.h().len(), grid.total_cells());
        assert_eq!(fields.b().len(), grid.total_cells());
    }

    #[test]
    fn test_snapshot_surface() {
        let grid = Grid::new(2, 2).unwrap();
        let mut fields = FieldSet::new(grid);
        let i = grid.index(0, 0);
        fields.h.current_mut()[i] = 3.0;
        fields.b[i] = -1.0;
        let snap = fields.snapshot();
        assert!((snap.surface(0, 0) - 2.0).abs() < 1e-12);
    }
}
