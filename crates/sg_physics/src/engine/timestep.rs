// crates/sg_physics/src/engine/timestep.rs

//! CFL 时间步控制
//!
//! 稳定时间步由全网格最大波速决定，扫描开销与网格同阶，
//! 因此只周期性重算（每 N 个子步一次，或首个子步/估计失效
//! 时强制），其余子步复用上次的估计。

use crate::engine::parallel::ParallelExecutor;
use crate::field::FieldSet;

/// 时间步控制器
///
/// 持有当前估计与距上次重算的子步计数；估计不存在时
/// [`Self::current`] 返回 `None`，由步进循环以目标时长
/// 兜底（相当于无穷大哨兵被钳制）。
#[derive(Debug, Clone)]
pub struct TimeStepController {
    recompute_interval: u32,
    substeps_since_refresh: u32,
    estimate: Option<f64>,
}

impl TimeStepController {
    /// 创建控制器；`recompute_interval` 为两次全网格扫描
    /// 之间允许的子步数
    pub fn new(recompute_interval: u32) -> Self {
        Self {
            recompute_interval: recompute_interval.max(1),
            substeps_since_refresh: 0,
            estimate: None,
        }
    }

    /// 当前估计的稳定时间步 [s]
    #[inline]
    pub fn current(&self) -> Option<f64> {
        self.estimate
    }

    /// 是否需要重新扫描波速
    #[inline]
    pub fn needs_refresh(&self) -> bool {
        self.estimate.is_none() || self.substeps_since_refresh >= self.recompute_interval
    }

    /// 记录一个已完成的子步
    #[inline]
    pub fn note_substep(&mut self) {
        self.substeps_since_refresh += 1;
    }

    /// 用新的最大波速刷新估计
    ///
    /// `max_speed <= 0`（全域静止或全干）时估计失效，
    /// 下个子步回到哨兵路径。
    pub fn refresh(&mut self, max_speed: f64, cfl_factor: f64, cell_size: f64) {
        self.estimate = if max_speed > 0.0 && max_speed.is_finite() {
            Some(cfl_factor * cell_size / max_speed)
        } else {
            None
        };
        self.substeps_since_refresh = 0;
    }

    /// 作废当前估计（场被重置后调用）
    pub fn invalidate(&mut self) {
        self.estimate = None;
        self.substeps_since_refresh = 0;
    }
}

/// 扫描全部内部湿单元的最大波速
///
/// 每个单元贡献 `max(|hu|,|hv|)/h + √(g·h)`；按行条带并行，
/// 各任务的局部最大值在单个临界区内合并。
pub fn max_wave_speed(
    fields: &FieldSet,
    executor: &ParallelExecutor,
    gravity: f64,
    min_rows_per_task: usize,
) -> f64 {
    let grid = *fields.grid();
    let h = fields.h();
    let hu = fields.hu();
    let hv = fields.hv();

    executor.max_over_stripes(0, grid.height(), min_rows_per_task, |rows| {
        let mut local = 0.0_f64;
        for y in rows {
            for x in 0..grid.width() {
                let i = grid.index(x as i64, y as i64);
                let depth = h[i];
                if depth <= 0.0 {
                    continue;
                }
                let velocity = hu[i].abs().max(hv[i].abs()) / depth;
                let speed = velocity + (gravity * depth).sqrt();
                if speed > local {
                    local = speed;
                }
            }
        }
        local
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn test_controller_refresh_cycle() {
        let mut c = TimeStepController::new(4);
        assert!(c.needs_refresh());
        assert_eq!(c.current(), None);

        c.refresh(10.0, 0.5, 1.0);
        assert_eq!(c.current(), Some(0.05));
        assert!(!c.needs_refresh());

        for _ in 0..4 {
            c.note_substep();
        }
        assert!(c.needs_refresh());
    }

    #[test]
    fn test_zero_speed_invalidates_estimate() {
        let mut c = TimeStepController::new(2);
        c.refresh(0.0, 0.5, 1.0);
        assert_eq!(c.current(), None);
        assert!(c.needs_refresh());
    }

    #[test]
    fn test_max_wave_speed_still_water() {
        let grid = Grid::new(8, 8).unwrap();
        let mut fields = FieldSet::new(grid);
        fields.h.current_mut().fill(4.0);
        let exec = ParallelExecutor::new(2).unwrap();
        let speed = max_wave_speed(&fields, &exec, 9.81, 2);
        // 静水只有重力波速 √(g·h)
        assert!((speed - (9.81_f64 * 4.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_max_wave_speed_skips_dry_cells() {
        let grid = Grid::new(4, 1).unwrap();
        let mut fields = FieldSet::new(grid);
        let exec = ParallelExecutor::new(1).unwrap();
        assert_eq!(max_wave_speed(&fields, &exec, 9.81, 1), 0.0);

        let i = grid.index(2, 0);
        fields.h.current_mut()[i] = 1.0;
        fields.hu.current_mut()[i] = 3.0;
        let speed = max_wave_speed(&fields, &exec, 9.81, 1);
        assert!((speed - (3.0 + 9.81_f64.sqrt())).abs() < 1e-12);
    }
}
