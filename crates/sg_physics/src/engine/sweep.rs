// crates/sg_physics/src/engine/sweep.rs

//! 维度分裂扫掠
//!
//! 一个子步由 x、y 两次全量扫掠组成（Godunov 算子分裂，
//! 非半权重），两次扫掠使用相同的 `dt/dx` 比例因子。
//! 每次扫掠：先对参与的场做流出边界填充，把当前值复制到
//! 后备缓冲，对每个界面求解 Riemann 问题并把净更新按比例
//! 从后备缓冲中扣减，最后交换缓冲。
//!
//! # 并行划分
//!
//! x 扫掠的界面 `(x,y)-(x+1,y)` 只写入行 `y`，按行分条带；
//! y 扫掠的界面 `(x,y)-(x,y+1)` 只写入列 `x`，按列分条带。
//! 条带互不相交，写入无竞争，结果与线程数无关（逐位确定）。

use std::sync::atomic::{AtomicU64, Ordering};

use crate::boundary;
use crate::engine::parallel::{ParallelExecutor, StripeWriter};
use crate::field::FieldSet;
use crate::schemes::FWaveSolver;

/// 扫掠方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepAxis {
    /// 沿 x 方向（更新 `h`、`hu`）
    X,
    /// 沿 y 方向（更新 `h`、`hv`）
    Y,
}

/// 一次扫掠的诊断统计
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepStats {
    /// 因非有限结果被置零的界面数
    pub zeroed_interfaces: u64,
}

/// 执行一次单轴扫掠
///
/// `scale` 为 `dt / cellSize`。
pub fn half_step(
    fields: &mut FieldSet,
    solver: &FWaveSolver,
    executor: &ParallelExecutor,
    scale: f64,
    axis: SweepAxis,
    min_per_task: usize,
) -> SweepStats {
    let grid = *fields.grid();
    let width = grid.width() as i64;
    let height = grid.height() as i64;

    // 求解器读取域边界的幽灵单元，扫掠前必须填充
    boundary::apply_outflow(&grid, fields.h.current_mut());
    match axis {
        SweepAxis::X => boundary::apply_outflow(&grid, fields.hu.current_mut()),
        SweepAxis::Y => boundary::apply_outflow(&grid, fields.hv.current_mut()),
    }

    fields.h.copy_current_to_back();
    match axis {
        SweepAxis::X => fields.hu.copy_current_to_back(),
        SweepAxis::Y => fields.hv.copy_current_to_back(),
    }

    let zeroed_total = AtomicU64::new(0);
    {
        let (h_src, h_dst) = fields.h.split();
        let (q_src, q_dst) = match axis {
            SweepAxis::X => fields.hu.split(),
            SweepAxis::Y => fields.hv.split(),
        };
        let b = fields.b.as_slice();
        let h_writer = StripeWriter::new(h_dst);
        let q_writer = StripeWriter::new(q_dst);

        // x 扫掠按行分条带，y 扫掠按列分条带
        let stripes = match axis {
            SweepAxis::X => grid.height(),
            SweepAxis::Y => grid.width(),
        };

        executor.for_each_stripe(
            0,
            stripes,
            min_per_task,
            || 0_u64,
            |range, zeroed: &mut u64| {
                for line in range {
                    let line = line as i64;
                    // 界面数比内部单元多一：含两端各一个幽灵界面
                    let interfaces = match axis {
                        SweepAxis::X => -1..width,
                        SweepAxis::Y => -1..height,
                    };
                    for k in interfaces {
                        let (il, ir) = match axis {
                            SweepAxis::X => (grid.index(k, line), grid.index(k + 1, line)),
                            SweepAxis::Y => (grid.index(line, k), grid.index(line, k + 1)),
                        };
                        let (upd, was_zeroed) =
                            solver.solve(h_src[il], h_src[ir], q_src[il], q_src[ir], b[il], b[ir]);
                        if was_zeroed {
                            *zeroed += 1;
                        }
                        // Safety: il/ir 都落在本任务独占的行（列）条带内
                        unsafe {
                            h_writer.sub(il, scale * upd.h_left);
                            q_writer.sub(il, scale * upd.hu_left);
                            h_writer.sub(ir, scale * upd.h_right);
                            q_writer.sub(ir, scale * upd.hu_right);
                        }
                    }
                }
                zeroed_total.fetch_add(*zeroed, Ordering::Relaxed);
                *zeroed = 0;
            },
        );
    }

    fields.h.swap();
    match axis {
        SweepAxis::X => fields.hu.swap(),
        SweepAxis::Y => fields.hv.swap(),
    }

    SweepStats {
        zeroed_interfaces: zeroed_total.into_inner(),
    }
}
