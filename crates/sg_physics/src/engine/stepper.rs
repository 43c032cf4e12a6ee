// crates/sg_physics/src/engine/stepper.rs

//! 子步循环
//!
//! 把一个 tick 的目标时长切成若干 CFL 稳定子步逐个推进，
//! 每个子步为 x、y 两次扫掠加缓冲交换。循环受三个上限约束:
//! 子步数、墙钟预算（保护交互帧率）、协作取消。任何一个
//! 触发都提前返回已推进的时长，调用方必须按部分推进处理。
//!
//! 首个子步（或估计失效后）没有可用的时间步估计，此时以
//! 剩余目标时长作为时间步，扫掠完成后立即扫描波速建立估计。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::engine::backend::SimulationBackend;
use crate::engine::sweep::SweepAxis;
use crate::engine::timestep::TimeStepController;
use crate::types::NumericalParams;

// ============================================================
// 取消令牌
// ============================================================

/// 协作取消令牌
///
/// 宿主持有一份克隆；步进循环在每个子步之间检查一次，
/// 取消请求至多延迟一个子步生效。
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// 创建未触发的令牌
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// 是否已请求取消
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// 复位（实例重置后复用）
    pub fn clear(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ============================================================
// 推进限制与结果
// ============================================================

/// 一次推进的上限
#[derive(Debug, Clone, Copy)]
pub struct TickLimits {
    /// 最大子步数
    pub max_substeps: u32,
    /// 墙钟预算；`None` 表示不限
    pub budget: Option<Duration>,
}

impl Default for TickLimits {
    fn default() -> Self {
        Self {
            max_substeps: 64,
            // 交互帧预算
            budget: Some(Duration::from_micros(16_667)),
        }
    }
}

/// 一次推进的结果
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvanceOutcome {
    /// 实际推进的模拟时长 [s]（可能小于目标）
    pub advanced: f64,
    /// 执行的子步数
    pub substeps: u32,
    /// 被置零的界面总数（非零说明出现了数值退化）
    pub zeroed_interfaces: u64,
    /// 是否因墙钟预算提前退出
    pub hit_budget: bool,
}

// ============================================================
// 步进器
// ============================================================

/// 子步循环驱动器
#[derive(Debug)]
pub struct Stepper {
    controller: TimeStepController,
    params: NumericalParams,
}

impl Stepper {
    /// 创建步进器
    pub fn new(params: NumericalParams) -> Self {
        Self {
            controller: TimeStepController::new(params.recompute_interval),
            params,
        }
    }

    /// 作废时间步估计（场被重新初始化后调用）
    pub fn reset(&mut self) {
        self.controller.invalidate();
    }

    /// 当前数值参数
    pub fn params(&self) -> &NumericalParams {
        &self.params
    }

    /// 同步参数（后端初始化可能更新单元尺寸）
    pub fn sync_params(&mut self, params: NumericalParams) {
        self.params = params;
        self.controller = TimeStepController::new(params.recompute_interval);
    }

    /// 当前场状态下的最大稳定时间步 [s]
    pub fn max_stable_step(&self, backend: &dyn SimulationBackend) -> Option<f64> {
        let speed = backend.max_wave_speed();
        let cfl = self
            .params
            .cfl_for(backend.fields().grid().is_one_dimensional());
        (speed > 0.0).then(|| cfl * self.params.cell_size / speed)
    }

    /// 推进至多 `target` 秒的模拟时间
    pub fn advance(
        &mut self,
        backend: &mut dyn SimulationBackend,
        target: f64,
        limits: TickLimits,
        cancel: &CancelToken,
    ) -> AdvanceOutcome {
        let started = Instant::now();
        let cell_size = self.params.cell_size;
        let cfl = self
            .params
            .cfl_for(backend.fields().grid().is_one_dimensional());

        let mut outcome = AdvanceOutcome::default();

        loop {
            if outcome.advanced >= target || outcome.substeps >= limits.max_substeps {
                break;
            }

            // 没有估计时以剩余目标兜底（首个子步或场刚重置）
            let dt = self
                .controller
                .current()
                .unwrap_or(f64::INFINITY)
                .min(target - outcome.advanced);
            if dt <= 0.0 || !dt.is_finite() {
                break;
            }

            let scale = dt / cell_size;
            // y 扫掠消费 x 扫掠的输出，两者共用同一比例因子
            let sx = backend.half_step(SweepAxis::X, scale);
            let sy = backend.half_step(SweepAxis::Y, scale);
            outcome.zeroed_interfaces += sx.zeroed_interfaces + sy.zeroed_interfaces;

            outcome.advanced += dt;
            outcome.substeps += 1;
            self.controller.note_substep();

            if self.controller.needs_refresh() {
                self.controller
                    .refresh(backend.max_wave_speed(), cfl, cell_size);
            }

            if let Some(budget) = limits.budget {
                if started.elapsed() > budget {
                    outcome.hit_budget = true;
                    break;
                }
            }
            if cancel.is_cancelled() {
                break;
            }
            std::thread::yield_now();
        }

        if outcome.zeroed_interfaces > 0 {
            warn!(
                zeroed = outcome.zeroed_interfaces,
                substeps = outcome.substeps,
                "扫掠产生非有限更新, 已置零"
            );
        }
        debug!(
            advanced = outcome.advanced,
            target,
            substeps = outcome.substeps,
            hit_budget = outcome.hit_budget,
            "推进完成"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cpu::CpuEngine;
    use crate::engine::parallel::ParallelExecutor;
    use crate::provider::{CircularDamBreak, DamBreak1d};

    fn make_engine(provider: &dyn crate::provider::ScenarioProvider) -> (CpuEngine, Stepper) {
        let exec = Arc::new(ParallelExecutor::new(2).unwrap());
        let mut engine = CpuEngine::new(NumericalParams::default(), exec).unwrap();
        engine.init(provider).unwrap();
        let stepper = Stepper::new(*engine.params());
        (engine, stepper)
    }

    fn unlimited() -> TickLimits {
        TickLimits {
            max_substeps: 1000,
            budget: None,
        }
    }

    #[test]
    fn test_advance_reaches_target() {
        let (mut engine, mut stepper) = make_engine(&DamBreak1d::standard());
        let outcome = stepper.advance(&mut engine, 0.1, unlimited(), &CancelToken::new());
        assert!((outcome.advanced - 0.1).abs() < 1e-12);
        assert!(outcome.substeps >= 1);
        assert!(!outcome.hit_budget);
        assert_eq!(outcome.zeroed_interfaces, 0);
    }

    #[test]
    fn test_substep_cap_causes_partial_advance() {
        let (mut engine, mut stepper) = make_engine(&CircularDamBreak::standard());
        let limits = TickLimits {
            max_substeps: 1,
            budget: None,
        };
        // 首个子步建立估计后, 1 个子步远不足以覆盖 10 s
        stepper.advance(&mut engine, 0.01, unlimited(), &CancelToken::new());
        let outcome = stepper.advance(&mut engine, 10.0, limits, &CancelToken::new());
        assert_eq!(outcome.substeps, 1);
        assert!(outcome.advanced < 10.0);
        assert!(outcome.advanced > 0.0);
    }

    #[test]
    fn test_zero_budget_stops_after_first_substep() {
        let (mut engine, mut stepper) = make_engine(&CircularDamBreak::standard());
        stepper.advance(&mut engine, 0.01, unlimited(), &CancelToken::new());
        let limits = TickLimits {
            max_substeps: 1000,
            budget: Some(Duration::ZERO),
        };
        let outcome = stepper.advance(&mut engine, 10.0, limits, &CancelToken::new());
        assert!(outcome.hit_budget);
        assert_eq!(outcome.substeps, 1);
    }

    #[test]
    fn test_cancel_observed_between_substeps() {
        let (mut engine, mut stepper) = make_engine(&CircularDamBreak::standard());
        stepper.advance(&mut engine, 0.01, unlimited(), &CancelToken::new());
        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome = stepper.advance(&mut engine, 10.0, unlimited(), &cancel);
        assert_eq!(outcome.substeps, 1);
        assert!(outcome.advanced < 10.0);
    }

    #[test]
    fn test_max_stable_step_positive_for_wet_grid() {
        let (engine, stepper) = make_engine(&DamBreak1d::standard());
        let dt = stepper.max_stable_step(&engine).unwrap();
        // 一维网格: cfl=0.5, 最大波速 √(9.81·10)
        let expected = 0.5 / (9.81_f64 * 10.0).sqrt();
        assert!((dt - expected).abs() < 1e-12);
    }
}
