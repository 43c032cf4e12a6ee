// crates/sg_sim/src/instance.rs

//! 模拟实例
//!
//! [`Simulation`] 把引擎、步进器与后台工作线程装配成一个
//! 可嵌入交互宿主的实例：
//! - `tick(real_dt)` 启动一个后台工作线程推进一帧；同一
//!   实例任意时刻最多一个在途 tick（单槽守卫）
//! - 场景提供者未就绪时场填充被推迟，tick 为空操作加警告，
//!   不抛错（宿主下一帧自然重试）
//! - 工作线程结束时发布一份场快照，外部读者只消费快照
//! - 推进过程中的 panic 在 tick 边界被捕获，该帧作废，
//!   宿主不受影响
//! - 销毁实例触发协作取消并在释放场缓冲前汇合工作线程

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use sg_foundation::{SgError, SgResult};
use sg_physics::{
    AdvanceOutcome, CancelToken, CpuEngine, FieldSnapshot, ParallelExecutor, ScenarioProvider,
    SimulationBackend, Stepper, TickLimits,
};

use crate::config::SimulationConfig;

/// 实例状态概览（诊断与 UI 显示）
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulationStatus {
    /// 已推进的模拟时间 [s]
    pub sim_time: f64,
    /// 是否有在途 tick
    pub ticking: bool,
    /// 最近一次推进的结果
    pub last_outcome: Option<AdvanceOutcome>,
}

/// 引擎与步进器成对流转：工作线程在 tick 期间独占两者
struct EngineState {
    engine: CpuEngine,
    stepper: Stepper,
}

/// 宿主线程与工作线程共享的状态
struct Shared {
    state: Mutex<Option<EngineState>>,
    snapshot: RwLock<Option<FieldSnapshot>>,
    cancel: CancelToken,
    ticking: AtomicBool,
    status: Mutex<SimulationStatus>,
}

/// 模拟实例
pub struct Simulation {
    config: SimulationConfig,
    provider: Option<Arc<dyn ScenarioProvider>>,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Simulation {
    /// 创建未初始化的实例
    pub fn new(config: SimulationConfig) -> SgResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            provider: None,
            shared: Arc::new(Shared {
                state: Mutex::new(None),
                snapshot: RwLock::new(None),
                cancel: CancelToken::new(),
                ticking: AtomicBool::new(false),
                status: Mutex::new(SimulationStatus::default()),
            }),
            worker: None,
        })
    }

    /// 绑定场景提供者并填充场数据
    ///
    /// 提供者尚未就绪时填充被推迟到后续 tick（就绪前的 tick
    /// 为空操作）。对已初始化的实例重复调用等价于换场景重置。
    pub fn init(&mut self, provider: Arc<dyn ScenarioProvider>) -> SgResult<()> {
        self.provider = Some(provider);
        if !self.try_populate()? {
            debug!("场景数据未就绪, 推迟场填充");
        }
        Ok(())
    }

    /// 推进一帧：按真实时长与时间缩放换算目标模拟时长，
    /// 在后台工作线程中执行
    ///
    /// 返回 `Ok(true)` 表示已启动 tick。在途 tick 未结束、
    /// 未绑定提供者或提供者未就绪时为空操作，返回 `Ok(false)`。
    pub fn tick(&mut self, real_dt: f64) -> SgResult<bool> {
        if real_dt <= 0.0 || !real_dt.is_finite() {
            return Err(SgError::invalid_input(format!("帧时长无效: {real_dt}")));
        }
        // 单槽守卫必须先于场互斥锁：工作线程在整个 tick 期间
        // 持有场锁, 先取场锁会让宿主阻塞到在途 tick 结束
        if self.shared.ticking.swap(true, Ordering::AcqRel) {
            debug!("上一个 tick 尚未结束, 跳过本帧");
            return Ok(false);
        }
        // 守卫已占用且无在途 tick, 此后场锁无竞争;
        // 任何提前返回都要先释放守卫
        self.join_worker();

        let populated = if self.shared.state.lock().is_some() {
            true
        } else {
            match self.try_populate() {
                Ok(populated) => populated,
                Err(e) => {
                    self.shared.ticking.store(false, Ordering::Release);
                    return Err(e);
                }
            }
        };
        if !populated {
            self.shared.ticking.store(false, Ordering::Release);
            warn!("场景数据未就绪, 跳过 tick");
            return Ok(false);
        }

        let target = real_dt * self.config.simulated_time_per_real_second;
        let limits = TickLimits {
            max_substeps: self.config.max_substeps_per_tick,
            budget: (self.config.tick_budget_secs > 0.0)
                .then(|| Duration::from_secs_f64(self.config.tick_budget_secs)),
        };
        let shared = Arc::clone(&self.shared);

        let handle = std::thread::Builder::new()
            .name("sg-tick".into())
            .spawn(move || run_tick(&shared, target, limits))
            .map_err(|e| {
                self.shared.ticking.store(false, Ordering::Release);
                SgError::runtime(format!("启动 tick 线程失败: {e}"))
            })?;
        self.worker = Some(handle);
        Ok(true)
    }

    /// 重置到绑定场景的初始状态，模拟时间归零
    pub fn reset(&mut self) -> SgResult<()> {
        let _ = sg_foundation::require!(&self.provider, SgError::not_ready("场景提供者"));
        if !self.try_populate()? {
            return Err(SgError::not_ready("场景数据"));
        }
        Ok(())
    }

    /// 阻塞到在途 tick 结束（测试与批处理宿主用）
    pub fn wait_for_tick(&mut self) {
        self.join_worker();
    }

    /// 最近发布的场快照
    pub fn snapshot(&self) -> Option<FieldSnapshot> {
        self.shared.snapshot.read().clone()
    }

    /// 实例状态概览
    pub fn status(&self) -> SimulationStatus {
        let mut status = *self.shared.status.lock();
        status.ticking = self.shared.ticking.load(Ordering::Acquire);
        status
    }

    /// 当前场的最大波速 [m/s]（可视化缩放用）
    ///
    /// tick 在途时返回 `None`（不阻塞宿主线程）。
    pub fn max_wave_speed(&self) -> Option<f64> {
        let guard = self.shared.state.try_lock()?;
        let state = guard.as_ref()?;
        Some(state.engine.max_wave_speed())
    }

    /// 当前场状态下的最大稳定时间步 [s]
    ///
    /// tick 在途时返回 `None`（不阻塞宿主线程）。
    pub fn max_stable_step(&self) -> Option<f64> {
        let guard = self.shared.state.try_lock()?;
        let state = guard.as_ref()?;
        state.stepper.max_stable_step(&state.engine)
    }

    /// 配置
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// 绑定提供者就绪时构建引擎并填充场；未就绪返回 `Ok(false)`
    fn try_populate(&mut self) -> SgResult<bool> {
        let Some(provider) = self.provider.clone() else {
            return Ok(false);
        };
        if !provider.is_ready() {
            return Ok(false);
        }
        self.join_worker();

        let executor = Arc::new(ParallelExecutor::new(self.config.num_threads)?);
        let mut engine = CpuEngine::new(self.config.to_numerical_params()?, executor)?;
        engine.init(provider.as_ref())?;
        if let Some(cell_size) = self.config.cell_size {
            engine.override_cell_size(cell_size)?;
        }
        let stepper = Stepper::new(*engine.params());

        info!(
            width = engine.fields().grid().width(),
            height = engine.fields().grid().height(),
            "模拟实例初始化"
        );

        *self.shared.snapshot.write() = Some(engine.fields().snapshot());
        *self.shared.state.lock() = Some(EngineState { engine, stepper });
        *self.shared.status.lock() = SimulationStatus::default();
        self.shared.cancel.clear();
        Ok(true)
    }

    fn join_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                // run_tick 自身捕获推进 panic, 走到这里说明发布阶段异常
                error!("tick 线程异常退出");
            }
        }
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        // 先取消再汇合, 保证场缓冲释放前工作线程已退出
        self.shared.cancel.cancel();
        self.join_worker();
    }
}

/// 工作线程主体：推进、更新状态、发布快照
fn run_tick(shared: &Shared, target: f64, limits: TickLimits) {
    let mut slot = shared.state.lock();
    if let Some(state) = slot.as_mut() {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            state
                .stepper
                .advance(&mut state.engine, target, limits, &shared.cancel)
        }));
        match outcome {
            Ok(outcome) => {
                let mut status = shared.status.lock();
                status.sim_time += outcome.advanced;
                status.last_outcome = Some(outcome);
                drop(status);
                *shared.snapshot.write() = Some(state.engine.fields().snapshot());
            }
            Err(_) => {
                // 本帧作废, 场保持上次一致状态
                error!("推进过程 panic, 本 tick 作废");
                state.stepper.reset();
            }
        }
    }
    drop(slot);
    shared.ticking.store(false, Ordering::Release);
}
