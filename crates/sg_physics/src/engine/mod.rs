// crates/sg_physics/src/engine/mod.rs

//! 引擎层：并行执行、时间步进与后端抽象
//!
//! 模块组织：
//! - `parallel`: 固定线程池上的 fork-join 并行（分块、归约、条带写入）
//! - `timestep`: CFL 稳定时间步估计与周期性重算
//! - `sweep`: 维度分裂的单轴扫掠
//! - `backend`: 后端能力接口（CPU 实现为参考实现）
//! - `cpu`: CPU 后端
//! - `stepper`: 子步循环、帧预算与协作取消

mod backend;
mod cpu;
mod parallel;
mod stepper;
mod sweep;
mod timestep;

pub use backend::SimulationBackend;
pub use cpu::CpuEngine;
pub use parallel::ParallelExecutor;
pub use stepper::{AdvanceOutcome, CancelToken, Stepper, TickLimits};
pub use sweep::{SweepAxis, SweepStats};
pub use timestep::TimeStepController;
