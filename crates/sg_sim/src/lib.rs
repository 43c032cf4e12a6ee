// crates/sg_sim/src/lib.rs

//! 模拟编排模块 (Layer 4)
//!
//! 在数值引擎之上提供实例生命周期管理，面向交互式宿主
//! （渲染循环 / CLI）：
//! - 配置加载与验证 (config)
//! - 模拟实例：后台 tick、快照发布、取消与重置 (instance)
//!
//! # 线程模型
//!
//! 每个实例最多一个在途 tick：宿主调用 [`Simulation::tick`]
//! 启动一个后台工作线程推进一帧的模拟时间，工作线程内部再
//! 通过引擎的并行执行器做 fork-join 扫掠。tick 在途时再次
//! 调用 `tick` 是空操作。外部读者只消费 tick 结束后发布的
//! [`sg_physics::FieldSnapshot`]，不触碰活动场缓冲。

pub mod config;
pub mod instance;

pub use config::SimulationConfig;
pub use instance::{Simulation, SimulationStatus};
